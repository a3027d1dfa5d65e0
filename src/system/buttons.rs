//! D-pad button scanner
//!
//! Polls the four active-low button inputs and reports press/release edges
//! by comparing each sample against the stored previous state. Debouncing
//! comes from the caller's polling cadence (the arbiter scans every 10 ms,
//! enough for mechanical buttons).

use defmt::Format;

use heapless::Vec;

/// Number of D-pad buttons
pub const BUTTON_COUNT: usize = 4;

/// D-pad button identity. The wire index is the D-pad position:
/// 0 = Forward, 1 = Left, 2 = Right, 3 = Backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum ButtonId {
    Forward,
    Left,
    Right,
    Backward,
}

impl ButtonId {
    /// All buttons, in index order
    pub const ALL: [ButtonId; BUTTON_COUNT] = [
        ButtonId::Forward,
        ButtonId::Left,
        ButtonId::Right,
        ButtonId::Backward,
    ];

    /// Wire/indicator index of this button
    pub fn index(self) -> usize {
        match self {
            ButtonId::Forward => 0,
            ButtonId::Left => 1,
            ButtonId::Right => 2,
            ButtonId::Backward => 3,
        }
    }
}

/// Edge transition kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Transition {
    Press,
    Release,
}

/// One observed edge; lives for a single arbiter iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct ButtonEdge {
    pub button: ButtonId,
    pub transition: Transition,
}

/// A sampled button input. Implementations must account for the active-low
/// wiring: `is_pressed` returns true when the pin currently reads low.
pub trait ButtonInput {
    fn is_pressed(&self) -> bool;
}

/// Edge detector over the four button inputs
pub struct ButtonScanner<I: ButtonInput> {
    inputs: [I; BUTTON_COUNT],
    previous: [bool; BUTTON_COUNT],
}

impl<I: ButtonInput> ButtonScanner<I> {
    /// All buttons assumed released at boot
    pub fn new(inputs: [I; BUTTON_COUNT]) -> Self {
        Self {
            inputs,
            previous: [false; BUTTON_COUNT],
        }
    }

    /// Samples every input once and returns the edges since the last scan.
    /// The previous-state array is updated after edge detection, so a held
    /// button produces exactly one press edge.
    pub fn scan(&mut self) -> Vec<ButtonEdge, BUTTON_COUNT> {
        let mut edges = Vec::new();
        for button in ButtonId::ALL {
            let index = button.index();
            let pressed = self.inputs[index].is_pressed();
            let transition = match (self.previous[index], pressed) {
                (false, true) => Some(Transition::Press),
                (true, false) => Some(Transition::Release),
                _ => None,
            };
            if let Some(transition) = transition {
                // Capacity equals the button count, push cannot fail
                let _ = edges.push(ButtonEdge { button, transition });
            }
            self.previous[index] = pressed;
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Button level that the test flips between scans
    #[derive(Debug)]
    struct MockButton {
        pressed: Cell<bool>,
    }

    impl MockButton {
        fn released() -> Self {
            Self {
                pressed: Cell::new(false),
            }
        }
    }

    impl ButtonInput for MockButton {
        fn is_pressed(&self) -> bool {
            self.pressed.get()
        }
    }

    fn scanner() -> ButtonScanner<MockButton> {
        ButtonScanner::new([
            MockButton::released(),
            MockButton::released(),
            MockButton::released(),
            MockButton::released(),
        ])
    }

    #[test]
    fn no_edges_at_rest() {
        let mut scanner = scanner();
        assert!(scanner.scan().is_empty());
        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn press_and_release_emit_single_edges() {
        let mut scanner = scanner();

        scanner.inputs[0].pressed.set(true);
        let edges = scanner.scan();
        assert_eq!(
            edges.as_slice(),
            [ButtonEdge {
                button: ButtonId::Forward,
                transition: Transition::Press,
            }]
        );

        // Held button: same level, no further edge
        assert!(scanner.scan().is_empty());
        assert!(scanner.scan().is_empty());

        scanner.inputs[0].pressed.set(false);
        let edges = scanner.scan();
        assert_eq!(
            edges.as_slice(),
            [ButtonEdge {
                button: ButtonId::Forward,
                transition: Transition::Release,
            }]
        );
        assert!(scanner.scan().is_empty());
    }

    #[test]
    fn simultaneous_edges_report_in_index_order() {
        let mut scanner = scanner();
        scanner.inputs[1].pressed.set(true);
        scanner.inputs[3].pressed.set(true);

        let edges = scanner.scan();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].button, ButtonId::Left);
        assert_eq!(edges[1].button, ButtonId::Backward);
    }

    #[test]
    fn press_edges_match_release_edges_over_time() {
        let mut scanner = scanner();
        let mut presses = 0;
        let mut releases = 0;

        for round in 0..10 {
            scanner.inputs[2].pressed.set(round % 2 == 0);
            for edge in scanner.scan() {
                match edge.transition {
                    Transition::Press => presses += 1,
                    Transition::Release => releases += 1,
                }
            }
        }
        scanner.inputs[2].pressed.set(false);
        for edge in scanner.scan() {
            if edge.transition == Transition::Release {
                releases += 1;
            }
        }
        assert_eq!(presses, releases);
    }

    #[test]
    fn button_index_round_trip() {
        for (index, button) in ButtonId::ALL.iter().enumerate() {
            assert_eq!(button.index(), index);
        }
    }
}
