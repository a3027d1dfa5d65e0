//! Remote command grammar and the inbound mailbox
//!
//! Commands arrive from the gateway as colon-separated ASCII lines prefixed
//! with `C:`. Parsing is single-pass and tolerant: a missing speed field
//! falls back to the default, unknown command letters are ignored without a
//! negative acknowledgement.
//!
//! The mailbox is the single-slot handoff between the serial reader and the
//! arbiter. Publication is drop-on-overflow: when the slot is still full the
//! newly completed line is discarded, so a burst of commands resolves to the
//! first one. Commands are deliberately lossy; the local D-pad keeps working
//! even when the link floods.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use crate::system::hbridge::{Direction, MotorId};

/// Capacity of the line assembly buffer and mailbox payload
pub const LINE_CAPACITY: usize = 64;

/// One received line, without CR/LF
pub type CommandLine = Vec<u8, LINE_CAPACITY>;

/// Speed used when a command omits its speed field, and for all D-pad moves
pub const DEFAULT_SPEED: u8 = 70;

/// Turn sharpness applied to remote steer commands
pub const TURN_RATIO: u8 = 60;

/// Single-slot pending command mailbox
static PENDING: Channel<CriticalSectionRawMutex, CommandLine, 1> = Channel::new();

/// Offers a completed line to the mailbox. Returns `false` when the slot was
/// still occupied and the line was dropped.
pub fn publish(line: CommandLine) -> bool {
    PENDING.try_send(line).is_ok()
}

/// Takes the pending line, if any. Never blocks.
pub fn take() -> Option<CommandLine> {
    PENDING.try_receive().ok()
}

/// A decoded remote command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Forward(u8),
    Backward(u8),
    TurnLeft(u8),
    TurnRight(u8),
    Stop,
    PerMotor {
        motor: MotorId,
        direction: Direction,
        speed: u8,
    },
}

/// Parses one line of the `C:` grammar. Returns `None` for anything that is
/// not a well-formed command; the caller drops such lines silently.
pub fn parse(line: &[u8]) -> Option<RemoteCommand> {
    let text = core::str::from_utf8(line).ok()?;
    let mut fields = text.split(':');
    if fields.next()? != "C" {
        return None;
    }

    match fields.next()? {
        "F" => Some(RemoteCommand::Forward(speed_field(fields.next()))),
        "B" => Some(RemoteCommand::Backward(speed_field(fields.next()))),
        "L" => Some(RemoteCommand::TurnLeft(speed_field(fields.next()))),
        "R" => Some(RemoteCommand::TurnRight(speed_field(fields.next()))),
        "S" => Some(RemoteCommand::Stop),
        "M" => {
            let index: usize = fields.next()?.parse().ok()?;
            let motor = MotorId::from_index(index)?;
            let direction = match fields.next() {
                Some("F") => Direction::Forward,
                Some("B") => Direction::Reverse,
                _ => Direction::Stop,
            };
            Some(RemoteCommand::PerMotor {
                motor,
                direction,
                speed: speed_field(fields.next()),
            })
        }
        _ => None,
    }
}

/// Decimal speed field; anything missing or unparsable becomes the default.
/// Negative numbers never parse as unsigned, so they fall back too.
fn speed_field(field: Option<&str>) -> u8 {
    field
        .and_then(|text| text.parse::<u8>().ok())
        .unwrap_or(DEFAULT_SPEED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_robot_commands() {
        assert_eq!(parse(b"C:F:80"), Some(RemoteCommand::Forward(80)));
        assert_eq!(parse(b"C:B:35"), Some(RemoteCommand::Backward(35)));
        assert_eq!(parse(b"C:L:50"), Some(RemoteCommand::TurnLeft(50)));
        assert_eq!(parse(b"C:R:100"), Some(RemoteCommand::TurnRight(100)));
        assert_eq!(parse(b"C:S"), Some(RemoteCommand::Stop));
    }

    #[test]
    fn speed_defaults_when_missing() {
        assert_eq!(parse(b"C:F"), Some(RemoteCommand::Forward(DEFAULT_SPEED)));
        assert_eq!(parse(b"C:L"), Some(RemoteCommand::TurnLeft(DEFAULT_SPEED)));
        // Empty and non-numeric fields behave like missing ones
        assert_eq!(parse(b"C:F:"), Some(RemoteCommand::Forward(DEFAULT_SPEED)));
        assert_eq!(
            parse(b"C:B:fast"),
            Some(RemoteCommand::Backward(DEFAULT_SPEED))
        );
        assert_eq!(
            parse(b"C:F:-20"),
            Some(RemoteCommand::Forward(DEFAULT_SPEED))
        );
    }

    #[test]
    fn per_motor_commands() {
        assert_eq!(
            parse(b"C:M:2:B:45"),
            Some(RemoteCommand::PerMotor {
                motor: MotorId::M2,
                direction: Direction::Reverse,
                speed: 45,
            })
        );
        assert_eq!(
            parse(b"C:M:0:F:100"),
            Some(RemoteCommand::PerMotor {
                motor: MotorId::M0,
                direction: Direction::Forward,
                speed: 100,
            })
        );
        // Any other direction letter means stop
        assert_eq!(
            parse(b"C:M:1:X:50"),
            Some(RemoteCommand::PerMotor {
                motor: MotorId::M1,
                direction: Direction::Stop,
                speed: 50,
            })
        );
        // Truncated forms fill in defaults
        assert_eq!(
            parse(b"C:M:3"),
            Some(RemoteCommand::PerMotor {
                motor: MotorId::M3,
                direction: Direction::Stop,
                speed: DEFAULT_SPEED,
            })
        );
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert_eq!(parse(b""), None);
        assert_eq!(parse(b"C"), None);
        assert_eq!(parse(b"C:"), None);
        assert_eq!(parse(b"C:Q:50"), None);
        assert_eq!(parse(b"X:F:50"), None);
        assert_eq!(parse(b"c:F:50"), None);
        // Per-motor with a missing or out-of-range index
        assert_eq!(parse(b"C:M"), None);
        assert_eq!(parse(b"C:M:"), None);
        assert_eq!(parse(b"C:M:4:F:50"), None);
        assert_eq!(parse(b"C:M:x:F:50"), None);
        // Non-UTF8 garbage
        assert_eq!(parse(&[0x43, 0x3a, 0xff, 0xfe]), None);
    }

    #[test]
    fn oversize_speed_is_passed_through_for_clamping() {
        // Values that fit a u8 reach the motor service, which clamps them
        assert_eq!(parse(b"C:F:255"), Some(RemoteCommand::Forward(255)));
        // Values beyond u8 do not parse and fall back to the default
        assert_eq!(
            parse(b"C:F:300"),
            Some(RemoteCommand::Forward(DEFAULT_SPEED))
        );
    }

    #[test]
    fn mailbox_drops_second_line() {
        // Drain anything a previous test left behind
        while take().is_some() {}

        let mut first = CommandLine::new();
        first.extend_from_slice(b"C:F:80").unwrap();
        let mut second = CommandLine::new();
        second.extend_from_slice(b"C:B:80").unwrap();

        assert!(publish(first.clone()));
        assert!(!publish(second), "second line must be dropped, not queued");

        assert_eq!(take(), Some(first));
        assert_eq!(take(), None);
    }
}
