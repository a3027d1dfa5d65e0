//! Telemetry events and their JSON wire encoding
//!
//! Every event renders to a single JSON object on its own line, bounded by a
//! 256-byte buffer. An event that would not fit is dropped without notice;
//! the link is lossy by design.
//!
//! Producers hand events to a channel with `send` (non-blocking, drops when
//! the channel is full) and the serial writer task drains it. State
//! transitions emit telemetry; nothing emits from a hot loop.

use core::fmt::Write as _;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use crate::system::hbridge::Direction;
use crate::system::motor::MotorSnapshot;

/// Encode buffer size, also the upper bound for one wire line
pub const ENCODE_CAPACITY: usize = 256;

/// One encoded telemetry line, newline-terminated
pub type TelemetryLine = String<ENCODE_CAPACITY>;

/// Outbound telemetry events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    /// Button edge mirror
    Button { button: u8, pressed: bool },
    /// Per-motor state mirror
    Motor {
        motor: u8,
        direction: Direction,
        speed: u8,
    },
    /// Tachometer reading
    Rpm { motor: u8, rpm: f32 },
    /// Coarse running/stopped summary of all four motors
    Summary(MotorSnapshot),
    /// Passthrough line, e.g. the boot banner
    Raw(&'static str),
}

/// Outbound event queue drained by the serial writer
static EVENTS: Channel<CriticalSectionRawMutex, TelemetryEvent, 16> = Channel::new();

/// Queues an event for transmission. Drops the event when the queue is full;
/// telemetry must never stall a control path.
pub fn send(event: TelemetryEvent) {
    let _ = EVENTS.try_send(event);
}

/// Waits for the next queued event
pub async fn next() -> TelemetryEvent {
    EVENTS.receive().await
}

/// Direction name on the wire. Brake has no wire representation of its own
/// and reports as "stop".
fn wire_direction(direction: Direction) -> &'static str {
    match direction {
        Direction::Forward => "forward",
        Direction::Reverse => "backward",
        Direction::Stop | Direction::Brake => "stop",
    }
}

/// Renders an event to its wire line. `None` means the event did not fit the
/// buffer and must be dropped.
pub fn encode(event: &TelemetryEvent) -> Option<TelemetryLine> {
    let mut line = TelemetryLine::new();
    let rendered = match event {
        TelemetryEvent::Button { button, pressed } => write!(
            line,
            "{{\"button\":{},\"state\":\"{}\"}}\n",
            button,
            if *pressed { "pressed" } else { "released" },
        ),
        TelemetryEvent::Motor {
            motor,
            direction,
            speed,
        } => write!(
            line,
            "{{\"motor\":{},\"direction\":\"{}\",\"speed\":{}}}\n",
            motor,
            wire_direction(*direction),
            speed,
        ),
        TelemetryEvent::Rpm { motor, rpm } => {
            write!(line, "{{\"motor\":{},\"rpm\":{:.1}}}\n", motor, rpm)
        }
        TelemetryEvent::Summary(snapshot) => encode_summary(&mut line, snapshot),
        TelemetryEvent::Raw(text) => {
            let mut result = line.push_str(text).map_err(|_| core::fmt::Error);
            if result.is_ok() && !text.ends_with('\n') {
                result = line.push('\n').map_err(|_| core::fmt::Error);
            }
            result
        }
    };
    rendered.ok().map(|_| line)
}

fn encode_summary(line: &mut TelemetryLine, snapshot: &MotorSnapshot) -> core::fmt::Result {
    line.push_str("{\"motors\":[")
        .map_err(|_| core::fmt::Error)?;
    for (index, motor) in snapshot.motors.iter().enumerate() {
        if index > 0 {
            line.push(',').map_err(|_| core::fmt::Error)?;
        }
        write!(
            line,
            "{{\"state\":\"{}\",\"speed\":{}}}",
            if motor.is_running() {
                "running"
            } else {
                "stopped"
            },
            motor.duty,
        )?;
    }
    line.push_str("]}\n").map_err(|_| core::fmt::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::motor::MotorState;

    fn encoded(event: TelemetryEvent) -> std::string::String {
        encode(&event)
            .expect("event must fit the buffer")
            .as_str()
            .into()
    }

    #[test]
    fn button_events() {
        assert_eq!(
            encoded(TelemetryEvent::Button {
                button: 0,
                pressed: true,
            }),
            "{\"button\":0,\"state\":\"pressed\"}\n"
        );
        assert_eq!(
            encoded(TelemetryEvent::Button {
                button: 3,
                pressed: false,
            }),
            "{\"button\":3,\"state\":\"released\"}\n"
        );
    }

    #[test]
    fn motor_events() {
        assert_eq!(
            encoded(TelemetryEvent::Motor {
                motor: 0,
                direction: Direction::Forward,
                speed: 70,
            }),
            "{\"motor\":0,\"direction\":\"forward\",\"speed\":70}\n"
        );
        assert_eq!(
            encoded(TelemetryEvent::Motor {
                motor: 2,
                direction: Direction::Reverse,
                speed: 45,
            }),
            "{\"motor\":2,\"direction\":\"backward\",\"speed\":45}\n"
        );
        // Stop and brake both report as "stop" on the wire
        assert_eq!(
            encoded(TelemetryEvent::Motor {
                motor: 1,
                direction: Direction::Stop,
                speed: 0,
            }),
            "{\"motor\":1,\"direction\":\"stop\",\"speed\":0}\n"
        );
        assert_eq!(
            encoded(TelemetryEvent::Motor {
                motor: 1,
                direction: Direction::Brake,
                speed: 100,
            }),
            "{\"motor\":1,\"direction\":\"stop\",\"speed\":100}\n"
        );
    }

    #[test]
    fn rpm_renders_one_decimal() {
        assert_eq!(
            encoded(TelemetryEvent::Rpm {
                motor: 0,
                rpm: 325.52,
            }),
            "{\"motor\":0,\"rpm\":325.5}\n"
        );
        assert_eq!(
            encoded(TelemetryEvent::Rpm { motor: 3, rpm: 0.0 }),
            "{\"motor\":3,\"rpm\":0.0}\n"
        );
    }

    #[test]
    fn summary_lists_all_four_motors() {
        let mut snapshot = MotorSnapshot {
            motors: [MotorState {
                direction: Direction::Stop,
                duty: 0,
            }; 4],
        };
        snapshot.motors[0] = MotorState {
            direction: Direction::Forward,
            duty: 80,
        };
        assert_eq!(
            encoded(TelemetryEvent::Summary(snapshot)),
            "{\"motors\":[{\"state\":\"running\",\"speed\":80},\
             {\"state\":\"stopped\",\"speed\":0},\
             {\"state\":\"stopped\",\"speed\":0},\
             {\"state\":\"stopped\",\"speed\":0}]}\n"
        );
    }

    #[test]
    fn raw_lines_gain_a_newline_when_missing() {
        assert_eq!(encoded(TelemetryEvent::Raw("booted\n")), "booted\n");
        assert_eq!(encoded(TelemetryEvent::Raw("booted")), "booted\n");
    }

    #[test]
    fn oversize_raw_line_is_dropped() {
        // 300 chars cannot fit the 256-byte buffer
        let big: &'static str = std::boxed::Box::leak("x".repeat(300).into_boxed_str());
        assert_eq!(encode(&TelemetryEvent::Raw(big)), None);
    }
}
