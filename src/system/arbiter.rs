//! Drive intent arbitration
//!
//! Reduces D-pad edges and remote commands to motor and indicator actions.
//! Both inputs funnel through the same two entry points, processed in
//! arrival order within one arbiter tick; the last writer wins on motor
//! state. Edges are one-shot: a remote stop while a button is held is not
//! undone by the later release, which only stops again.
//!
//! Every state change is mirrored onto the telemetry stream through the
//! `emit` callback, with values read back from the motor service cache so
//! the mirror can never disagree with what was actually commanded.

use crate::system::buttons::{ButtonEdge, ButtonId, Transition};
use crate::system::command::{RemoteCommand, DEFAULT_SPEED, TURN_RATIO};
use crate::system::hbridge::{DirPin, Direction, MotorId, PwmChannel};
use crate::system::indicator::{IndicatorPanel, LampPin};
use crate::system::motor::MotorService;
use crate::system::telemetry::TelemetryEvent;

/// Interval between arbiter ticks. Doubles as the button debounce window.
pub const SCAN_INTERVAL_MS: u64 = 10;

/// Motors touched by the last applied action, for mirror emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Touched {
    All,
    One(MotorId),
}

/// Applies a D-pad edge: press starts the mapped compound move and lights
/// the button's lamp, release stops everything and clears it.
pub fn on_button_edge<D, P, L>(
    edge: ButtonEdge,
    motors: &mut MotorService<D, P>,
    panel: &mut IndicatorPanel<L>,
    emit: &mut impl FnMut(TelemetryEvent),
) where
    D: DirPin,
    P: PwmChannel,
    L: LampPin,
{
    emit(TelemetryEvent::Button {
        button: edge.button.index() as u8,
        pressed: edge.transition == Transition::Press,
    });

    match edge.transition {
        Transition::Press => {
            match edge.button {
                ButtonId::Forward => motors.forward(DEFAULT_SPEED),
                ButtonId::Left => motors.rotate_left(DEFAULT_SPEED),
                ButtonId::Right => motors.rotate_right(DEFAULT_SPEED),
                ButtonId::Backward => motors.backward(DEFAULT_SPEED),
            }
            panel.on(edge.button.index());
        }
        Transition::Release => {
            motors.stop_all();
            panel.off(edge.button.index());
        }
    }

    mirror(motors, Touched::All, emit);
}

/// Applies a decoded remote command and its indicator pattern
pub fn on_remote_command<D, P, L>(
    command: RemoteCommand,
    motors: &mut MotorService<D, P>,
    panel: &mut IndicatorPanel<L>,
    emit: &mut impl FnMut(TelemetryEvent),
) where
    D: DirPin,
    P: PwmChannel,
    L: LampPin,
{
    let touched = match command {
        RemoteCommand::Forward(speed) => {
            motors.forward(speed);
            panel.all_on();
            Touched::All
        }
        RemoteCommand::Backward(speed) => {
            motors.backward(speed);
            panel.all_on();
            Touched::All
        }
        RemoteCommand::TurnLeft(speed) => {
            motors.turn_left(speed, TURN_RATIO);
            panel.on(0);
            panel.off(1);
            panel.on(2);
            panel.off(3);
            Touched::All
        }
        RemoteCommand::TurnRight(speed) => {
            motors.turn_right(speed, TURN_RATIO);
            panel.off(0);
            panel.on(1);
            panel.off(2);
            panel.on(3);
            Touched::All
        }
        RemoteCommand::Stop => {
            motors.stop_all();
            panel.all_off();
            Touched::All
        }
        RemoteCommand::PerMotor {
            motor,
            direction,
            speed,
        } => {
            motors.drive(motor, direction, speed);
            if direction == Direction::Stop {
                panel.off(motor.index());
            } else {
                panel.on(motor.index());
            }
            Touched::One(motor)
        }
    };

    mirror(motors, touched, emit);
}

/// Emits per-motor state lines from the service cache
fn mirror<D, P>(
    motors: &MotorService<D, P>,
    touched: Touched,
    emit: &mut impl FnMut(TelemetryEvent),
) where
    D: DirPin,
    P: PwmChannel,
{
    match touched {
        Touched::All => {
            for motor in MotorId::ALL {
                emit(motor_event(motors, motor));
            }
        }
        Touched::One(motor) => emit(motor_event(motors, motor)),
    }
}

fn motor_event<D, P>(motors: &MotorService<D, P>, motor: MotorId) -> TelemetryEvent
where
    D: DirPin,
    P: PwmChannel,
{
    TelemetryEvent::Motor {
        motor: motor.index() as u8,
        direction: motors.direction(motor),
        speed: motors.speed(motor),
    }
}
