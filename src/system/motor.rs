//! Motor service
//!
//! Logical drive layer above the H-bridge back-end. Exposes per-motor
//! drive/stop/brake plus the robot-level compound moves, and keeps the last
//! commanded state per motor readable for telemetry.
//!
//! Compound moves are pure functions of their inputs: they never read prior
//! motor state, so repeating a move reproduces the exact same pin writes.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::system::hbridge::{DirPin, Direction, HBridgeBank, MotorId, PwmChannel, MOTOR_COUNT};

/// Per-motor state as last commanded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorState {
    pub direction: Direction,
    pub duty: u8,
}

impl MotorState {
    /// A motor counts as running when it is actively driven
    pub fn is_running(&self) -> bool {
        matches!(self.direction, Direction::Forward | Direction::Reverse) && self.duty > 0
    }
}

/// Copy of the full motor state cache, indexed by motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorSnapshot {
    pub motors: [MotorState; MOTOR_COUNT],
}

impl MotorSnapshot {
    const INIT: MotorSnapshot = MotorSnapshot {
        motors: [MotorState {
            direction: Direction::Stop,
            duty: 0,
        }; MOTOR_COUNT],
    };

    pub fn any_running(&self) -> bool {
        self.motors.iter().any(|m| m.is_running())
    }
}

/// Latest published motor state, for readers outside the arbiter task
/// (telemetry summary, tachometer). The arbiter republishes after every
/// state change.
static SNAPSHOT: Mutex<CriticalSectionRawMutex, MotorSnapshot> = Mutex::new(MotorSnapshot::INIT);

/// Publishes a new snapshot of the motor state cache
pub async fn publish_snapshot(snapshot: MotorSnapshot) {
    *SNAPSHOT.lock().await = snapshot;
}

/// Returns a copy of the latest published snapshot
pub async fn snapshot() -> MotorSnapshot {
    *SNAPSHOT.lock().await
}

/// Drive service over the four motor channels
pub struct MotorService<D: DirPin, P: PwmChannel> {
    bank: HBridgeBank<D, P>,
}

impl<D: DirPin, P: PwmChannel> MotorService<D, P> {
    /// Boot contract: drivers held in standby while all four motors are
    /// written to (Stop, 0), then both drivers enabled.
    pub fn new(mut bank: HBridgeBank<D, P>) -> Self {
        bank.disable_all();
        for motor in MotorId::ALL {
            bank.set_direction(motor, Direction::Stop);
            bank.set_duty(motor, 0);
        }
        bank.enable_all();
        Self { bank }
    }

    /// Sets direction, then duty. Stop forces duty 0 and Brake forces duty
    /// 100 so the cached state always satisfies the direction/duty pairing.
    pub fn drive(&mut self, motor: MotorId, direction: Direction, speed: u8) {
        let duty = match direction {
            Direction::Stop => 0,
            Direction::Brake => 100,
            Direction::Forward | Direction::Reverse => speed.min(100),
        };
        self.bank.set_direction(motor, direction);
        self.bank.set_duty(motor, duty);
    }

    pub fn stop(&mut self, motor: MotorId) {
        self.drive(motor, Direction::Stop, 0);
    }

    pub fn brake(&mut self, motor: MotorId) {
        self.drive(motor, Direction::Brake, 100);
    }

    pub fn stop_all(&mut self) {
        for motor in MotorId::ALL {
            self.stop(motor);
        }
    }

    pub fn brake_all(&mut self) {
        for motor in MotorId::ALL {
            self.brake(motor);
        }
    }

    /// All wheels forward at `speed`
    pub fn forward(&mut self, speed: u8) {
        for motor in MotorId::ALL {
            self.drive(motor, Direction::Forward, speed);
        }
    }

    /// All wheels reverse at `speed`
    pub fn backward(&mut self, speed: u8) {
        for motor in MotorId::ALL {
            self.drive(motor, Direction::Reverse, speed);
        }
    }

    /// Differential steer left: left side slowed by `turn_ratio` percent
    pub fn turn_left(&mut self, speed: u8, turn_ratio: u8) {
        let speed = speed.min(100);
        let inner = slowed_side_speed(speed, turn_ratio);
        self.drive(MotorId::M0, Direction::Forward, inner);
        self.drive(MotorId::M1, Direction::Forward, inner);
        self.drive(MotorId::M2, Direction::Forward, speed);
        self.drive(MotorId::M3, Direction::Forward, speed);
    }

    /// Differential steer right: right side slowed by `turn_ratio` percent
    pub fn turn_right(&mut self, speed: u8, turn_ratio: u8) {
        let speed = speed.min(100);
        let inner = slowed_side_speed(speed, turn_ratio);
        self.drive(MotorId::M0, Direction::Forward, speed);
        self.drive(MotorId::M1, Direction::Forward, speed);
        self.drive(MotorId::M2, Direction::Forward, inner);
        self.drive(MotorId::M3, Direction::Forward, inner);
    }

    /// Pivot in place, counter-clockwise: left side reverse, right forward
    pub fn rotate_left(&mut self, speed: u8) {
        self.drive(MotorId::M0, Direction::Reverse, speed);
        self.drive(MotorId::M1, Direction::Reverse, speed);
        self.drive(MotorId::M2, Direction::Forward, speed);
        self.drive(MotorId::M3, Direction::Forward, speed);
    }

    /// Pivot in place, clockwise: left side forward, right reverse
    pub fn rotate_right(&mut self, speed: u8) {
        self.drive(MotorId::M0, Direction::Forward, speed);
        self.drive(MotorId::M1, Direction::Forward, speed);
        self.drive(MotorId::M2, Direction::Reverse, speed);
        self.drive(MotorId::M3, Direction::Reverse, speed);
    }

    /// Last commanded speed, from cache
    pub fn speed(&self, motor: MotorId) -> u8 {
        self.bank.duty(motor)
    }

    /// Last commanded direction, from cache
    pub fn direction(&self, motor: MotorId) -> Direction {
        self.bank.direction(motor)
    }

    /// Copies the full state cache
    pub fn state_snapshot(&self) -> MotorSnapshot {
        let mut snapshot = MotorSnapshot::INIT;
        for motor in MotorId::ALL {
            snapshot.motors[motor.index()] = MotorState {
                direction: self.bank.direction(motor),
                duty: self.bank.duty(motor),
            };
        }
        snapshot
    }
}

/// Speed for the slowed side of a differential turn:
/// `speed × (100 − ratio) / 100`, truncating
fn slowed_side_speed(speed: u8, turn_ratio: u8) -> u8 {
    let ratio = turn_ratio.min(100);
    (u16::from(speed) * u16::from(100 - ratio) / 100) as u8
}
