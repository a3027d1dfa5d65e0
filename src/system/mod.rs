//! Core control logic, independent of the board bring-up
pub mod arbiter;
pub mod buttons;
pub mod command;
pub mod hbridge;
pub mod indicator;
pub mod motor;
#[cfg(feature = "rp2350")]
pub mod resources;
pub mod telemetry;
