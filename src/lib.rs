//! quad-rover firmware library
//!
//! The control logic under [`system`] is hardware-independent and runs on
//! the host for tests (`cargo test --no-default-features`). The board
//! bring-up under [`task`] requires the `rp2350` feature, which is on by
//! default.

#![cfg_attr(not(test), no_std)]

/// Core control logic
pub mod system;
/// Task implementations
#[cfg(feature = "rp2350")]
pub mod task;
