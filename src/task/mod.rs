//! Task implementations
pub mod arbitrate;
pub mod encoder;
pub mod heartbeat;
pub mod serial;
