//! Liveness heartbeat
//!
//! Toggles the status lamp on a coarse fixed period, independent of button
//! and command activity. A stalled firmware shows as a frozen lamp.

use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Ticker};

use crate::system::resources::HeartbeatResources;

/// Toggle period
const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

#[embassy_executor::task]
pub async fn heartbeat(r: HeartbeatResources) {
    let mut lamp = Output::new(r.lamp_pin, Level::Low);
    let mut ticker = Ticker::every(HEARTBEAT_INTERVAL);
    loop {
        ticker.next().await;
        lamp.toggle();
    }
}
