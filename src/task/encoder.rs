//! Tachometer task
//!
//! Counts optical-encoder pulses on four PWM input channels and converts
//! each 100 ms window into an RPM figure. While any motor is running the
//! task reports per-motor RPM plus the all-motors summary once per second;
//! a stopped robot stays silent on the wire.
//!
//! Readings are open-loop: they feed telemetry only and never influence the
//! motor service.

use defmt::info;
use embassy_rp::gpio::Pull;
use embassy_rp::pwm::{Config, InputMode, Pwm};
use embassy_time::{Duration, Instant, Ticker};

use crate::system::hbridge::MOTOR_COUNT;
use crate::system::motor;
use crate::system::telemetry::{self, TelemetryEvent};

/// Encoder disc slots per output-shaft revolution
const SLOTS_PER_REV: f32 = 20.0;

/// RPM measurement window
const MEASUREMENT_INTERVAL: Duration = Duration::from_millis(100);

/// Measurement windows per telemetry report (10 × 100 ms = 1 s)
const WINDOWS_PER_REPORT: u32 = 10;

#[embassy_executor::task]
pub async fn encoder(r: crate::system::resources::MotorEncoderResources) {
    // Rising-edge pulse counting on the B-channel inputs
    let config = Config::default();
    let counters = [
        Pwm::new_input(
            r.e0_slice,
            r.e0_pin,
            Pull::None,
            InputMode::RisingEdge,
            config.clone(),
        ),
        Pwm::new_input(
            r.e1_slice,
            r.e1_pin,
            Pull::None,
            InputMode::RisingEdge,
            config.clone(),
        ),
        Pwm::new_input(
            r.e2_slice,
            r.e2_pin,
            Pull::None,
            InputMode::RisingEdge,
            config.clone(),
        ),
        Pwm::new_input(r.e3_slice, r.e3_pin, Pull::None, InputMode::RisingEdge, config),
    ];

    info!("Tachometer started");

    let mut ticker = Ticker::every(MEASUREMENT_INTERVAL);
    let mut last_update = Instant::now();
    let mut rpm = [0.0f32; MOTOR_COUNT];
    let mut windows = 0u32;

    loop {
        ticker.next().await;

        let now = Instant::now();
        let elapsed_ms = (now - last_update).as_millis() as u32;
        last_update = now;

        for (index, counter) in counters.iter().enumerate() {
            let pulses = counter.counter();
            counter.set_counter(0);
            // rpm = pulses * 60000 / (elapsed_ms * slots); an empty window
            // reads zero, so a stalled wheel decays immediately
            rpm[index] = if elapsed_ms == 0 {
                0.0
            } else {
                pulses as f32 * 60_000.0 / (elapsed_ms as f32 * SLOTS_PER_REV)
            };
        }

        windows += 1;
        if windows < WINDOWS_PER_REPORT {
            continue;
        }
        windows = 0;

        let snapshot = motor::snapshot().await;
        if snapshot.any_running() {
            for (index, state) in snapshot.motors.iter().enumerate() {
                if state.is_running() {
                    telemetry::send(TelemetryEvent::Rpm {
                        motor: index as u8,
                        rpm: rpm[index],
                    });
                }
            }
            telemetry::send(TelemetryEvent::Summary(snapshot));
        }
    }
}
