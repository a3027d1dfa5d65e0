//! Intent arbiter task
//!
//! The foreground loop of the firmware. Every 10 ms it scans the D-pad for
//! edges, drains the pending-command slot, and applies whatever arrived to
//! the motor service and indicator panel. After any change it republishes
//! the motor state snapshot for the telemetry readers.
//!
//! This task owns all motor and indicator hardware; nothing else writes to
//! those pins.

use defmt::{debug, info};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm;
use embassy_time::{Duration, Ticker};

use crate::system::arbiter::{on_button_edge, on_remote_command, SCAN_INTERVAL_MS};
use crate::system::buttons::{ButtonInput, ButtonScanner};
use crate::system::command;
use crate::system::hbridge::{
    ChannelSlot, DirPin, HBridgeBank, MotorChannel, PwmChannel, PWM_PERIOD, PWM_TICK_HZ,
};
use crate::system::indicator::{IndicatorPanel, LampPin};
use crate::system::motor::{self, MotorService};
use crate::system::resources::{DpadResources, IndicatorResources, MotorDriverResources};
use crate::system::telemetry;

impl DirPin for Output<'static> {
    fn set_level(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

impl LampPin for Output<'static> {
    fn set_on(&mut self) {
        self.set_high();
    }

    fn set_off(&mut self) {
        self.set_low();
    }

    fn toggle(&mut self) {
        Output::toggle(self);
    }
}

impl ButtonInput for Input<'static> {
    // Buttons are wired active-low against an internal pull-up
    fn is_pressed(&self) -> bool {
        self.is_low()
    }
}

/// One PWM slice output serving a motor's speed input
pub struct PwmOutput {
    pwm: pwm::Pwm<'static>,
    config: pwm::Config,
    slot: ChannelSlot,
}

impl PwmOutput {
    fn new(pwm: pwm::Pwm<'static>, config: pwm::Config, slot: ChannelSlot) -> Self {
        Self { pwm, config, slot }
    }
}

impl PwmChannel for PwmOutput {
    fn set_compare(&mut self, compare: u16) {
        match self.slot {
            ChannelSlot::A => self.config.compare_a = compare,
            ChannelSlot::B => self.config.compare_b = compare,
        }
        self.pwm.set_config(&self.config);
    }
}

#[embassy_executor::task]
pub async fn arbitrate(
    motor_driver: MotorDriverResources,
    dpad: DpadResources,
    indicators: IndicatorResources,
) {
    // 1 kHz motor PWM carrier: divide the system clock down to a 1 MHz
    // counter tick and run a 1000-count period for 1% duty resolution
    let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();
    let divider = (clock_freq_hz / PWM_TICK_HZ) as u8;

    let mut pwm_config = pwm::Config::default();
    pwm_config.divider = divider.into();
    pwm_config.top = PWM_PERIOD - 1;

    let r = motor_driver;
    let m0 = MotorChannel::new(
        Output::new(r.m0_in1_pin, Level::Low),
        Output::new(r.m0_in2_pin, Level::Low),
        PwmOutput::new(
            pwm::Pwm::new_output_a(r.m0_slice, r.m0_pwm_pin, pwm_config.clone()),
            pwm_config.clone(),
            ChannelSlot::A,
        ),
    );
    let m1 = MotorChannel::new(
        Output::new(r.m1_in1_pin, Level::Low),
        Output::new(r.m1_in2_pin, Level::Low),
        PwmOutput::new(
            pwm::Pwm::new_output_b(r.m1_slice, r.m1_pwm_pin, pwm_config.clone()),
            pwm_config.clone(),
            ChannelSlot::B,
        ),
    );
    let m2 = MotorChannel::new(
        Output::new(r.m2_in1_pin, Level::Low),
        Output::new(r.m2_in2_pin, Level::Low),
        PwmOutput::new(
            pwm::Pwm::new_output_a(r.m2_slice, r.m2_pwm_pin, pwm_config.clone()),
            pwm_config.clone(),
            ChannelSlot::A,
        ),
    );
    let m3 = MotorChannel::new(
        Output::new(r.m3_in1_pin, Level::Low),
        Output::new(r.m3_in2_pin, Level::Low),
        PwmOutput::new(
            pwm::Pwm::new_output_b(r.m3_slice, r.m3_pwm_pin, pwm_config.clone()),
            pwm_config.clone(),
            ChannelSlot::B,
        ),
    );

    let bank = HBridgeBank::new(
        [m0, m1, m2, m3],
        [
            Output::new(r.driver_a_standby_pin, Level::Low),
            Output::new(r.driver_b_standby_pin, Level::Low),
        ],
    );

    // Boot contract: motors all stopped, then drivers out of standby
    let mut motors = MotorService::new(bank);

    let mut scanner = ButtonScanner::new([
        Input::new(dpad.forward_pin, Pull::Up),
        Input::new(dpad.left_pin, Pull::Up),
        Input::new(dpad.right_pin, Pull::Up),
        Input::new(dpad.backward_pin, Pull::Up),
    ]);

    let mut panel = IndicatorPanel::new([
        Output::new(indicators.lamp0_pin, Level::Low),
        Output::new(indicators.lamp1_pin, Level::Low),
        Output::new(indicators.lamp2_pin, Level::Low),
        Output::new(indicators.lamp3_pin, Level::Low),
    ]);

    motor::publish_snapshot(motors.state_snapshot()).await;
    info!("Arbiter started");

    let mut ticker = Ticker::every(Duration::from_millis(SCAN_INTERVAL_MS));
    loop {
        let mut changed = false;

        for edge in scanner.scan() {
            info!("button {} {}", edge.button, edge.transition);
            on_button_edge(edge, &mut motors, &mut panel, &mut telemetry::send);
            changed = true;
        }

        if let Some(line) = command::take() {
            match command::parse(&line) {
                Some(remote) => {
                    on_remote_command(remote, &mut motors, &mut panel, &mut telemetry::send);
                    changed = true;
                }
                None => debug!("ignoring unrecognised line ({} bytes)", line.len()),
            }
        }

        if changed {
            motor::publish_snapshot(motors.state_snapshot()).await;
        }

        ticker.next().await;
    }
}
