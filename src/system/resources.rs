//! Hardware resource routing
//!
//! Binds every peripheral the core consumes to its pins in one place. The
//! resource groups are split between tasks at startup; nothing is shared, so
//! no locking is needed here.
//!
//! # Resource Groups
//! - Motor Drivers: two dual H-bridge modules (4 PWM channels, 8 direction
//!   pins, 2 standby lines), routed in motor index order
//! - D-pad: four button inputs, internal pull-up, active low
//! - Indicators: four lamp outputs mirroring the D-pad, plus the heartbeat
//!   lamp on the onboard LED
//! - Gateway link: UART0 to the network gateway
//! - Tachometer: four encoder pulse inputs on PWM B-channel pins

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, UART0};
use embassy_rp::uart::BufferedInterruptHandler;

assign_resources! {
    /// Dual H-bridge driver modules. Motors 0 and 1 sit on driver A
    /// (left side), motors 2 and 3 on driver B (right side).
    motor_driver: MotorDriverResources {
        // Motor 0 (driver A, channel A)
        m0_slice: PWM_SLICE0,
        m0_pwm_pin: PIN_16,
        m0_in1_pin: PIN_2,
        m0_in2_pin: PIN_5,
        // Motor 1 (driver A, channel B)
        m1_slice: PWM_SLICE1,
        m1_pwm_pin: PIN_3,
        m1_in1_pin: PIN_6,
        m1_in2_pin: PIN_8,
        // Motor 2 (driver B, channel A)
        m2_slice: PWM_SLICE2,
        m2_pwm_pin: PIN_4,
        m2_in1_pin: PIN_10,
        m2_in2_pin: PIN_12,
        // Motor 3 (driver B, channel B)
        m3_slice: PWM_SLICE3,
        m3_pwm_pin: PIN_7,
        m3_in1_pin: PIN_14,
        m3_in2_pin: PIN_17,
        // Standby lines
        driver_a_standby_pin: PIN_18,
        driver_b_standby_pin: PIN_19,
    },
    /// D-pad buttons, active low with internal pull-up
    dpad: DpadResources {
        forward_pin: PIN_20,
        left_pin: PIN_21,
        right_pin: PIN_22,
        backward_pin: PIN_26,
    },
    /// Indicator lamps, one per D-pad button
    indicators: IndicatorResources {
        lamp0_pin: PIN_23,
        lamp1_pin: PIN_24,
        lamp2_pin: PIN_27,
        lamp3_pin: PIN_28,
    },
    /// Liveness heartbeat lamp (onboard LED)
    heartbeat: HeartbeatResources {
        lamp_pin: PIN_25,
    },
    /// UART link to the network gateway
    gateway_uart: GatewayUartResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
    },
    /// Optical encoder pulse inputs (PWM B-channel counters)
    motor_encoders: MotorEncoderResources {
        e0_slice: PWM_SLICE4,
        e0_pin: PIN_9,
        e1_slice: PWM_SLICE5,
        e1_pin: PIN_11,
        e2_slice: PWM_SLICE6,
        e2_pin: PIN_13,
        e3_slice: PWM_SLICE7,
        e3_pin: PIN_15,
    },
}

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});
