//! Robot firmware entry point
//!
//! Initializes system and spawns control tasks.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use quad_rover::split_resources;
use quad_rover::system::resources::{
    AssignedResources, DpadResources, GatewayUartResources, HeartbeatResources,
    IndicatorResources, MotorDriverResources, MotorEncoderResources,
};
use quad_rover::task::{
    arbitrate::arbitrate,
    encoder::encoder,
    heartbeat::heartbeat,
    serial::{self, gateway_reader, gateway_writer},
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups, one per task
    let r = split_resources!(p);

    // Bring up the gateway link first so the boot banner leads the stream
    let (tx, rx) = serial::init(r.gateway_uart);
    spawner.spawn(gateway_writer(tx)).unwrap();
    spawner.spawn(gateway_reader(rx)).unwrap();

    spawner.spawn(heartbeat(r.heartbeat)).unwrap();
    spawner.spawn(encoder(r.motor_encoders)).unwrap();

    // The arbiter owns motors, buttons and indicators
    spawner
        .spawn(arbitrate(r.motor_driver, r.dpad, r.indicators))
        .unwrap();
}
