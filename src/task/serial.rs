//! Serial channel to the network gateway
//!
//! One buffered UART at 115200 8N1, split into a reader and a writer task.
//!
//! The reader assembles inbound bytes into lines: carriage returns are
//! ignored, a line feed (or the assembly buffer running full) completes the
//! line, and completed lines are offered to the single-slot command mailbox.
//! A line that arrives while the slot is still occupied is dropped; framing
//! stays intact because the assembly buffer is reset either way.
//!
//! The writer drains the telemetry queue, encodes each event, and transmits
//! with a bounded timeout. A timed-out or failed write drops the line and
//! moves on; there is no retry and no buffering beyond the queue itself.

use defmt::{info, warn};
use embassy_rp::uart::{BufferedUart, BufferedUartRx, BufferedUartTx, Config};
use embassy_time::{with_timeout, Duration};
use embedded_io_async::{Read, Write};

use crate::system::command::{self, CommandLine, LINE_CAPACITY};
use crate::system::resources::{GatewayUartResources, Irqs};
use crate::system::telemetry::{self, TelemetryEvent};

/// Gateway link baud rate
pub const BAUD_RATE: u32 = 115_200;

/// Upper bound for one blocking transmit
const TX_TIMEOUT: Duration = Duration::from_millis(100);

/// Non-JSON availability banner, sent once at startup
const BANNER: &str = "quad-rover ready\n";

/// Builds the buffered UART and splits it for the two tasks
pub fn init(r: GatewayUartResources) -> (BufferedUartTx, BufferedUartRx) {
    static mut TX_BUFFER: [u8; 256] = [0; 256];
    static mut RX_BUFFER: [u8; 256] = [0; 256];

    let mut config = Config::default();
    config.baudrate = BAUD_RATE;
    // 8N1 and no flow control are the hardware defaults

    let uart = BufferedUart::new(
        r.uart,
        r.tx_pin,
        r.rx_pin,
        Irqs,
        unsafe { &mut *core::ptr::addr_of_mut!(TX_BUFFER) },
        unsafe { &mut *core::ptr::addr_of_mut!(RX_BUFFER) },
        config,
    );
    uart.split()
}

/// Inbound half: interrupt-fed byte stream to command lines
#[embassy_executor::task]
pub async fn gateway_reader(mut rx: BufferedUartRx) {
    info!("Gateway reader started");

    let mut assembly = CommandLine::new();
    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(0) => continue,
            Ok(_) => on_byte(byte[0], &mut assembly),
            Err(error) => warn!("uart read error: {}", error),
        }
    }
}

/// One step of the line assembly state machine
fn on_byte(byte: u8, assembly: &mut CommandLine) {
    if byte == b'\r' {
        return;
    }
    // A full buffer completes the line just like a terminator; the payload
    // is capped at capacity-1 and the current byte is not kept.
    if byte == b'\n' || assembly.len() >= LINE_CAPACITY - 1 {
        if !assembly.is_empty() && !command::publish(assembly.clone()) {
            warn!("command slot full, line dropped");
        }
        assembly.clear();
        return;
    }
    let _ = assembly.push(byte);
}

/// Outbound half: telemetry queue to wire lines
#[embassy_executor::task]
pub async fn gateway_writer(mut tx: BufferedUartTx) {
    info!("Gateway writer started");
    telemetry::send(TelemetryEvent::Raw(BANNER));

    loop {
        let event = telemetry::next().await;
        // An event that does not fit the encode buffer is dropped silently
        if let Some(line) = telemetry::encode(&event) {
            transmit(&mut tx, line.as_bytes()).await;
        }
    }
}

async fn transmit(tx: &mut BufferedUartTx, bytes: &[u8]) {
    match with_timeout(TX_TIMEOUT, tx.write_all(bytes)).await {
        Ok(Ok(())) => {}
        Ok(Err(error)) => warn!("uart write error: {}", error),
        Err(_) => warn!("uart write timed out, line dropped"),
    }
}
