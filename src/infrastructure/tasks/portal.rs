//! The portal loop - the firmware's cooperative scheduler.
//!
//! One execution context drives all three duties: name resolution, HTTP
//! service and blink timing. The DNS and HTTP service loops are pinned once
//! and selected against a timer bounded by the sequencer's wait budget, so
//! a request is picked up the moment it arrives and no wait ever exceeds
//! the dot duration. Neither service loop ever sleeps; the select below is
//! the only timed wait in the system, and a text update published by the
//! HTTP handler is picked up at the tick of the very pass that serviced it.

use core::pin::pin;

use embassy_futures::select::{Either3, select3};
use embassy_net::{
    Stack,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Instant, Timer};
use esp_hal::gpio::{Level, Output, OutputConfig};
use esp_hal::peripherals::{GPIO2, GPIO4};
use morse_core::BlinkSequencer;

use crate::config::{AP_ADDRESS, DNS_PORT, HTTP_PORT};
use crate::controllers::portal::{PortalHttpController, take_pending_sequence};
use crate::core::net::dns::{MAX_RESPONSE_SIZE, build_dns_response, parse_dns_query};
use crate::core::net::http::HttpServer;

const HTTP_RX_BUFFER_SIZE: usize = 1024;
const HTTP_TX_BUFFER_SIZE: usize = 2048;

/// Run the portal loop forever on the current execution context.
///
/// `led` is the external, active-high LED; `led_inverted` the onboard,
/// active-low one. Both always show the same logical pin state.
pub async fn run(
    stack: Stack<'static>,
    mut sequencer: BlinkSequencer,
    led: GPIO2<'static>,
    led_inverted: GPIO4<'static>,
) {
    let mut led = Output::new(led, Level::Low, OutputConfig::default());
    let mut led_inverted = Output::new(led_inverted, Level::High, OutputConfig::default());

    let handler = PortalHttpController;
    let server = HttpServer::new(&handler);
    let mut http_rx = [0u8; HTTP_RX_BUFFER_SIZE];
    let mut http_tx = [0u8; HTTP_TX_BUFFER_SIZE];

    let mut http_service =
        pin!(server.listen_and_serve(stack, HTTP_PORT, &mut http_rx, &mut http_tx));
    let mut name_service = pin!(serve_name_queries(stack));

    log::info!("portal: serving DNS and HTTP, blinking");

    let mut last_pass = Instant::now();
    loop {
        // Wait for network progress or the next blink deadline, whichever
        // comes first. The service futures never complete; they yield here
        // whenever they would block.
        let budget = sequencer.poll_budget();
        match select3(&mut name_service, &mut http_service, Timer::after(budget)).await {
            Either3::First(()) | Either3::Second(()) | Either3::Third(()) => {}
        }

        // A text update from the handler replaces the sequence at the step
        // boundary; the abandoned blink is never resumed.
        if let Some(sequence) = take_pending_sequence() {
            sequencer.install(sequence);
        }

        let now = Instant::now();
        let pin = sequencer.tick(now - last_pass);
        last_pass = now;

        let level = if pin.is_on() { Level::High } else { Level::Low };
        led.set_level(level);
        led_inverted.set_level(!level);
    }
}

/// Answer every name query with the portal address.
async fn serve_name_queries(stack: Stack<'static>) {
    let mut rx_meta = [PacketMetadata::EMPTY; 8];
    let mut rx_buffer = [0u8; 1024];
    let mut tx_meta = [PacketMetadata::EMPTY; 8];
    let mut tx_buffer = [0u8; 1024];

    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );

    if let Err(e) = socket.bind(DNS_PORT) {
        log::error!("dns: failed to bind port {}: {:?}", DNS_PORT, e);
        // Nothing to serve; park forever so the portal loop keeps running.
        loop {
            Timer::after(embassy_time::Duration::from_secs(3600)).await;
        }
    }
    log::info!("dns: resolving all names to {}", AP_ADDRESS);

    let mut packet = [0u8; MAX_RESPONSE_SIZE];

    loop {
        match socket.recv_from(&mut packet).await {
            Ok((len, remote)) => {
                let Some(query) = parse_dns_query(&packet[..len]) else {
                    continue;
                };
                let Some(response_len) = build_dns_response(&mut packet, &query, AP_ADDRESS)
                else {
                    continue;
                };
                if let Err(e) = socket.send_to(&packet[..response_len], remote).await {
                    log::warn!("dns: send error: {:?}", e);
                }
            }
            Err(e) => {
                log::warn!("dns: recv error: {:?}", e);
            }
        }
    }
}
