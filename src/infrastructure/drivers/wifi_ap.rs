//! Wi-Fi soft-AP bring-up for the setup portal.
//!
//! Static IP configuration, a WPA2 access point whose SSID carries the chip
//! id, the embassy-net stack runner, and the DHCP lease server that points
//! joining clients at the device for DNS.

use embassy_executor::Spawner;
use embassy_net::{
    Ipv4Address,
    Ipv4Cidr,
    Runner,
    Stack,
    StackResources,
    StaticConfigV4,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_radio::wifi::{
    AccessPointConfig,
    AuthMethod,
    Config,
    ModeConfig,
    WifiController,
    WifiDevice,
};
use static_cell::make_static;

use super::random::get_seed;
use crate::core::net::dhcp::{
    DHCP_ACK,
    DHCP_DISCOVER,
    DHCP_OFFER,
    DHCP_REQUEST,
    allocate_ip,
    build_dhcp_response,
    parse_dhcp_request,
};

/// DHCP server and client ports
const DHCP_SERVER_PORT: u16 = 67;
const DHCP_CLIENT_PORT: u16 = 68;

const MAX_CONNECTIONS: usize = 6;

pub struct WifiApConfig {
    pub ssid: heapless::String<32>,
    pub password: &'static str,
    pub ip_address: Ipv4Address,
    pub prefix_len: u8,
}

/// Initialize the network stack for AP (Access Point) mode.
///
/// Uses a static IP configuration suitable for a captive portal; the device
/// is its own gateway. Returns once the link is up and the DHCP server
/// is listening.
pub async fn start_wifi_ap(
    spawner: Spawner,
    wifi_device: WIFI<'static>,
    config: WifiApConfig,
) -> Stack<'static> {
    let esp_radio_ctrl = &*make_static!(esp_radio::init().unwrap());
    let (controller, interfaces) =
        esp_radio::wifi::new(esp_radio_ctrl, wifi_device, Config::default()).unwrap();

    let static_config = StaticConfigV4 {
        address: Ipv4Cidr::new(config.ip_address, config.prefix_len),
        gateway: Some(config.ip_address),
        dns_servers: heapless::Vec::default(),
    };
    let net_config = embassy_net::Config::ipv4_static(static_config);

    let network_resources = make_static!(StackResources::<MAX_CONNECTIONS>::new());
    let (stack, runner) =
        embassy_net::new(interfaces.ap, net_config, network_resources, get_seed());

    spawner
        .spawn(wifi_ap_task(controller, config.ssid, config.password))
        .ok();
    spawner.spawn(network_runner_task(runner)).ok();

    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(100)).await;
    }
    // Give some extra time
    Timer::after(Duration::from_millis(100)).await;

    spawner
        .spawn(dhcp_server_task(stack, config.ip_address))
        .ok();

    stack
}

/// SSID with the chip id appended, e.g. `ESP-MOBL-0A1B2C3D`.
///
/// The chip id is taken from the factory MAC so every device advertises a
/// unique network.
pub fn device_ssid(prefix: &str) -> heapless::String<32> {
    use core::fmt::Write;

    let mac = esp_hal::efuse::Efuse::mac_address();
    let chip_id = u32::from_be_bytes([mac[2], mac[3], mac[4], mac[5]]);
    let mut ssid = heapless::String::new();
    let _ = write!(ssid, "{}-{:08X}", prefix, chip_id);
    ssid
}

/// Background task keeping the Wi-Fi controller in AP mode.
#[embassy_executor::task]
async fn wifi_ap_task(
    mut controller: WifiController<'static>,
    ssid: heapless::String<32>,
    password: &'static str,
) {
    log::info!("wifi_ap: starting AP with SSID '{}'", ssid.as_str());

    let ap_config = AccessPointConfig::default()
        .with_ssid(ssid.as_str().into())
        .with_auth_method(AuthMethod::Wpa2Personal)
        .with_password(password.into());

    controller.set_config(&ModeConfig::AccessPoint(ap_config)).unwrap();
    controller.start_async().await.unwrap();

    log::info!("wifi_ap: AP started");

    // Keep the AP running
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

/// Background task for running the network stack
#[embassy_executor::task]
async fn network_runner_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

/// DHCP server task
///
/// Listens for discover/request messages and answers with offers/acks.
/// Allocation is stateless, derived from the client MAC address.
#[embassy_executor::task]
async fn dhcp_server_task(stack: Stack<'static>, ap_ip_address: Ipv4Address) {
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

    if let Err(e) = socket.bind(DHCP_SERVER_PORT) {
        log::error!("dhcp_server: failed to bind port {}: {:?}", DHCP_SERVER_PORT, e);
        return;
    }
    log::info!("dhcp_server: listening on port {}", DHCP_SERVER_PORT);

    let mut packet = [0u8; 576];

    loop {
        match socket.recv_from(&mut packet).await {
            Ok((len, _remote)) => {
                let Some(request) = parse_dhcp_request(&packet[..len]) else {
                    continue;
                };

                let offered_ip = allocate_ip(ap_ip_address, &request.client_mac);
                let response_type = match request.message_type {
                    DHCP_DISCOVER => DHCP_OFFER,
                    DHCP_REQUEST => DHCP_ACK,
                    other => {
                        log::debug!("dhcp_server: ignoring message type {}", other);
                        continue;
                    }
                };

                let response_len = build_dhcp_response(
                    ap_ip_address,
                    &mut packet,
                    &request,
                    offered_ip,
                    response_type,
                );

                let dest = (Ipv4Address::BROADCAST, DHCP_CLIENT_PORT);
                if let Err(e) = socket.send_to(&packet[..response_len], dest).await {
                    log::warn!("dhcp_server: send error: {:?}", e);
                }
            }
            Err(e) => {
                log::warn!("dhcp_server: recv error: {:?}", e);
            }
        }
    }
}
