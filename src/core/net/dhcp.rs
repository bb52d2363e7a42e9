//! DHCP responder codec
//!
//! Message parsing and response building for the stateless lease server
//! that backs the setup access point. Leases are derived from the client
//! MAC, so no allocation table is needed; the device advertises itself as
//! router and DNS server, which is what makes the portal capture work.

use embassy_net::Ipv4Address;

/// DHCP message types.
pub(crate) const DHCP_DISCOVER: u8 = 1;
pub(crate) const DHCP_OFFER: u8 = 2;
pub(crate) const DHCP_REQUEST: u8 = 3;
pub(crate) const DHCP_ACK: u8 = 5;

/// DHCP option codes.
const OPTION_SUBNET_MASK: u8 = 1;
const OPTION_ROUTER: u8 = 3;
const OPTION_DNS: u8 = 6;
const OPTION_LEASE_TIME: u8 = 51;
const OPTION_MESSAGE_TYPE: u8 = 53;
const OPTION_SERVER_ID: u8 = 54;
const OPTION_END: u8 = 255;

/// Marks the start of the options section.
const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const LEASE_TIME_SECS: u32 = 3600;
const SUBNET_MASK: Ipv4Address = Ipv4Address::new(255, 255, 255, 0);

/// BOOTP header plus magic cookie.
const MIN_PACKET_SIZE: usize = 240;

/// A parsed client message.
#[derive(Debug)]
pub(crate) struct DhcpRequest {
    pub xid: [u8; 4],
    pub client_mac: [u8; 6],
    pub message_type: u8,
}

/// Parse a BOOTREQUEST carrying a DHCP message type option.
pub(crate) fn parse_dhcp_request(packet: &[u8]) -> Option<DhcpRequest> {
    if packet.len() < MIN_PACKET_SIZE || packet[0] != 1 {
        return None;
    }
    if packet[236..240] != MAGIC_COOKIE {
        return None;
    }

    let mut xid = [0u8; 4];
    xid.copy_from_slice(&packet[4..8]);
    let mut client_mac = [0u8; 6];
    client_mac.copy_from_slice(&packet[28..34]);

    let message_type = find_option(&packet[240..], OPTION_MESSAGE_TYPE)
        .and_then(|data| data.first().copied())?;

    Some(DhcpRequest {
        xid,
        client_mac,
        message_type,
    })
}

/// Derive a stable client address from the MAC, inside the portal's /24.
///
/// Host part ranges over .2 to .50, keeping clear of the device address.
pub(crate) fn allocate_ip(server: Ipv4Address, mac: &[u8; 6]) -> Ipv4Address {
    let [a, b, c, _] = server.octets();
    Ipv4Address::new(a, b, c, (mac[5] % 49) + 2)
}

/// Build an OFFER or ACK for `request` into `buffer`, returning its length.
pub(crate) fn build_dhcp_response(
    server: Ipv4Address,
    buffer: &mut [u8],
    request: &DhcpRequest,
    offered_ip: Ipv4Address,
    response_type: u8,
) -> usize {
    buffer.fill(0);

    // BOOTREPLY over Ethernet.
    buffer[0] = 2;
    buffer[1] = 1;
    buffer[2] = 6;
    buffer[4..8].copy_from_slice(&request.xid);
    // Broadcast flag: the client has no address to unicast to yet.
    buffer[10] = 0x80;
    // yiaddr / siaddr / chaddr
    buffer[16..20].copy_from_slice(&offered_ip.octets());
    buffer[20..24].copy_from_slice(&server.octets());
    buffer[28..34].copy_from_slice(&request.client_mac);
    buffer[236..240].copy_from_slice(&MAGIC_COOKIE);

    let mut i = 240;
    i = write_option(buffer, i, OPTION_MESSAGE_TYPE, &[response_type]);
    i = write_option(buffer, i, OPTION_SERVER_ID, &server.octets());
    i = write_option(buffer, i, OPTION_LEASE_TIME, &LEASE_TIME_SECS.to_be_bytes());
    i = write_option(buffer, i, OPTION_SUBNET_MASK, &SUBNET_MASK.octets());
    i = write_option(buffer, i, OPTION_ROUTER, &server.octets());
    i = write_option(buffer, i, OPTION_DNS, &server.octets());
    buffer[i] = OPTION_END;
    i + 1
}

fn write_option(buffer: &mut [u8], at: usize, code: u8, data: &[u8]) -> usize {
    buffer[at] = code;
    buffer[at + 1] = data.len() as u8;
    buffer[at + 2..at + 2 + data.len()].copy_from_slice(data);
    at + 2 + data.len()
}

/// Find an option's data in the section following the magic cookie.
fn find_option(options: &[u8], wanted: u8) -> Option<&[u8]> {
    let mut i = 0;
    while i < options.len() {
        let code = options[i];
        if code == OPTION_END {
            break;
        }
        if code == 0 {
            i += 1;
            continue;
        }
        let len = *options.get(i + 1)? as usize;
        let data = options.get(i + 2..i + 2 + len)?;
        if code == wanted {
            return Some(data);
        }
        i += 2 + len;
    }
    None
}
