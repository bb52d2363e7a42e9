//! DNS responder codec
//!
//! Byte-level parsing and answering for the captive-portal name service:
//! every well-formed standard query gets a single A record pointing at the
//! device itself, so any browsing attempt lands on the setup page.

use embassy_net::Ipv4Address;

/// Flag bits of the second header word.
const FLAG_RESPONSE: u16 = 0x8000;
const FLAG_OPCODE_MASK: u16 = 0x7800;
const FLAG_AUTHORITATIVE: u16 = 0x0400;
const FLAG_RECURSION_DESIRED: u16 = 0x0100;

/// Answer record constants.
const TYPE_A: u16 = 1;
const CLASS_IN: u16 = 1;
const ANSWER_TTL: u32 = 60;

/// Fixed DNS header length.
const HEADER_SIZE: usize = 12;

/// Compression pointer to the name in the question section.
const NAME_POINTER: u16 = 0xC00C;

/// Buffer size for one query plus the appended answer.
pub(crate) const MAX_RESPONSE_SIZE: usize = 512;

/// A validated standard query.
#[derive(Debug)]
pub(crate) struct DnsQuery {
    /// End of the question section (header + encoded name + type/class).
    pub question_end: usize,
    /// Echoed back in the response flags.
    pub recursion_desired: bool,
}

/// Parse a DNS packet as a standard query.
///
/// Returns `None` for responses, non-standard opcodes, empty question
/// sections and truncated packets.
pub(crate) fn parse_dns_query(packet: &[u8]) -> Option<DnsQuery> {
    if packet.len() < HEADER_SIZE {
        return None;
    }

    let flags = u16::from_be_bytes([packet[2], packet[3]]);
    if flags & FLAG_RESPONSE != 0 || flags & FLAG_OPCODE_MASK != 0 {
        return None;
    }

    let question_count = u16::from_be_bytes([packet[4], packet[5]]);
    if question_count == 0 {
        return None;
    }

    // Walk the first question's label sequence to its root terminator.
    let mut i = HEADER_SIZE;
    loop {
        let len = *packet.get(i)? as usize;
        if len == 0 {
            i += 1;
            break;
        }
        // Compressed names never occur in a query's question section.
        if len & 0xC0 != 0 {
            return None;
        }
        i += 1 + len;
    }

    // QTYPE + QCLASS
    let question_end = i + 4;
    if packet.len() < question_end {
        return None;
    }

    Some(DnsQuery {
        question_end,
        recursion_desired: flags & FLAG_RECURSION_DESIRED != 0,
    })
}

/// Turn the query held in `packet` into its answer, in place.
///
/// The transaction id and question section stay verbatim; the header is
/// rewritten as an authoritative response and one A record with the portal
/// address is appended. Returns the response length, or `None` when the
/// buffer cannot hold the answer.
pub(crate) fn build_dns_response(
    packet: &mut [u8],
    query: &DnsQuery,
    address: Ipv4Address,
) -> Option<usize> {
    let answer_end = query.question_end + 16;
    if packet.len() < answer_end {
        return None;
    }

    let mut flags = FLAG_RESPONSE | FLAG_AUTHORITATIVE;
    if query.recursion_desired {
        flags |= FLAG_RECURSION_DESIRED;
    }
    packet[2..4].copy_from_slice(&flags.to_be_bytes());

    // One question, one answer, no authority or additional records.
    packet[4..6].copy_from_slice(&1u16.to_be_bytes());
    packet[6..8].copy_from_slice(&1u16.to_be_bytes());
    packet[8..10].copy_from_slice(&0u16.to_be_bytes());
    packet[10..12].copy_from_slice(&0u16.to_be_bytes());

    let mut i = query.question_end;
    packet[i..i + 2].copy_from_slice(&NAME_POINTER.to_be_bytes());
    i += 2;
    packet[i..i + 2].copy_from_slice(&TYPE_A.to_be_bytes());
    i += 2;
    packet[i..i + 2].copy_from_slice(&CLASS_IN.to_be_bytes());
    i += 2;
    packet[i..i + 4].copy_from_slice(&ANSWER_TTL.to_be_bytes());
    i += 4;
    packet[i..i + 2].copy_from_slice(&4u16.to_be_bytes());
    i += 2;
    packet[i..i + 4].copy_from_slice(&address.octets());
    i += 4;

    Some(i)
}
