//! `application/x-www-form-urlencoded` body decoding.

use heapless::String;

/// Extract and percent-decode the value of `name` from a form body.
///
/// Returns `None` when the field is missing. Values longer than `N` bytes
/// are truncated; a value that does not decode to UTF-8 becomes empty, which
/// downstream normalization treats like any other unusable input.
pub(crate) fn form_field<const N: usize>(body: &[u8], name: &str) -> Option<String<N>> {
    for pair in body.split(|&b| b == b'&') {
        let mut parts = pair.splitn(2, |&b| b == b'=');
        let key = parts.next().unwrap_or(&[]);
        if key != name.as_bytes() {
            continue;
        }
        let value = parts.next().unwrap_or(&[]);
        return Some(decode_component(value));
    }
    None
}

fn decode_component<const N: usize>(raw: &[u8]) -> String<N> {
    let mut bytes = heapless::Vec::<u8, N>::new();
    let mut i = 0;
    while i < raw.len() {
        let (decoded, step) = match raw[i] {
            b'+' => (b' ', 1),
            b'%' => match (hex_value(raw.get(i + 1)), hex_value(raw.get(i + 2))) {
                (Some(hi), Some(lo)) => (hi << 4 | lo, 3),
                // Malformed escape: keep the byte, the normalizer drops it.
                _ => (b'%', 1),
            },
            other => (other, 1),
        };
        if bytes.push(decoded).is_err() {
            break;
        }
        i += step;
    }

    let mut out = String::new();
    if let Ok(s) = core::str::from_utf8(&bytes) {
        let _ = out.push_str(s);
    }
    out
}

fn hex_value(b: Option<&u8>) -> Option<u8> {
    match *b? {
        b @ b'0'..=b'9' => Some(b - b'0'),
        b @ b'a'..=b'f' => Some(b - b'a' + 10),
        b @ b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
