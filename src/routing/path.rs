//! Request path decoding ahead of matching.
//!
//! # Design Decisions
//! - Matching runs on the decoded path, so a percent-encoded literal such as
//!   `/caf%C3%A9` reaches the `/café` route
//! - `%2F` and `%25` stay encoded: an encoded slash never splits a segment, and
//!   captures decode both when they are bound
//! - A stray `%` that starts no valid escape is re-encoded as `%25`, so the
//!   second decode of a capture gives it back unchanged

use std::borrow::Cow;

/// Decode every escape in `raw` except the ones for `/` and `%`.
///
/// Returns `Cow::Borrowed` when `raw` holds no `%` at all.
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let escaped = match bytes[i] {
            b'%' => bytes.get(i + 1..i + 3).and_then(hex_byte),
            _ => None,
        };
        match (bytes[i], escaped) {
            (_, Some(b'/')) => {
                decoded.extend_from_slice(b"%2F");
                i += 3;
            }
            (_, Some(b'%')) => {
                decoded.extend_from_slice(b"%25");
                i += 3;
            }
            (_, Some(byte)) => {
                decoded.push(byte);
                i += 3;
            }
            (b'%', None) => {
                decoded.extend_from_slice(b"%25");
                i += 1;
            }
            (byte, None) => {
                decoded.push(byte);
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

fn hex_byte(pair: &[u8]) -> Option<u8> {
    let hi = char::from(pair[0]).to_digit(16)?;
    let lo = char::from(pair[1]).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}
