//! The ping/pong payload scheme.
//!
//! A payload is a four-byte direction prefix, a big-endian round counter,
//! and a repeating fill up to the requested size. The responder echoes
//! everything after the prefix unchanged, so the initiator verifies a
//! reply by rebuilding the expected bytes and comparing.

use byteorder::{ByteOrder, NetworkEndian};

/// Fixed bytes before the fill: four of prefix, four of round counter.
pub const HEADER_LEN: usize = 8;

const FILL: &[u8] = b"0123456789";

/// Fill `buf` with the request payload for `round`.
///
/// # Panics
/// Panics if `buf` is shorter than [`HEADER_LEN`].
pub fn ping(buf: &mut [u8], round: u32) {
    fill(buf, b"ping", round)
}

/// Fill `buf` with the reply matching a request of the same round.
pub fn pong(buf: &mut [u8], round: u32) {
    fill(buf, b"pong", round)
}

fn fill(buf: &mut [u8], prefix: &[u8; 4], round: u32) {
    buf[..4].copy_from_slice(prefix);
    NetworkEndian::write_u32(&mut buf[4..HEADER_LEN], round);
    buf[HEADER_LEN..]
        .chunks_mut(FILL.len())
        .for_each(|chunk| chunk.copy_from_slice(&FILL[..chunk.len()]));
}

/// Parse the round counter out of a payload, if it is a request.
pub fn round_of(payload: &[u8]) -> Option<u32> {
    if payload.len() >= HEADER_LEN && &payload[..4] == b"ping" {
        Some(NetworkEndian::read_u32(&payload[4..HEADER_LEN]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_and_reply_differ_only_in_the_prefix() {
        let mut request = [0; 24];
        let mut reply = [0; 24];
        ping(&mut request, 7);
        pong(&mut reply, 7);

        assert_eq!(&request[..4], b"ping");
        assert_eq!(&reply[..4], b"pong");
        assert_eq!(&request[4..], &reply[4..]);
    }

    #[test]
    fn round_survives_the_trip() {
        let mut request = [0; HEADER_LEN];
        ping(&mut request, 0xDEAD_BEEF);
        assert_eq!(round_of(&request), Some(0xDEAD_BEEF));
    }

    #[test]
    fn non_requests_are_not_requests() {
        let mut reply = [0; 16];
        pong(&mut reply, 1);
        assert_eq!(round_of(&reply), None);
        assert_eq!(round_of(b"ping"), None); // too short for a counter
    }

    #[test]
    fn fill_repeats_whatever_the_size() {
        let mut request = [0; 21];
        ping(&mut request, 0);
        assert_eq!(&request[HEADER_LEN..18], b"0123456789");
        assert_eq!(&request[18..], b"012");
    }
}
