//! The ping/pong demo client of the link channel.
//!
//! Everything here is application logic riding on a channel: the payload
//! scheme, the reply verification and the round-trip bookkeeping. The
//! channel itself only moves bytes between the two peers.
//!
//! Both loops are generic over the channel's substrate, so the crate's own
//! tests run them back to back over an in-memory loopback pair.

mod pattern;
mod report;

pub mod config;

pub use report::Report;

use std::time::Instant;

use ethlink::channel::{Error, Link, LinkChannel};

/// Smallest payload the pattern supports.
pub const MIN_SIZE: usize = pattern::HEADER_LEN;

/// Largest payload the responder accepts.
pub const MTU: usize = 1500;

/// Failures of the demo exchange itself.
#[derive(Debug, thiserror::Error)]
pub enum PingError {
    /// The channel failed underneath the exchange.
    #[error("link channel failure: {0}")]
    Channel(#[from] Error),
    /// Payload size below the eight-byte pattern minimum.
    #[error("payload size {0} is below the eight-byte minimum")]
    SizeTooSmall(usize),
    /// A reply arrived but did not match the expected pong payload.
    #[error("reply for round {round} does not match the expected pong")]
    ReplyMismatch {
        /// The round whose reply came back wrong.
        round: u32,
    },
}

/// Run `count` round trips of `size`-byte payloads over the channel.
///
/// Each round sends one request and blocks for the matching reply; a reply
/// with the wrong body fails the run as [`PingError::ReplyMismatch`].
/// Channel errors, including a configured receive timeout running out,
/// pass through.
pub fn ping<S: Link>(
    channel: &mut LinkChannel<S>,
    count: usize,
    size: usize,
) -> Result<Report, PingError> {
    if size < MIN_SIZE {
        return Err(PingError::SizeTooSmall(size));
    }

    let mut request = vec![0; size];
    let mut expected = vec![0; size];
    let mut reply = vec![0; size];
    let mut report = Report::with_capacity(count);

    for round in 0..count as u32 {
        pattern::ping(&mut request, round);
        pattern::pong(&mut expected, round);

        let start = Instant::now();
        channel.send(&request)?;
        let len = channel.receive(&mut reply)?;
        let rtt = start.elapsed();

        if reply[..len] != expected[..] {
            return Err(PingError::ReplyMismatch { round });
        }
        report.record(rtt);
    }

    Ok(report)
}

/// Answer requests until the channel fails.
///
/// Every received `ping` payload is answered with the `pong` payload of
/// the same round and length. Payloads that are no requests are logged and
/// ignored; the conversation partner may be probing with something else.
pub fn pong<S: Link>(channel: &mut LinkChannel<S>) -> Result<(), PingError> {
    let mut request = vec![0; MTU];

    loop {
        let len = channel.receive(&mut request)?;
        match pattern::round_of(&request[..len]) {
            Some(round) => {
                let mut reply = vec![0; len];
                pattern::pong(&mut reply, round);
                channel.send(&reply)?;
            }
            None => tracing::debug!(len, "ignoring a frame that is not a request"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    use ethlink::channel::{loopback, ChannelConfig, Link, Remote};
    use ethlink::wire::{Address, EtherType};

    const ADDR_A: Address = Address([0x02, 0, 0, 0, 0, 0x0a]);
    const ADDR_B: Address = Address([0x02, 0, 0, 0, 0, 0x0b]);
    const TYPE: EtherType = EtherType(0xDEAD);

    fn config(peer: Address) -> ChannelConfig {
        ChannelConfig {
            interface: "lo0".into(),
            ethertype: TYPE,
            peer,
            recv_timeout: None,
        }
    }

    #[test]
    fn full_exchange_over_a_loopback_pair() {
        let (a, b) = loopback::pair(ADDR_A, ADDR_B);
        let mut initiator = LinkChannel::with_link(a, 0, &config(ADDR_B));
        let responder = LinkChannel::with_link(b, 0, &config(ADDR_A));

        let answering = thread::spawn(move || {
            let mut responder = responder;
            // Ends with a channel error once the initiator hangs up.
            let _ = pong(&mut responder);
        });

        let report = ping(&mut initiator, 5, 32).unwrap();
        assert_eq!(report.count(), 5);

        initiator.close().unwrap();
        answering.join().unwrap();
    }

    #[test]
    fn short_payloads_are_rejected() {
        let (a, _b) = loopback::pair(ADDR_A, ADDR_B);
        let mut initiator = LinkChannel::with_link(a, 0, &config(ADDR_B));

        match ping(&mut initiator, 1, MIN_SIZE - 1) {
            Err(PingError::SizeTooSmall(size)) => assert_eq!(size, MIN_SIZE - 1),
            other => panic!("expected SizeTooSmall, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn wrong_replies_fail_the_run() {
        let (a, mut b) = loopback::pair(ADDR_A, ADDR_B);
        let mut initiator = LinkChannel::with_link(a, 0, &config(ADDR_B));

        // Queue a reply for the wrong round before the run starts.
        let mut stale = vec![0; 16];
        pattern::pong(&mut stale, 7);
        let remote = Remote { protocol: TYPE, ifindex: 0, address: ADDR_A };
        b.transmit(&stale, &remote).unwrap();

        match ping(&mut initiator, 1, 16) {
            Err(PingError::ReplyMismatch { round: 0 }) => (),
            other => panic!("expected ReplyMismatch, got {:?}", other.map(|_| ())),
        }
    }
}
