//! A software substrate connecting two channels in memory.
use std::sync::mpsc;
use std::time::Duration;

use crate::sys::Errno;
use crate::wire::{Address, EtherType, HardwareType, Origin};

use super::filter::{Delivery, ADDR_LEN};
use super::{Error, Link, Remote};

/// One endpoint of an in-memory link.
///
/// [`pair`] wires two endpoints back to back. A frame sent through one
/// pops out of the other carrying the metadata a packet socket would have
/// attached: the sender's address, the frame type, and an origin computed
/// from the destination the frame was sent to. That makes the pair a
/// stand-in substrate for exercising a whole channel, filter loop
/// included, without an interface or `CAP_NET_RAW`.
///
/// A hung-up peer (its endpoint dropped) is reported as `ENOTCONN` on both
/// the send and the receive side.
#[derive(Debug)]
pub struct Loopback {
    address: Address,
    tx: mpsc::Sender<Frame>,
    rx: mpsc::Receiver<Frame>,
}

#[derive(Debug)]
struct Frame {
    payload: Vec<u8>,
    sender: Address,
    protocol: EtherType,
    destination: Address,
}

/// Create two endpoints connected to each other.
///
/// Each endpoint stamps outgoing frames with its own hardware address.
pub fn pair(a: Address, b: Address) -> (Loopback, Loopback) {
    let (a_tx, b_rx) = mpsc::channel();
    let (b_tx, a_rx) = mpsc::channel();
    (
        Loopback { address: a, tx: a_tx, rx: a_rx },
        Loopback { address: b, tx: b_tx, rx: b_rx },
    )
}

impl Loopback {
    /// The hardware address this endpoint stamps on outgoing frames.
    pub fn address(&self) -> Address {
        self.address
    }

    fn classify(&self, destination: Address) -> Origin {
        if destination == self.address {
            Origin::Host
        } else if destination.is_broadcast() {
            Origin::Broadcast
        } else if destination.is_multicast() {
            Origin::Multicast
        } else {
            Origin::OtherHost
        }
    }
}

impl Link for Loopback {
    fn transmit(&mut self, frame: &[u8], remote: &Remote) -> Result<usize, Error> {
        self.tx
            .send(Frame {
                payload: frame.to_vec(),
                sender: self.address,
                protocol: remote.protocol,
                destination: remote.address,
            })
            .map_err(|_| Error::SendFailed(Errno(libc::ENOTCONN)))?;
        Ok(frame.len())
    }

    fn deliver(
        &mut self,
        buffer: &mut [u8],
        patience: Option<Duration>,
    ) -> Result<(usize, Delivery), Error> {
        let frame = match patience {
            Some(timeout) => self.rx.recv_timeout(timeout).map_err(|err| match err {
                mpsc::RecvTimeoutError::Timeout => Error::ReceiveTimedOut,
                mpsc::RecvTimeoutError::Disconnected => {
                    Error::ReceiveFailed(Errno(libc::ENOTCONN))
                }
            })?,
            None => self.rx
                .recv()
                .map_err(|_| Error::ReceiveFailed(Errno(libc::ENOTCONN)))?,
        };

        let len = frame.payload.len().min(buffer.len());
        buffer[..len].copy_from_slice(&frame.payload[..len]);

        let mut address = [0; 8];
        address[..usize::from(ADDR_LEN)].copy_from_slice(frame.sender.as_bytes());
        let delivery = Delivery {
            hardware_type: HardwareType::Ether,
            address_len: ADDR_LEN,
            address,
            protocol: frame.protocol,
            origin: self.classify(frame.destination),
        };
        Ok((len, delivery))
    }

    fn shutdown(self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_A: Address = Address([0x02, 0, 0, 0, 0, 0x0a]);
    const ADDR_B: Address = Address([0x02, 0, 0, 0, 0, 0x0b]);

    fn remote_to(address: Address) -> Remote {
        Remote { protocol: EtherType(0xDEAD), ifindex: 0, address }
    }

    #[test]
    fn frames_carry_sender_and_protocol() {
        let (mut a, mut b) = pair(ADDR_A, ADDR_B);
        a.transmit(b"hello", &remote_to(ADDR_B)).unwrap();

        let mut buf = [0; 8];
        let (len, delivery) = b.deliver(&mut buf, None).unwrap();
        assert_eq!(len, 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(delivery.sender(), Some(ADDR_A));
        assert_eq!(delivery.protocol, EtherType(0xDEAD));
        assert_eq!(delivery.origin, Origin::Host);
    }

    #[test]
    fn destination_decides_the_origin() {
        let (mut a, mut b) = pair(ADDR_A, ADDR_B);
        let mut buf = [0; 8];

        a.transmit(b"x", &remote_to(Address::BROADCAST)).unwrap();
        let (_, delivery) = b.deliver(&mut buf, None).unwrap();
        assert_eq!(delivery.origin, Origin::Broadcast);

        a.transmit(b"x", &remote_to(Address([0x02, 0, 0, 0, 0, 0x0c]))).unwrap();
        let (_, delivery) = b.deliver(&mut buf, None).unwrap();
        assert_eq!(delivery.origin, Origin::OtherHost);
    }

    #[test]
    fn short_buffers_truncate() {
        let (mut a, mut b) = pair(ADDR_A, ADDR_B);
        a.transmit(b"oversize", &remote_to(ADDR_B)).unwrap();

        let mut buf = [0; 4];
        let (len, _) = b.deliver(&mut buf, None).unwrap();
        assert_eq!(len, 4);
        assert_eq!(&buf, b"over");
    }
}
