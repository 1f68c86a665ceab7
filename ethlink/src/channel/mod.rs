//! The point-to-point link channel.
//!
//! A [`LinkChannel`] is one conversation: one socket, one interface, one
//! frame type, one peer, for the channel's entire lifetime. Frames from
//! anyone else, with any other tag, or not addressed to this host are
//! discarded inside [`receive`] as the steady-state noise of a shared
//! medium.
//!
//! The channel is synchronous and single-threaded. [`open`], [`send`] and
//! [`close`] do not block; [`receive`] suspends the calling thread until a
//! matching frame arrives, the substrate fails, or a configured timeout
//! runs out. A thread that needs a channel owns one; there is no shared
//! state between channels.
//!
//! [`open`]: LinkChannel::open
//! [`send`]: LinkChannel::send
//! [`receive`]: LinkChannel::receive
//! [`close`]: LinkChannel::close
use core::mem;
use std::os::unix::io::AsRawFd;
use std::time::{Duration, Instant};

pub mod loopback;
mod filter;

pub use self::filter::Delivery;

use crate::iface::{InterfaceHandle, NAME_MAX};
use crate::sys::{self, Errno, RawSocketDesc};
use crate::wire::{Address, EtherType, HardwareType, Origin};

use self::filter::{FrameFilter, Verdict};

/// Errors of channel setup and frame exchange.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The interface name does not fit the fixed-size name field.
    #[error("interface name of {0} bytes does not fit the 15-byte name field")]
    NameTooLong(usize),
    /// The OS refused to create a socket.
    #[error("unable to create a socket: {0}")]
    SocketCreateFailed(Errno),
    /// No interface answered to the requested name.
    #[error("unable to query the interface {name:?}: {errno}")]
    InterfaceNotFound {
        /// The name that was looked up.
        name: String,
        /// What the query failed with.
        errno: Errno,
    },
    /// An interface or a sender reported a non-Ethernet hardware type.
    #[error("hardware type {0} where Ethernet was expected")]
    UnexpectedHardwareType(HardwareType),
    /// Binding the socket to the interface and frame type failed.
    #[error("unable to bind to the interface and frame type: {0}")]
    BindFailed(Errno),
    /// The substrate rejected an outbound frame.
    #[error("unable to send a frame: {0}")]
    SendFailed(Errno),
    /// The substrate failed while waiting for an inbound frame.
    #[error("unable to receive a frame: {0}")]
    ReceiveFailed(Errno),
    /// No matching frame arrived within the configured receive timeout.
    #[error("no matching frame within the receive timeout")]
    ReceiveTimedOut,
    /// A sender address did not have the shape the substrate promises.
    #[error("sender address of {found} bytes where {expected} were expected")]
    MalformedAddress {
        /// The length the substrate contract fixes.
        expected: usize,
        /// The length that actually came back.
        found: usize,
    },
    /// The OS reported a failure while releasing the socket.
    #[error("unable to close the channel socket: {0}")]
    CloseFailed(Errno),
}

/// Caller-supplied parameters of one conversation.
///
/// Everything a channel is, comes from here; there are no compiled-in
/// interface names or peer addresses anywhere below.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Name of the interface to bind, at most 15 bytes.
    pub interface: String,
    /// Frame type tagging every frame of the conversation.
    pub ethertype: EtherType,
    /// Hardware address of the only peer.
    pub peer: Address,
    /// Bound on waiting inside [`LinkChannel::receive`].
    ///
    /// `None` keeps the minimal contract: with an absent peer, `receive`
    /// blocks indefinitely. With a timeout set, a call that sees no
    /// matching frame in time returns [`Error::ReceiveTimedOut`] instead.
    pub recv_timeout: Option<Duration>,
}

/// Link-layer destination of outbound frames, as handed to the substrate.
#[derive(Debug, Clone, Copy)]
pub struct Remote {
    /// Frame type, host byte order.
    pub protocol: EtherType,
    /// Index of the bound interface.
    pub ifindex: libc::c_int,
    /// Destination hardware address.
    pub address: Address,
}

/// The raw substrate a channel runs on.
///
/// The packet socket implements this for real traffic; the [`loopback`]
/// pair implements it in memory. A substrate moves whole frames and
/// reports, per inbound frame, the metadata the channel's filter judges.
pub trait Link {
    /// Transmit one frame to `remote`, returning the transmitted length.
    fn transmit(&mut self, frame: &[u8], remote: &Remote) -> Result<usize, Error>;

    /// Block until the substrate delivers one frame into `buffer`.
    ///
    /// With bounded `patience` the wait gives up as
    /// [`Error::ReceiveTimedOut`] once the duration runs out.
    fn deliver(
        &mut self,
        buffer: &mut [u8],
        patience: Option<Duration>,
    ) -> Result<(usize, Delivery), Error>;

    /// Release the substrate's resources, reporting the outcome.
    fn shutdown(self) -> Result<(), Error>;
}

impl Link for RawSocketDesc {
    fn transmit(&mut self, frame: &[u8], remote: &Remote) -> Result<usize, Error> {
        self.send_to(frame, remote.ifindex, remote.protocol.to_wire(), remote.address)
            .map_err(Error::SendFailed)
    }

    fn deliver(
        &mut self,
        buffer: &mut [u8],
        patience: Option<Duration>,
    ) -> Result<(usize, Delivery), Error> {
        if patience.is_some() {
            let readable = sys::wait(self.as_raw_fd(), patience)
                .map_err(Error::ReceiveFailed)?;
            if !readable {
                return Err(Error::ReceiveTimedOut);
            }
        }

        let (len, sockaddr, addrlen) = self.recv_from(buffer)
            .map_err(Error::ReceiveFailed)?;

        // The substrate fills in a whole sockaddr_ll; anything shorter
        // breaks the contract every later field read relies on.
        if addrlen as usize != mem::size_of::<libc::sockaddr_ll>() {
            return Err(Error::MalformedAddress {
                expected: mem::size_of::<libc::sockaddr_ll>(),
                found: addrlen as usize,
            });
        }

        let delivery = Delivery {
            hardware_type: HardwareType::from(sockaddr.sll_hatype),
            address_len: sockaddr.sll_halen,
            address: sockaddr.sll_addr,
            protocol: EtherType::from_wire(sockaddr.sll_protocol),
            origin: Origin::from(sockaddr.sll_pkttype),
        };
        Ok((len, delivery))
    }

    fn shutdown(self) -> Result<(), Error> {
        self.release().map_err(Error::CloseFailed)
    }
}

/// A live point-to-point conversation.
///
/// One channel owns one substrate, a single socket descriptor in the
/// default case, bound to one interface and frame type and talking to one
/// peer for its entire lifetime. [`open`] returns either a fully usable
/// channel or an error with nothing left to clean up. [`close`] consumes
/// the channel, so the descriptor is released exactly once on every path;
/// a second close does not compile.
///
/// [`open`]: #method.open
/// [`close`]: #method.close
#[derive(Debug)]
pub struct LinkChannel<S = RawSocketDesc> {
    link: S,
    remote: Remote,
    filter: FrameFilter,
    recv_timeout: Option<Duration>,
}

impl LinkChannel<RawSocketDesc> {
    /// Open a channel over a packet socket.
    ///
    /// Binds a fresh `AF_PACKET` socket to the named interface and the
    /// configured frame type. The interface name is validated before any
    /// OS call; every error path after socket creation releases the socket
    /// before returning.
    ///
    /// Emits a debug-level summary of the bound interface. The summary is
    /// diagnostic only, nothing depends on it.
    pub fn open(config: &ChannelConfig) -> Result<Self, Error> {
        if config.interface.len() > NAME_MAX {
            return Err(Error::NameTooLong(config.interface.len()));
        }

        let mut link = RawSocketDesc::new().map_err(Error::SocketCreateFailed)?;
        // From here on `link` owns the descriptor: every early return
        // below closes it on the way out.
        let iface = InterfaceHandle::resolve(&config.interface)?;
        link.bind_interface(iface.index, config.ethertype.to_wire())
            .map_err(Error::BindFailed)?;

        tracing::debug!(
            interface = %config.interface,
            index = iface.index,
            address = %iface.address,
            "bound link channel"
        );

        Ok(LinkChannel::with_link(link, iface.index, config))
    }
}

impl<S: Link> LinkChannel<S> {
    /// Wrap an already prepared substrate into a channel.
    ///
    /// The substrate must be bound or connected on its own terms;
    /// [`open`] is the packet-socket front end of this. The in-memory
    /// [`loopback`] endpoints pass `0` for the interface index.
    ///
    /// [`open`]: #method.open
    pub fn with_link(link: S, ifindex: libc::c_int, config: &ChannelConfig) -> Self {
        LinkChannel {
            link,
            remote: Remote {
                protocol: config.ethertype,
                ifindex,
                address: config.peer,
            },
            filter: FrameFilter::new(config.ethertype, config.peer),
            recv_timeout: config.recv_timeout,
        }
    }

    /// The index of the bound interface.
    pub fn ifindex(&self) -> libc::c_int {
        self.remote.ifindex
    }

    /// The peer every frame goes to and comes from.
    pub fn peer(&self) -> Address {
        self.remote.address
    }

    /// The frame type of the conversation.
    pub fn ethertype(&self) -> EtherType {
        self.remote.protocol
    }

    /// Send one frame of payload to the peer.
    ///
    /// One call, one frame, payload passed through unmodified. There is no
    /// size pre-validation: an oversize payload is the substrate's to
    /// reject, and its rejection comes back as [`Error::SendFailed`]. No
    /// retry, no state change.
    pub fn send(&mut self, payload: &[u8]) -> Result<usize, Error> {
        self.link.transmit(payload, &self.remote)
    }

    /// Block until the peer's next frame and copy its payload into
    /// `buffer`.
    ///
    /// Deliveries that do not belong to the conversation are discarded
    /// without surfacing: broadcast and other-host traffic, foreign frame
    /// types, foreign senders. A delivery with a non-Ethernet hardware
    /// type or a malformed address length ends the call with a hard error
    /// instead, since it means the bind is wrong or the substrate broke
    /// its contract.
    ///
    /// Without a configured [`ChannelConfig::recv_timeout`] and with an
    /// absent peer this blocks indefinitely; with one, the whole call
    /// observes a single deadline and gives up as
    /// [`Error::ReceiveTimedOut`].
    pub fn receive(&mut self, buffer: &mut [u8]) -> Result<usize, Error> {
        let deadline = self.recv_timeout.map(|timeout| Instant::now() + timeout);

        loop {
            let patience = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::ReceiveTimedOut);
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            let (len, delivery) = self.link.deliver(buffer, patience)?;
            match self.filter.judge(&delivery) {
                Verdict::Deliver => return Ok(len),
                Verdict::Discard(reason) => {
                    tracing::trace!(%reason, "discarded a delivery");
                }
                Verdict::Fault(error) => return Err(error),
            }
        }
    }

    /// Close the channel, releasing the substrate exactly once.
    ///
    /// Consuming the channel makes a second close unrepresentable. A
    /// failed OS-level close is reported, but the descriptor counts as
    /// released either way. A channel that is dropped instead releases its
    /// substrate silently.
    pub fn close(self) -> Result<(), Error> {
        self.link.shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::loopback;
    use super::*;

    const ADDR_A: Address = Address([0x02, 0x00, 0x00, 0x00, 0x00, 0x0a]);
    const ADDR_B: Address = Address([0x02, 0x00, 0x00, 0x00, 0x00, 0x0b]);
    const TYPE: EtherType = EtherType(0xDEAD);

    fn config(peer: Address, recv_timeout: Option<Duration>) -> ChannelConfig {
        ChannelConfig {
            interface: "lo0".into(),
            ethertype: TYPE,
            peer,
            recv_timeout,
        }
    }

    fn remote_to(address: Address, protocol: EtherType) -> Remote {
        Remote { protocol, ifindex: 0, address }
    }

    #[test]
    fn overlong_name_rejected_before_any_socket() {
        let mut config = config(ADDR_B, None);
        config.interface = "much-too-long-interface".into();
        match LinkChannel::open(&config) {
            Err(Error::NameTooLong(len)) => assert_eq!(len, 23),
            other => panic!("expected NameTooLong, got {:?}", other),
        }
    }

    #[test]
    fn round_trip_is_byte_identical() {
        let (a, b) = loopback::pair(ADDR_A, ADDR_B);
        let mut a = LinkChannel::with_link(a, 0, &config(ADDR_B, None));
        let mut b = LinkChannel::with_link(b, 0, &config(ADDR_A, None));

        assert_eq!(a.send(b"ping").unwrap(), 4);
        let mut buf = [0; 4];
        assert_eq!(b.receive(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"ping");

        assert_eq!(b.send(b"pong").unwrap(), 4);
        assert_eq!(a.receive(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"pong");

        a.close().unwrap();
        b.close().unwrap();
    }

    #[test]
    fn foreign_traffic_is_skipped_until_a_match() {
        let (a, mut b) = loopback::pair(ADDR_A, ADDR_B);
        let mut a = LinkChannel::with_link(a, 0, &config(ADDR_B, None));

        // Wrong frame type, correct sender.
        b.transmit(b"ipv4", &remote_to(ADDR_A, EtherType(0x0800))).unwrap();
        // Correct frame type but broadcast, not addressed to us.
        b.transmit(b"cast", &remote_to(Address::BROADCAST, TYPE)).unwrap();
        // Correct frame type but someone else's unicast.
        b.transmit(b"them", &remote_to(Address([2, 0, 0, 0, 0, 0x0c]), TYPE)).unwrap();
        // The one that belongs to the conversation.
        b.transmit(b"pong", &remote_to(ADDR_A, TYPE)).unwrap();

        let mut buf = [0; 8];
        assert_eq!(a.receive(&mut buf).unwrap(), 4);
        assert_eq!(&buf[..4], b"pong");
    }

    #[test]
    fn bounded_receive_times_out() {
        let (a, _b) = loopback::pair(ADDR_A, ADDR_B);
        let mut a = LinkChannel::with_link(
            a,
            0,
            &config(ADDR_B, Some(Duration::from_millis(10))),
        );

        let mut buf = [0; 8];
        match a.receive(&mut buf) {
            Err(Error::ReceiveTimedOut) => (),
            other => panic!("expected ReceiveTimedOut, got {:?}", other),
        }
    }

    #[test]
    fn hung_up_peer_fails_the_exchange() {
        let (a, b) = loopback::pair(ADDR_A, ADDR_B);
        let mut a = LinkChannel::with_link(a, 0, &config(ADDR_B, None));
        drop(b);

        match a.send(b"ping") {
            Err(Error::SendFailed(_)) => (),
            other => panic!("expected SendFailed, got {:?}", other),
        }
        let mut buf = [0; 8];
        match a.receive(&mut buf) {
            Err(Error::ReceiveFailed(_)) => (),
            other => panic!("expected ReceiveFailed, got {:?}", other),
        }
    }
}
