//! Point-to-point Ethernet framing over Linux packet sockets.
//!
//! `ethlink` exchanges raw link-layer frames with exactly one peer,
//! identified by hardware address, over one network interface. It binds an
//! `AF_PACKET` socket to a caller-chosen frame type and filters inbound
//! traffic down to the single configured conversation, so request/response
//! protocols can ride directly on Ethernet framing without IP.
//!
//! The surface is small:
//!
//! * [`iface::InterfaceHandle::resolve`] turns an interface name into its
//!   index and hardware address.
//! * [`channel::LinkChannel::open`] binds a channel to one interface, one
//!   frame type and one peer.
//! * [`channel::LinkChannel::send`] and [`channel::LinkChannel::receive`]
//!   move opaque payload bytes. The channel defines no envelope of its own:
//!   what the peer sent is what the caller gets.
//!
//! Reliability, multi-peer multiplexing and broadcast handling are out of
//! scope. Traffic that does not belong to the conversation is discarded
//! inside [`channel::LinkChannel::receive`] without ever surfacing.
//!
//! Opening a packet socket requires `CAP_NET_RAW`. The
//! [`channel::loopback`] substrate exercises the whole channel in memory
//! for callers (and tests) without that privilege.
#![warn(missing_docs)]
#![warn(unreachable_pub)]

#[macro_use]
mod macros;

pub mod channel;
pub mod iface;
pub mod sys;
pub mod wire;
