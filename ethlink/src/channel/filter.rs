//! The decision of whether an inbound delivery belongs to a conversation.
use core::fmt;

use crate::wire::{Address, EtherType, HardwareType, Origin};

use super::Error;

/// Number of octets in a peer hardware address.
pub(crate) const ADDR_LEN: u8 = 6;

/// Substrate metadata describing one inbound delivery.
///
/// Ephemeral: built per receive attempt, judged by the filter, then
/// dropped. The payload itself travels separately, in the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Hardware type of the sending interface.
    pub hardware_type: HardwareType,
    /// Number of valid leading octets in `address`.
    pub address_len: u8,
    /// Raw sender address octets, as the substrate stored them.
    pub address: [u8; 8],
    /// Frame type the delivery was tagged with.
    pub protocol: EtherType,
    /// Who the frame was addressed to.
    pub origin: Origin,
}

impl Delivery {
    /// The sender hardware address, when the address is Ethernet-sized.
    pub fn sender(&self) -> Option<Address> {
        if self.address_len == ADDR_LEN {
            Some(Address::from_bytes(&self.address[..usize::from(ADDR_LEN)]))
        } else {
            None
        }
    }
}

/// Decides which deliveries belong to the active conversation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameFilter {
    /// Frame type every delivery must be tagged with.
    pub(crate) ethertype: EtherType,
    /// The only sender whose frames are handed out.
    pub(crate) peer: Address,
    /// Address length every delivery must report.
    pub(crate) addr_len: u8,
}

/// What to do with one delivery.
#[derive(Debug)]
pub(crate) enum Verdict {
    /// Hand the payload to the caller.
    Deliver,
    /// Steady-state noise on a shared medium; keep waiting.
    Discard(Discard),
    /// A broken substrate contract or a misconfigured bind; surface it.
    Fault(Error),
}

/// Why a delivery was skipped without surfacing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Discard {
    /// Broadcast, multicast or promiscuous capture, not addressed to us.
    ForeignOrigin(Origin),
    /// Tagged with some other frame type.
    ForeignProtocol(EtherType),
    /// Sent by someone other than the configured peer.
    ForeignPeer,
}

impl fmt::Display for Discard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Discard::ForeignOrigin(origin) => write!(f, "{} delivery", origin),
            Discard::ForeignProtocol(protocol) => write!(f, "frame type {}", protocol),
            Discard::ForeignPeer => f.write_str("foreign sender"),
        }
    }
}

impl FrameFilter {
    pub(crate) fn new(ethertype: EtherType, peer: Address) -> FrameFilter {
        FrameFilter {
            ethertype,
            peer,
            addr_len: ADDR_LEN,
        }
    }

    /// Judge one delivery against the active conversation.
    ///
    /// A hardware-type or address-length anomaly means the bind is wrong or
    /// the substrate broke its contract; both are faults, not peer noise.
    /// Everything else that does not match is discarded: wrong origin,
    /// wrong frame type or wrong sender are expected traffic on a shared
    /// medium.
    pub(crate) fn judge(&self, delivery: &Delivery) -> Verdict {
        if delivery.hardware_type != HardwareType::Ether {
            return Verdict::Fault(Error::UnexpectedHardwareType(delivery.hardware_type));
        }
        if delivery.address_len != self.addr_len {
            return Verdict::Fault(Error::MalformedAddress {
                expected: usize::from(self.addr_len),
                found: usize::from(delivery.address_len),
            });
        }
        if delivery.origin != Origin::Host {
            return Verdict::Discard(Discard::ForeignOrigin(delivery.origin));
        }
        if delivery.protocol != self.ethertype {
            return Verdict::Discard(Discard::ForeignProtocol(delivery.protocol));
        }
        // The length was judged above, the address is present.
        let sender = Address::from_bytes(&delivery.address[..usize::from(self.addr_len)]);
        if sender != self.peer {
            return Verdict::Discard(Discard::ForeignPeer);
        }
        Verdict::Deliver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER: Address = Address([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
    const TYPE: EtherType = EtherType(0xDEAD);

    fn matching() -> Delivery {
        let mut address = [0; 8];
        address[..6].copy_from_slice(PEER.as_bytes());
        Delivery {
            hardware_type: HardwareType::Ether,
            address_len: 6,
            address,
            protocol: TYPE,
            origin: Origin::Host,
        }
    }

    fn filter() -> FrameFilter {
        FrameFilter::new(TYPE, PEER)
    }

    #[test]
    fn matching_delivery_is_handed_out() {
        assert!(matches!(filter().judge(&matching()), Verdict::Deliver));
    }

    #[test]
    fn single_byte_sender_difference_discards() {
        let mut delivery = matching();
        delivery.address[5] ^= 0x01;
        assert!(matches!(
            filter().judge(&delivery),
            Verdict::Discard(Discard::ForeignPeer)
        ));
    }

    #[test]
    fn foreign_frame_type_discards_even_from_the_peer() {
        let mut delivery = matching();
        delivery.protocol = EtherType(0x0800);
        assert!(matches!(
            filter().judge(&delivery),
            Verdict::Discard(Discard::ForeignProtocol(EtherType(0x0800)))
        ));
    }

    #[test]
    fn non_host_origin_discards_even_from_the_peer() {
        for origin in [Origin::Broadcast, Origin::Multicast, Origin::OtherHost, Origin::Outgoing] {
            let mut delivery = matching();
            delivery.origin = origin;
            assert!(matches!(
                filter().judge(&delivery),
                Verdict::Discard(Discard::ForeignOrigin(_))
            ));
        }
    }

    #[test]
    fn foreign_hardware_type_is_a_fault() {
        let mut delivery = matching();
        delivery.hardware_type = HardwareType::Unknown(0x0303);
        assert!(matches!(
            filter().judge(&delivery),
            Verdict::Fault(Error::UnexpectedHardwareType(HardwareType::Unknown(0x0303)))
        ));
    }

    #[test]
    fn odd_address_length_is_a_fault() {
        let mut delivery = matching();
        delivery.address_len = 8;
        assert!(matches!(
            filter().judge(&delivery),
            Verdict::Fault(Error::MalformedAddress { expected: 6, found: 8 })
        ));
    }

    #[test]
    fn fault_checks_run_before_peer_matching() {
        // A delivery that would be discarded as foreign still faults first.
        let mut delivery = matching();
        delivery.origin = Origin::Broadcast;
        delivery.address_len = 0;
        assert!(matches!(
            filter().judge(&delivery),
            Verdict::Fault(Error::MalformedAddress { .. })
        ));
    }
}
