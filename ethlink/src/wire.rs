//! Link-layer value types shared between configuration and the channel.
//!
//! Everything here is a plain value: addresses and tags parse from
//! configuration input, print for diagnostics, and compare for the frame
//! filter. None of it touches a socket.
use core::{fmt, str::FromStr};

enum_with_unknown! {
    /// The hardware type of an interface or of a frame's sender.
    ///
    /// Carries the ARPHRD-style numbering the OS reports both when an
    /// interface address is queried and on every inbound delivery. The
    /// channel only ever accepts [`Ether`]; the other well-known value
    /// shows up in practice when someone points a channel at a loopback
    /// interface.
    ///
    /// [`Ether`]: #variant.Ether
    pub enum HardwareType(u16) {
        /// Ethernet.
        Ether = 1,
        /// The software loopback interface type.
        Loopback = 772,
    }
}

impl fmt::Display for HardwareType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HardwareType::Ether => write!(f, "Ethernet"),
            HardwareType::Loopback => write!(f, "loopback"),
            HardwareType::Unknown(id) => write!(f, "0x{:04x}", id),
        }
    }
}

enum_with_unknown! {
    /// Who an inbound frame was addressed to.
    ///
    /// The substrate classifies every delivery; only [`Host`] frames belong
    /// to a point-to-point conversation. The numbering mirrors the
    /// `PACKET_*` values found in `sockaddr_ll`.
    ///
    /// [`Host`]: #variant.Host
    pub enum Origin(u8) {
        /// Addressed to this host specifically.
        Host = 0,
        /// A link-layer broadcast.
        Broadcast = 1,
        /// Addressed to a multicast group.
        Multicast = 2,
        /// Someone else's unicast, seen through promiscuous capture.
        OtherHost = 3,
        /// Looped back from this host's own transmit path.
        Outgoing = 4,
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Origin::Host => write!(f, "host"),
            Origin::Broadcast => write!(f, "broadcast"),
            Origin::Multicast => write!(f, "multicast"),
            Origin::OtherHost => write!(f, "other-host"),
            Origin::Outgoing => write!(f, "outgoing"),
            Origin::Unknown(id) => write!(f, "origin {}", id),
        }
    }
}

/// A six-octet Ethernet hardware address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct Address(pub [u8; 6]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Construct an address from a sequence of octets, in transmission order.
    ///
    /// # Panics
    /// The function panics if `data` is not six octets long.
    pub fn from_bytes(data: &[u8]) -> Address {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(data);
        Address(bytes)
    }

    /// Return the address octets, in transmission order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is a unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() || self.is_multicast())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the "multicast" bit in the OUI is set.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Query whether the "locally administered" bit in the OUI is set.
    pub fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
               bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5])
    }
}

/// The error of parsing a hardware address from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseAddressError {
    kind: ParseAddressErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseAddressErrorKind {
    ComponentError,
    SeparatorError,
}

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self.kind {
            ParseAddressErrorKind::ComponentError => "invalid hardware address component",
            ParseAddressErrorKind::SeparatorError => "expected six colon-separated components",
        })
    }
}

impl std::error::Error for ParseAddressError {}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(src: &str) -> core::result::Result<Self, ParseAddressError> {
        let mut parsed = [0; 6];
        let mut components = src.split(':');
        for octet in parsed.iter_mut() {
            let part = components
                .next()
                .ok_or(ParseAddressError {
                    kind: ParseAddressErrorKind::SeparatorError,
                })?;
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| ParseAddressError {
                    kind: ParseAddressErrorKind::ComponentError,
                })?;
        }

        if components.next().is_some() {
            Err(ParseAddressError {
                kind: ParseAddressErrorKind::SeparatorError,
            })
        } else {
            Ok(Address(parsed))
        }
    }
}

/// The 16-bit frame-type tag of a conversation.
///
/// Held in host byte order; [`to_wire`] and [`from_wire`] convert exactly
/// where a binding descriptor is built or read. The value is application
/// chosen, usually from the unassigned range, so the conversation never
/// collides with deployed protocols on the same interface.
///
/// [`to_wire`]: #method.to_wire
/// [`from_wire`]: #method.from_wire
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct EtherType(pub u16);

impl EtherType {
    /// The value in on-wire (network) byte order, as a binding descriptor
    /// carries it.
    pub fn to_wire(self) -> u16 {
        self.0.to_be()
    }

    /// Recover the host-order value from the on-wire representation.
    pub fn from_wire(raw: u16) -> EtherType {
        EtherType(u16::from_be(raw))
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// The error of parsing a frame type from text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseEtherTypeError(());

impl fmt::Display for ParseEtherTypeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("expected a 16-bit frame type, decimal or 0x-prefixed hex")
    }
}

impl std::error::Error for ParseEtherTypeError {}

impl FromStr for EtherType {
    type Err = ParseEtherTypeError;

    fn from_str(src: &str) -> core::result::Result<Self, ParseEtherTypeError> {
        let parsed = match src.strip_prefix("0x").or_else(|| src.strip_prefix("0X")) {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => src.parse(),
        };
        parsed.map(EtherType).map_err(|_| ParseEtherTypeError(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_predicates() {
        assert!(Address::BROADCAST.is_broadcast());
        assert!(!Address::BROADCAST.is_unicast());
        assert!(Address::BROADCAST.is_multicast());
        assert!(Address::BROADCAST.is_local());
    }

    #[test]
    fn address_text_round_trip() {
        let address: Address = "aa:bb:cc:dd:ee:0f".parse().unwrap();
        assert_eq!(address, Address([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x0f]));
        assert_eq!(address.to_string(), "aa:bb:cc:dd:ee:0f");
    }

    #[test]
    fn address_rejects_malformed_text() {
        assert!("aa:bb:cc:dd:ee".parse::<Address>().is_err());
        assert!("aa:bb:cc:dd:ee:ff:00".parse::<Address>().is_err());
        assert!("aa:bb:cc:dd:ee:gg".parse::<Address>().is_err());
    }

    #[test]
    fn ethertype_parses_both_bases() {
        assert_eq!("0xDEAD".parse::<EtherType>().unwrap(), EtherType(0xDEAD));
        assert_eq!("1500".parse::<EtherType>().unwrap(), EtherType(1500));
        assert!("frame".parse::<EtherType>().is_err());
        assert!("0x10000".parse::<EtherType>().is_err());
    }

    #[test]
    fn ethertype_wire_order() {
        let tag = EtherType(0xDEAD);
        assert_eq!(tag.to_wire().to_ne_bytes(), [0xDE, 0xAD]);
        assert_eq!(EtherType::from_wire(tag.to_wire()), tag);
    }

    #[test]
    fn metadata_tags_from_raw() {
        assert_eq!(HardwareType::from(1), HardwareType::Ether);
        assert_eq!(HardwareType::from(0x0303), HardwareType::Unknown(0x0303));
        assert_eq!(Origin::from(0), Origin::Host);
        assert_eq!(Origin::from(3), Origin::OtherHost);
        assert_eq!(u8::from(Origin::Unknown(9)), 9);
    }
}
