//! Resolution of interface names to link-layer identities.
use std::os::unix::io::AsRawFd;

use crate::channel::Error;
use crate::sys::{self, IfHardwareAddr, IfIndex};
use crate::wire::{Address, HardwareType};

/// Longest interface name the resolver accepts, in bytes.
///
/// One less than the OS name field, which keeps its trailing NUL.
pub const NAME_MAX: usize = libc::IF_NAMESIZE - 1;

/// The resolved identity of a network interface.
///
/// A snapshot: index and address are read once and go stale if the
/// interface is reconfigured afterwards. Whether that matters is the
/// caller's concern; the resolver does not watch for changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceHandle {
    /// The OS-assigned interface index.
    pub index: libc::c_int,
    /// The interface's own hardware address.
    pub address: Address,
}

impl InterfaceHandle {
    /// Look up the index and hardware address of the named interface.
    ///
    /// Performs two independent queries against a short-lived probe socket;
    /// both must succeed. The reported hardware type must be Ethernet even
    /// when address bytes are present, anything else is rejected as
    /// [`Error::UnexpectedHardwareType`].
    ///
    /// A name that does not fit the fixed-size name field fails with
    /// [`Error::NameTooLong`] before any OS call is made.
    pub fn resolve(name: &str) -> Result<InterfaceHandle, Error> {
        if name.len() > NAME_MAX {
            return Err(Error::NameTooLong(name.len()));
        }

        let probe = sys::ProbeSocket::new().map_err(Error::SocketCreateFailed)?;
        let mut ifreq = sys::ifreq::new(name);

        let index = ifreq
            .get_if_index(probe.as_raw_fd())
            .map_err(|errno| Error::InterfaceNotFound { name: name.into(), errno })?;
        let hwaddr = ifreq
            .get_if_hwaddr(probe.as_raw_fd())
            .map_err(|errno| Error::InterfaceNotFound { name: name.into(), errno })?;

        let reported = HardwareType::from(hwaddr.sa_family);
        if reported != HardwareType::Ether {
            return Err(Error::UnexpectedHardwareType(reported));
        }

        let mut octets = [0; 6];
        for (octet, raw) in octets.iter_mut().zip(&hwaddr.sa_data[..6]) {
            *octet = *raw as u8;
        }

        Ok(InterfaceHandle { index, address: Address(octets) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlong_name_fails_before_any_query() {
        let name = "x".repeat(NAME_MAX + 1);
        match InterfaceHandle::resolve(&name) {
            Err(Error::NameTooLong(len)) => assert_eq!(len, NAME_MAX + 1),
            other => panic!("expected NameTooLong, got {:?}", other),
        }
    }

    #[test]
    fn missing_interface_is_reported() {
        match InterfaceHandle::resolve("nosuchif0") {
            Err(Error::InterfaceNotFound { name, .. }) => assert_eq!(name, "nosuchif0"),
            other => panic!("expected InterfaceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn loopback_hardware_type_is_rejected() {
        // `lo` exists in any network namespace but is not Ethernet.
        match InterfaceHandle::resolve("lo") {
            Err(Error::UnexpectedHardwareType(HardwareType::Loopback)) => (),
            other => panic!("expected UnexpectedHardwareType, got {:?}", other),
        }
    }
}
