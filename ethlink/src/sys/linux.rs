// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use super::{ifreq, Errno, IoctlResult, LibcResult};

/// Adds a method to query the interface index.
///
/// This is an extension trait implemented for `ifreq` in Linux.
pub(crate) trait IfIndex {
    fn get_if_index(&mut self, fd: libc::c_int) -> Result<libc::c_int, Errno>;
}

/// Adds a method to query the interface hardware address.
///
/// The result is the raw address structure; callers inspect the family tag
/// before trusting the address bytes.
pub(crate) trait IfHardwareAddr {
    fn get_if_hwaddr(&mut self, fd: libc::c_int) -> Result<libc::sockaddr, Errno>;
}

impl ifreq {
    pub(crate) const SIOCGIFINDEX:  libc::Ioctl = 0x8933;
    pub(crate) const SIOCGIFHWADDR: libc::Ioctl = 0x8927;
}

impl IfIndex for ifreq {
    fn get_if_index(&mut self, fd: libc::c_int) -> Result<libc::c_int, Errno> {
        #[repr(C)]
        struct Request {
            interface: ifreq,
            ifr_ifindex: libc::c_int,
        }

        let mut request = Request {
            interface: *self,
            ifr_ifindex: 0,
        };

        let res = unsafe {
            libc::ioctl(fd, Self::SIOCGIFINDEX, &mut request as *mut _)
        };

        IoctlResult(res).errno()?;

        Ok(request.ifr_ifindex)
    }
}

impl IfHardwareAddr for ifreq {
    fn get_if_hwaddr(&mut self, fd: libc::c_int) -> Result<libc::sockaddr, Errno> {
        #[repr(C)]
        struct Request {
            interface: ifreq,
            ifr_hwaddr: libc::sockaddr,
        }

        let mut request = Request {
            interface: *self,
            ifr_hwaddr: libc::sockaddr {
                sa_family: 0,
                sa_data: [0; 14],
            },
        };

        let res = unsafe {
            libc::ioctl(fd, Self::SIOCGIFHWADDR, &mut request as *mut _)
        };

        IoctlResult(res).errno()?;

        Ok(request.ifr_hwaddr)
    }
}
