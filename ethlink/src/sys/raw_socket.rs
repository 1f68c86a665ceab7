// Copyright (C) 2016 whitequark@whitequark.org
// Copyright (C) 2019 Andreas Molzer <andreas.molzer@tum.de>
//
// in large parts from `smoltcp` originally distributed under 0-clause BSD
use core::mem;
use std::os::unix::io::{AsRawFd, RawFd};

use super::{Errno, FdResult, IoLenResult, LibcResult};
use crate::wire::Address;

/// A packet socket descriptor.
///
/// Owns the file descriptor of one `AF_PACKET` datagram socket and offers
/// the raw system-call surface a channel is built from. The socket is a
/// cooked one: the substrate attaches and strips the Ethernet header, so
/// buffers hold payload only.
///
/// Dropping the descriptor closes it silently; [`release`] closes it while
/// reporting the outcome. Either way the descriptor is closed exactly once.
///
/// [`release`]: #method.release
#[derive(Debug)]
pub struct RawSocketDesc {
    lower: libc::c_int,
}

impl AsRawFd for RawSocketDesc {
    fn as_raw_fd(&self) -> RawFd {
        self.lower
    }
}

impl RawSocketDesc {
    /// Open a packet socket that sees every frame type.
    ///
    /// The socket starts out unbound and catches all protocols at the
    /// driver level; it becomes selective once [`bind_interface`] ties it
    /// to one interface and one frame type.
    ///
    /// [`bind_interface`]: #method.bind_interface
    pub fn new() -> Result<RawSocketDesc, Errno> {
        let lower = unsafe {
            libc::socket(
                libc::AF_PACKET,
                libc::SOCK_DGRAM,
                (libc::ETH_P_ALL as u16).to_be() as i32)
        };

        FdResult(lower).errno()?;

        Ok(RawSocketDesc { lower })
    }

    /// Bind the socket to an interface index and a frame type.
    ///
    /// `protocol` is given in network byte order, as the binding descriptor
    /// carries it on the wire side of the API.
    pub fn bind_interface(&mut self, ifindex: libc::c_int, protocol: u16) -> Result<(), Errno> {
        let sockaddr = libc::sockaddr_ll {
            sll_family:   libc::AF_PACKET as u16,
            sll_protocol: protocol,
            sll_ifindex:  ifindex,
            sll_hatype:   0,
            sll_pkttype:  0,
            sll_halen:    0,
            sll_addr:     [0; 8],
        };

        let res = unsafe {
            libc::bind(
                self.lower,
                &sockaddr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as u32)
        };

        FdResult(res).errno()
    }

    /// Send a single frame to `addr` over the bound interface.
    ///
    /// `protocol` is in network byte order, the same value the socket was
    /// bound with.
    pub fn send_to(
        &mut self,
        buffer: &[u8],
        ifindex: libc::c_int,
        protocol: u16,
        addr: Address,
    ) -> Result<usize, Errno> {
        let mut sockaddr = libc::sockaddr_ll {
            sll_family:   libc::AF_PACKET as u16,
            sll_protocol: protocol,
            sll_ifindex:  ifindex,
            sll_hatype:   0,
            sll_pkttype:  0,
            sll_halen:    6,
            sll_addr:     [0; 8],
        };
        sockaddr.sll_addr[..6].copy_from_slice(addr.as_bytes());

        let len = unsafe {
            libc::sendto(
                self.lower,
                buffer.as_ptr() as *const libc::c_void,
                buffer.len(),
                0,
                &sockaddr as *const libc::sockaddr_ll as *const libc::sockaddr,
                mem::size_of::<libc::sockaddr_ll>() as u32)
        };
        IoLenResult(len).errno()?;
        Ok(len as usize)
    }

    /// Receive a single frame, blocking until one arrives.
    ///
    /// Returns the payload length together with the sender address
    /// structure and its reported length, exactly as the substrate filled
    /// them in. Interpreting the structure is the caller's business.
    pub fn recv_from(
        &mut self,
        buffer: &mut [u8],
    ) -> Result<(usize, libc::sockaddr_ll, libc::socklen_t), Errno> {
        let mut sockaddr = libc::sockaddr_ll {
            sll_family:   0,
            sll_protocol: 0,
            sll_ifindex:  0,
            sll_hatype:   0,
            sll_pkttype:  0,
            sll_halen:    0,
            sll_addr:     [0; 8],
        };
        let mut addrlen = mem::size_of::<libc::sockaddr_ll>() as libc::socklen_t;

        let len = unsafe {
            libc::recvfrom(
                self.lower,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                0,
                &mut sockaddr as *mut libc::sockaddr_ll as *mut libc::sockaddr,
                &mut addrlen)
        };
        IoLenResult(len).errno()?;
        Ok((len as usize, sockaddr, addrlen))
    }

    /// Close the descriptor, reporting the outcome.
    ///
    /// `Drop` also closes, silently; this is for callers that care whether
    /// the OS accepted the close. The descriptor counts as released in
    /// either case.
    pub fn release(self) -> Result<(), Errno> {
        let lower = self.lower;
        mem::forget(self);
        let res = unsafe { libc::close(lower) };
        FdResult(res).errno()
    }
}

impl Drop for RawSocketDesc {
    fn drop(&mut self) {
        unsafe { libc::close(self.lower); }
    }
}
