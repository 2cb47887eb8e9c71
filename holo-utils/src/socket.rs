//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::os::raw::{c_int, c_void};
use std::os::unix::io::AsRawFd;

// Normal build: re-export standard socket types.
#[cfg(not(feature = "testing"))]
pub use {socket2::Socket, tokio::io::unix::AsyncFd};

// Test build: export mock sockets.
#[cfg(feature = "testing")]
pub use crate::socket::mock::{AsyncFd, Socket};

// Useful type definition.
type Result<T> = std::io::Result<T>;

// ICMP6_FILTER socket option (linux/icmpv6.h).
const ICMP6_FILTER: c_int = 1;

// FFI struct used to set the ICMP6_FILTER socket option.
//
// A set bit blocks the corresponding ICMPv6 message type.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct icmp6_filter {
    pub data: [u32; 8],
}

// Extension methods for Socket.
pub trait SocketExt {
    // Sets the value of the IPV6_RECVPKTINFO option for this socket.
    fn set_ipv6_pktinfo(&self, value: bool) -> Result<()>;

    // Sets the value of the IPV6_RECVHOPLIMIT option for this socket.
    fn set_ipv6_recvhoplimit(&self, value: bool) -> Result<()>;

    // Sets the ICMP6_FILTER option so that only the given ICMPv6 message
    // types are delivered to this socket.
    fn set_icmp6_filter(&self, pass: &[u8]) -> Result<()>;
}

// ===== impl icmp6_filter =====

impl icmp6_filter {
    // Returns a filter that blocks every ICMPv6 message type.
    pub fn block_all() -> icmp6_filter {
        icmp6_filter { data: [u32::MAX; 8] }
    }

    // Lets the given ICMPv6 message type through the filter.
    pub fn pass(&mut self, icmp_type: u8) {
        self.data[(icmp_type >> 5) as usize] &= !(1 << (icmp_type & 31));
    }

    // Returns whether the given ICMPv6 message type is blocked.
    pub fn is_blocked(&self, icmp_type: u8) -> bool {
        self.data[(icmp_type >> 5) as usize] & (1 << (icmp_type & 31)) != 0
    }
}

// ===== impl Socket =====

#[cfg(not(feature = "testing"))]
impl SocketExt for Socket {
    fn set_ipv6_pktinfo(&self, value: bool) -> Result<()> {
        let optval = value as c_int;

        setsockopt(
            self,
            libc::IPPROTO_IPV6,
            libc::IPV6_RECVPKTINFO,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<i32>() as libc::socklen_t,
        )
    }

    fn set_ipv6_recvhoplimit(&self, value: bool) -> Result<()> {
        let optval = value as c_int;

        setsockopt(
            self,
            libc::IPPROTO_IPV6,
            libc::IPV6_RECVHOPLIMIT,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<i32>() as libc::socklen_t,
        )
    }

    fn set_icmp6_filter(&self, pass: &[u8]) -> Result<()> {
        let mut optval = icmp6_filter::block_all();
        for icmp_type in pass {
            optval.pass(*icmp_type);
        }

        setsockopt(
            self,
            libc::IPPROTO_ICMPV6,
            ICMP6_FILTER,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<icmp6_filter>() as libc::socklen_t,
        )
    }
}

// ===== Mock sockets for unit testing =====

pub mod mock {
    #[derive(Debug, Default)]
    pub struct AsyncFd<T>(T);

    #[derive(Debug, Default)]
    pub struct Socket();

    impl<T> AsyncFd<T> {
        pub fn new(inner: T) -> std::io::Result<Self> {
            Ok(Self(inner))
        }

        pub fn get_ref(&self) -> &T {
            &self.0
        }
    }
}

// ===== global functions =====

fn setsockopt<F: AsRawFd>(
    sock: &F,
    opt: c_int,
    val: c_int,
    optval: *const c_void,
    optlen: libc::socklen_t,
) -> Result<()> {
    let ret;

    unsafe {
        ret = libc::setsockopt(sock.as_raw_fd(), opt, val, optval, optlen);
    };
    if ret == -1 {
        return Err(std::io::Error::last_os_error());
    }

    Ok(())
}

// ===== unit tests =====
