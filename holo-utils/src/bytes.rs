//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::cell::RefCell;
use std::net::Ipv6Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

thread_local!(
    pub static TLS_BUF: RefCell<BytesMut> =
        RefCell::new(BytesMut::with_capacity(1500))
);

// Extension methods for Bytes.
pub trait BytesExt {
    /// Gets an IPv6 addr from `self` in big-endian byte order.
    ///
    /// The current position is advanced by 16.
    fn get_ipv6(&mut self) -> Ipv6Addr;

    /// Gets an IPv6 prefix truncated to `len` bytes, filling the remaining
    /// bytes of the address with zeros.
    ///
    /// The current position is advanced by `len`.
    ///
    /// # Panics
    ///
    /// This function panics if `len` is greater than 16 or if there aren't
    /// enough remaining bytes in `self`.
    fn get_ipv6_prefix(&mut self, len: usize) -> Ipv6Addr;
}

// Extension methods for BytesMut.
pub trait BytesMutExt {
    /// Writes an IPv6 addr to `self` in big-endian byte order.
    ///
    /// The current position is advanced by 16.
    fn put_ipv6(&mut self, addr: &Ipv6Addr);

    /// Writes the first `len` bytes of an IPv6 addr to `self`.
    ///
    /// The current position is advanced by `len`.
    fn put_ipv6_prefix(&mut self, addr: &Ipv6Addr, len: usize);

    /// Writes zero bytes until the length of `self` (counted from `start`)
    /// is a multiple of `align`.
    fn put_padding(&mut self, start: usize, align: usize);
}

// ===== impl Bytes =====

impl BytesExt for Bytes {
    fn get_ipv6(&mut self) -> Ipv6Addr {
        Ipv6Addr::from(self.get_u128())
    }

    fn get_ipv6_prefix(&mut self, len: usize) -> Ipv6Addr {
        let mut octets = [0; 16];
        self.copy_to_slice(&mut octets[..len]);
        Ipv6Addr::from(octets)
    }
}

// ===== impl BytesMut =====

impl BytesMutExt for BytesMut {
    fn put_ipv6(&mut self, addr: &Ipv6Addr) {
        self.put_slice(&addr.octets())
    }

    fn put_ipv6_prefix(&mut self, addr: &Ipv6Addr, len: usize) {
        self.put_slice(&addr.octets()[..len])
    }

    fn put_padding(&mut self, start: usize, align: usize) {
        let len = self.len() - start;
        let padding = (align - len % align) % align;
        self.put_bytes(0, padding);
    }
}
