//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod error;
pub mod options;

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use enum_as_inner::EnumAsInner;
use holo_utils::bytes::TLS_BUF;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::options::{NdOptions, RA_OPTIONS, RS_OPTIONS};

// ICMPv6 message types handled by the daemon.
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum MessageType {
    RouterSolicit = 133,
    RouterAdvert = 134,
}

// Router Discovery message.
#[derive(Clone, Debug, EnumAsInner, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Packet {
    RouterSolicit(RouterSolicit),
    RouterAdvert(RouterAdvert),
}

//
// Router Solicitation message.
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |     Code      |          Checksum             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                            Reserved                           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Options ...
// +-+-+-+-+-+-+-+-+-+-+-+-
//
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouterSolicit {
    pub options: NdOptions,
}

//
// Router Advertisement message.
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |     Code      |          Checksum             |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// | Cur Hop Limit |M|O|H|Prf|Resvd|       Router Lifetime         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         Reachable Time                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                          Retrans Timer                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |   Options ...
// +-+-+-+-+-+-+-+-+-+-+-+-
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouterAdvert {
    pub cur_hop_limit: u8,
    pub flags: RaFlags,
    pub preference: RouterPreference,
    pub router_lifetime: u16,
    pub reachable_time: u32,
    pub retrans_timer: u32,
    pub options: NdOptions,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct RaFlags: u8 {
        const MANAGED = 0x80;
        const OTHER = 0x40;
    }
}

// Default router preference (RFC 4191).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouterPreference {
    High,
    #[default]
    Medium,
    Low,
}

// ===== impl Packet =====

impl Packet {
    pub const HDR_LENGTH: usize = 4;

    // Decodes a Router Discovery message from a bytes buffer.
    //
    // The ICMPv6 checksum is verified by the kernel.
    pub fn decode(data: &[u8]) -> DecodeResult<Packet> {
        let mut buf = Bytes::copy_from_slice(data);
        if buf.remaining() < Self::HDR_LENGTH {
            return Err(DecodeError::IncompletePacket);
        }

        let msg_type = buf.get_u8();
        let code = buf.get_u8();
        let _cksum = buf.get_u16();
        let Some(msg_type) = MessageType::from_u8(msg_type) else {
            return Err(DecodeError::UnknownMessageType(msg_type));
        };
        if code != 0 {
            return Err(DecodeError::InvalidCode(code));
        }

        let packet = match msg_type {
            MessageType::RouterSolicit => {
                Packet::RouterSolicit(RouterSolicit::decode(&mut buf)?)
            }
            MessageType::RouterAdvert => {
                Packet::RouterAdvert(RouterAdvert::decode(&mut buf)?)
            }
        };

        Ok(packet)
    }

    // Encodes the message into a bytes buffer. The checksum is left zeroed
    // for the kernel to fill in.
    pub fn encode(&self) -> Bytes {
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();

            buf.put_u8(self.msg_type() as u8);
            buf.put_u8(0);
            buf.put_u16(0);
            match self {
                Packet::RouterSolicit(rs) => rs.encode(&mut buf),
                Packet::RouterAdvert(ra) => ra.encode(&mut buf),
            }

            buf.clone().freeze()
        })
    }

    pub fn msg_type(&self) -> MessageType {
        match self {
            Packet::RouterSolicit(_) => MessageType::RouterSolicit,
            Packet::RouterAdvert(_) => MessageType::RouterAdvert,
        }
    }
}

// ===== impl RouterSolicit =====

impl RouterSolicit {
    const BODY_LENGTH: usize = 4;

    fn decode(buf: &mut Bytes) -> DecodeResult<RouterSolicit> {
        if buf.remaining() < Self::BODY_LENGTH {
            return Err(DecodeError::IncompletePacket);
        }
        let _reserved = buf.get_u32();
        let options = NdOptions::decode(buf, RS_OPTIONS)?;

        Ok(RouterSolicit { options })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(0);
        self.options.encode(buf);
    }
}

// ===== impl RouterAdvert =====

impl RouterAdvert {
    const BODY_LENGTH: usize = 12;

    fn decode(buf: &mut Bytes) -> DecodeResult<RouterAdvert> {
        if buf.remaining() < Self::BODY_LENGTH {
            return Err(DecodeError::IncompletePacket);
        }
        let cur_hop_limit = buf.get_u8();
        let flags = buf.get_u8();
        let preference = RouterPreference::from_bits(flags >> 3);
        let flags = RaFlags::from_bits_truncate(flags);
        let router_lifetime = buf.get_u16();
        let reachable_time = buf.get_u32();
        let retrans_timer = buf.get_u32();
        let options = NdOptions::decode(buf, RA_OPTIONS)?;

        Ok(RouterAdvert {
            cur_hop_limit,
            flags,
            preference,
            router_lifetime,
            reachable_time,
            retrans_timer,
            options,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.cur_hop_limit);
        buf.put_u8(self.flags.bits() | (self.preference.to_bits() << 3));
        buf.put_u16(self.router_lifetime);
        buf.put_u32(self.reachable_time);
        buf.put_u32(self.retrans_timer);
        self.options.encode(buf);
    }
}

// ===== impl RouterPreference =====

impl RouterPreference {
    // Decodes the 2-bit Prf field. The reserved value (10) is treated as
    // medium.
    pub fn from_bits(bits: u8) -> RouterPreference {
        match bits & 0x03 {
            0b01 => RouterPreference::High,
            0b11 => RouterPreference::Low,
            _ => RouterPreference::Medium,
        }
    }

    pub fn to_bits(self) -> u8 {
        match self {
            RouterPreference::High => 0b01,
            RouterPreference::Medium => 0b00,
            RouterPreference::Low => 0b11,
        }
    }
}

impl std::fmt::Display for RouterPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouterPreference::High => write!(f, "high"),
            RouterPreference::Medium => write!(f, "medium"),
            RouterPreference::Low => write!(f, "low"),
        }
    }
}
