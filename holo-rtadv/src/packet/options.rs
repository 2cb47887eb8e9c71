//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use bitflags::bitflags;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use holo_utils::bytes::{BytesExt, BytesMutExt};
use holo_utils::ip::Ipv6NetworkExt;
use holo_utils::mac_addr::MacAddr;
use ipnetwork::Ipv6Network;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::RouterPreference;
use crate::packet::error::{DecodeError, DecodeResult};

// Neighbor Discovery option types.
//
// IANA registry:
// https://www.iana.org/assignments/icmpv6-parameters/icmpv6-parameters.xhtml#icmpv6-parameters-5
#[derive(Clone, Copy, Debug, Eq, FromPrimitive, Hash, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum NdOptionType {
    SrcLinkAddr = 1,
    TgtLinkAddr = 2,
    PrefixInfo = 3,
    RedirectedHdr = 4,
    Mtu = 5,
    RouteInfo = 24,
    Rdnss = 25,
    Dnssl = 31,
}

// Options accepted in Router Solicitations. Anything else is skipped.
pub const RS_OPTIONS: &[NdOptionType] = &[NdOptionType::SrcLinkAddr];

// Options accepted in Router Advertisements. Anything else is skipped.
pub const RA_OPTIONS: &[NdOptionType] = &[
    NdOptionType::SrcLinkAddr,
    NdOptionType::Mtu,
    NdOptionType::PrefixInfo,
    NdOptionType::RouteInfo,
    NdOptionType::Rdnss,
    NdOptionType::Dnssl,
];

// A single decoded Neighbor Discovery option.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum NdOption {
    SrcLinkAddr(MacAddr),
    TgtLinkAddr(MacAddr),
    PrefixInfo(PrefixInfo),
    RedirectedHdr(Bytes),
    Mtu(u32),
    RouteInfo(RouteInfo),
    Rdnss(Rdnss),
    Dnssl(Dnssl),
}

// Options carried by a Router Solicitation or Router Advertisement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct NdOptions {
    pub src_lladdr: Option<MacAddr>,
    pub mtu: Option<u32>,
    pub prefix_info: Vec<PrefixInfo>,
    pub route_info: Vec<RouteInfo>,
    pub rdnss: Vec<Rdnss>,
    pub dnssl: Vec<Dnssl>,
}

//
// Prefix Information option.
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |    Length     | Prefix Length |L|A| Reserved1 |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                         Valid Lifetime                        |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                       Preferred Lifetime                      |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Reserved2                           |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// +                                                               +
// |                                                               |
// +                            Prefix                             +
// |                                                               |
// +                                                               +
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct PrefixInfo {
    pub prefix: Ipv6Network,
    pub flags: PrefixInfoFlags,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct PrefixInfoFlags: u8 {
        const ON_LINK = 0x80;
        const AUTONOMOUS = 0x40;
    }
}

//
// Route Information option (RFC 4191).
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |    Length     | Prefix Length |Resvd|Prf|Resvd|
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                        Route Lifetime                         |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                   Prefix (Variable Length)                    |
// .                                                               .
// .                                                               .
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct RouteInfo {
    pub prefix: Ipv6Network,
    pub preference: RouterPreference,
    pub lifetime: u32,
}

//
// Recursive DNS Server option (RFC 8106).
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |     Length    |           Reserved            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Lifetime                            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// :            Addresses of IPv6 Recursive DNS Servers            :
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Rdnss {
    pub lifetime: u32,
    pub servers: Vec<Ipv6Addr>,
}

//
// DNS Search List option (RFC 8106).
//
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |     Type      |     Length    |           Reserved            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                           Lifetime                            |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |                                                               |
// :                Domain Names of DNS Search List                :
// |                                                               |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Dnssl {
    pub lifetime: u32,
    pub domains: Vec<String>,
}

// ===== impl NdOption =====

impl NdOption {
    // Decodes the body of an option whose type and length have already been
    // read.
    pub fn decode(
        opt_type: NdOptionType,
        opt_len: u8,
        buf: &mut Bytes,
    ) -> DecodeResult<NdOption> {
        let invalid_len =
            || DecodeError::InvalidOptionLength(opt_type as u8, opt_len);

        let option = match opt_type {
            NdOptionType::SrcLinkAddr | NdOptionType::TgtLinkAddr => {
                let mut addr = [0; MacAddr::LENGTH];
                buf.copy_to_slice(&mut addr);
                let addr = MacAddr::from(addr);
                if opt_type == NdOptionType::SrcLinkAddr {
                    NdOption::SrcLinkAddr(addr)
                } else {
                    NdOption::TgtLinkAddr(addr)
                }
            }
            NdOptionType::PrefixInfo => {
                if opt_len != 4 {
                    return Err(invalid_len());
                }
                NdOption::PrefixInfo(PrefixInfo::decode(buf)?)
            }
            NdOptionType::RedirectedHdr => {
                // Skip reserved bytes.
                buf.advance(6);
                NdOption::RedirectedHdr(buf.split_off(0))
            }
            NdOptionType::Mtu => {
                if opt_len != 1 {
                    return Err(invalid_len());
                }
                let _reserved = buf.get_u16();
                NdOption::Mtu(buf.get_u32())
            }
            NdOptionType::RouteInfo => {
                if opt_len > 3 {
                    return Err(invalid_len());
                }
                NdOption::RouteInfo(RouteInfo::decode(opt_len, buf)?)
            }
            NdOptionType::Rdnss => {
                if opt_len < 3 || opt_len % 2 == 0 {
                    return Err(invalid_len());
                }
                NdOption::Rdnss(Rdnss::decode(buf))
            }
            NdOptionType::Dnssl => {
                if opt_len < 2 {
                    return Err(invalid_len());
                }
                NdOption::Dnssl(Dnssl::decode(buf)?)
            }
        };

        Ok(option)
    }

    pub fn option_type(&self) -> NdOptionType {
        match self {
            NdOption::SrcLinkAddr(_) => NdOptionType::SrcLinkAddr,
            NdOption::TgtLinkAddr(_) => NdOptionType::TgtLinkAddr,
            NdOption::PrefixInfo(_) => NdOptionType::PrefixInfo,
            NdOption::RedirectedHdr(_) => NdOptionType::RedirectedHdr,
            NdOption::Mtu(_) => NdOptionType::Mtu,
            NdOption::RouteInfo(_) => NdOptionType::RouteInfo,
            NdOption::Rdnss(_) => NdOptionType::Rdnss,
            NdOption::Dnssl(_) => NdOptionType::Dnssl,
        }
    }
}

// ===== impl NdOptions =====

impl NdOptions {
    // Decodes the option list that follows a message header.
    //
    // Options with an unknown type, or not listed in `allowed`, are skipped
    // as required by RFC 4861. Their length must still be non-zero.
    pub fn decode(
        buf: &mut Bytes,
        allowed: &[NdOptionType],
    ) -> DecodeResult<NdOptions> {
        let mut options = NdOptions::default();

        while buf.remaining() > 0 {
            if buf.remaining() < 2 {
                return Err(DecodeError::IncompletePacket);
            }
            let opt_type = buf.get_u8();
            let opt_len = buf.get_u8();
            if opt_len == 0 {
                return Err(DecodeError::InvalidOptionLength(opt_type, 0));
            }
            let body_len = opt_len as usize * 8 - 2;
            if body_len > buf.remaining() {
                return Err(DecodeError::IncompletePacket);
            }
            let mut buf_opt = buf.copy_to_bytes(body_len);

            let Some(opt_type) = NdOptionType::from_u8(opt_type) else {
                continue;
            };
            if !allowed.contains(&opt_type) {
                continue;
            }
            let option = NdOption::decode(opt_type, opt_len, &mut buf_opt)?;
            options.insert(option)?;
        }

        Ok(options)
    }

    // Encodes all options in their canonical order.
    pub fn encode(&self, buf: &mut BytesMut) {
        if let Some(addr) = &self.src_lladdr {
            let start = option_encode_start(buf, NdOptionType::SrcLinkAddr);
            buf.put_slice(&addr.as_bytes());
            option_encode_end(buf, start);
        }
        if let Some(mtu) = self.mtu {
            let start = option_encode_start(buf, NdOptionType::Mtu);
            buf.put_u16(0);
            buf.put_u32(mtu);
            option_encode_end(buf, start);
        }
        for prefix_info in &self.prefix_info {
            prefix_info.encode(buf);
        }
        for route_info in &self.route_info {
            route_info.encode(buf);
        }
        for rdnss in &self.rdnss {
            rdnss.encode(buf);
        }
        for dnssl in &self.dnssl {
            dnssl.encode(buf);
        }
    }

    // Adds a decoded option to the record, rejecting duplicates of options
    // that can appear only once.
    fn insert(&mut self, option: NdOption) -> DecodeResult<()> {
        let opt_type = option.option_type();
        match option {
            NdOption::SrcLinkAddr(addr) => {
                if self.src_lladdr.replace(addr).is_some() {
                    return Err(DecodeError::DuplicateOption(opt_type as u8));
                }
            }
            NdOption::Mtu(mtu) => {
                if self.mtu.replace(mtu).is_some() {
                    return Err(DecodeError::DuplicateOption(opt_type as u8));
                }
            }
            NdOption::PrefixInfo(prefix_info) => {
                self.prefix_info.push(prefix_info);
            }
            NdOption::RouteInfo(route_info) => {
                self.route_info.push(route_info);
            }
            NdOption::Rdnss(rdnss) => {
                self.rdnss.push(rdnss);
            }
            NdOption::Dnssl(dnssl) => {
                self.dnssl.push(dnssl);
            }
            NdOption::TgtLinkAddr(_) | NdOption::RedirectedHdr(_) => {}
        }

        Ok(())
    }
}

// ===== impl PrefixInfo =====

impl PrefixInfo {
    fn decode(buf: &mut Bytes) -> DecodeResult<PrefixInfo> {
        let plen = buf.get_u8();
        if plen > Ipv6Network::MAX_PREFIXLEN {
            return Err(DecodeError::InvalidPrefixLength(plen));
        }
        let flags = PrefixInfoFlags::from_bits_truncate(buf.get_u8());
        let valid_lifetime = buf.get_u32();
        let preferred_lifetime = buf.get_u32();
        let _reserved = buf.get_u32();
        let addr = buf.get_ipv6();
        let prefix = Ipv6Network::new(addr, plen)
            .map_err(|_| DecodeError::InvalidPrefixLength(plen))?
            .apply_mask();

        Ok(PrefixInfo {
            prefix,
            flags,
            valid_lifetime,
            preferred_lifetime,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        let start = option_encode_start(buf, NdOptionType::PrefixInfo);
        buf.put_u8(self.prefix.prefix());
        buf.put_u8(self.flags.bits());
        buf.put_u32(self.valid_lifetime);
        buf.put_u32(self.preferred_lifetime);
        buf.put_u32(0);
        buf.put_ipv6(&self.prefix.network());
        option_encode_end(buf, start);
    }
}

// ===== impl RouteInfo =====

impl RouteInfo {
    fn decode(opt_len: u8, buf: &mut Bytes) -> DecodeResult<RouteInfo> {
        let plen = buf.get_u8();
        // The option must be long enough to carry the prefix bits.
        let min_len = match plen {
            0 => 1,
            1..=64 => 2,
            65..=128 => 3,
            _ => return Err(DecodeError::InvalidPrefixLength(plen)),
        };
        if opt_len < min_len {
            return Err(DecodeError::InvalidOptionLength(
                NdOptionType::RouteInfo as u8,
                opt_len,
            ));
        }
        let flags = buf.get_u8();
        let preference = RouterPreference::from_bits(flags >> 3);
        let lifetime = buf.get_u32();
        let addr = buf.get_ipv6_prefix(buf.remaining());
        let prefix = Ipv6Network::new(addr, plen)
            .map_err(|_| DecodeError::InvalidPrefixLength(plen))?
            .apply_mask();

        Ok(RouteInfo {
            prefix,
            preference,
            lifetime,
        })
    }

    fn encode(&self, buf: &mut BytesMut) {
        let start = option_encode_start(buf, NdOptionType::RouteInfo);
        buf.put_u8(self.prefix.prefix());
        buf.put_u8(self.preference.to_bits() << 3);
        buf.put_u32(self.lifetime);
        // Prefix is sent in 0, 8 or 16 bytes depending on its length.
        let prefix_len = match self.prefix.prefix() {
            0 => 0,
            1..=64 => 8,
            _ => 16,
        };
        buf.put_ipv6_prefix(&self.prefix.network(), prefix_len);
        option_encode_end(buf, start);
    }
}

// ===== impl Rdnss =====

impl Rdnss {
    fn decode(buf: &mut Bytes) -> Rdnss {
        let _reserved = buf.get_u16();
        let lifetime = buf.get_u32();
        let mut servers = vec![];
        while buf.remaining() >= 16 {
            servers.push(buf.get_ipv6());
        }

        Rdnss { lifetime, servers }
    }

    fn encode(&self, buf: &mut BytesMut) {
        let start = option_encode_start(buf, NdOptionType::Rdnss);
        buf.put_u16(0);
        buf.put_u32(self.lifetime);
        for addr in &self.servers {
            buf.put_ipv6(addr);
        }
        option_encode_end(buf, start);
    }
}

// ===== impl Dnssl =====

impl Dnssl {
    const MAX_LABEL_LEN: u8 = 63;

    fn decode(buf: &mut Bytes) -> DecodeResult<Dnssl> {
        let _reserved = buf.get_u16();
        let lifetime = buf.get_u32();
        let mut domains = vec![];

        // Domain names are terminated by the zero-length root label. The
        // option is zero-padded, so a leading zero ends the list.
        while buf.remaining() > 0 && buf[0] != 0 {
            let mut labels = vec![];
            loop {
                if buf.remaining() == 0 {
                    return Err(DecodeError::InvalidDomainName);
                }
                let label_len = buf.get_u8();
                if label_len == 0 {
                    break;
                }
                if label_len > Self::MAX_LABEL_LEN
                    || label_len as usize > buf.remaining()
                {
                    return Err(DecodeError::InvalidDomainName);
                }
                let label = buf.copy_to_bytes(label_len as usize);
                let label = String::from_utf8(label.to_vec())
                    .map_err(|_| DecodeError::InvalidDomainName)?;
                labels.push(label);
            }
            domains.push(labels.join("."));
        }

        Ok(Dnssl { lifetime, domains })
    }

    fn encode(&self, buf: &mut BytesMut) {
        let start = option_encode_start(buf, NdOptionType::Dnssl);
        buf.put_u16(0);
        buf.put_u32(self.lifetime);
        for domain in &self.domains {
            for label in domain.split('.').filter(|label| !label.is_empty()) {
                buf.put_u8(label.len() as u8);
                buf.put_slice(label.as_bytes());
            }
            buf.put_u8(0);
        }
        option_encode_end(buf, start);
    }
}

// ===== helper functions =====

fn option_encode_start(buf: &mut BytesMut, opt_type: NdOptionType) -> usize {
    let start = buf.len();
    buf.put_u8(opt_type as u8);
    // The length will be rewritten later.
    buf.put_u8(0);
    start
}

fn option_encode_end(buf: &mut BytesMut, start: usize) {
    buf.put_padding(start, 8);
    buf[start + 1] = ((buf.len() - start) / 8) as u8;
}
