//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::LazyLock;

use const_addrs::{ip6, net6};
use holo_rtadv::packet::error::DecodeError;
use holo_rtadv::packet::options::{
    Dnssl, NdOptions, PrefixInfo, PrefixInfoFlags, Rdnss, RouteInfo,
};
use holo_rtadv::packet::{
    Packet, RaFlags, RouterAdvert, RouterPreference, RouterSolicit,
};
use holo_utils::assert_eq_hex;
use holo_utils::mac_addr::MacAddr;

//
// Helper functions.
//

fn test_encode_packet(bytes_expected: &[u8], packet: &Packet) {
    let bytes_actual = packet.encode();
    let data_actual: &[u8] = bytes_actual.as_ref();
    assert_eq_hex!(bytes_expected, data_actual);
}

fn test_decode_packet(bytes: &[u8], packet_expected: &Packet) {
    let packet_actual = Packet::decode(bytes).unwrap();
    assert_eq!(*packet_expected, packet_actual);
}

//
// Test packets.
//

static RS1: LazyLock<(Vec<u8>, Packet)> = LazyLock::new(|| {
    (
        vec![
            0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00,
            0x11, 0x22, 0x33, 0x44, 0x55,
        ],
        Packet::RouterSolicit(RouterSolicit {
            options: NdOptions {
                src_lladdr: Some(MacAddr::from([
                    0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
                ])),
                ..Default::default()
            },
        }),
    )
});

static RS2: LazyLock<(Vec<u8>, Packet)> = LazyLock::new(|| {
    (
        vec![0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        Packet::RouterSolicit(RouterSolicit::default()),
    )
});

static RA1: LazyLock<(Vec<u8>, Packet)> = LazyLock::new(|| {
    (
        vec![
            // Header.
            0x86, 0x00, 0x00, 0x00, 0x40, 0x48, 0x07, 0x08, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00,
            // Source link-layer address.
            0x01, 0x01, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
            // MTU.
            0x05, 0x01, 0x00, 0x00, 0x00, 0x00, 0x05, 0xdc,
            // Prefix information.
            0x03, 0x04, 0x40, 0xc0, 0x00, 0x27, 0x8d, 0x00, 0x00, 0x09, 0x3a,
            0x80, 0x00, 0x00, 0x00, 0x00, 0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            // Route information.
            0x18, 0x02, 0x30, 0x08, 0x00, 0x00, 0x07, 0x08, 0x20, 0x01, 0x0d,
            0xb8, 0x10, 0x00, 0x00, 0x00,
            // Recursive DNS server.
            0x19, 0x03, 0x00, 0x00, 0x00, 0x00, 0x04, 0xb0, 0x20, 0x01, 0x0d,
            0xb8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x53,
            // DNS search list.
            0x1f, 0x03, 0x00, 0x00, 0x00, 0x00, 0x04, 0xb0, 0x07, 0x65, 0x78,
            0x61, 0x6d, 0x70, 0x6c, 0x65, 0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00,
            0x00, 0x00,
        ],
        Packet::RouterAdvert(RouterAdvert {
            cur_hop_limit: 64,
            flags: RaFlags::OTHER,
            preference: RouterPreference::High,
            router_lifetime: 1800,
            reachable_time: 0,
            retrans_timer: 0,
            options: NdOptions {
                src_lladdr: Some(MacAddr::from([
                    0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
                ])),
                mtu: Some(1500),
                prefix_info: vec![PrefixInfo {
                    prefix: net6!("2001:db8::/64"),
                    flags: PrefixInfoFlags::ON_LINK
                        | PrefixInfoFlags::AUTONOMOUS,
                    valid_lifetime: 2592000,
                    preferred_lifetime: 604800,
                }],
                route_info: vec![RouteInfo {
                    prefix: net6!("2001:db8:1000::/48"),
                    preference: RouterPreference::High,
                    lifetime: 1800,
                }],
                rdnss: vec![Rdnss {
                    lifetime: 1200,
                    servers: vec![ip6!("2001:db8::53")],
                }],
                dnssl: vec![Dnssl {
                    lifetime: 1200,
                    domains: vec!["example.com".to_owned()],
                }],
            },
        }),
    )
});

// Router going away: zero router lifetime and a prefix being withdrawn.
static RA2: LazyLock<(Vec<u8>, Packet)> = LazyLock::new(|| {
    (
        vec![
            0x86, 0x00, 0x00, 0x00, 0x40, 0x80, 0x00, 0x00, 0x00, 0x00, 0x75,
            0x30, 0x00, 0x00, 0x03, 0xe8, 0x03, 0x04, 0x30, 0x80, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x20,
            0x01, 0x0d, 0xb8, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ],
        Packet::RouterAdvert(RouterAdvert {
            cur_hop_limit: 64,
            flags: RaFlags::MANAGED,
            preference: RouterPreference::Medium,
            router_lifetime: 0,
            reachable_time: 30000,
            retrans_timer: 1000,
            options: NdOptions {
                prefix_info: vec![PrefixInfo {
                    prefix: net6!("2001:db8:1::/48"),
                    flags: PrefixInfoFlags::ON_LINK,
                    valid_lifetime: 0,
                    preferred_lifetime: 0,
                }],
                ..Default::default()
            },
        }),
    )
});

//
// Tests.
//

#[test]
fn test_encode_rs1() {
    let (ref bytes, ref packet) = *RS1;
    test_encode_packet(bytes, packet);
}

#[test]
fn test_decode_rs1() {
    let (ref bytes, ref packet) = *RS1;
    test_decode_packet(bytes, packet);
}

#[test]
fn test_encode_rs2() {
    let (ref bytes, ref packet) = *RS2;
    test_encode_packet(bytes, packet);
}

#[test]
fn test_decode_rs2() {
    let (ref bytes, ref packet) = *RS2;
    test_decode_packet(bytes, packet);
}

#[test]
fn test_encode_ra1() {
    let (ref bytes, ref packet) = *RA1;
    test_encode_packet(bytes, packet);
}

#[test]
fn test_decode_ra1() {
    let (ref bytes, ref packet) = *RA1;
    test_decode_packet(bytes, packet);
}

#[test]
fn test_encode_ra2() {
    let (ref bytes, ref packet) = *RA2;
    test_encode_packet(bytes, packet);
}

#[test]
fn test_decode_ra2() {
    let (ref bytes, ref packet) = *RA2;
    test_decode_packet(bytes, packet);
}

#[test]
fn test_decode_incomplete_header() {
    assert_eq!(
        Packet::decode(&[0x86, 0x00]),
        Err(DecodeError::IncompletePacket)
    );
    // Router Advertisement missing its body.
    assert_eq!(
        Packet::decode(&[0x86, 0x00, 0x00, 0x00, 0x40, 0x00, 0x07, 0x08]),
        Err(DecodeError::IncompletePacket)
    );
}

#[test]
fn test_decode_unknown_type() {
    assert_eq!(
        Packet::decode(&[0x87, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        Err(DecodeError::UnknownMessageType(135))
    );
}

#[test]
fn test_decode_invalid_code() {
    assert_eq!(
        Packet::decode(&[0x85, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
        Err(DecodeError::InvalidCode(1))
    );
}

#[test]
fn test_decode_zero_length_option() {
    let bytes = [
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_eq!(
        Packet::decode(&bytes),
        Err(DecodeError::InvalidOptionLength(1, 0))
    );
}

#[test]
fn test_decode_truncated_option() {
    let bytes = [
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x04, 0x40,
        0xc0, 0x00, 0x00, 0x00, 0x00,
    ];
    assert_eq!(Packet::decode(&bytes), Err(DecodeError::IncompletePacket));
}

#[test]
fn test_decode_duplicate_lladdr() {
    let bytes = [
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00,
        0x11, 0x22, 0x33, 0x44, 0x55, 0x01, 0x01, 0x00, 0x11, 0x22, 0x33,
        0x44, 0x66,
    ];
    assert_eq!(
        Packet::decode(&bytes),
        Err(DecodeError::DuplicateOption(1))
    );
}

#[test]
fn test_decode_skips_unknown_option() {
    // Option type 200 followed by a source link-layer address.
    let bytes = [
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc8, 0x01, 0xde,
        0xad, 0xbe, 0xef, 0x00, 0x00, 0x01, 0x01, 0x00, 0x11, 0x22, 0x33,
        0x44, 0x55,
    ];
    let (_, ref packet) = *RS1;
    test_decode_packet(&bytes, packet);
}

#[test]
fn test_decode_skips_disallowed_option() {
    // Prefix information carried by a Router Solicitation.
    let bytes = [
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x04, 0x40,
        0xc0, 0x00, 0x27, 0x8d, 0x00, 0x00, 0x09, 0x3a, 0x80, 0x00, 0x00,
        0x00, 0x00, 0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let (_, ref packet) = *RS2;
    test_decode_packet(&bytes, packet);
}

#[test]
fn test_decode_skips_malformed_disallowed_option() {
    // Prefix information with a bad length carried by a Router Solicitation.
    let mut bytes = vec![
        0x85, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03,
    ];
    bytes.extend([0; 22]);
    let (_, ref packet) = *RS2;
    test_decode_packet(&bytes, packet);
}

#[test]
fn test_decode_invalid_prefix_info_length() {
    let mut bytes = vec![
        0x86, 0x00, 0x00, 0x00, 0x40, 0x00, 0x07, 0x08, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x03, 0x03,
    ];
    bytes.extend([0; 22]);
    assert_eq!(
        Packet::decode(&bytes),
        Err(DecodeError::InvalidOptionLength(3, 3))
    );
}

#[test]
fn test_decode_reserved_preference() {
    // The reserved preference value (10) is read as medium.
    let bytes = [
        0x86, 0x00, 0x00, 0x00, 0x40, 0x10, 0x07, 0x08, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00,
    ];
    let packet = Packet::decode(&bytes).unwrap();
    let advert = packet.into_router_advert().unwrap();
    assert_eq!(advert.preference, RouterPreference::Medium);
    assert_eq!(advert.flags, RaFlags::empty());
}
