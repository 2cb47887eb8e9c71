//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bitflags::bitflags;
use ipnetwork::Ipv6Network;
use serde::{Deserialize, Serialize};

use crate::mac_addr::MacAddr;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct InterfaceFlags: u8 {
        const LOOPBACK = 0x01;
        const OPERATIVE = 0x02;
        const MULTICAST = 0x04;
    }
}

// Kernel change feed.
//
// Interface, address and route notifications, either learned from the
// initial kernel dump or from the live monitor socket.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub enum SouthboundMsg {
    InterfaceUpd(InterfaceUpdateMsg),
    InterfaceDel(InterfaceDelMsg),
    AddressAdd(AddressMsg),
    AddressDel(AddressMsg),
    RouteAdd(RouteMsg),
    RouteDel(RouteMsg),
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceUpdateMsg {
    pub ifname: String,
    pub ifindex: u32,
    pub mtu: u32,
    pub flags: InterfaceFlags,
    pub mac_address: Option<MacAddr>,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct InterfaceDelMsg {
    pub ifname: String,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct AddressMsg {
    pub ifindex: u32,
    pub addr: Ipv6Network,
}

#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct RouteMsg {
    pub ifindex: u32,
    pub prefix: Ipv6Network,
}
