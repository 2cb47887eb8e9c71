//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{IpAddr, Ipv6Addr};

use futures::TryStreamExt;
use futures::channel::mpsc::UnboundedReceiver;
use holo_rtadv::instance::Instance;
use holo_utils::mac_addr::MacAddr;
use holo_utils::southbound::{
    AddressMsg, InterfaceDelMsg, InterfaceFlags, InterfaceUpdateMsg, RouteMsg,
    SouthboundMsg,
};
use ipnetwork::Ipv6Network;
use netlink_packet_core::{NetlinkMessage, NetlinkPayload};
use netlink_packet_route::address::{AddressAttribute, AddressMessage};
use netlink_packet_route::link::{
    LinkAttribute, LinkFlags, LinkLayerType, LinkMessage,
};
use netlink_packet_route::route::{
    RouteAddress, RouteAttribute, RouteMessage, RouteType,
};
use netlink_packet_route::{AddressFamily, RouteNetlinkMessage};
use netlink_sys::{AsyncSocket, SocketAddr};
use rtnetlink::constants::{
    RTMGRP_IPV6_IFADDR, RTMGRP_IPV6_ROUTE, RTMGRP_LINK,
};
use rtnetlink::{RouteMessageBuilder, new_connection};

pub(crate) type NetlinkMonitor =
    UnboundedReceiver<(NetlinkMessage<RouteNetlinkMessage>, SocketAddr)>;

// ===== helper functions =====

fn link_update_msg(msg: LinkMessage) -> Option<SouthboundMsg> {
    // Fetch interface attributes.
    let ifindex = msg.header.index;
    let mut ifname = None;
    let mut mtu = None;
    let mut mac_address = None;
    let mut flags = InterfaceFlags::empty();
    if msg.header.link_layer_type == LinkLayerType::Loopback {
        flags.insert(InterfaceFlags::LOOPBACK);
    }
    if msg.header.flags.contains(LinkFlags::Running) {
        flags.insert(InterfaceFlags::OPERATIVE);
    }
    if msg.header.flags.contains(LinkFlags::Multicast) {
        flags.insert(InterfaceFlags::MULTICAST);
    }
    for attr in msg.attributes {
        match attr {
            LinkAttribute::IfName(attr_ifname) => ifname = Some(attr_ifname),
            LinkAttribute::Mtu(attr_mtu) => mtu = Some(attr_mtu),
            LinkAttribute::Address(addr) => {
                mac_address = MacAddr::try_from(addr.as_slice()).ok();
            }
            _ => (),
        }
    }
    let (Some(ifname), Some(mtu)) = (ifname, mtu) else {
        return None;
    };

    Some(SouthboundMsg::InterfaceUpd(InterfaceUpdateMsg {
        ifname,
        ifindex,
        mtu,
        flags,
        mac_address,
    }))
}

fn link_delete_msg(msg: LinkMessage) -> Option<SouthboundMsg> {
    let ifname = msg.attributes.into_iter().find_map(|attr| match attr {
        LinkAttribute::IfName(ifname) => Some(ifname),
        _ => None,
    })?;

    Some(SouthboundMsg::InterfaceDel(InterfaceDelMsg { ifname }))
}

fn address_msg(msg: AddressMessage) -> Option<AddressMsg> {
    if msg.header.family != AddressFamily::Inet6 {
        return None;
    }

    let addr = msg.attributes.into_iter().find_map(|attr| match attr {
        AddressAttribute::Address(IpAddr::V6(addr)) => Some(addr),
        _ => None,
    })?;
    let addr = Ipv6Network::new(addr, msg.header.prefix_len).ok()?;

    Some(AddressMsg {
        ifindex: msg.header.index,
        addr,
    })
}

fn route_msg(msg: RouteMessage) -> Option<RouteMsg> {
    if msg.header.address_family != AddressFamily::Inet6
        || msg.header.kind != RouteType::Unicast
    {
        return None;
    }

    // Fetch route attributes. Only directly connected routes are on-link.
    let mut dst = Ipv6Addr::UNSPECIFIED;
    let mut ifindex = None;
    for attr in msg.attributes {
        match attr {
            RouteAttribute::Destination(RouteAddress::Inet6(addr)) => {
                dst = addr;
            }
            RouteAttribute::Oif(oif) => ifindex = Some(oif),
            RouteAttribute::Gateway(_) | RouteAttribute::MultiPath(_) => {
                return None;
            }
            _ => (),
        }
    }
    let ifindex = ifindex?;
    let prefix =
        Ipv6Network::new(dst, msg.header.destination_prefix_length).ok()?;

    Some(RouteMsg { ifindex, prefix })
}

// ===== global functions =====

// Translates a netlink notification into a kernel change feed message.
pub(crate) fn process_msg(
    msg: NetlinkMessage<RouteNetlinkMessage>,
) -> Option<SouthboundMsg> {
    let NetlinkPayload::InnerMessage(msg) = msg.payload else {
        return None;
    };

    match msg {
        RouteNetlinkMessage::NewLink(msg) => link_update_msg(msg),
        RouteNetlinkMessage::DelLink(msg) => link_delete_msg(msg),
        RouteNetlinkMessage::NewAddress(msg) => {
            address_msg(msg).map(SouthboundMsg::AddressAdd)
        }
        RouteNetlinkMessage::DelAddress(msg) => {
            address_msg(msg).map(SouthboundMsg::AddressDel)
        }
        RouteNetlinkMessage::NewRoute(msg) => {
            route_msg(msg).map(SouthboundMsg::RouteAdd)
        }
        RouteNetlinkMessage::DelRoute(msg) => {
            route_msg(msg).map(SouthboundMsg::RouteDel)
        }
        _ => None,
    }
}

// Feeds the current interfaces, addresses and routes to the instance, then
// starts monitoring their changes.
pub(crate) async fn init(instance: &mut Instance) -> NetlinkMonitor {
    // Create netlink socket.
    let (conn, handle, _) =
        new_connection().expect("Failed to create netlink socket");
    tokio::spawn(conn);

    // Fetch interface information.
    let mut links = handle.link().get().execute();
    while let Some(msg) = links
        .try_next()
        .await
        .expect("Failed to fetch interface information")
    {
        if let Some(msg) = link_update_msg(msg) {
            instance.process_southbound(msg);
        }
    }

    // Fetch address information.
    let mut addresses = handle.address().get().execute();
    while let Some(msg) = addresses
        .try_next()
        .await
        .expect("Failed to fetch interface address information")
    {
        if let Some(msg) = address_msg(msg) {
            instance.process_southbound(SouthboundMsg::AddressAdd(msg));
        }
    }

    // Fetch route information.
    let filter = RouteMessageBuilder::<Ipv6Addr>::new().build();
    let mut routes = handle.route().get(filter).execute();
    while let Some(msg) = routes
        .try_next()
        .await
        .expect("Failed to fetch route information")
    {
        if let Some(msg) = route_msg(msg) {
            instance.process_southbound(SouthboundMsg::RouteAdd(msg));
        }
    }

    // Start netlink monitor.
    let (mut conn, _, monitor) =
        new_connection().expect("Failed to create netlink socket");
    let groups = RTMGRP_LINK | RTMGRP_IPV6_IFADDR | RTMGRP_IPV6_ROUTE;
    let addr = SocketAddr::new(0, groups);
    conn.socket_mut()
        .socket_mut()
        .bind(&addr)
        .expect("Failed to bind netlink socket");
    tokio::spawn(conn);

    monitor
}

// ===== unit tests =====
