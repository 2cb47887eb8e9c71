//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use bytes::Bytes;
use tokio::time::Instant;

use crate::consts::{ALL_NODES, MAX_INITIAL_RTR_ADVERTISEMENTS};
use crate::debug::Debug;
use crate::instance::InstanceNet;
use crate::interface::Interface;
use crate::packet::options::{Dnssl, NdOptions, Rdnss};
use crate::packet::{Packet, RaFlags, RouterAdvert, RouterPreference};
use crate::tasks::messages::output::NetTxPacketMsg;

// ===== global functions =====

// Builds the Router Advertisement of the given interface from its current
// configuration and prefix set.
pub(crate) fn build_advert(
    iface: &Interface,
    router_lifetime: u16,
    now: Instant,
) -> RouterAdvert {
    let config = &iface.config;

    let mut flags = RaFlags::empty();
    if config.managed_flag {
        flags.insert(RaFlags::MANAGED);
    }
    if config.other_config_flag {
        flags.insert(RaFlags::OTHER);
    }

    // The preference is meaningless for a router that isn't a default
    // router (RFC 4191 section 2.2).
    let preference = if router_lifetime == 0 {
        RouterPreference::Medium
    } else {
        config.router_preference
    };

    let src_lladdr = iface
        .system
        .mac_address
        .filter(|_| config.send_source_link_address)
        .filter(|addr| !addr.is_zero());

    let options = NdOptions {
        src_lladdr,
        mtu: iface.link_mtu(),
        prefix_info: iface
            .state
            .prefixes
            .iter()
            .map(|prefix| prefix.prefix_info(now))
            .collect(),
        route_info: iface
            .state
            .routes
            .iter()
            .map(|route| route.route_info())
            .collect(),
        rdnss: config
            .rdnss
            .iter()
            .map(|rdnss| Rdnss {
                lifetime: config.rdnss_lifetime(rdnss),
                servers: rdnss.servers.clone(),
            })
            .collect(),
        dnssl: config
            .dnssl
            .iter()
            .map(|dnssl| Dnssl {
                lifetime: config.dnssl_lifetime(dnssl),
                domains: dnssl.domains.clone(),
            })
            .collect(),
    };

    RouterAdvert {
        cur_hop_limit: config.cur_hop_limit,
        flags,
        preference,
        router_lifetime,
        reachable_time: config.reachable_time,
        retrans_timer: config.retrans_timer,
        options,
    }
}

// Returns the advertisement to send, rebuilding the cached copy if needed.
pub(crate) fn advert_packet(iface: &mut Interface, now: Instant) -> Bytes {
    if iface.needs_rebuild() {
        let router_lifetime = iface.config.default_lifetime() as u16;
        let advert = build_advert(iface, router_lifetime, now);
        Debug::AdvertBuild(&iface.name, &advert).log();
        iface.state.packet = Some(Packet::RouterAdvert(advert).encode());
    }

    iface.state.packet.clone().unwrap_or_default()
}

// Multicasts the periodic or solicited advertisement to all nodes.
pub(crate) fn send_advert(iface: &mut Interface, net: &InstanceNet) {
    let Some(ifindex) = iface.system.ifindex else {
        return;
    };
    let now = Instant::now();
    let packet = advert_packet(iface, now);

    send_packet(net, &iface.name, ifindex, packet);

    let state = &mut iface.state;
    state.last_sent = Some(now);
    state.waiting = 0;
    if state.init_counter < MAX_INITIAL_RTR_ADVERTISEMENTS {
        state.init_counter += 1;
    }
    state.statistics.ra_sent += 1;
}

// Announces that this router is no longer a default router.
pub(crate) fn send_final_advert(iface: &mut Interface, net: &InstanceNet) {
    let Some(ifindex) = iface.system.ifindex else {
        return;
    };
    let advert = build_advert(iface, 0, Instant::now());
    let packet = Packet::RouterAdvert(advert).encode();

    send_packet(net, &iface.name, ifindex, packet);
    iface.state.statistics.ra_sent += 1;
}

// ===== helper functions =====

fn send_packet(net: &InstanceNet, ifname: &str, ifindex: u32, packet: Bytes) {
    Debug::PacketTx(ifname, &ALL_NODES, packet.len()).log();

    let msg = NetTxPacketMsg {
        ifname: ifname.to_owned(),
        ifindex,
        dst: ALL_NODES,
        packet,
    };
    let _ = net.net_tx_packetp.send(msg);
}
