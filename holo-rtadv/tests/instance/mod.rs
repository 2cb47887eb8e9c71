//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;
use std::sync::Arc;
use std::time::Duration;

use const_addrs::{ip6, net6};
use holo_rtadv::config::{InterfaceCfg, PrefixCfg};
use holo_rtadv::dump::InterfaceStatus;
use holo_rtadv::instance::{Instance, InstanceNet};
use holo_rtadv::interface::Interface;
use holo_rtadv::network;
use holo_rtadv::packet::options::{NdOptions, PrefixInfo, PrefixInfoFlags};
use holo_rtadv::packet::{
    Packet, RaFlags, RouterAdvert, RouterPreference, RouterSolicit,
};
use holo_rtadv::prefix::PrefixOrigin;
use holo_rtadv::tasks::messages::input::NetRxPacketMsg;
use holo_rtadv::tasks::messages::output::NetTxPacketMsg;
use holo_utils::UnboundedReceiver;
use holo_utils::mac_addr::MacAddr;
use holo_utils::socket::AsyncFd;
use holo_utils::southbound::{
    AddressMsg, InterfaceFlags, InterfaceUpdateMsg, RouteMsg, SouthboundMsg,
};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

const IFNAME: &str = "eth0";
const IFINDEX: u32 = 2;
const PEER: Ipv6Addr = ip6!("fe80::2");

//
// Helper functions.
//

fn instance(
    iface_cfg: InterfaceCfg,
) -> (Instance, UnboundedReceiver<NetTxPacketMsg>) {
    let (net_tx_packetp, net_tx_packetc) = mpsc::unbounded_channel();
    let socket = network::socket().unwrap();
    let net = InstanceNet {
        socket: Arc::new(AsyncFd::new(socket).unwrap()),
        net_tx_packetp,
    };
    let instance = Instance::new(&[iface_cfg], net).unwrap();
    (instance, net_tx_packetc)
}

fn iface_cfg() -> InterfaceCfg {
    let mut iface_cfg = InterfaceCfg::new(IFNAME);
    iface_cfg.max_rtr_adv_interval = 10;
    iface_cfg.min_rtr_adv_interval = Some(3);
    iface_cfg
}

fn iface_update(instance: &mut Instance, flags: InterfaceFlags) {
    let msg = InterfaceUpdateMsg {
        ifname: IFNAME.to_owned(),
        ifindex: IFINDEX,
        mtu: 1500,
        flags,
        mac_address: Some(MacAddr::from([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55,
        ])),
    };
    instance.process_southbound(SouthboundMsg::InterfaceUpd(msg));
}

fn iface_up(instance: &mut Instance) {
    iface_update(
        instance,
        InterfaceFlags::OPERATIVE | InterfaceFlags::MULTICAST,
    );
}

fn iface(instance: &Instance) -> &Interface {
    instance.state.interfaces.get(IFNAME).unwrap()
}

fn packet_rx(
    instance: &mut Instance,
    src: Ipv6Addr,
    hop_limit: u8,
    packet: Packet,
) {
    let msg = NetRxPacketMsg {
        ifindex: IFINDEX,
        src,
        dst: ip6!("ff02::2"),
        hop_limit,
        packet: Ok(packet),
    };
    instance.process_net_rx(msg);
}

fn solicit_rx(instance: &mut Instance) {
    let packet = Packet::RouterSolicit(RouterSolicit::default());
    packet_rx(instance, PEER, 255, packet);
}

// Returns the advertisements sent since the last call.
fn adverts_tx(
    net_tx_packetc: &mut UnboundedReceiver<NetTxPacketMsg>,
) -> Vec<RouterAdvert> {
    let mut adverts = vec![];
    while let Ok(msg) = net_tx_packetc.try_recv() {
        assert_eq!(msg.ifindex, IFINDEX);
        assert_eq!(msg.dst, ip6!("ff02::1"));
        let packet = Packet::decode(&msg.packet).unwrap();
        adverts.push(packet.into_router_advert().unwrap());
    }
    adverts
}

fn peer_advert() -> RouterAdvert {
    RouterAdvert {
        cur_hop_limit: 64,
        flags: RaFlags::empty(),
        preference: RouterPreference::Medium,
        router_lifetime: 1800,
        reachable_time: 0,
        retrans_timer: 0,
        options: NdOptions {
            prefix_info: vec![PrefixInfo {
                prefix: net6!("2001:db8::/64"),
                flags: PrefixInfoFlags::ON_LINK | PrefixInfoFlags::AUTONOMOUS,
                valid_lifetime: 2592000,
                preferred_lifetime: 604800,
            }],
            ..Default::default()
        },
    }
}

//
// Tests.
//

#[tokio::test(start_paused = true)]
async fn test_prefix_withdrawal() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.prefixes.push(PrefixCfg::new(net6!("2001:db8::/64")));
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);

    // First advertisement goes out immediately.
    instance.tick();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    let prefix_info = &adverts[0].options.prefix_info;
    assert_eq!(prefix_info.len(), 1);
    assert_eq!(prefix_info[0].prefix, net6!("2001:db8::/64"));
    assert_eq!(prefix_info[0].valid_lifetime, 2592000);
    assert_eq!(prefix_info[0].preferred_lifetime, 604800);
    assert_eq!(adverts[0].router_lifetime, 30);

    // The address goes away one second later.
    time::advance(Duration::from_secs(1)).await;
    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressDel(msg));

    // The change is announced once MIN_DELAY_BETWEEN_RAS has elapsed.
    time::advance(Duration::from_secs(2)).await;
    instance.tick();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    let prefix_info = &adverts[0].options.prefix_info;
    assert_eq!(prefix_info.len(), 1);
    assert_eq!(prefix_info[0].valid_lifetime, 0);
    assert_eq!(prefix_info[0].preferred_lifetime, 0);

    // Once the grace period is over the prefix is gone.
    time::advance(Duration::from_secs(2 * 3600)).await;
    instance.tick();
    assert!(iface(&instance).state.prefixes.is_empty());
    adverts_tx(&mut net_tx_packetc);

    time::advance(Duration::from_secs(3)).await;
    instance.tick();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    assert!(adverts[0].options.prefix_info.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_config_prefix_host_bits() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.prefixes.push(PrefixCfg::new(net6!("2001:db8::1/64")));
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);

    // The prefix is advertised and stored without its host bits.
    instance.tick();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    let prefix_info = &adverts[0].options.prefix_info;
    assert_eq!(prefix_info.len(), 1);
    assert_eq!(prefix_info[0].prefix, net6!("2001:db8::/64"));
    assert!(
        iface(&instance)
            .state
            .prefixes
            .contains(&net6!("2001:db8::/64"))
    );

    // Peer advertisements for the prefix are cross-checked.
    let mut advert = peer_advert();
    advert.options.prefix_info[0].valid_lifetime = 100;
    packet_rx(&mut instance, PEER, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 1);

    // Removing the address withdraws the prefix.
    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressDel(msg));
    let prefix = iface(&instance)
        .state
        .prefixes
        .get(&net6!("2001:db8::/64"))
        .unwrap();
    assert!(prefix.is_expiring());

    time::advance(Duration::from_secs(3)).await;
    instance.tick();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    let prefix_info = &adverts[0].options.prefix_info;
    assert_eq!(prefix_info.len(), 1);
    assert_eq!(prefix_info[0].valid_lifetime, 0);
    assert_eq!(prefix_info[0].preferred_lifetime, 0);
}

#[tokio::test(start_paused = true)]
async fn test_solicit_coalescing() {
    let iface_cfg = InterfaceCfg::new(IFNAME);
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();
    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 1);

    // The next periodic advertisement is 16 seconds away.
    time::advance(Duration::from_secs(10)).await;
    solicit_rx(&mut instance);
    solicit_rx(&mut instance);
    solicit_rx(&mut instance);
    assert_eq!(iface(&instance).state.waiting, 3);
    assert_eq!(iface(&instance).state.statistics.rs_rcvd, 3);

    time::advance(Duration::from_millis(500)).await;
    instance.tick();
    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 1);
    assert_eq!(iface(&instance).state.waiting, 0);
}

#[tokio::test(start_paused = true)]
async fn test_solicit_rate_limit() {
    let iface_cfg = InterfaceCfg::new(IFNAME);
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();
    adverts_tx(&mut net_tx_packetc);

    time::advance(Duration::from_secs(1)).await;
    solicit_rx(&mut instance);
    let send_timer = iface(&instance).state.send_timer;
    assert_eq!(
        instance.timers.remaining(send_timer),
        Some(Duration::from_secs(2))
    );

    time::advance(Duration::from_millis(1999)).await;
    instance.tick();
    assert!(adverts_tx(&mut net_tx_packetc).is_empty());

    time::advance(Duration::from_millis(1)).await;
    instance.tick();
    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_initial_advertisements() {
    let iface_cfg = InterfaceCfg::new(IFNAME);
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);

    assert_eq!(instance.tick(), Some(Duration::from_secs(16)));
    time::advance(Duration::from_secs(16)).await;
    assert_eq!(instance.tick(), Some(Duration::from_secs(16)));
    time::advance(Duration::from_secs(16)).await;
    let next = instance.tick().unwrap();
    assert!(next >= Duration::from_secs(198));
    assert!(next <= Duration::from_secs(600));

    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 3);
    assert_eq!(iface(&instance).state.init_counter, 3);
    assert_eq!(iface(&instance).state.statistics.ra_sent, 3);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_hop_limit() {
    let (mut instance, _net_tx_packetc) = instance(iface_cfg());
    iface_up(&mut instance);
    instance.tick();

    let packet = Packet::RouterSolicit(RouterSolicit::default());
    packet_rx(&mut instance, PEER, 64, packet);
    let packet = Packet::RouterAdvert(peer_advert());
    packet_rx(&mut instance, PEER, 1, packet);

    let statistics = &iface(&instance).state.statistics;
    assert_eq!(statistics.rs_rcvd, 0);
    assert_eq!(statistics.ra_rcvd, 0);
    assert_eq!(iface(&instance).state.waiting, 0);
}

#[tokio::test(start_paused = true)]
async fn test_solicit_unspecified_source() {
    let (mut instance, _net_tx_packetc) = instance(iface_cfg());
    iface_up(&mut instance);
    instance.tick();

    // Unspecified source with a link-layer address option.
    let packet = Packet::RouterSolicit(RouterSolicit {
        options: NdOptions {
            src_lladdr: Some(MacAddr::from([
                0x00, 0x11, 0x22, 0x33, 0x44, 0x66,
            ])),
            ..Default::default()
        },
    });
    packet_rx(&mut instance, Ipv6Addr::UNSPECIFIED, 255, packet);
    assert_eq!(iface(&instance).state.statistics.rs_rcvd, 0);

    // Unspecified source alone is fine.
    let packet = Packet::RouterSolicit(RouterSolicit::default());
    packet_rx(&mut instance, Ipv6Addr::UNSPECIFIED, 255, packet);
    assert_eq!(iface(&instance).state.statistics.rs_rcvd, 1);
    assert_eq!(iface(&instance).state.waiting, 1);
}

#[tokio::test(start_paused = true)]
async fn test_advert_consistency() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.prefixes.push(PrefixCfg::new(net6!("2001:db8::/64")));
    let (mut instance, _net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();

    // Same values.
    let packet = Packet::RouterAdvert(peer_advert());
    packet_rx(&mut instance, PEER, 255, packet);
    assert_eq!(iface(&instance).state.statistics.ra_rcvd, 1);
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 0);

    // Managed flag differs.
    let mut advert = peer_advert();
    advert.flags = RaFlags::MANAGED;
    packet_rx(&mut instance, PEER, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 1);

    // Hop limit differs, unset reachable time is never compared.
    let mut advert = peer_advert();
    advert.cur_hop_limit = 32;
    advert.reachable_time = 30000;
    packet_rx(&mut instance, PEER, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 2);

    // Valid lifetime differs.
    let mut advert = peer_advert();
    advert.options.prefix_info[0].valid_lifetime = 100;
    packet_rx(&mut instance, PEER, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 3);

    // Unknown prefixes are ignored.
    let mut advert = peer_advert();
    advert.options.prefix_info[0].prefix = net6!("2001:db8:1::/64");
    advert.options.prefix_info[0].valid_lifetime = 100;
    packet_rx(&mut instance, PEER, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 3);

    // Advertisements from a global source are dropped.
    let mut advert = peer_advert();
    advert.flags = RaFlags::MANAGED;
    let src = ip6!("2001:db8::2");
    packet_rx(&mut instance, src, 255, Packet::RouterAdvert(advert));
    assert_eq!(iface(&instance).state.statistics.ra_rcvd, 5);
    assert_eq!(iface(&instance).state.statistics.ra_inconsistent, 3);
}

#[tokio::test(start_paused = true)]
async fn test_kernel_prefixes() {
    let (mut instance, _net_tx_packetc) = instance(iface_cfg());
    iface_up(&mut instance);

    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressAdd(msg));
    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8::2/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressAdd(msg));
    let msg = RouteMsg {
        ifindex: IFINDEX,
        prefix: net6!("2001:db8::/64"),
    };
    instance.process_southbound(SouthboundMsg::RouteAdd(msg));

    // Link-local and host prefixes aren't advertised.
    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("fe80::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressAdd(msg));
    let msg = RouteMsg {
        ifindex: IFINDEX,
        prefix: net6!("2001:db8:1::1/128"),
    };
    instance.process_southbound(SouthboundMsg::RouteAdd(msg));

    let prefixes = &iface(&instance).state.prefixes;
    assert_eq!(prefixes.len(), 1);
    let prefix = prefixes.get(&net6!("2001:db8::/64")).unwrap();
    assert_eq!(prefix.origin, PrefixOrigin::Kernel);

    // Dynamic routes add new prefixes too.
    let msg = RouteMsg {
        ifindex: IFINDEX,
        prefix: net6!("2001:db8:2::/64"),
    };
    instance.process_southbound(SouthboundMsg::RouteAdd(msg));
    let prefixes = &iface(&instance).state.prefixes;
    assert_eq!(prefixes.len(), 2);
    let prefix = prefixes.get(&net6!("2001:db8:2::/64")).unwrap();
    assert_eq!(prefix.origin, PrefixOrigin::Dynamic);
}

#[tokio::test(start_paused = true)]
async fn test_configured_prefixes_ignore_kernel() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.prefixes.push(PrefixCfg::new(net6!("2001:db8::/64")));
    let (mut instance, _net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);

    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8:1::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressAdd(msg));

    let prefixes = &iface(&instance).state.prefixes;
    assert_eq!(prefixes.len(), 1);
    assert!(prefixes.contains(&net6!("2001:db8::/64")));
}

#[tokio::test(start_paused = true)]
async fn test_prefix_revalidation() {
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg());
    iface_up(&mut instance);
    instance.tick();

    let msg = AddressMsg {
        ifindex: IFINDEX,
        addr: net6!("2001:db8::1/64"),
    };
    instance.process_southbound(SouthboundMsg::AddressAdd(msg.clone()));
    instance.process_southbound(SouthboundMsg::AddressDel(msg.clone()));
    let prefix = iface(&instance)
        .state
        .prefixes
        .get(&net6!("2001:db8::/64"))
        .unwrap();
    assert!(prefix.is_expiring());

    time::advance(Duration::from_secs(60)).await;
    instance.process_southbound(SouthboundMsg::AddressAdd(msg));
    let prefix = iface(&instance)
        .state
        .prefixes
        .get(&net6!("2001:db8::/64"))
        .unwrap();
    assert!(!prefix.is_expiring());

    // The withdrawal timer no longer fires.
    time::advance(Duration::from_secs(2 * 3600)).await;
    instance.tick();
    assert_eq!(iface(&instance).state.prefixes.len(), 1);
    let adverts = adverts_tx(&mut net_tx_packetc);
    let advert = adverts.last().unwrap();
    assert_eq!(advert.options.prefix_info[0].valid_lifetime, 2592000);
}

#[tokio::test(start_paused = true)]
async fn test_decrementing_lifetimes() {
    let mut iface_cfg = InterfaceCfg::new(IFNAME);
    let mut prefix_cfg = PrefixCfg::new(net6!("2001:db8::/64"));
    prefix_cfg.valid_lifetime = 1000;
    prefix_cfg.valid_lifetime_decrement = true;
    prefix_cfg.preferred_lifetime = 500;
    iface_cfg.prefixes.push(prefix_cfg);
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);

    instance.tick();
    time::advance(Duration::from_secs(16)).await;
    instance.tick();

    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 2);
    let prefix_info = &adverts[0].options.prefix_info[0];
    assert_eq!(prefix_info.valid_lifetime, 1000);
    assert_eq!(prefix_info.preferred_lifetime, 500);
    let prefix_info = &adverts[1].options.prefix_info[0];
    assert_eq!(prefix_info.valid_lifetime, 984);
    assert_eq!(prefix_info.preferred_lifetime, 500);
}

#[tokio::test(start_paused = true)]
async fn test_advert_options() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.managed_flag = true;
    iface_cfg.router_preference = RouterPreference::High;
    iface_cfg.link_mtu = 1400;
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();

    let adverts = adverts_tx(&mut net_tx_packetc);
    let advert = &adverts[0];
    assert_eq!(advert.cur_hop_limit, 64);
    assert_eq!(advert.flags, RaFlags::MANAGED);
    assert_eq!(advert.preference, RouterPreference::High);
    assert_eq!(advert.options.mtu, Some(1400));
    assert_eq!(
        advert.options.src_lladdr,
        Some(MacAddr::from([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]))
    );
}

#[tokio::test(start_paused = true)]
async fn test_link_mtu_out_of_range() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.link_mtu = 9000;
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();

    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts[0].options.mtu, None);
}

#[tokio::test(start_paused = true)]
async fn test_interface_down() {
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg());
    assert_eq!(instance.next_deadline(), None);

    iface_up(&mut instance);
    assert_eq!(instance.next_deadline(), Some(Instant::now()));
    instance.tick();
    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 1);

    iface_update(&mut instance, InterfaceFlags::MULTICAST);
    assert!(!iface(&instance).state.active);
    assert_eq!(instance.next_deadline(), None);

    time::advance(Duration::from_secs(60)).await;
    instance.tick();
    assert!(adverts_tx(&mut net_tx_packetc).is_empty());

    // Coming back up restarts the initial advertisements.
    iface_up(&mut instance);
    instance.tick();
    assert_eq!(adverts_tx(&mut net_tx_packetc).len(), 1);
    assert_eq!(iface(&instance).state.init_counter, 1);
}

#[tokio::test(start_paused = true)]
async fn test_loopback_never_advertises() {
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg());
    iface_update(
        &mut instance,
        InterfaceFlags::OPERATIVE | InterfaceFlags::LOOPBACK,
    );
    instance.tick();
    assert!(!iface(&instance).state.active);
    assert!(adverts_tx(&mut net_tx_packetc).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.router_preference = RouterPreference::High;
    let (mut instance, mut net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();
    adverts_tx(&mut net_tx_packetc);

    instance.shutdown();
    let adverts = adverts_tx(&mut net_tx_packetc);
    assert_eq!(adverts.len(), 1);
    assert_eq!(adverts[0].router_lifetime, 0);
    assert_eq!(adverts[0].preference, RouterPreference::Medium);
    assert!(!iface(&instance).state.active);
    assert_eq!(instance.next_deadline(), None);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot() {
    let mut iface_cfg = iface_cfg();
    iface_cfg.prefixes.push(PrefixCfg::new(net6!("2001:db8::/64")));
    let (mut instance, _net_tx_packetc) = instance(iface_cfg);
    iface_up(&mut instance);
    instance.tick();
    solicit_rx(&mut instance);

    let snapshots = instance.snapshot();
    assert_eq!(snapshots.len(), 1);
    let snapshot = &snapshots[0];
    assert_eq!(snapshot.name, IFNAME);
    assert_eq!(snapshot.ifindex, Some(IFINDEX));
    assert_eq!(snapshot.status, InterfaceStatus::Advertising);
    assert_eq!(snapshot.flags, "<UP,MULTICAST>");
    assert!(snapshot.last_sent.is_some());
    assert!(snapshot.next_send.is_some());
    assert_eq!(snapshot.waiting, 1);
    assert_eq!(snapshot.statistics.ra_sent, 1);
    assert_eq!(snapshot.statistics.rs_rcvd, 1);
    assert_eq!(snapshot.prefixes.len(), 1);
    assert_eq!(snapshot.prefixes[0].origin, PrefixOrigin::Config);
    assert_eq!(snapshot.prefixes[0].valid_lifetime, 2592000);
    assert!(snapshot.prefixes[0].expires_at.is_none());

    let data = serde_json::to_string(&snapshots).unwrap();
    assert!(data.contains("\"status\":\"advertising\""));
}
