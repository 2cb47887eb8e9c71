//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use holo_utils::ip::Ipv6NetworkExt;
use holo_utils::southbound::{
    AddressMsg, InterfaceDelMsg, InterfaceUpdateMsg, RouteMsg, SouthboundMsg,
};
use ipnetwork::Ipv6Network;

use crate::debug::InterfaceInactiveReason;
use crate::instance::{InstanceState, TimerKey};
use crate::interface::InterfaceSys;
use crate::prefix::{Prefix, PrefixOrigin};
use crate::timer::TimerWheel;

// ===== global functions =====

pub(crate) fn process_msg(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: SouthboundMsg,
) {
    match msg {
        SouthboundMsg::InterfaceUpd(msg) => {
            process_iface_update(timers, state, msg);
        }
        SouthboundMsg::InterfaceDel(msg) => {
            process_iface_del(timers, state, msg);
        }
        SouthboundMsg::AddressAdd(msg) => {
            process_addr_add(timers, state, msg);
        }
        SouthboundMsg::AddressDel(msg) => {
            process_addr_del(timers, state, msg);
        }
        SouthboundMsg::RouteAdd(msg) => {
            process_route_add(timers, state, msg);
        }
        SouthboundMsg::RouteDel(msg) => {
            process_route_del(timers, state, msg);
        }
    }
}

// ===== helper functions =====

fn process_iface_update(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: InterfaceUpdateMsg,
) {
    // Ignore interfaces that aren't configured.
    let Some(iface) = state.interfaces.get_mut(&msg.ifname) else {
        return;
    };

    // The interface was recreated under a different ifindex.
    if iface.state.active && iface.system.ifindex != Some(msg.ifindex) {
        iface.stop(timers, &state.net, InterfaceInactiveReason::Removed);
    }

    let mtu = Some(msg.mtu);
    if iface.system.mtu != mtu || iface.system.mac_address != msg.mac_address
    {
        iface.invalidate_packet();
        if iface.system.mtu != mtu {
            iface.system.mtu = mtu;
            iface.check_link_mtu();
        }
    }
    iface.system.ifindex = Some(msg.ifindex);
    iface.system.flags = msg.flags;
    iface.system.mac_address = msg.mac_address;

    iface.update(timers, &state.net);
}

fn process_iface_del(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: InterfaceDelMsg,
) {
    let Some(iface) = state.interfaces.get_mut(&msg.ifname) else {
        return;
    };

    iface.stop(timers, &state.net, InterfaceInactiveReason::Removed);
    iface.system = InterfaceSys::default();
    iface.invalidate_packet();
}

fn process_addr_add(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: AddressMsg,
) {
    prefix_add(timers, state, msg.ifindex, msg.addr, PrefixOrigin::Kernel);
}

fn process_addr_del(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: AddressMsg,
) {
    prefix_del(timers, state, msg.ifindex, msg.addr);
}

fn process_route_add(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: RouteMsg,
) {
    prefix_add(timers, state, msg.ifindex, msg.prefix, PrefixOrigin::Dynamic);
}

fn process_route_del(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: RouteMsg,
) {
    prefix_del(timers, state, msg.ifindex, msg.prefix);
}

// A prefix coming back before its withdrawal completes is revalidated.
// Otherwise it's added only to interfaces without configured prefixes.
fn prefix_add(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    ifindex: u32,
    network: Ipv6Network,
    origin: PrefixOrigin,
) {
    let Some(iface) = state.interfaces.get_mut_by_ifindex(ifindex) else {
        return;
    };
    let Some(network) = advertisable(network) else {
        return;
    };

    match iface.state.prefixes.get(&network) {
        Some(prefix) if prefix.is_expiring() => {
            iface.revalidate_prefix(timers, &network);
        }
        Some(_) => {}
        None if iface.auto_prefixes() => {
            iface.add_prefix(timers, Prefix::new(network, origin));
        }
        None => {}
    }
}

fn prefix_del(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    ifindex: u32,
    network: Ipv6Network,
) {
    let Some(iface) = state.interfaces.get_mut_by_ifindex(ifindex) else {
        return;
    };
    let Some(network) = advertisable(network) else {
        return;
    };

    iface.invalidate_prefix(timers, &network);
}

fn advertisable(network: Ipv6Network) -> Option<Ipv6Network> {
    let network = network.apply_mask();
    (network.is_routable() && !network.is_host_prefix()).then_some(network)
}
