//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use holo_utils::ip::Ipv6AddrExt;
use ipnetwork::Ipv6Network;
use tokio::time::Instant;

use crate::consistency;
use crate::consts::ND_HOP_LIMIT;
use crate::debug::Debug;
use crate::error::Error;
use crate::instance::{InstanceNet, InstanceState, TimerKey};
use crate::interface::Interface;
use crate::output;
use crate::packet::{Packet, RouterAdvert, RouterSolicit};
use crate::tasks::messages::input::NetRxPacketMsg;
use crate::timer::{TimerAction, TimerWheel};

// ===== Network packet receipt =====

pub(crate) fn process_packet(
    timers: &mut TimerWheel<TimerKey>,
    state: &mut InstanceState,
    msg: NetRxPacketMsg,
) -> Result<(), Error> {
    let Some(iface) = state.interfaces.get_mut_by_ifindex(msg.ifindex) else {
        return Err(Error::InterfaceNotFound(msg.ifindex));
    };

    // Ignore packets received on interfaces that aren't advertising.
    if !iface.state.active {
        return Ok(());
    }

    let packet = msg.packet.map_err(|error| {
        Error::PacketDecodeError(iface.name.clone(), msg.src, error)
    })?;
    Debug::PacketRx(&iface.name, &msg.src, &packet).log();

    // Packets not sent by an on-link node are discarded (RFC 4861 sections
    // 6.1.1 and 6.1.2).
    if msg.hop_limit != ND_HOP_LIMIT {
        return Err(Error::InvalidHopLimit(
            iface.name.clone(),
            msg.src,
            msg.hop_limit,
        ));
    }

    match packet {
        Packet::RouterSolicit(solicit) => {
            process_solicit(timers, iface, msg.src, &solicit)
        }
        Packet::RouterAdvert(advert) => process_advert(iface, msg.src, &advert),
    }
}

// Schedules a multicast response to a Router Solicitation (RFC 4861 section
// 6.2.6). Solicitations arriving while a response is pending are served by
// that same response.
pub(crate) fn process_solicit(
    timers: &mut TimerWheel<TimerKey>,
    iface: &mut Interface,
    src: Ipv6Addr,
    solicit: &RouterSolicit,
) -> Result<(), Error> {
    if src.is_unspecified() && solicit.options.src_lladdr.is_some() {
        return Err(Error::RsUnspecifiedSrcWithLladdr(iface.name.clone()));
    }

    iface.state.statistics.rs_rcvd += 1;

    if iface.state.waiting > 0 {
        iface.state.waiting += 1;
        Debug::SolicitCoalesced(&iface.name, iface.state.waiting).log();
        return Ok(());
    }

    let delay = iface.advert_delay(timers, Instant::now());
    iface.schedule_advert(timers, delay);
    iface.state.waiting = 1;

    Ok(())
}

// Checks a Router Advertisement sent by another router on the link.
pub(crate) fn process_advert(
    iface: &mut Interface,
    src: Ipv6Addr,
    advert: &RouterAdvert,
) -> Result<(), Error> {
    if !src.is_link_local() {
        return Err(Error::RaSrcNotLinkLocal(iface.name.clone(), src));
    }

    iface.state.statistics.ra_rcvd += 1;

    let inconsistencies =
        consistency::check_advert(iface, &src, advert, Instant::now());
    for inconsistency in &inconsistencies {
        inconsistency.log(&iface.name, &src);
    }
    iface.state.statistics.ra_inconsistent += inconsistencies.len() as u64;

    Ok(())
}

// ===== Timers =====

// Sends the pending advertisement and schedules the next periodic one.
pub(crate) fn process_send_timer(
    iface: &mut Interface,
    net: &InstanceNet,
) -> TimerAction {
    if !iface.state.active {
        return TimerAction::Remove;
    }

    output::send_advert(iface, net);

    let interval = iface.next_advert_interval();
    Debug::AdvertSchedule(&iface.name, interval).log();
    TimerAction::Reschedule(interval)
}

// Completes the withdrawal of a prefix.
pub(crate) fn process_prefix_expiry(
    timers: &mut TimerWheel<TimerKey>,
    iface: &mut Interface,
    prefix: &Ipv6Network,
) -> TimerAction {
    iface.delete_prefix(timers, prefix);
    TimerAction::Remove
}
