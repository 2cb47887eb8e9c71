//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use chrono::{DateTime, TimeDelta, Utc};
use holo_utils::southbound::InterfaceFlags;
use ipnetwork::Ipv6Network;
use serde::Serialize;
use tokio::time::Instant;

use crate::instance::TimerKey;
use crate::interface::{Interface, Statistics};
use crate::packet::RouterPreference;
use crate::prefix::PrefixOrigin;
use crate::timer::TimerWheel;

// Read-only view of an advertising interface.
#[derive(Debug, Serialize)]
pub struct InterfaceSnapshot {
    pub name: String,
    pub ifindex: Option<u32>,
    pub status: InterfaceStatus,
    pub flags: String,
    pub max_rtr_adv_interval: u32,
    pub min_rtr_adv_interval: u32,
    pub router_lifetime: u32,
    pub router_preference: RouterPreference,
    pub cur_hop_limit: u8,
    pub reachable_time: u32,
    pub retrans_timer: u32,
    pub link_mtu: Option<u32>,
    pub last_sent: Option<DateTime<Utc>>,
    pub next_send: Option<DateTime<Utc>>,
    pub waiting: u32,
    pub init_counter: u32,
    pub statistics: Statistics,
    pub prefixes: Vec<PrefixSnapshot>,
    pub routes: Vec<RouteSnapshot>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceStatus {
    Advertising,
    Down,
}

#[derive(Debug, Serialize)]
pub struct PrefixSnapshot {
    pub prefix: Ipv6Network,
    pub origin: PrefixOrigin,
    pub on_link: bool,
    pub autonomous: bool,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub decrementing: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RouteSnapshot {
    pub prefix: Ipv6Network,
    pub preference: RouterPreference,
    pub lifetime: u32,
}

// ===== global functions =====

pub(crate) fn snapshot(
    iface: &Interface,
    timers: &TimerWheel<TimerKey>,
    now: Instant,
) -> InterfaceSnapshot {
    let wall_now = Utc::now();
    let to_wall = |instant: Instant| wall_clock(instant, now, wall_now);
    let config = &iface.config;
    let state = &iface.state;

    let status = if state.active {
        InterfaceStatus::Advertising
    } else {
        InterfaceStatus::Down
    };
    let prefixes = state
        .prefixes
        .iter()
        .map(|prefix| {
            let (valid_lifetime, preferred_lifetime) = prefix.lifetimes(now);
            PrefixSnapshot {
                prefix: prefix.prefix,
                origin: prefix.origin,
                on_link: prefix.on_link,
                autonomous: prefix.autonomous,
                valid_lifetime,
                preferred_lifetime,
                decrementing: prefix.has_decrementing_lifetime(),
                expires_at: prefix
                    .expire_timer
                    .and_then(|timer| timers.expiry(timer))
                    .map(to_wall),
            }
        })
        .collect();
    let routes = state
        .routes
        .iter()
        .map(|route| RouteSnapshot {
            prefix: route.prefix,
            preference: route.preference,
            lifetime: route.lifetime,
        })
        .collect();

    InterfaceSnapshot {
        name: iface.name.clone(),
        ifindex: iface.system.ifindex,
        status,
        flags: flags_string(iface),
        max_rtr_adv_interval: config.max_rtr_adv_interval,
        min_rtr_adv_interval: config.min_rtr_adv_interval(),
        router_lifetime: config.default_lifetime(),
        router_preference: config.router_preference,
        cur_hop_limit: config.cur_hop_limit,
        reachable_time: config.reachable_time,
        retrans_timer: config.retrans_timer,
        link_mtu: iface.link_mtu(),
        last_sent: state.last_sent.map(to_wall),
        next_send: timers.expiry(state.send_timer).map(to_wall),
        waiting: state.waiting,
        init_counter: state.init_counter,
        statistics: state.statistics.clone(),
        prefixes,
        routes,
    }
}

// Writes the snapshots to the given file as pretty-printed JSON.
pub fn write(
    path: &Path,
    snapshots: &[InterfaceSnapshot],
) -> std::io::Result<()> {
    let data = serde_json::to_string_pretty(snapshots)?;
    std::fs::write(path, data)
}

// ===== helper functions =====

// Interface flags in the customary "<UP,MULTICAST>" form.
fn flags_string(iface: &Interface) -> String {
    let flags = iface.system.flags;
    let mut names = vec![];
    if flags.contains(InterfaceFlags::OPERATIVE) {
        names.push("UP");
    }
    if flags.contains(InterfaceFlags::LOOPBACK) {
        names.push("LOOPBACK");
    }
    if flags.contains(InterfaceFlags::MULTICAST) {
        names.push("MULTICAST");
    }
    if iface.config.managed_flag {
        names.push("MANAGED");
    }
    if iface.config.other_config_flag {
        names.push("OTHER");
    }
    format!("<{}>", names.join(","))
}

fn wall_clock(
    instant: Instant,
    now: Instant,
    wall_now: DateTime<Utc>,
) -> DateTime<Utc> {
    if instant >= now {
        let delta =
            TimeDelta::from_std(instant - now).unwrap_or(TimeDelta::zero());
        wall_now + delta
    } else {
        let delta =
            TimeDelta::from_std(now - instant).unwrap_or(TimeDelta::zero());
        wall_now - delta
    }
}
