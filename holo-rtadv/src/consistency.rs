//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;
use std::time::Duration;

use ipnetwork::Ipv6Network;
use tokio::time::Instant;
use tracing::{warn, warn_span};

use crate::debug::Debug;
use crate::interface::Interface;
use crate::packet::{RaFlags, RouterAdvert};
use crate::prefix::Lifetime;

// Mismatch between a received Router Advertisement and our own
// configuration. Each variant holds the local value followed by the peer's.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Inconsistency {
    CurHopLimit(u8, u8),
    ManagedFlag(bool, bool),
    OtherConfigFlag(bool, bool),
    ReachableTime(u32, u32),
    RetransTimer(u32, u32),
    LinkMtu(u32, u32),
    PreferredLifetime(Ipv6Network, u32, u32),
    ValidLifetime(Ipv6Network, u32, u32),
}

// ===== impl Inconsistency =====

impl Inconsistency {
    pub(crate) fn log(&self, ifname: &str, source: &Ipv6Addr) {
        warn_span!("interface", name = %ifname).in_scope(|| match self {
            Inconsistency::CurHopLimit(ours, theirs) => {
                warn!(%source, %ours, %theirs, "{}", self);
            }
            Inconsistency::ManagedFlag(ours, theirs)
            | Inconsistency::OtherConfigFlag(ours, theirs) => {
                warn!(%source, %ours, %theirs, "{}", self);
            }
            Inconsistency::ReachableTime(ours, theirs)
            | Inconsistency::RetransTimer(ours, theirs)
            | Inconsistency::LinkMtu(ours, theirs) => {
                warn!(%source, %ours, %theirs, "{}", self);
            }
            Inconsistency::PreferredLifetime(prefix, ours, theirs)
            | Inconsistency::ValidLifetime(prefix, ours, theirs) => {
                warn!(%source, %prefix, %ours, %theirs, "{}", self);
            }
        })
    }
}

impl std::fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let field = match self {
            Inconsistency::CurHopLimit(..) => "current hop limit",
            Inconsistency::ManagedFlag(..) => "managed flag",
            Inconsistency::OtherConfigFlag(..) => "other configuration flag",
            Inconsistency::ReachableTime(..) => "reachable time",
            Inconsistency::RetransTimer(..) => "retrans timer",
            Inconsistency::LinkMtu(..) => "MTU",
            Inconsistency::PreferredLifetime(..) => "preferred lifetime",
            Inconsistency::ValidLifetime(..) => "valid lifetime",
        };
        write!(f, "inconsistent router advertisement: {field}")
    }
}

// ===== global functions =====

// Compares a Router Advertisement received from another router against the
// advertisement of this interface (RFC 4861 section 6.2.7).
//
// Numeric fields are only compared when both sides advertise a value. The
// result is purely observational.
pub(crate) fn check_advert(
    iface: &Interface,
    source: &Ipv6Addr,
    advert: &RouterAdvert,
    now: Instant,
) -> Vec<Inconsistency> {
    let config = &iface.config;
    let mut inconsistencies = vec![];

    if config.cur_hop_limit != 0
        && advert.cur_hop_limit != 0
        && config.cur_hop_limit != advert.cur_hop_limit
    {
        inconsistencies.push(Inconsistency::CurHopLimit(
            config.cur_hop_limit,
            advert.cur_hop_limit,
        ));
    }

    let managed = advert.flags.contains(RaFlags::MANAGED);
    if config.managed_flag != managed {
        inconsistencies
            .push(Inconsistency::ManagedFlag(config.managed_flag, managed));
    }
    let other = advert.flags.contains(RaFlags::OTHER);
    if config.other_config_flag != other {
        inconsistencies.push(Inconsistency::OtherConfigFlag(
            config.other_config_flag,
            other,
        ));
    }

    if let Some(inconsistency) = compare(
        config.reachable_time,
        advert.reachable_time,
        Inconsistency::ReachableTime,
    ) {
        inconsistencies.push(inconsistency);
    }
    if let Some(inconsistency) = compare(
        config.retrans_timer,
        advert.retrans_timer,
        Inconsistency::RetransTimer,
    ) {
        inconsistencies.push(inconsistency);
    }
    if let Some(inconsistency) = compare(
        iface.link_mtu().unwrap_or(0),
        advert.options.mtu.unwrap_or(0),
        Inconsistency::LinkMtu,
    ) {
        inconsistencies.push(inconsistency);
    }

    let skew = Duration::from_secs(config.clock_skew.into());
    for prefix_info in &advert.options.prefix_info {
        let Some(prefix) = iface.state.prefixes.get(&prefix_info.prefix) else {
            Debug::PrefixNotFound(&iface.name, source, &prefix_info.prefix)
                .log();
            continue;
        };

        if lifetime_mismatch(
            &prefix.preferred_lifetime,
            prefix_info.preferred_lifetime,
            now,
            skew,
        ) {
            inconsistencies.push(Inconsistency::PreferredLifetime(
                prefix.prefix,
                prefix.preferred_lifetime.value(now),
                prefix_info.preferred_lifetime,
            ));
        }
        if lifetime_mismatch(
            &prefix.valid_lifetime,
            prefix_info.valid_lifetime,
            now,
            skew,
        ) {
            inconsistencies.push(Inconsistency::ValidLifetime(
                prefix.prefix,
                prefix.valid_lifetime.value(now),
                prefix_info.valid_lifetime,
            ));
        }
    }

    inconsistencies
}

// ===== helper functions =====

fn compare(
    ours: u32,
    theirs: u32,
    inconsistency: fn(u32, u32) -> Inconsistency,
) -> Option<Inconsistency> {
    (ours != 0 && theirs != 0 && ours != theirs)
        .then(|| inconsistency(ours, theirs))
}

// Decrementing lifetimes are compared by their absolute expiration, within
// the configured clock skew.
fn lifetime_mismatch(
    ours: &Lifetime,
    theirs: u32,
    now: Instant,
    skew: Duration,
) -> bool {
    if theirs == 0 {
        return false;
    }
    match ours {
        Lifetime::Fixed(0) => false,
        Lifetime::Fixed(value) => *value != theirs,
        Lifetime::Decrementing(expiry) => {
            let peer_expiry = now + Duration::from_secs(theirs.into());
            let diff = if peer_expiry > *expiry {
                peer_expiry - *expiry
            } else {
                *expiry - peer_expiry
            };
            diff > skew
        }
    }
}

// ===== unit tests =====
