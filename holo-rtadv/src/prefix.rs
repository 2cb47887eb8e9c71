//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::time::Duration;

use holo_utils::ip::Ipv6NetworkExt;
use ipnetwork::Ipv6Network;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::config::{InterfaceCfg, PrefixCfg, RouteCfg};
use crate::consts::{
    DFLT_PREFERRED_LIFETIME, DFLT_VALID_LIFETIME, INFINITE_LIFETIME,
};
use crate::packet::RouterPreference;
use crate::packet::options::{PrefixInfo, PrefixInfoFlags, RouteInfo};
use crate::timer::TimerHandle;

// Where an advertised prefix came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixOrigin {
    Config,
    Kernel,
    Dynamic,
}

// Prefix lifetime, either a fixed value or an absolute expiration that
// counts down in real time.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Lifetime {
    Fixed(u32),
    Decrementing(Instant),
}

#[derive(Debug)]
pub struct Prefix {
    pub prefix: Ipv6Network,
    pub origin: PrefixOrigin,
    pub on_link: bool,
    pub autonomous: bool,
    pub valid_lifetime: Lifetime,
    pub preferred_lifetime: Lifetime,
    // Armed while the prefix is being withdrawn.
    pub expire_timer: Option<TimerHandle>,
}

#[derive(Clone, Debug)]
pub struct Route {
    pub prefix: Ipv6Network,
    pub preference: RouterPreference,
    pub lifetime: u32,
}

#[derive(Debug, Default)]
pub struct Prefixes(BTreeMap<Ipv6Network, Prefix>);

#[derive(Debug, Default)]
pub struct Routes(BTreeMap<Ipv6Network, Route>);

// ===== impl PrefixOrigin =====

impl std::fmt::Display for PrefixOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOrigin::Config => write!(f, "static"),
            PrefixOrigin::Kernel => write!(f, "kernel"),
            PrefixOrigin::Dynamic => write!(f, "dynamic"),
        }
    }
}

// ===== impl Lifetime =====

impl Lifetime {
    // An infinite lifetime never decrements.
    pub fn new(value: u32, decrement: bool, now: Instant) -> Lifetime {
        if decrement && value != INFINITE_LIFETIME {
            Lifetime::Decrementing(now + Duration::from_secs(value.into()))
        } else {
            Lifetime::Fixed(value)
        }
    }

    // Returns the lifetime in seconds as seen at `now`.
    pub fn value(&self, now: Instant) -> u32 {
        match self {
            Lifetime::Fixed(value) => *value,
            Lifetime::Decrementing(expiry) => {
                let remaining = expiry.saturating_duration_since(now);
                u32::try_from(remaining.as_secs()).unwrap_or(u32::MAX)
            }
        }
    }

    pub fn is_decrementing(&self) -> bool {
        matches!(self, Lifetime::Decrementing(_))
    }
}

// ===== impl Prefix =====

impl Prefix {
    // Creates a prefix learned from the kernel, using the default
    // attributes.
    pub fn new(prefix: Ipv6Network, origin: PrefixOrigin) -> Prefix {
        Prefix {
            prefix,
            origin,
            on_link: true,
            autonomous: true,
            valid_lifetime: Lifetime::Fixed(DFLT_VALID_LIFETIME),
            preferred_lifetime: Lifetime::Fixed(DFLT_PREFERRED_LIFETIME),
            expire_timer: None,
        }
    }

    pub fn from_config(prefix_cfg: &PrefixCfg, now: Instant) -> Prefix {
        Prefix {
            prefix: prefix_cfg.prefix.apply_mask(),
            origin: PrefixOrigin::Config,
            on_link: prefix_cfg.on_link,
            autonomous: prefix_cfg.autonomous,
            valid_lifetime: Lifetime::new(
                prefix_cfg.valid_lifetime,
                prefix_cfg.valid_lifetime_decrement,
                now,
            ),
            preferred_lifetime: Lifetime::new(
                prefix_cfg.preferred_lifetime,
                prefix_cfg.preferred_lifetime_decrement,
                now,
            ),
            expire_timer: None,
        }
    }

    // Returns whether the prefix is being withdrawn.
    pub fn is_expiring(&self) -> bool {
        self.expire_timer.is_some()
    }

    pub fn has_decrementing_lifetime(&self) -> bool {
        self.valid_lifetime.is_decrementing()
            || self.preferred_lifetime.is_decrementing()
    }

    // Returns the (valid, preferred) lifetimes to advertise.
    //
    // A prefix being withdrawn reports zero lifetimes, and the preferred
    // lifetime never exceeds the valid lifetime.
    pub fn lifetimes(&self, now: Instant) -> (u32, u32) {
        if self.is_expiring() {
            return (0, 0);
        }
        let valid = self.valid_lifetime.value(now);
        let preferred = self.preferred_lifetime.value(now).min(valid);
        (valid, preferred)
    }

    pub fn prefix_info(&self, now: Instant) -> PrefixInfo {
        let mut flags = PrefixInfoFlags::empty();
        if self.on_link {
            flags.insert(PrefixInfoFlags::ON_LINK);
        }
        if self.autonomous {
            flags.insert(PrefixInfoFlags::AUTONOMOUS);
        }
        let (valid_lifetime, preferred_lifetime) = self.lifetimes(now);

        PrefixInfo {
            prefix: self.prefix,
            flags,
            valid_lifetime,
            preferred_lifetime,
        }
    }
}

// ===== impl Route =====

impl Route {
    pub fn from_config(
        iface_cfg: &InterfaceCfg,
        route_cfg: &RouteCfg,
    ) -> Route {
        Route {
            prefix: route_cfg.prefix.apply_mask(),
            preference: route_cfg.preference,
            lifetime: iface_cfg.route_lifetime(route_cfg),
        }
    }

    pub fn route_info(&self) -> RouteInfo {
        RouteInfo {
            prefix: self.prefix,
            preference: self.preference,
            lifetime: self.lifetime,
        }
    }
}

// ===== impl Prefixes =====

impl Prefixes {
    // Adds a prefix, returning `false` if one with the same address and
    // length is already present. The existing entry is left untouched.
    pub fn insert(&mut self, prefix: Prefix) -> bool {
        match self.0.entry(prefix.prefix) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(prefix);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn remove(&mut self, prefix: &Ipv6Network) -> Option<Prefix> {
        self.0.remove(prefix)
    }

    pub fn get(&self, prefix: &Ipv6Network) -> Option<&Prefix> {
        self.0.get(prefix)
    }

    pub fn get_mut(&mut self, prefix: &Ipv6Network) -> Option<&mut Prefix> {
        self.0.get_mut(prefix)
    }

    pub fn contains(&self, prefix: &Ipv6Network) -> bool {
        self.0.contains_key(prefix)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Prefix> + '_ {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ===== impl Routes =====

impl Routes {
    pub fn insert(&mut self, route: Route) -> bool {
        match self.0.entry(route.prefix) {
            btree_map::Entry::Vacant(entry) => {
                entry.insert(route);
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> + '_ {
        self.0.values()
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn net(s: &str) -> Ipv6Network {
        s.parse().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_decrementing_lifetime() {
        let now = Instant::now();
        let lifetime = Lifetime::new(100, true, now);
        assert_eq!(lifetime.value(now), 100);

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(lifetime.value(Instant::now()), 60);

        tokio::time::advance(Duration::from_secs(100)).await;
        assert_eq!(lifetime.value(Instant::now()), 0);
    }

    #[test]
    fn test_infinite_lifetime_is_fixed() {
        let now = Instant::now();
        let lifetime = Lifetime::new(INFINITE_LIFETIME, true, now);
        assert_eq!(lifetime, Lifetime::Fixed(INFINITE_LIFETIME));
    }

    #[test]
    fn test_preferred_capped_to_valid() {
        let now = Instant::now();
        let mut prefix = Prefix::new(net("2001:db8::/64"), PrefixOrigin::Kernel);
        prefix.valid_lifetime = Lifetime::Fixed(100);
        prefix.preferred_lifetime = Lifetime::Fixed(200);
        assert_eq!(prefix.lifetimes(now), (100, 100));
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut prefixes = Prefixes::default();
        let mut first = Prefix::new(net("2001:db8::/64"), PrefixOrigin::Config);
        first.on_link = false;
        assert!(prefixes.insert(first));
        assert!(!prefixes.insert(Prefix::new(
            net("2001:db8::/64"),
            PrefixOrigin::Kernel
        )));
        assert_eq!(prefixes.len(), 1);

        let prefix = prefixes.get(&net("2001:db8::/64")).unwrap();
        assert_eq!(prefix.origin, PrefixOrigin::Config);
        assert!(!prefix.on_link);
    }

    #[test]
    fn test_config_prefix_is_masked() {
        let now = Instant::now();
        let prefix_cfg = PrefixCfg::new(net("2001:db8::1/64"));
        let prefix = Prefix::from_config(&prefix_cfg, now);
        assert_eq!(prefix.prefix, net("2001:db8::/64"));

        let iface_cfg = InterfaceCfg::new("eth0");
        let route_cfg = RouteCfg {
            prefix: net("2001:db8:1:1::1/48"),
            preference: RouterPreference::High,
            lifetime: None,
        };
        let route = Route::from_config(&iface_cfg, &route_cfg);
        assert_eq!(route.prefix, net("2001:db8:1::/48"));
    }
}
