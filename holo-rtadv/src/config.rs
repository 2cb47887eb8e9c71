//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeSet;
use std::net::Ipv6Addr;

use holo_utils::ip::Ipv6NetworkExt;
use ipnetwork::Ipv6Network;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::packet::RouterPreference;

// Per-interface advertising configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterfaceCfg {
    pub name: String,
    pub max_rtr_adv_interval: u32,
    pub min_rtr_adv_interval: Option<u32>,
    pub managed_flag: bool,
    pub other_config_flag: bool,
    pub router_preference: RouterPreference,
    pub link_mtu: u32,
    pub reachable_time: u32,
    pub retrans_timer: u32,
    pub cur_hop_limit: u8,
    pub default_lifetime: Option<u32>,
    pub send_source_link_address: bool,
    pub clock_skew: u32,
    pub prefixes: Vec<PrefixCfg>,
    pub routes: Vec<RouteCfg>,
    pub rdnss: Vec<RdnssCfg>,
    pub dnssl: Vec<DnsslCfg>,
}

// Statically configured prefix.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrefixCfg {
    pub prefix: Ipv6Network,
    #[serde(default = "default_true")]
    pub on_link: bool,
    #[serde(default = "default_true")]
    pub autonomous: bool,
    #[serde(default = "default_valid_lifetime")]
    pub valid_lifetime: u32,
    #[serde(default = "default_preferred_lifetime")]
    pub preferred_lifetime: u32,
    #[serde(default)]
    pub valid_lifetime_decrement: bool,
    #[serde(default)]
    pub preferred_lifetime_decrement: bool,
}

// More-specific route (RFC 4191).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteCfg {
    pub prefix: Ipv6Network,
    #[serde(default)]
    pub preference: RouterPreference,
    pub lifetime: Option<u32>,
}

// Recursive DNS servers (RFC 8106).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RdnssCfg {
    pub servers: Vec<Ipv6Addr>,
    pub lifetime: Option<u32>,
}

// DNS search list (RFC 8106).
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DnsslCfg {
    pub domains: Vec<String>,
    pub lifetime: Option<u32>,
}

// ===== impl InterfaceCfg =====

impl InterfaceCfg {
    pub fn new(name: impl Into<String>) -> InterfaceCfg {
        InterfaceCfg {
            name: name.into(),
            ..Default::default()
        }
    }

    // MinRtrAdvInterval in seconds. When unset it's derived from the
    // maximum as recommended by RFC 4861.
    pub fn min_rtr_adv_interval(&self) -> u32 {
        self.min_rtr_adv_interval.unwrap_or_else(|| {
            if self.max_rtr_adv_interval >= 9 {
                self.max_rtr_adv_interval * 33 / 100
            } else {
                self.max_rtr_adv_interval * 3 / 4
            }
        })
    }

    // Router lifetime in seconds.
    pub fn default_lifetime(&self) -> u32 {
        self.default_lifetime
            .unwrap_or(self.max_rtr_adv_interval * 3)
            .min(MAX_ROUTER_LIFETIME)
    }

    pub fn route_lifetime(&self, route: &RouteCfg) -> u32 {
        route.lifetime.unwrap_or(self.max_rtr_adv_interval * 3)
    }

    pub fn rdnss_lifetime(&self, rdnss: &RdnssCfg) -> u32 {
        rdnss.lifetime.unwrap_or(self.max_rtr_adv_interval * 2)
    }

    pub fn dnssl_lifetime(&self, dnssl: &DnsslCfg) -> u32 {
        dnssl.lifetime.unwrap_or(self.max_rtr_adv_interval * 2)
    }

    // Checks the configuration against the limits of RFC 4861 section 6.2.1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ifname = &self.name;
        if ifname.is_empty() {
            return Err(ConfigError::MissingName);
        }

        let max = self.max_rtr_adv_interval;
        if !(MIN_MAX_RTR_ADV_INTERVAL..=MAX_MAX_RTR_ADV_INTERVAL).contains(&max)
        {
            return Err(ConfigError::InvalidMaxInterval(ifname.clone(), max));
        }
        let min = self.min_rtr_adv_interval();
        if min < MIN_MIN_RTR_ADV_INTERVAL || min > max * 3 / 4 {
            return Err(ConfigError::InvalidMinInterval(ifname.clone(), min));
        }
        if let Some(lifetime) = self.default_lifetime
            && lifetime != 0
            && !(max..=MAX_ROUTER_LIFETIME).contains(&lifetime)
        {
            return Err(ConfigError::InvalidRouterLifetime(
                ifname.clone(),
                lifetime,
            ));
        }
        if self.reachable_time > MAX_REACHABLE_TIME {
            return Err(ConfigError::InvalidReachableTime(
                ifname.clone(),
                self.reachable_time,
            ));
        }
        // The upper bound depends on the physical MTU, which is checked once
        // it's known.
        if self.link_mtu != 0 && self.link_mtu < MIN_LINK_MTU {
            return Err(ConfigError::InvalidLinkMtu(
                ifname.clone(),
                self.link_mtu,
            ));
        }

        let mut prefixes = BTreeSet::new();
        for prefix_cfg in &self.prefixes {
            let prefix = prefix_cfg.prefix.apply_mask();
            if !prefix.is_routable() {
                return Err(ConfigError::InvalidPrefix(ifname.clone(), prefix));
            }
            if !prefixes.insert(prefix) {
                return Err(ConfigError::DuplicatePrefix(
                    ifname.clone(),
                    prefix,
                ));
            }
            if prefix_cfg.preferred_lifetime > prefix_cfg.valid_lifetime {
                return Err(ConfigError::PreferredExceedsValid(
                    ifname.clone(),
                    prefix,
                ));
            }
        }

        let mut routes = BTreeSet::new();
        for route_cfg in &self.routes {
            let prefix = route_cfg.prefix.apply_mask();
            if !routes.insert(prefix) {
                return Err(ConfigError::DuplicatePrefix(
                    ifname.clone(),
                    prefix,
                ));
            }
        }

        if self.rdnss.iter().any(|rdnss| rdnss.servers.is_empty()) {
            return Err(ConfigError::EmptyServerList(ifname.clone()));
        }
        for domain in self.dnssl.iter().flat_map(|dnssl| &dnssl.domains) {
            if !is_valid_domain(domain) {
                return Err(ConfigError::InvalidDomainName(
                    ifname.clone(),
                    domain.clone(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for InterfaceCfg {
    fn default() -> InterfaceCfg {
        InterfaceCfg {
            name: String::new(),
            max_rtr_adv_interval: DFLT_MAX_RTR_ADV_INTERVAL,
            min_rtr_adv_interval: None,
            managed_flag: false,
            other_config_flag: false,
            router_preference: RouterPreference::Medium,
            link_mtu: 0,
            reachable_time: 0,
            retrans_timer: 0,
            cur_hop_limit: DFLT_CUR_HOP_LIMIT,
            default_lifetime: None,
            send_source_link_address: true,
            clock_skew: 0,
            prefixes: vec![],
            routes: vec![],
            rdnss: vec![],
            dnssl: vec![],
        }
    }
}

// ===== impl PrefixCfg =====

impl PrefixCfg {
    pub fn new(prefix: Ipv6Network) -> PrefixCfg {
        PrefixCfg {
            prefix,
            on_link: true,
            autonomous: true,
            valid_lifetime: DFLT_VALID_LIFETIME,
            preferred_lifetime: DFLT_PREFERRED_LIFETIME,
            valid_lifetime_decrement: false,
            preferred_lifetime_decrement: false,
        }
    }
}

// ===== global functions =====

// Validates all interfaces and rejects duplicated names.
pub fn validate_interfaces(
    interfaces: &[InterfaceCfg],
) -> Result<(), ConfigError> {
    let mut names = BTreeSet::new();
    for iface_cfg in interfaces {
        iface_cfg.validate()?;
        if !names.insert(iface_cfg.name.as_str()) {
            return Err(ConfigError::DuplicateInterface(
                iface_cfg.name.clone(),
            ));
        }
    }

    Ok(())
}

// ===== helper functions =====

fn default_true() -> bool {
    true
}

fn default_valid_lifetime() -> u32 {
    DFLT_VALID_LIFETIME
}

fn default_preferred_lifetime() -> u32 {
    DFLT_PREFERRED_LIFETIME
}

fn is_valid_domain(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    !domain.is_empty()
        && domain
            .split('.')
            .all(|label| !label.is_empty() && label.len() <= 63)
}

// ===== unit tests =====
