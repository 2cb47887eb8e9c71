//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;
use std::time::Duration;

use ipnetwork::Ipv6Network;
use tracing::{debug, debug_span};

use crate::packet::{Packet, RouterAdvert};
use crate::prefix::PrefixOrigin;

// Router Advertisement daemon debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    InstanceStart,
    InstanceStop,
    InterfaceStart(&'a str),
    InterfaceStop(&'a str, InterfaceInactiveReason),
    // Prefixes
    PrefixAdd(&'a str, &'a Ipv6Network, PrefixOrigin),
    PrefixExists(&'a str, &'a Ipv6Network),
    PrefixDelete(&'a str, &'a Ipv6Network),
    PrefixInvalidate(&'a str, &'a Ipv6Network),
    PrefixRevalidate(&'a str, &'a Ipv6Network),
    PrefixNotFound(&'a str, &'a Ipv6Addr, &'a Ipv6Network),
    // Advertisements
    AdvertBuild(&'a str, &'a RouterAdvert),
    AdvertSchedule(&'a str, Duration),
    SolicitCoalesced(&'a str, u32),
    // Network
    PacketRx(&'a str, &'a Ipv6Addr, &'a Packet),
    PacketTx(&'a str, &'a Ipv6Addr, usize),
}

// Reason why an interface isn't advertising.
#[derive(Debug)]
pub enum InterfaceInactiveReason {
    OperationalDown,
    MissingIfindex,
    Loopback,
    Removed,
    Shutdown,
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub(crate) fn log(&self) {
        match self {
            Debug::InstanceStart | Debug::InstanceStop => {
                debug!("{}", self);
            }
            Debug::InterfaceStart(ifname) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!("{}", self);
                });
            }
            Debug::InterfaceStop(ifname, reason) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(%reason, "{}", self);
                });
            }
            Debug::PrefixAdd(ifname, prefix, origin) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(%prefix, %origin, "{}", self);
                });
            }
            Debug::PrefixExists(ifname, prefix)
            | Debug::PrefixDelete(ifname, prefix)
            | Debug::PrefixInvalidate(ifname, prefix)
            | Debug::PrefixRevalidate(ifname, prefix) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(%prefix, "{}", self);
                });
            }
            Debug::PrefixNotFound(ifname, source, prefix) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(%source, %prefix, "{}", self);
                });
            }
            Debug::AdvertBuild(ifname, advert) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    let data = serde_json::to_string(&advert).unwrap();
                    debug!(%data, "{}", self);
                });
            }
            Debug::AdvertSchedule(ifname, delay) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(delay = ?delay, "{}", self);
                });
            }
            Debug::SolicitCoalesced(ifname, waiting) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug!(%waiting, "{}", self);
                });
            }
            Debug::PacketRx(ifname, src, packet) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug_span!("network").in_scope(|| {
                        debug_span!("input").in_scope(|| {
                            let data = serde_json::to_string(&packet).unwrap();
                            debug!(%src, %data, "{}", self);
                        })
                    })
                })
            }
            Debug::PacketTx(ifname, dst, length) => {
                debug_span!("interface", name = %ifname).in_scope(|| {
                    debug_span!("network").in_scope(|| {
                        debug_span!("output").in_scope(|| {
                            debug!(%dst, %length, "{}", self);
                        })
                    })
                })
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InstanceStart => {
                write!(f, "starting instance")
            }
            Debug::InstanceStop => {
                write!(f, "stopping instance")
            }
            Debug::InterfaceStart(..) => {
                write!(f, "starting advertisements")
            }
            Debug::InterfaceStop(..) => {
                write!(f, "stopping advertisements")
            }
            Debug::PrefixAdd(..) => {
                write!(f, "prefix added")
            }
            Debug::PrefixExists(..) => {
                write!(f, "prefix already present, ignoring")
            }
            Debug::PrefixDelete(..) => {
                write!(f, "prefix deleted")
            }
            Debug::PrefixInvalidate(..) => {
                write!(f, "prefix invalidated")
            }
            Debug::PrefixRevalidate(..) => {
                write!(f, "prefix revalidated")
            }
            Debug::PrefixNotFound(..) => {
                write!(f, "advertised prefix not found in local configuration")
            }
            Debug::AdvertBuild(..) => {
                write!(f, "router advertisement rebuilt")
            }
            Debug::AdvertSchedule(..) => {
                write!(f, "router advertisement scheduled")
            }
            Debug::SolicitCoalesced(..) => {
                write!(f, "router solicitation coalesced with pending response")
            }
            Debug::PacketRx(..) | Debug::PacketTx(..) => {
                write!(f, "packet")
            }
        }
    }
}

// ===== impl InterfaceInactiveReason =====

impl std::fmt::Display for InterfaceInactiveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceInactiveReason::OperationalDown => {
                write!(f, "operational status down")
            }
            InterfaceInactiveReason::MissingIfindex => {
                write!(f, "missing ifindex")
            }
            InterfaceInactiveReason::Loopback => {
                write!(f, "loopback interface")
            }
            InterfaceInactiveReason::Removed => {
                write!(f, "interface removed")
            }
            InterfaceInactiveReason::Shutdown => {
                write!(f, "daemon shutting down")
            }
        }
    }
}
