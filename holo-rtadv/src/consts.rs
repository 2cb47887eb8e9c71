//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;
use std::time::Duration;

// Multicast addresses.
pub const ALL_NODES: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1);
pub const ALL_ROUTERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 2);

// Hop limit of every ND message sent or accepted.
pub const ND_HOP_LIMIT: u8 = 255;

// Router constants (RFC 4861 section 10).
pub const MAX_INITIAL_RTR_ADVERT_INTERVAL: Duration = Duration::from_secs(16);
pub const MAX_INITIAL_RTR_ADVERTISEMENTS: u32 = 3;
pub const MIN_DELAY_BETWEEN_RAS: Duration = Duration::from_secs(3);
pub const MAX_RA_DELAY_TIME: Duration = Duration::from_millis(500);

// How long a withdrawn prefix keeps being advertised with zero lifetimes.
pub const PREFIX_INVALIDATION_TIME: Duration = Duration::from_secs(2 * 3600);

// Interface configuration defaults and limits.
pub const DFLT_MAX_RTR_ADV_INTERVAL: u32 = 600;
pub const MIN_MAX_RTR_ADV_INTERVAL: u32 = 4;
pub const MAX_MAX_RTR_ADV_INTERVAL: u32 = 1800;
pub const MIN_MIN_RTR_ADV_INTERVAL: u32 = 3;
pub const DFLT_CUR_HOP_LIMIT: u8 = 64;
pub const MAX_ROUTER_LIFETIME: u32 = 9000;
pub const MAX_REACHABLE_TIME: u32 = 3_600_000;
pub const MIN_LINK_MTU: u32 = 1280;

// Prefix defaults.
pub const DFLT_VALID_LIFETIME: u32 = 2_592_000;
pub const DFLT_PREFERRED_LIFETIME: u32 = 604_800;
pub const INFINITE_LIFETIME: u32 = 0xffff_ffff;
