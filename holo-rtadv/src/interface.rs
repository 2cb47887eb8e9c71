//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use bytes::Bytes;
use holo_utils::mac_addr::MacAddr;
use holo_utils::southbound::InterfaceFlags;
use ipnetwork::Ipv6Network;
use rand::Rng;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::InterfaceCfg;
use crate::consts::{
    MAX_INITIAL_RTR_ADVERT_INTERVAL, MAX_INITIAL_RTR_ADVERTISEMENTS,
    MAX_RA_DELAY_TIME, MIN_DELAY_BETWEEN_RAS, MIN_LINK_MTU,
    PREFIX_INVALIDATION_TIME,
};
use crate::debug::{Debug, InterfaceInactiveReason};
use crate::error::{Error, IoError};
use crate::instance::{InstanceNet, TimerKey};
use crate::network;
use crate::prefix::{Prefix, Prefixes, Route, Routes};
use crate::timer::{TimerHandle, TimerWheel};

// Advertising context of a single interface.
#[derive(Debug)]
pub struct Interface {
    pub name: String,
    pub config: InterfaceCfg,
    pub system: InterfaceSys,
    pub state: InterfaceState,
}

// Interface attributes learned from the kernel.
#[derive(Debug, Default)]
pub struct InterfaceSys {
    pub ifindex: Option<u32>,
    pub mtu: Option<u32>,
    pub flags: InterfaceFlags,
    pub mac_address: Option<MacAddr>,
}

#[derive(Debug)]
pub struct InterfaceState {
    pub active: bool,
    pub prefixes: Prefixes,
    pub routes: Routes,
    // Cached Router Advertisement.
    pub packet: Option<Bytes>,
    pub last_sent: Option<Instant>,
    // Router Solicitations waiting for the pending response.
    pub waiting: u32,
    // Advertisements sent since the interface became active, capped at
    // MAX_INITIAL_RTR_ADVERTISEMENTS.
    pub init_counter: u32,
    pub send_timer: TimerHandle,
    pub statistics: Statistics,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Statistics {
    pub ra_sent: u64,
    pub ra_rcvd: u64,
    pub ra_inconsistent: u64,
    pub rs_rcvd: u64,
}

// ===== impl Interface =====

impl Interface {
    pub(crate) fn new(
        config: InterfaceCfg,
        timers: &mut TimerWheel<TimerKey>,
        now: Instant,
    ) -> Interface {
        let name = config.name.clone();
        let send_timer = timers.schedule(TimerKey::SendAdvert(name.clone()));

        let mut prefixes = Prefixes::default();
        for prefix_cfg in &config.prefixes {
            prefixes.insert(Prefix::from_config(prefix_cfg, now));
        }
        let mut routes = Routes::default();
        for route_cfg in &config.routes {
            routes.insert(Route::from_config(&config, route_cfg));
        }

        Interface {
            name,
            config,
            system: InterfaceSys::default(),
            state: InterfaceState {
                active: false,
                prefixes,
                routes,
                packet: None,
                last_sent: None,
                waiting: 0,
                init_counter: 0,
                send_timer,
                statistics: Default::default(),
            },
        }
    }

    // Checks whether the interface can send advertisements.
    pub(crate) fn is_ready(&self) -> Result<(), InterfaceInactiveReason> {
        if self.system.ifindex.is_none() {
            return Err(InterfaceInactiveReason::MissingIfindex);
        }
        if self.system.flags.contains(InterfaceFlags::LOOPBACK) {
            return Err(InterfaceInactiveReason::Loopback);
        }
        if !self.system.flags.contains(InterfaceFlags::OPERATIVE) {
            return Err(InterfaceInactiveReason::OperationalDown);
        }

        Ok(())
    }

    // Starts or stops advertising after a change in the interface state.
    pub(crate) fn update(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        net: &InstanceNet,
    ) {
        match self.is_ready() {
            Ok(()) if !self.state.active => {
                self.start(timers, net);
            }
            Err(reason) if self.state.active => {
                self.stop(timers, net, reason);
            }
            _ => (),
        }
    }

    fn start(&mut self, timers: &mut TimerWheel<TimerKey>, net: &InstanceNet) {
        Debug::InterfaceStart(&self.name).log();

        if let Some(ifindex) = self.system.ifindex
            && let Err(error) = network::join_multicast(&net.socket, ifindex)
        {
            IoError::MulticastJoinError(ifindex, error).log();
        }

        // The send timer is gone if it fired while the interface was
        // already down.
        if !timers.contains(self.state.send_timer) {
            self.state.send_timer =
                timers.schedule(TimerKey::SendAdvert(self.name.clone()));
        }

        self.state.active = true;
        self.state.init_counter = 0;
        self.state.waiting = 0;
        self.state.packet = None;
        self.check_link_mtu();
        timers.arm(self.state.send_timer, Duration::ZERO);
    }

    pub(crate) fn stop(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        net: &InstanceNet,
        reason: InterfaceInactiveReason,
    ) {
        if !self.state.active {
            return;
        }

        Debug::InterfaceStop(&self.name, reason).log();

        if let Some(ifindex) = self.system.ifindex
            && let Err(error) = network::leave_multicast(&net.socket, ifindex)
        {
            IoError::MulticastLeaveError(ifindex, error).log();
        }

        self.state.active = false;
        self.state.waiting = 0;
        timers.disarm(self.state.send_timer);
    }

    // Prefixes are learned from the kernel only when none is configured.
    pub(crate) fn auto_prefixes(&self) -> bool {
        self.config.prefixes.is_empty()
    }

    // Returns the link MTU to advertise, if any.
    pub(crate) fn link_mtu(&self) -> Option<u32> {
        let link_mtu = self.config.link_mtu;
        if link_mtu == 0 || link_mtu < MIN_LINK_MTU {
            return None;
        }
        if let Some(mtu) = self.system.mtu
            && link_mtu > mtu
        {
            return None;
        }
        Some(link_mtu)
    }

    pub(crate) fn check_link_mtu(&self) {
        let link_mtu = self.config.link_mtu;
        if link_mtu != 0 && self.link_mtu().is_none() {
            let mtu = self.system.mtu.unwrap_or(0);
            Error::InvalidLinkMtu(self.name.clone(), link_mtu, mtu).log();
        }
    }

    // Drops the cached advertisement so that the next send rebuilds it.
    pub(crate) fn invalidate_packet(&mut self) {
        self.state.packet = None;
    }

    pub(crate) fn add_prefix(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        prefix: Prefix,
    ) -> bool {
        let network = prefix.prefix;
        let origin = prefix.origin;
        if !self.state.prefixes.insert(prefix) {
            Debug::PrefixExists(&self.name, &network).log();
            return false;
        }

        Debug::PrefixAdd(&self.name, &network, origin).log();
        self.prefixes_changed(timers);
        true
    }

    pub(crate) fn delete_prefix(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        network: &Ipv6Network,
    ) -> bool {
        let Some(prefix) = self.state.prefixes.remove(network) else {
            return false;
        };
        if let Some(expire_timer) = prefix.expire_timer {
            timers.cancel(expire_timer);
        }

        Debug::PrefixDelete(&self.name, network).log();
        self.prefixes_changed(timers);
        true
    }

    // Starts the withdrawal of a prefix. It keeps being advertised with zero
    // lifetimes until the grace period expires.
    pub(crate) fn invalidate_prefix(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        network: &Ipv6Network,
    ) {
        let Some(prefix) = self.state.prefixes.get_mut(network) else {
            return;
        };
        if prefix.is_expiring() {
            return;
        }

        let expire_timer = timers
            .schedule(TimerKey::PrefixExpire(self.name.clone(), *network));
        timers.arm(expire_timer, PREFIX_INVALIDATION_TIME);
        prefix.expire_timer = Some(expire_timer);

        Debug::PrefixInvalidate(&self.name, network).log();
        self.prefixes_changed(timers);
    }

    pub(crate) fn revalidate_prefix(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        network: &Ipv6Network,
    ) {
        let Some(prefix) = self.state.prefixes.get_mut(network) else {
            return;
        };
        let Some(expire_timer) = prefix.expire_timer.take() else {
            return;
        };
        timers.cancel(expire_timer);

        Debug::PrefixRevalidate(&self.name, network).log();
        self.prefixes_changed(timers);
    }

    fn prefixes_changed(&mut self, timers: &mut TimerWheel<TimerKey>) {
        self.invalidate_packet();
        if self.state.active {
            let delay = self.advert_delay(timers, Instant::now());
            self.schedule_advert(timers, delay);
        }
    }

    // Computes the delay of an unscheduled advertisement, either a
    // solicited one or one announcing a change.
    //
    // A random delay up to MAX_RA_DELAY_TIME is picked, cut short if the
    // periodic advertisement is due sooner. Consecutive multicast
    // advertisements are kept at least MIN_DELAY_BETWEEN_RAS apart.
    pub(crate) fn advert_delay(
        &self,
        timers: &TimerWheel<TimerKey>,
        now: Instant,
    ) -> Duration {
        let max_delay = MAX_RA_DELAY_TIME.as_millis() as u64;
        let mut delay =
            Duration::from_millis(rand::rng().random_range(0..max_delay));

        if let Some(remaining) = timers.remaining(self.state.send_timer)
            && remaining < delay
        {
            delay = remaining;
        }

        if let Some(last_sent) = self.state.last_sent {
            let earliest = last_sent + MIN_DELAY_BETWEEN_RAS;
            if earliest > now + delay {
                delay = earliest - now;
            }
        }

        delay
    }

    pub(crate) fn schedule_advert(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        delay: Duration,
    ) {
        Debug::AdvertSchedule(&self.name, delay).log();
        timers.arm(self.state.send_timer, delay);
    }

    // Picks the interval until the next periodic advertisement. The first
    // few advertisements are sent at a faster pace.
    pub(crate) fn next_advert_interval(&self) -> Duration {
        let min = u64::from(self.config.min_rtr_adv_interval()) * 1000;
        let max = u64::from(self.config.max_rtr_adv_interval) * 1000;
        let mut interval =
            Duration::from_millis(rand::rng().random_range(min..=max));

        if self.state.init_counter < MAX_INITIAL_RTR_ADVERTISEMENTS
            && interval > MAX_INITIAL_RTR_ADVERT_INTERVAL
        {
            interval = MAX_INITIAL_RTR_ADVERT_INTERVAL;
        }

        interval
    }

    // Returns whether the cached advertisement must be rebuilt before
    // sending.
    pub(crate) fn needs_rebuild(&self) -> bool {
        self.state.packet.is_none()
            || self
                .state
                .prefixes
                .iter()
                .any(|prefix| prefix.has_decrementing_lifetime())
    }
}
