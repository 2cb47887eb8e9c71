//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use derive_new::new;
use holo_utils::UnboundedSender;
use holo_utils::socket::{AsyncFd, Socket};
use holo_utils::southbound::SouthboundMsg;
use ipnetwork::Ipv6Network;
use tokio::time::Instant;

use crate::config::{self, InterfaceCfg};
use crate::debug::{Debug, InterfaceInactiveReason};
use crate::dump::{self, InterfaceSnapshot};
use crate::error::ConfigError;
use crate::interface::Interface;
use crate::output;
use crate::tasks::messages::input::NetRxPacketMsg;
use crate::tasks::messages::output::NetTxPacketMsg;
use crate::timer::{TimerAction, TimerHandler, TimerWheel};
use crate::{events, southbound};

// Router Advertisement daemon instance.
//
// Owns every advertising interface along with the timer wheel driving
// them. All state transitions happen on the task that owns the instance.
#[derive(Debug)]
pub struct Instance {
    pub timers: TimerWheel<TimerKey>,
    pub state: InstanceState,
}

#[derive(Debug)]
pub struct InstanceState {
    pub interfaces: Interfaces,
    pub net: InstanceNet,
}

#[derive(Debug, new)]
pub struct InstanceNet {
    // Raw ICMPv6 socket.
    pub socket: Arc<AsyncFd<Socket>>,
    // Packet Tx channel.
    pub net_tx_packetp: UnboundedSender<NetTxPacketMsg>,
}

#[derive(Debug, Default)]
pub struct Interfaces(BTreeMap<String, Interface>);

// Identifies the owner of a timer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TimerKey {
    SendAdvert(String),
    PrefixExpire(String, Ipv6Network),
}

// ===== impl Instance =====

impl Instance {
    pub fn new(
        interfaces: &[InterfaceCfg],
        net: InstanceNet,
    ) -> Result<Instance, ConfigError> {
        config::validate_interfaces(interfaces)?;

        Debug::InstanceStart.log();

        let now = Instant::now();
        let mut timers = TimerWheel::new();
        let mut ifaces = Interfaces::default();
        for iface_cfg in interfaces {
            let iface = Interface::new(iface_cfg.clone(), &mut timers, now);
            ifaces.insert(iface);
        }

        Ok(Instance {
            timers,
            state: InstanceState {
                interfaces: ifaces,
                net,
            },
        })
    }

    // Processes a packet received from the network.
    pub fn process_net_rx(&mut self, msg: NetRxPacketMsg) {
        if let Err(error) =
            events::process_packet(&mut self.timers, &mut self.state, msg)
        {
            error.log();
        }
    }

    // Processes a kernel notification.
    pub fn process_southbound(&mut self, msg: SouthboundMsg) {
        southbound::process_msg(&mut self.timers, &mut self.state, msg);
    }

    // Fires all due timers. Returns the time left until the next one.
    pub fn tick(&mut self) -> Option<Duration> {
        self.timers.tick(&mut self.state)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_expiry()
    }

    // Announces on every advertising interface that this router is going
    // away, then stops advertising.
    pub fn shutdown(&mut self) {
        Debug::InstanceStop.log();

        let net = &self.state.net;
        for iface in self.state.interfaces.iter_mut() {
            if !iface.state.active {
                continue;
            }
            output::send_final_advert(iface, net);
            let reason = InterfaceInactiveReason::Shutdown;
            iface.stop(&mut self.timers, net, reason);
        }
    }

    // Returns a read-only view of every interface.
    pub fn snapshot(&self) -> Vec<InterfaceSnapshot> {
        let now = Instant::now();
        self.state
            .interfaces
            .iter()
            .map(|iface| dump::snapshot(iface, &self.timers, now))
            .collect()
    }
}

// ===== impl InstanceState =====

impl TimerHandler<TimerKey> for InstanceState {
    fn fire(
        &mut self,
        timers: &mut TimerWheel<TimerKey>,
        key: &TimerKey,
    ) -> TimerAction {
        match key {
            TimerKey::SendAdvert(ifname) => {
                let Some(iface) = self.interfaces.get_mut(ifname) else {
                    return TimerAction::Remove;
                };
                events::process_send_timer(iface, &self.net)
            }
            TimerKey::PrefixExpire(ifname, prefix) => {
                let Some(iface) = self.interfaces.get_mut(ifname) else {
                    return TimerAction::Remove;
                };
                events::process_prefix_expiry(timers, iface, prefix)
            }
        }
    }
}

// ===== impl Interfaces =====

impl Interfaces {
    pub(crate) fn insert(&mut self, iface: Interface) {
        self.0.insert(iface.name.clone(), iface);
    }

    pub fn get(&self, ifname: &str) -> Option<&Interface> {
        self.0.get(ifname)
    }

    pub fn get_mut(&mut self, ifname: &str) -> Option<&mut Interface> {
        self.0.get_mut(ifname)
    }

    pub fn get_mut_by_ifindex(
        &mut self,
        ifindex: u32,
    ) -> Option<&mut Interface> {
        self.0
            .values_mut()
            .find(|iface| iface.system.ifindex == Some(ifindex))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> + '_ {
        self.0.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Interface> + '_ {
        self.0.values_mut()
    }
}
