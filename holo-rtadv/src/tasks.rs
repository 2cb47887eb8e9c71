//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;

use holo_utils::socket::{AsyncFd, Socket};
use holo_utils::task::Task;
use holo_utils::{Sender, UnboundedReceiver};
use tracing::{Instrument, debug_span};

use crate::network;

//
// Router Advertisement daemon tasks diagram:
//
//                                +--------------+
//                                |   netlink    |
//                                +--------------+
//                                       |
//                       southbound (1x) |
//                                       V
//                                +--------------+
//              net_rx (1x) ----> |              |
//                                |   instance   | ----> (1x) net_tx
//         timer wheel deadline > |              |
//                                +--------------+
//                                       ^
//                          signals (1x) |
//

// Router Advertisement daemon inter-task message types.
pub mod messages {
    use serde::{Deserialize, Serialize};

    // Input messages (child task -> main task).
    pub mod input {
        use std::net::Ipv6Addr;

        use super::*;
        use crate::packet::Packet;
        use crate::packet::error::DecodeResult;

        #[derive(Debug, Deserialize, Serialize)]
        pub enum ProtocolMsg {
            NetRxPacket(NetRxPacketMsg),
        }

        #[derive(Debug, Deserialize, Serialize)]
        pub struct NetRxPacketMsg {
            pub ifindex: u32,
            pub src: Ipv6Addr,
            pub dst: Ipv6Addr,
            pub hop_limit: u8,
            pub packet: DecodeResult<Packet>,
        }
    }

    // Output messages (main task -> child task).
    pub mod output {
        use std::net::Ipv6Addr;

        use bytes::Bytes;

        use super::*;

        #[derive(Debug, Serialize)]
        pub enum ProtocolMsg {
            NetTxPacket(NetTxPacketMsg),
        }

        #[derive(Clone, Debug, Deserialize, Serialize)]
        pub struct NetTxPacketMsg {
            pub ifname: String,
            pub ifindex: u32,
            pub dst: Ipv6Addr,
            pub packet: Bytes,
        }
    }
}

// ===== Router Advertisement daemon tasks =====

// Network Rx task.
pub fn net_rx(
    socket: Arc<AsyncFd<Socket>>,
    net_rx_packetp: &Sender<messages::input::NetRxPacketMsg>,
) -> Task<()> {
    #[cfg(not(feature = "testing"))]
    {
        let span1 = debug_span!("network");
        let _span1_guard = span1.enter();
        let span2 = debug_span!("input");
        let _span2_guard = span2.enter();

        let net_rx_packetp = net_rx_packetp.clone();
        Task::spawn_supervised(move || {
            let socket = socket.clone();
            let net_rx_packetp = net_rx_packetp.clone();
            async move {
                let _ = network::read_loop(socket, net_rx_packetp).await;
            }
            .in_current_span()
        })
    }
    #[cfg(feature = "testing")]
    {
        Task::spawn(async move { std::future::pending().await })
    }
}

// Network Tx task.
#[allow(unused_mut)]
pub fn net_tx(
    socket: Arc<AsyncFd<Socket>>,
    mut net_tx_packetc: UnboundedReceiver<messages::output::NetTxPacketMsg>,
) -> Task<()> {
    #[cfg(not(feature = "testing"))]
    {
        let span1 = debug_span!("network");
        let _span1_guard = span1.enter();
        let span2 = debug_span!("output");
        let _span2_guard = span2.enter();

        Task::spawn(
            async move {
                network::write_loop(socket, net_tx_packetc).await;
            }
            .in_current_span(),
        )
    }
    #[cfg(feature = "testing")]
    {
        Task::spawn(async move {
            while net_tx_packetc.recv().await.is_some() {}
        })
    }
}
