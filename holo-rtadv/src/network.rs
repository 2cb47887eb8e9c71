//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::io::{IoSlice, IoSliceMut};
use std::net::{Ipv6Addr, SocketAddrV6};
use std::ops::Deref;
use std::os::fd::AsRawFd;
use std::sync::Arc;

use holo_utils::socket::{AsyncFd, Socket, SocketExt};
use holo_utils::{Sender, UnboundedReceiver};
use nix::sys::socket::{self, ControlMessageOwned, SockaddrIn6};
use tokio::sync::mpsc::error::SendError;

use crate::consts::{ALL_ROUTERS, ND_HOP_LIMIT};
use crate::error::IoError;
use crate::packet::{MessageType, Packet};
use crate::tasks::messages::input::NetRxPacketMsg;
use crate::tasks::messages::output::NetTxPacketMsg;

// Creates the raw ICMPv6 socket shared by all interfaces.
pub fn socket() -> Result<Socket, std::io::Error> {
    #[cfg(not(feature = "testing"))]
    {
        use socket2::{Domain, Protocol, Type};

        let socket =
            Socket::new(Domain::IPV6, Type::RAW, Some(Protocol::ICMPV6))?;
        socket.set_nonblocking(true)?;
        socket.set_multicast_loop_v6(false)?;
        socket.set_multicast_hops_v6(ND_HOP_LIMIT.into())?;
        socket.set_unicast_hops_v6(ND_HOP_LIMIT.into())?;
        socket.set_ipv6_pktinfo(true)?;
        socket.set_ipv6_recvhoplimit(true)?;
        socket.set_icmp6_filter(&[
            MessageType::RouterSolicit as u8,
            MessageType::RouterAdvert as u8,
        ])?;

        Ok(socket)
    }
    #[cfg(feature = "testing")]
    {
        Ok(Socket::default())
    }
}

// Joins the all-routers group on the given interface, so that Router
// Solicitations are received.
pub(crate) fn join_multicast(
    socket: &AsyncFd<Socket>,
    ifindex: u32,
) -> Result<(), std::io::Error> {
    #[cfg(not(feature = "testing"))]
    {
        let socket = socket2::SockRef::from(socket.get_ref());
        socket.join_multicast_v6(&ALL_ROUTERS, ifindex)
    }
    #[cfg(feature = "testing")]
    {
        Ok(())
    }
}

pub(crate) fn leave_multicast(
    socket: &AsyncFd<Socket>,
    ifindex: u32,
) -> Result<(), std::io::Error> {
    #[cfg(not(feature = "testing"))]
    {
        let socket = socket2::SockRef::from(socket.get_ref());
        socket.leave_multicast_v6(&ALL_ROUTERS, ifindex)
    }
    #[cfg(feature = "testing")]
    {
        Ok(())
    }
}

#[cfg(not(feature = "testing"))]
async fn send_packet(
    socket: &AsyncFd<Socket>,
    ifindex: u32,
    dst: Ipv6Addr,
    buf: &[u8],
) -> Result<usize, IoError> {
    let iov = [IoSlice::new(buf)];
    let sockaddr: SockaddrIn6 = SocketAddrV6::new(dst, 0, 0, ifindex).into();
    // Let the kernel pick the link-local source address of the outgoing
    // interface.
    let pktinfo = libc::in6_pktinfo {
        ipi6_addr: libc::in6_addr {
            s6_addr: Ipv6Addr::UNSPECIFIED.octets(),
        },
        ipi6_ifindex: ifindex,
    };
    let cmsg = [socket::ControlMessage::Ipv6PacketInfo(&pktinfo)];
    socket
        .async_io(tokio::io::Interest::WRITABLE, |socket| {
            socket::sendmsg(
                socket.as_raw_fd(),
                &iov,
                &cmsg,
                socket::MsgFlags::empty(),
                Some(&sockaddr),
            )
            .map_err(|errno| errno.into())
        })
        .await
        .map_err(IoError::SendError)
}

#[cfg(not(feature = "testing"))]
pub(crate) async fn write_loop(
    socket: Arc<AsyncFd<Socket>>,
    mut net_tx_packetc: UnboundedReceiver<NetTxPacketMsg>,
) {
    while let Some(NetTxPacketMsg {
        ifindex,
        dst,
        packet,
        ..
    }) = net_tx_packetc.recv().await
    {
        if let Err(error) = send_packet(&socket, ifindex, dst, &packet).await {
            error.log();
        }
    }
}

#[cfg(not(feature = "testing"))]
pub(crate) async fn read_loop(
    socket: Arc<AsyncFd<Socket>>,
    net_rx_packetp: Sender<NetRxPacketMsg>,
) -> Result<(), SendError<NetRxPacketMsg>> {
    let mut buf = [0; 16384];
    let mut iov = [IoSliceMut::new(&mut buf)];
    let mut cmsgspace = nix::cmsg_space!(libc::in6_pktinfo, libc::c_int);

    loop {
        // Receive data packet.
        match socket
            .async_io(tokio::io::Interest::READABLE, |socket| {
                match socket::recvmsg::<SockaddrIn6>(
                    socket.as_raw_fd(),
                    &mut iov,
                    Some(&mut cmsgspace),
                    socket::MsgFlags::empty(),
                ) {
                    Ok(msg) => {
                        // Retrieve source address, destination address,
                        // ingress interface and hop limit.
                        let src = msg.address.as_ref().map(|addr| addr.ip());
                        let mut pktinfo = None;
                        let mut hop_limit = None;
                        for cmsg in msg.cmsgs().into_iter().flatten() {
                            match cmsg {
                                ControlMessageOwned::Ipv6PacketInfo(info) => {
                                    pktinfo = Some((
                                        info.ipi6_ifindex,
                                        Ipv6Addr::from(info.ipi6_addr.s6_addr),
                                    ));
                                }
                                ControlMessageOwned::Ipv6HopLimit(value) => {
                                    hop_limit = u8::try_from(value).ok();
                                }
                                _ => (),
                            }
                        }
                        Ok((src, pktinfo, hop_limit, msg.bytes))
                    }
                    Err(errno) => Err(errno.into()),
                }
            })
            .await
        {
            Ok((src, pktinfo, hop_limit, bytes)) => {
                let Some(src) = src else {
                    IoError::RecvMissingSourceAddr.log();
                    continue;
                };
                let (Some((ifindex, dst)), Some(hop_limit)) =
                    (pktinfo, hop_limit)
                else {
                    IoError::RecvMissingAncillaryData.log();
                    continue;
                };

                // Decode packet.
                let packet = Packet::decode(&iov[0].deref()[0..bytes]);
                let msg = NetRxPacketMsg {
                    ifindex,
                    src,
                    dst,
                    hop_limit,
                    packet,
                };
                net_rx_packetp.send(msg).await?;
            }
            Err(error) if error.kind() == std::io::ErrorKind::Interrupted => {
                // Retry if the syscall was interrupted (EINTR).
                continue;
            }
            Err(error) => {
                IoError::RecvError(error).log();
            }
        }
    }
}
