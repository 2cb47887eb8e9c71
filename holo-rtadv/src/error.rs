//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv6Addr;

use ipnetwork::Ipv6Network;
use tracing::{error, warn, warn_span};

use crate::packet::error::DecodeError;

// Router Advertisement daemon errors.
#[derive(Debug)]
pub enum Error {
    // I/O errors
    IoError(IoError),
    // Inter-task communication
    InterfaceNotFound(u32),
    // Packet input
    PacketDecodeError(String, Ipv6Addr, DecodeError),
    InvalidHopLimit(String, Ipv6Addr, u8),
    RaSrcNotLinkLocal(String, Ipv6Addr),
    RsUnspecifiedSrcWithLladdr(String),
    // Other
    InvalidLinkMtu(String, u32, u32),
}

// Router Advertisement daemon I/O errors.
#[derive(Debug)]
pub enum IoError {
    SocketError(std::io::Error),
    MulticastJoinError(u32, std::io::Error),
    MulticastLeaveError(u32, std::io::Error),
    RecvError(std::io::Error),
    RecvMissingSourceAddr,
    RecvMissingAncillaryData,
    SendError(std::io::Error),
}

// Configuration errors. These are fatal at startup.
#[derive(Debug)]
pub enum ConfigError {
    MissingName,
    DuplicateInterface(String),
    InvalidMaxInterval(String, u32),
    InvalidMinInterval(String, u32),
    InvalidRouterLifetime(String, u32),
    InvalidReachableTime(String, u32),
    InvalidLinkMtu(String, u32),
    InvalidPrefix(String, Ipv6Network),
    DuplicatePrefix(String, Ipv6Network),
    PreferredExceedsValid(String, Ipv6Network),
    EmptyServerList(String),
    InvalidDomainName(String, String),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::IoError(error) => {
                error.log();
            }
            Error::InterfaceNotFound(ifindex) => {
                warn!(%ifindex, "{}", self);
            }
            Error::PacketDecodeError(ifname, source, error) => {
                warn_span!("interface", name = %ifname).in_scope(|| {
                    warn!(%source, %error, "{}", self);
                });
            }
            Error::InvalidHopLimit(ifname, source, hop_limit) => {
                warn_span!("interface", name = %ifname).in_scope(|| {
                    warn!(%source, %hop_limit, "{}", self);
                });
            }
            Error::RaSrcNotLinkLocal(ifname, source) => {
                warn_span!("interface", name = %ifname).in_scope(|| {
                    warn!(%source, "{}", self);
                });
            }
            Error::RsUnspecifiedSrcWithLladdr(ifname) => {
                warn_span!("interface", name = %ifname).in_scope(|| {
                    warn!("{}", self);
                });
            }
            Error::InvalidLinkMtu(ifname, link_mtu, phys_mtu) => {
                warn_span!("interface", name = %ifname).in_scope(|| {
                    warn!(%link_mtu, %phys_mtu, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(error) => error.fmt(f),
            Error::InterfaceNotFound(..) => {
                write!(f, "interface not found")
            }
            Error::PacketDecodeError(..) => {
                write!(f, "failed to decode packet")
            }
            Error::InvalidHopLimit(..) => {
                write!(f, "discarding packet with invalid hop limit")
            }
            Error::RaSrcNotLinkLocal(..) => {
                write!(
                    f,
                    "discarding router advertisement from non link-local source"
                )
            }
            Error::RsUnspecifiedSrcWithLladdr(..) => {
                write!(
                    f,
                    "discarding router solicitation from unspecified source with link-layer address option"
                )
            }
            Error::InvalidLinkMtu(..) => {
                write!(
                    f,
                    "configured link MTU out of range, not advertising it"
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(error) => Some(error),
            Error::PacketDecodeError(_, _, error) => Some(error),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub fn log(&self) {
        match self {
            IoError::SocketError(error) => {
                error!(error = %with_source(error), "{}", self);
            }
            IoError::MulticastJoinError(ifindex, error)
            | IoError::MulticastLeaveError(ifindex, error) => {
                warn!(%ifindex, error = %with_source(error), "{}", self);
            }
            IoError::RecvError(error) | IoError::SendError(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
            IoError::RecvMissingSourceAddr
            | IoError::RecvMissingAncillaryData => {
                warn!("{}", self);
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::SocketError(..) => {
                write!(f, "failed to create raw ICMPv6 socket")
            }
            IoError::MulticastJoinError(..) => {
                write!(f, "failed to join multicast group")
            }
            IoError::MulticastLeaveError(..) => {
                write!(f, "failed to leave multicast group")
            }
            IoError::RecvError(..) => {
                write!(f, "failed to receive ICMPv6 packet")
            }
            IoError::RecvMissingSourceAddr => {
                write!(
                    f,
                    "failed to retrieve source address from received packet"
                )
            }
            IoError::RecvMissingAncillaryData => {
                write!(
                    f,
                    "failed to retrieve ancillary data from received packet"
                )
            }
            IoError::SendError(..) => {
                write!(f, "failed to send ICMPv6 packet")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::SocketError(error)
            | IoError::MulticastJoinError(_, error)
            | IoError::MulticastLeaveError(_, error)
            | IoError::RecvError(error)
            | IoError::SendError(error) => Some(error),
            _ => None,
        }
    }
}

// ===== impl ConfigError =====

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingName => {
                write!(f, "interface name is missing")
            }
            ConfigError::DuplicateInterface(ifname) => {
                write!(f, "{ifname}: interface configured more than once")
            }
            ConfigError::InvalidMaxInterval(ifname, value) => {
                write!(f, "{ifname}: invalid max-rtr-adv-interval: {value}")
            }
            ConfigError::InvalidMinInterval(ifname, value) => {
                write!(f, "{ifname}: invalid min-rtr-adv-interval: {value}")
            }
            ConfigError::InvalidRouterLifetime(ifname, value) => {
                write!(f, "{ifname}: invalid default-lifetime: {value}")
            }
            ConfigError::InvalidReachableTime(ifname, value) => {
                write!(f, "{ifname}: invalid reachable-time: {value}")
            }
            ConfigError::InvalidLinkMtu(ifname, value) => {
                write!(f, "{ifname}: invalid link-mtu: {value}")
            }
            ConfigError::InvalidPrefix(ifname, prefix) => {
                write!(f, "{ifname}: prefix can't be advertised: {prefix}")
            }
            ConfigError::DuplicatePrefix(ifname, prefix) => {
                write!(f, "{ifname}: duplicate prefix: {prefix}")
            }
            ConfigError::PreferredExceedsValid(ifname, prefix) => {
                write!(
                    f,
                    "{ifname}: preferred lifetime exceeds valid lifetime: {prefix}"
                )
            }
            ConfigError::EmptyServerList(ifname) => {
                write!(f, "{ifname}: empty RDNSS server list")
            }
            ConfigError::InvalidDomainName(ifname, domain) => {
                write!(f, "{ifname}: invalid domain name: {domain}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ===== global functions =====

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
