//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![cfg_attr(
    feature = "testing",
    allow(dead_code, unused_variables, unused_imports)
)]

pub mod config;
pub mod consistency;
pub mod consts;
pub mod debug;
pub mod dump;
pub mod error;
pub mod events;
pub mod instance;
pub mod interface;
pub mod network;
pub mod output;
pub mod packet;
pub mod prefix;
pub mod southbound;
pub mod tasks;
pub mod timer;
