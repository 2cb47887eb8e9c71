//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

mod config;
mod netlink;

use std::path::Path;
use std::sync::Arc;

use clap::{App, Arg};
use config::{Config, LoggingFileRotation, LoggingFmtStyle};
use futures::StreamExt;
use holo_rtadv::instance::{Instance, InstanceNet};
use holo_rtadv::{dump, network, tasks};
use holo_utils::socket::AsyncFd;
use nix::unistd::Uid;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::level_filters::LevelFilter;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

#[derive(Debug)]
enum Signal {
    Shutdown,
    Dump,
}

fn init_tracing(config: &config::Logging) {
    // Enable logging to journald.
    let journald = config.journald.enabled.then(|| {
        tracing_journald::layer().expect("couldn't connect to journald")
    });

    // Enable logging to a file.
    let file = config.file.enabled.then(|| {
        let file_appender = match config.file.rotation {
            LoggingFileRotation::Never => {
                rolling::never(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Hourly => {
                rolling::hourly(&config.file.dir, &config.file.name)
            }
            LoggingFileRotation::Daily => {
                rolling::daily(&config.file.dir, &config.file.name)
            }
        };

        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(file_appender)
            .with_target(false)
            .with_thread_ids(config.file.fmt.show_thread_id)
            .with_file(config.file.fmt.show_source)
            .with_line_number(config.file.fmt.show_source)
            .with_ansi(config.file.fmt.colors);
        let layer = match config.file.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    // Enable logging to stdout.
    let stdout = config.stdout.enabled.then(|| {
        let log_level_filter = LevelFilter::from_level(tracing::Level::TRACE);
        let layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(config.stdout.fmt.show_thread_id)
            .with_file(config.stdout.fmt.show_source)
            .with_line_number(config.stdout.fmt.show_source)
            .with_ansi(config.stdout.fmt.colors);
        let layer = match config.stdout.fmt.style {
            LoggingFmtStyle::Compact => layer.compact().boxed(),
            LoggingFmtStyle::Full => layer.boxed(),
            LoggingFmtStyle::Json => layer.json().boxed(),
            LoggingFmtStyle::Pretty => layer.pretty().boxed(),
        };
        layer.with_filter(log_level_filter)
    });

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive("holo=debug".parse().unwrap())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(journald)
        .with(file)
        .with(stdout)
        .init();
}

fn signal_listener() -> mpsc::Receiver<Signal> {
    let (signal_tx, signal_rx) = mpsc::channel(4);

    tokio::task::spawn(async move {
        let mut sigint = signal(SignalKind::interrupt()).unwrap();
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigusr1 = signal(SignalKind::user_defined1()).unwrap();

        loop {
            let signal = tokio::select! {
                _ = sigint.recv() => {
                    info!("received SIGINT");
                    Signal::Shutdown
                },
                _ = sigterm.recv() => {
                    info!("received SIGTERM");
                    Signal::Shutdown
                },
                _ = sigusr1.recv() => {
                    info!("received SIGUSR1");
                    Signal::Dump
                }
            };
            if signal_tx.send(signal).await.is_err() {
                break;
            }
        }
    });

    signal_rx
}

// Sleeps until the next timer expiration, or forever if none is armed.
async fn timer_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn write_dump(instance: &Instance, path: &str) {
    let snapshots = instance.snapshot();
    match dump::write(Path::new(path), &snapshots) {
        Ok(()) => info!(%path, "dump file written"),
        Err(error) => error!(%path, %error, "failed to write dump file"),
    }
}

async fn run(config: Config) {
    // Create raw ICMPv6 socket.
    let socket = match network::socket().and_then(AsyncFd::new) {
        Ok(socket) => Arc::new(socket),
        Err(error) => {
            error!(%error, "failed to create ICMPv6 socket");
            std::process::exit(1);
        }
    };

    // Create instance.
    let (net_tx_packetp, net_tx_packetc) = mpsc::unbounded_channel();
    let (net_rx_packetp, mut net_rx_packetc) = mpsc::channel(4);
    let net = InstanceNet::new(socket.clone(), net_tx_packetp);
    let mut instance = match Instance::new(&config.interfaces, net) {
        Ok(instance) => instance,
        Err(error) => {
            error!(%error, "invalid configuration");
            std::process::exit(1);
        }
    };

    // Start network Tx/Rx tasks.
    let _net_rx_task = tasks::net_rx(socket.clone(), &net_rx_packetp);
    let net_tx_task = tasks::net_tx(socket, net_tx_packetc);

    // Learn the interfaces and their prefixes.
    let mut netlink_rx = netlink::init(&mut instance).await;
    let mut signal_rx = signal_listener();

    loop {
        let deadline = instance.next_deadline();
        tokio::select! {
            Some(msg) = net_rx_packetc.recv() => {
                instance.process_net_rx(msg);
            }
            Some((msg, _)) = netlink_rx.next() => {
                if let Some(msg) = netlink::process_msg(msg) {
                    instance.process_southbound(msg);
                }
            }
            _ = timer_deadline(deadline) => {
                instance.tick();
            }
            Some(signal) = signal_rx.recv() => {
                match signal {
                    Signal::Dump => write_dump(&instance, &config.dump_path),
                    Signal::Shutdown => break,
                }
            }
        }
    }

    // Send the final advertisements and wait for them to go out.
    instance.shutdown();
    drop(instance);
    let _ = net_tx_task.await;
}

fn build_version() -> String {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    match rustc_tools_util::get_version_info!().commit_hash {
        Some(hash) => format!("{VERSION} ({hash})"),
        None => VERSION.to_owned(),
    }
}

// ===== main =====

fn main() {
    // Parse command-line parameters.
    let matches = App::new("Holo router advertisement daemon")
        .version(build_version().as_str())
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("file")
                .help("Specify an alternative configuration file."),
        )
        .get_matches();

    // Read configuration file.
    let config_file = matches.value_of("config");
    let config = Config::load(config_file);

    // Check for root privileges.
    if !Uid::effective().is_root() {
        eprintln!("need privileged user");
        std::process::exit(1);
    }

    // Initialize tracing.
    init_tracing(&config.logging);

    // We're ready to go!
    info!("starting up");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to create async runtime")
        .block_on(run(config));

    info!("exiting");
}
