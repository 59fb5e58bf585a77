//! Command-line interface for the checkers session.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Strictly Checkers - networked team checkers for 2 or 4 seats
#[derive(Parser, Debug)]
#[command(name = "checkers")]
#[command(about = "Host or join a LAN checkers match", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to session config (defaults are used if the file is missing)
    #[arg(short, long, global = true, default_value = "checkers.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Host a session and announce it on the LAN
    Host {
        /// TCP port to accept peers on
        #[arg(short, long, default_value = "7777")]
        port: u16,

        /// Play with four seats instead of two
        #[arg(long)]
        four: bool,
    },

    /// Join a hosted session
    Join {
        /// Host address, e.g. 192.168.1.20:7777
        #[arg(short, long)]
        addr: SocketAddr,
    },

    /// Wait for a host announcement and join it
    Discover {
        /// TCP port the host accepts peers on
        #[arg(short, long, default_value = "7777")]
        port: u16,
    },
}
