//! Strictly Checkers - console host and peer.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use checkers_core::SeatMode;
use checkers_session::cli::{Cli, Command};
use checkers_session::console::{self, ConsoleCommand, HELP};
use checkers_session::{
    BoardSync, ChannelOutbox, HOST_CONNECTION, HostFinder, JsonFileStore, MirrorUpdate,
    PeerMessage, RemoteMirror, SessionConfig, SessionCoordinator, Submission, UdpDiscovery,
    Wallet,
};
use clap::Parser;
use std::net::SocketAddr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = SessionConfig::from_file_or_default(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Host { port, four } => {
            let config = if four {
                config.with_seat_mode(SeatMode::Four)
            } else {
                config
            };
            run_host(config, port).await
        }
        Command::Join { addr } => run_peer(config, addr).await,
        Command::Discover { port } => {
            let discovery =
                UdpDiscovery::new(*config.discovery_port(), config.broadcast_interval());
            println!("Looking for a host on the LAN...");
            let host = discovery.find_host().await?;
            run_peer(config, SocketAddr::new(host, port)).await
        }
    }
}

/// Applies a host message to the local mirror, printing what changed.
///
/// Returns false once the session has sent everyone back to the menu.
fn present(
    mirror: &mut RemoteMirror,
    wallet: &mut Wallet<JsonFileStore>,
    coins_per_win: i64,
    message: checkers_session::HostMessage,
) -> bool {
    let update = match mirror.apply(message) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Ignoring bad host message");
            return true;
        }
    };

    if let Some(text) = console::notice(&update) {
        println!("{}", text);
    }
    match update {
        MirrorUpdate::MatchOver {
            local_won: true, ..
        } => match wallet.add_coins(coins_per_win) {
            Ok(total) => println!("+{} coins ({} total)", coins_per_win, total),
            Err(e) => error!(error = %e, "Failed to save coins"),
        },
        MirrorUpdate::Snapshot => println!("{}", console::render(mirror)),
        MirrorUpdate::ReturnToMenu => return false,
        _ => {}
    }
    true
}

/// Run a host session on `port`.
#[instrument(skip(config))]
async fn run_host(config: SessionConfig, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!(port, mode = ?config.seat_mode(), "Hosting session");

    let mut outbox = ChannelOutbox::new();
    let mut host_view = outbox.register(HOST_CONNECTION);
    let mut coordinator = SessionCoordinator::new(&config, outbox)?;
    let mut mirror = RemoteMirror::new(&config)?;
    let mut wallet = Wallet::new(JsonFileStore::open(config.progress_path())?);

    let (inputs, mut input_rx) = mpsc::unbounded_channel();
    let acceptor = tokio::spawn(checkers_session::net::accept_loop(listener, inputs));
    let discovery = UdpDiscovery::new(*config.discovery_port(), config.broadcast_interval());
    let announcer = tokio::spawn(discovery.announce());

    println!("Hosting on port {}. Type 'help' for commands.", port);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(input) = input_rx.recv() => {
                checkers_session::net::dispatch(&mut coordinator, input);
            }
            Some(message) = host_view.recv() => {
                if !present(&mut mirror, &mut wallet, *config.coins_per_win(), message) {
                    break;
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Click(pos)) => {
                        match console::host_click(&mut coordinator, &mut mirror, pos) {
                            Some(submission) => {
                                if let Some(text) = console::feedback(submission) {
                                    println!("{}", text);
                                }
                            }
                            None => println!("{}", console::render(&mirror)),
                        }
                    }
                    Ok(ConsoleCommand::Move(from, to)) => {
                        if let Some(text) = console::feedback(coordinator.submit_move(from, to)) {
                            println!("{}", text);
                        }
                    }
                    Ok(ConsoleCommand::Restart) => coordinator.restart(),
                    Ok(ConsoleCommand::Menu) => coordinator.return_to_menu(),
                    Ok(ConsoleCommand::Show) => println!("{}", console::render(&mirror)),
                    Ok(ConsoleCommand::Help) => println!("{}", HELP),
                    Ok(ConsoleCommand::Quit) => break,
                    Err(e) => println!("{}", e),
                }
            }
        }
    }

    info!("Shutting down host");
    announcer.abort();
    acceptor.abort();
    Ok(())
}

/// Join the host at `addr`.
#[instrument(skip(config))]
async fn run_peer(config: SessionConfig, addr: SocketAddr) -> Result<()> {
    let mut link = checkers_session::net::connect(addr, config.connect_timeout()).await?;
    let mut mirror = RemoteMirror::new(&config)?;
    let mut wallet = Wallet::new(JsonFileStore::open(config.progress_path())?);

    println!("Connected to {}. Type 'help' for commands.", addr);
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            message = link.incoming.recv() => {
                let Some(message) = message else {
                    println!("Host left, back to menu");
                    break;
                };
                if !present(&mut mirror, &mut wallet, *config.coins_per_win(), message) {
                    break;
                }
            }
            line = stdin.next_line() => {
                let Some(line) = line? else { break };
                let outgoing = match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Click(pos)) => {
                        let intent = mirror.click(pos);
                        if intent.is_none() {
                            println!("{}", console::render(&mirror));
                        }
                        intent.map(PeerMessage::MoveIntent)
                    }
                    Ok(ConsoleCommand::Move(from, to)) => match mirror.submit_move(from, to) {
                        Submission::Forward(intent) => Some(PeerMessage::MoveIntent(intent)),
                        _ => {
                            println!("Not your turn");
                            None
                        }
                    },
                    Ok(ConsoleCommand::Restart) => {
                        println!("Only the host can restart");
                        None
                    }
                    Ok(ConsoleCommand::Menu) => Some(PeerMessage::RequestReturnToMenu),
                    Ok(ConsoleCommand::Show) => Some(PeerMessage::RequestSnapshot),
                    Ok(ConsoleCommand::Help) => {
                        println!("{}", HELP);
                        None
                    }
                    Ok(ConsoleCommand::Quit) => break,
                    Err(e) => {
                        println!("{}", e);
                        None
                    }
                };
                if let Some(message) = outgoing
                    && link.outgoing.send(message).is_err()
                {
                    println!("Host connection lost");
                    break;
                }
            }
        }
    }

    info!("Leaving session");
    Ok(())
}
