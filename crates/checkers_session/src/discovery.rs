//! LAN host discovery over UDP broadcast.

use crate::error::SessionError;
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument, trace};

/// Payload announced by hosts.
pub const DISCOVERY_MESSAGE: &str = "CHECKERS_HOST";

/// Finds a host to join.
#[async_trait]
pub trait HostFinder {
    /// Waits for a host announcement and returns the host's address.
    async fn find_host(&self) -> Result<IpAddr, SessionError>;
}

/// UDP broadcast announcer and listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpDiscovery {
    port: u16,
    interval: Duration,
}

impl UdpDiscovery {
    /// Discovery on `port`, announcing every `interval`.
    pub fn new(port: u16, interval: Duration) -> Self {
        Self { port, interval }
    }

    /// Discovery port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Announces the host until the task is dropped or a send fails.
    #[instrument(skip(self), fields(port = self.port))]
    pub async fn announce(self) -> Result<(), SessionError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;
        let target = SocketAddr::from((Ipv4Addr::BROADCAST, self.port));
        info!("Announcing host on LAN");

        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            socket.send_to(DISCOVERY_MESSAGE.as_bytes(), target).await?;
            trace!("Announcement sent");
        }
    }
}

#[async_trait]
impl HostFinder for UdpDiscovery {
    #[instrument(skip(self), fields(port = self.port))]
    async fn find_host(&self) -> Result<IpAddr, SessionError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, self.port)).await?;
        info!("Listening for host announcements");

        let mut buf = [0u8; 256];
        loop {
            let (len, from) = socket.recv_from(&mut buf).await?;
            if &buf[..len] == DISCOVERY_MESSAGE.as_bytes() {
                info!(host = %from.ip(), "Host found");
                return Ok(from.ip());
            }
            debug!(%from, len, "Ignoring unrelated datagram");
        }
    }
}
