//! Outbound message delivery.
//!
//! The coordinator never talks to sockets. It hands messages to an
//! [`Outbox`], which the transport adapter drains in order per connection.

use crate::wire::HostMessage;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// Unique identifier for a connection, assigned by the transport.
pub type ConnectionId = u64;

/// Connection id of the host's own presentation layer.
pub const HOST_CONNECTION: ConnectionId = 0;

/// Sink for host to peer messages.
pub trait Outbox {
    /// Sends `message` to one connection.
    fn send(&mut self, to: ConnectionId, message: HostMessage);

    /// Sends `message` to every registered connection.
    fn broadcast(&mut self, message: HostMessage);
}

/// Outbox backed by one unbounded channel per connection.
///
/// Per-connection order is the order of calls. A connection whose receiver
/// has gone away is unregistered on the next send.
#[derive(Debug, Default)]
pub struct ChannelOutbox {
    peers: BTreeMap<ConnectionId, mpsc::UnboundedSender<HostMessage>>,
}

impl ChannelOutbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and returns the receiving end of its queue.
    #[instrument(skip(self))]
    pub fn register(&mut self, id: ConnectionId) -> mpsc::UnboundedReceiver<HostMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.register_sender(id, tx);
        rx
    }

    /// Registers an existing sender for `id`, replacing any previous one.
    pub fn register_sender(&mut self, id: ConnectionId, tx: mpsc::UnboundedSender<HostMessage>) {
        if self.peers.insert(id, tx).is_some() {
            warn!(connection = id, "Connection re-registered");
        }
    }

    /// Forgets a connection.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, id: ConnectionId) {
        self.peers.remove(&id);
    }

    /// Registered connection ids.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.peers.keys().copied()
    }
}

impl Outbox for ChannelOutbox {
    fn send(&mut self, to: ConnectionId, message: HostMessage) {
        let kind = message.kind();
        match self.peers.get(&to) {
            Some(tx) => {
                if tx.send(message).is_err() {
                    debug!(connection = to, kind, "Receiver closed, dropping connection");
                    self.peers.remove(&to);
                }
            }
            None => debug!(connection = to, kind, "No such connection"),
        }
    }

    fn broadcast(&mut self, message: HostMessage) {
        let kind = message.kind();
        debug!(kind, peers = self.peers.len(), "Broadcasting");
        self.peers.retain(|_, tx| tx.send(message.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::ControlSignal;

    #[test]
    fn test_directed_and_broadcast_delivery() {
        let mut outbox = ChannelOutbox::new();
        let mut host = outbox.register(HOST_CONNECTION);
        let mut peer = outbox.register(7);

        outbox.send(7, HostMessage::Control(ControlSignal::MatchStarted));
        outbox.broadcast(HostMessage::Control(ControlSignal::BoardReset));

        assert_eq!(
            peer.try_recv().ok(),
            Some(HostMessage::Control(ControlSignal::MatchStarted))
        );
        assert_eq!(
            peer.try_recv().ok(),
            Some(HostMessage::Control(ControlSignal::BoardReset))
        );
        assert_eq!(
            host.try_recv().ok(),
            Some(HostMessage::Control(ControlSignal::BoardReset))
        );
        assert!(host.try_recv().is_err());
    }

    #[test]
    fn test_closed_receivers_are_dropped() {
        let mut outbox = ChannelOutbox::new();
        let rx = outbox.register(3);
        let _kept = outbox.register(4);
        drop(rx);
        outbox.broadcast(HostMessage::Control(ControlSignal::ReturnToMenu));
        assert_eq!(outbox.connections().collect::<Vec<_>>(), vec![4]);
    }
}
