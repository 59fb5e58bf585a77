//! TCP transport speaking newline-delimited JSON.
//!
//! Each accepted connection gets a reader task and a writer task. Readers
//! forward decoded messages as [`HostInput`] on a single channel, which one
//! task drains into the coordinator, so the coordinator never runs
//! concurrently with itself.

use crate::coordinator::SessionCoordinator;
use crate::error::SessionError;
use crate::transport::{ChannelOutbox, ConnectionId, HOST_CONNECTION};
use crate::wire::{HostMessage, PeerMessage, decode_line, encode_line};
use futures::StreamExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

/// Longest accepted frame in bytes, excluding the newline.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Transport event for the coordinator task.
#[derive(Debug)]
pub enum HostInput {
    /// A peer connected; its outbound queue is `outgoing`.
    Connected {
        /// Connection id.
        id: ConnectionId,
        /// Queue drained by the connection's writer task.
        outgoing: mpsc::UnboundedSender<HostMessage>,
    },
    /// A peer sent a message.
    Message {
        /// Connection id.
        id: ConnectionId,
        /// Decoded message.
        message: PeerMessage,
    },
    /// A peer's connection closed.
    Disconnected {
        /// Connection id.
        id: ConnectionId,
    },
}

/// Applies one transport event to the coordinator.
#[instrument(skip(coordinator, input))]
pub fn dispatch(coordinator: &mut SessionCoordinator<ChannelOutbox>, input: HostInput) {
    match input {
        HostInput::Connected { id, outgoing } => {
            coordinator.outbox_mut().register_sender(id, outgoing);
            coordinator.handle_connect(id);
        }
        HostInput::Message { id, message } => coordinator.handle_message(id, message),
        HostInput::Disconnected { id } => {
            coordinator.outbox_mut().unregister(id);
            coordinator.handle_disconnect(id);
        }
    }
}

async fn write_frames<W, T>(mut writer: W, mut queue: mpsc::UnboundedReceiver<T>)
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    while let Some(message) = queue.recv().await {
        let line = match encode_line(&message) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to encode frame");
                continue;
            }
        };
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(error = %e, "Write failed, closing writer");
            break;
        }
    }
}

/// Reads frames until EOF, passing each decoded message to `forward`.
///
/// Malformed frames are logged and skipped. Returns when the stream ends,
/// a frame exceeds [`MAX_FRAME_LEN`], or `forward` reports the receiver is
/// gone.
async fn read_frames<R, T, F>(reader: R, mut forward: F)
where
    R: AsyncRead + Unpin,
    T: DeserializeOwned,
    F: FnMut(T) -> bool,
{
    let mut frames = FramedRead::new(reader, LinesCodec::new_with_max_length(MAX_FRAME_LEN));
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match decode_line::<T>(&line) {
                Ok(message) => {
                    if !forward(message) {
                        break;
                    }
                }
                Err(e) => warn!(error = %e, "Dropping malformed frame"),
            },
            Err(LinesCodecError::MaxLineLengthExceeded) => {
                warn!(max = MAX_FRAME_LEN, "Frame too long, closing connection");
                break;
            }
            Err(LinesCodecError::Io(e)) => {
                debug!(error = %e, "Read failed");
                break;
            }
        }
    }
}

/// Accepts peers forever, assigning connection ids from 1.
///
/// # Errors
///
/// Returns when accepting fails.
#[instrument(skip(listener, inputs))]
pub async fn accept_loop(
    listener: TcpListener,
    inputs: mpsc::UnboundedSender<HostInput>,
) -> Result<(), SessionError> {
    let mut next_id = HOST_CONNECTION + 1;
    loop {
        let (stream, addr) = listener.accept().await?;
        let id = next_id;
        next_id += 1;
        info!(connection = id, %addr, "Peer connected");
        spawn_connection(id, stream, inputs.clone());
    }
}

fn spawn_connection(id: ConnectionId, stream: TcpStream, inputs: mpsc::UnboundedSender<HostInput>) {
    let (read_half, write_half) = stream.into_split();
    let (outgoing, queue) = mpsc::unbounded_channel::<HostMessage>();
    tokio::spawn(write_frames(write_half, queue));

    if inputs.send(HostInput::Connected { id, outgoing }).is_err() {
        return;
    }

    tokio::spawn(async move {
        read_frames::<_, PeerMessage, _>(read_half, |message| {
            inputs.send(HostInput::Message { id, message }).is_ok()
        })
        .await;
        info!(connection = id, "Peer disconnected");
        let _ = inputs.send(HostInput::Disconnected { id });
    });
}

/// Peer end of a host connection.
///
/// `incoming` closes when the host goes away.
#[derive(Debug)]
pub struct PeerLink {
    /// Messages to the host.
    pub outgoing: mpsc::UnboundedSender<PeerMessage>,
    /// Messages from the host.
    pub incoming: mpsc::UnboundedReceiver<HostMessage>,
}

/// Connects to a host, giving up after `timeout`.
///
/// A snapshot is requested as soon as the connection is up.
///
/// # Errors
///
/// Fails if the host cannot be reached within `timeout`.
#[instrument]
pub async fn connect(addr: SocketAddr, timeout: Duration) -> Result<PeerLink, SessionError> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| SessionError::new(format!("Timed out connecting to {}", addr)))??;
    info!("Connected to host");

    let (read_half, write_half) = stream.into_split();
    let (outgoing, queue) = mpsc::unbounded_channel::<PeerMessage>();
    let (deliver, incoming) = mpsc::unbounded_channel::<HostMessage>();

    tokio::spawn(write_frames(write_half, queue));
    tokio::spawn(async move {
        read_frames::<_, HostMessage, _>(read_half, |message| deliver.send(message).is_ok())
            .await;
        info!("Host connection closed");
    });

    outgoing
        .send(PeerMessage::RequestSnapshot)
        .map_err(|_| SessionError::new("Writer task ended before first request"))?;

    Ok(PeerLink { outgoing, incoming })
}
