//! A single connected RakNet peer: one reliable, ordered byte-message channel between
//! this process and a remote address, regardless of whether it was accepted by a
//! [`crate::listener::Listener`] or opened by [`crate::client::Client`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::consts::{self, FRAME_SET_PACKET_MIN};
use crate::error::RaknetError;

/// Wraps one decoded logical packet in the (deliberately minimal) frame header this
/// proxy uses on its reliable channel. Full RakNet fragmentation, ACK/NACK
/// retransmission and congestion control are out of scope for this proxy (the
/// upstream/downstream peers negotiate that over the wire the same way regardless of
/// what sits in between); this just needs a framed, ordered byte channel.
pub(crate) fn frame(payload: &[u8]) -> Bytes {
    let mut buf = Vec::with_capacity(1 + payload.len());
    buf.push(FRAME_SET_PACKET_MIN);
    buf.extend_from_slice(payload);
    Bytes::from(buf)
}

pub(crate) fn unframe(datagram: &[u8]) -> Option<&[u8]> {
    let id = *datagram.first()?;
    if (consts::FRAME_SET_PACKET_MIN..=consts::FRAME_SET_PACKET_MAX).contains(&id) {
        Some(&datagram[1..])
    } else {
        None
    }
}

/// A connected RakNet peer. Dropping it releases any listener-side bookkeeping and
/// aborts the peer's own reader task, if it has one.
pub struct Peer {
    remote_addr: SocketAddr,
    guid: u64,
    protocol_version: u8,
    socket: Arc<UdpSocket>,
    inbound: mpsc::Receiver<Bytes>,
    connected: Arc<AtomicBool>,
    reader_task: Option<JoinHandle<()>>,
    on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Peer {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        remote_addr: SocketAddr,
        guid: u64,
        protocol_version: u8,
        socket: Arc<UdpSocket>,
        inbound: mpsc::Receiver<Bytes>,
        connected: Arc<AtomicBool>,
        reader_task: Option<JoinHandle<()>>,
        on_drop: Option<Box<dyn FnOnce() + Send + Sync>>,
    ) -> Self {
        Self {
            remote_addr,
            guid,
            protocol_version,
            socket,
            inbound,
            connected,
            reader_task,
            on_drop,
        }
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn guid(&self) -> u64 {
        self.guid
    }

    /// The RakNet protocol version this peer declared in its offline handshake
    /// (`OPEN_CONNECTION_REQUEST_1`).
    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Sends one logical packet on this peer's reliable channel.
    pub async fn send(&self, payload: Bytes) -> Result<(), RaknetError> {
        if !self.is_connected() {
            return Err(RaknetError::Disconnected);
        }
        self.socket.send_to(&frame(&payload), self.remote_addr).await?;
        Ok(())
    }

    /// Receives the next logical packet, or `None` once the peer has disconnected.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.inbound.recv().await
    }

    /// Sends a disconnection notification and marks the peer closed. Idempotent.
    pub async fn disconnect(&self, reason: &str) {
        if !self.connected.swap(false, Ordering::AcqRel) {
            return;
        }
        tracing::debug!(addr = %self.remote_addr, %reason, "disconnecting RakNet peer");
        let _ = self
            .socket
            .send_to(&[consts::DISCONNECTION_NOTIFICATION], self.remote_addr)
            .await;
    }
}

impl Drop for Peer {
    fn drop(&mut self) {
        self.connected.store(false, Ordering::Release);
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
        if let Some(on_drop) = self.on_drop.take() {
            on_drop();
        }
    }
}
