//! Inbound RakNet listener: accepts connections from Bedrock clients and answers
//! unconnected pings for server-list / LAN discovery on the same socket.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::{BufMut, Bytes, BytesMut};
use dashmap::DashMap;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::consts::{self, OFFLINE_MESSAGE_ID};
use crate::error::RaknetError;
use crate::motd;
use crate::peer::{self, Peer};
use crate::wire::write_socket_addr;

const ACCEPT_QUEUE_SIZE: usize = 64;
const PEER_INBOX_SIZE: usize = 256;
const MAX_DATAGRAM: usize = 1500;

enum Slot {
    /// Received OPEN_CONNECTION_REQUEST_1, waiting for OPEN_CONNECTION_REQUEST_2.
    Pinged { protocol_version: u8 },
    /// Received OPEN_CONNECTION_REQUEST_2, waiting for CONNECTION_REQUEST /
    /// NEW_INCOMING_CONNECTION to complete the handshake.
    Handshaking { guid: u64, protocol_version: u8 },
    Connected {
        inbound: mpsc::Sender<Bytes>,
        connected: Arc<AtomicBool>,
    },
}

/// Binds one UDP socket and fans inbound RakNet traffic out into per-peer channels.
pub struct Listener {
    socket: Arc<UdpSocket>,
    guid: u64,
    advertisement: Arc<ArcSwap<Bytes>>,
    accept_rx: mpsc::Receiver<Peer>,
    reader_task: JoinHandle<()>,
}

impl Listener {
    pub async fn bind(addr: SocketAddr) -> Result<Self, RaknetError> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| RaknetError::Bind(addr, e))?;
        let socket = Arc::new(socket);
        let guid = rand::random();
        let advertisement = Arc::new(ArcSwap::from_pointee(Bytes::new()));
        let peers: Arc<DashMap<SocketAddr, Slot>> = Arc::new(DashMap::new());
        let (accept_tx, accept_rx) = mpsc::channel(ACCEPT_QUEUE_SIZE);

        let reader_task = tokio::spawn(Self::run(
            socket.clone(),
            guid,
            advertisement.clone(),
            peers,
            accept_tx,
        ));

        tracing::info!(%addr, "RakNet listener bound");
        Ok(Self {
            socket,
            guid,
            advertisement,
            accept_rx,
            reader_task,
        })
    }

    pub fn guid(&self) -> u64 {
        self.guid
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Replaces the MOTD string sent in reply to discovery pings. Takes effect
    /// immediately for the next ping, with no lock held by the reader loop.
    pub fn set_advertisement(&self, motd: &str) {
        self.advertisement.store(Arc::new(Bytes::copy_from_slice(motd.as_bytes())));
    }

    /// Waits for the next fully-handshaked inbound peer.
    pub async fn accept(&mut self) -> Option<Peer> {
        self.accept_rx.recv().await
    }

    async fn run(
        socket: Arc<UdpSocket>,
        guid: u64,
        advertisement: Arc<ArcSwap<Bytes>>,
        peers: Arc<DashMap<SocketAddr, Slot>>,
        accept_tx: mpsc::Sender<Peer>,
    ) {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let (len, addr) = match socket.recv_from(&mut buf).await {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::error!(error = %e, "RakNet listener socket error, stopping");
                    return;
                }
            };
            let datagram = &buf[..len];

            if let Some(timestamp) = motd::parse_ping(datagram) {
                let advert = advertisement.load();
                let motd_str = String::from_utf8_lossy(&advert);
                let pong = motd::build_pong(timestamp, guid, &motd_str);
                if let Err(e) = socket.send_to(&pong, addr).await {
                    tracing::debug!(error = %e, %addr, "failed to send discovery pong");
                }
                continue;
            }

            match datagram.first().copied() {
                Some(consts::OPEN_CONNECTION_REQUEST_1) => {
                    Self::handle_open_connection_request_1(&socket, guid, addr, datagram, &peers)
                        .await;
                }
                Some(consts::OPEN_CONNECTION_REQUEST_2) => {
                    Self::handle_open_connection_request_2(&socket, guid, addr, datagram, &peers)
                        .await;
                }
                Some(consts::CONNECTION_REQUEST) => {
                    Self::handle_connection_request(&socket, addr, datagram).await;
                }
                Some(consts::NEW_INCOMING_CONNECTION) => {
                    Self::handle_new_incoming_connection(
                        &socket, addr, &peers, &accept_tx,
                    )
                    .await;
                }
                Some(consts::DISCONNECTION_NOTIFICATION) => {
                    if let Some((_, Slot::Connected { connected, .. })) = peers.remove(&addr) {
                        connected.store(false, Ordering::Release);
                        tracing::debug!(%addr, "peer sent disconnection notification");
                    }
                }
                _ => {
                    if let Some(payload) = peer::unframe(datagram) {
                        if let Some(Slot::Connected { inbound, .. }) = peers.get(&addr).as_deref() {
                            if inbound.try_send(Bytes::copy_from_slice(payload)).is_err() {
                                tracing::debug!(%addr, "peer inbox full or closed, dropping packet");
                            }
                        }
                    }
                }
            }
        }
    }

    async fn handle_open_connection_request_1(
        socket: &UdpSocket,
        guid: u64,
        addr: SocketAddr,
        datagram: &[u8],
        peers: &DashMap<SocketAddr, Slot>,
    ) {
        // Layout (client -> server): id, magic(16), protocol_version(1), padding to MTU.
        let protocol_version = datagram
            .get(1 + 16)
            .copied()
            .unwrap_or(consts::RAKNET_PROTOCOL_VERSION);
        peers.insert(addr, Slot::Pinged { protocol_version });

        let mut reply = BytesMut::with_capacity(1 + 16 + 8 + 1 + 2);
        reply.put_u8(consts::OPEN_CONNECTION_REPLY_1);
        reply.put_slice(&OFFLINE_MESSAGE_ID);
        reply.put_u64(guid);
        reply.put_u8(0); // use_security
        reply.put_u16(consts::DEFAULT_MTU);
        let _ = socket.send_to(&reply, addr).await;
    }

    async fn handle_open_connection_request_2(
        socket: &UdpSocket,
        guid: u64,
        addr: SocketAddr,
        datagram: &[u8],
        peers: &DashMap<SocketAddr, Slot>,
    ) {
        // Layout (client -> server): id, magic(16), server address, mtu(2), client guid(8).
        let client_guid = if datagram.len() >= 8 {
            u64::from_be_bytes(datagram[datagram.len() - 8..].try_into().unwrap())
        } else {
            0
        };
        let protocol_version = match peers.get(&addr).as_deref() {
            Some(Slot::Pinged { protocol_version }) => *protocol_version,
            _ => consts::RAKNET_PROTOCOL_VERSION,
        };
        peers.insert(
            addr,
            Slot::Handshaking {
                guid: client_guid,
                protocol_version,
            },
        );

        let mut reply = BytesMut::with_capacity(1 + 16 + 8 + 7 + 2 + 1);
        reply.put_u8(consts::OPEN_CONNECTION_REPLY_2);
        reply.put_slice(&OFFLINE_MESSAGE_ID);
        reply.put_u64(guid);
        write_socket_addr(&mut reply, addr);
        reply.put_u16(consts::DEFAULT_MTU);
        reply.put_u8(0); // encryption disabled
        let _ = socket.send_to(&reply, addr).await;
    }

    async fn handle_connection_request(socket: &UdpSocket, addr: SocketAddr, datagram: &[u8]) {
        let request_timestamp = if datagram.len() >= 9 {
            i64::from_be_bytes(datagram[1..9].try_into().unwrap())
        } else {
            0
        };

        let mut reply = BytesMut::with_capacity(1 + 8 + 8 + 1);
        reply.put_u8(consts::CONNECTION_REQUEST_ACCEPTED);
        reply.put_i64(request_timestamp);
        reply.put_i64(request_timestamp);
        let _ = socket.send_to(&reply, addr).await;
    }

    async fn handle_new_incoming_connection(
        socket: &Arc<UdpSocket>,
        addr: SocketAddr,
        peers: &Arc<DashMap<SocketAddr, Slot>>,
        accept_tx: &mpsc::Sender<Peer>,
    ) {
        let (guid, protocol_version) = match peers.get(&addr).as_deref() {
            Some(Slot::Handshaking {
                guid,
                protocol_version,
            }) => (*guid, *protocol_version),
            _ => {
                tracing::warn!(%addr, "NEW_INCOMING_CONNECTION without a prior handshake");
                return;
            }
        };

        let (tx, rx) = mpsc::channel(PEER_INBOX_SIZE);
        let connected = Arc::new(AtomicBool::new(true));
        peers.insert(
            addr,
            Slot::Connected {
                inbound: tx,
                connected: connected.clone(),
            },
        );

        let peers_for_drop = peers.clone();
        let on_drop: Box<dyn FnOnce() + Send + Sync> = Box::new(move || {
            peers_for_drop.remove(&addr);
        });

        let peer = Peer::new(
            addr,
            guid,
            protocol_version,
            socket.clone(),
            rx,
            connected,
            None,
            Some(on_drop),
        );
        if accept_tx.send(peer).await.is_err() {
            tracing::warn!(%addr, "accept queue closed, dropping new connection");
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.reader_task.abort();
    }
}
