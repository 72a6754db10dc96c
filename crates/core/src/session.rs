//! Per-client session: one upstream RakNet peer (the real client), one downstream
//! RakNet peer (opened lazily once the client logs in), and the handshake state
//! machine that mediates between them before flipping to bulk passthrough.
//!
//! One task per session owns both peers' receive loops via `tokio::select!`; nothing
//! here is shared across tasks except through the peers' own channels, so the state
//! machine needs no lock.

use std::time::Duration;

use bytes::Bytes;
use raknet::{Client, Peer};

use proto::bedrock::{
    ClientToServerHandshake, Disconnect, Login, NetworkSettings, PlayStatus, RequestNetworkSettings,
    ServerToClientHandshake,
};
use proto::{ConnectedPacket, RawBedrockPacket};

const DOWNSTREAM_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a session is in the login handshake. `Playing` is terminal; every other
/// phase still inspects at least one packet type specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    AwaitingNetworkSettings,
    AwaitingDownstream,
    Playing,
}

async fn recv_downstream(downstream: &mut Option<Peer>) -> Option<Bytes> {
    match downstream {
        Some(peer) => peer.recv().await,
        None => std::future::pending().await,
    }
}

pub struct Session {
    upstream: Peer,
    downstream: Option<Peer>,
    phase: HandshakePhase,
    pending_login: Option<Login>,
    /// Latched once the first `Login` is accepted, so a duplicate arriving before
    /// the downstream connects is dropped instead of opening a second connection.
    login_received: bool,
    /// Set once the downstream rejects the handshake; tells `run` to stop after the
    /// current dispatch instead of continuing to forward on a dead session.
    ending: bool,
    remote_addr: std::net::SocketAddr,
}

impl Session {
    pub fn new(upstream: Peer, remote_addr: std::net::SocketAddr) -> Self {
        Self {
            upstream,
            downstream: None,
            phase: HandshakePhase::AwaitingNetworkSettings,
            pending_login: None,
            login_received: false,
            ending: false,
            remote_addr,
        }
    }

    /// Runs the session to completion: drives the handshake, then forwards packets
    /// in both directions until either peer disconnects.
    pub async fn run(mut self) {
        let client_addr = self.upstream.remote_addr();
        tracing::debug!(%client_addr, "session started");

        loop {
            tokio::select! {
                upstream_packet = self.upstream.recv() => {
                    match upstream_packet {
                        Some(datagram) => {
                            if let Err(e) = self.handle_upstream(datagram).await {
                                tracing::debug!(%client_addr, error = %e, "dropping malformed upstream packet");
                            }
                        }
                        None => {
                            tracing::debug!(%client_addr, "upstream disconnected");
                            break;
                        }
                    }
                }
                downstream_packet = recv_downstream(&mut self.downstream) => {
                    match downstream_packet {
                        Some(datagram) => {
                            if let Err(e) = self.handle_downstream(datagram).await {
                                tracing::debug!(%client_addr, error = %e, "dropping malformed downstream packet");
                            }
                            if self.ending {
                                break;
                            }
                        }
                        None => {
                            tracing::debug!(%client_addr, "downstream disconnected");
                            break;
                        }
                    }
                }
            }
        }

        if let Some(downstream) = &self.downstream {
            downstream.disconnect("Upstream session ended.").await;
        }
        tracing::debug!(%client_addr, "session ended");
    }

    async fn handle_upstream(&mut self, datagram: Bytes) -> anyhow::Result<()> {
        let raw = RawBedrockPacket::decode(datagram)?;

        match self.phase {
            HandshakePhase::AwaitingNetworkSettings => {
                if raw.id == RequestNetworkSettings::ID {
                    let request: RequestNetworkSettings = raw.decode_as()?;
                    self.reply_network_settings(request.protocol_version).await?;
                } else {
                    tracing::warn!(
                        client = %self.upstream.remote_addr(),
                        packet_id = raw.id,
                        "unexpected packet before RequestNetworkSettings, dropping"
                    );
                }
            }
            HandshakePhase::AwaitingDownstream => {
                if raw.id == Login::ID && !self.login_received && self.downstream.is_none() {
                    let login: Login = raw.decode_as()?;
                    self.login_received = true;
                    self.begin_downstream_connect(login).await?;
                } else if raw.id == ClientToServerHandshake::ID {
                    self.forward_to_downstream(&raw).await?;
                } else {
                    tracing::debug!(
                        client = %self.upstream.remote_addr(),
                        packet_id = raw.id,
                        "dropping upstream packet received before downstream is ready"
                    );
                }
            }
            HandshakePhase::Playing => {
                self.forward_to_downstream(&raw).await?;
            }
        }
        Ok(())
    }

    async fn handle_downstream(&mut self, datagram: Bytes) -> anyhow::Result<()> {
        let raw = RawBedrockPacket::decode(datagram)?;

        match self.phase {
            HandshakePhase::AwaitingDownstream => {
                if raw.id == ServerToClientHandshake::ID {
                    self.forward_to_upstream(&raw).await?;
                    let reply = RawBedrockPacket::from_packet(&ClientToServerHandshake);
                    self.send_downstream(&reply).await?;
                } else if raw.id == PlayStatus::ID {
                    let status: PlayStatus = raw.decode_as()?;
                    self.forward_to_upstream(&raw).await?;
                    if status.status.completes_handshake() {
                        self.phase = HandshakePhase::Playing;
                        tracing::debug!(client = %self.upstream.remote_addr(), "handshake complete");
                    }
                } else if raw.id == Disconnect::ID {
                    self.forward_to_upstream(&raw).await?;
                    self.upstream.disconnect("Remote server rejected the handshake.").await;
                    self.ending = true;
                } else {
                    self.forward_to_upstream(&raw).await?;
                }
            }
            HandshakePhase::Playing | HandshakePhase::AwaitingNetworkSettings => {
                self.forward_to_upstream(&raw).await?;
            }
        }
        Ok(())
    }

    async fn reply_network_settings(&mut self, protocol_version: i32) -> anyhow::Result<()> {
        let settings = NetworkSettings::default();
        let packet = RawBedrockPacket::from_packet(&settings);
        self.upstream.send(packet.encode()).await?;
        self.phase = HandshakePhase::AwaitingDownstream;
        tracing::debug!(
            client = %self.upstream.remote_addr(),
            protocol_version,
            "sent NetworkSettings, awaiting Login"
        );
        Ok(())
    }

    async fn begin_downstream_connect(&mut self, login: Login) -> anyhow::Result<()> {
        let remote_addr = self.remote_addr;
        // Mirror the RakNet protocol version the real client declared in its own
        // offline handshake, not the Bedrock game protocol carried in Login.
        let protocol_version = self.upstream.protocol_version();
        self.pending_login = Some(login);

        match Client::connect(remote_addr, protocol_version, DOWNSTREAM_CONNECT_TIMEOUT).await {
            Ok(peer) => {
                self.downstream = Some(peer);
                self.on_downstream_connected().await?;
            }
            Err(e) => {
                tracing::warn!(%remote_addr, error = %e, "failed to connect to remote server");
                let disconnect = Disconnect {
                    hide_disconnect_screen: false,
                    message: "Could not connect to the remote server.".to_string(),
                };
                let packet = RawBedrockPacket::from_packet(&disconnect);
                self.upstream.send(packet.encode()).await?;
                self.upstream.disconnect("downstream connect failed").await;
            }
        }
        Ok(())
    }

    async fn on_downstream_connected(&mut self) -> anyhow::Result<()> {
        if let Some(login) = self.pending_login.take() {
            let packet = RawBedrockPacket::from_packet(&login);
            self.send_downstream(&packet).await?;
        }
        Ok(())
    }

    async fn forward_to_downstream(&self, raw: &RawBedrockPacket) -> anyhow::Result<()> {
        self.send_downstream(raw).await
    }

    async fn send_downstream(&self, raw: &RawBedrockPacket) -> anyhow::Result<()> {
        match &self.downstream {
            Some(peer) if peer.is_connected() => {
                peer.send(raw.encode()).await?;
            }
            _ => {
                tracing::debug!("dropping packet, downstream not connected");
            }
        }
        Ok(())
    }

    async fn forward_to_upstream(&self, raw: &RawBedrockPacket) -> anyhow::Result<()> {
        if self.upstream.is_connected() {
            self.upstream.send(raw.encode()).await?;
        } else {
            tracing::debug!("dropping packet, upstream not connected");
        }
        Ok(())
    }
}
