//! Top-level proxy: owns the upstream listener, the LAN advertiser, and the
//! DashMap-backed session registry, spawning one session task per accepted client.

use std::net::SocketAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use bytes::Bytes;
use dashmap::DashMap;
use raknet::{Advertisement, Listener};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::advertiser::Advertiser;
use crate::config::Config;
use crate::error::ProxyError;
use crate::session::Session;

struct SessionHandle {
    client_addr: SocketAddr,
    task: JoinHandle<()>,
}

pub struct Proxy {
    config: Config,
    listener: Listener,
    advertisement: Arc<ArcSwap<Bytes>>,
    advertiser: Option<Advertiser>,
    sessions: Arc<DashMap<Uuid, SessionHandle>>,
}

impl Proxy {
    pub async fn new(config: Config) -> Result<Self, ProxyError> {
        let listener = Listener::bind(config.listen.address)
            .await
            .map_err(|e| ProxyError::Bind(config.listen.address, e))?;

        let advertisement = Arc::new(ArcSwap::from_pointee(Bytes::new()));
        let mut proxy = Self {
            config,
            listener,
            advertisement,
            advertiser: None,
            sessions: Arc::new(DashMap::new()),
        };
        proxy.refresh_advertisement();
        Ok(proxy)
    }

    /// Rebuilds the MOTD string from the current config and player count, publishing
    /// it to both the listener's unconnected-pong responder and the LAN advertiser.
    pub fn refresh_advertisement(&mut self) {
        let local_port = self
            .listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(self.config.listen.address.port());

        let advert = Advertisement {
            edition: "MCPE".to_string(),
            motd: self.config.motd.motd.clone(),
            protocol_version: raknet::consts::RAKNET_PROTOCOL_VERSION as i32,
            version_name: self.config.motd.version_name.clone(),
            player_count: self.sessions.len() as u32,
            max_players: self.config.motd.max_players,
            server_id: self.listener.guid(),
            sub_motd: self.config.motd.sub_motd.clone(),
            game_type: self.config.motd.game_type.clone(),
            ipv4_port: local_port,
            ipv6_port: local_port,
        };
        let encoded_str = advert.encode();
        self.listener.set_advertisement(&encoded_str);
        self.advertisement
            .store(Arc::new(Bytes::from(encoded_str.into_bytes())));
    }

    /// Runs the accept loop until the listener is closed.
    pub async fn run(&mut self) -> Result<(), ProxyError> {
        if self.config.advertiser.enabled {
            let advertiser = Advertiser::start(
                self.listener.guid(),
                self.advertisement.clone(),
                self.config.advertiser.interval_ms,
            )
            .await
            .map_err(|e| ProxyError::Internal(format!("failed to start LAN advertiser: {e}")))?;
            self.advertiser = Some(advertiser);
        }

        tracing::info!(addr = %self.config.listen.address, "proxy listening");

        loop {
            match self.listener.accept().await {
                Some(peer) => {
                    let remote_addr = self.config.remote.address;
                    let client_addr = peer.remote_addr();
                    tracing::info!(%client_addr, "accepted client");

                    let session_id = Uuid::new_v4();
                    let sessions = self.sessions.clone();
                    let session = Session::new(peer, remote_addr);
                    let task = tokio::spawn(async move {
                        session.run().await;
                        sessions.remove(&session_id);
                    });
                    self.sessions.insert(
                        session_id,
                        SessionHandle {
                            client_addr,
                            task,
                        },
                    );
                }
                None => {
                    tracing::info!("listener closed, stopping accept loop");
                    return Ok(());
                }
            }
        }
    }

    pub async fn shutdown(self) {
        tracing::info!(sessions = self.sessions.len(), "shutting down proxy");
        if let Some(advertiser) = self.advertiser {
            advertiser.shutdown().await;
        }
        for entry in self.sessions.iter() {
            tracing::debug!(client_addr = %entry.client_addr, "aborting session on shutdown");
            entry.task.abort();
        }
    }
}
