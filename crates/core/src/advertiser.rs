//! Periodic LAN broadcast so the proxy shows up as a discoverable "LAN world" to
//! nearby clients, independent of the unconnected-ping responder on the main socket.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use raknet::motd;

const LAN_DISCOVERY_PORT: u16 = 19132;
const GLOBAL_BROADCAST: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

/// Broadcasts a fresh `UNCONNECTED_PONG` to every interface's broadcast address (plus
/// the global broadcast address) on a fixed interval.
pub struct Advertiser {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Advertiser {
    pub async fn start(
        server_id: u64,
        advertisement: Arc<ArcSwap<Bytes>>,
        interval_ms: u64,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(Self::run(
            socket,
            server_id,
            advertisement,
            Duration::from_millis(interval_ms),
            task_cancel,
        ));

        Ok(Self { cancel, task })
    }

    async fn run(
        socket: UdpSocket,
        server_id: u64,
        advertisement: Arc<ArcSwap<Bytes>>,
        period: Duration,
        cancel: CancellationToken,
    ) {
        let mut ticker = interval(period);
        let mut timestamp: i64 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {
                    timestamp += 1;
                    let advert = advertisement.load();
                    let motd_str = String::from_utf8_lossy(&advert);
                    let pong = motd::build_pong(timestamp, server_id, &motd_str);

                    for dest in broadcast_destinations() {
                        if let Err(e) = socket.send_to(&pong, dest).await {
                            tracing::debug!(error = %e, %dest, "LAN advertisement send failed");
                        }
                    }
                }
            }
        }
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

/// Collects each non-loopback IPv4 interface's directed broadcast address, falling
/// back to just the global broadcast address if interface enumeration fails or
/// yields nothing usable.
fn broadcast_destinations() -> Vec<SocketAddr> {
    let mut destinations = Vec::new();

    match if_addrs::get_if_addrs() {
        Ok(interfaces) => {
            for iface in interfaces {
                if iface.is_loopback() {
                    continue;
                }
                if let if_addrs::IfAddr::V4(v4) = iface.addr {
                    if let Some(broadcast) = v4.broadcast {
                        destinations.push(SocketAddr::V4(SocketAddrV4::new(
                            broadcast,
                            LAN_DISCOVERY_PORT,
                        )));
                    }
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "failed to enumerate network interfaces");
        }
    }

    destinations.push(SocketAddr::V4(SocketAddrV4::new(
        GLOBAL_BROADCAST,
        LAN_DISCOVERY_PORT,
    )));
    destinations.sort_by_key(|a| a.to_string());
    destinations.dedup();
    destinations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_includes_global_broadcast() {
        let destinations = broadcast_destinations();
        assert!(destinations.contains(&SocketAddr::V4(SocketAddrV4::new(
            GLOBAL_BROADCAST,
            LAN_DISCOVERY_PORT
        ))));
    }

    #[tokio::test]
    async fn starts_and_shuts_down_cleanly() {
        let advertisement = Arc::new(ArcSwap::from_pointee(Bytes::from_static(
            b"MCPE;test;11;1.21.90;0;20;1;sub;Survival;1;19150;19150",
        )));
        let advertiser = Advertiser::start(1, advertisement, 10)
            .await
            .expect("failed to start advertiser");

        tokio::time::sleep(Duration::from_millis(50)).await;
        advertiser.shutdown().await;
    }
}
