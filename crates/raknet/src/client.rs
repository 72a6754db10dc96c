//! Outbound RakNet client: opens one connection to a remote RakNet server, used by
//! the proxy to establish the downstream half of a session.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut, BufMut};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::consts::{self, OFFLINE_MESSAGE_ID};
use crate::error::RaknetError;
use crate::peer::{self, Peer};
use crate::wire::write_socket_addr;

const PEER_INBOX_SIZE: usize = 256;
const MAX_DATAGRAM: usize = 1500;
const HANDSHAKE_RETRY: Duration = Duration::from_millis(300);

/// Opens outbound RakNet connections.
pub struct Client;

impl Client {
    /// Connects to `remote_addr`, completing the full offline handshake before
    /// returning. `protocol_version` is echoed in `OPEN_CONNECTION_REQUEST_1` and
    /// should match the protocol the upstream client declared, per this proxy's
    /// policy of mirroring the client's version to the backend.
    pub async fn connect(
        remote_addr: SocketAddr,
        protocol_version: u8,
        connect_timeout: Duration,
    ) -> Result<Peer, RaknetError> {
        let bind_addr: SocketAddr = if remote_addr.is_ipv6() {
            "[::]:0".parse().unwrap()
        } else {
            "0.0.0.0:0".parse().unwrap()
        };
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| RaknetError::Bind(bind_addr, e))?;
        socket
            .connect(remote_addr)
            .await
            .map_err(|e| RaknetError::Connect(remote_addr, e))?;
        let socket = Arc::new(socket);
        let client_guid: u64 = rand::random();

        timeout(
            connect_timeout,
            Self::handshake(&socket, remote_addr, protocol_version, client_guid),
        )
        .await
        .map_err(|_| RaknetError::ConnectTimeout(remote_addr))??;

        let (tx, rx) = mpsc::channel(PEER_INBOX_SIZE);
        let connected = Arc::new(AtomicBool::new(true));
        let reader_task = tokio::spawn(Self::run(socket.clone(), tx, connected.clone()));

        Ok(Peer::new(
            remote_addr,
            client_guid,
            protocol_version,
            socket,
            rx,
            connected,
            Some(reader_task),
            None,
        ))
    }

    async fn handshake(
        socket: &UdpSocket,
        remote_addr: SocketAddr,
        protocol_version: u8,
        client_guid: u64,
    ) -> Result<(), RaknetError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        let mut request1 = BytesMut::with_capacity(1 + 16 + 1);
        request1.put_u8(consts::OPEN_CONNECTION_REQUEST_1);
        request1.put_slice(&OFFLINE_MESSAGE_ID);
        request1.put_u8(protocol_version);
        send_until_reply(
            socket,
            &request1,
            &mut buf,
            consts::OPEN_CONNECTION_REPLY_1,
        )
        .await?;

        let mut request2 = BytesMut::with_capacity(1 + 16 + 7 + 2 + 8);
        request2.put_u8(consts::OPEN_CONNECTION_REQUEST_2);
        request2.put_slice(&OFFLINE_MESSAGE_ID);
        write_socket_addr(&mut request2, remote_addr);
        request2.put_u16(consts::DEFAULT_MTU);
        request2.put_u64(client_guid);
        send_until_reply(
            socket,
            &request2,
            &mut buf,
            consts::OPEN_CONNECTION_REPLY_2,
        )
        .await?;

        let request_timestamp = 0i64;
        let mut connection_request = BytesMut::with_capacity(1 + 8 + 8 + 1);
        connection_request.put_u8(consts::CONNECTION_REQUEST);
        connection_request.put_u64(client_guid);
        connection_request.put_i64(request_timestamp);
        connection_request.put_u8(0); // no encryption
        send_until_reply(
            socket,
            &connection_request,
            &mut buf,
            consts::CONNECTION_REQUEST_ACCEPTED,
        )
        .await?;

        let mut new_incoming = BytesMut::with_capacity(1 + 7);
        new_incoming.put_u8(consts::NEW_INCOMING_CONNECTION);
        write_socket_addr(&mut new_incoming, remote_addr);
        socket.send(&new_incoming).await?;

        Ok(())
    }

    async fn run(socket: Arc<UdpSocket>, inbound: mpsc::Sender<Bytes>, connected: Arc<AtomicBool>) {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        loop {
            let len = match socket.recv(&mut buf).await {
                Ok(len) => len,
                Err(e) => {
                    tracing::debug!(error = %e, "downstream socket closed");
                    connected.store(false, Ordering::Release);
                    return;
                }
            };
            let datagram = &buf[..len];

            match datagram.first().copied() {
                Some(consts::DISCONNECTION_NOTIFICATION) => {
                    tracing::debug!("remote server sent disconnection notification");
                    connected.store(false, Ordering::Release);
                    return;
                }
                _ => {
                    if let Some(payload) = peer::unframe(datagram) {
                        if inbound.send(Bytes::copy_from_slice(payload)).await.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}

/// Sends `request` and retries until a datagram starting with `expected_reply_id` is
/// received, or the caller's outer `timeout` fires.
async fn send_until_reply(
    socket: &UdpSocket,
    request: &[u8],
    buf: &mut [u8],
    expected_reply_id: u8,
) -> Result<(), RaknetError> {
    loop {
        socket.send(request).await?;
        match timeout(HANDSHAKE_RETRY, socket.recv(buf)).await {
            Ok(Ok(len)) if len > 0 && buf[0] == expected_reply_id => return Ok(()),
            Ok(Ok(len)) if len > 0 && buf[0] == consts::INCOMPATIBLE_PROTOCOL_VERSION => {
                return Err(RaknetError::UnexpectedReply)
            }
            _ => continue,
        }
    }
}
