//! End-to-end handshake scenarios driven over real loopback UDP sockets: a mock
//! client and a mock remote server stand in for the two RakNet peers a `Session`
//! mediates between.

use std::net::SocketAddr;
use std::time::Duration;

use bedrock_proxy::session::Session;
use proto::bedrock::{
    ClientToServerHandshake, Disconnect, Login, NetworkSettings, PlayStatus, PlayStatusKind,
    RequestNetworkSettings, ServerToClientHandshake, Text,
};
use proto::{ConnectedPacket, RawBedrockPacket};
use raknet::{Client, Listener};
use tokio::time::timeout;

const TEST_TIMEOUT: Duration = Duration::from_secs(5);
const TEST_PROTOCOL_VERSION: u8 = raknet::consts::RAKNET_PROTOCOL_VERSION;

async fn bind_loopback() -> Listener {
    Listener::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("failed to bind test listener")
}

#[tokio::test]
async fn s1_cleartext_passthrough() {
    let mut mock_server = bind_loopback().await;
    let server_addr = mock_server.local_addr().unwrap();

    let mut proxy_listener = bind_loopback().await;
    let proxy_addr = proxy_listener.local_addr().unwrap();

    let client_task = tokio::spawn(async move {
        let mut mock_client = Client::connect(proxy_addr, TEST_PROTOCOL_VERSION, TEST_TIMEOUT)
            .await
            .expect("mock client failed to connect to proxy");

        let request = RawBedrockPacket::from_packet(&RequestNetworkSettings {
            protocol_version: 729,
        });
        mock_client.send(request.encode()).await.unwrap();

        let reply = timeout(TEST_TIMEOUT, mock_client.recv())
            .await
            .expect("timed out waiting for NetworkSettings")
            .expect("proxy closed connection");
        let reply = RawBedrockPacket::decode(reply).unwrap();
        assert_eq!(reply.id, NetworkSettings::ID);

        let login = RawBedrockPacket::from_packet(&Login {
            protocol_version: 729,
            chain_payload: bytes::Bytes::from_static(b"stub-chain"),
        });
        mock_client.send(login.encode()).await.unwrap();

        let play_status = timeout(TEST_TIMEOUT, mock_client.recv())
            .await
            .expect("timed out waiting for PlayStatus")
            .expect("proxy closed connection");
        let play_status = RawBedrockPacket::decode(play_status).unwrap();
        assert_eq!(play_status.id, PlayStatus::ID);
        let play_status: PlayStatus = play_status.decode_as().unwrap();
        assert_eq!(play_status.status, PlayStatusKind::LoginSuccess);

        let text = RawBedrockPacket::from_packet(&Text::chat("Steve", "hi"));
        mock_client.send(text.encode()).await.unwrap();

        mock_client
    });

    let upstream_peer = proxy_listener
        .accept()
        .await
        .expect("proxy listener closed unexpectedly");
    let session = Session::new(upstream_peer, server_addr);
    tokio::spawn(session.run());

    let mut server_peer = mock_server
        .accept()
        .await
        .expect("mock server listener closed unexpectedly");

    let login_raw = timeout(TEST_TIMEOUT, server_peer.recv())
        .await
        .expect("mock server timed out waiting for Login")
        .expect("downstream peer closed before Login arrived");
    let login_raw = RawBedrockPacket::decode(login_raw).unwrap();
    assert_eq!(login_raw.id, Login::ID);

    let status = RawBedrockPacket::from_packet(&PlayStatus {
        status: PlayStatusKind::LoginSuccess,
    });
    server_peer.send(status.encode()).await.unwrap();

    let text_raw = timeout(TEST_TIMEOUT, server_peer.recv())
        .await
        .expect("mock server timed out waiting for Text")
        .expect("downstream peer closed before Text arrived");
    let text_raw = RawBedrockPacket::decode(text_raw).unwrap();
    assert_eq!(text_raw.id, Text::ID);
    let text: Text = text_raw.decode_as().unwrap();
    assert_eq!(text.message, "hi");

    client_task.await.unwrap();
}

#[tokio::test]
async fn s2_encrypted_handshake_passthrough() {
    let mut mock_server = bind_loopback().await;
    let server_addr = mock_server.local_addr().unwrap();

    let mut proxy_listener = bind_loopback().await;
    let proxy_addr = proxy_listener.local_addr().unwrap();

    let client_task = tokio::spawn(async move {
        let mut mock_client = Client::connect(proxy_addr, TEST_PROTOCOL_VERSION, TEST_TIMEOUT)
            .await
            .unwrap();

        let request = RawBedrockPacket::from_packet(&RequestNetworkSettings {
            protocol_version: 729,
        });
        mock_client.send(request.encode()).await.unwrap();
        mock_client.recv().await.unwrap();

        let login = RawBedrockPacket::from_packet(&Login {
            protocol_version: 729,
            chain_payload: bytes::Bytes::from_static(b"stub-chain"),
        });
        mock_client.send(login.encode()).await.unwrap();

        let handshake = timeout(TEST_TIMEOUT, mock_client.recv())
            .await
            .expect("timed out waiting for ServerToClientHandshake")
            .unwrap();
        let handshake = RawBedrockPacket::decode(handshake).unwrap();
        assert_eq!(handshake.id, ServerToClientHandshake::ID);
        let handshake: ServerToClientHandshake = handshake.decode_as().unwrap();
        assert_eq!(handshake.jwt, "abc");

        mock_client
    });

    let upstream_peer = proxy_listener.accept().await.unwrap();
    let session = Session::new(upstream_peer, server_addr);
    tokio::spawn(session.run());

    let mut server_peer = mock_server.accept().await.unwrap();

    let login_raw = timeout(TEST_TIMEOUT, server_peer.recv())
        .await
        .expect("mock server timed out waiting for Login")
        .unwrap();
    let login_raw = RawBedrockPacket::decode(login_raw).unwrap();
    assert_eq!(login_raw.id, Login::ID);

    let handshake = RawBedrockPacket::from_packet(&ServerToClientHandshake {
        jwt: "abc".to_string(),
    });
    server_peer.send(handshake.encode()).await.unwrap();

    let ack = timeout(TEST_TIMEOUT, server_peer.recv())
        .await
        .expect("mock server timed out waiting for ClientToServerHandshake")
        .unwrap();
    let ack = RawBedrockPacket::decode(ack).unwrap();
    assert_eq!(ack.id, ClientToServerHandshake::ID);

    client_task.await.unwrap();
}

#[tokio::test]
async fn downstream_connect_failure_disconnects_client_with_reason() {
    let mut proxy_listener = bind_loopback().await;
    let proxy_addr = proxy_listener.local_addr().unwrap();
    // Nothing is listening here; the downstream connect attempt must time out and fail.
    let unreachable_remote: SocketAddr = "127.0.0.1:1".parse().unwrap();

    let client_task = tokio::spawn(async move {
        let mut mock_client = Client::connect(proxy_addr, TEST_PROTOCOL_VERSION, TEST_TIMEOUT)
            .await
            .unwrap();

        let request = RawBedrockPacket::from_packet(&RequestNetworkSettings {
            protocol_version: 729,
        });
        mock_client.send(request.encode()).await.unwrap();
        mock_client.recv().await.unwrap();

        let login = RawBedrockPacket::from_packet(&Login {
            protocol_version: 729,
            chain_payload: bytes::Bytes::new(),
        });
        mock_client.send(login.encode()).await.unwrap();

        let disconnect = timeout(Duration::from_secs(12), mock_client.recv())
            .await
            .expect("timed out waiting for Disconnect")
            .unwrap();
        let disconnect = RawBedrockPacket::decode(disconnect).unwrap();
        assert_eq!(disconnect.id, Disconnect::ID);
        let disconnect: Disconnect = disconnect.decode_as().unwrap();
        assert_eq!(disconnect.message, "Could not connect to the remote server.");
    });

    let upstream_peer = proxy_listener.accept().await.unwrap();
    let session = Session::new(upstream_peer, unreachable_remote);
    tokio::spawn(session.run());

    client_task.await.unwrap();
}
