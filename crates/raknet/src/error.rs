use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum RaknetError {
    #[error("failed to bind RakNet socket to {0}: {1}")]
    Bind(SocketAddr, std::io::Error),

    #[error("failed to connect to {0}: {1}")]
    Connect(SocketAddr, std::io::Error),

    #[error("connection attempt to {0} timed out")]
    ConnectTimeout(SocketAddr),

    #[error("peer is disconnected")]
    Disconnected,

    #[error("remote sent an unexpected handshake reply")]
    UnexpectedReply,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
