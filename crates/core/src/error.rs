//! The proxy's crate-root error surface. Structured variants for anything a caller
//! might want to match on; `anyhow::Result` is used internally within a session's
//! task for errors that only need a log line and a teardown.

use std::net::SocketAddr;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to read configuration from {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write default configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("failed to bind upstream listener on {0}: {1}")]
    Bind(SocketAddr, #[source] raknet::RaknetError),

    #[error("failed to connect to remote server {0}: {1}")]
    Connect(SocketAddr, #[source] raknet::RaknetError),

    #[error("malformed packet: {0}")]
    Codec(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl From<proto::ProtoError> for ProxyError {
    fn from(err: proto::ProtoError) -> Self {
        ProxyError::Codec(err.to_string())
    }
}
