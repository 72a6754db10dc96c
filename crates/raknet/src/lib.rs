//! Minimal RakNet transport: offline handshake, discovery ping/pong, and a framed
//! byte channel per connected peer. Full RakNet (ACK/NACK retransmission,
//! fragmentation, ordering channels) is intentionally not reimplemented here; see
//! [`peer::frame`] for the narrow substitute this proxy relies on instead.

pub mod client;
pub mod consts;
pub mod error;
pub mod listener;
pub mod motd;
pub mod peer;
mod wire;

pub use client::Client;
pub use error::RaknetError;
pub use listener::Listener;
pub use motd::Advertisement;
pub use peer::Peer;
