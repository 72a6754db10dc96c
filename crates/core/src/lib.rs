//! Transparent RakNet proxy for Minecraft: Bedrock Edition. Accepts client
//! connections, mediates just enough of the login handshake to keep both sides
//! satisfied, then forwards game traffic verbatim to a configured backend.

pub mod advertiser;
pub mod config;
pub mod error;
pub mod proxy;
pub mod session;

pub use config::Config;
pub use error::ProxyError;
pub use proxy::Proxy;
