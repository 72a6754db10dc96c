//! Bedrock game-packet types and the narrow codec this proxy needs: just the
//! handshake packets the session state machine inspects, plus a raw passthrough
//! wrapper for everything else.

pub mod bedrock;
pub mod codec;
pub mod error;

pub use codec::{ConnectedPacket, ProtoDecode, ProtoEncode, RawBedrockPacket};
pub use error::ProtoError;
