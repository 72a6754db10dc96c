//! Errors raised while decoding or encoding a Bedrock handshake packet.

#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    #[error("buffer too short: needed {needed} bytes, had {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("unknown packet id {0:#04x}")]
    UnknownPacketId(u32),

    #[error("invalid packet body: {0}")]
    Malformed(String),
}
