//! Sent by the server to initiate encryption. This proxy never validates or
//! generates the key material inside; it forwards the JWT through unchanged and
//! replies to the server with an empty `ClientToServerHandshake`.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{read_string, write_string, ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerToClientHandshake {
    /// Token containing the salt and public key. Opaque to this proxy.
    pub jwt: String,
}

impl ConnectedPacket for ServerToClientHandshake {
    const ID: u32 = 0x03;
}

impl ProtoDecode for ServerToClientHandshake {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            jwt: read_string(buf)?,
        })
    }
}

impl ProtoEncode for ServerToClientHandshake {
    fn proto_encode(&self, buf: &mut BytesMut) {
        write_string(buf, &self.jwt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_jwt() {
        let packet = ServerToClientHandshake {
            jwt: "abc".to_string(),
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = ServerToClientHandshake::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(packet, decoded);
    }
}
