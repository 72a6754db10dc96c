//! Login — client -> server, and its encryption-handshake acknowledgement.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::{ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

/// The client's login envelope: a protocol version followed by the Xbox Live
/// identity/client-data chain. This proxy never validates or re-signs the chain, so
/// the body is kept as an opaque blob and forwarded verbatim once the downstream
/// connection is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub protocol_version: i32,
    pub chain_payload: Bytes,
}

impl ConnectedPacket for Login {
    const ID: u32 = 0x01;
}

impl ProtoDecode for Login {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 4 {
            return Err(ProtoError::BufferTooShort {
                needed: 4,
                remaining: buf.remaining(),
            });
        }
        let protocol_version = buf.get_i32();
        let remaining = buf.remaining();
        let mut chain_payload = vec![0u8; remaining];
        buf.copy_to_slice(&mut chain_payload);
        Ok(Self {
            protocol_version,
            chain_payload: Bytes::from(chain_payload),
        })
    }
}

impl ProtoEncode for Login {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.protocol_version);
        buf.put_slice(&self.chain_payload);
    }
}

/// The client's reply to `ServerToClientHandshake`, confirming encryption has been
/// initiated. Always an empty body on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientToServerHandshake;

impl ConnectedPacket for ClientToServerHandshake {
    const ID: u32 = 0x04;
}

impl ProtoDecode for ClientToServerHandshake {
    fn proto_decode(_buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self)
    }
}

impl ProtoEncode for ClientToServerHandshake {
    fn proto_encode(&self, _buf: &mut BytesMut) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_login_payload() {
        let login = Login {
            protocol_version: 729,
            chain_payload: Bytes::from_static(b"stub-chain"),
        };
        let mut buf = BytesMut::new();
        login.proto_encode(&mut buf);
        let decoded = Login::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(login, decoded);
    }

    #[test]
    fn client_to_server_handshake_has_empty_body() {
        let mut buf = BytesMut::new();
        ClientToServerHandshake.proto_encode(&mut buf);
        assert!(buf.is_empty());
    }
}
