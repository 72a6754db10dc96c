//! RequestNetworkSettings — client -> server, first game packet after RakNet connects.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestNetworkSettings {
    pub protocol_version: i32,
}

impl ConnectedPacket for RequestNetworkSettings {
    const ID: u32 = 0xc1;
}

impl ProtoDecode for RequestNetworkSettings {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 4 {
            return Err(ProtoError::BufferTooShort {
                needed: 4,
                remaining: buf.remaining(),
            });
        }
        Ok(Self {
            protocol_version: buf.get_i32(),
        })
    }
}

impl ProtoEncode for RequestNetworkSettings {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.protocol_version);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decodes_protocol_version() {
        let data = Bytes::from_static(&[0x00, 0x00, 0x02, 0xd9]);
        let pkt = RequestNetworkSettings::proto_decode(&mut data.clone()).unwrap();
        assert_eq!(pkt.protocol_version, 729);
    }

    #[test]
    fn rejects_short_buffer() {
        let data = Bytes::from_static(&[0x00, 0x00]);
        assert!(RequestNetworkSettings::proto_decode(&mut data.clone()).is_err());
    }
}
