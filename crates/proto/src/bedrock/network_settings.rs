//! NetworkSettings — server -> client, synthesized in reply to RequestNetworkSettings.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionAlgorithm {
    Zlib,
    Snappy,
    None,
}

impl CompressionAlgorithm {
    fn to_wire(self) -> u16 {
        match self {
            Self::Zlib => 0,
            Self::Snappy => 1,
            Self::None => 0xffff,
        }
    }

    fn from_wire(value: u16) -> Self {
        match value {
            0 => Self::Zlib,
            1 => Self::Snappy,
            _ => Self::None,
        }
    }
}

/// The server's reply to `RequestNetworkSettings`, negotiating compression before
/// the login packet. This proxy always synthesizes one with compression disabled
/// (threshold 0) rather than forwarding whatever the real upstream would pick, since
/// it is sent before the downstream connection exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkSettings {
    pub compression_threshold: u16,
    pub compression_algorithm: CompressionAlgorithm,
    pub client_throttle_enabled: bool,
    pub client_throttle_threshold: u8,
    pub client_throttle_scalar: f32,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            compression_threshold: 0,
            compression_algorithm: CompressionAlgorithm::Zlib,
            client_throttle_enabled: false,
            client_throttle_threshold: 0,
            client_throttle_scalar: 0.0,
        }
    }
}

impl ConnectedPacket for NetworkSettings {
    const ID: u32 = 0x8f;
}

impl ProtoDecode for NetworkSettings {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 9 {
            return Err(ProtoError::BufferTooShort {
                needed: 9,
                remaining: buf.remaining(),
            });
        }
        Ok(Self {
            compression_threshold: buf.get_u16(),
            compression_algorithm: CompressionAlgorithm::from_wire(buf.get_u16()),
            client_throttle_enabled: buf.get_u8() != 0,
            client_throttle_threshold: buf.get_u8(),
            client_throttle_scalar: buf.get_f32(),
        })
    }
}

impl ProtoEncode for NetworkSettings {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_u16(self.compression_threshold);
        buf.put_u16(self.compression_algorithm.to_wire());
        buf.put_u8(self.client_throttle_enabled as u8);
        buf.put_u8(self.client_throttle_threshold);
        buf.put_f32(self.client_throttle_scalar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn default_disables_compression() {
        let settings = NetworkSettings::default();
        assert_eq!(settings.compression_threshold, 0);
        assert_eq!(settings.compression_algorithm, CompressionAlgorithm::Zlib);
    }

    #[test]
    fn round_trips() {
        let settings = NetworkSettings::default();
        let mut buf = BytesMut::new();
        settings.proto_encode(&mut buf);
        let decoded = NetworkSettings::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(settings, decoded);
    }
}
