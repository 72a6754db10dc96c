//! Minimal Bedrock game-packet codec: just enough to decode/encode the handshake
//! packet types the session state machine inspects. Everything else travels as
//! [`RawBedrockPacket`] and is never parsed.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtoError;

/// A packet type with a stable numeric id on the Bedrock game-packet wire.
pub trait ConnectedPacket {
    const ID: u32;
}

pub trait ProtoDecode: Sized {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError>;
}

pub trait ProtoEncode {
    fn proto_encode(&self, buf: &mut BytesMut);
}

fn require(buf: &impl Buf, needed: usize) -> Result<(), ProtoError> {
    if buf.remaining() < needed {
        Err(ProtoError::BufferTooShort {
            needed,
            remaining: buf.remaining(),
        })
    } else {
        Ok(())
    }
}

/// Reads a Bedrock-style unsigned LEB128 varint.
pub fn read_var_u32(buf: &mut impl Buf) -> Result<u32, ProtoError> {
    let mut value: u32 = 0;
    for shift in (0..35).step_by(7) {
        require(buf, 1)?;
        let byte = buf.get_u8();
        value |= ((byte & 0x7f) as u32) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(ProtoError::Malformed("varint too long".to_string()))
}

pub fn write_var_u32(buf: &mut BytesMut, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

/// Reads a length-prefixed (var_u32) UTF-8 string, the Bedrock wire's string encoding.
pub fn read_string(buf: &mut impl Buf) -> Result<String, ProtoError> {
    let len = read_var_u32(buf)? as usize;
    require(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ProtoError::Malformed(e.to_string()))
}

pub fn write_string(buf: &mut BytesMut, s: &str) {
    write_var_u32(buf, s.len() as u32);
    buf.put_slice(s.as_bytes());
}

/// An undecoded game packet, identified only by its leading var_u32 id. Used for
/// everything that travels through the forwarding plane without inspection.
#[derive(Debug, Clone)]
pub struct RawBedrockPacket {
    pub id: u32,
    pub body: Bytes,
}

impl RawBedrockPacket {
    /// Splits a raw game-packet datagram into its id and remaining body.
    pub fn decode(mut datagram: Bytes) -> Result<Self, ProtoError> {
        let id = read_var_u32(&mut datagram)?;
        Ok(Self { id, body: datagram })
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(5 + self.body.len());
        write_var_u32(&mut buf, self.id);
        buf.put_slice(&self.body);
        buf.freeze()
    }

    /// Decodes the body as a known packet type, checking the id matches.
    pub fn decode_as<T: ConnectedPacket + ProtoDecode>(&self) -> Result<T, ProtoError> {
        if self.id != T::ID {
            return Err(ProtoError::UnknownPacketId(self.id));
        }
        T::proto_decode(&mut self.body.clone())
    }

    pub fn from_packet<T: ConnectedPacket + ProtoEncode>(packet: &T) -> Self {
        let mut body = BytesMut::new();
        packet.proto_encode(&mut body);
        Self {
            id: T::ID,
            body: body.freeze(),
        }
    }
}
