//! Disconnect — either direction, carries the reason shown to the player.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{read_string, write_string, ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    pub hide_disconnect_screen: bool,
    pub message: String,
}

impl ConnectedPacket for Disconnect {
    const ID: u32 = 0x05;
}

impl ProtoDecode for Disconnect {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 1 {
            return Err(ProtoError::BufferTooShort {
                needed: 1,
                remaining: 0,
            });
        }
        let hide_disconnect_screen = buf.get_u8() != 0;
        let message = if hide_disconnect_screen {
            String::new()
        } else {
            read_string(buf)?
        };
        Ok(Self {
            hide_disconnect_screen,
            message,
        })
    }
}

impl ProtoEncode for Disconnect {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.hide_disconnect_screen as u8);
        if !self.hide_disconnect_screen {
            write_string(buf, &self.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_message() {
        let packet = Disconnect {
            hide_disconnect_screen: false,
            message: "Could not connect to the remote server.".to_string(),
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = Disconnect::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(packet, decoded);
    }

    #[test]
    fn hidden_screen_carries_no_message() {
        let packet = Disconnect {
            hide_disconnect_screen: true,
            message: String::new(),
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        assert_eq!(buf.len(), 1);
    }
}
