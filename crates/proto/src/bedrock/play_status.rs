//! PlayStatus — server -> client, reports login/spawn progress.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatusKind {
    LoginSuccess,
    FailedClient,
    FailedServer,
    PlayerSpawn,
    FailedInvalidTenant,
    FailedVanillaEdu,
    FailedIncompatiblePack,
    FailedServerFull,
    FailedEditorVanillaMismatch,
    FailedVanillaEditorMismatch,
    Unknown(i32),
}

impl PlayStatusKind {
    fn to_wire(self) -> i32 {
        match self {
            Self::LoginSuccess => 0,
            Self::FailedClient => 1,
            Self::FailedServer => 2,
            Self::PlayerSpawn => 3,
            Self::FailedInvalidTenant => 4,
            Self::FailedVanillaEdu => 5,
            Self::FailedIncompatiblePack => 6,
            Self::FailedServerFull => 7,
            Self::FailedEditorVanillaMismatch => 8,
            Self::FailedVanillaEditorMismatch => 9,
            Self::Unknown(value) => value,
        }
    }

    fn from_wire(value: i32) -> Self {
        match value {
            0 => Self::LoginSuccess,
            1 => Self::FailedClient,
            2 => Self::FailedServer,
            3 => Self::PlayerSpawn,
            4 => Self::FailedInvalidTenant,
            5 => Self::FailedVanillaEdu,
            6 => Self::FailedIncompatiblePack,
            7 => Self::FailedServerFull,
            8 => Self::FailedEditorVanillaMismatch,
            9 => Self::FailedVanillaEditorMismatch,
            other => Self::Unknown(other),
        }
    }

    /// Whether this status indicates the session is ready to leave the handshake and
    /// enter bulk passthrough.
    pub fn completes_handshake(self) -> bool {
        matches!(self, Self::LoginSuccess | Self::PlayerSpawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayStatus {
    pub status: PlayStatusKind,
}

impl ConnectedPacket for PlayStatus {
    const ID: u32 = 0x02;
}

impl ProtoDecode for PlayStatus {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 4 {
            return Err(ProtoError::BufferTooShort {
                needed: 4,
                remaining: buf.remaining(),
            });
        }
        Ok(Self {
            status: PlayStatusKind::from_wire(buf.get_i32()),
        })
    }
}

impl ProtoEncode for PlayStatus {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_i32(self.status.to_wire());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_success_completes_handshake() {
        assert!(PlayStatusKind::LoginSuccess.completes_handshake());
        assert!(PlayStatusKind::PlayerSpawn.completes_handshake());
        assert!(!PlayStatusKind::FailedServerFull.completes_handshake());
    }

    #[test]
    fn round_trips() {
        let packet = PlayStatus {
            status: PlayStatusKind::PlayerSpawn,
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = PlayStatus::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(packet, decoded);
    }
}
