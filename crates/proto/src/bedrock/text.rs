//! Text — chat and system messages. Forwarded verbatim in both directions during
//! `Playing`; only decoded here because tests assert on message content.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::{read_string, write_string, ConnectedPacket, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextType {
    Raw,
    Chat,
    Translation,
    Popup,
    JukeboxPopup,
    Tip,
    System,
    Whisper,
    Announcement,
    ObjectWhisper,
    Object,
    ObjectAnnouncement,
}

impl TextType {
    fn to_wire(self) -> u8 {
        match self {
            Self::Raw => 0,
            Self::Chat => 1,
            Self::Translation => 2,
            Self::Popup => 3,
            Self::JukeboxPopup => 4,
            Self::Tip => 5,
            Self::System => 6,
            Self::Whisper => 7,
            Self::Announcement => 8,
            Self::ObjectWhisper => 9,
            Self::Object => 10,
            Self::ObjectAnnouncement => 11,
        }
    }

    fn from_wire(value: u8) -> Self {
        match value {
            1 => Self::Chat,
            2 => Self::Translation,
            3 => Self::Popup,
            4 => Self::JukeboxPopup,
            5 => Self::Tip,
            6 => Self::System,
            7 => Self::Whisper,
            8 => Self::Announcement,
            9 => Self::ObjectWhisper,
            10 => Self::Object,
            11 => Self::ObjectAnnouncement,
            _ => Self::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub text_type: TextType,
    pub needs_translation: bool,
    pub source_name: String,
    pub message: String,
    pub xuid: String,
}

impl ConnectedPacket for Text {
    const ID: u32 = 0x09;
}

impl ProtoDecode for Text {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        if buf.remaining() < 2 {
            return Err(ProtoError::BufferTooShort {
                needed: 2,
                remaining: buf.remaining(),
            });
        }
        let text_type = TextType::from_wire(buf.get_u8());
        let needs_translation = buf.get_u8() != 0;
        let source_name = match text_type {
            TextType::Chat | TextType::Whisper | TextType::Announcement => read_string(buf)?,
            _ => String::new(),
        };
        let message = read_string(buf)?;
        let xuid = read_string(buf)?;
        Ok(Self {
            text_type,
            needs_translation,
            source_name,
            message,
            xuid,
        })
    }
}

impl ProtoEncode for Text {
    fn proto_encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.text_type.to_wire());
        buf.put_u8(self.needs_translation as u8);
        if matches!(
            self.text_type,
            TextType::Chat | TextType::Whisper | TextType::Announcement
        ) {
            write_string(buf, &self.source_name);
        }
        write_string(buf, &self.message);
        write_string(buf, &self.xuid);
    }
}

impl Text {
    /// Builds a plain chat message, the common case this proxy's tests exercise.
    pub fn chat(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            text_type: TextType::Chat,
            needs_translation: false,
            source_name: source_name.into(),
            message: message.into(),
            xuid: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_chat_message() {
        let packet = Text::chat("Steve", "hi");
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = Text::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(packet, decoded);
    }

    #[test]
    fn system_messages_skip_source_name() {
        let packet = Text {
            text_type: TextType::System,
            needs_translation: false,
            source_name: String::new(),
            message: "server restarting".to_string(),
            xuid: String::new(),
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = Text::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.message, "server restarting");
    }
}
