//! MOTD (server advertisement) encoding and the unconnected ping/pong frame layout.

use crate::consts::OFFLINE_MESSAGE_ID;
use bytes::{BufMut, Bytes, BytesMut};

/// The information a Bedrock client shows in its server list / LAN list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub edition: String,
    pub motd: String,
    pub protocol_version: i32,
    pub version_name: String,
    pub player_count: u32,
    pub max_players: u32,
    pub server_id: u64,
    pub sub_motd: String,
    pub game_type: String,
    pub ipv4_port: u16,
    pub ipv6_port: u16,
}

impl Advertisement {
    /// Serializes the fields into the semicolon-delimited MOTD string. Field order and
    /// count (12 fields, `1` as the literal numeric game-type field) are bit-exact.
    pub fn encode(&self) -> String {
        format!(
            "{};{};{};{};{};{};{};{};{};1;{};{}",
            self.edition,
            self.motd,
            self.protocol_version,
            self.version_name,
            self.player_count,
            self.max_players,
            self.server_id,
            self.sub_motd,
            self.game_type,
            self.ipv4_port,
            self.ipv6_port,
        )
    }

    /// Parses a MOTD string built by [`Advertisement::encode`]. Tolerates a trailing
    /// semicolon and any number of extra trailing fields.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_suffix(';').unwrap_or(s);
        let mut parts = s.split(';');

        let edition = parts.next()?.to_string();
        let motd = parts.next()?.to_string();
        let protocol_version = parts.next()?.parse().ok()?;
        let version_name = parts.next()?.to_string();
        let player_count = parts.next()?.parse().ok()?;
        let max_players = parts.next()?.parse().ok()?;
        let server_id = parts.next()?.parse().ok()?;
        let sub_motd = parts.next()?.to_string();
        let game_type = parts.next()?.to_string();
        let _game_type_numeric = parts.next()?;
        let ipv4_port = parts.next()?.parse().ok()?;
        let ipv6_port = parts.next()?.parse().ok()?;

        Some(Self {
            edition,
            motd,
            protocol_version,
            version_name,
            player_count,
            max_players,
            server_id,
            sub_motd,
            game_type,
            ipv4_port,
            ipv6_port,
        })
    }
}

/// Recognizes an `UNCONNECTED_PING` / `OPEN_CONNECTION_PING` datagram and extracts the
/// client timestamp that must be echoed back. Returns `None` for anything else, which
/// the caller should delegate to the connection-establishment path.
pub fn parse_ping(datagram: &[u8]) -> Option<i64> {
    use crate::consts::{OPEN_CONNECTION_PING, UNCONNECTED_PING};

    if datagram.len() < 9 {
        return None;
    }
    match datagram[0] {
        UNCONNECTED_PING | OPEN_CONNECTION_PING => {
            Some(i64::from_be_bytes(datagram[1..9].try_into().ok()?))
        }
        _ => None,
    }
}

/// Builds the `UNCONNECTED_PONG` datagram: id, echoed timestamp, server id, magic,
/// MOTD length prefix, MOTD bytes.
pub fn build_pong(echoed_timestamp: i64, server_id: u64, motd: &str) -> Bytes {
    let motd_bytes = motd.as_bytes();
    let mut buf = BytesMut::with_capacity(1 + 8 + 8 + 16 + 2 + motd_bytes.len());

    buf.put_u8(crate::consts::UNCONNECTED_PONG);
    buf.put_i64(echoed_timestamp);
    buf.put_u64(server_id);
    buf.put_slice(&OFFLINE_MESSAGE_ID);
    buf.put_u16(motd_bytes.len() as u16);
    buf.put_slice(motd_bytes);

    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Advertisement {
        Advertisement {
            edition: "MCPE".to_string(),
            motd: "A Bedrock Server".to_string(),
            protocol_version: 729,
            version_name: "1.21.90".to_string(),
            player_count: 3,
            max_players: 20,
            server_id: 123456789,
            sub_motd: "Survival World".to_string(),
            game_type: "Survival".to_string(),
            ipv4_port: 19150,
            ipv6_port: 19151,
        }
    }

    #[test]
    fn round_trips_through_encode_and_parse() {
        let advert = sample();
        let parsed = Advertisement::parse(&advert.encode()).unwrap();
        assert_eq!(advert, parsed);
    }

    #[test]
    fn tolerates_trailing_semicolon_and_extra_fields() {
        let mut encoded = sample().encode();
        encoded.push(';');
        encoded.push_str("extra;fields;here");
        assert_eq!(Advertisement::parse(&encoded).unwrap(), sample());
    }

    #[test]
    fn parse_ping_extracts_timestamp_for_both_packet_ids() {
        let mut datagram = vec![0x01u8];
        datagram.extend_from_slice(&0x1122334455667788i64.to_be_bytes());
        datagram.extend_from_slice(&[0u8; 24]);
        assert_eq!(parse_ping(&datagram), Some(0x1122334455667788));

        datagram[0] = 0x02;
        assert_eq!(parse_ping(&datagram), Some(0x1122334455667788));
    }

    #[test]
    fn parse_ping_rejects_short_or_unknown_datagrams() {
        assert_eq!(parse_ping(&[0x01, 0, 0]), None);
        assert_eq!(parse_ping(&[0x09; 20]), None);
    }

    #[test]
    fn build_pong_has_expected_layout() {
        let pong = build_pong(0x1122334455667788u64 as i64, 42, "MCPE;test");
        assert_eq!(pong[0], crate::consts::UNCONNECTED_PONG);
        assert_eq!(&pong[1..9], &0x1122334455667788u64.to_be_bytes());
        assert_eq!(&pong[9..17], &42u64.to_be_bytes());
        assert_eq!(&pong[17..33], &OFFLINE_MESSAGE_ID);
        let motd_len = u16::from_be_bytes(pong[33..35].try_into().unwrap()) as usize;
        assert_eq!(&pong[35..35 + motd_len], b"MCPE;test");
    }
}
