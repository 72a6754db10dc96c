//! RakNet wire constants.
//!
//! Pure data: packet identifiers and the offline-message magic every
//! connectionless RakNet datagram must carry verbatim.

/// Magic sequence that prefixes every offline (connectionless) RakNet message.
pub const OFFLINE_MESSAGE_ID: [u8; 16] = [
    0x00, 0xff, 0xff, 0x00, 0xfe, 0xfe, 0xfe, 0xfe, 0xfd, 0xfd, 0xfd, 0xfd, 0x12, 0x34, 0x56, 0x78,
];

pub const UNCONNECTED_PING: u8 = 0x01;
/// Sent by some console clients instead of [`UNCONNECTED_PING`].
pub const OPEN_CONNECTION_PING: u8 = 0x02;
pub const UNCONNECTED_PONG: u8 = 0x1c;

pub const OPEN_CONNECTION_REQUEST_1: u8 = 0x05;
pub const OPEN_CONNECTION_REPLY_1: u8 = 0x06;
pub const OPEN_CONNECTION_REQUEST_2: u8 = 0x07;
pub const OPEN_CONNECTION_REPLY_2: u8 = 0x08;

pub const CONNECTION_REQUEST: u8 = 0x09;
pub const CONNECTION_REQUEST_ACCEPTED: u8 = 0x10;
pub const NEW_INCOMING_CONNECTION: u8 = 0x13;
pub const DISCONNECTION_NOTIFICATION: u8 = 0x15;
pub const INCOMPATIBLE_PROTOCOL_VERSION: u8 = 0x19;

pub const FRAME_SET_PACKET_MIN: u8 = 0x80;
pub const FRAME_SET_PACKET_MAX: u8 = 0x8d;
pub const NACK: u8 = 0xa0;
pub const ACK: u8 = 0xc0;

pub const RAKNET_PROTOCOL_VERSION: u8 = 11;
pub const DEFAULT_MTU: u16 = 1400;

/// Fixed port Bedrock clients send LAN broadcast pings to. Not configurable.
pub const LAN_DISCOVERY_PORT: u16 = 19132;
