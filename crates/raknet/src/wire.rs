//! Small address-encoding helper shared by the listener and client handshakes. Only
//! encoding is needed: every RakNet offline-handshake packet that carries an address
//! field is built by this process, never parsed from one — the peer's real address
//! is already known from the UDP datagram's source.

use std::net::SocketAddr;

use bytes::{BufMut, BytesMut};

pub(crate) fn write_socket_addr(buf: &mut BytesMut, addr: SocketAddr) {
    match addr {
        SocketAddr::V4(v4) => {
            buf.put_u8(4);
            buf.put_slice(&v4.ip().octets());
            buf.put_u16(v4.port());
        }
        SocketAddr::V6(v6) => {
            buf.put_u8(6);
            buf.put_slice(&v6.ip().octets());
            buf.put_u16(v6.port());
        }
    }
}
