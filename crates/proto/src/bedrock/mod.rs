//! Bedrock game packets the session state machine inspects directly. Anything not
//! listed here travels as [`crate::codec::RawBedrockPacket`].

mod disconnect;
mod login;
mod network_settings;
mod play_status;
mod request_network_settings;
mod server_to_client_handshake;
mod text;

pub use disconnect::Disconnect;
pub use login::{ClientToServerHandshake, Login};
pub use network_settings::{CompressionAlgorithm, NetworkSettings};
pub use play_status::{PlayStatus, PlayStatusKind};
pub use request_network_settings::RequestNetworkSettings;
pub use server_to_client_handshake::ServerToClientHandshake;
pub use text::Text;
