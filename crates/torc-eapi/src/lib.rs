// torc-eapi: Async Rust client for the Arista EOS eAPI (JSON-RPC over HTTPS)

pub mod connection;
pub mod error;
pub mod rpc;
pub mod secrets;
pub mod transport;

pub use connection::Connector;
pub use error::Error;
pub use rpc::{EapiSession, Encoding, TextOutput};
pub use secrets::EapiSecrets;
pub use transport::{TlsMode, TransportConfig};
