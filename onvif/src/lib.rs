#![doc = include_str!("../README.md")]
/// Xml reply decoding into [value::Value] trees
pub mod decode;
/// Device management service operations and the typed records they produce
pub mod device;
pub mod envelope;
pub mod error;
/// SOAP 1.2 request envelopes with WS-Security UsernameToken authentication
pub mod soap;
pub mod transport;
/// Loosely typed reply tree, dotted path navigation and scalar coercion
pub mod value;

pub use device::Device;
pub use envelope::Envelope;
pub use error::{Error, Result, TransportError};
pub use soap::Credentials;
pub use value::Value;
