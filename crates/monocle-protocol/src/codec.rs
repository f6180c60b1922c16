//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The transport carries text, so a codec turns values into `String`s and
//! back. [`JsonCodec`] is the only implementation today; the server is
//! generic over [`Codec`] so tests and future formats can plug in.

use serde::{de::DeserializeOwned, Serialize};

use crate::{ProtocolError, RequestHeader, RequestType};

/// A codec that can encode Rust types to text and decode text back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text message.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented
    /// in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text message into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the text is malformed,
    /// incomplete, or doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError>;

    /// Reads only the discriminator of an inbound request.
    ///
    /// Never fails: a message that is not an object, has no `type`, or
    /// names an unknown type yields `None`. The caller decides what a
    /// missing type means.
    fn request_type(&self, data: &str) -> Option<RequestType> {
        self.decode::<RequestHeader>(data)
            .ok()
            .map(|header| header.request_type)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use monocle_protocol::{Codec, JsonCodec, RequestType, Response};
///
/// let codec = JsonCodec;
///
/// let text = codec.encode(&Response::Players(vec![])).unwrap();
/// assert_eq!(text, r#"{"type":"Players","data":[]}"#);
///
/// assert_eq!(
///     codec.request_type(r#"{"type":"Vehicles"}"#),
///     Some(RequestType::Vehicles)
/// );
/// assert_eq!(codec.request_type("not json"), None);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(data).map_err(ProtocolError::Decode)
    }
}
