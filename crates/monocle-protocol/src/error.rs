//! Error types for the protocol layer.
//!
//! Two very different things live here. [`ProtocolError`] is a local
//! failure to turn bytes into types or back. [`ApiError`] is a failure a
//! request handler *wants the client to see*: it carries an
//! [`ErrorModel`] that goes on the wire as-is.

use crate::{ErrorModel, ErrorType};

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into text).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}

/// A recoverable request failure reported back to the client.
///
/// Handlers return this for things like an unknown player id. The
/// connection stays open; the server sends [`ApiError::model`] as the
/// reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}", .0.error_type, .0.message)]
pub struct ApiError(pub ErrorModel);

impl ApiError {
    /// Creates an error of the given type with a client-facing message.
    pub fn new(error_type: ErrorType, message: impl Into<String>) -> Self {
        Self(ErrorModel {
            error_type,
            message: message.into(),
        })
    }

    /// The error's discriminator.
    pub fn error_type(&self) -> ErrorType {
        self.0.error_type
    }

    /// The payload that is sent to the client.
    pub fn model(&self) -> &ErrorModel {
        &self.0
    }
}

impl From<ErrorModel> for ApiError {
    fn from(model: ErrorModel) -> Self {
        Self(model)
    }
}
