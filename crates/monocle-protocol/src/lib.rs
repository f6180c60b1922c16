//! Wire protocol for Monocle.
//!
//! This crate defines what travels between the server and its clients:
//!
//! - **Types** ([`RequestType`], [`Response`], [`DomainEvent`],
//!   [`ErrorModel`], ...): the envelopes and their discriminators.
//! - **Models** ([`PlayerModel`], [`VehicleModel`], ...): the game-state
//!   records carried inside envelopes.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how envelopes become
//!   text and back.
//! - **Errors** ([`ProtocolError`], [`ApiError`]).
//!
//! ```text
//! Transport (text) → Protocol (envelopes) → Session (identity)
//! ```
//!
//! It knows nothing about connections or authentication.

mod codec;
mod error;
pub mod models;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ApiError, ProtocolError};
pub use models::{
    BarricadeModel, PlayerConnectionEvent, PlayerDeathEvent, PlayerMessageEvent,
    PlayerModel, ServerInfoModel, StructureModel, Vector3, VehicleModel,
};
pub use types::{
    DomainEvent, ErrorModel, ErrorType, EventType, LoginRequest,
    PlayerDetailsRequest, RequestHeader, RequestType, Response, ResponseType,
};
