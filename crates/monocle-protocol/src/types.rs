//! Envelope types for Monocle's wire format.
//!
//! Every message on the wire is a JSON object whose `type` field is the
//! discriminator, spelled as the Rust variant name. There are three
//! families:
//!
//! ```text
//! client → server   request   { "type": "Players", ...request fields }
//! server → client   response  { "type": "Players", "data": [...] }
//! server → client   event     { "type": "PlayerDeath", "data": {...} }
//! server → client   error     { "type": "InvalidRequestType", "message": "..." }
//! ```
//!
//! Requests are flat (their extra fields sit next to `type`), while
//! responses and events nest their payload under `data`. That asymmetry
//! is how existing clients speak, so it is kept.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{
    BarricadeModel, PlayerConnectionEvent, PlayerDeathEvent, PlayerMessageEvent,
    PlayerModel, ServerInfoModel, StructureModel, VehicleModel,
};

// ---------------------------------------------------------------------------
// Discriminators
// ---------------------------------------------------------------------------

/// What a client is asking for.
///
/// The set is closed. A value that does not parse into one of these is a
/// protocol error, not a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Credentials for an unauthenticated connection.
    Login,
    Players,
    PlayerDetails,
    Structures,
    Barricades,
    Vehicles,
    ServerInfo,
}

impl RequestType {
    /// Every request type, in declaration order.
    pub const ALL: [RequestType; 7] = [
        RequestType::Login,
        RequestType::Players,
        RequestType::PlayerDetails,
        RequestType::Structures,
        RequestType::Barricades,
        RequestType::Vehicles,
        RequestType::ServerInfo,
    ];

    /// The response type a successful reply to this request carries.
    pub fn response_type(self) -> ResponseType {
        match self {
            RequestType::Login => ResponseType::SuccessfulLogin,
            RequestType::Players => ResponseType::Players,
            RequestType::PlayerDetails => ResponseType::PlayerInfo,
            RequestType::Structures => ResponseType::Structures,
            RequestType::Barricades => ResponseType::Barricades,
            RequestType::Vehicles => ResponseType::Vehicles,
            RequestType::ServerInfo => ResponseType::ServerInfo,
        }
    }

    /// The wire name of this request type.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Login => "Login",
            RequestType::Players => "Players",
            RequestType::PlayerDetails => "PlayerDetails",
            RequestType::Structures => "Structures",
            RequestType::Barricades => "Barricades",
            RequestType::Vehicles => "Vehicles",
            RequestType::ServerInfo => "ServerInfo",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discriminator of a successful [`Response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseType {
    SuccessfulLogin,
    Players,
    PlayerInfo,
    Structures,
    Barricades,
    Vehicles,
    ServerInfo,
}

/// Discriminator of a broadcast [`DomainEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    PlayerDeath,
    PlayerMessage,
    PlayerJoined,
    PlayerLeft,
}

/// Discriminator of an [`ErrorModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    /// The `type` field was missing or not a known [`RequestType`].
    InvalidRequestType,
    /// A `PlayerDetails` request without a usable `userId`.
    InvalidUserId,
    /// The requested player is not on the server.
    PlayerNotFound,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorType::InvalidRequestType => "InvalidRequestType",
            ErrorType::InvalidUserId => "InvalidUserId",
            ErrorType::PlayerNotFound => "PlayerNotFound",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// The part of every request that is read before anything else.
///
/// Unknown fields are ignored, so any request body decodes as a header
/// as long as its `type` is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RequestHeader {
    #[serde(rename = "type")]
    pub request_type: RequestType,
}

/// Body of a login attempt: `{ "type": ..., "username": ..., "password": ... }`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// Keeps passwords out of logs.
impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a `PlayerDetails` request.
///
/// Steam ids do not fit in a JavaScript number, so clients usually send
/// them as strings; plain numbers are accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetailsRequest {
    #[serde(default)]
    user_id: Option<UserIdRepr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum UserIdRepr {
    Text(String),
    Number(u64),
}

impl PlayerDetailsRequest {
    /// Creates a request for the given user id.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(UserIdRepr::Text(user_id.into())),
        }
    }

    /// The requested user id, if one was supplied and is not blank.
    pub fn user_id(&self) -> Option<String> {
        match &self.user_id {
            Some(UserIdRepr::Text(text)) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            Some(UserIdRepr::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Responses, events, errors
// ---------------------------------------------------------------------------

/// A successful reply to a request.
///
/// Adjacently tagged: `{ "type": "<ResponseType>", "data": <payload> }`.
/// The variant names double as the [`ResponseType`] discriminators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Response {
    SuccessfulLogin(String),
    Players(Vec<PlayerModel>),
    PlayerInfo(PlayerModel),
    Structures(Vec<StructureModel>),
    Barricades(Vec<BarricadeModel>),
    Vehicles(Vec<VehicleModel>),
    ServerInfo(ServerInfoModel),
}

impl Response {
    /// The reply sent when a login succeeds.
    pub fn successful_login() -> Self {
        Response::SuccessfulLogin("Authentication succeeded".to_string())
    }

    /// This response's discriminator.
    pub fn response_type(&self) -> ResponseType {
        match self {
            Response::SuccessfulLogin(_) => ResponseType::SuccessfulLogin,
            Response::Players(_) => ResponseType::Players,
            Response::PlayerInfo(_) => ResponseType::PlayerInfo,
            Response::Structures(_) => ResponseType::Structures,
            Response::Barricades(_) => ResponseType::Barricades,
            Response::Vehicles(_) => ResponseType::Vehicles,
            Response::ServerInfo(_) => ResponseType::ServerInfo,
        }
    }
}

/// Something that happened in the game, pushed to every logged-in client.
///
/// Same envelope shape as [`Response`]: `{ "type": "<EventType>", "data": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    PlayerDeath(PlayerDeathEvent),
    PlayerMessage(PlayerMessageEvent),
    PlayerJoined(PlayerConnectionEvent),
    PlayerLeft(PlayerConnectionEvent),
}

impl DomainEvent {
    /// This event's discriminator.
    pub fn event_type(&self) -> EventType {
        match self {
            DomainEvent::PlayerDeath(_) => EventType::PlayerDeath,
            DomainEvent::PlayerMessage(_) => EventType::PlayerMessage,
            DomainEvent::PlayerJoined(_) => EventType::PlayerJoined,
            DomainEvent::PlayerLeft(_) => EventType::PlayerLeft,
        }
    }
}

/// An error reply: `{ "type": "<ErrorType>", "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorModel {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
}

impl ErrorModel {
    /// The reply to a message whose `type` is missing or unknown.
    pub fn invalid_request_type() -> Self {
        Self {
            error_type: ErrorType::InvalidRequestType,
            message: "The request type was not provided or invalid".to_string(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
