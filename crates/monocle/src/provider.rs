//! The game-state seam.
//!
//! Monocle never touches engine objects itself. The host implements
//! [`GameStateProvider`] to turn live game state into wire records, and
//! the request router calls it once per request.

use monocle_protocol::{
    ApiError, BarricadeModel, PlayerModel, ServerInfoModel, StructureModel,
    VehicleModel,
};

/// Read access to the running game.
///
/// Each method may fail with an [`ApiError`]; the router sends that error
/// back to the requesting client and keeps the connection open.
///
/// `Send + Sync + 'static` because one provider is shared by every
/// connection task.
pub trait GameStateProvider: Send + Sync + 'static {
    /// All connected players.
    fn players(&self) -> Result<Vec<PlayerModel>, ApiError>;

    /// One player, by Steam id.
    ///
    /// Implementations should return
    /// [`ErrorType::PlayerNotFound`](monocle_protocol::ErrorType::PlayerNotFound)
    /// for an id that is not on the server.
    fn player_details(&self, user_id: &str) -> Result<PlayerModel, ApiError>;

    /// Placed structures (floors, walls, roofs, ...).
    fn structures(&self) -> Result<Vec<StructureModel>, ApiError>;

    /// Placed barricades (storage, plates, ...).
    fn barricades(&self) -> Result<Vec<BarricadeModel>, ApiError>;

    fn vehicles(&self) -> Result<Vec<VehicleModel>, ApiError>;

    fn server_info(&self) -> Result<ServerInfoModel, ApiError>;
}
