//! Records describing game state as clients see it.
//!
//! The game-state provider builds these from engine objects; this crate
//! only fixes their shape. All field names go out in lower camel case.

use serde::{Deserialize, Serialize};

/// A position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A connected player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerModel {
    /// Steam id, as a decimal string.
    pub id: String,
    /// Steam display name.
    pub name: String,
    /// In-game character name.
    pub character_name: String,
    pub position: Vector3,
    /// Yaw in degrees.
    pub rotation: f32,
    pub health: u8,
    pub is_admin: bool,
    /// Round-trip time in seconds.
    pub ping: f32,
}

/// A placed building piece: floor, wall, roof, stairs and so on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureModel {
    pub instance_id: u32,
    pub asset_id: u16,
    pub name: String,
    pub owner_id: String,
    pub group_id: String,
    pub position: Vector3,
    pub health: u16,
}

/// A placed barricade: lockers, wardrobes, plates, anything that can also
/// be attached to a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarricadeModel {
    pub instance_id: u32,
    pub asset_id: u16,
    pub name: String,
    pub owner_id: String,
    pub group_id: String,
    pub position: Vector3,
    pub health: u16,
    /// Set when the barricade is attached to a vehicle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_instance_id: Option<u32>,
}

/// A spawned vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModel {
    pub instance_id: u32,
    pub asset_id: u16,
    pub name: String,
    pub position: Vector3,
    pub health: u16,
    pub fuel: u16,
    pub is_locked: bool,
    #[serde(default)]
    pub locked_owner_id: Option<String>,
    /// Steam ids of the players seated in the vehicle.
    #[serde(default)]
    pub passengers: Vec<String>,
}

/// Static and slow-changing facts about the running server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfoModel {
    pub name: String,
    pub map: String,
    /// Edge length of the (square) map, in world units.
    pub map_size: u32,
    pub player_count: u32,
    pub max_players: u32,
    pub pvp: bool,
}

/// Payload of [`DomainEvent::PlayerDeath`](crate::DomainEvent::PlayerDeath).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDeathEvent {
    pub dead_player: PlayerModel,
    /// Steam id of the killer, if another player was responsible.
    #[serde(default)]
    pub murderer_id: Option<String>,
    /// Engine death cause, e.g. `GUN` or `ZOMBIE`.
    pub cause: String,
}

/// Payload of [`DomainEvent::PlayerMessage`](crate::DomainEvent::PlayerMessage).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMessageEvent {
    pub player: PlayerModel,
    /// Chat color as `#rrggbb`.
    pub color: String,
    /// `Global`, `Local`, `Group`, ...
    pub chat_mode: String,
    pub message: String,
}

/// Payload of both `PlayerJoined` and `PlayerLeft`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConnectionEvent {
    pub player: PlayerModel,
}
