//! Serves a static world snapshot over Monocle.
//!
//! Useful for building dashboards without a running game: point it at a
//! JSON snapshot, log in with a configured user, and query away. Lines
//! typed on stdin are broadcast as chat messages from the console.

use std::path::PathBuf;

use clap::Parser;
use monocle::prelude::*;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Snapshot provider
// ---------------------------------------------------------------------------

/// A frozen copy of the game state, read once at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotProvider {
    server_info: ServerInfoModel,
    #[serde(default)]
    players: Vec<PlayerModel>,
    #[serde(default)]
    structures: Vec<StructureModel>,
    #[serde(default)]
    barricades: Vec<BarricadeModel>,
    #[serde(default)]
    vehicles: Vec<VehicleModel>,
}

impl SnapshotProvider {
    fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// An empty world, used when no snapshot file is given.
    fn empty() -> Self {
        Self {
            server_info: ServerInfoModel {
                name: "Monocle Snapshot".into(),
                map: "None".into(),
                map_size: 0,
                player_count: 0,
                max_players: 0,
                pvp: false,
            },
            players: Vec::new(),
            structures: Vec::new(),
            barricades: Vec::new(),
            vehicles: Vec::new(),
        }
    }
}

impl GameStateProvider for SnapshotProvider {
    fn players(&self) -> Result<Vec<PlayerModel>, ApiError> {
        Ok(self.players.clone())
    }

    fn player_details(&self, user_id: &str) -> Result<PlayerModel, ApiError> {
        self.players
            .iter()
            .find(|p| p.id == user_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::new(
                    ErrorType::PlayerNotFound,
                    format!("No player with id {user_id} is online"),
                )
            })
    }

    fn structures(&self) -> Result<Vec<StructureModel>, ApiError> {
        Ok(self.structures.clone())
    }

    fn barricades(&self) -> Result<Vec<BarricadeModel>, ApiError> {
        Ok(self.barricades.clone())
    }

    fn vehicles(&self) -> Result<Vec<VehicleModel>, ApiError> {
        Ok(self.vehicles.clone())
    }

    fn server_info(&self) -> Result<ServerInfoModel, ApiError> {
        Ok(self.server_info.clone())
    }
}

// ---------------------------------------------------------------------------
// Console chat
// ---------------------------------------------------------------------------

fn console_player() -> PlayerModel {
    PlayerModel {
        id: "0".into(),
        name: "Console".into(),
        character_name: "Console".into(),
        position: Vector3::default(),
        rotation: 0.0,
        health: 100,
        is_admin: true,
        ping: 0.0,
    }
}

/// Broadcasts each non-empty stdin line as a global chat message.
async fn relay_console(events: EventHandle) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => {
                events.on_domain_event(DomainEvent::PlayerMessage(PlayerMessageEvent {
                    player: console_player(),
                    color: "#00ffff".into(),
                    chat_mode: "Global".into(),
                    message: line,
                }));
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read stdin");
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server bootstrap
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "monocle.toml")]
    config: PathBuf,

    /// JSON world snapshot to serve; an empty world if omitted
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = MonocleConfig::load(&args.config).await?;

    let provider = match &args.snapshot {
        Some(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            let snapshot = SnapshotProvider::from_json(&text)?;
            tracing::info!(
                path = %path.display(),
                players = snapshot.players.len(),
                structures = snapshot.structures.len(),
                barricades = snapshot.barricades.len(),
                vehicles = snapshot.vehicles.len(),
                "snapshot loaded"
            );
            snapshot
        }
        None => SnapshotProvider::empty(),
    };

    let server = MonocleServer::builder()
        .config(&config)?
        .build(provider, config.credential_store())
        .await?;

    tokio::spawn(relay_console(server.events()));

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
            }
        })
        .await?;
    Ok(())
}
