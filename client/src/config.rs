use clap::Parser;
use shared::{GameId, PlayerId, SPECTATOR_ID, WALLS_LAYER};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Tile game client for the event bus bridge", long_about = None)]
pub struct ClientConfig {
    /// Bus bridge address to connect to
    #[arg(short = 'b', long, default_value = "127.0.0.1:7000")]
    pub bus: String,

    /// Game to join or watch
    #[arg(short = 'g', long)]
    pub game: GameId,

    /// Local player id; -1 watches the game as a spectator
    #[arg(short = 'p', long, default_value_t = SPECTATOR_ID, allow_negative_numbers = true)]
    pub player: PlayerId,

    /// Register a new player with this name instead of using --player
    #[arg(short = 'n', long, conflicts_with = "player")]
    pub name: Option<String>,

    /// Spectator id of an already registered replay
    #[arg(long, conflicts_with = "player")]
    pub spectator: Option<PlayerId>,

    /// Register a replay starting at this snapshot index
    #[arg(long, conflicts_with_all = ["spectator", "player"])]
    pub replay_from: Option<u32>,

    /// Tiled JSON map to draw and collide against
    #[arg(short = 'm', long, default_value = "static/maps/map_1.json")]
    pub map: PathBuf,

    /// Map layer whose tiles block movement
    #[arg(long, default_value = WALLS_LAYER)]
    pub walls_layer: String,

    /// Character sprite sheet; squares are drawn when missing
    #[arg(long)]
    pub sprites: Option<PathBuf>,
}

/// How the client enters the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    Player(PlayerId),
    Register(String),
    Spectator(PlayerId),
    Replay(u32),
}

impl ClientConfig {
    pub fn mode(&self) -> Result<SessionMode, String> {
        if let Some(name) = &self.name {
            return Ok(SessionMode::Register(name.clone()));
        }
        if self.player != SPECTATOR_ID {
            return Ok(SessionMode::Player(self.player));
        }
        match (self.spectator, self.replay_from) {
            (Some(id), _) => Ok(SessionMode::Spectator(id)),
            (None, Some(index)) => Ok(SessionMode::Replay(index)),
            (None, None) => Err("spectators need --spectator or --replay-from".to_string()),
        }
    }

    /// Map name as known to the world: the file stem of `--map`.
    pub fn map_name(&self) -> String {
        self.map
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map".to_string())
    }
}
