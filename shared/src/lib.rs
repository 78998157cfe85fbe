//! Types shared by everything that talks to the game bus: identifiers,
//! movement directions, the JSON message model, bridge frames and the tile map.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod bridge;
pub mod map;
pub mod protocol;

pub use bridge::{BridgeFrame, FailureCode};
pub use map::TileMap;
pub use protocol::{
    InboundEvent, MoveAction, MoveCommand, PlayerInfo, ServerPush, Snapshot, StructuralAction,
};

pub type PlayerId = i32;
pub type GameId = i32;
pub type RoundId = u32;

/// Player id used by clients that only watch a game.
pub const SPECTATOR_ID: PlayerId = -1;

pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;
pub const DEFAULT_TILE_SIZE: u32 = 20;

pub const WALLS_LAYER: &str = "walls";
pub const FLOOR_LAYER: &str = "floor";
pub const FURNITURE_LAYER: &str = "furniture";

/// One-cell movement on the grid, encoded on the wire as `l`, `r`, `u`, `d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "u")]
    Up,
    #[serde(rename = "d")]
    Down,
}

impl Direction {
    /// Sampling order used by the input gate: first pressed direction wins.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Grid offset of a single step. `y` grows downwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Direction::Left => "l",
            Direction::Right => "r",
            Direction::Up => "u",
            Direction::Down => "d",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Event bus addresses used by games and replays.
pub mod addresses {
    use super::{GameId, PlayerId};

    pub fn game(game_id: GameId) -> String {
        format!("game.{}", game_id)
    }

    pub fn browser_game(game_id: GameId) -> String {
        format!("browser.game.{}", game_id)
    }

    pub fn replay_register(game_id: GameId) -> String {
        format!("replay.register.{}", game_id)
    }

    pub fn replay_start(game_id: GameId) -> String {
        format!("replay.start.{}", game_id)
    }

    /// Replays are pushed to the spectator's own address, not the game's.
    pub fn browser_replay(spectator_id: PlayerId) -> String {
        format!("browser.replay.{}", spectator_id)
    }
}
