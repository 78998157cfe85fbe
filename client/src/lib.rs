//! # Tile Game Client Library
//!
//! Client side of a tile-based multiplayer game whose authoritative simulation
//! runs on a remote server. The client only mirrors that simulation: it keeps a
//! local copy of the world, applies the server's rounds in order, and proposes
//! at most one move at a time on behalf of the local player.
//!
//! ## Architecture Overview
//!
//! ### Server Authority
//! Positions change only when a server round says so. A key press produces a
//! movement command that is sent and remembered as *pending*; the local player
//! moves once the round that contains the move is reconciled. There is no
//! client-side prediction and no rollback.
//!
//! ### Ordered Reconciliation
//! Rounds arrive on a transport task and are buffered in an [`queue::UpdateQueue`].
//! The render loop drains the buffer once per frame and applies each round in
//! arrival order. A round whose id is not newer than the last applied one is
//! dropped whole, so duplicates and replays are harmless.
//!
//! ### Single Command In Flight
//! The [`input::InputGate`] refuses to propose a new move while one is pending.
//! Any server move for the local player clears the pending slot.
//!
//! ## Module Organization
//!
//! - `entity`: grid positions and movable actors
//! - `sprite`: animation table and the [`sprite::RenderAdapter`] seam
//! - `world`: the world state (entities, round, pending command, map)
//! - `queue`: thread-safe buffer of inbound rounds
//! - `reconcile`: applies buffered rounds to the world
//! - `input`: keyboard sampling and the command gate
//! - `game`: one tick of reconcile-then-input
//! - `network`: event bus bridge transport and bootstrap
//! - `rendering`: macroquad drawing of the map, sprites and status line
//! - `config`: command line options
//! - `error`: the client error type
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::GameClient;
//! use client::input::{DirectionalInput, InputGate};
//! use client::network::CommandSink;
//! use client::queue::UpdateQueue;
//! use client::sprite::HeadlessRenderer;
//! use client::world::WorldState;
//! use shared::{PlayerInfo, Snapshot};
//!
//! fn drive(sink: &mut dyn CommandSink) -> Result<(), client::error::ClientError> {
//!     let mut render = HeadlessRenderer::new();
//!     let snapshot = Snapshot::new(0, vec![PlayerInfo::new(1, 2, 2)]);
//!     let world = WorldState::from_snapshot("map_1", 1, 1, &snapshot, &mut render)?;
//!     let mut game = GameClient::new(world, UpdateQueue::new(), InputGate::default());
//!
//!     loop {
//!         game.tick(DirectionalInput::default(), &mut render, sink);
//!     }
//! }
//! ```

pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod queue;
pub mod reconcile;
pub mod rendering;
pub mod sprite;
pub mod world;
