//! Applies queued server rounds to the world.
//!
//! Per round: stale rounds are dropped whole, joins are applied before moves,
//! and a move of the local player confirms the in-flight command. Moves for
//! entities that never joined are reported and skipped; the rest of the round
//! still applies.

use crate::entity::Entity;
use crate::error::ClientError;
use crate::queue::UpdateQueue;
use crate::sprite::RenderAdapter;
use crate::world::WorldState;
use log::{debug, info, warn};
use shared::{InboundEvent, MoveCommand, StructuralAction};

/// Result of applying a single round.
#[derive(Debug)]
pub enum EventOutcome {
    /// Round was at or behind the world's round; nothing changed.
    Stale,
    Applied {
        joined: usize,
        moved: usize,
        confirmed: Option<MoveCommand>,
        errors: Vec<ClientError>,
    },
}

/// Summary of one drain of the update queue.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub applied: usize,
    pub skipped: usize,
    pub joined: usize,
    pub moved: usize,
    pub confirmed: Option<MoveCommand>,
    pub errors: Vec<ClientError>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn apply_event(
    world: &mut WorldState,
    event: &InboundEvent,
    render: &mut dyn RenderAdapter,
) -> EventOutcome {
    if world.is_stale(event.round_id) {
        debug!(
            "Skipping round {} (current round {})",
            event.round_id,
            world.round()
        );
        return EventOutcome::Stale;
    }

    let mut joined = 0;
    let mut moved = 0;
    let mut confirmed = None;
    let mut errors = Vec::new();

    for action in &event.actions {
        match action {
            StructuralAction::NewPlayer { player } => {
                info!(
                    "Player {} joined at ({}, {})",
                    player.player_id, player.x, player.y
                );
                world.insert(Entity::from_info(player, render));
                joined += 1;
            }
            StructuralAction::Unknown => {
                warn!("Ignoring unknown action in round {}", event.round_id);
            }
        }
    }

    let local = world.local_player_id();
    let gated = !world.is_spectator();
    for mv in &event.players {
        if gated && mv.player_id == local {
            if let Some(cmd) = world.clear_pending() {
                debug!(
                    "Command {} confirmed by round {} as {}",
                    cmd.mov, event.round_id, mv.mov
                );
                confirmed = Some(cmd);
            }
        }

        match world.entity_mut(mv.player_id) {
            Some(entity) => {
                entity.step(mv.mov, render);
                moved += 1;
            }
            None => {
                let err = ClientError::UnknownEntity {
                    entity_id: mv.player_id,
                    round: event.round_id,
                };
                warn!("{}", err);
                errors.push(err);
            }
        }
    }

    world.advance_round(event.round_id);

    EventOutcome::Applied {
        joined,
        moved,
        confirmed,
        errors,
    }
}

/// Drains the queue and applies every round in arrival order.
pub fn reconcile(
    world: &mut WorldState,
    queue: &UpdateQueue,
    render: &mut dyn RenderAdapter,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for event in queue.drain() {
        match apply_event(world, &event, render) {
            EventOutcome::Stale => report.skipped += 1,
            EventOutcome::Applied {
                joined,
                moved,
                confirmed,
                errors,
            } => {
                report.applied += 1;
                report.joined += joined;
                report.moved += moved;
                if confirmed.is_some() {
                    report.confirmed = confirmed;
                }
                report.errors.extend(errors);
            }
        }
    }

    report
}
