//! Client-side model of one game session.

use crate::entity::Entity;
use crate::error::ClientError;
use crate::sprite::RenderAdapter;
use log::{info, warn};
use shared::{GameId, MoveCommand, PlayerId, RoundId, Snapshot, TileMap, SPECTATOR_ID};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything the client knows about the game it is showing.
///
/// Owns all entities and the single in-flight movement proposal. The round
/// number only ever grows.
#[derive(Debug)]
pub struct WorldState {
    pub map_name: String,
    pub game_id: GameId,
    local_player: PlayerId,
    entities: HashMap<PlayerId, Entity>,
    round: RoundId,
    pending: Option<MoveCommand>,
    map: Option<Arc<TileMap>>,
}

impl WorldState {
    pub fn new(map_name: &str, game_id: GameId, local_player: PlayerId, round: RoundId) -> Self {
        Self {
            map_name: map_name.to_string(),
            game_id,
            local_player,
            entities: HashMap::new(),
            round,
            pending: None,
            map: None,
        }
    }

    /// Builds the world from a roster snapshot.
    ///
    /// Fails when a non-spectator local player is missing from the roster.
    pub fn from_snapshot(
        map_name: &str,
        game_id: GameId,
        local_player: PlayerId,
        snapshot: &Snapshot,
        render: &mut dyn RenderAdapter,
    ) -> Result<Self, ClientError> {
        let mut world = Self::new(map_name, game_id, local_player, snapshot.round_id);
        for info in &snapshot.players {
            world.insert(Entity::from_info(info, render));
        }

        if !world.is_spectator() && !world.entities.contains_key(&local_player) {
            return Err(ClientError::UnknownEntity {
                entity_id: local_player,
                round: snapshot.round_id,
            });
        }

        info!(
            "World for game {} bootstrapped at round {} with {} players",
            game_id,
            snapshot.round_id,
            world.entities.len()
        );
        Ok(world)
    }

    pub fn is_spectator(&self) -> bool {
        self.local_player == SPECTATOR_ID
    }

    pub fn local_player_id(&self) -> PlayerId {
        self.local_player
    }

    pub fn local_player(&self) -> Option<&Entity> {
        if self.is_spectator() {
            return None;
        }
        self.entities.get(&self.local_player)
    }

    pub fn entity(&self, id: PlayerId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub(crate) fn entity_mut(&mut self, id: PlayerId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Inserts an entity, replacing (and returning) any entry with the same id.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        let replaced = self.entities.insert(entity.id(), entity);
        if let Some(old) = &replaced {
            warn!("Entity {} joined again, replacing previous entry", old.id());
        }
        replaced
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    /// True when an event for `round` has already been applied or superseded.
    pub fn is_stale(&self, round: RoundId) -> bool {
        round <= self.round
    }

    pub(crate) fn advance_round(&mut self, round: RoundId) {
        self.round = self.round.max(round);
    }

    pub fn pending(&self) -> Option<&MoveCommand> {
        self.pending.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn set_pending(&mut self, cmd: MoveCommand) {
        debug_assert!(self.pending.is_none(), "a command is already in flight");
        self.pending = Some(cmd);
    }

    pub(crate) fn clear_pending(&mut self) -> Option<MoveCommand> {
        self.pending.take()
    }

    pub fn attach_map(&mut self, map: Arc<TileMap>) {
        self.map = Some(map);
    }

    pub fn map(&self) -> Option<&TileMap> {
        self.map.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::GridPos;
    use crate::sprite::HeadlessRenderer;
    use shared::{Direction, PlayerInfo};

    fn snapshot() -> Snapshot {
        Snapshot::new(5, vec![PlayerInfo::new(1, 2, 3), PlayerInfo::new(2, 7, 7)])
    }

    #[test]
    fn test_bootstrap_from_snapshot() {
        let mut render = HeadlessRenderer::new();
        let world = WorldState::from_snapshot("map", 1, 1, &snapshot(), &mut render).unwrap();

        assert_eq!(world.round(), 5);
        assert_eq!(world.entity_count(), 2);
        assert_eq!(world.local_player_id(), 1);
        assert_eq!(world.local_player().unwrap().position(), GridPos::new(2, 3));
        assert!(!world.is_spectator());
        assert!(!world.has_pending());
        assert_eq!(render.created.len(), 2);
    }

    #[test]
    fn test_bootstrap_rejects_missing_local_player() {
        let mut render = HeadlessRenderer::new();
        let result = WorldState::from_snapshot("map", 1, 9, &snapshot(), &mut render);
        assert!(matches!(
            result,
            Err(ClientError::UnknownEntity {
                entity_id: 9,
                round: 5
            })
        ));
    }

    #[test]
    fn test_spectator_has_no_local_player() {
        let mut render = HeadlessRenderer::new();
        let world =
            WorldState::from_snapshot("map", 1, SPECTATOR_ID, &snapshot(), &mut render).unwrap();
        assert!(world.is_spectator());
        assert!(world.local_player().is_none());
    }

    #[test]
    fn test_round_never_decreases() {
        let mut world = WorldState::new("map", 1, SPECTATOR_ID, 5);
        world.advance_round(7);
        world.advance_round(6);
        assert_eq!(world.round(), 7);
        assert!(world.is_stale(7));
        assert!(world.is_stale(3));
        assert!(!world.is_stale(8));
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut render = HeadlessRenderer::new();
        let mut world = WorldState::new("map", 1, SPECTATOR_ID, 0);
        assert!(world
            .insert(Entity::spawn(2, GridPos::new(0, 0), None, &mut render))
            .is_none());
        let replaced = world.insert(Entity::spawn(2, GridPos::new(4, 4), None, &mut render));
        assert_eq!(replaced.unwrap().position(), GridPos::new(0, 0));
        assert_eq!(world.entity(2).unwrap().position(), GridPos::new(4, 4));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_pending_command_lifecycle() {
        let mut world = WorldState::new("map", 1, 1, 0);
        world.set_pending(MoveCommand::new(1, Direction::Up));
        assert_eq!(world.pending(), Some(&MoveCommand::new(1, Direction::Up)));
        assert_eq!(
            world.clear_pending(),
            Some(MoveCommand::new(1, Direction::Up))
        );
        assert!(!world.has_pending());
    }

    #[test]
    fn test_attach_map() {
        let mut world = WorldState::new("map", 1, SPECTATOR_ID, 0);
        assert!(world.map().is_none());
        world.attach_map(Arc::new(TileMap::new(4, 4, 20, 20)));
        assert_eq!(world.map().unwrap().width, 4);
    }
}
