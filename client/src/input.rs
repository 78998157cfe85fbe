//! Local input sampling and the one-command-in-flight gate.

use crate::error::ClientError;
use crate::network::CommandSink;
use crate::sprite::RenderAdapter;
use crate::world::WorldState;
use log::debug;
use macroquad::prelude::{is_key_down, KeyCode};
use shared::{Direction, MoveCommand, WALLS_LAYER};

/// Directional keys held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl DirectionalInput {
    pub fn only(direction: Direction) -> Self {
        let mut input = Self::default();
        match direction {
            Direction::Left => input.left = true,
            Direction::Right => input.right = true,
            Direction::Up => input.up = true,
            Direction::Down => input.down = true,
        }
        input
    }

    pub fn is_down(&self, direction: Direction) -> bool {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// Reads the cursor keys (and WASD) from the window.
    pub fn sample_keyboard() -> Self {
        Self {
            left: is_key_down(KeyCode::Left) || is_key_down(KeyCode::A),
            right: is_key_down(KeyCode::Right) || is_key_down(KeyCode::D),
            up: is_key_down(KeyCode::Up) || is_key_down(KeyCode::W),
            down: is_key_down(KeyCode::Down) || is_key_down(KeyCode::S),
        }
    }
}

/// Proposes at most one movement command at a time.
///
/// The gate never moves anything locally: the proposal is stored as the
/// world's pending command and sent, and the position only changes once the
/// server's round containing the move is reconciled.
#[derive(Debug, Clone)]
pub struct InputGate {
    collision_layer: String,
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new(WALLS_LAYER)
    }
}

impl InputGate {
    pub fn new(collision_layer: &str) -> Self {
        Self {
            collision_layer: collision_layer.to_string(),
        }
    }

    pub fn collision_layer(&self) -> &str {
        &self.collision_layer
    }

    /// Picks the first pressed, unblocked direction (left, right, up, down).
    ///
    /// Collisions are looked up in the world's map when one is attached, and
    /// through the render adapter otherwise.
    ///
    /// Returns `Ok(None)` for spectators, while a command is pending, or when
    /// nothing usable is pressed. A failed send leaves no pending command.
    pub fn poll(
        &self,
        world: &mut WorldState,
        input: DirectionalInput,
        render: &dyn RenderAdapter,
        sink: &mut dyn CommandSink,
    ) -> Result<Option<MoveCommand>, ClientError> {
        if world.is_spectator() || world.has_pending() {
            return Ok(None);
        }

        let origin = match world.local_player() {
            Some(player) => player.position(),
            None => {
                return Err(ClientError::UnknownEntity {
                    entity_id: world.local_player_id(),
                    round: world.round(),
                })
            }
        };

        let blocked = |x: i32, y: i32| match world.map() {
            Some(map) => map.has_tile(&self.collision_layer, x, y),
            None => render.has_tile(&self.collision_layer, x, y),
        };
        let direction = Direction::PRIORITY.into_iter().find(|dir| {
            let target = origin.step(*dir);
            input.is_down(*dir) && !blocked(target.x, target.y)
        });

        let Some(direction) = direction else {
            return Ok(None);
        };

        let cmd = MoveCommand::new(world.local_player_id(), direction);
        sink.send_command(&cmd)?;
        world.set_pending(cmd);
        debug!("Sent move {} for player {}", direction, cmd.player_id);

        Ok(Some(cmd))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::HeadlessRenderer;
    use shared::{PlayerInfo, Snapshot, TileMap, SPECTATOR_ID};
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<MoveCommand>,
        closed: bool,
    }

    impl CommandSink for RecordingSink {
        fn send_command(&mut self, cmd: &MoveCommand) -> Result<(), ClientError> {
            if self.closed {
                return Err(ClientError::TransportUnavailable);
            }
            self.sent.push(*cmd);
            Ok(())
        }
    }

    // Player 1 at (1, 1) with walls left of it and below it.
    fn walled_map() -> Arc<TileMap> {
        #[rustfmt::skip]
        let walls = vec![
            0, 0, 0,
            1, 0, 0,
            0, 1, 0,
        ];
        Arc::new(TileMap::new(3, 3, 20, 20).with_layer("walls", walls))
    }

    fn setup(local: i32) -> (WorldState, HeadlessRenderer) {
        let mut render = HeadlessRenderer::with_map(walled_map());
        let snapshot = Snapshot::new(0, vec![PlayerInfo::new(1, 1, 1)]);
        let world = WorldState::from_snapshot("map", 1, local, &snapshot, &mut render).unwrap();
        (world, render)
    }

    #[test]
    fn test_proposes_first_pressed_direction() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink::default();
        let gate = InputGate::default();

        let cmd = gate
            .poll(
                &mut world,
                DirectionalInput::only(Direction::Right),
                &render,
                &mut sink,
            )
            .unwrap();

        assert_eq!(cmd, Some(MoveCommand::new(1, Direction::Right)));
        assert_eq!(sink.sent, vec![MoveCommand::new(1, Direction::Right)]);
        assert_eq!(world.pending(), Some(&MoveCommand::new(1, Direction::Right)));
    }

    #[test]
    fn test_position_is_not_predicted() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink::default();
        InputGate::default()
            .poll(
                &mut world,
                DirectionalInput::only(Direction::Up),
                &render,
                &mut sink,
            )
            .unwrap();

        assert_eq!(world.local_player().unwrap().position().y, 1);
        assert!(render.shifts.is_empty());
    }

    #[test]
    fn test_blocked_direction_falls_through_to_next_priority() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink::default();
        let input = DirectionalInput {
            left: true,
            right: false,
            up: true,
            down: true,
        };

        let cmd = InputGate::default()
            .poll(&mut world, input, &render, &mut sink)
            .unwrap();
        assert_eq!(cmd, Some(MoveCommand::new(1, Direction::Up)));
    }

    #[test]
    fn test_left_wins_over_right() {
        let (mut world, _) = setup(1);
        let render = HeadlessRenderer::with_map(Arc::new(TileMap::new(3, 3, 20, 20)));
        let mut sink = RecordingSink::default();
        let input = DirectionalInput {
            left: true,
            right: true,
            up: true,
            down: true,
        };

        let cmd = InputGate::default()
            .poll(&mut world, input, &render, &mut sink)
            .unwrap();
        assert_eq!(cmd, Some(MoveCommand::new(1, Direction::Left)));
    }

    #[test]
    fn test_all_blocked_proposes_nothing() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink::default();
        let input = DirectionalInput {
            left: true,
            right: false,
            up: false,
            down: true,
        };

        let cmd = InputGate::default()
            .poll(&mut world, input, &render, &mut sink)
            .unwrap();
        assert_eq!(cmd, None);
        assert!(sink.sent.is_empty());
        assert!(!world.has_pending());
    }

    #[test]
    fn test_single_command_in_flight() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink::default();
        let gate = InputGate::default();
        let input = DirectionalInput::only(Direction::Right);

        assert!(gate.poll(&mut world, input, &render, &mut sink).unwrap().is_some());
        assert!(gate.poll(&mut world, input, &render, &mut sink).unwrap().is_none());
        assert_eq!(sink.sent.len(), 1);

        world.clear_pending();
        assert!(gate.poll(&mut world, input, &render, &mut sink).unwrap().is_some());
        assert_eq!(sink.sent.len(), 2);
    }

    #[test]
    fn test_spectator_never_proposes() {
        let (mut world, render) = setup(SPECTATOR_ID);
        let mut sink = RecordingSink::default();
        let input = DirectionalInput {
            left: true,
            right: true,
            up: true,
            down: true,
        };

        let cmd = InputGate::default()
            .poll(&mut world, input, &render, &mut sink)
            .unwrap();
        assert_eq!(cmd, None);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_failed_send_leaves_no_pending_command() {
        let (mut world, render) = setup(1);
        let mut sink = RecordingSink {
            closed: true,
            ..Default::default()
        };

        let result = InputGate::default().poll(
            &mut world,
            DirectionalInput::only(Direction::Right),
            &render,
            &mut sink,
        );
        assert!(matches!(result, Err(ClientError::TransportUnavailable)));
        assert!(!world.has_pending());
    }

    #[test]
    fn test_attached_map_takes_precedence_over_renderer() {
        let (mut world, _) = setup(1);
        world.attach_map(walled_map());
        let render = HeadlessRenderer::new();
        let mut sink = RecordingSink::default();
        let input = DirectionalInput {
            left: true,
            right: false,
            up: false,
            down: true,
        };

        let cmd = InputGate::default()
            .poll(&mut world, input, &render, &mut sink)
            .unwrap();
        assert_eq!(cmd, None);
        assert!(sink.sent.is_empty());
    }

    #[test]
    fn test_custom_collision_layer() {
        let (mut world, _) = setup(1);
        let map = TileMap::new(3, 3, 20, 20).with_layer("fences", vec![0, 0, 0, 0, 0, 1, 0, 0, 0]);
        let render = HeadlessRenderer::with_map(Arc::new(map));
        let mut sink = RecordingSink::default();

        let cmd = InputGate::new("fences")
            .poll(
                &mut world,
                DirectionalInput::only(Direction::Right),
                &render,
                &mut sink,
            )
            .unwrap();
        assert_eq!(cmd, None);
    }
}
