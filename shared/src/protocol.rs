//! JSON message bodies exchanged with the game over the event bus.

use crate::{Direction, PlayerId, RoundId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Player roster entry as carried by snapshots and `newp` actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub x: i32,
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PlayerInfo {
    pub fn new(player_id: PlayerId, x: i32, y: i32) -> Self {
        Self {
            player_id,
            x,
            y,
            name: None,
        }
    }
}

/// Roster changes carried in an update's `actions` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum StructuralAction {
    #[serde(rename = "newp")]
    NewPlayer { player: PlayerInfo },
    /// Any action this client does not understand.
    #[serde(other)]
    Unknown,
}

/// A confirmed one-cell move of a single player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAction {
    pub player_id: PlayerId,
    pub mov: Direction,
}

/// One server round: structural actions first, then moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub round_id: RoundId,
    #[serde(default)]
    pub actions: Vec<StructuralAction>,
    #[serde(default)]
    pub players: Vec<MoveAction>,
}

impl InboundEvent {
    pub fn new(round_id: RoundId) -> Self {
        Self {
            round_id,
            actions: Vec::new(),
            players: Vec::new(),
        }
    }

    pub fn with_join(mut self, player: PlayerInfo) -> Self {
        self.actions.push(StructuralAction::NewPlayer { player });
        self
    }

    pub fn with_move(mut self, player_id: PlayerId, mov: Direction) -> Self {
        self.players.push(MoveAction { player_id, mov });
        self
    }
}

/// Full roster used to bootstrap a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub round_id: RoundId,
    pub players: Vec<PlayerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nr_players: Option<u32>,
}

impl Snapshot {
    pub const TYPE: &'static str = "snapshot";

    pub fn new(round_id: RoundId, players: Vec<PlayerInfo>) -> Self {
        Self {
            round_id,
            players,
            game_id: None,
            nr_players: None,
        }
    }

    /// JSON body including the `type` marker used on push addresses.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), Value::String(Self::TYPE.to_string()));
        }
        Ok(value)
    }
}

/// A message pushed to a browser address: either a roster snapshot or a round update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPush {
    Snapshot(Snapshot),
    Update(InboundEvent),
}

impl ServerPush {
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let is_snapshot = value.get("type").and_then(Value::as_str) == Some(Snapshot::TYPE);
        if is_snapshot {
            serde_json::from_value(value).map(ServerPush::Snapshot)
        } else {
            serde_json::from_value(value).map(ServerPush::Update)
        }
    }
}

/// Movement proposal sent by the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommand {
    pub player_id: PlayerId,
    pub mov: Direction,
}

impl MoveCommand {
    pub fn new(player_id: PlayerId, mov: Direction) -> Self {
        Self { player_id, mov }
    }
}

/// Requests accepted on a game's `game.<id>` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum GameRequest {
    #[serde(rename = "mov")]
    Move(MoveCommand),
    #[serde(rename = "snp")]
    Snapshot,
    #[serde(rename = "reg")]
    Register { name: String },
}

impl From<MoveCommand> for GameRequest {
    fn from(cmd: MoveCommand) -> Self {
        GameRequest::Move(cmd)
    }
}

/// Body for `replay.register.<game>`: start the replay at a stored snapshot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRegister {
    pub index: u32,
}

/// Body for `replay.start.<game>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayStart {
    pub id: PlayerId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_event_decoding() {
        let value = json!({
            "round_id": 6,
            "actions": [
                {"action": "newp", "player": {"player_id": 2, "x": 0, "y": 0, "name": "bob"}}
            ],
            "players": [
                {"player_id": 1, "mov": "r"},
                {"player_id": 2, "mov": "d"}
            ]
        });

        let event: InboundEvent = serde_json::from_value(value).unwrap();
        assert_eq!(event.round_id, 6);
        assert_eq!(event.actions.len(), 1);
        match &event.actions[0] {
            StructuralAction::NewPlayer { player } => {
                assert_eq!(player.player_id, 2);
                assert_eq!(player.name.as_deref(), Some("bob"));
            }
            other => panic!("Unexpected action {:?}", other),
        }
        assert_eq!(
            event.players,
            vec![
                MoveAction {
                    player_id: 1,
                    mov: Direction::Right
                },
                MoveAction {
                    player_id: 2,
                    mov: Direction::Down
                },
            ]
        );
    }

    #[test]
    fn test_update_event_missing_lists_default_to_empty() {
        let event: InboundEvent = serde_json::from_value(json!({"round_id": 3})).unwrap();
        assert!(event.actions.is_empty());
        assert!(event.players.is_empty());
    }

    #[test]
    fn test_unknown_structural_action_is_tolerated() {
        let event: InboundEvent = serde_json::from_value(json!({
            "round_id": 9,
            "actions": [{"action": "delp", "player_id": 4}],
            "players": []
        }))
        .unwrap();
        assert_eq!(event.actions, vec![StructuralAction::Unknown]);
    }

    #[test]
    fn test_invalid_move_direction_is_rejected() {
        let result = serde_json::from_value::<InboundEvent>(json!({
            "round_id": 1,
            "actions": [],
            "players": [{"player_id": 1, "mov": "x"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_push_discrimination() {
        let snapshot = json!({
            "type": "snapshot",
            "round_id": 5,
            "game_id": "1",
            "nr_players": 4,
            "players": [{"player_id": 1, "x": 2, "y": 3, "name": "alice"}]
        });
        match ServerPush::from_value(snapshot).unwrap() {
            ServerPush::Snapshot(s) => {
                assert_eq!(s.round_id, 5);
                assert_eq!(s.nr_players, Some(4));
                assert_eq!(s.players[0].x, 2);
            }
            other => panic!("Expected snapshot, got {:?}", other),
        }

        let update = json!({"round_id": 6, "actions": [], "players": []});
        assert!(matches!(
            ServerPush::from_value(update).unwrap(),
            ServerPush::Update(InboundEvent { round_id: 6, .. })
        ));
    }

    #[test]
    fn test_snapshot_value_carries_type_marker() {
        let snapshot = Snapshot::new(2, vec![PlayerInfo::new(0, 3, 5)]);
        let value = snapshot.to_value().unwrap();
        assert_eq!(value["type"], "snapshot");
        assert_eq!(value["round_id"], 2);
        assert_eq!(
            ServerPush::from_value(value).unwrap(),
            ServerPush::Snapshot(snapshot)
        );
    }

    #[test]
    fn test_move_command_wire_shape() {
        let request = GameRequest::from(MoveCommand::new(1, Direction::Left));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "mov", "player_id": 1, "mov": "l"})
        );
    }

    #[test]
    fn test_game_request_shapes() {
        assert_eq!(
            serde_json::to_value(GameRequest::Snapshot).unwrap(),
            json!({"action": "snp"})
        );
        assert_eq!(
            serde_json::to_value(GameRequest::Register {
                name: "alice".to_string()
            })
            .unwrap(),
            json!({"action": "reg", "name": "alice"})
        );
        assert_eq!(
            serde_json::to_value(ReplayRegister { index: 2 }).unwrap(),
            json!({"index": 2})
        );
        assert_eq!(
            serde_json::to_value(ReplayStart { id: 7 }).unwrap(),
            json!({"id": 7})
        );
    }
}
