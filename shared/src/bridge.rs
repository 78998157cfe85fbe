//! Frames of the event bus bridge protocol.
//!
//! Every frame is a JSON object discriminated by its `type` field. The client
//! sends `send`, `publish`, `register`, `unregister` and `ping` frames; the bridge
//! answers with `message`, `err` and `pong`. Replies to a `send` arrive as a
//! `message` addressed to the `replyAddress` chosen by the sender.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeFrame {
    Send {
        address: String,
        body: Value,
        #[serde(
            rename = "replyAddress",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        reply_address: Option<String>,
    },
    Publish {
        address: String,
        body: Value,
    },
    Register {
        address: String,
    },
    Unregister {
        address: String,
    },
    Ping,
    Pong,
    Message {
        address: String,
        #[serde(default)]
        body: Value,
        #[serde(
            rename = "replyAddress",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        reply_address: Option<String>,
    },
    Err {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        #[serde(
            rename = "failureCode",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        failure_code: Option<i32>,
        #[serde(
            rename = "failureType",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        failure_type: Option<String>,
        #[serde(default)]
        message: String,
    },
}

impl BridgeFrame {
    pub fn send(address: impl Into<String>, body: Value) -> Self {
        BridgeFrame::Send {
            address: address.into(),
            body,
            reply_address: None,
        }
    }

    pub fn request(address: impl Into<String>, body: Value, reply: impl Into<String>) -> Self {
        BridgeFrame::Send {
            address: address.into(),
            body,
            reply_address: Some(reply.into()),
        }
    }

    pub fn register(address: impl Into<String>) -> Self {
        BridgeFrame::Register {
            address: address.into(),
        }
    }

    pub fn message(address: impl Into<String>, body: Value) -> Self {
        BridgeFrame::Message {
            address: address.into(),
            body,
            reply_address: None,
        }
    }

    /// Address the frame is delivered to, if it has one.
    pub fn address(&self) -> Option<&str> {
        match self {
            BridgeFrame::Send { address, .. }
            | BridgeFrame::Publish { address, .. }
            | BridgeFrame::Register { address }
            | BridgeFrame::Unregister { address }
            | BridgeFrame::Message { address, .. } => Some(address),
            BridgeFrame::Err { address, .. } => address.as_deref(),
            BridgeFrame::Ping | BridgeFrame::Pong => None,
        }
    }
}

/// Failure codes the game services attach to failed replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCode {
    UnableToDeployGame,
    UnableToDeleteMissingGame,
    UnableToUndeployGame,
    GameDoesNotExist,
    GameFull,
    MissingParameter,
}

impl FailureCode {
    pub fn code(self) -> i32 {
        match self {
            FailureCode::UnableToDeployGame => 0,
            FailureCode::UnableToDeleteMissingGame => 1,
            FailureCode::UnableToUndeployGame => 2,
            FailureCode::GameDoesNotExist => 3,
            FailureCode::GameFull => 4,
            FailureCode::MissingParameter => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(FailureCode::UnableToDeployGame),
            1 => Some(FailureCode::UnableToDeleteMissingGame),
            2 => Some(FailureCode::UnableToUndeployGame),
            3 => Some(FailureCode::GameDoesNotExist),
            4 => Some(FailureCode::GameFull),
            5 => Some(FailureCode::MissingParameter),
            _ => None,
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureCode::UnableToDeployGame => "unable to deploy game",
            FailureCode::UnableToDeleteMissingGame => "unable to delete non-existing game",
            FailureCode::UnableToUndeployGame => "unable to undeploy game",
            FailureCode::GameDoesNotExist => "game does not exist",
            FailureCode::GameFull => "game is full",
            FailureCode::MissingParameter => "missing parameter",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_frame_shape() {
        let frame = BridgeFrame::request("game.1", json!({"action": "snp"}), "reply.1");
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({
                "type": "send",
                "address": "game.1",
                "body": {"action": "snp"},
                "replyAddress": "reply.1"
            })
        );
    }

    #[test]
    fn test_plain_send_omits_reply_address() {
        let frame = BridgeFrame::send("game.1", json!({"action": "mov"}));
        let value = serde_json::to_value(&frame).unwrap();
        assert!(value.get("replyAddress").is_none());
    }

    #[test]
    fn test_register_and_ping_frames() {
        assert_eq!(
            serde_json::to_value(BridgeFrame::register("browser.game.1")).unwrap(),
            json!({"type": "register", "address": "browser.game.1"})
        );
        assert_eq!(
            serde_json::to_value(BridgeFrame::Ping).unwrap(),
            json!({"type": "ping"})
        );
    }

    #[test]
    fn test_incoming_message_ignores_extra_fields() {
        let frame: BridgeFrame = serde_json::from_value(json!({
            "type": "message",
            "address": "browser.game.1",
            "headers": {},
            "send": false,
            "body": {"round_id": 1}
        }))
        .unwrap();
        assert_eq!(frame.address(), Some("browser.game.1"));
        match frame {
            BridgeFrame::Message { body, .. } => assert_eq!(body["round_id"], 1),
            other => panic!("Unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_incoming_failure_frame() {
        let frame: BridgeFrame = serde_json::from_value(json!({
            "type": "err",
            "address": "reply.3",
            "failureCode": 4,
            "failureType": "RECIPIENT_FAILURE",
            "message": "Game is full!"
        }))
        .unwrap();
        match frame {
            BridgeFrame::Err {
                address,
                failure_code,
                message,
                ..
            } => {
                assert_eq!(address.as_deref(), Some("reply.3"));
                assert_eq!(failure_code.and_then(FailureCode::from_code), Some(FailureCode::GameFull));
                assert_eq!(message, "Game is full!");
            }
            other => panic!("Unexpected frame {:?}", other),
        }
    }

    #[test]
    fn test_failure_codes_roundtrip_through_integers() {
        for code in 0..6 {
            let failure = FailureCode::from_code(code).unwrap();
            assert_eq!(failure.code(), code);
        }
        assert_eq!(FailureCode::from_code(42), None);
    }
}
