use shared::{FailureCode, PlayerId, RoundId};

/// Errors surfaced by the client core and its transport.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A move or lookup named an entity this client has never seen join.
    #[error("unknown entity {entity_id} referenced in round {round}")]
    UnknownEntity { entity_id: PlayerId, round: RoundId },

    /// The bus connection is not established or has gone away.
    #[error("transport unavailable")]
    TransportUnavailable,

    /// The bus answered a request with a failure.
    #[error("bus failure {code:?}: {message}")]
    Bus { code: Option<i32>, message: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("map error: {0}")]
    Map(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Known failure code of a bus failure, if any.
    pub fn failure_code(&self) -> Option<FailureCode> {
        match self {
            ClientError::Bus { code, .. } => code.and_then(FailureCode::from_code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_entity_message() {
        let err = ClientError::UnknownEntity {
            entity_id: 2,
            round: 8,
        };
        assert_eq!(err.to_string(), "unknown entity 2 referenced in round 8");
    }

    #[test]
    fn test_failure_code_lookup() {
        let err = ClientError::Bus {
            code: Some(4),
            message: "Game is full!".to_string(),
        };
        assert_eq!(err.failure_code(), Some(FailureCode::GameFull));
        assert_eq!(ClientError::TransportUnavailable.failure_code(), None);
    }
}
