use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure modes of the ranked-pagination layer.
///
/// `NotFound` is an ordinary outcome of a detail lookup, not a fault.
/// Storage messages are carried through verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderboardError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage error: {0}")]
    StorageFault(String),
}

impl LeaderboardError {
    pub fn level_not_found(level_id: &str) -> Self {
        Self::NotFound(format!("level {}", level_id))
    }

    pub fn player_not_found(steam_id: &str) -> Self {
        Self::NotFound(format!("player {}", steam_id))
    }

    pub fn entry_not_found(level_id: &str, steam_id: &str) -> Self {
        Self::NotFound(format!("entry for player {} on level {}", steam_id, level_id))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, LeaderboardError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        assert_eq!(
            LeaderboardError::InvalidWindow("start 'abc' is not a number".to_string()).to_string(),
            "Invalid window: start 'abc' is not a number"
        );
        assert_eq!(
            LeaderboardError::level_not_found("lvl_1").to_string(),
            "Not found: level lvl_1"
        );
        assert_eq!(
            LeaderboardError::StorageFault("disk I/O error".to_string()).to_string(),
            "Storage error: disk I/O error"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(LeaderboardError::player_not_found("7656").is_not_found());
        assert!(!LeaderboardError::StorageUnavailable("missing".into()).is_not_found());
    }

    #[test]
    fn test_error_serialization_is_tagged_by_variant() {
        let json = serde_json::to_string(&LeaderboardError::NotFound("level x".into())).unwrap();
        assert_eq!(json, r#"{"NotFound":"level x"}"#);
    }
}
