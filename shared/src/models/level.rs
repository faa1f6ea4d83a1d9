use serde::{Deserialize, Serialize};

/// A level row as stored in the snapshot, with its derived difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Leaderboard name, the level's identity
    pub level_id: String,

    /// Workshop title captured at ingestion time
    pub cached_display_name: Option<String>,

    /// Number of recorded leaderboard entries
    pub score_count: Option<i64>,

    /// Difficulty as computed by the configured strategy; `None` when the
    /// strategy has nothing to divide by
    pub difficulty: Option<i64>,
}

/// A level together with its placement in the difficulty ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedLevel {
    pub placement: i64,
    pub level_id: String,
    pub cached_display_name: Option<String>,
    pub score_count: Option<i64>,
    pub difficulty: Option<i64>,
}

impl Level {
    /// Name to show in page headers, falling back to the level id.
    pub fn display_name(&self) -> &str {
        self.cached_display_name.as_deref().unwrap_or(&self.level_id)
    }
}
