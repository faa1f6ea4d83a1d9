use serde::{Deserialize, Serialize};

/// One row of a level's leaderboard. `placement` is assigned at ingestion
/// and read back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub level_id: String,
    pub steam_id: String,
    pub placement: i64,
    /// Raw time in milliseconds
    pub score: i64,
    /// Current name of the player, looked up when the row was read
    pub cached_display_name: Option<String>,
}

/// One of a player's own leaderboard entries, numbered within that player's
/// history at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScoreEntry {
    pub row_num: i64,
    pub level_id: String,
    pub steam_id: String,
    pub placement: i64,
    /// Raw time in milliseconds
    pub score: i64,
    /// Current name of the level, looked up when the row was read
    pub cached_display_name: Option<String>,
}
