use crate::models::leaderboard::{LeaderboardEntry, PlayerScoreEntry};
use crate::score_format::format_stored_score;
use serde::{Deserialize, Serialize};

/// A level leaderboard row ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelScoreDto {
    pub placement: i64,
    pub steam_id: String,
    pub display_name: Option<String>,
    /// Raw time in milliseconds
    pub score: i64,
    /// `score` as `M:SS.mmm`
    pub time: Option<String>,
}

impl From<LeaderboardEntry> for LevelScoreDto {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            placement: entry.placement,
            steam_id: entry.steam_id,
            display_name: entry.cached_display_name,
            time: format_stored_score(entry.score),
            score: entry.score,
        }
    }
}

/// A row of a player's own score table ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScoreDto {
    pub row_num: i64,
    pub level_id: String,
    pub level_name: Option<String>,
    /// Placement of the player on that level's leaderboard
    pub placement: i64,
    /// Raw time in milliseconds
    pub score: i64,
    /// `score` as `M:SS.mmm`
    pub time: Option<String>,
}

impl From<PlayerScoreEntry> for PlayerScoreDto {
    fn from(entry: PlayerScoreEntry) -> Self {
        Self {
            row_num: entry.row_num,
            level_id: entry.level_id,
            level_name: entry.cached_display_name,
            placement: entry.placement,
            time: format_stored_score(entry.score),
            score: entry.score,
        }
    }
}
