use serde::{Deserialize, Serialize};

/// A player row as stored in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Steam id, the player's identity
    pub steam_id: String,

    /// Display name captured at ingestion time
    pub cached_display_name: Option<String>,

    /// Aggregate ranking metric (`score_sum` or `evaluation`, depending on the snapshot)
    pub metric: Option<i64>,
}

/// A player together with its placement in the global player ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub placement: i64,
    pub steam_id: String,
    pub cached_display_name: Option<String>,
    pub metric: Option<i64>,
}

impl RankedPlayer {
    pub fn player(&self) -> Player {
        Player {
            steam_id: self.steam_id.clone(),
            cached_display_name: self.cached_display_name.clone(),
            metric: self.metric,
        }
    }
}

impl Player {
    /// Name to show in page headers, falling back to the steam id.
    pub fn display_name(&self) -> &str {
        self.cached_display_name.as_deref().unwrap_or(&self.steam_id)
    }
}
