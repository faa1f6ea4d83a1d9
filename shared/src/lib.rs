pub mod models {
    pub mod leaderboard;
    pub mod level;
    pub mod player;
}

pub mod dto {
    pub mod leaderboard;
    pub mod page;
}

pub mod error;
pub mod score_format;

// Re-export commonly used items
pub use error::{LeaderboardError, Result};
pub use score_format::{format_score, format_stored_score};

// Re-export models
pub use models::{
    leaderboard::{LeaderboardEntry, PlayerScoreEntry},
    level::{Level, RankedLevel},
    player::{Player, RankedPlayer},
};

// Re-export DTOs
pub use dto::{
    leaderboard::{LevelScoreDto, PlayerScoreDto},
    page::{PageDto, PageQuery, MAX_REQUESTED_COUNT},
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_player_display_name_falls_back_to_id() {
        let player = Player {
            steam_id: "76561198000000001".to_string(),
            cached_display_name: None,
            metric: Some(10),
        };
        assert_eq!(player.display_name(), "76561198000000001");
    }

    #[test]
    fn test_level_display_name() {
        let level = Level {
            level_id: "Lost Fortress_1_stable".to_string(),
            cached_display_name: Some("Lost Fortress".to_string()),
            score_count: Some(40),
            difficulty: Some(1200),
        };
        assert_eq!(level.display_name(), "Lost Fortress");
    }

    #[test]
    fn test_ranked_player_strips_placement() {
        let ranked = RankedPlayer {
            placement: 4,
            steam_id: "42".to_string(),
            cached_display_name: Some("Ada".to_string()),
            metric: Some(77),
        };
        let player = ranked.player();
        assert_eq!(player.steam_id, "42");
        assert_eq!(player.metric, Some(77));
    }
}
