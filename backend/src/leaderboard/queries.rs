//! SQL for every ranked read, composed once from the configured
//! [`RankingEngine`] and reused for the life of the process.
//!
//! Bind order is fixed per statement and documented on each field. Window
//! bounds are inclusive on both ends.

use crate::ranking::RankingEngine;

#[derive(Debug, Clone)]
pub struct LeaderboardQueries {
    /// `?1` lo, `?2` hi
    pub players_window: String,
    /// `?1` steam_id
    pub player_placement: String,
    /// `?1` lo, `?2` hi
    pub levels_window: String,
    /// `?1` level_id, `?2` lo, `?3` hi
    pub level_leaderboard_window: String,
    /// `?1` level_id, `?2` steam_id
    pub level_entry: String,
    /// `?1` steam_id, `?2` lo, `?3` hi
    pub player_leaderboard_window: String,
    /// `?1` level_id
    pub level_details: String,
    /// `?1` steam_id
    pub player_details: String,
}

impl LeaderboardQueries {
    pub fn new(engine: &RankingEngine) -> Self {
        let schema = engine.schema();
        let metric = &schema.player_metric;
        let score = &schema.entry_score;
        let difficulty = engine.difficulty_expr();

        let placement_players = format!(
            "WITH placement_players AS (\
                SELECT {rank} AS placement, players.steam_id AS steam_id, \
                players.cached_display_name AS cached_display_name, players.{metric} AS metric \
                FROM players\
            ) ",
            rank = engine.players().rank_expr(),
            metric = metric,
        );

        let players_window = format!(
            "{}SELECT placement, steam_id, cached_display_name, metric FROM placement_players \
             WHERE placement >= ?1 AND placement <= ?2 ORDER BY placement ASC",
            placement_players
        );

        let player_placement = format!(
            "{}SELECT placement, steam_id, cached_display_name, metric FROM placement_players \
             WHERE steam_id = ?1",
            placement_players
        );

        let levels_window = format!(
            "WITH levels_difficulty AS (\
                SELECT level_id, cached_display_name, score_count, {difficulty} AS difficulty FROM levels\
            ), levels_ranked AS (\
                SELECT {rank} AS placement, level_id, cached_display_name, score_count, difficulty \
                FROM levels_difficulty\
            ) \
            SELECT placement, level_id, cached_display_name, score_count, \
            CAST(difficulty AS INTEGER) AS difficulty FROM levels_ranked \
            WHERE placement >= ?1 AND placement <= ?2 ORDER BY placement ASC",
            difficulty = difficulty,
            rank = engine.levels().rank_expr(),
        );

        let entry_columns = format!(
            "SELECT steam_leaderboard.level_id AS level_id, steam_leaderboard.steam_id AS steam_id, \
             steam_leaderboard.{placement} AS placement, steam_leaderboard.{score} AS score, \
             (SELECT players.cached_display_name FROM players \
              WHERE players.steam_id = steam_leaderboard.steam_id) AS cached_display_name \
             FROM steam_leaderboard",
            placement = engine.level_leaderboard().rank_expr(),
            score = score,
        );

        let level_leaderboard_window = format!(
            "{} WHERE steam_leaderboard.level_id = ?1 \
             AND steam_leaderboard.placement >= ?2 AND steam_leaderboard.placement <= ?3 \
             ORDER BY steam_leaderboard.placement ASC, steam_leaderboard.steam_id ASC",
            entry_columns
        );

        let level_entry = format!(
            "{} WHERE steam_leaderboard.level_id = ?1 AND steam_leaderboard.steam_id = ?2",
            entry_columns
        );

        let player_leaderboard_window = format!(
            "WITH levels_player AS (\
                SELECT {rank} AS row_num, steam_leaderboard.level_id AS level_id, \
                steam_leaderboard.steam_id AS steam_id, steam_leaderboard.placement AS placement, \
                steam_leaderboard.{score} AS score, \
                (SELECT levels.cached_display_name FROM levels \
                 WHERE levels.level_id = steam_leaderboard.level_id) AS cached_display_name \
                FROM steam_leaderboard WHERE steam_leaderboard.steam_id = ?1\
            ) \
            SELECT row_num, level_id, steam_id, placement, score, cached_display_name FROM levels_player \
            WHERE row_num >= ?2 AND row_num <= ?3 ORDER BY row_num ASC",
            rank = engine.player_leaderboard().rank_expr(),
            score = score,
        );

        let level_details = format!(
            "SELECT level_id, cached_display_name, score_count, \
             CAST({difficulty} AS INTEGER) AS difficulty FROM levels WHERE level_id = ?1",
            difficulty = difficulty,
        );

        let player_details = format!(
            "SELECT steam_id, cached_display_name, {metric} AS metric FROM players WHERE steam_id = ?1",
            metric = metric,
        );

        Self {
            players_window,
            player_placement,
            levels_window,
            level_leaderboard_window,
            level_entry,
            player_leaderboard_window,
            level_details,
            player_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::{RankingSchema, SnapshotGeneration};

    fn queries(generation: SnapshotGeneration) -> LeaderboardQueries {
        LeaderboardQueries::new(&RankingEngine::new(RankingSchema::for_generation(generation)))
    }

    fn statements(q: &LeaderboardQueries) -> [&str; 8] {
        [
            &q.players_window,
            &q.player_placement,
            &q.levels_window,
            &q.level_leaderboard_window,
            &q.level_entry,
            &q.player_leaderboard_window,
            &q.level_details,
            &q.player_details,
        ]
    }

    #[test]
    fn test_every_statement_is_a_read() {
        for generation in [SnapshotGeneration::Legacy, SnapshotGeneration::Current] {
            let q = queries(generation);
            for sql in statements(&q) {
                let head = sql.trim_start().to_ascii_uppercase();
                assert!(head.starts_with("SELECT ") || head.starts_with("WITH "), "{}", sql);
            }
        }
    }

    #[test]
    fn test_legacy_levels_use_weighted_difficulty() {
        let q = queries(SnapshotGeneration::Legacy);
        assert!(q
            .levels_window
            .contains("(score_sum/score_count)*min(score_count, 30) AS difficulty"));
        assert!(q.players_window.contains("ORDER BY players.score_sum DESC"));
    }

    #[test]
    fn test_current_levels_use_evaluation() {
        let q = queries(SnapshotGeneration::Current);
        assert!(q.levels_window.contains("evaluation AS difficulty"));
        assert!(q.player_details.contains("evaluation AS metric"));
        assert!(q
            .player_leaderboard_window
            .contains("ORDER BY steam_leaderboard.evaluation DESC"));
    }

    #[test]
    fn test_windows_are_inclusive() {
        let q = queries(SnapshotGeneration::Current);
        assert!(q.players_window.contains("placement >= ?1 AND placement <= ?2"));
        assert!(q.player_leaderboard_window.contains("row_num >= ?2 AND row_num <= ?3"));
    }

    #[test]
    fn test_leaderboards_look_up_names_live() {
        let q = queries(SnapshotGeneration::Current);
        assert!(q
            .level_leaderboard_window
            .contains("WHERE players.steam_id = steam_leaderboard.steam_id"));
        assert!(q
            .player_leaderboard_window
            .contains("WHERE levels.level_id = steam_leaderboard.level_id"));
    }
}
