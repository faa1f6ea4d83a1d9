use std::sync::Arc;

use shared::models::leaderboard::{LeaderboardEntry, PlayerScoreEntry};
use shared::models::level::{Level, RankedLevel};
use shared::models::player::{Player, RankedPlayer};
use shared::{LeaderboardError, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::leaderboard::queries::LeaderboardQueries;
use crate::ranking::RankingEngine;
use crate::store::{map_storage_error, Store};
use crate::window::Window;

/// Read access to the ranked collections of a snapshot.
///
/// Every method is a pure function of its arguments and the snapshot
/// contents. There are no write methods.
#[async_trait::async_trait]
pub trait LeaderboardRepository: Send + Sync {
    async fn list_players(&self, window: &Window) -> Result<Vec<RankedPlayer>>;
    async fn list_levels(&self, window: &Window) -> Result<Vec<RankedLevel>>;
    async fn list_level_leaderboard(&self, level_id: &str, window: &Window) -> Result<Vec<LeaderboardEntry>>;
    async fn list_player_leaderboard(&self, steam_id: &str, window: &Window) -> Result<Vec<PlayerScoreEntry>>;
    async fn get_level(&self, level_id: &str) -> Result<Level>;
    async fn get_player(&self, steam_id: &str) -> Result<Player>;
    async fn find_player_placement(&self, steam_id: &str) -> Result<RankedPlayer>;
    async fn find_level_entry(&self, level_id: &str, steam_id: &str) -> Result<LeaderboardEntry>;
}

#[derive(Clone)]
pub struct SqliteLeaderboardRepository {
    store: Store,
    queries: Arc<LeaderboardQueries>,
}

impl SqliteLeaderboardRepository {
    pub fn new(store: Store, engine: &RankingEngine) -> Self {
        Self {
            store,
            queries: Arc::new(LeaderboardQueries::new(engine)),
        }
    }
}

fn ranked_player(row: &SqliteRow) -> Result<RankedPlayer> {
    Ok(RankedPlayer {
        placement: row.try_get("placement").map_err(map_storage_error)?,
        steam_id: row.try_get("steam_id").map_err(map_storage_error)?,
        cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
        metric: row.try_get("metric").map_err(map_storage_error)?,
    })
}

fn ranked_level(row: &SqliteRow) -> Result<RankedLevel> {
    Ok(RankedLevel {
        placement: row.try_get("placement").map_err(map_storage_error)?,
        level_id: row.try_get("level_id").map_err(map_storage_error)?,
        cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
        score_count: row.try_get("score_count").map_err(map_storage_error)?,
        difficulty: row.try_get("difficulty").map_err(map_storage_error)?,
    })
}

fn leaderboard_entry(row: &SqliteRow) -> Result<LeaderboardEntry> {
    Ok(LeaderboardEntry {
        level_id: row.try_get("level_id").map_err(map_storage_error)?,
        steam_id: row.try_get("steam_id").map_err(map_storage_error)?,
        placement: row.try_get("placement").map_err(map_storage_error)?,
        score: row.try_get("score").map_err(map_storage_error)?,
        cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
    })
}

fn player_score_entry(row: &SqliteRow) -> Result<PlayerScoreEntry> {
    Ok(PlayerScoreEntry {
        row_num: row.try_get("row_num").map_err(map_storage_error)?,
        level_id: row.try_get("level_id").map_err(map_storage_error)?,
        steam_id: row.try_get("steam_id").map_err(map_storage_error)?,
        placement: row.try_get("placement").map_err(map_storage_error)?,
        score: row.try_get("score").map_err(map_storage_error)?,
        cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
    })
}

#[async_trait::async_trait]
impl LeaderboardRepository for SqliteLeaderboardRepository {
    async fn list_players(&self, window: &Window) -> Result<Vec<RankedPlayer>> {
        let rows = sqlx::query(&self.queries.players_window)
            .bind(window.lo)
            .bind(window.hi)
            .fetch_all(self.store.pool())
            .await
            .map_err(map_storage_error)?;
        rows.iter().map(ranked_player).collect()
    }

    async fn list_levels(&self, window: &Window) -> Result<Vec<RankedLevel>> {
        let rows = sqlx::query(&self.queries.levels_window)
            .bind(window.lo)
            .bind(window.hi)
            .fetch_all(self.store.pool())
            .await
            .map_err(map_storage_error)?;
        rows.iter().map(ranked_level).collect()
    }

    async fn list_level_leaderboard(&self, level_id: &str, window: &Window) -> Result<Vec<LeaderboardEntry>> {
        let rows = sqlx::query(&self.queries.level_leaderboard_window)
            .bind(level_id)
            .bind(window.lo)
            .bind(window.hi)
            .fetch_all(self.store.pool())
            .await
            .map_err(map_storage_error)?;
        rows.iter().map(leaderboard_entry).collect()
    }

    async fn list_player_leaderboard(&self, steam_id: &str, window: &Window) -> Result<Vec<PlayerScoreEntry>> {
        let rows = sqlx::query(&self.queries.player_leaderboard_window)
            .bind(steam_id)
            .bind(window.lo)
            .bind(window.hi)
            .fetch_all(self.store.pool())
            .await
            .map_err(map_storage_error)?;
        rows.iter().map(player_score_entry).collect()
    }

    async fn get_level(&self, level_id: &str) -> Result<Level> {
        let row = sqlx::query(&self.queries.level_details)
            .bind(level_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| LeaderboardError::level_not_found(level_id))?;

        Ok(Level {
            level_id: row.try_get("level_id").map_err(map_storage_error)?,
            cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
            score_count: row.try_get("score_count").map_err(map_storage_error)?,
            difficulty: row.try_get("difficulty").map_err(map_storage_error)?,
        })
    }

    async fn get_player(&self, steam_id: &str) -> Result<Player> {
        let row = sqlx::query(&self.queries.player_details)
            .bind(steam_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| LeaderboardError::player_not_found(steam_id))?;

        Ok(Player {
            steam_id: row.try_get("steam_id").map_err(map_storage_error)?,
            cached_display_name: row.try_get("cached_display_name").map_err(map_storage_error)?,
            metric: row.try_get("metric").map_err(map_storage_error)?,
        })
    }

    async fn find_player_placement(&self, steam_id: &str) -> Result<RankedPlayer> {
        let row = sqlx::query(&self.queries.player_placement)
            .bind(steam_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| LeaderboardError::player_not_found(steam_id))?;
        ranked_player(&row)
    }

    async fn find_level_entry(&self, level_id: &str, steam_id: &str) -> Result<LeaderboardEntry> {
        let row = sqlx::query(&self.queries.level_entry)
            .bind(level_id)
            .bind(steam_id)
            .fetch_optional(self.store.pool())
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| LeaderboardError::entry_not_found(level_id, steam_id))?;
        leaderboard_entry(&row)
    }
}
