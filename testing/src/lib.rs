//! Snapshot fixtures for leaderboard tests
//!
//! The backend only ever opens its database read-only, so tests need
//! something that plays the ingestion process: [`SnapshotBuilder`] writes a
//! fresh SQLite file with the snapshot schema and the rows a test asks for,
//! and the resulting [`SnapshotFixture`] deletes the file again when dropped.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

/// Schema of a snapshot, covering the columns of both the legacy
/// (`score_sum`) and current (`evaluation`) generations.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS players (
        steam_id TEXT NOT NULL PRIMARY KEY,
        score_count INTEGER NOT NULL DEFAULT 0,
        score_sum INTEGER NOT NULL DEFAULT 0,
        evaluation_sum INTEGER NOT NULL DEFAULT 0,
        evaluation INTEGER NOT NULL DEFAULT 0,
        cached_display_name TEXT
    ) WITHOUT ROWID
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS levels (
        level_id TEXT NOT NULL PRIMARY KEY,
        score_count INTEGER NOT NULL DEFAULT 0,
        score_sum INTEGER NOT NULL DEFAULT 0,
        evaluation_sum INTEGER NOT NULL DEFAULT 0,
        evaluation INTEGER DEFAULT 0,
        file_id TEXT,
        cached_display_name TEXT
    ) WITHOUT ROWID
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS steam_leaderboard (
        level_id TEXT NOT NULL,
        steam_id TEXT NOT NULL,
        score INTEGER NOT NULL,
        placement INTEGER NOT NULL DEFAULT 0,
        evaluation INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY(level_id, steam_id)
    ) WITHOUT ROWID
    "#,
    "CREATE INDEX IF NOT EXISTS index_steam_leaderboard_placement ON steam_leaderboard(level_id, placement)",
    "CREATE INDEX IF NOT EXISTS index_players_evaluation ON players(evaluation)",
];

#[derive(Debug, Clone, Default)]
pub struct PlayerSeed {
    pub steam_id: String,
    pub cached_display_name: Option<String>,
    pub score_count: i64,
    pub score_sum: i64,
    pub evaluation: i64,
}

#[derive(Debug, Clone, Default)]
pub struct LevelSeed {
    pub level_id: String,
    pub cached_display_name: Option<String>,
    pub score_count: i64,
    pub score_sum: i64,
    pub evaluation: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct EntrySeed {
    pub level_id: String,
    pub steam_id: String,
    pub score: i64,
    pub placement: i64,
    pub evaluation: i64,
}

/// Collects rows and writes them into a new snapshot file.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    players: Vec<PlayerSeed>,
    levels: Vec<LevelSeed>,
    entries: Vec<EntrySeed>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a player whose legacy and current metric are both `metric`.
    pub fn player(self, steam_id: &str, name: &str, metric: i64) -> Self {
        self.player_with(PlayerSeed {
            steam_id: steam_id.to_string(),
            cached_display_name: Some(name.to_string()),
            score_sum: metric,
            evaluation: metric,
            ..PlayerSeed::default()
        })
    }

    pub fn player_with(mut self, seed: PlayerSeed) -> Self {
        self.players.push(seed);
        self
    }

    pub fn level(self, level_id: &str, name: &str, score_sum: i64, score_count: i64) -> Self {
        self.level_with(LevelSeed {
            level_id: level_id.to_string(),
            cached_display_name: Some(name.to_string()),
            score_count,
            score_sum,
            evaluation: None,
        })
    }

    pub fn level_with(mut self, seed: LevelSeed) -> Self {
        self.levels.push(seed);
        self
    }

    pub fn entry(self, level_id: &str, steam_id: &str, score: i64, placement: i64) -> Self {
        self.entry_with(EntrySeed {
            level_id: level_id.to_string(),
            steam_id: steam_id.to_string(),
            score,
            placement,
            evaluation: 0,
        })
    }

    pub fn entry_with(mut self, seed: EntrySeed) -> Self {
        self.entries.push(seed);
        self
    }

    /// Writes the snapshot to a unique file under the system temp directory.
    pub async fn build(self) -> Result<SnapshotFixture> {
        let path = unique_snapshot_path();
        let fixture = SnapshotFixture { path: path.clone() };

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to create snapshot at {}", path.display()))?;

        self.write(&pool).await?;
        pool.close().await;

        log::debug!(
            "Wrote snapshot {} ({} players, {} levels, {} entries)",
            path.display(),
            self.players.len(),
            self.levels.len(),
            self.entries.len()
        );
        Ok(fixture)
    }

    async fn write(&self, pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(pool)
                .await
                .context("Failed to create snapshot schema")?;
        }

        let mut tx = pool.begin().await?;
        for p in &self.players {
            sqlx::query(
                "INSERT INTO players (steam_id, cached_display_name, score_count, score_sum, evaluation)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&p.steam_id)
            .bind(&p.cached_display_name)
            .bind(p.score_count)
            .bind(p.score_sum)
            .bind(p.evaluation)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert player {}", p.steam_id))?;
        }
        for l in &self.levels {
            sqlx::query(
                "INSERT INTO levels (level_id, cached_display_name, score_count, score_sum, evaluation)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&l.level_id)
            .bind(&l.cached_display_name)
            .bind(l.score_count)
            .bind(l.score_sum)
            .bind(l.evaluation)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert level {}", l.level_id))?;
        }
        for e in &self.entries {
            sqlx::query(
                "INSERT INTO steam_leaderboard (level_id, steam_id, score, placement, evaluation)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&e.level_id)
            .bind(&e.steam_id)
            .bind(e.score)
            .bind(e.placement)
            .bind(e.evaluation)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert entry {}/{}", e.level_id, e.steam_id))?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// A snapshot file on disk, removed on drop.
#[derive(Debug)]
pub struct SnapshotFixture {
    path: PathBuf,
}

impl SnapshotFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SnapshotFixture {
    fn drop(&mut self) {
        for suffix in ["", "-journal", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// A path under the temp directory that nothing has been written to.
pub fn unique_snapshot_path() -> PathBuf {
    std::env::temp_dir().join(format!("leaderboard-{}.db", uuid::Uuid::new_v4()))
}

/// The four-player table used throughout the ranking tests:
/// A=50, B=30, C=30, D=10.
pub fn four_player_snapshot() -> SnapshotBuilder {
    SnapshotBuilder::new()
        .player("A", "Alpha", 50)
        .player("B", "Bravo", 30)
        .player("C", "Charlie", 30)
        .player("D", "Delta", 10)
}
