//! The process-wide, read-only handle on the leaderboard snapshot.
//!
//! Opened once at startup and handed to every repository. Connections are
//! opened with `SQLITE_OPEN_READONLY` and `PRAGMA query_only = ON`, so no
//! statement issued through the store can modify the snapshot.

use log::{info, warn};
use shared::{LeaderboardError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::DatabaseConfig;

/// SQLite primary result code for "unable to open database file"
const SQLITE_CANTOPEN: &str = "14";

#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
    path: PathBuf,
}

impl Store {
    /// Opens an existing snapshot read-only. A missing file is reported as
    /// `StorageUnavailable`; the file is never created.
    pub async fn open(path: impl AsRef<Path>, pool_size: u32) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LeaderboardError::StorageUnavailable(format!(
                "snapshot {} does not exist",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false)
            .pragma("query_only", "ON");
        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .connect_with(options)
            .await
            .map_err(|e| match map_storage_error(e) {
                LeaderboardError::StorageFault(msg) => LeaderboardError::StorageUnavailable(msg),
                other => other,
            })?;

        info!("Opened snapshot {} read-only (pool: {})", path.display(), pool_size);
        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Waits for the snapshot file to appear, then opens it.
    pub async fn wait_and_open(config: &DatabaseConfig) -> Result<Self> {
        wait_for_file(
            Path::new(&config.path),
            config.wait_poll(),
            config.wait_timeout(),
        )
        .await?;
        Self::open(&config.path, config.pool_size).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(map_storage_error)?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed snapshot {}", self.path.display());
    }
}

/// Polls until `path` exists. `timeout` of `None` waits indefinitely.
pub async fn wait_for_file(path: &Path, poll: Duration, timeout: Option<Duration>) -> Result<()> {
    let started = Instant::now();
    let mut announced = false;

    while !path.is_file() {
        if let Some(limit) = timeout {
            if started.elapsed() >= limit {
                return Err(LeaderboardError::StorageUnavailable(format!(
                    "snapshot {} did not appear within {}s",
                    path.display(),
                    limit.as_secs()
                )));
            }
        }
        if !announced {
            warn!("Waiting for snapshot {} to appear", path.display());
            announced = true;
        }
        tokio::time::sleep(poll).await;
    }
    Ok(())
}

/// Classifies a driver error. Connection-level failures mean the store
/// cannot be reached; anything else is passed through as a fault with the
/// driver's message intact.
pub fn map_storage_error(err: sqlx::Error) -> LeaderboardError {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            LeaderboardError::StorageUnavailable(err.to_string())
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(SQLITE_CANTOPEN) => {
            LeaderboardError::StorageUnavailable(err.to_string())
        }
        _ => LeaderboardError::StorageFault(err.to_string()),
    }
}
