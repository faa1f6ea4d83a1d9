use std::env;
use std::time::Duration;
use dotenv::dotenv;
use log::{info, warn};
use shared::MAX_REQUESTED_COUNT;

use crate::ranking::{Column, LevelDifficulty, RankingSchema, SnapshotGeneration, DEFAULT_DIFFICULTY_CAP};
use crate::window::DEFAULT_COUNT;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(format!("Unknown environment: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ranking: RankingConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Snapshot file written by the ingestion process
    pub path: String,
    pub pool_size: u32,
    pub wait_poll_ms: u64,
    /// 0 waits forever
    pub wait_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn wait_poll(&self) -> Duration {
        Duration::from_millis(self.wait_poll_ms)
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        match self.wait_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub generation: SnapshotGeneration,
    pub schema: RankingSchema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_count: i64,
    pub max_count: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_count: DEFAULT_COUNT,
            max_count: 200,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub filter: String,
}

impl LoggingConfig {
    /// Reads `LOG_FORMAT` and `RUST_LOG` only, so logging can be set up
    /// before the rest of the configuration is loaded.
    pub fn from_env() -> Self {
        Self::from_source(&|key| env::var(key).ok())
    }

    fn from_source(source: &dyn Fn(&str) -> Option<String>) -> Self {
        Self {
            format: source("LOG_FORMAT")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            filter: source("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }
}

/// Loads `.env`, or the file named by `ENV_FILE_PATH`, then the
/// environment-specific `.env.<environment>`. Variables already set in the
/// process environment win.
///
/// Runs before logging is installed, so it returns the files it applied
/// for the caller to log.
pub fn load_env_files() -> Vec<String> {
    let mut loaded = Vec::new();
    match env::var("ENV_FILE_PATH") {
        Ok(env_file_path) if !env_file_path.is_empty() => {
            if dotenv::from_filename(&env_file_path).is_ok() {
                loaded.push(env_file_path);
            }
        }
        _ => {
            if let Ok(path) = dotenv() {
                loaded.push(path.display().to_string());
            }
            let environment_hint = env::var("RUST_ENV")
                .unwrap_or_else(|_| "development".to_string())
                .parse()
                .unwrap_or(Environment::Development);
            let env_file = format!(".env.{:?}", environment_hint).to_lowercase();
            if env_file != ".env.development" && dotenv::from_filename(&env_file).is_ok() {
                loaded.push(env_file);
            }
        }
    }
    loaded
}

type Source<'a> = &'a dyn Fn(&str) -> Option<String>;

fn parse_or<T: std::str::FromStr>(source: Source, key: &str, default: T) -> T {
    match source(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable {}={}", key, raw);
                default
            }
        },
        None => default,
    }
}

impl Config {
    fn parse_backend_url(url: &str) -> (String, u16) {
        // BACKEND_URL like "http://0.0.0.0:8080"
        if let Ok(parsed_url) = url::Url::parse(url) {
            let host = parsed_url.host_str().unwrap_or("127.0.0.1").to_string();
            let port = parsed_url.port().unwrap_or(8080);
            (host, port)
        } else {
            ("127.0.0.1".to_string(), 8080)
        }
    }

    /// Reads the process environment. `.env` files are applied beforehand by
    /// [`load_env_files`], once, at startup.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let environment = env::var("RUST_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .parse()
            .unwrap_or(Environment::Development);

        info!("Loading configuration for environment: {:?}", environment);

        let config = Self::from_source(environment, &|key| env::var(key).ok())?;
        config.log_configuration();
        Ok(config)
    }

    /// Builds and validates a configuration from an arbitrary variable lookup.
    pub fn from_source(environment: Environment, source: Source) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config {
            server: Self::load_server_config(&environment, source),
            database: Self::load_database_config(&environment, source)?,
            ranking: Self::load_ranking_config(source)?,
            pagination: Self::load_pagination_config(source),
            logging: LoggingConfig::from_source(source),
            environment,
        };
        config.validate()?;
        Ok(config)
    }

    fn load_server_config(env: &Environment, source: Source) -> ServerConfig {
        let backend_url = source("BACKEND_URL").unwrap_or_else(|| "http://0.0.0.0:8080".to_string());
        let (host, port) = Self::parse_backend_url(&backend_url);
        let default_workers = match env {
            Environment::Production => 8,
            Environment::Development | Environment::Test => 1,
        };

        ServerConfig {
            // SERVER_HOST takes precedence over the BACKEND_URL host
            host: source("SERVER_HOST").unwrap_or(host),
            port: parse_or(source, "SERVER_PORT", port),
            workers: parse_or(source, "BACKEND_WORKERS", default_workers),
        }
    }

    fn load_database_config(env: &Environment, source: Source) -> Result<DatabaseConfig, Box<dyn std::error::Error>> {
        let path = match (env, source("LEADERBOARD_DB_PATH")) {
            (_, Some(path)) if !path.trim().is_empty() => path,
            (Environment::Production, _) => {
                return Err("LEADERBOARD_DB_PATH must be set in production".into());
            }
            (Environment::Test, _) => "test.db".to_string(),
            (Environment::Development, _) => "distance_leaderboard.db".to_string(),
        };
        let default_pool = match env {
            Environment::Production => 16,
            Environment::Development | Environment::Test => 4,
        };

        Ok(DatabaseConfig {
            path,
            pool_size: parse_or(source, "DB_POOL_SIZE", default_pool),
            wait_poll_ms: parse_or(source, "DB_WAIT_POLL_MS", 1000),
            wait_timeout_secs: parse_or(source, "DB_WAIT_TIMEOUT_SECS", 0),
        })
    }

    fn load_ranking_config(source: Source) -> Result<RankingConfig, Box<dyn std::error::Error>> {
        let generation: SnapshotGeneration = match source("SNAPSHOT_SCHEMA") {
            Some(raw) => raw.trim().parse()?,
            None => SnapshotGeneration::default(),
        };
        let mut schema = RankingSchema::for_generation(generation);

        if let Some(raw) = source("PLAYER_METRIC_COLUMN") {
            schema.player_metric = raw.parse::<Column>()?;
        }
        if let Some(raw) = source("ENTRY_SCORE_COLUMN") {
            schema.entry_score = raw.parse::<Column>()?;
        }
        if let Some(raw) = source("PLAYER_ENTRY_ORDER_COLUMN") {
            schema.player_entry_order = raw.parse::<Column>()?;
        }
        if let Some(raw) = source("LEVEL_DIFFICULTY") {
            schema.level_difficulty = match raw.trim().to_lowercase().as_str() {
                "weighted" => LevelDifficulty::weighted(),
                "precomputed" => LevelDifficulty::precomputed(),
                other => return Err(format!("Unknown level difficulty: {}", other).into()),
            };
        }
        if let LevelDifficulty::WeightedAverage { cap, .. } = &mut schema.level_difficulty {
            *cap = parse_or(source, "LEVEL_DIFFICULTY_CAP", DEFAULT_DIFFICULTY_CAP);
        }

        Ok(RankingConfig { generation, schema })
    }

    fn load_pagination_config(source: Source) -> PaginationConfig {
        let defaults = PaginationConfig::default();
        PaginationConfig {
            default_count: parse_or(source, "PAGE_SIZE", defaults.default_count),
            max_count: parse_or(source, "MAX_PAGE_SIZE", defaults.max_count),
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.server.port == 0 {
            return Err("Server port cannot be 0".into());
        }
        if self.server.workers == 0 {
            return Err("BACKEND_WORKERS cannot be 0".into());
        }
        if self.database.pool_size == 0 {
            return Err("Database pool size cannot be 0".into());
        }
        if self.database.wait_poll_ms == 0 {
            return Err("DB_WAIT_POLL_MS cannot be 0".into());
        }
        if self.pagination.default_count < 1 {
            return Err("Page size must be at least 1".into());
        }
        if self.pagination.max_count > MAX_REQUESTED_COUNT {
            return Err(format!(
                "MAX_PAGE_SIZE {} exceeds the largest count a request can carry ({})",
                self.pagination.max_count, MAX_REQUESTED_COUNT
            )
            .into());
        }
        if self.pagination.default_count > self.pagination.max_count {
            return Err(format!(
                "Page size {} exceeds the maximum page size {}",
                self.pagination.default_count, self.pagination.max_count
            )
            .into());
        }
        if let LevelDifficulty::WeightedAverage { cap, .. } = self.ranking.schema.level_difficulty {
            if cap < 1 {
                return Err("LEVEL_DIFFICULTY_CAP must be at least 1".into());
            }
        }
        Ok(())
    }

    fn log_configuration(&self) {
        info!("Configuration loaded successfully");
        info!("Environment: {:?}", self.environment);
        info!("Server: {}:{} (workers: {})", self.server.host, self.server.port, self.server.workers);
        info!("Snapshot: {} (pool: {})", self.database.path, self.database.pool_size);
        info!(
            "Ranking: {:?} (players by {}, levels {})",
            self.ranking.generation,
            self.ranking.schema.player_metric,
            self.ranking.schema.level_difficulty.kind()
        );
        info!(
            "Pagination: {} per page (max {})",
            self.pagination.default_count, self.pagination.max_count
        );

        if self.database.wait_timeout().is_none() {
            warn!("Startup waits indefinitely for the snapshot to appear");
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
