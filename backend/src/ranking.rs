//! Ranking definitions for every ranked collection.
//!
//! Ranks are always derived from an ordering at read time with
//! `ROW_NUMBER()`, except on a level's own leaderboard, whose placements the
//! ingestion process stores. The level difficulty formula and the metric
//! columns differ between snapshot generations and are chosen by
//! configuration through [`RankingSchema`].

use std::fmt;
use std::str::FromStr;

/// Number of recorded attempts after which a level's average is no longer damped
pub const DEFAULT_DIFFICULTY_CAP: i64 = 30;

/// A column name that is safe to splice into SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column(String);

impl Column {
    pub fn new(name: &str) -> Result<Self, String> {
        let mut chars = name.chars();
        let valid_head = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
        if !valid_head || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("Invalid column name: '{}'", name));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::new(s.trim())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a level's difficulty is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelDifficulty {
    /// `(sum / count) * min(count, cap)`: the average score, scaled down
    /// for levels with fewer than `cap` recorded attempts.
    WeightedAverage { sum: Column, count: Column, cap: i64 },
    /// A difficulty the ingestion process already computed.
    Precomputed { column: Column },
}

impl LevelDifficulty {
    pub fn weighted() -> Self {
        Self::WeightedAverage {
            sum: Column("score_sum".to_string()),
            count: Column("score_count".to_string()),
            cap: DEFAULT_DIFFICULTY_CAP,
        }
    }

    pub fn precomputed() -> Self {
        Self::Precomputed {
            column: Column("evaluation".to_string()),
        }
    }

    /// SQL expression over the `levels` table. Division follows SQLite's
    /// numeric rules: integer division for integer columns, NULL when the
    /// count is zero.
    pub fn sql_expr(&self) -> String {
        match self {
            Self::WeightedAverage { sum, count, cap } => {
                format!("({}/{})*min({}, {})", sum, count, count, cap)
            }
            Self::Precomputed { column } => column.to_string(),
        }
    }

    /// Name accepted by `LEVEL_DIFFICULTY`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WeightedAverage { .. } => "weighted",
            Self::Precomputed { .. } => "precomputed",
        }
    }
}

/// Which generation of the ingestion schema the snapshot was written by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotGeneration {
    /// Players ranked by `score_sum`, levels by the weighted average.
    Legacy,
    /// Everything ranked by the precomputed `evaluation` columns.
    #[default]
    Current,
}

impl FromStr for SnapshotGeneration {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" | "score_sum" => Ok(Self::Legacy),
            "current" | "evaluation" => Ok(Self::Current),
            _ => Err(format!("Unknown snapshot schema: {}", s)),
        }
    }
}

/// Column choices for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingSchema {
    /// Players are ranked by this column, descending
    pub player_metric: Column,
    pub level_difficulty: LevelDifficulty,
    /// Raw time of a leaderboard entry, in milliseconds
    pub entry_score: Column,
    /// A player's own entries are numbered by this column, descending
    pub player_entry_order: Column,
}

impl RankingSchema {
    pub fn for_generation(generation: SnapshotGeneration) -> Self {
        match generation {
            SnapshotGeneration::Legacy => Self {
                player_metric: Column("score_sum".to_string()),
                level_difficulty: LevelDifficulty::weighted(),
                entry_score: Column("score".to_string()),
                player_entry_order: Column("score".to_string()),
            },
            SnapshotGeneration::Current => Self {
                player_metric: Column("evaluation".to_string()),
                level_difficulty: LevelDifficulty::precomputed(),
                entry_score: Column("score".to_string()),
                player_entry_order: Column("evaluation".to_string()),
            },
        }
    }
}

impl Default for RankingSchema {
    fn default() -> Self {
        Self::for_generation(SnapshotGeneration::default())
    }
}

/// How the rank of a row in a collection comes about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankDefinition {
    /// Numbered 1..N at read time in the given order.
    RowNumber { order_by: String },
    /// Read from a column written at ingestion.
    Stored { column: Column },
}

impl RankDefinition {
    /// SQL expression producing the rank of each row.
    pub fn rank_expr(&self) -> String {
        match self {
            Self::RowNumber { order_by } => format!("ROW_NUMBER() OVER (ORDER BY {})", order_by),
            Self::Stored { column } => column.to_string(),
        }
    }
}

/// Rank definitions of the four ranked collections under one schema.
///
/// Ties in the ordering metric are broken by the collection's key so that
/// repeated reads of an unchanged snapshot number rows identically.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    schema: RankingSchema,
}

impl RankingEngine {
    pub fn new(schema: RankingSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &RankingSchema {
        &self.schema
    }

    /// Players by descending metric.
    pub fn players(&self) -> RankDefinition {
        RankDefinition::RowNumber {
            order_by: format!("players.{} DESC, players.steam_id ASC", self.schema.player_metric),
        }
    }

    /// Levels by descending difficulty. Expects the difficulty to be
    /// exposed as a `difficulty` column of the ranked relation.
    pub fn levels(&self) -> RankDefinition {
        RankDefinition::RowNumber {
            order_by: "difficulty DESC, level_id ASC".to_string(),
        }
    }

    /// A level's leaderboard: stored placement, 1 = best.
    pub fn level_leaderboard(&self) -> RankDefinition {
        RankDefinition::Stored {
            column: Column("placement".to_string()),
        }
    }

    /// One player's entries by the configured order column, descending.
    pub fn player_leaderboard(&self) -> RankDefinition {
        RankDefinition::RowNumber {
            order_by: format!(
                "steam_leaderboard.{} DESC, steam_leaderboard.level_id ASC",
                self.schema.player_entry_order
            ),
        }
    }

    pub fn difficulty_expr(&self) -> String {
        self.schema.level_difficulty.sql_expr()
    }
}
