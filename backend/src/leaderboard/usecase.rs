use std::sync::Arc;

use shared::dto::leaderboard::{LevelScoreDto, PlayerScoreDto};
use shared::dto::page::PageDto;
use shared::models::level::RankedLevel;
use shared::models::player::RankedPlayer;
use shared::{LeaderboardError, Result};

use crate::config::PaginationConfig;
use crate::leaderboard::repository::LeaderboardRepository;
use crate::window::{resolve_request, Window};

/// Page assembly: resolves the window, runs the ranked read, formats rows
/// and attaches the neighbouring-page links.
#[derive(Clone)]
pub struct LeaderboardUseCase {
    repo: Arc<dyn LeaderboardRepository>,
    pagination: PaginationConfig,
}

impl LeaderboardUseCase {
    pub fn new(repo: Arc<dyn LeaderboardRepository>, pagination: PaginationConfig) -> Self {
        Self { repo, pagination }
    }

    pub fn pagination(&self) -> PaginationConfig {
        self.pagination
    }

    fn window(&self, start: Option<&str>, count: Option<i64>) -> Result<Window> {
        if let Some(count) = count {
            if count > self.pagination.max_count {
                return Err(LeaderboardError::InvalidWindow(format!(
                    "count {} exceeds the maximum of {}",
                    count, self.pagination.max_count
                )));
            }
        }
        resolve_request(start, count, self.pagination.default_count)
    }

    fn link(&self, base: &str, start: i64, count: i64) -> String {
        if count == self.pagination.default_count {
            format!("{}/{}", base, start)
        } else {
            format!("{}/{}?count={}", base, start, count)
        }
    }

    fn page<T>(&self, title: String, base: &str, window: &Window, entries: Vec<T>) -> PageDto<T> {
        let count = window.count();
        PageDto {
            title,
            entries,
            start: window.start(),
            count,
            prev_start: window.prev_start,
            next_start: window.next_start,
            prev_page: self.link(base, window.prev_start, count),
            next_page: self.link(base, window.next_start, count),
        }
    }

    pub async fn players_page(&self, start: Option<&str>, count: Option<i64>) -> Result<PageDto<RankedPlayer>> {
        let window = self.window(start, count)?;
        let entries = self.repo.list_players(&window).await?;
        Ok(self.page("Players".to_string(), "/players", &window, entries))
    }

    pub async fn levels_page(&self, start: Option<&str>, count: Option<i64>) -> Result<PageDto<RankedLevel>> {
        let window = self.window(start, count)?;
        let entries = self.repo.list_levels(&window).await?;
        Ok(self.page("Levels".to_string(), "/levels", &window, entries))
    }

    /// A level's leaderboard. An unknown level is `NotFound` even when the
    /// window itself would be empty.
    pub async fn level_page(
        &self,
        level_id: &str,
        start: Option<&str>,
        count: Option<i64>,
    ) -> Result<PageDto<LevelScoreDto>> {
        let window = self.window(start, count)?;
        let level = self.repo.get_level(level_id).await?;
        let entries = self.repo.list_level_leaderboard(level_id, &window).await?;

        let base = format!("/level/{}", urlencoding::encode(level_id));
        let title = format!("Level: {}", level.display_name());
        Ok(self
            .page(title, &base, &window, entries)
            .map(LevelScoreDto::from))
    }

    pub async fn player_page(
        &self,
        steam_id: &str,
        start: Option<&str>,
        count: Option<i64>,
    ) -> Result<PageDto<PlayerScoreDto>> {
        let window = self.window(start, count)?;
        let player = self.repo.get_player(steam_id).await?;
        let entries = self.repo.list_player_leaderboard(steam_id, &window).await?;

        let base = format!("/player/{}", urlencoding::encode(steam_id));
        let title = format!("Player: {}", player.display_name());
        Ok(self
            .page(title, &base, &window, entries)
            .map(PlayerScoreDto::from))
    }

    pub async fn player_placement(&self, steam_id: &str) -> Result<RankedPlayer> {
        self.repo.find_player_placement(steam_id).await
    }

    pub async fn level_entry(&self, level_id: &str, steam_id: &str) -> Result<LevelScoreDto> {
        self.repo
            .find_level_entry(level_id, steam_id)
            .await
            .map(LevelScoreDto::from)
    }
}
