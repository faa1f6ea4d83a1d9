pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod ranking;
pub mod store;
pub mod window;

pub mod leaderboard {
    pub mod controller;
    pub mod queries;
    pub mod repository;
    pub mod usecase;

    pub use controller::configure_routes;
    pub use queries::LeaderboardQueries;
    pub use repository::{LeaderboardRepository, SqliteLeaderboardRepository};
    pub use usecase::LeaderboardUseCase;
}

use actix_web::web;
use std::sync::Arc;

use crate::config::Config;
use crate::leaderboard::{LeaderboardUseCase, SqliteLeaderboardRepository};
use crate::ranking::RankingEngine;
use crate::store::Store;

/// Shared, read-only state behind every request.
#[derive(Clone)]
pub struct AppState {
    pub store: web::Data<Store>,
    pub usecase: web::Data<LeaderboardUseCase>,
}

impl AppState {
    pub fn new(store: Store, config: &Config) -> Self {
        let engine = RankingEngine::new(config.ranking.schema.clone());
        let repo = SqliteLeaderboardRepository::new(store.clone(), &engine);
        let usecase = LeaderboardUseCase::new(Arc::new(repo), config.pagination);
        Self {
            store: web::Data::new(store),
            usecase: web::Data::new(usecase),
        }
    }
}

/// Registers health, metrics and leaderboard routes. The JSON 404 fallback
/// has to be set on the `App` itself with [`not_found_service`].
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.store.clone())
        .service(health::health_check)
        .service(health::detailed_health_check)
        .service(metrics::metrics_handler);
    leaderboard::configure_routes(cfg, state.usecase.clone());
}

pub fn not_found_service() -> actix_web::Route {
    web::route().to(leaderboard::controller::not_found_handler)
}
