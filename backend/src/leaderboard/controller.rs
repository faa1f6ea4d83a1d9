use actix_web::{error::QueryPayloadError, get, web, HttpRequest, HttpResponse};
use log::{debug, error, warn};
use shared::dto::page::PageQuery;
use shared::LeaderboardError;
use std::future::Future;
use std::time::Instant;
use validator::Validate;

use crate::error::ApiError;
use crate::leaderboard::usecase::LeaderboardUseCase;
use crate::metrics;

fn status_label(err: &LeaderboardError) -> &'static str {
    match err {
        LeaderboardError::InvalidWindow(_) => "invalid_window",
        LeaderboardError::NotFound(_) => "not_found",
        LeaderboardError::StorageUnavailable(_) => "storage_unavailable",
        LeaderboardError::StorageFault(_) => "storage_fault",
    }
}

/// Runs one ranked read, recording its duration and outcome.
async fn observe<T, F>(entity: &str, read: F) -> Result<T, ApiError>
where
    F: Future<Output = shared::Result<T>>,
{
    let started = Instant::now();
    let result = read.await;
    let status = match &result {
        Ok(_) => "ok",
        Err(e) => status_label(e),
    };
    metrics::record_query(entity, status, started.elapsed());

    result.map_err(|e| {
        match &e {
            LeaderboardError::StorageFault(_) => error!("{} query failed: {}", entity, e),
            LeaderboardError::StorageUnavailable(_) => warn!("{} query failed: {}", entity, e),
            LeaderboardError::InvalidWindow(_) | LeaderboardError::NotFound(_) => {
                debug!("{} query rejected: {}", entity, e)
            }
        }
        ApiError::from(e)
    })
}

fn page_count(query: &PageQuery) -> Result<Option<i64>, ApiError> {
    query.validate()?;
    Ok(query.count)
}

#[get("/")]
pub async fn index_handler(
    usecase: web::Data<LeaderboardUseCase>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("players", usecase.players_page(None, count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/players")]
pub async fn players_handler(
    usecase: web::Data<LeaderboardUseCase>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("players", usecase.players_page(None, count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/players/{start}")]
pub async fn players_from_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("players", usecase.players_page(Some(path.as_str()), count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/levels")]
pub async fn levels_handler(
    usecase: web::Data<LeaderboardUseCase>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("levels", usecase.levels_page(None, count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/levels/{start}")]
pub async fn levels_from_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("levels", usecase.levels_page(Some(path.as_str()), count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/level/{level_id}")]
pub async fn level_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("level_leaderboard", usecase.level_page(&path, None, count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/level/{level_id}/entry/{steam_id}")]
pub async fn level_entry_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (level_id, steam_id) = path.into_inner();
    let entry = observe("level_entry", usecase.level_entry(&level_id, &steam_id)).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[get("/level/{level_id}/{start}")]
pub async fn level_from_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<(String, String)>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let (level_id, start) = path.into_inner();
    let page = observe(
        "level_leaderboard",
        usecase.level_page(&level_id, Some(start.as_str()), count),
    )
    .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/player/{steam_id}")]
pub async fn player_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let page = observe("player_leaderboard", usecase.player_page(&path, None, count)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/player/{steam_id}/placement")]
pub async fn player_placement_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let player = observe("player_placement", usecase.player_placement(&path)).await?;
    Ok(HttpResponse::Ok().json(player))
}

#[get("/player/{steam_id}/{start}")]
pub async fn player_from_handler(
    usecase: web::Data<LeaderboardUseCase>,
    path: web::Path<(String, String)>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let count = page_count(&query)?;
    let (steam_id, start) = path.into_inner();
    let page = observe(
        "player_leaderboard",
        usecase.player_page(&steam_id, Some(start.as_str()), count),
    )
    .await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Fallback for every unmatched route
pub async fn not_found_handler(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::not_found(&format!("No route for {} {}", req.method(), req.path())))
}

fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::bad_request(&format!("Invalid query string: {}", err)).into()
}

/// Registers every leaderboard route. Literal segments are registered ahead
/// of the `{start}` routes they would otherwise be captured by.
pub fn configure_routes(cfg: &mut web::ServiceConfig, usecase: web::Data<LeaderboardUseCase>) {
    cfg.app_data(usecase)
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(index_handler)
        .service(players_handler)
        .service(players_from_handler)
        .service(levels_handler)
        .service(levels_from_handler)
        .service(level_handler)
        .service(level_entry_handler)
        .service(level_from_handler)
        .service(player_handler)
        .service(player_placement_handler)
        .service(player_from_handler);
}
