use actix_web::{http::StatusCode, test, App};
use backend::config::{Config, Environment};
use backend::store::Store;
use backend::AppState;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use std::collections::HashMap;
use testing::{four_player_snapshot, SnapshotFixture};

async fn snapshot() -> SnapshotFixture {
    four_player_snapshot()
        .level("L1", "Lost Fortress", 900, 3)
        .level("L2", "Broken Symmetry", 100, 10)
        .entry("L1", "A", 61_000, 1)
        .entry("L1", "B", 65_432, 2)
        .entry("L1", "C", 70_000, 3)
        .entry("L2", "A", 999, 1)
        .build()
        .await
        .unwrap()
}

fn config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_source(Environment::Test, &|key| vars.get(key).cloned()).unwrap()
}

async fn get(fixture: &SnapshotFixture, vars: &[(&str, &str)], uri: &str) -> (StatusCode, Value) {
    let store = Store::open(fixture.path(), 2).await.unwrap();
    let state = AppState::new(store.clone(), &config(vars));
    let app = test::init_service(
        App::new()
            .wrap(backend::middleware::Logger)
            .configure(|cfg| backend::configure_app(cfg, &state))
            .default_service(backend::not_found_service()),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let body = test::read_body_json(resp).await;
    store.close().await;
    (status, body)
}

fn steam_ids(page: &Value) -> Vec<(String, i64)> {
    page["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["steam_id"].as_str().unwrap().to_string(),
                e["placement"].as_i64().unwrap(),
            )
        })
        .collect()
}

#[test_log::test(actix_web::test)]
async fn players_window_is_inclusive() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[], "/players/1?count=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        steam_ids(&page),
        vec![("A".to_string(), 1), ("B".to_string(), 2), ("C".to_string(), 3)]
    );
    assert_eq!(page["prevStart"], -2);
    assert_eq!(page["nextStart"], 4);
    assert_eq!(page["nextPage"], "/players/4?count=2");
}

#[actix_web::test]
async fn index_is_the_first_players_page() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[], "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Players");
    assert_eq!(page["start"], 0);
    assert_eq!(page["prevPage"], "/players/-31");
    assert_eq!(page["nextPage"], "/players/31");
    assert_eq!(page["entries"].as_array().unwrap().len(), 4);
}

#[actix_web::test]
async fn page_past_the_end_is_empty() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[], "/players/62").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["entries"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn legacy_levels_rank_by_weighted_difficulty() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[("SNAPSHOT_SCHEMA", "legacy")], "/levels").await;
    assert_eq!(status, StatusCode::OK);
    let levels: Vec<(&str, i64)> = page["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| (l["level_id"].as_str().unwrap(), l["difficulty"].as_i64().unwrap()))
        .collect();
    assert_eq!(levels, vec![("L1", 900), ("L2", 100)]);
}

#[actix_web::test]
async fn level_page_formats_times() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[], "/level/L1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Level: Lost Fortress");
    assert_eq!(page["entries"][1]["display_name"], "Bravo");
    assert_eq!(page["entries"][1]["time"], "1:05.432");
    assert_eq!(page["entries"][1]["score"], 65_432);
    assert_eq!(page["nextPage"], "/level/L1/31");
}

#[actix_web::test]
async fn player_page_names_levels() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[("SNAPSHOT_SCHEMA", "legacy")], "/player/A").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Player: Alpha");
    let rows: Vec<(i64, &str, &str)> = page["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            (
                e["row_num"].as_i64().unwrap(),
                e["level_name"].as_str().unwrap(),
                e["time"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        rows,
        vec![(1, "Lost Fortress", "1:01.000"), (2, "Broken Symmetry", "0:00.999")]
    );
}

#[actix_web::test]
async fn placement_and_entry_lookups() {
    let fixture = snapshot().await;

    let (status, player) = get(&fixture, &[], "/player/C/placement").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(player["placement"], 3);

    let (status, entry) = get(&fixture, &[], "/level/L1/entry/B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["placement"], 2);
    assert_eq!(entry["time"], "1:05.432");
}

#[actix_web::test]
async fn missing_rows_are_404() {
    let fixture = snapshot().await;

    let (status, body) = get(&fixture, &[], "/level/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found: level nope");

    let (status, _) = get(&fixture, &[], "/player/nope/31").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&fixture, &[], "/level/L2/entry/D").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[case::word("/players/abc")]
#[case::fraction("/levels/3.5")]
#[case::nan("/level/L1/NaN")]
#[case::infinity("/player/A/Infinity")]
#[actix_rt::test]
async fn malformed_starts_are_400(#[case] uri: &str) {
    let fixture = snapshot().await;

    let (status, body) = get(&fixture, &[], uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BAD_REQUEST");
}

#[actix_web::test]
async fn integral_float_start_is_accepted() {
    let fixture = snapshot().await;

    let (status, page) = get(&fixture, &[], "/players/1.0?count=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["start"], 1);
    assert_eq!(steam_ids(&page).len(), 2);
}

#[actix_web::test]
async fn count_above_configured_maximum_is_400() {
    let fixture = snapshot().await;

    let (status, _) = get(&fixture, &[("MAX_PAGE_SIZE", "50")], "/players?count=51").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn health_and_unknown_routes() {
    let fixture = snapshot().await;

    let (status, body) = get(&fixture, &[], "/health/detailed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["services"]["database"]["status"], "healthy");

    let (status, body) = get(&fixture, &[], "/no/such/route/here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_web::test]
async fn repeated_requests_return_identical_pages() {
    let fixture = snapshot().await;

    let (_, first) = get(&fixture, &[], "/players").await;
    let (_, second) = get(&fixture, &[], "/players").await;
    assert_eq!(first, second);
}
