use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::time::timeout;

use crate::store::Store;

const STORE_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: &'static str,
}

/// Liveness only; does not touch the snapshot.
#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
struct ServiceHealthStatus {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_time_ms: Option<u64>,
}

impl ServiceHealthStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
            response_time_ms: None,
        }
    }

    fn unhealthy(message: String) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message),
            response_time_ms: None,
        }
    }

    fn with_response_time(mut self, ms: u64) -> Self {
        self.response_time_ms = Some(ms);
        self
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

async fn check_store(store: &Store) -> ServiceHealthStatus {
    let start = Instant::now();

    match timeout(STORE_CHECK_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => {
            ServiceHealthStatus::healthy().with_response_time(start.elapsed().as_millis() as u64)
        }
        Ok(Err(e)) => ServiceHealthStatus::unhealthy(format!("Snapshot query failed: {}", e)),
        Err(_) => ServiceHealthStatus::unhealthy("Snapshot query timeout".to_string()),
    }
}

#[derive(Serialize)]
struct DetailedHealthResponse {
    status: String,
    timestamp: u64,
    version: &'static str,
    snapshot: String,
    services: ServicesHealth,
}

#[derive(Serialize)]
struct ServicesHealth {
    database: ServiceHealthStatus,
}

/// Runs `SELECT 1` against the snapshot; 503 when it fails or times out.
#[get("/health/detailed")]
pub async fn detailed_health_check(store: web::Data<Store>) -> impl Responder {
    let database = check_store(store.get_ref()).await;
    let healthy = database.is_healthy();
    if !healthy {
        log::warn!("Health check failed: {:?}", database.message);
    }

    let response = DetailedHealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        timestamp: unix_timestamp(),
        version: env!("CARGO_PKG_VERSION"),
        snapshot: store.path().display().to_string(),
        services: ServicesHealth { database },
    };

    if healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
