use actix_web::{get, HttpResponse};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::error::ApiError;

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Registered once per process; `None` if registration failed
static METRICS: Lazy<Option<Metrics>> = Lazy::new(|| match Metrics::register(&REGISTRY) {
    Ok(metrics) => Some(metrics),
    Err(e) => {
        log::error!("Failed to register metrics: {}", e);
        None
    }
});

/// HTTP request metrics
pub struct HttpMetrics {
    /// Request duration histogram (in seconds)
    pub request_duration: HistogramVec,
    /// Total HTTP requests counter
    pub requests_total: IntCounterVec,
    /// Active requests gauge
    pub requests_in_flight: IntGauge,
}

/// Ranked-query metrics, labelled by the collection read
pub struct QueryMetrics {
    pub query_duration: HistogramVec,
    pub queries_total: IntCounterVec,
}

pub struct Metrics {
    pub http: HttpMetrics,
    pub queries: QueryMetrics,
}

impl Metrics {
    fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "HTTP request duration in seconds"),
            &["method", "endpoint", "status_code"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "endpoint", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being processed",
        ))?;
        registry.register(Box::new(requests_in_flight.clone()))?;

        let query_duration = HistogramVec::new(
            HistogramOpts::new(
                "leaderboard_query_duration_seconds",
                "Ranked query duration in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
            &["entity"],
        )?;
        registry.register(Box::new(query_duration.clone()))?;

        let queries_total = IntCounterVec::new(
            Opts::new("leaderboard_queries_total", "Total number of ranked queries"),
            &["entity", "status"],
        )?;
        registry.register(Box::new(queries_total.clone()))?;

        Ok(Metrics {
            http: HttpMetrics {
                request_duration,
                requests_total,
                requests_in_flight,
            },
            queries: QueryMetrics {
                query_duration,
                queries_total,
            },
        })
    }

    pub fn registry() -> &'static Registry {
        &REGISTRY
    }

    /// The process-wide metrics, registered on first use.
    pub fn global() -> Option<&'static Metrics> {
        METRICS.as_ref()
    }
}

pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let Some(metrics) = Metrics::global() else {
        return;
    };
    let status_str = status_code.to_string();

    metrics
        .http
        .request_duration
        .with_label_values(&[method, endpoint, &status_str])
        .observe(duration.as_secs_f64());
    metrics
        .http
        .requests_total
        .with_label_values(&[method, endpoint, &status_str])
        .inc();
}

/// Records one ranked query. `status` is `ok`, `not_found` or an error kind.
pub fn record_query(entity: &str, status: &str, duration: Duration) {
    let Some(metrics) = Metrics::global() else {
        return;
    };

    metrics
        .queries
        .query_duration
        .with_label_values(&[entity])
        .observe(duration.as_secs_f64());
    metrics
        .queries
        .queries_total
        .with_label_values(&[entity, status])
        .inc();
}

/// Prometheus text exposition of every registered metric
#[get("/metrics")]
pub async fn metrics_handler() -> Result<HttpResponse, ApiError> {
    // Force registration so a scrape before the first request is not empty
    let _ = Metrics::global();

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ApiError::internal_error(&format!("Failed to encode metrics: {}", e)))?;

    Ok(HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer))
}
