use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use log::{error, info, warn};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Instant;
use uuid::Uuid;

use crate::metrics::{self, Metrics};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Correlation id of the current request, stored in the request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Counter-based ids under test, UUID v4 otherwise
fn generate_request_id() -> String {
    let is_test = cfg!(test)
        || std::env::var("RUST_ENV")
            .unwrap_or_default()
            .eq_ignore_ascii_case("test");

    if is_test {
        format!("test-{}", REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed))
    } else {
        Uuid::new_v4().to_string()
    }
}

/// Request logging: assigns a request id, echoes it in `x-request-id`, logs
/// one line per request at a level chosen by status class and records HTTP
/// metrics labelled by the matched route pattern.
pub struct Logger;

impl<S, B> Transform<S, ServiceRequest> for Logger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let start_time = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        let peer_addr = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let request_id = generate_request_id();
        req.extensions_mut().insert(RequestId(request_id.clone()));

        if let Some(metrics) = Metrics::global() {
            metrics.http.requests_in_flight.inc();
        }

        Box::pin(async move {
            let result = svc.call(req).await;
            if let Some(metrics) = Metrics::global() {
                metrics.http.requests_in_flight.dec();
            }
            let mut res = result?;
            let duration = start_time.elapsed();

            if let Ok(header_value) = HeaderValue::try_from(request_id.as_str()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
            }

            // Routing has happened by now, so the pattern is known
            let endpoint = res
                .request()
                .match_pattern()
                .unwrap_or_else(|| "unmatched".to_string());
            let status_code = res.status().as_u16();
            metrics::record_http_request(method.as_str(), &endpoint, status_code, duration);

            let line = format!(
                "request_id={} {} {} {} {}ms {}",
                request_id,
                method,
                uri,
                status_code,
                duration.as_millis(),
                peer_addr
            );
            if status_code >= 500 {
                error!("{}", line);
            } else if status_code >= 400 {
                warn!("{}", line);
            } else {
                info!("{}", line);
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpRequest, HttpResponse};

    #[actix_web::test]
    async fn test_logger_sets_request_id_header() {
        let app = test::init_service(
            App::new()
                .wrap(Logger)
                .route("/test", web::get().to(|| async { "test" })),
        )
        .await;

        let req = test::TestRequest::get().uri("/test").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let id = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
        assert!(id.starts_with("test-"));
    }

    #[actix_web::test]
    async fn test_request_id_is_visible_to_handlers() {
        let app = test::init_service(App::new().wrap(Logger).route(
            "/id",
            web::get().to(|req: HttpRequest| async move {
                let id = req.extensions().get::<RequestId>().cloned();
                HttpResponse::Ok().body(id.map(|r| r.0).unwrap_or_default())
            }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/id").to_request();
        let resp = test::call_service(&app, req).await;
        let header = resp.headers().get(REQUEST_ID_HEADER).unwrap().to_str().unwrap().to_string();
        let body = test::read_body(resp).await;
        assert_eq!(body, header.as_bytes());
    }

    #[actix_web::test]
    async fn test_request_ids_are_unique() {
        let app = test::init_service(
            App::new()
                .wrap(Logger)
                .route("/test", web::get().to(|| async { "test" })),
        )
        .await;

        let first = test::call_service(&app, test::TestRequest::get().uri("/test").to_request()).await;
        let second = test::call_service(&app, test::TestRequest::get().uri("/test").to_request()).await;
        assert_ne!(
            first.headers().get(REQUEST_ID_HEADER),
            second.headers().get(REQUEST_ID_HEADER)
        );
    }

    #[actix_web::test]
    async fn test_logger_passes_through_errors() {
        let app = test::init_service(
            App::new()
                .wrap(Logger)
                .route("/error", web::get().to(|| async { HttpResponse::InternalServerError().finish() }))
                .route("/missing", web::get().to(|| async { HttpResponse::NotFound().finish() })),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/error").to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_http_metrics_use_route_pattern() {
        let app = test::init_service(
            App::new()
                .wrap(Logger)
                .route("/players/{start}", web::get().to(|| async { "ok" })),
        )
        .await;

        let metrics = Metrics::global().unwrap();
        let counter = metrics
            .http
            .requests_total
            .with_label_values(&["GET", "/players/{start}", "200"]);
        let before = counter.get();

        let req = test::TestRequest::get().uri("/players/31").to_request();
        test::call_service(&app, req).await;

        assert!(counter.get() > before);
    }
}
