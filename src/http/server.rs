//! HTTP router assembly.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, metrics)
//! - Carry the per-instance state handlers need
//!
//! Routes:
//! - `GET /files/*`        raw file under the served root
//! - `GET /filelist`       streamed listing
//! - `GET /health`         liveness
//! - `GET|POST /shutdown`  graceful shutdown trigger

use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::{files, handlers};
use crate::lifecycle::{Shutdown, StateWatch};
use crate::listing::{self, ListingHandler};
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub listing: ListingHandler,
    pub shutdown: Shutdown,
    pub server_state: StateWatch,
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let served_root = state.listing.served_root().to_path_buf();

    Router::new()
        .route("/filelist", get(listing::filelist))
        .route("/health", get(handlers::health))
        .route("/shutdown", get(handlers::shutdown).post(handlers::shutdown))
        .merge(files::router(&served_root))
        .route_layer(middleware::from_fn(metrics::track_requests))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::state::{ServerState, StateCell};
    use crate::net::tracker::ActivityTracker;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use std::fs;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Fixture {
        _dir: TempDir,
        cell: StateCell,
        shutdown: Shutdown,
        router: Router,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "beta").unwrap();

        let cell = StateCell::new();
        cell.transition(ServerState::Running);
        let shutdown = Shutdown::new();
        let state = AppState {
            listing: ListingHandler::new(dir.path().to_path_buf(), 8, ActivityTracker::new()),
            shutdown: shutdown.clone(),
            server_state: cell.watch(),
        };

        Fixture {
            router: build_router(state),
            _dir: dir,
            cell,
            shutdown,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn lines(body: &str) -> Vec<String> {
        let mut lines: Vec<String> = body.lines().map(str::to_string).collect();
        lines.sort();
        lines
    }

    #[tokio::test]
    async fn health_is_empty_200_while_running() {
        let f = fixture();
        let (status, body) = send(&f.router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        f.cell.transition(ServerState::ShuttingDown);
        let (status, _) = send(&f.router, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn filelist_scenarios() {
        let f = fixture();

        let (status, body) = send(&f.router, Method::GET, "/filelist?type=file&recursive=yes").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines(&body), vec!["/a.txt", "/sub/b.txt"]);

        let (_, body) = send(&f.router, Method::GET, "/filelist?type=dir&recursive=yes").await;
        assert_eq!(lines(&body), vec!["/sub"]);

        let (_, body) = send(&f.router, Method::GET, "/filelist").await;
        assert_eq!(lines(&body), vec!["/a.txt", "/sub/b.txt"]);

        let (_, body) = send(&f.router, Method::GET, "/filelist?type=any&recursive=no").await;
        assert_eq!(lines(&body), vec!["/a.txt", "/sub"]);

        let (_, body) = send(&f.router, Method::GET, "/filelist?startswith=sub&type=any").await;
        assert_eq!(lines(&body), vec!["/sub", "/sub/b.txt"]);
    }

    #[tokio::test]
    async fn filelist_errors() {
        let f = fixture();

        let (status, body) = send(&f.router, Method::GET, "/filelist?type=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("type"));
        assert!(body.contains("bogus"));

        let (status, body) = send(&f.router, Method::GET, "/filelist?recursive=maybe").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("recursive"));

        let (status, _) = send(&f.router, Method::GET, "/filelist?startswith=does-not-exist").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&f.router, Method::GET, "/filelist?startswith=..").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn files_are_served_from_root() {
        let f = fixture();

        let (status, body) = send(&f.router, Method::GET, "/files/a.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alpha");

        let (status, body) = send(&f.router, Method::GET, "/files/sub/b.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "beta");

        let (status, _) = send(&f.router, Method::GET, "/files/missing.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn shutdown_signals_and_returns() {
        let f = fixture();
        assert!(!f.shutdown.is_triggered());

        let (status, body) = send(&f.router, Method::POST, "/shutdown").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "shutting down\n");
        assert!(f.shutdown.is_triggered());

        let (status, _) = send(&f.router, Method::GET, "/shutdown").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let f = fixture();
        let response = f
            .router
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));

        let response = f
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }
}
