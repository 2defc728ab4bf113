//! Raw file retrieval under `/files/`.
//!
//! Delegates to `ServeDir`, which resolves the remaining path under the
//! served root and refuses `..` segments.

use std::path::Path;

use axum::Router;
use tower_http::services::ServeDir;

/// Router serving `served_root` under `/files`.
pub fn router<S>(served_root: &Path) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    tracing::debug!(path = %served_root.display(), "Serving static files under /files");
    Router::new().nest_service("/files", ServeDir::new(served_root))
}
