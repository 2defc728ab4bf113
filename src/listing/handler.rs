//! HTTP adapter for the listing engine.
//!
//! The walk runs on the blocking pool and hands each line to the response
//! body through a bounded channel. A full channel blocks the walker, so a
//! slow client applies backpressure instead of growing server memory. A
//! dropped body closes the channel and the next write aborts the walk.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::http::server::AppState;
use crate::listing::error::ListingError;
use crate::listing::request::{ListingQuery, ListingRequest};
use crate::net::tracker::ActivityTracker;
use crate::observability::metrics;

/// Raw `/filelist` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    #[serde(rename = "type")]
    pub file_type: Option<String>,
    pub recursive: Option<String>,
    pub startswith: Option<String>,
}

impl ListingParams {
    /// Apply defaults for absent parameters and validate.
    pub fn into_query(self) -> Result<ListingQuery, ListingError> {
        ListingQuery::parse(
            self.file_type.as_deref().unwrap_or("file"),
            self.recursive.as_deref().unwrap_or("yes"),
            self.startswith.as_deref().unwrap_or(""),
        )
    }
}

/// Serves listings of one served root.
#[derive(Clone)]
pub struct ListingHandler {
    served_root: Arc<PathBuf>,
    channel_capacity: usize,
    activity: ActivityTracker,
}

impl ListingHandler {
    pub fn new(served_root: PathBuf, channel_capacity: usize, activity: ActivityTracker) -> Self {
        Self {
            served_root: Arc::new(served_root),
            channel_capacity: channel_capacity.max(1),
            activity,
        }
    }

    pub fn served_root(&self) -> &Path {
        &self.served_root
    }

    /// Validate, open, and start streaming a listing.
    ///
    /// Validation and root failures are answered with a status code. Once the
    /// stream starts the status is committed as 200 and later problems are
    /// only logged.
    pub async fn serve(&self, params: ListingParams) -> Response {
        let query = match params.into_query() {
            Ok(query) => query,
            Err(err) => return err.into_response(),
        };

        let request = ListingRequest::new(self.served_root.as_ref().clone(), query);
        let listing = match tokio::task::spawn_blocking(move || request.open()).await {
            Ok(Ok(listing)) => listing,
            Ok(Err(err)) => return err.into_response(),
            Err(join_err) => {
                tracing::error!(error = %join_err, "Listing task failed");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(self.channel_capacity);
        let guard = self.activity.track();
        let file_type = listing.file_type();

        tokio::task::spawn_blocking(move || {
            let mut sink = ChannelSink { tx };
            match listing.write_to(&mut sink) {
                Ok(lines) => {
                    metrics::record_listing_lines(file_type.as_str(), lines);
                    tracing::debug!(listing_id = %guard.id(), lines, "Listing complete");
                }
                Err(err) => {
                    metrics::record_listing_aborted();
                    tracing::debug!(listing_id = %guard.id(), error = %err, "Listing aborted");
                }
            }
        });

        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(Body::from_stream(ReceiverStream::new(rx)))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}

/// `Write` adapter that forwards every write as one body chunk.
struct ChannelSink {
    tx: mpsc::Sender<io::Result<Bytes>>,
}

impl Write for ChannelSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.tx
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "listing client disconnected"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// GET /filelist
pub async fn filelist(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Response {
    state.listing.serve(params).await
}
