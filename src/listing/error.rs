//! Listing request errors and their HTTP mapping.

use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::listing::walker::WalkError;

/// Failure of a listing request before or while it streams.
#[derive(Debug, Error)]
pub enum ListingError {
    /// A query parameter holds a value outside its domain.
    #[error("'{value}' is not a valid option for '{name}' parameter")]
    InvalidParameter { name: &'static str, value: String },

    /// `startswith` does not name an existing directory under the served root.
    #[error("'{start}' is not an existing directory")]
    InvalidStartPath { start: String },

    /// The walk root could not be read at all.
    #[error(transparent)]
    DirectoryAccess(WalkError),

    /// The output sink refused a write (client went away).
    #[error("listing output failed: {0}")]
    Sink(#[source] io::Error),
}

impl ListingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ListingError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            // A missing start directory is reported as a server-side condition.
            ListingError::InvalidStartPath { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ListingError::DirectoryAccess(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ListingError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ListingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Listing request failed");
        } else {
            tracing::debug!(error = %self, "Rejected listing request");
        }
        (status, format!("{}\n", self)).into_response()
    }
}
