use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced by the catalog handlers and the persistence gateway.
///
/// The Display strings of the recoverable variants are the literal response
/// bodies existing API consumers match on, so they must not be reworded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("Invalid book ID")]
    InvalidBookId,

    #[error("no book exists")]
    NoBookExists,

    #[error("store failure: {0}")]
    Store(#[from] libsql::Error),

    #[error("corrupt comments payload: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl CatalogError {
    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogError::MissingField(_) | CatalogError::InvalidBookId | CatalogError::NoBookExists
        )
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        if self.is_recoverable() {
            // Validation and lookup misses go out as a plain text body on a
            // success status; that is the contract the upstream clients of
            // this API were built against.
            (StatusCode::OK, self.to_string()).into_response()
        } else {
            tracing::error!("catalog store failure: {}", crate::unpack_error(&self));
            (StatusCode::INTERNAL_SERVER_ERROR, "internal server error").into_response()
        }
    }
}
