//! Custom error types for the dashboard service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the dashboard service
#[derive(Error, Debug)]
pub enum DashboardError {
    /// No live subscription for the requested video
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            DashboardError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            DashboardError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for dashboard results
pub type DashboardResult<T> = Result<T, DashboardError>;
