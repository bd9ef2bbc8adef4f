//! Error bodies and their status mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;
use serde::Serialize;
use thiserror::Error;
use tft_core::CatalogError;
use tokio::task::JoinError;

/// JSON body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code, e.g. `NOT_FOUND`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Failures a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{what} not found")]
    NotFound { what: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("query task failed: {0}")]
    Join(#[from] JoinError),
}

impl ApiError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound { what } => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::not_found(format!("{what} not found"))),
            )
                .into_response(),
            Self::Catalog(err) => {
                error!("catalog query failed: {err}: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new(
                        "CATALOG_ERROR",
                        "failed to read reference data",
                    )),
                )
                    .into_response()
            }
            Self::Join(err) => {
                error!("catalog query task failed: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error("query task failed")),
                )
                    .into_response()
            }
        }
    }
}
