//! Read-only HTTP API over the stored TFT reference data.
//!
//! Handlers never touch SQLite directly. Every route calls into a
//! [`tft_core::Catalog`] on Tokio's blocking pool.
#![forbid(unsafe_code)]

mod error;
mod handlers;
mod routes;
mod server;

pub use error::{ApiError, ErrorResponse, HealthResponse};
pub use handlers::AppState;
pub use routes::{RouterOptions, create_router};
pub use server::{ServeError, serve};
