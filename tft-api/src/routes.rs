//! Route table and middleware.

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, AppState};

/// Switches applied when building the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Allow any origin, method, and header.
    pub cors: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { cors: true }
    }
}

/// Build the API router.
pub fn create_router(state: AppState, options: RouterOptions) -> Router {
    let api = Router::new()
        .route("/champions", get(handlers::list_champions))
        .route("/champions/:name", get(handlers::get_champion))
        .route("/compositions/:trait", get(handlers::get_composition))
        .route("/traits", get(handlers::list_traits))
        .route("/items", get(handlers::list_items))
        .route("/augments", get(handlers::list_augments))
        .route("/sets", get(handlers::list_sets));

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api)
        .with_state(state);

    if options.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }
    app.layer(TraceLayer::new_for_http())
}
