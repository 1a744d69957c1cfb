use crate::{auth::extractors::require_catalog_role, state::AppState};
use axum::{middleware, Router};

pub mod dto;
pub mod error;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Product routes behind the catalog role gate.
pub fn router(state: AppState) -> Router<AppState> {
    handlers::product_routes()
        .route_layer(middleware::from_fn_with_state(state, require_catalog_role))
}
