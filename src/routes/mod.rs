use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod delivery;
pub mod doc;
pub mod farmers;
pub mod health;
pub mod maintenance;
pub mod orders;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/catalog", products::catalog_router())
        .nest("/orders", orders::router())
        .nest("/farmers", farmers::router())
        .nest("/delivery", delivery::router())
        .nest("/maintenance", maintenance::router())
}
