use axum::{routing::get, Router};

pub mod calc;
pub mod imports;
pub mod inventory;
pub mod reports;
pub mod requirements;
pub mod system;

/// Router for all endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/stats", get(system::stats))
        .nest("/inventory", inventory::router())
        .nest("/requirements", requirements::router())
        .nest("/calc", calc::router())
        .nest("/reports", reports::router())
        .nest("/import", imports::router())
}
