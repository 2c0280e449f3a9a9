use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use mto_infra::Stats;

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    match services.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "db": "ok" }))),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "db": "unavailable" })),
            )
        }
    }
}

pub async fn stats(Extension(services): Extension<Arc<AppServices>>) -> Result<Json<Stats>, ApiError> {
    let snapshot = services.snapshot().await?;
    Ok(Json(Stats::from_snapshot(&snapshot)))
}
