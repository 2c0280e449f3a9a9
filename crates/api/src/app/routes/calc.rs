use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::get,
    Json, Router,
};

use crate::app::dto::{
    self, CoverageParams, CoverageResponse, ItemCoverageJson, SoftwareCoverageJson,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/coverage", get(coverage))
        .route("/software-coverage", get(software_coverage))
}

/// Equipment coverage.
///
/// Query parameters:
/// - `only_deficit`: drop fully covered items (default: true)
/// - `mode`: `sum` or `max_per_lab` (default: sum)
pub async fn coverage(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CoverageParams>,
) -> Result<Json<CoverageResponse<ItemCoverageJson>>, ApiError> {
    let query = params.to_query()?;
    let rows = services.coverage(query).await?;
    tracing::debug!(mode = %query.mode, only_deficit = query.only_deficit, rows = rows.len(), "coverage computed");
    Ok(Json(dto::coverage_response(query, rows)))
}

/// Software seat coverage; same parameters as [`coverage`].
pub async fn software_coverage(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CoverageParams>,
) -> Result<Json<CoverageResponse<SoftwareCoverageJson>>, ApiError> {
    let query = params.to_query()?;
    let rows = services.software_coverage(query).await?;
    Ok(Json(dto::coverage_response(query, rows)))
}
