use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::get,
    Json, Router,
};

use mto_infra::query::list_requirements;
use mto_infra::Page;
use mto_requirements::{RequirementRecord, summary_by_discipline, summary_by_item};

use crate::app::dto::{
    RequirementListQuery, RequirementSummaryQuery, RequirementSummaryResponse, SummaryBy,
    SummaryRows,
};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/summary", get(summary))
}

/// List requirement rows.
///
/// Query parameters:
/// - `discipline`, `item`: case-insensitive substring filters
/// - `limit`: 1..=2000 (default: 200)
/// - `offset`: default 0
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<RequirementListQuery>,
) -> Result<Json<Page<RequirementRecord>>, ApiError> {
    let pagination = query.pagination()?;
    let snapshot = services.snapshot().await?;
    Ok(Json(list_requirements(&snapshot, &query.filter(), pagination)))
}

/// Plain sums of required quantity, `?by=item` (default) or `?by=discipline`.
pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<RequirementSummaryQuery>,
) -> Result<Json<RequirementSummaryResponse>, ApiError> {
    let by = query.by()?;
    let snapshot = services.snapshot().await?;
    let rows = match by {
        SummaryBy::Item => SummaryRows::Item(summary_by_item(&snapshot.requirements)),
        SummaryBy::Discipline => SummaryRows::Discipline(summary_by_discipline(&snapshot.requirements)),
    };
    Ok(Json(RequirementSummaryResponse { by: by.as_str(), rows }))
}
