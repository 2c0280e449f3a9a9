use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    routing::get,
    Json, Router,
};

use mto_infra::query::list_inventory;
use mto_infra::Page;
use mto_inventory::{InventoryRecord, stock_summary};

use crate::app::dto::{InventoryListQuery, InventorySummaryJson, RowsResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list))
        .route("/summary", get(summary))
}

/// List stock rows.
///
/// Query parameters:
/// - `item`, `location`: case-insensitive substring filters
/// - `limit`: 1..=2000 (default: 200)
/// - `offset`: default 0
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<InventoryListQuery>,
) -> Result<Json<Page<InventoryRecord>>, ApiError> {
    let pagination = query.pagination()?;
    let snapshot = services.snapshot().await?;
    Ok(Json(list_inventory(&snapshot, &query.filter(), pagination)))
}

pub async fn summary(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<RowsResponse<InventorySummaryJson>>, ApiError> {
    let snapshot = services.snapshot().await?;
    let rows: Vec<InventorySummaryJson> = stock_summary(&snapshot.inventory)
        .into_iter()
        .map(InventorySummaryJson::from)
        .collect();
    Ok(Json(RowsResponse { rows }))
}
