use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use mto_infra::{ReportKind, render_coverage_csv};

use crate::app::dto::CoverageParams;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/procurement.csv", get(procurement))
        .route("/software_coverage.csv", get(software_coverage))
}

pub async fn procurement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CoverageParams>,
) -> Result<Response, ApiError> {
    let query = params.to_query()?;
    let rows = services.coverage(query).await?;
    let body = render_coverage_csv(ReportKind::Procurement, &rows)?;
    Ok(csv_download(ReportKind::Procurement, body))
}

pub async fn software_coverage(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<CoverageParams>,
) -> Result<Response, ApiError> {
    let query = params.to_query()?;
    let rows = services.software_coverage(query).await?;
    let body = render_coverage_csv(ReportKind::SoftwareCoverage, &rows)?;
    Ok(csv_download(ReportKind::SoftwareCoverage, body))
}

fn csv_download(kind: ReportKind, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, kind.content_disposition()),
        ],
        body,
    )
        .into_response()
}
