use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Extension, Multipart, Query},
    routing::post,
    Json, Router,
};

use mto_infra::import::ensure_csv_filename;
use mto_infra::{ImportKind, ImportSummary, WriteMode};

use crate::app::dto::{FromPathQuery, ReplaceQuery};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

const FILE_FIELD: &str = "file";

pub fn router() -> Router {
    Router::new()
        .route("/inventory", post(import_inventory))
        .route("/requirements", post(import_requirements))
        .route("/software-inventory", post(import_software_inventory))
        .route("/software-requirements", post(import_software_requirements))
        .route("/inventory-from-path", post(inventory_from_path))
        .route("/requirements-from-path", post(requirements_from_path))
}

/// Read the `.csv` upload from the multipart `file` field.
async fn read_csv_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<u8>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        ensure_csv_filename(field.file_name())?;
        let bytes = field.bytes().await?;
        return Ok(bytes.to_vec());
    }
    Err(ApiError::bad_request("multipart field 'file' is required"))
}

pub async fn import_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let bytes = read_csv_upload(multipart).await?;
    Ok(Json(services.importer().import_inventory(&bytes).await?))
}

/// `?replace=true` clears existing requirements in the same step.
pub async fn import_requirements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReplaceQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let mode = query.write_mode()?;
    let bytes = read_csv_upload(multipart).await?;
    Ok(Json(services.importer().import_requirements(&bytes, mode).await?))
}

pub async fn import_software_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let bytes = read_csv_upload(multipart).await?;
    Ok(Json(services.importer().import_software_inventory(&bytes).await?))
}

pub async fn import_software_requirements(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReplaceQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImportSummary>, ApiError> {
    let mode = query.write_mode()?;
    let bytes = read_csv_upload(multipart).await?;
    Ok(Json(
        services
            .importer()
            .import_software_requirements(&bytes, mode)
            .await?,
    ))
}

/// Import a file already on the server, relative to the data root.
pub async fn inventory_from_path(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<FromPathQuery>,
) -> Result<Json<ImportSummary>, ApiError> {
    let rel_path = query.rel_path()?;
    let summary = services
        .importer()
        .import_file(ImportKind::Inventory, services.data_root(), rel_path, WriteMode::Append)
        .await?;
    Ok(Json(summary))
}

pub async fn requirements_from_path(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<FromPathQuery>,
) -> Result<Json<ImportSummary>, ApiError> {
    let rel_path = query.rel_path()?;
    let mode = query.write_mode()?;
    let summary = services
        .importer()
        .import_file(ImportKind::Requirements, services.data_root(), rel_path, mode)
        .await?;
    Ok(Json(summary))
}
