use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use mto_core::DomainError;
use mto_infra::{ImportError, ReportError, StoreError};

/// Every failure a handler can return; rendered as `{"error": code, "detail": message}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Domain(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Import(e) => match e {
                ImportError::NotCsv => (StatusCode::BAD_REQUEST, "not_csv"),
                ImportError::MissingColumns(_) => (StatusCode::BAD_REQUEST, "missing_columns"),
                ImportError::Malformed(_) => (StatusCode::BAD_REQUEST, "malformed_csv"),
                ImportError::BadPath => (StatusCode::BAD_REQUEST, "bad_path"),
                ImportError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ImportError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
                ImportError::Domain(_) => (StatusCode::BAD_REQUEST, "validation_error"),
                ImportError::Store(e) => store_status(e),
            },
            ApiError::Store(e) => store_status(e),
            ApiError::Report(_) => (StatusCode::INTERNAL_SERVER_ERROR, "report_error"),
            // Body limit violations surface here as 413.
            ApiError::Multipart(e) => (e.status(), "invalid_multipart"),
        }
    }
}

fn store_status(err: &StoreError) -> (StatusCode, &'static str) {
    match err {
        StoreError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
        StoreError::InvalidData(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::debug!(error = %self, code, "request rejected");
        }
        json_error(status, code, self.to_string())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    detail: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "detail": detail.into(),
        })),
    )
        .into_response()
}
