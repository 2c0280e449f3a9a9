//! CSV import: parse uploads into typed rows, then apply them to the store atomically.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use mto_core::{DomainError, ImportBatchId, SynonymTable};

use crate::store::{CoverageStore, StockWrite, StoreError, WriteMode};

pub mod parse;
mod table;

pub use parse::{
    ParsedBatch, parse_inventory, parse_quantity, parse_requirements, parse_software_inventory,
    parse_software_requirements,
};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Upload a .csv file")]
    NotCsv,

    #[error("CSV missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error("malformed CSV: {0}")]
    Malformed(String),

    #[error("Bad path (outside data root)")]
    BadPath,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The four importable tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImportKind {
    Inventory,
    Requirements,
    SoftwareInventory,
    SoftwareRequirements,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Inventory => "inventory",
            ImportKind::Requirements => "requirements",
            ImportKind::SoftwareInventory => "software_inventory",
            ImportKind::SoftwareRequirements => "software_requirements",
        }
    }
}

/// Result of one import, returned to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub ok: bool,
    pub batch_id: ImportBatchId,
    pub imported_at: DateTime<Utc>,
    pub rows: usize,
    pub inserted: usize,
    /// Stock imports only: existing `(name, location)` pairs that accumulated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
    pub skipped: usize,
    /// Requirement imports only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
    /// Server-side path imports only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ImportSummary {
    fn new(rows: usize, inserted: usize, skipped: usize) -> Self {
        Self {
            ok: true,
            batch_id: ImportBatchId::new(),
            imported_at: Utc::now(),
            rows,
            inserted,
            updated: None,
            skipped,
            replace: None,
            path: None,
        }
    }

    fn stock(rows: usize, skipped: usize, write: StockWrite) -> Self {
        Self {
            updated: Some(write.updated),
            ..Self::new(rows, write.inserted, skipped)
        }
    }

    fn demand(rows: usize, skipped: usize, inserted: usize, mode: WriteMode) -> Self {
        Self {
            replace: Some(mode.is_replace()),
            ..Self::new(rows, inserted, skipped)
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Only `.csv` uploads are accepted (case-insensitive extension).
pub fn ensure_csv_filename(filename: Option<&str>) -> Result<(), ImportError> {
    let is_csv = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv { Ok(()) } else { Err(ImportError::NotCsv) }
}

/// Resolve `rel_path` under `root`, refusing anything that escapes it.
pub async fn resolve_data_path(root: &Path, rel_path: &str) -> Result<PathBuf, ImportError> {
    let rel = Path::new(rel_path);
    let escapes = rel.components().any(|c| {
        matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_))
    });
    if rel_path.trim().is_empty() || escapes {
        return Err(ImportError::BadPath);
    }

    let full = root.join(rel);
    let resolved = match tokio::fs::canonicalize(&full).await {
        Ok(path) => path,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ImportError::NotFound(rel_path.to_string()));
        }
        Err(e) => {
            return Err(ImportError::Io {
                path: rel_path.to_string(),
                message: e.to_string(),
            });
        }
    };
    let root = tokio::fs::canonicalize(root).await.map_err(|e| ImportError::Io {
        path: root.display().to_string(),
        message: e.to_string(),
    })?;

    // Symlinks inside the root may still point elsewhere.
    if !resolved.starts_with(&root) {
        return Err(ImportError::BadPath);
    }
    let is_file = tokio::fs::metadata(&resolved)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(ImportError::NotFound(rel_path.to_string()));
    }
    Ok(resolved)
}

/// Parses CSV payloads and applies them to a [`CoverageStore`].
#[derive(Clone)]
pub struct Importer {
    store: Arc<dyn CoverageStore>,
    synonyms: Arc<SynonymTable>,
}

impl std::fmt::Debug for Importer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Importer")
            .field("synonyms", &self.synonyms.len())
            .finish_non_exhaustive()
    }
}

impl Importer {
    pub fn new(store: Arc<dyn CoverageStore>, synonyms: Arc<SynonymTable>) -> Self {
        Self { store, synonyms }
    }

    pub async fn import_inventory(&self, bytes: &[u8]) -> Result<ImportSummary, ImportError> {
        let ParsedBatch { records, rows, skipped } = parse_inventory(bytes, &self.synonyms)?;
        let write = self.store.append_inventory(records).await?;
        let summary = ImportSummary::stock(rows, skipped, write);
        log_summary(ImportKind::Inventory, &summary);
        Ok(summary)
    }

    pub async fn import_software_inventory(&self, bytes: &[u8]) -> Result<ImportSummary, ImportError> {
        let ParsedBatch { records, rows, skipped } = parse_software_inventory(bytes)?;
        let write = self.store.append_software_inventory(records).await?;
        let summary = ImportSummary::stock(rows, skipped, write);
        log_summary(ImportKind::SoftwareInventory, &summary);
        Ok(summary)
    }

    pub async fn import_requirements(
        &self,
        bytes: &[u8],
        mode: WriteMode,
    ) -> Result<ImportSummary, ImportError> {
        let ParsedBatch { records, rows, skipped } = parse_requirements(bytes, &self.synonyms)?;
        let inserted = self.store.write_requirements(records, mode).await?;
        let summary = ImportSummary::demand(rows, skipped, inserted, mode);
        log_summary(ImportKind::Requirements, &summary);
        Ok(summary)
    }

    pub async fn import_software_requirements(
        &self,
        bytes: &[u8],
        mode: WriteMode,
    ) -> Result<ImportSummary, ImportError> {
        let ParsedBatch { records, rows, skipped } = parse_software_requirements(bytes)?;
        let inserted = self.store.write_software_requirements(records, mode).await?;
        let summary = ImportSummary::demand(rows, skipped, inserted, mode);
        log_summary(ImportKind::SoftwareRequirements, &summary);
        Ok(summary)
    }

    /// Import a `.csv` file that lives under `root`.
    pub async fn import_file(
        &self,
        kind: ImportKind,
        root: &Path,
        rel_path: &str,
        mode: WriteMode,
    ) -> Result<ImportSummary, ImportError> {
        let path = resolve_data_path(root, rel_path).await?;
        ensure_csv_filename(path.file_name().and_then(|n| n.to_str()))?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| ImportError::Io {
            path: rel_path.to_string(),
            message: e.to_string(),
        })?;

        let summary = match kind {
            ImportKind::Inventory => self.import_inventory(&bytes).await?,
            ImportKind::SoftwareInventory => self.import_software_inventory(&bytes).await?,
            ImportKind::Requirements => self.import_requirements(&bytes, mode).await?,
            ImportKind::SoftwareRequirements => {
                self.import_software_requirements(&bytes, mode).await?
            }
        };
        Ok(summary.with_path(rel_path))
    }
}

fn log_summary(kind: ImportKind, summary: &ImportSummary) {
    tracing::info!(
        kind = kind.as_str(),
        batch_id = %summary.batch_id,
        rows = summary.rows,
        inserted = summary.inserted,
        updated = summary.updated.unwrap_or(0),
        skipped = summary.skipped,
        replace = summary.replace.unwrap_or(false),
        "import applied"
    );
}
