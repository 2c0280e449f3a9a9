use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use mto_core::SynonymTable;
use mto_coverage::{CoverageQuery, CoverageRow, compute_coverage};
use mto_infra::{CoverageStore, ImportError, Importer, InMemoryStore, Snapshot, StoreError, load_synonyms};

use crate::config::ApiConfig;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to load synonyms: {0}")]
    Synonyms(#[from] ImportError),

    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),
}

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn CoverageStore>,
    importer: Importer,
    data_root: PathBuf,
    max_upload_bytes: usize,
}

impl std::fmt::Debug for AppServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppServices")
            .field("data_root", &self.data_root)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

impl AppServices {
    pub fn new(
        store: Arc<dyn CoverageStore>,
        synonyms: SynonymTable,
        data_root: impl Into<PathBuf>,
        max_upload_bytes: usize,
    ) -> Self {
        let importer = Importer::new(store.clone(), Arc::new(synonyms));
        Self {
            store,
            importer,
            data_root: data_root.into(),
            max_upload_bytes,
        }
    }

    /// In-memory wiring (dev/test).
    pub fn in_memory(config: &ApiConfig, synonyms: SynonymTable) -> Self {
        Self::new(
            Arc::new(InMemoryStore::new()),
            synonyms,
            config.data_root.clone(),
            config.max_upload_bytes,
        )
    }

    pub fn store(&self) -> &dyn CoverageStore {
        self.store.as_ref()
    }

    pub fn importer(&self) -> &Importer {
        &self.importer
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, StoreError> {
        self.store.snapshot().await
    }

    pub async fn coverage(&self, query: CoverageQuery) -> Result<Vec<CoverageRow>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(compute_coverage(&snapshot.inventory, &snapshot.requirements, query))
    }

    pub async fn software_coverage(&self, query: CoverageQuery) -> Result<Vec<CoverageRow>, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(compute_coverage(
            &snapshot.software_inventory,
            &snapshot.software_requirements,
            query,
        ))
    }
}

/// Wire services from configuration: Postgres when `DATABASE_URL` is set and the
/// `postgres` feature is enabled, otherwise in-memory.
pub async fn build_services(config: &ApiConfig) -> Result<AppServices, ServicesError> {
    let synonyms = match &config.synonyms_path {
        Some(path) => load_synonyms(path)?,
        None => SynonymTable::new(),
    };

    if let Some(url) = &config.database_url {
        #[cfg(feature = "postgres")]
        {
            let store = mto_infra::PostgresStore::connect(url).await?;
            tracing::info!("using postgres store");
            return Ok(AppServices::new(
                Arc::new(store),
                synonyms,
                config.data_root.clone(),
                config.max_upload_bytes,
            ));
        }
        #[cfg(not(feature = "postgres"))]
        {
            let _ = url;
            tracing::warn!("DATABASE_URL set but postgres feature not enabled, falling back to in-memory");
        }
    }

    tracing::info!("using in-memory store");
    Ok(AppServices::in_memory(config, synonyms))
}
