//! Storage boundary for inventory, requirement, and software tables.
//!
//! Every coverage computation reads one [`Snapshot`] taken atomically, and
//! every import is applied atomically, so a reader never observes half of an
//! import.

use std::sync::Arc;

use thiserror::Error;

use mto_inventory::{InventoryRecord, SoftwareInventoryRecord};
use mto_requirements::{RequirementRecord, SoftwareRequirementRecord};

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

/// Point-in-time copy of all tables.
///
/// Stock tables are ordered by `(name, location)`; requirement tables keep
/// import order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub inventory: Vec<InventoryRecord>,
    pub requirements: Vec<RequirementRecord>,
    pub software_inventory: Vec<SoftwareInventoryRecord>,
    pub software_requirements: Vec<SoftwareRequirementRecord>,
}

/// How a requirements import treats existing rows.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum WriteMode {
    #[default]
    Append,
    /// Clear the table, then insert, as one atomic step.
    Replace,
}

impl WriteMode {
    pub fn from_replace_flag(replace: bool) -> Self {
        if replace { WriteMode::Replace } else { WriteMode::Append }
    }

    pub fn is_replace(self) -> bool {
        self == WriteMode::Replace
    }
}

/// Result of merging stock rows (see `StockTable::upsert`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StockWrite {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("invalid stored data: {0}")]
    InvalidData(String),
}

/// Store for the coverage tables.
///
/// Implementations: [`InMemoryStore`] for tests/dev, `PostgresStore` (feature
/// `postgres`) for deployments.
#[async_trait::async_trait]
pub trait CoverageStore: Send + Sync {
    /// Cheap reachability probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn snapshot(&self) -> Result<Arc<Snapshot>, StoreError>;

    /// Merge equipment rows: known `(item, location)` pairs accumulate quantity.
    async fn append_inventory(&self, rows: Vec<InventoryRecord>) -> Result<StockWrite, StoreError>;

    async fn append_software_inventory(
        &self,
        rows: Vec<SoftwareInventoryRecord>,
    ) -> Result<StockWrite, StoreError>;

    /// Insert requirement rows; returns the number inserted.
    async fn write_requirements(
        &self,
        rows: Vec<RequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError>;

    async fn write_software_requirements(
        &self,
        rows: Vec<SoftwareRequirementRecord>,
        mode: WriteMode,
    ) -> Result<usize, StoreError>;
}
