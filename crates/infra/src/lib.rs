//! Infrastructure layer: storage backends, CSV import, listings, and report export.

pub mod import;
pub mod query;
pub mod reports;
pub mod store;
pub mod synonyms;

pub use import::{ImportError, ImportKind, ImportSummary, Importer};
pub use query::{InventoryFilter, Page, Pagination, RequirementFilter, Stats};
pub use reports::{ReportError, ReportKind, render_coverage_csv};
pub use store::{CoverageStore, InMemoryStore, Snapshot, StockWrite, StoreError, WriteMode};
pub use synonyms::load_synonyms;

#[cfg(feature = "postgres")]
pub use store::PostgresStore;
