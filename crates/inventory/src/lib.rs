//! Inventory domain module.
//!
//! Stock records (equipment and software seats) and the aggregation that turns
//! per-location rows into per-name totals. Pure logic: no IO, no HTTP, no storage.

pub mod aggregator;
pub mod record;

pub use aggregator::{NameTotal, available_for, stock_summary, totals_by_name};
pub use record::{InventoryRecord, SoftwareInventoryRecord, StockLine, StockTable, Upsert};
