//! Requirements domain module.
//!
//! What each discipline needs in each lab, and how those needs add up to a
//! single required quantity per item under the two aggregation modes.

pub mod aggregator;
pub mod mode;
pub mod record;
pub mod summary;

pub use aggregator::{required_for, totals_by_name};
pub use mode::AggregationMode;
pub use record::{DemandLine, RequirementRecord, SoftwareRequirementRecord};
pub use summary::{DisciplineTotal, ItemTotal, nulls_last, summary_by_discipline, summary_by_item};
