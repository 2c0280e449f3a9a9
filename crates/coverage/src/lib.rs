//! Coverage domain module.
//!
//! Joins stock totals with requirement totals per name and derives the deficit
//! that procurement has to close.

pub mod calculator;

pub use calculator::{CoverageQuery, CoverageRow, compute_coverage};
