//! `mto-core`: shared building blocks for the MTO coverage service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod names;

pub use error::{DomainError, DomainResult};
pub use id::ImportBatchId;
pub use names::{SynonymTable, canonicalize_item, canonicalize_software, normalize_optional, normalize_whitespace};
