//! Read-side listings over a store snapshot: filtered, ordered, paginated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use mto_core::{DomainError, DomainResult};
use mto_inventory::InventoryRecord;
use mto_requirements::{RequirementRecord, nulls_last};

use crate::store::Snapshot;

pub const DEFAULT_LIMIT: u32 = 200;
pub const MAX_LIMIT: u32 = 2000;

/// Pagination parameters for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of rows to return (1..=2000).
    pub limit: u32,
    /// Offset for pagination (0-based).
    pub offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Out-of-range limits are rejected rather than clamped.
    pub fn new(limit: Option<u32>, offset: Option<u64>) -> DomainResult<Self> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(DomainError::validation(format!(
                "limit must be between 1 and {MAX_LIMIT} (got {limit})"
            )));
        }
        Ok(Self {
            limit,
            offset: offset.unwrap_or(0),
        })
    }

    fn apply<T>(&self, rows: Vec<T>) -> Page<T> {
        let total = rows.len();
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let rows = rows
            .into_iter()
            .skip(offset)
            .take(self.limit as usize)
            .collect();
        Page {
            total,
            limit: self.limit,
            offset: self.offset,
            rows,
        }
    }
}

/// One page of a listing plus the filtered total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub total: usize,
    pub limit: u32,
    pub offset: u64,
    pub rows: Vec<T>,
}

/// Case-insensitive substring filters for `/inventory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub item: Option<String>,
    pub location: Option<String>,
}

/// Case-insensitive substring filters for `/requirements`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequirementFilter {
    pub discipline: Option<String>,
    pub item: Option<String>,
}

/// Lowercased needle; blank filters match everything.
fn needle(filter: &Option<String>) -> Option<String> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn matches(haystack: Option<&str>, needle: &Option<String>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.is_some_and(|h| h.to_lowercase().contains(n.as_str())),
    }
}

/// Inventory rows ordered by location, then item.
pub fn list_inventory(
    snapshot: &Snapshot,
    filter: &InventoryFilter,
    pagination: Pagination,
) -> Page<InventoryRecord> {
    let item = needle(&filter.item);
    let location = needle(&filter.location);

    let mut rows: Vec<InventoryRecord> = snapshot
        .inventory
        .iter()
        .filter(|r| matches(Some(r.item_name.as_str()), &item) && matches(Some(r.location.as_str()), &location))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        a.location
            .cmp(&b.location)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    pagination.apply(rows)
}

/// Requirement rows ordered by discipline (absent last), then item; import order breaks ties.
pub fn list_requirements(
    snapshot: &Snapshot,
    filter: &RequirementFilter,
    pagination: Pagination,
) -> Page<RequirementRecord> {
    let discipline = needle(&filter.discipline);
    let item = needle(&filter.item);

    let mut rows: Vec<RequirementRecord> = snapshot
        .requirements
        .iter()
        .filter(|r| matches(r.discipline.as_deref(), &discipline) && matches(Some(r.item_name.as_str()), &item))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        nulls_last(a.discipline.as_deref(), b.discipline.as_deref())
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    pagination.apply(rows)
}

/// Table-level counters for `/stats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Distinct item names across inventory and requirements.
    pub items: usize,
    /// Distinct inventory locations.
    pub locations: usize,
    pub inventory_rows: usize,
    pub qty_sum: u64,
    pub requirements_rows: usize,
    pub requirements_sum: u64,
    pub software_rows: usize,
    pub software_requirements_rows: usize,
}

impl Stats {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let items: BTreeSet<&str> = snapshot
            .inventory
            .iter()
            .map(|r| r.item_name.as_str())
            .chain(snapshot.requirements.iter().map(|r| r.item_name.as_str()))
            .collect();
        let locations: BTreeSet<&str> = snapshot
            .inventory
            .iter()
            .map(|r| r.location.as_str())
            .collect();

        Self {
            items: items.len(),
            locations: locations.len(),
            inventory_rows: snapshot.inventory.len(),
            qty_sum: snapshot
                .inventory
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.qty_available)),
            requirements_rows: snapshot.requirements.len(),
            requirements_sum: snapshot
                .requirements
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.qty_required)),
            software_rows: snapshot.software_inventory.len(),
            software_requirements_rows: snapshot.software_requirements.len(),
        }
    }
}
