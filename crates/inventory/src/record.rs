use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mto_core::{DomainError, DomainResult};

/// A stock row: some quantity of a named thing held at one location.
///
/// Implemented by equipment inventory and software seat inventory so both
/// share one aggregation path.
pub trait StockLine: Clone {
    fn name(&self) -> &str;
    fn location(&self) -> &str;
    fn available(&self) -> u64;
    fn add_available(&mut self, qty: u64);
}

/// Equipment held at one storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_name: String,
    pub location: String,
    pub qty_available: u64,
}

impl InventoryRecord {
    pub fn new(
        item_name: impl Into<String>,
        location: impl Into<String>,
        qty_available: u64,
    ) -> DomainResult<Self> {
        let item_name = item_name.into();
        let location = location.into();
        ensure_not_blank("item_name", &item_name)?;
        ensure_not_blank("location", &location)?;
        Ok(Self {
            item_name,
            location,
            qty_available,
        })
    }
}

impl StockLine for InventoryRecord {
    fn name(&self) -> &str {
        &self.item_name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn available(&self) -> u64 {
        self.qty_available
    }

    fn add_available(&mut self, qty: u64) {
        self.qty_available = self.qty_available.saturating_add(qty);
    }
}

/// Installed software seats at one location (classroom, lab, server).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareInventoryRecord {
    pub software_name: String,
    pub location: String,
    pub seats_available: u64,
}

impl SoftwareInventoryRecord {
    pub fn new(
        software_name: impl Into<String>,
        location: impl Into<String>,
        seats_available: u64,
    ) -> DomainResult<Self> {
        let software_name = software_name.into();
        let location = location.into();
        ensure_not_blank("software_name", &software_name)?;
        ensure_not_blank("location", &location)?;
        Ok(Self {
            software_name,
            location,
            seats_available,
        })
    }
}

impl StockLine for SoftwareInventoryRecord {
    fn name(&self) -> &str {
        &self.software_name
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn available(&self) -> u64 {
        self.seats_available
    }

    fn add_available(&mut self, qty: u64) {
        self.seats_available = self.seats_available.saturating_add(qty);
    }
}

fn ensure_not_blank(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Outcome of merging one row into a [`StockTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Stock rows keyed by `(name, location)`.
///
/// Re-importing a known pair accumulates its quantity instead of overwriting
/// it, so a CSV split across several files adds up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockTable<S: StockLine> {
    rows: BTreeMap<(String, String), S>,
}

impl<S: StockLine> Default for StockTable<S> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<S: StockLine> StockTable<S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&mut self, line: S) -> Upsert {
        let key = (line.name().to_string(), line.location().to_string());
        match self.rows.get_mut(&key) {
            Some(existing) => {
                existing.add_available(line.available());
                Upsert::Updated
            }
            None => {
                self.rows.insert(key, line);
                Upsert::Inserted
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by `(name, location)`.
    pub fn rows(&self) -> impl Iterator<Item = &S> {
        self.rows.values()
    }

    pub fn to_vec(&self) -> Vec<S> {
        self.rows.values().cloned().collect()
    }
}

impl<S: StockLine> FromIterator<S> for StockTable<S> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = StockTable::new();
        for line in iter {
            table.upsert(line);
        }
        table
    }
}
