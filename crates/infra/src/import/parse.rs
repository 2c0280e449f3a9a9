//! Row-level import policy: CSV table to typed records plus counters.

use mto_core::{SynonymTable, canonicalize_item, canonicalize_software, normalize_optional, normalize_whitespace};
use mto_inventory::{InventoryRecord, SoftwareInventoryRecord};
use mto_requirements::{RequirementRecord, SoftwareRequirementRecord};

use super::ImportError;
use super::table::CsvTable;

pub const INVENTORY_COLUMNS: &[&str] = &["item_name", "location", "qty_available"];
pub const REQUIREMENT_COLUMNS: &[&str] = &["item_name", "qty_required"];
pub const SOFTWARE_INVENTORY_COLUMNS: &[&str] = &["software_name", "location", "seats_available"];
pub const SOFTWARE_REQUIREMENT_COLUMNS: &[&str] = &["software_name", "seats_required"];

/// Records ready for the store plus parse-stage counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBatch<T> {
    pub records: Vec<T>,
    /// Data rows considered (rows without a name are not counted).
    pub rows: usize,
    pub skipped: usize,
}

impl<T> Default for ParsedBatch<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rows: 0,
            skipped: 0,
        }
    }
}

/// Integer, else decimal truncated toward zero, else zero.
pub fn parse_quantity(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    if let Ok(v) = raw.parse::<i64>() {
        return v;
    }
    match raw.replace(',', ".").parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Name and quantity column of one table kind.
struct Columns {
    name: &'static str,
    qty: &'static str,
}

/// Negative stock is counted and skipped; every other row is kept, including zero.
fn parse_stock<T>(
    table: &CsvTable,
    fields: Columns,
    canonical: impl Fn(&str) -> String,
    build: impl Fn(String, String, u64) -> Result<T, ImportError>,
) -> ParsedBatch<T> {
    let mut batch = ParsedBatch {
        rows: table.malformed,
        skipped: table.malformed,
        ..ParsedBatch::default()
    };

    for record in &table.records {
        let name = canonical(table.field(record, fields.name).unwrap_or_default());
        let location = normalize_whitespace(table.field(record, "location").unwrap_or_default());
        if name.is_empty() || location.is_empty() {
            continue;
        }
        batch.rows += 1;

        let qty = parse_quantity(table.field(record, fields.qty));
        let Ok(qty) = u64::try_from(qty) else {
            batch.skipped += 1;
            continue;
        };
        match build(name, location, qty) {
            Ok(row) => batch.records.push(row),
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid stock row");
                batch.skipped += 1;
            }
        }
    }
    batch
}

/// Negative demand is dropped without counting; zero demand is counted and skipped.
fn parse_demand<T>(
    table: &CsvTable,
    fields: Columns,
    canonical: impl Fn(&str) -> String,
    build: impl Fn(Option<String>, Option<String>, String, u64) -> Result<T, ImportError>,
) -> ParsedBatch<T> {
    let mut batch = ParsedBatch {
        rows: table.malformed,
        skipped: table.malformed,
        ..ParsedBatch::default()
    };

    for record in &table.records {
        let name = canonical(table.field(record, fields.name).unwrap_or_default());
        if name.is_empty() {
            continue;
        }
        let qty = parse_quantity(table.field(record, fields.qty));
        let Ok(qty) = u64::try_from(qty) else {
            continue;
        };
        batch.rows += 1;
        if qty == 0 {
            batch.skipped += 1;
            continue;
        }

        let discipline = normalize_optional(table.field(record, "discipline"));
        let lab = normalize_optional(table.field(record, "lab"));
        match build(discipline, lab, name, qty) {
            Ok(row) => batch.records.push(row),
            Err(e) => {
                tracing::warn!(error = %e, "skipping invalid requirement row");
                batch.skipped += 1;
            }
        }
    }
    batch
}

pub fn parse_inventory(
    bytes: &[u8],
    synonyms: &SynonymTable,
) -> Result<ParsedBatch<InventoryRecord>, ImportError> {
    let table = CsvTable::parse(bytes)?;
    table.require(INVENTORY_COLUMNS)?;
    Ok(parse_stock(
        &table,
        Columns {
            name: "item_name",
            qty: "qty_available",
        },
        |raw| canonicalize_item(raw, synonyms),
        |name, location, qty| Ok(InventoryRecord::new(name, location, qty)?),
    ))
}

pub fn parse_software_inventory(bytes: &[u8]) -> Result<ParsedBatch<SoftwareInventoryRecord>, ImportError> {
    let table = CsvTable::parse(bytes)?;
    table.require(SOFTWARE_INVENTORY_COLUMNS)?;
    Ok(parse_stock(
        &table,
        Columns {
            name: "software_name",
            qty: "seats_available",
        },
        canonicalize_software,
        |name, location, qty| Ok(SoftwareInventoryRecord::new(name, location, qty)?),
    ))
}

pub fn parse_requirements(
    bytes: &[u8],
    synonyms: &SynonymTable,
) -> Result<ParsedBatch<RequirementRecord>, ImportError> {
    let table = CsvTable::parse(bytes)?;
    table.require(REQUIREMENT_COLUMNS)?;
    Ok(parse_demand(
        &table,
        Columns {
            name: "item_name",
            qty: "qty_required",
        },
        |raw| canonicalize_item(raw, synonyms),
        |discipline, lab, name, qty| Ok(RequirementRecord::new(discipline, lab, name, qty)?),
    ))
}

pub fn parse_software_requirements(
    bytes: &[u8],
) -> Result<ParsedBatch<SoftwareRequirementRecord>, ImportError> {
    let table = CsvTable::parse(bytes)?;
    table.require(SOFTWARE_REQUIREMENT_COLUMNS)?;
    Ok(parse_demand(
        &table,
        Columns {
            name: "software_name",
            qty: "seats_required",
        },
        canonicalize_software,
        |discipline, lab, name, qty| {
            Ok(SoftwareRequirementRecord::new(discipline, lab, name, qty)?)
        },
    ))
}
