use serde::{Deserialize, Serialize};

use mto_coverage::{CoverageQuery, CoverageRow};
use mto_infra::{InventoryFilter, Pagination, RequirementFilter, WriteMode};
use mto_inventory::NameTotal;
use mto_requirements::{AggregationMode, DisciplineTotal, ItemTotal};

use crate::app::errors::ApiError;

// -------------------------
// Query-string DTOs
// -------------------------
//
// Numeric and boolean parameters arrive as strings and are parsed here so that
// bad values produce the same JSON error body as every other validation failure.

#[derive(Debug, Default, Deserialize)]
pub struct InventoryListQuery {
    pub item: Option<String>,
    pub location: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl InventoryListQuery {
    pub fn filter(&self) -> InventoryFilter {
        InventoryFilter {
            item: self.item.clone(),
            location: self.location.clone(),
        }
    }

    pub fn pagination(&self) -> Result<Pagination, ApiError> {
        pagination(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RequirementListQuery {
    pub discipline: Option<String>,
    pub item: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl RequirementListQuery {
    pub fn filter(&self) -> RequirementFilter {
        RequirementFilter {
            discipline: self.discipline.clone(),
            item: self.item.clone(),
        }
    }

    pub fn pagination(&self) -> Result<Pagination, ApiError> {
        pagination(self.limit.as_deref(), self.offset.as_deref())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SummaryBy {
    Item,
    Discipline,
}

impl SummaryBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryBy::Item => "item",
            SummaryBy::Discipline => "discipline",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RequirementSummaryQuery {
    pub by: Option<String>,
}

impl RequirementSummaryQuery {
    pub fn by(&self) -> Result<SummaryBy, ApiError> {
        match self.by.as_deref().map(str::trim) {
            None | Some("") | Some("item") => Ok(SummaryBy::Item),
            Some("discipline") => Ok(SummaryBy::Discipline),
            Some(other) => Err(ApiError::bad_request(format!(
                "by must be one of: item, discipline (got '{other}')"
            ))),
        }
    }
}

/// `?only_deficit=&mode=` for coverage and reports.
#[derive(Debug, Default, Deserialize)]
pub struct CoverageParams {
    pub only_deficit: Option<String>,
    pub mode: Option<String>,
}

impl CoverageParams {
    pub fn to_query(&self) -> Result<CoverageQuery, ApiError> {
        let defaults = CoverageQuery::default();
        let only_deficit = match self.only_deficit.as_deref() {
            None => defaults.only_deficit,
            Some(raw) => parse_bool("only_deficit", raw)?,
        };
        let mode = match self.mode.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
            None => defaults.mode,
            Some(raw) => raw.parse::<AggregationMode>()?,
        };
        Ok(CoverageQuery { mode, only_deficit })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplaceQuery {
    pub replace: Option<String>,
}

impl ReplaceQuery {
    pub fn write_mode(&self) -> Result<WriteMode, ApiError> {
        write_mode(self.replace.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FromPathQuery {
    pub rel_path: Option<String>,
    pub replace: Option<String>,
}

impl FromPathQuery {
    pub fn rel_path(&self) -> Result<&str, ApiError> {
        self.rel_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("rel_path is required"))
    }

    pub fn write_mode(&self) -> Result<WriteMode, ApiError> {
        write_mode(self.replace.as_deref())
    }
}

fn write_mode(raw: Option<&str>) -> Result<WriteMode, ApiError> {
    match raw {
        None => Ok(WriteMode::Append),
        Some(raw) => Ok(WriteMode::from_replace_flag(parse_bool("replace", raw)?)),
    }
}

fn pagination(limit: Option<&str>, offset: Option<&str>) -> Result<Pagination, ApiError> {
    let limit = limit
        .map(|raw| {
            raw.trim()
                .parse::<u32>()
                .map_err(|_| ApiError::bad_request(format!("limit must be an integer between 1 and 2000 (got '{raw}')")))
        })
        .transpose()?;
    let offset = offset
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|_| ApiError::bad_request(format!("offset must be a non-negative integer (got '{raw}')")))
        })
        .transpose()?;
    Ok(Pagination::new(limit, offset)?)
}

/// Accepts the spellings browsers and scripts commonly send.
pub fn parse_bool(name: &str, raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ApiError::bad_request(format!("{name} must be a boolean (got '{raw}')"))),
    }
}

// -------------------------
// Response mapping
// -------------------------

#[derive(Debug, Serialize)]
pub struct CoverageResponse<R> {
    pub only_deficit: bool,
    pub mode: AggregationMode,
    pub rows: Vec<R>,
}

#[derive(Debug, Serialize)]
pub struct ItemCoverageJson {
    pub item_name: String,
    pub qty_required: u64,
    pub qty_available: u64,
    pub deficit: u64,
}

impl From<CoverageRow> for ItemCoverageJson {
    fn from(row: CoverageRow) -> Self {
        Self {
            item_name: row.name,
            qty_required: row.required,
            qty_available: row.available,
            deficit: row.deficit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SoftwareCoverageJson {
    pub software_name: String,
    pub seats_required: u64,
    pub seats_available: u64,
    pub deficit: u64,
}

impl From<CoverageRow> for SoftwareCoverageJson {
    fn from(row: CoverageRow) -> Self {
        Self {
            software_name: row.name,
            seats_required: row.required,
            seats_available: row.available,
            deficit: row.deficit,
        }
    }
}

pub fn coverage_response<R: From<CoverageRow>>(
    query: CoverageQuery,
    rows: Vec<CoverageRow>,
) -> CoverageResponse<R> {
    CoverageResponse {
        only_deficit: query.only_deficit,
        mode: query.mode,
        rows: rows.into_iter().map(R::from).collect(),
    }
}

#[derive(Debug, Serialize)]
pub struct RowsResponse<R> {
    pub rows: Vec<R>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SummaryRows {
    Item(Vec<ItemTotal>),
    Discipline(Vec<DisciplineTotal>),
}

#[derive(Debug, Serialize)]
pub struct RequirementSummaryResponse {
    pub by: &'static str,
    pub rows: SummaryRows,
}

#[derive(Debug, Serialize)]
pub struct InventorySummaryJson {
    pub item_name: String,
    pub qty_total: u64,
}

impl From<NameTotal> for InventorySummaryJson {
    fn from(t: NameTotal) -> Self {
        Self {
            item_name: t.name,
            qty_total: t.total,
        }
    }
}
