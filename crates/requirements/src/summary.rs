//! Requirement summaries (plain sums, independent of aggregation mode).

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::DemandLine;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTotal {
    pub item_name: String,
    pub qty_required: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisciplineTotal {
    pub discipline: Option<String>,
    pub item_name: String,
    pub qty_required: u64,
}

/// Σ required per item, largest first (ties by name).
pub fn summary_by_item<'a, D, I>(lines: I) -> Vec<ItemTotal>
where
    D: DemandLine + 'a,
    I: IntoIterator<Item = &'a D>,
{
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for line in lines {
        let entry = totals.entry(line.name()).or_default();
        *entry = entry.saturating_add(line.required());
    }

    let mut rows: Vec<ItemTotal> = totals
        .into_iter()
        .map(|(name, qty)| ItemTotal {
            item_name: name.to_string(),
            qty_required: qty,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.qty_required
            .cmp(&a.qty_required)
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    rows
}

/// Σ required per (discipline, item); disciplines ascending with unassigned
/// last, then largest total first.
pub fn summary_by_discipline<'a, D, I>(lines: I) -> Vec<DisciplineTotal>
where
    D: DemandLine + 'a,
    I: IntoIterator<Item = &'a D>,
{
    let mut totals: BTreeMap<(Option<&str>, &str), u64> = BTreeMap::new();
    for line in lines {
        let entry = totals.entry((line.discipline(), line.name())).or_default();
        *entry = entry.saturating_add(line.required());
    }

    let mut rows: Vec<DisciplineTotal> = totals
        .into_iter()
        .map(|((discipline, name), qty)| DisciplineTotal {
            discipline: discipline.map(str::to_string),
            item_name: name.to_string(),
            qty_required: qty,
        })
        .collect();
    rows.sort_by(|a, b| {
        nulls_last(a.discipline.as_deref(), b.discipline.as_deref())
            .then_with(|| b.qty_required.cmp(&a.qty_required))
            .then_with(|| a.item_name.cmp(&b.item_name))
    });
    rows
}

/// Ascending order with `None` after every `Some`.
pub fn nulls_last(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RequirementRecord;

    fn req(discipline: Option<&str>, item: &str, qty: u64) -> RequirementRecord {
        RequirementRecord::new(discipline.map(str::to_string), None, item, qty).unwrap()
    }

    #[test]
    fn by_item_sums_and_orders_by_total() {
        let rows = vec![
            req(Some("ТП"), "Монитор", 3),
            req(Some("БД"), "ПК", 10),
            req(None, "Монитор", 4),
            req(Some("ТП"), "Коммутатор", 7),
        ];
        let summary = summary_by_item(&rows);
        let flat: Vec<_> = summary
            .iter()
            .map(|r| (r.item_name.as_str(), r.qty_required))
            .collect();
        assert_eq!(flat, vec![("ПК", 10), ("Коммутатор", 7), ("Монитор", 7)]);
    }

    #[test]
    fn by_discipline_puts_unassigned_last() {
        let rows = vec![
            req(None, "ПК", 100),
            req(Some("ТП"), "ПК", 2),
            req(Some("ТП"), "Монитор", 5),
            req(Some("БД"), "ПК", 1),
            req(Some("ТП"), "ПК", 1),
        ];
        let summary = summary_by_discipline(&rows);
        let flat: Vec<_> = summary
            .iter()
            .map(|r| (r.discipline.as_deref(), r.item_name.as_str(), r.qty_required))
            .collect();
        assert_eq!(
            flat,
            vec![
                (Some("БД"), "ПК", 1),
                (Some("ТП"), "Монитор", 5),
                (Some("ТП"), "ПК", 3),
                (None, "ПК", 100),
            ]
        );
    }
}
