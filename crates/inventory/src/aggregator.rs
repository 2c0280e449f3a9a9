//! Inventory aggregation: per-location rows to per-name totals.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::StockLine;

/// Total available quantity for one name across all locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameTotal {
    pub name: String,
    pub total: u64,
}

/// Sum of available quantity for `name` over every location.
///
/// A name with no stock rows has zero available; that is not an error.
pub fn available_for<'a, S, I>(lines: I, name: &str) -> u64
where
    S: StockLine + 'a,
    I: IntoIterator<Item = &'a S>,
{
    lines
        .into_iter()
        .filter(|l| l.name() == name)
        .fold(0u64, |acc, l| acc.saturating_add(l.available()))
}

/// Available totals for every name that has at least one stock row.
pub fn totals_by_name<'a, S, I>(lines: I) -> BTreeMap<String, u64>
where
    S: StockLine + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for line in lines {
        let entry = totals.entry(line.name().to_string()).or_default();
        *entry = entry.saturating_add(line.available());
    }
    totals
}

/// Per-name totals, largest first (ties by name).
pub fn stock_summary<'a, S, I>(lines: I) -> Vec<NameTotal>
where
    S: StockLine + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut rows: Vec<NameTotal> = totals_by_name(lines)
        .into_iter()
        .map(|(name, total)| NameTotal { name, total })
        .collect();
    rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{InventoryRecord, SoftwareInventoryRecord};
    use proptest::prelude::*;

    fn rec(item: &str, loc: &str, qty: u64) -> InventoryRecord {
        InventoryRecord::new(item, loc, qty).unwrap()
    }

    #[test]
    fn sums_across_locations() {
        let rows = vec![rec("A", "loc1", 5), rec("A", "loc2", 3), rec("B", "loc1", 7)];
        assert_eq!(available_for(&rows, "A"), 8);
        assert_eq!(available_for(&rows, "B"), 7);
    }

    #[test]
    fn unknown_item_has_nothing_available() {
        let rows = vec![rec("A", "loc1", 5)];
        assert_eq!(available_for(&rows, "Z"), 0);
        assert_eq!(available_for(Vec::<InventoryRecord>::new().iter(), "A"), 0);
    }

    #[test]
    fn software_seats_aggregate_the_same_way() {
        let rows = vec![
            SoftwareInventoryRecord::new("Python", "201В", 15).unwrap(),
            SoftwareInventoryRecord::new("Python", "305", 10).unwrap(),
        ];
        assert_eq!(available_for(&rows, "Python"), 25);
    }

    #[test]
    fn summary_orders_by_total_then_name() {
        let rows = vec![
            rec("Монитор", "loc1", 4),
            rec("ИБП", "loc1", 9),
            rec("Коммутатор", "loc1", 4),
            rec("Монитор", "loc2", 0),
        ];
        let summary = stock_summary(&rows);
        let flat: Vec<_> = summary.iter().map(|r| (r.name.as_str(), r.total)).collect();
        assert_eq!(flat, vec![("ИБП", 9), ("Коммутатор", 4), ("Монитор", 4)]);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: the whole-table totals agree with the per-item aggregate.
        #[test]
        fn totals_agree_with_per_item_lookup(
            rows in prop::collection::vec(("[a-c]", "[x-z]", 0u64..1_000), 0..40)
        ) {
            let rows: Vec<InventoryRecord> = rows
                .into_iter()
                .map(|(i, l, q)| rec(&i, &l, q))
                .collect();
            let totals = totals_by_name(&rows);
            for (name, total) in &totals {
                prop_assert_eq!(*total, available_for(&rows, name));
            }
            let grand: u64 = rows.iter().map(|r| r.qty_available).sum();
            prop_assert_eq!(totals.values().sum::<u64>(), grand);
        }
    }
}
