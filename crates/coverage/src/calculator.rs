use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use mto_inventory::StockLine;
use mto_requirements::{AggregationMode, DemandLine};

/// Parameters of one coverage computation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageQuery {
    pub mode: AggregationMode,
    pub only_deficit: bool,
}

impl Default for CoverageQuery {
    fn default() -> Self {
        Self {
            mode: AggregationMode::Sum,
            only_deficit: true,
        }
    }
}

/// Required vs available for one name. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRow {
    pub name: String,
    pub required: u64,
    pub available: u64,
    pub deficit: u64,
}

impl CoverageRow {
    pub fn new(name: impl Into<String>, required: u64, available: u64) -> Self {
        Self {
            name: name.into(),
            required,
            available,
            deficit: required.saturating_sub(available),
        }
    }
}

/// Coverage for every name that appears in stock and/or demand.
///
/// Rows are ordered by deficit (largest first), then by name. Names are unique,
/// so the order is total and `only_deficit` only removes rows without
/// reordering the rest.
pub fn compute_coverage<S, D>(stock: &[S], demand: &[D], query: CoverageQuery) -> Vec<CoverageRow>
where
    S: StockLine,
    D: DemandLine,
{
    let available = mto_inventory::totals_by_name(stock);
    let required = mto_requirements::totals_by_name(demand, query.mode);

    let names: BTreeSet<&String> = available.keys().chain(required.keys()).collect();

    let mut rows: Vec<CoverageRow> = names
        .into_iter()
        .map(|name| {
            CoverageRow::new(
                name.clone(),
                required.get(name).copied().unwrap_or(0),
                available.get(name).copied().unwrap_or(0),
            )
        })
        .filter(|row| !query.only_deficit || row.deficit > 0)
        .collect();

    rows.sort_by(|a, b| b.deficit.cmp(&a.deficit).then_with(|| a.name.cmp(&b.name)));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use mto_inventory::{InventoryRecord, SoftwareInventoryRecord};
    use mto_requirements::{RequirementRecord, SoftwareRequirementRecord};
    use proptest::prelude::*;

    fn inv(item: &str, loc: &str, qty: u64) -> InventoryRecord {
        InventoryRecord::new(item, loc, qty).unwrap()
    }

    fn req(discipline: &str, lab: Option<&str>, item: &str, qty: u64) -> RequirementRecord {
        RequirementRecord::new(Some(discipline.to_string()), lab.map(str::to_string), item, qty)
            .unwrap()
    }

    fn query(mode: AggregationMode, only_deficit: bool) -> CoverageQuery {
        CoverageQuery { mode, only_deficit }
    }

    fn scenario() -> (Vec<InventoryRecord>, Vec<RequirementRecord>) {
        (
            vec![inv("A", "loc1", 5), inv("A", "loc2", 3)],
            vec![
                req("d1", Some("lab1"), "A", 4),
                req("d2", Some("lab1"), "A", 6),
                req("d3", Some("lab2"), "A", 2),
            ],
        )
    }

    #[test]
    fn sum_mode_reports_deficit() {
        let (stock, demand) = scenario();
        let rows = compute_coverage(&stock, &demand, query(AggregationMode::Sum, false));
        assert_eq!(rows, vec![CoverageRow::new("A", 12, 8)]);
        assert_eq!(rows[0].deficit, 4);
    }

    #[test]
    fn max_per_lab_mode_is_fully_covered() {
        let (stock, demand) = scenario();
        let rows = compute_coverage(&stock, &demand, query(AggregationMode::MaxPerLab, false));
        assert_eq!(rows, vec![CoverageRow::new("A", 8, 8)]);
        assert_eq!(rows[0].deficit, 0);

        let only = compute_coverage(&stock, &demand, query(AggregationMode::MaxPerLab, true));
        assert!(only.is_empty());
    }

    #[test]
    fn stock_without_demand_has_no_deficit() {
        let stock = vec![inv("Сервер", "loc1", 2)];
        let demand: Vec<RequirementRecord> = vec![];
        let rows = compute_coverage(&stock, &demand, query(AggregationMode::Sum, false));
        assert_eq!(rows, vec![CoverageRow::new("Сервер", 0, 2)]);

        let only = compute_coverage(&stock, &demand, query(AggregationMode::Sum, true));
        assert!(only.is_empty());
    }

    #[test]
    fn demand_without_stock_is_all_deficit() {
        let stock: Vec<InventoryRecord> = vec![];
        let demand = vec![req("d1", Some("lab1"), "Маршрутизатор", 6)];
        let rows = compute_coverage(&stock, &demand, CoverageQuery::default());
        assert_eq!(rows, vec![CoverageRow::new("Маршрутизатор", 6, 0)]);
        assert_eq!(rows[0].deficit, 6);
    }

    #[test]
    fn rows_are_ordered_by_deficit_then_name() {
        let stock = vec![inv("B", "l", 1)];
        let demand = vec![
            req("d", Some("l"), "A", 3),
            req("d", Some("l"), "B", 4),
            req("d", Some("l"), "C", 3),
            req("d", Some("l"), "D", 10),
        ];
        let rows = compute_coverage(&stock, &demand, query(AggregationMode::Sum, false));
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["D", "A", "B", "C"]);
    }

    #[test]
    fn software_coverage_uses_seats() {
        let stock = vec![SoftwareInventoryRecord::new("Python", "201В", 10).unwrap()];
        let demand = vec![
            SoftwareRequirementRecord::new(None, Some("201В".into()), "Python", 15).unwrap(),
            SoftwareRequirementRecord::new(None, Some("201В".into()), "Python", 12).unwrap(),
        ];
        let rows = compute_coverage(&stock, &demand, query(AggregationMode::MaxPerLab, true));
        assert_eq!(rows, vec![CoverageRow::new("Python", 15, 10)]);
    }

    fn arb_data() -> impl Strategy<Value = (Vec<InventoryRecord>, Vec<RequirementRecord>)> {
        let stock = prop::collection::vec(("[A-E]", "loc[1-3]", 0u64..50), 0..20)
            .prop_map(|v| {
                v.into_iter()
                    .map(|(i, l, q)| inv(&i, &l, q))
                    .collect::<Vec<_>>()
            });
        let demand = prop::collection::vec(
            ("[a-c]", prop::option::of("lab[1-3]"), "[A-E]", 0u64..50),
            0..30,
        )
        .prop_map(|v| {
            v.into_iter()
                .map(|(d, lab, i, q)| req(&d, lab.as_deref(), &i, q))
                .collect::<Vec<_>>()
        });
        (stock, demand)
    }

    fn arb_mode() -> impl Strategy<Value = AggregationMode> {
        prop_oneof![Just(AggregationMode::Sum), Just(AggregationMode::MaxPerLab)]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: deficit is exactly max(0, required - available) on every row.
        #[test]
        fn deficit_is_clamped_difference((stock, demand) in arb_data(), mode in arb_mode()) {
            for row in compute_coverage(&stock, &demand, query(mode, false)) {
                prop_assert_eq!(row.deficit, row.required.saturating_sub(row.available));
            }
        }

        /// Property: only_deficit is the deficit > 0 subset, order preserved.
        #[test]
        fn only_deficit_is_an_ordered_subset((stock, demand) in arb_data(), mode in arb_mode()) {
            let all = compute_coverage(&stock, &demand, query(mode, false));
            let only = compute_coverage(&stock, &demand, query(mode, true));
            let expected: Vec<CoverageRow> = all.into_iter().filter(|r| r.deficit > 0).collect();
            prop_assert_eq!(only, expected);
        }

        /// Property: computing twice on the same data gives the same rows.
        #[test]
        fn computation_is_idempotent((stock, demand) in arb_data(), mode in arb_mode()) {
            let q = query(mode, false);
            prop_assert_eq!(
                compute_coverage(&stock, &demand, q),
                compute_coverage(&stock, &demand, q)
            );
        }

        /// Property: one row per distinct name across stock and demand.
        #[test]
        fn every_name_gets_a_row((stock, demand) in arb_data(), mode in arb_mode()) {
            let rows = compute_coverage(&stock, &demand, query(mode, false));
            let names: BTreeSet<&str> = stock
                .iter()
                .map(|r| r.item_name.as_str())
                .chain(demand.iter().map(|r| r.item_name.as_str()))
                .collect();
            prop_assert_eq!(rows.len(), names.len());
        }

        /// Property: max_per_lab never reports more required than sum.
        #[test]
        fn max_per_lab_requires_no_more_than_sum((stock, demand) in arb_data()) {
            let sum = compute_coverage(&stock, &demand, query(AggregationMode::Sum, false));
            let max = compute_coverage(&stock, &demand, query(AggregationMode::MaxPerLab, false));
            for row in &max {
                let s = sum.iter().find(|r| r.name == row.name).map(|r| r.required);
                prop_assert!(row.required <= s.unwrap_or(0));
            }
        }
    }
}
