//! Requirement aggregation: many (discipline, lab) needs to one required quantity.

use std::collections::{BTreeMap, HashMap};

use crate::mode::AggregationMode;
use crate::record::DemandLine;

/// Grouping key for `max_per_lab`.
///
/// A row without a lab cannot be shown to share equipment with any other row,
/// so each one is its own group and null-lab needs are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LabGroup<'a> {
    Named(&'a str),
    Unassigned(usize),
}

fn aggregate_rows<'a, D, I>(rows: I, mode: AggregationMode) -> u64
where
    D: DemandLine + 'a,
    I: IntoIterator<Item = &'a D>,
{
    match mode {
        AggregationMode::Sum => rows
            .into_iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.required())),
        AggregationMode::MaxPerLab => {
            let mut peaks: HashMap<LabGroup<'a>, u64> = HashMap::new();
            for (idx, row) in rows.into_iter().enumerate() {
                let group = match row.lab() {
                    Some(lab) => LabGroup::Named(lab),
                    None => LabGroup::Unassigned(idx),
                };
                let peak = peaks.entry(group).or_default();
                *peak = (*peak).max(row.required());
            }
            peaks.values().fold(0u64, |acc, v| acc.saturating_add(*v))
        }
    }
}

/// Required quantity of `name` under `mode`. No rows means zero.
pub fn required_for<'a, D, I>(lines: I, name: &str, mode: AggregationMode) -> u64
where
    D: DemandLine + 'a,
    I: IntoIterator<Item = &'a D>,
{
    aggregate_rows(lines.into_iter().filter(|l| l.name() == name), mode)
}

/// Required quantity under `mode` for every name with at least one demand row.
pub fn totals_by_name<'a, D, I>(lines: I, mode: AggregationMode) -> BTreeMap<String, u64>
where
    D: DemandLine + 'a,
    I: IntoIterator<Item = &'a D>,
{
    let mut by_name: BTreeMap<&'a str, Vec<&'a D>> = BTreeMap::new();
    for line in lines {
        by_name.entry(line.name()).or_default().push(line);
    }

    by_name
        .into_iter()
        .map(|(name, rows)| (name.to_string(), aggregate_rows(rows, mode)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RequirementRecord, SoftwareRequirementRecord};
    use proptest::prelude::*;

    fn req(discipline: &str, lab: Option<&str>, item: &str, qty: u64) -> RequirementRecord {
        RequirementRecord::new(Some(discipline.to_string()), lab.map(str::to_string), item, qty)
            .unwrap()
    }

    fn scenario() -> Vec<RequirementRecord> {
        vec![
            req("d1", Some("lab1"), "A", 4),
            req("d2", Some("lab1"), "A", 6),
            req("d3", Some("lab2"), "A", 2),
        ]
    }

    #[test]
    fn sum_mode_adds_every_row() {
        assert_eq!(required_for(&scenario(), "A", AggregationMode::Sum), 12);
    }

    #[test]
    fn max_per_lab_takes_each_labs_peak() {
        assert_eq!(required_for(&scenario(), "A", AggregationMode::MaxPerLab), 8);
    }

    #[test]
    fn no_rows_means_nothing_required() {
        assert_eq!(required_for(&scenario(), "B", AggregationMode::Sum), 0);
        assert_eq!(
            required_for(Vec::<RequirementRecord>::new().iter(), "A", AggregationMode::MaxPerLab),
            0
        );
    }

    #[test]
    fn rows_without_a_lab_are_never_merged() {
        let rows = vec![
            req("d1", None, "A", 4),
            req("d2", None, "A", 6),
            req("d3", Some("lab1"), "A", 5),
            req("d4", Some("lab1"), "A", 1),
        ];
        // 4 + 6 for the two unassigned rows, 5 for lab1.
        assert_eq!(required_for(&rows, "A", AggregationMode::MaxPerLab), 15);
        assert_eq!(required_for(&rows, "A", AggregationMode::Sum), 16);
    }

    #[test]
    fn lab_names_are_compared_exactly() {
        let rows = vec![req("d1", Some("201В"), "A", 3), req("d2", Some("201в"), "A", 3)];
        assert_eq!(required_for(&rows, "A", AggregationMode::MaxPerLab), 6);
    }

    #[test]
    fn totals_cover_every_name() {
        let mut rows = scenario();
        rows.push(req("d1", Some("lab1"), "B", 1));
        let totals = totals_by_name(&rows, AggregationMode::MaxPerLab);
        assert_eq!(totals.get("A"), Some(&8));
        assert_eq!(totals.get("B"), Some(&1));
        assert_eq!(totals.len(), 2);
    }

    #[test]
    fn software_seats_follow_the_same_modes() {
        let rows = vec![
            SoftwareRequirementRecord::new(Some("ТП".into()), Some("201В".into()), "Python", 15)
                .unwrap(),
            SoftwareRequirementRecord::new(Some("БД".into()), Some("201В".into()), "Python", 12)
                .unwrap(),
        ];
        assert_eq!(required_for(&rows, "Python", AggregationMode::Sum), 27);
        assert_eq!(required_for(&rows, "Python", AggregationMode::MaxPerLab), 15);
    }

    fn arb_rows() -> impl Strategy<Value = Vec<RequirementRecord>> {
        prop::collection::vec(
            (
                "[a-c]",
                prop::option::of("lab[1-3]"),
                "[A-C]",
                0u64..10_000,
            ),
            0..50,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(d, lab, item, qty)| req(&d, lab.as_deref(), &item, qty))
                .collect::<Vec<_>>()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: max_per_lab never asks for more than sum.
        #[test]
        fn max_per_lab_is_bounded_by_sum(rows in arb_rows()) {
            let sum = totals_by_name(&rows, AggregationMode::Sum);
            let max = totals_by_name(&rows, AggregationMode::MaxPerLab);
            prop_assert_eq!(sum.len(), max.len());
            for (name, s) in &sum {
                prop_assert!(max[name] <= *s);
            }
        }

        /// Property: whole-table totals agree with the per-item aggregate.
        #[test]
        fn totals_agree_with_per_item_lookup(rows in arb_rows()) {
            for mode in [AggregationMode::Sum, AggregationMode::MaxPerLab] {
                for (name, total) in totals_by_name(&rows, mode) {
                    prop_assert_eq!(total, required_for(&rows, &name, mode));
                }
            }
        }

        /// Property: when no two rows share a lab, both modes agree.
        #[test]
        fn distinct_labs_make_modes_equal(qtys in prop::collection::vec(0u64..1_000, 0..20)) {
            let rows: Vec<RequirementRecord> = qtys
                .iter()
                .enumerate()
                .map(|(i, q)| req("d", Some(&format!("lab{i}")), "A", *q))
                .collect();
            prop_assert_eq!(
                required_for(&rows, "A", AggregationMode::Sum),
                required_for(&rows, "A", AggregationMode::MaxPerLab)
            );
        }
    }
}
