//! Generic reductions over any collection of [`Record`]s.
//!
//! Missing numeric fields count as zero for sums and are skipped for
//! averages and extremes. Results never depend on input order: floating
//! point totals are summed in a canonical order and groups are keyed in a
//! `BTreeMap`.

pub mod stats;

use crate::domain::Record;
use std::collections::{BTreeMap, HashMap};

/// Group key used when a record lacks the grouping field.
pub const UNKNOWN_GROUP: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Sum { field: String },
    Average { field: String },
    Min { field: String },
    Max { field: String },
    GroupBy { field: String },
    GroupAndSum { group: String, sum: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateValue {
    Count(usize),
    Number(f64),
    Extremum(Option<f64>),
    Counts(BTreeMap<String, usize>),
    Totals(BTreeMap<String, f64>),
}

impl Aggregation {
    pub fn sum(field: impl Into<String>) -> Self {
        Self::Sum {
            field: field.into(),
        }
    }

    pub fn average(field: impl Into<String>) -> Self {
        Self::Average {
            field: field.into(),
        }
    }

    pub fn group_by(field: impl Into<String>) -> Self {
        Self::GroupBy {
            field: field.into(),
        }
    }

    pub fn apply<R: Record>(&self, records: &[R]) -> AggregateValue {
        match self {
            Self::Count => AggregateValue::Count(count(records)),
            Self::Sum { field } => AggregateValue::Number(sum(records, field)),
            Self::Average { field } => AggregateValue::Number(avg(records, field)),
            Self::Min { field } => AggregateValue::Extremum(min(records, field)),
            Self::Max { field } => AggregateValue::Extremum(max(records, field)),
            Self::GroupBy { field } => AggregateValue::Counts(group_by(records, field)),
            Self::GroupAndSum { group, sum } => {
                AggregateValue::Totals(group_and_sum(records, group, sum))
            }
        }
    }
}

pub fn count<R: Record>(records: &[R]) -> usize {
    records.len()
}

pub fn sum<R: Record>(records: &[R], field: &str) -> f64 {
    canonical_sum(present_values(records, field))
}

/// Mean over records where the field is present; 0 when none are.
pub fn avg<R: Record>(records: &[R], field: &str) -> f64 {
    let values = present_values(records, field);
    if values.is_empty() {
        return 0.0;
    }
    let len = values.len() as f64;
    canonical_sum(values) / len
}

pub fn min<R: Record>(records: &[R], field: &str) -> Option<f64> {
    present_values(records, field).into_iter().reduce(f64::min)
}

pub fn max<R: Record>(records: &[R], field: &str) -> Option<f64> {
    present_values(records, field).into_iter().reduce(f64::max)
}

pub fn group_by<R: Record>(records: &[R], field: &str) -> BTreeMap<String, usize> {
    records.iter().fold(BTreeMap::new(), |mut groups, record| {
        *groups.entry(group_key(record, field)).or_insert(0) += 1;
        groups
    })
}

pub fn group_and_sum<R: Record>(
    records: &[R],
    group_field: &str,
    sum_field: &str,
) -> BTreeMap<String, f64> {
    let buckets = records
        .iter()
        .fold(BTreeMap::new(), |mut buckets: BTreeMap<String, Vec<f64>>, record| {
            let value = record
                .field(sum_field)
                .and_then(|v| v.as_number())
                .unwrap_or(0.0);
            buckets
                .entry(group_key(record, group_field))
                .or_default()
                .push(value);
            buckets
        });

    buckets
        .into_iter()
        .map(|(key, values)| (key, canonical_sum(values)))
        .collect()
}

/// Counts per key ordered by descending frequency; ties keep the order in
/// which keys were first seen.
pub fn ranked_counts<R: Record>(records: &[R], field: &str) -> Vec<(String, usize)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut ranked: Vec<(String, usize)> = Vec::new();

    for record in records {
        let key = group_key(record, field);
        match index.get(&key) {
            Some(&slot) => ranked[slot].1 += 1,
            None => {
                index.insert(key.clone(), ranked.len());
                ranked.push((key, 1));
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

fn group_key<R: Record>(record: &R, field: &str) -> String {
    record
        .field(field)
        .map(|value| value.to_key())
        .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}

fn present_values<R: Record>(records: &[R], field: &str) -> Vec<f64> {
    records
        .iter()
        .filter_map(|record| record.field(field).and_then(|value| value.as_number()))
        .collect()
}

/// Sums in ascending order so the total is identical for any permutation
/// of the same values.
pub(crate) fn canonical_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    #[derive(Debug, Clone)]
    struct Row {
        kind: Option<&'static str>,
        cost: Option<f64>,
    }

    impl Record for Row {
        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "kind" => self.kind.map(FieldValue::from),
                "cost" => self.cost.map(FieldValue::Number),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { kind: Some("plumbing"), cost: Some(120.0) },
            Row { kind: Some("electrical"), cost: None },
            Row { kind: None, cost: Some(80.0) },
            Row { kind: Some("plumbing"), cost: Some(0.1) },
            Row { kind: Some("Plumbing"), cost: Some(0.2) },
        ]
    }

    #[test]
    fn empty_collections_yield_zero_shapes() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(count(&empty), 0);
        assert_eq!(sum(&empty, "cost"), 0.0);
        assert_eq!(avg(&empty, "cost"), 0.0);
        assert_eq!(min(&empty, "cost"), None);
        assert_eq!(max(&empty, "cost"), None);
        assert!(group_by(&empty, "kind").is_empty());
        assert!(group_and_sum(&empty, "kind", "cost").is_empty());
    }

    #[test]
    fn missing_values_count_as_zero_for_sum_but_not_average() {
        let rows = rows();
        assert!((sum(&rows, "cost") - 200.3).abs() < 1e-9);
        assert!((avg(&rows, "cost") - 200.3 / 4.0).abs() < 1e-9);
        assert_eq!(min(&rows, "cost"), Some(0.1));
        assert_eq!(max(&rows, "cost"), Some(120.0));
    }

    #[test]
    fn min_avg_max_are_ordered() {
        let rows = rows();
        let low = min(&rows, "cost").expect("values present");
        let high = max(&rows, "cost").expect("values present");
        let mean = avg(&rows, "cost");
        assert!(low <= mean && mean <= high);
    }

    #[test]
    fn grouping_is_case_sensitive_with_unknown_bucket() {
        let groups = group_by(&rows(), "kind");
        assert_eq!(groups.get("plumbing"), Some(&2));
        assert_eq!(groups.get("Plumbing"), Some(&1));
        assert_eq!(groups.get(UNKNOWN_GROUP), Some(&1));

        let totals = group_and_sum(&rows(), "kind", "cost");
        assert_eq!(totals.get("electrical"), Some(&0.0));
        assert_eq!(totals.get(UNKNOWN_GROUP), Some(&80.0));
    }

    #[test]
    fn results_do_not_depend_on_record_order() {
        let forward = rows();
        let mut reversed = rows();
        reversed.reverse();
        for aggregation in [
            Aggregation::Count,
            Aggregation::sum("cost"),
            Aggregation::average("cost"),
            Aggregation::Min { field: "cost".into() },
            Aggregation::Max { field: "cost".into() },
            Aggregation::group_by("kind"),
            Aggregation::GroupAndSum { group: "kind".into(), sum: "cost".into() },
        ] {
            assert_eq!(aggregation.apply(&forward), aggregation.apply(&reversed));
        }
    }

    #[test]
    fn ranked_counts_break_ties_by_first_seen() {
        let rows = vec![
            Row { kind: Some("b"), cost: None },
            Row { kind: Some("a"), cost: None },
            Row { kind: Some("a"), cost: None },
            Row { kind: Some("c"), cost: None },
            Row { kind: Some("b"), cost: None },
        ];
        let ranked = ranked_counts(&rows, "kind");
        assert_eq!(
            ranked,
            vec![("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
        );
    }
}
