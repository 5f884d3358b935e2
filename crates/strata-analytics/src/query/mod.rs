//! Turns loose user criteria into composable record predicates and fetch
//! requests.

mod criteria;
mod filter;

pub use criteria::FilterCriteria;
pub use filter::{DateWindow, EqualsFilter, FilterSpec, NumericRange, TextSearch};

use crate::domain::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Units,
    MaintenanceRequests,
    LevyPayments,
}

impl Table {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Units => "units",
            Self::MaintenanceRequests => "maintenance_requests",
            Self::LevyPayments => "levy_payments",
        }
    }

    pub const fn search_fields(self) -> &'static [&'static str] {
        match self {
            Self::Units => &["unit_number", "unit_type", "owner_name", "email"],
            Self::MaintenanceRequests => &[
                "request_id",
                "unit_number",
                "description",
                "request_type",
                "location",
                "owner_name",
            ],
            Self::LevyPayments => &["payment_id", "unit_number", "owner_name"],
        }
    }

    /// Criteria key paired with the record field it constrains.
    pub const fn equality_fields(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Units => &[("unit_type", "unit_type")],
            Self::MaintenanceRequests => &[
                ("status", "status"),
                ("priority", "priority"),
                ("type", "request_type"),
            ],
            Self::LevyPayments => &[
                ("payment_status", "status"),
                ("quarter", "quarter"),
                ("year", "year"),
            ],
        }
    }

    pub const fn date_field(self) -> Option<&'static str> {
        match self {
            Self::Units => None,
            Self::MaintenanceRequests => Some("created_at"),
            Self::LevyPayments => Some("due_date"),
        }
    }

    pub const fn size_field(self) -> Option<&'static str> {
        match self {
            Self::Units => Some("square_meters"),
            Self::MaintenanceRequests | Self::LevyPayments => None,
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }

    /// Records missing the field sort after those that have it, whatever
    /// the direction.
    fn compare<R: Record>(&self, a: &R, b: &R) -> Ordering {
        match (a.field(&self.field), b.field(&self.field)) {
            (Some(left), Some(right)) => {
                let ordering = left.sort_cmp(&right);
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// What a record source is asked for: filter, then sort, then limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchRequest {
    pub filter: FilterSpec,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl FetchRequest {
    pub fn new(filter: FilterSpec) -> Self {
        Self {
            filter,
            sort: None,
            limit: None,
        }
    }

    pub fn for_table(table: Table, criteria: &FilterCriteria) -> Self {
        Self::new(FilterSpec::build(table, criteria))
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn limited(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluates the request against an in-memory collection. The sort is
    /// stable so equal keys keep their source order.
    pub fn apply<R: Record + Clone>(&self, records: &[R]) -> Vec<R> {
        let mut selected: Vec<R> = records
            .iter()
            .filter(|record| self.filter.matches(*record))
            .cloned()
            .collect();

        if let Some(sort) = &self.sort {
            selected.sort_by(|a, b| sort.compare(a, b));
        }

        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LevyPayment, LevyStatus};
    use chrono::NaiveDate;

    fn payment(id: &str, quarter: u8, amount: f64, status: LevyStatus) -> LevyPayment {
        LevyPayment {
            payment_id: id.to_string(),
            unit_number: "101".to_string(),
            owner_id: None,
            quarter,
            year: 2026,
            amount,
            status,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            paid_date: None,
            late_fee: None,
            owner: None,
        }
    }

    #[test]
    fn apply_filters_sorts_and_limits() {
        let payments = vec![
            payment("a", 1, 900.0, LevyStatus::Pending),
            payment("b", 1, 1500.0, LevyStatus::Pending),
            payment("c", 2, 1200.0, LevyStatus::Pending),
            payment("d", 1, 1100.0, LevyStatus::Overdue),
        ];
        let criteria = FilterCriteria {
            quarter: Some("1".to_string()),
            ..FilterCriteria::default()
        };
        let request = FetchRequest::for_table(Table::LevyPayments, &criteria)
            .sorted(SortSpec::descending("amount"))
            .limited(2);

        let ids: Vec<String> = request
            .apply(&payments)
            .into_iter()
            .map(|p| p.payment_id)
            .collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn missing_sort_values_go_last() {
        let mut late = payment("late", 1, 100.0, LevyStatus::Overdue);
        late.late_fee = Some(25.0);
        let payments = vec![payment("none", 1, 100.0, LevyStatus::Pending), late];
        let sorted = FetchRequest::default()
            .sorted(SortSpec::descending("late_fee"))
            .apply(&payments);
        assert_eq!(sorted[0].payment_id, "late");
        assert_eq!(sorted[1].payment_id, "none");
    }
}
