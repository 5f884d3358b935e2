//! Report assembly: fetch, compute, and package one of four report shapes.

mod insights;
mod service;
pub mod views;

pub use service::{ReportError, ReportService, DEFAULT_DEADLINE};
pub use views::{
    ComprehensiveReport, ExecutiveSummary, FinancialHealth, FinancialReport, KeyMetrics,
    MaintenanceReport, OccupancyReport, RiskCategory, RiskFinding, RiskLevel,
};

use crate::query::FilterCriteria;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Maintenance,
    Financial,
    Occupancy,
    Comprehensive,
}

impl ReportKind {
    pub const fn ordered() -> [ReportKind; 4] {
        [
            ReportKind::Maintenance,
            ReportKind::Financial,
            ReportKind::Occupancy,
            ReportKind::Comprehensive,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::Financial => "financial",
            Self::Occupancy => "occupancy",
            Self::Comprehensive => "comprehensive",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Financial => "Financial",
            Self::Occupancy => "Occupancy",
            Self::Comprehensive => "Comprehensive",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReportKind(pub String);

impl fmt::Display for UnknownReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown report kind `{}` (expected maintenance, financial, occupancy or comprehensive)",
            self.0
        )
    }
}

impl std::error::Error for UnknownReportKind {}

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        ReportKind::ordered()
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownReportKind(value.to_string()))
    }
}

/// Everything needed to produce one report. `as_of` is both the report's
/// generation timestamp and the "now" used for overdue calculations.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRequest {
    pub kind: ReportKind,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub criteria: FilterCriteria,
    pub as_of: DateTime<Utc>,
    pub deadline: Option<Duration>,
}

impl ReportRequest {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            date_from: None,
            date_to: None,
            criteria: FilterCriteria::default(),
            as_of: Utc::now(),
            deadline: None,
        }
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = as_of;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Human-readable label for the requested window.
    pub fn period(&self) -> String {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => format!("{from} to {to}"),
            (Some(from), None) => format!("Since {from}"),
            (None, Some(to)) => format!("Up to {to}"),
            (None, None) => "All time".to_string(),
        }
    }

    /// Caller criteria with the report window folded in. An explicit window
    /// overrides any date bounds already present in the criteria.
    pub(crate) fn effective_criteria(&self) -> FilterCriteria {
        self.criteria
            .clone()
            .with_date_range(self.date_from, self.date_to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Report {
    Maintenance(MaintenanceReport),
    Financial(FinancialReport),
    Occupancy(OccupancyReport),
    Comprehensive(Box<ComprehensiveReport>),
}

impl Report {
    pub fn kind(&self) -> ReportKind {
        match self {
            Report::Maintenance(_) => ReportKind::Maintenance,
            Report::Financial(_) => ReportKind::Financial,
            Report::Occupancy(_) => ReportKind::Occupancy,
            Report::Comprehensive(_) => ReportKind::Comprehensive,
        }
    }

    pub fn period(&self) -> &str {
        match self {
            Report::Maintenance(report) => &report.period,
            Report::Financial(report) => &report.period,
            Report::Occupancy(report) => &report.period,
            Report::Comprehensive(report) => &report.period,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        match self {
            Report::Maintenance(report) => report.generated_at,
            Report::Financial(report) => report.generated_at,
            Report::Occupancy(report) => report.generated_at,
            Report::Comprehensive(report) => report.generated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kind_parses_case_insensitively() {
        assert_eq!("Financial".parse::<ReportKind>(), Ok(ReportKind::Financial));
        assert_eq!(" occupancy ".parse::<ReportKind>(), Ok(ReportKind::Occupancy));
        assert!("weekly".parse::<ReportKind>().is_err());
    }

    #[test]
    fn period_describes_the_window() {
        let from = NaiveDate::from_ymd_opt(2026, 1, 1);
        let to = NaiveDate::from_ymd_opt(2026, 3, 31);
        let request = ReportRequest::new(ReportKind::Financial);
        assert_eq!(request.period(), "All time");
        assert_eq!(
            request.clone().between(from, to).period(),
            "2026-01-01 to 2026-03-31"
        );
        assert_eq!(request.between(from, None).period(), "Since 2026-01-01");
    }

    #[test]
    fn explicit_window_overrides_criteria_dates() {
        let criteria = FilterCriteria {
            date_from: Some("2025-01-01".to_string()),
            status: Some("pending".to_string()),
            ..FilterCriteria::default()
        };
        let request = ReportRequest::new(ReportKind::Maintenance)
            .with_criteria(criteria)
            .between(NaiveDate::from_ymd_opt(2026, 2, 1), None);
        let effective = request.effective_criteria();
        assert_eq!(effective.date_from.as_deref(), Some("2026-02-01"));
        assert_eq!(effective.status.as_deref(), Some("pending"));
    }
}
