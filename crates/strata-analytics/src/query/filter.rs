use super::criteria::FilterCriteria;
use super::Table;
use crate::domain::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Case-insensitive substring match OR-ed across a set of text fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub needle: String,
    pub fields: Vec<&'static str>,
}

impl TextSearch {
    fn matches<R: Record>(&self, record: &R) -> bool {
        self.fields.iter().any(|field| {
            record
                .field(field)
                .and_then(|value| value.as_text().map(str::to_lowercase))
                .is_some_and(|text| text.contains(&self.needle))
        })
    }
}

/// Exact, case-sensitive equality on the raw field value.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsFilter {
    pub field: &'static str,
    pub value: String,
}

/// Inclusive timestamp window on one date field.
#[derive(Debug, Clone, PartialEq)]
pub struct DateWindow {
    pub field: &'static str,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
}

impl DateWindow {
    fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(at) = record.field(self.field).and_then(|v| v.as_timestamp()) else {
            return false;
        };
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

/// Inclusive numeric bounds on one field.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericRange {
    pub field: &'static str,
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl NumericRange {
    fn matches<R: Record>(&self, record: &R) -> bool {
        let Some(value) = record.field(self.field).and_then(|v| v.as_number()) else {
            return false;
        };
        self.min.map_or(true, |min| value >= min as f64)
            && self.max.map_or(true, |max| value <= max as f64)
    }
}

/// Normalized predicate over a single record. Every present part must
/// match; an empty spec matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub search: Option<TextSearch>,
    pub equals: Vec<EqualsFilter>,
    pub date_window: Option<DateWindow>,
    pub ranges: Vec<NumericRange>,
}

impl FilterSpec {
    /// Matches every record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps only the criteria that apply to `table`. Unparseable dates and
    /// sizes are dropped rather than rejected.
    pub fn build(table: Table, criteria: &FilterCriteria) -> Self {
        let mut spec = Self::default();

        if let Some(term) = criteria.search.as_deref() {
            spec = spec.with_search(term, table.search_fields());
        }

        for (key, field) in table.equality_fields() {
            if let Some(value) = criteria_value(criteria, key) {
                spec = spec.with_equals(field, value);
            }
        }

        if let Some(field) = table.date_field() {
            let from = criteria
                .date_from
                .as_deref()
                .and_then(|raw| parse_bound(raw, Bound::Start));
            let to = criteria
                .date_to
                .as_deref()
                .and_then(|raw| parse_bound(raw, Bound::End));
            spec = spec.with_date_window(field, from, to);
        }

        if let Some(field) = table.size_field() {
            let min = criteria.min_size.as_deref().and_then(parse_size);
            let max = criteria.max_size.as_deref().and_then(parse_size);
            spec = spec.with_range(field, min, max);
        }

        spec
    }

    pub fn with_search(mut self, term: &str, fields: &[&'static str]) -> Self {
        let needle = term.trim().to_lowercase();
        if !needle.is_empty() && !fields.is_empty() {
            self.search = Some(TextSearch {
                needle,
                fields: fields.to_vec(),
            });
        }
        self
    }

    pub fn with_equals(mut self, field: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.equals.push(EqualsFilter { field, value });
        }
        self
    }

    pub fn with_date_window(
        mut self,
        field: &'static str,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Self {
        if from.is_some() || to.is_some() {
            self.date_window = Some(DateWindow { field, from, to });
        }
        self
    }

    pub fn with_range(mut self, field: &'static str, min: Option<u64>, max: Option<u64>) -> Self {
        if min.is_some() || max.is_some() {
            self.ranges.push(NumericRange { field, min, max });
        }
        self
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.is_none()
            && self.equals.is_empty()
            && self.date_window.is_none()
            && self.ranges.is_empty()
    }

    pub fn matches<R: Record>(&self, record: &R) -> bool {
        if let Some(search) = &self.search {
            if !search.matches(record) {
                return false;
            }
        }

        let equals_ok = self.equals.iter().all(|filter| {
            record
                .field(filter.field)
                .is_some_and(|value| value.to_key() == filter.value)
        });
        if !equals_ok {
            return false;
        }

        if let Some(window) = &self.date_window {
            if !window.matches(record) {
                return false;
            }
        }

        self.ranges.iter().all(|range| range.matches(record))
    }
}

fn criteria_value<'a>(criteria: &'a FilterCriteria, key: &str) -> Option<&'a str> {
    let value = match key {
        "status" => &criteria.status,
        "priority" => &criteria.priority,
        "type" => &criteria.request_type,
        "payment_status" => &criteria.payment_status,
        "quarter" => &criteria.quarter,
        "year" => &criteria.year,
        "unit_type" => &criteria.unit_type,
        _ => return None,
    };
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Start,
    End,
}

/// Day-only inputs widen to the whole day: start at midnight, end at the
/// last representable instant of that day.
fn parse_bound(raw: &str, bound: Bound) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()?;
    match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
    }
}

fn parse_size(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MaintenanceRequest, MaintenanceStatus, Priority, Unit};
    use chrono::{TimeZone, Utc};

    fn request(id: &str, day: u32, hour: u32, description: &str) -> MaintenanceRequest {
        MaintenanceRequest {
            request_id: id.to_string(),
            unit_number: "101".to_string(),
            description: description.to_string(),
            status: MaintenanceStatus::Pending,
            priority: Priority::High,
            request_type: "plumbing".to_string(),
            location: Some("Bathroom".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 5, day, hour, 30, 0).unwrap(),
            completed_at: None,
            estimated_cost: None,
            owner: None,
        }
    }

    fn unit(number: &str, size: Option<f64>) -> Unit {
        Unit {
            unit_number: number.to_string(),
            unit_type: "Studio".to_string(),
            square_meters: size,
            floor_level: None,
            parking_spaces: 0,
            storage_unit: false,
            balcony_size: None,
            owner: None,
        }
    }

    #[test]
    fn empty_criteria_impose_no_constraint() {
        let spec = FilterSpec::build(Table::MaintenanceRequests, &FilterCriteria::default());
        assert!(spec.is_unconstrained());
        assert!(spec.matches(&request("MR-1", 1, 9, "Leak")));
    }

    #[test]
    fn same_day_range_captures_late_evening_records() {
        let criteria = FilterCriteria {
            date_from: Some("2026-05-04".to_string()),
            date_to: Some("2026-05-04".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(spec.matches(&request("MR-1", 4, 23, "Leak")));
        assert!(spec.matches(&request("MR-2", 4, 0, "Leak")));
        assert!(!spec.matches(&request("MR-3", 5, 0, "Leak")));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let criteria = FilterCriteria {
            search: Some("BATH".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(spec.matches(&request("MR-1", 1, 9, "Dripping tap")));

        let criteria = FilterCriteria {
            search: Some("roof".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(!spec.matches(&request("MR-1", 1, 9, "Dripping tap")));
    }

    #[test]
    fn equality_is_exact_and_case_sensitive() {
        let criteria = FilterCriteria {
            priority: Some("High".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(!spec.matches(&request("MR-1", 1, 9, "Leak")));

        let criteria = FilterCriteria {
            priority: Some("high".to_string()),
            status: Some("pending".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(spec.matches(&request("MR-1", 1, 9, "Leak")));
    }

    #[test]
    fn invalid_sizes_and_dates_are_ignored() {
        let criteria = FilterCriteria {
            min_size: Some("-5".to_string()),
            max_size: Some("abc".to_string()),
            date_from: Some("yesterday".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::Units, &criteria);
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn size_range_is_inclusive_and_excludes_unknown_sizes() {
        let criteria = FilterCriteria {
            min_size: Some("50".to_string()),
            max_size: Some("80".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::Units, &criteria);
        assert!(spec.matches(&unit("1", Some(50.0))));
        assert!(spec.matches(&unit("2", Some(80.0))));
        assert!(!spec.matches(&unit("3", Some(80.5))));
        assert!(!spec.matches(&unit("4", None)));
    }

    #[test]
    fn keys_for_other_tables_are_skipped() {
        let criteria = FilterCriteria {
            payment_status: Some("paid".to_string()),
            unit_type: Some("Studio".to_string()),
            ..FilterCriteria::default()
        };
        let spec = FilterSpec::build(Table::MaintenanceRequests, &criteria);
        assert!(spec.is_unconstrained());
    }

    #[test]
    fn build_is_deterministic() {
        let criteria = FilterCriteria {
            search: Some("leak".to_string()),
            status: Some("pending".to_string()),
            date_to: Some("2026-05-31".to_string()),
            ..FilterCriteria::default()
        };
        assert_eq!(
            FilterSpec::build(Table::MaintenanceRequests, &criteria),
            FilterSpec::build(Table::MaintenanceRequests, &criteria)
        );
    }
}
