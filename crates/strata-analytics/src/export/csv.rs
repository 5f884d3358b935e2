//! CSV export of reports.
//!
//! Record reports get one row per record in the order the report holds
//! them. The comprehensive report flattens its headline figures into
//! `Section,Metric,Value` rows. Rows are joined with `\n` and the output has
//! no trailing newline.

use crate::domain::{LevyPayment, MaintenanceRequest, Owner, Unit};
use crate::report::{ComprehensiveReport, Report};
use chrono::{Datelike, NaiveDate};
use std::borrow::Cow;

pub const CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const MAINTENANCE_HEADER: &str = "Request ID,Unit,Owner,Description,Type,Location,Priority,Status,Created,Completed,Estimated Cost";
const FINANCIAL_HEADER: &str =
    "Payment ID,Unit,Owner,Quarter,Year,Amount,Status,Due Date,Paid Date,Late Fee";
const OCCUPANCY_HEADER: &str =
    "Unit,Type,Size (sqm),Floor,Parking Spaces,Storage Unit,Balcony Size,Owner,Email,Phone,Move-in Date";
const SUMMARY_HEADER: &str = "Section,Metric,Value";

pub fn export_csv(report: &Report) -> String {
    let rows = match report {
        Report::Maintenance(report) => table(MAINTENANCE_HEADER, &report.requests, request_row),
        Report::Financial(report) => table(FINANCIAL_HEADER, &report.payments, payment_row),
        Report::Occupancy(report) => table(OCCUPANCY_HEADER, &report.units, unit_row),
        Report::Comprehensive(report) => summary_rows(report),
    };
    rows.join("\n")
}

/// Download name such as `strata-financial-report-2026-04-10.csv`.
pub fn export_file_name(report: &Report) -> String {
    format!(
        "strata-{}-report-{}.csv",
        report.kind(),
        report.generated_at().format("%Y-%m-%d")
    )
}

fn table<T>(header: &str, records: &[T], row: fn(&T) -> Vec<String>) -> Vec<String> {
    std::iter::once(header.to_string())
        .chain(records.iter().map(|record| join_row(row(record))))
        .collect()
}

fn join_row(cells: Vec<String>) -> String {
    cells
        .iter()
        .map(|cell| escape(cell))
        .collect::<Vec<_>>()
        .join(",")
}

/// Only cells holding a double quote are quoted.
fn escape(cell: &str) -> Cow<'_, str> {
    if cell.contains('"') {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}

fn date(value: NaiveDate) -> String {
    format!("{}/{}/{}", value.month(), value.day(), value.year())
}

fn optional<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_default()
}

fn owner_name(owner: Option<&Owner>) -> String {
    optional(owner, Owner::full_name)
}

fn request_row(request: &MaintenanceRequest) -> Vec<String> {
    vec![
        request.request_id.clone(),
        request.unit_number.clone(),
        owner_name(request.owner.as_ref()),
        request.description.clone(),
        request.request_type.clone(),
        request.location.clone().unwrap_or_default(),
        request.priority.as_str().to_string(),
        request.status.as_str().to_string(),
        date(request.created_at.date_naive()),
        optional(request.completed_at, |at| date(at.date_naive())),
        optional(request.estimated_cost, |cost| cost.to_string()),
    ]
}

fn payment_row(payment: &LevyPayment) -> Vec<String> {
    vec![
        payment.payment_id.clone(),
        payment.unit_number.clone(),
        owner_name(payment.owner.as_ref()),
        payment.quarter.to_string(),
        payment.year.to_string(),
        payment.amount.to_string(),
        payment.status.as_str().to_string(),
        date(payment.due_date),
        optional(payment.paid_date, date),
        optional(payment.late_fee, |fee| fee.to_string()),
    ]
}

fn unit_row(unit: &Unit) -> Vec<String> {
    let owner = unit.owner.as_ref();
    vec![
        unit.unit_number.clone(),
        unit.unit_type.clone(),
        optional(unit.square_meters, |size| size.to_string()),
        optional(unit.floor_level, |floor| floor.to_string()),
        unit.parking_spaces.to_string(),
        unit.storage_unit.to_string(),
        optional(unit.balcony_size, |size| size.to_string()),
        owner_name(owner),
        owner.and_then(|o| o.email.clone()).unwrap_or_default(),
        owner.and_then(|o| o.phone.clone()).unwrap_or_default(),
        optional(owner.and_then(|o| o.move_in_date), date),
    ]
}

fn summary_rows(report: &ComprehensiveReport) -> Vec<String> {
    let maintenance = &report.maintenance.metrics;
    let financial = &report.financial.metrics;
    let occupancy = &report.occupancy.metrics;
    let cross = &report.cross_analysis;
    let health = &report.financial_health;

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut push = |section: &str, metric: &str, value: String| {
        rows.push(vec![section.to_string(), metric.to_string(), value]);
    };

    push("Maintenance", "Total Requests", maintenance.total_requests.to_string());
    push("Maintenance", "Open Requests", maintenance.open_requests.to_string());
    push("Maintenance", "Emergency Requests", maintenance.emergency_requests.to_string());
    push("Maintenance", "Completion Rate (%)", maintenance.completion_rate.to_string());
    push(
        "Maintenance",
        "Average Response (hours)",
        maintenance.response_times.average.to_string(),
    );
    push(
        "Maintenance",
        "Total Estimated Cost",
        maintenance.costs.total_estimated.to_string(),
    );

    push("Financial", "Total Levied", financial.total_levied.to_string());
    push("Financial", "Total Collected", financial.total_collected.to_string());
    push("Financial", "Total Outstanding", financial.total_outstanding.to_string());
    push("Financial", "Collection Rate (%)", financial.collection_rate.to_string());
    push("Financial", "Overdue Payments", financial.overdue.count.to_string());
    push("Financial", "Overdue Amount", financial.overdue.amount.to_string());

    push("Occupancy", "Total Units", occupancy.total_units.to_string());
    push("Occupancy", "Occupied Units", occupancy.occupied_units.to_string());
    push("Occupancy", "Vacant Units", occupancy.vacant_units.to_string());
    push("Occupancy", "Occupancy Rate (%)", occupancy.occupancy_rate.to_string());

    push(
        "Cross Analysis",
        "High Maintenance Units",
        cross.high_maintenance_units.join(" "),
    );
    push("Cross Analysis", "Low Payment Units", cross.low_payment_units.join(" "));
    push("Cross Analysis", "Risk Units", cross.risk_units.join(" "));

    push("Financial Health", "Score", health.score.to_string());
    push("Financial Health", "Net Position", health.net_position.to_string());
    push(
        "Financial Health",
        "Maintenance Ratio (%)",
        health.maintenance_ratio.to_string(),
    );
    push("Financial Health", "Risk Level", health.risk_level_label.to_string());

    for finding in &report.risk_assessment {
        push(
            "Risk",
            &format!("{} ({})", finding.category_label, finding.severity_label),
            finding.description.clone(),
        );
    }

    for recommendation in &report.executive_summary.recommendations {
        push("Recommendation", "Action", recommendation.clone());
    }

    std::iter::once(SUMMARY_HEADER.to_string())
        .chain(rows.into_iter().map(join_row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LevyStatus, MaintenanceStatus, Priority};
    use crate::metrics::{financial_metrics, maintenance_metrics, occupancy_metrics};
    use crate::report::{FinancialReport, MaintenanceReport, OccupancyReport};
    use chrono::{TimeZone, Utc};

    fn owner() -> Owner {
        Owner {
            owner_id: "OWN-7".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ortiz".to_string(),
            email: Some("ana@example.com".to_string()),
            phone: None,
            move_in_date: NaiveDate::from_ymd_opt(2024, 9, 1),
        }
    }

    fn maintenance_report(description: &str) -> Report {
        let created_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let requests = vec![MaintenanceRequest {
            request_id: "MR-1".to_string(),
            unit_number: "101".to_string(),
            description: description.to_string(),
            status: MaintenanceStatus::Completed,
            priority: Priority::High,
            request_type: "plumbing".to_string(),
            location: None,
            created_at,
            completed_at: Some(created_at + chrono::Duration::hours(30)),
            estimated_cost: Some(180.5),
            owner: Some(owner()),
        }];
        Report::Maintenance(MaintenanceReport {
            period: "All time".to_string(),
            generated_at: created_at,
            metrics: maintenance_metrics(&requests),
            requests,
        })
    }

    #[test]
    fn maintenance_rows_use_locale_dates_and_blank_missing_values() {
        let csv = export_csv(&maintenance_report("Tap drips"));
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines[0], MAINTENANCE_HEADER);
        assert_eq!(
            lines[1],
            "MR-1,101,Ana Ortiz,Tap drips,plumbing,,high,completed,3/2/2026,3/3/2026,180.5"
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn quotes_are_doubled_and_wrapped() {
        let csv = export_csv(&maintenance_report("Door marked \"B\" sticks"));
        assert!(csv.contains(",\"Door marked \"\"B\"\" sticks\","));
    }

    #[test]
    fn commas_without_quotes_pass_through() {
        let csv = export_csv(&maintenance_report("Sink, bath"));
        assert!(csv.contains(",Sink, bath,"));
    }

    #[test]
    fn financial_rows_keep_record_order() {
        let due = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let payment = |id: &str, status: LevyStatus| LevyPayment {
            payment_id: id.to_string(),
            unit_number: "204".to_string(),
            owner_id: None,
            quarter: 1,
            year: 2026,
            amount: 1275.0,
            status,
            due_date: due,
            paid_date: (status == LevyStatus::Paid).then_some(due),
            late_fee: None,
            owner: None,
        };
        let payments = vec![
            payment("LP-9", LevyStatus::Pending),
            payment("LP-2", LevyStatus::Paid),
        ];
        let as_of = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let report = Report::Financial(FinancialReport {
            period: "All time".to_string(),
            generated_at: as_of,
            metrics: financial_metrics(&payments, as_of),
            payments,
        });

        let csv = export_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "LP-9,204,,1,2026,1275,pending,3/31/2026,,");
        assert_eq!(lines[2], "LP-2,204,,1,2026,1275,paid,3/31/2026,3/31/2026,");
        assert_eq!(
            export_file_name(&report),
            "strata-financial-report-2026-04-01.csv"
        );
    }

    #[test]
    fn empty_occupancy_report_is_just_the_header() {
        let report = Report::Occupancy(OccupancyReport {
            period: "All time".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            metrics: occupancy_metrics(&[]),
            units: Vec::new(),
        });
        assert_eq!(export_csv(&report), OCCUPANCY_HEADER);
    }

    #[test]
    fn occupied_unit_row_carries_owner_details() {
        let unit = Unit {
            unit_number: "305".to_string(),
            unit_type: "Penthouse".to_string(),
            square_meters: Some(140.0),
            floor_level: Some(3),
            parking_spaces: 2,
            storage_unit: true,
            balcony_size: Some(18.5),
            owner: Some(owner()),
        };
        assert_eq!(
            join_row(unit_row(&unit)),
            "305,Penthouse,140,3,2,true,18.5,Ana Ortiz,ana@example.com,,9/1/2024"
        );
    }
}
