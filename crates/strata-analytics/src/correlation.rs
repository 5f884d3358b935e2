//! Joins maintenance frequency with payment reliability per unit.
//!
//! Rates here are fractions in `0.0..=1.0`, unlike the percentage rates the
//! financial calculator reports.

use crate::aggregate::stats;
use crate::domain::{LevyPayment, MaintenanceRequest};
use serde::Serialize;
use std::collections::BTreeMap;

/// More requests than this marks a unit as high-maintenance.
pub const HIGH_MAINTENANCE_REQUESTS: usize = 3;
/// Payment rate below this marks a unit as a low payer.
pub const LOW_PAYMENT_RATE: f64 = 0.8;
/// Risk units need more requests than this...
pub const RISK_MAINTENANCE_REQUESTS: usize = 2;
/// ...and a payment rate below this.
pub const RISK_PAYMENT_RATE: f64 = 0.9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitCorrelation {
    pub unit_number: String,
    pub maintenance_count: usize,
    pub payment_count: usize,
    pub payment_rate: f64,
    pub on_time_rate: f64,
}

impl UnitCorrelation {
    pub fn is_high_maintenance(&self) -> bool {
        self.maintenance_count > HIGH_MAINTENANCE_REQUESTS
    }

    pub fn is_low_payment(&self) -> bool {
        self.payment_rate < LOW_PAYMENT_RATE
    }

    pub fn is_risk(&self) -> bool {
        self.maintenance_count > RISK_MAINTENANCE_REQUESTS && self.payment_rate < RISK_PAYMENT_RATE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrossAnalysis {
    pub units: Vec<UnitCorrelation>,
    pub high_maintenance_units: Vec<String>,
    pub low_payment_units: Vec<String>,
    pub risk_units: Vec<String>,
}

#[derive(Debug, Default)]
struct UnitTally {
    requests: usize,
    payments: usize,
    paid: usize,
    on_time: usize,
}

/// Every unit seen in either collection gets an entry, ordered by unit
/// number. A unit with no payments has a payment rate of 0.
pub fn cross_analyze(requests: &[MaintenanceRequest], payments: &[LevyPayment]) -> CrossAnalysis {
    let mut tallies: BTreeMap<&str, UnitTally> = BTreeMap::new();

    for request in requests {
        tallies.entry(request.unit_number.as_str()).or_default().requests += 1;
    }

    for payment in payments {
        let tally = tallies.entry(payment.unit_number.as_str()).or_default();
        tally.payments += 1;
        if payment.is_paid() {
            tally.paid += 1;
        }
        if payment.is_on_time() {
            tally.on_time += 1;
        }
    }

    let units: Vec<UnitCorrelation> = tallies
        .into_iter()
        .map(|(unit_number, tally)| UnitCorrelation {
            unit_number: unit_number.to_string(),
            maintenance_count: tally.requests,
            payment_count: tally.payments,
            payment_rate: stats::ratio(tally.paid as f64, tally.payments as f64),
            on_time_rate: stats::ratio(tally.on_time as f64, tally.payments as f64),
        })
        .collect();

    let flagged = |predicate: fn(&UnitCorrelation) -> bool| -> Vec<String> {
        units
            .iter()
            .filter(|unit| predicate(unit))
            .map(|unit| unit.unit_number.clone())
            .collect()
    };

    CrossAnalysis {
        high_maintenance_units: flagged(UnitCorrelation::is_high_maintenance),
        low_payment_units: flagged(UnitCorrelation::is_low_payment),
        risk_units: flagged(UnitCorrelation::is_risk),
        units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LevyStatus, MaintenanceStatus, Priority};
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn request(unit: &str, n: usize) -> MaintenanceRequest {
        MaintenanceRequest {
            request_id: format!("{unit}-{n}"),
            unit_number: unit.to_string(),
            description: "Issue".to_string(),
            status: MaintenanceStatus::Pending,
            priority: Priority::Normal,
            request_type: "general".to_string(),
            location: None,
            created_at: Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap(),
            completed_at: None,
            estimated_cost: None,
            owner: None,
        }
    }

    fn payment(unit: &str, n: usize, status: LevyStatus, days_after_due: i64) -> LevyPayment {
        let due_date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        LevyPayment {
            payment_id: format!("{unit}-{n}"),
            unit_number: unit.to_string(),
            owner_id: None,
            quarter: 1,
            year: 2026,
            amount: 1000.0,
            status,
            due_date,
            paid_date: (status == LevyStatus::Paid).then(|| due_date + Duration::days(days_after_due)),
            late_fee: None,
            owner: None,
        }
    }

    #[test]
    fn busy_unit_with_missed_payment_lands_in_every_cohort() {
        let requests: Vec<_> = (0..4).map(|n| request("101", n)).collect();
        let payments = vec![
            payment("101", 0, LevyStatus::Paid, 0),
            payment("101", 1, LevyStatus::Paid, 3),
            payment("101", 2, LevyStatus::Paid, -2),
            payment("101", 3, LevyStatus::Overdue, 0),
        ];
        let analysis = cross_analyze(&requests, &payments);

        let unit = &analysis.units[0];
        assert_eq!(unit.maintenance_count, 4);
        assert_eq!(unit.payment_rate, 0.75);
        assert_eq!(unit.on_time_rate, 0.5);
        assert_eq!(analysis.high_maintenance_units, vec!["101"]);
        assert_eq!(analysis.low_payment_units, vec!["101"]);
        assert_eq!(analysis.risk_units, vec!["101"]);
    }

    #[test]
    fn thresholds_are_strict_comparisons() {
        let mut requests: Vec<_> = (0..3).map(|n| request("201", n)).collect();
        requests.extend((0..3).map(|n| request("202", n)));
        let mut payments: Vec<_> = (0..4).map(|n| payment("201", n, LevyStatus::Paid, 0)).collect();
        payments.extend((0..9).map(|n| payment("202", n, LevyStatus::Paid, 0)));
        payments.push(payment("202", 9, LevyStatus::Pending, 0));

        let analysis = cross_analyze(&requests, &payments);
        assert!(analysis.high_maintenance_units.is_empty());
        assert!(analysis.low_payment_units.is_empty());
        assert!(analysis.risk_units.is_empty());
    }

    #[test]
    fn units_only_in_maintenance_data_have_zero_payment_rate() {
        let analysis = cross_analyze(&[request("305", 0)], &[]);
        assert_eq!(analysis.units.len(), 1);
        assert_eq!(analysis.units[0].payment_rate, 0.0);
        assert_eq!(analysis.low_payment_units, vec!["305"]);
        assert!(analysis.risk_units.is_empty());
    }
}
