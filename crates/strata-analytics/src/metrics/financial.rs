use crate::aggregate::{self, stats, stats::RunningMean};
use crate::domain::{start_of_day, LevyPayment};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialMetrics {
    pub payment_count: usize,
    pub total_levied: f64,
    pub total_collected: f64,
    pub total_outstanding: f64,
    /// Percentage of levied amounts collected, 0–100.
    pub collection_rate: f64,
    pub total_late_fees: f64,
    pub by_status: BTreeMap<String, usize>,
    pub by_quarter: BTreeMap<String, QuarterTotals>,
    pub overdue: OverdueAnalysis,
    pub unit_performance: Vec<UnitPaymentPerformance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuarterTotals {
    pub levied: f64,
    pub collected: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverdueAnalysis {
    pub count: usize,
    pub amount: f64,
    pub average_days_overdue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitPaymentPerformance {
    pub unit_number: String,
    pub total_payments: usize,
    pub paid_payments: usize,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub late_payments: u64,
    pub average_days_late: f64,
    /// Percentage of payments settled, 0–100.
    pub payment_rate: f64,
}

/// Per-unit running totals while folding over payments.
#[derive(Debug, Clone, Default)]
struct PaymentAccumulator {
    total_payments: usize,
    paid_payments: usize,
    total_amount: f64,
    paid_amount: f64,
    days_late: RunningMean,
}

impl PaymentAccumulator {
    fn record(mut self, payment: &LevyPayment) -> Self {
        self.total_payments += 1;
        self.total_amount += payment.amount;
        if payment.is_paid() {
            self.paid_payments += 1;
            self.paid_amount += payment.amount;
        }
        if let Some(days) = payment.days_late() {
            self.days_late.push(days as f64);
        }
        self
    }

    fn finish(self, unit_number: String) -> UnitPaymentPerformance {
        UnitPaymentPerformance {
            unit_number,
            total_payments: self.total_payments,
            paid_payments: self.paid_payments,
            total_amount: self.total_amount,
            paid_amount: self.paid_amount,
            late_payments: self.days_late.count(),
            average_days_late: self.days_late.mean(),
            payment_rate: stats::percentage(
                self.paid_payments as f64,
                self.total_payments as f64,
            ),
        }
    }
}

/// Levy totals, overdue exposure and per-unit payment behaviour as of `as_of`.
pub fn financial_metrics(payments: &[LevyPayment], as_of: DateTime<Utc>) -> FinancialMetrics {
    let paid: Vec<&LevyPayment> = payments.iter().filter(|p| p.is_paid()).collect();

    let total_levied = aggregate::sum(payments, "amount");
    let total_collected = aggregate::sum(&paid, "amount");

    FinancialMetrics {
        payment_count: payments.len(),
        total_levied,
        total_collected,
        total_outstanding: total_levied - total_collected,
        collection_rate: stats::percentage(total_collected, total_levied),
        total_late_fees: aggregate::sum(payments, "late_fee"),
        by_status: aggregate::group_by(payments, "status"),
        by_quarter: quarter_totals(payments),
        overdue: overdue_analysis(payments, as_of),
        unit_performance: unit_performance(payments),
    }
}

pub fn overdue_analysis(payments: &[LevyPayment], as_of: DateTime<Utc>) -> OverdueAnalysis {
    let now = as_of.naive_utc();
    let overdue: Vec<&LevyPayment> = payments.iter().filter(|p| p.is_overdue(now)).collect();

    let days: Vec<f64> = overdue
        .iter()
        .map(|payment| (now - start_of_day(payment.due_date)).num_days() as f64)
        .collect();

    OverdueAnalysis {
        count: overdue.len(),
        amount: aggregate::sum(&overdue, "amount"),
        average_days_overdue: stats::mean(&days),
    }
}

fn quarter_totals(payments: &[LevyPayment]) -> BTreeMap<String, QuarterTotals> {
    payments
        .iter()
        .fold(BTreeMap::new(), |mut quarters, payment| {
            let key = format!("{}-Q{}", payment.year, payment.quarter);
            let entry: &mut QuarterTotals = quarters.entry(key).or_default();
            entry.levied += payment.amount;
            if payment.is_paid() {
                entry.collected += payment.amount;
            }
            quarters
        })
}

/// One entry per unit, ordered by unit number.
pub fn unit_performance(payments: &[LevyPayment]) -> Vec<UnitPaymentPerformance> {
    payments
        .iter()
        .fold(
            BTreeMap::<&str, PaymentAccumulator>::new(),
            |mut units, payment| {
                let accumulator = units.remove(payment.unit_number.as_str()).unwrap_or_default();
                units.insert(payment.unit_number.as_str(), accumulator.record(payment));
                units
            },
        )
        .into_iter()
        .map(|(unit_number, accumulator)| accumulator.finish(unit_number.to_string()))
        .collect()
}
