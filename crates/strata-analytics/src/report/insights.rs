use super::views::{
    ExecutiveSummary, FinancialHealth, KeyMetrics, RiskCategory, RiskFinding, RiskLevel,
};
use crate::aggregate::stats;
use crate::correlation::CrossAnalysis;
use crate::metrics::{FinancialMetrics, MaintenanceMetrics, OccupancyMetrics};

const HEALTHY_COLLECTION_RATE: f64 = 85.0;
const MIN_OCCUPANCY_RATE: f64 = 80.0;
const MAX_EMERGENCY_REQUESTS: usize = 5;

const REMINDER_COLLECTION_RATE: f64 = 90.0;
const PREVENTIVE_EMERGENCY_REQUESTS: usize = 3;
const REVIEW_RISK_UNITS: usize = 2;

pub(crate) fn financial_health(
    financial: &FinancialMetrics,
    maintenance: &MaintenanceMetrics,
) -> FinancialHealth {
    let maintenance_cost = maintenance.costs.total_estimated;
    let net_position = financial.total_collected - maintenance_cost;
    let score = (stats::ratio(net_position, financial.total_levied) * 100.0 + 50.0).clamp(0.0, 100.0);

    let risk_level = if net_position < 0.0 {
        RiskLevel::High
    } else if financial.collection_rate < HEALTHY_COLLECTION_RATE {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    FinancialHealth {
        score,
        collection_efficiency: financial.collection_rate,
        maintenance_ratio: stats::percentage(maintenance_cost, financial.total_levied),
        net_position,
        risk_level,
        risk_level_label: risk_level.label(),
    }
}

pub(crate) fn risk_assessment(
    financial: &FinancialMetrics,
    occupancy: &OccupancyMetrics,
    maintenance: &MaintenanceMetrics,
) -> Vec<RiskFinding> {
    let mut findings = Vec::new();

    if financial.collection_rate < HEALTHY_COLLECTION_RATE {
        findings.push(finding(
            RiskCategory::Financial,
            RiskLevel::High,
            format!(
                "Levy collection rate of {:.1}% is below the {HEALTHY_COLLECTION_RATE}% target",
                financial.collection_rate
            ),
            financial.collection_rate,
        ));
    }

    if occupancy.occupancy_rate < MIN_OCCUPANCY_RATE {
        findings.push(finding(
            RiskCategory::Occupancy,
            RiskLevel::Medium,
            format!(
                "Occupancy of {:.1}% is below the {MIN_OCCUPANCY_RATE}% threshold",
                occupancy.occupancy_rate
            ),
            occupancy.occupancy_rate,
        ));
    }

    if maintenance.emergency_requests > MAX_EMERGENCY_REQUESTS {
        findings.push(finding(
            RiskCategory::Maintenance,
            RiskLevel::High,
            format!(
                "{} emergency maintenance requests in the period",
                maintenance.emergency_requests
            ),
            maintenance.emergency_requests as f64,
        ));
    }

    findings
}

fn finding(
    category: RiskCategory,
    severity: RiskLevel,
    description: String,
    metric: f64,
) -> RiskFinding {
    RiskFinding {
        category,
        category_label: category.label(),
        severity,
        severity_label: severity.label(),
        description,
        metric,
    }
}

pub(crate) fn executive_summary(
    maintenance: &MaintenanceMetrics,
    financial: &FinancialMetrics,
    occupancy: &OccupancyMetrics,
    cross_analysis: &CrossAnalysis,
    health: &FinancialHealth,
) -> ExecutiveSummary {
    let risk_units = cross_analysis.risk_units.len();

    let mut highlights = vec![
        format!(
            "Occupancy at {:.1}% with {} of {} units occupied",
            occupancy.occupancy_rate, occupancy.occupied_units, occupancy.total_units
        ),
        format!(
            "{} maintenance requests logged, {} still open and {} flagged as emergencies",
            maintenance.total_requests, maintenance.open_requests, maintenance.emergency_requests
        ),
        format!(
            "Collected ${:.2} of ${:.2} levied ({:.1}% collection rate)",
            financial.total_collected, financial.total_levied, financial.collection_rate
        ),
    ];
    if risk_units > 0 {
        highlights.push(format!(
            "{risk_units} units combine frequent maintenance with irregular levy payments"
        ));
    }

    let mut recommendations = Vec::new();
    if financial.collection_rate < REMINDER_COLLECTION_RATE {
        recommendations.push(
            "Set up automated levy payment reminders ahead of each due date".to_string(),
        );
    }
    if maintenance.emergency_requests > PREVENTIVE_EMERGENCY_REQUESTS {
        recommendations.push(
            "Introduce a preventive maintenance program to cut emergency call-outs".to_string(),
        );
    }
    if risk_units > REVIEW_RISK_UNITS {
        recommendations
            .push("Schedule a quarterly risk review of the flagged units".to_string());
    }

    ExecutiveSummary {
        key_metrics: KeyMetrics {
            total_units: occupancy.total_units,
            occupancy_rate: occupancy.occupancy_rate,
            total_requests: maintenance.total_requests,
            open_requests: maintenance.open_requests,
            emergency_requests: maintenance.emergency_requests,
            total_levied: financial.total_levied,
            collection_rate: financial.collection_rate,
            net_position: health.net_position,
            risk_units,
        },
        highlights,
        recommendations,
    }
}
