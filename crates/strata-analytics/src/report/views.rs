use crate::correlation::CrossAnalysis;
use crate::domain::{LevyPayment, MaintenanceRequest, Unit};
use crate::metrics::{FinancialMetrics, MaintenanceMetrics, OccupancyMetrics};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: MaintenanceMetrics,
    pub requests: Vec<MaintenanceRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReport {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: FinancialMetrics,
    pub payments: Vec<LevyPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyReport {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: OccupancyMetrics,
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComprehensiveReport {
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub maintenance: MaintenanceReport,
    pub financial: FinancialReport,
    pub occupancy: OccupancyReport,
    pub cross_analysis: CrossAnalysis,
    pub financial_health: FinancialHealth,
    pub risk_assessment: Vec<RiskFinding>,
    pub executive_summary: ExecutiveSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialHealth {
    /// 0–100; 50 means collections exactly cover estimated maintenance.
    pub score: f64,
    pub collection_efficiency: f64,
    pub maintenance_ratio: f64,
    pub net_position: f64,
    pub risk_level: RiskLevel,
    pub risk_level_label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Financial,
    Occupancy,
    Maintenance,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Financial => "Financial",
            Self::Occupancy => "Occupancy",
            Self::Maintenance => "Maintenance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskFinding {
    pub category: RiskCategory,
    pub category_label: &'static str,
    pub severity: RiskLevel,
    pub severity_label: &'static str,
    pub description: String,
    /// The metric value that tripped the rule.
    pub metric: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_units: usize,
    pub occupancy_rate: f64,
    pub total_requests: usize,
    pub open_requests: usize,
    pub emergency_requests: usize,
    pub total_levied: f64,
    pub collection_rate: f64,
    pub net_position: f64,
    pub risk_units: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveSummary {
    pub key_metrics: KeyMetrics,
    pub highlights: Vec<String>,
    pub recommendations: Vec<String>,
}
