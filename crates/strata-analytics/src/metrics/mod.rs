//! Domain calculators. Each takes an immutable slice of records and returns
//! a freshly built metrics value; none of them fetch or mutate anything.

pub mod financial;
pub mod maintenance;
pub mod occupancy;

pub use financial::{
    financial_metrics, FinancialMetrics, OverdueAnalysis, QuarterTotals, UnitPaymentPerformance,
};
pub use maintenance::{
    maintenance_metrics, CostAnalysis, MaintenanceMetrics, ResponseTimeAnalysis, UnitRequestCount,
};
pub use occupancy::{occupancy_metrics, OccupancyMetrics, SizeDistribution};
