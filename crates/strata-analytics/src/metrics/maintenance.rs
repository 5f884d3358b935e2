use crate::aggregate::{self, stats};
use crate::domain::{MaintenanceRequest, MaintenanceStatus, Priority};
use serde::Serialize;
use std::collections::BTreeMap;

const TOP_UNIT_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceMetrics {
    pub total_requests: usize,
    pub open_requests: usize,
    pub emergency_requests: usize,
    pub completion_rate: f64,
    pub by_status: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_type: BTreeMap<String, usize>,
    pub by_location: BTreeMap<String, usize>,
    pub by_month: BTreeMap<String, usize>,
    pub response_times: ResponseTimeAnalysis,
    pub top_units: Vec<UnitRequestCount>,
    pub costs: CostAnalysis,
}

/// Whole-hour durations of completed requests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseTimeAnalysis {
    pub average: f64,
    pub median: i64,
    pub fastest: i64,
    pub slowest: i64,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitRequestCount {
    pub unit_number: String,
    pub requests: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CostAnalysis {
    pub total_estimated: f64,
    pub average_estimated: f64,
    pub costed_requests: usize,
    pub by_type: BTreeMap<String, f64>,
    pub by_priority: BTreeMap<String, f64>,
    pub emergency_total: f64,
}

pub fn maintenance_metrics(requests: &[MaintenanceRequest]) -> MaintenanceMetrics {
    let total_requests = aggregate::count(requests);
    let completed = requests
        .iter()
        .filter(|request| request.status == MaintenanceStatus::Completed)
        .count();
    let open_requests = requests
        .iter()
        .filter(|request| request.status.is_open())
        .count();
    let emergency_requests = requests
        .iter()
        .filter(|request| request.priority == Priority::Emergency)
        .count();

    MaintenanceMetrics {
        total_requests,
        open_requests,
        emergency_requests,
        completion_rate: stats::percentage(completed as f64, total_requests as f64),
        by_status: aggregate::group_by(requests, "status"),
        by_priority: aggregate::group_by(requests, "priority"),
        by_type: aggregate::group_by(requests, "request_type"),
        by_location: aggregate::group_by(requests, "location"),
        by_month: aggregate::group_by(requests, "created_month"),
        response_times: response_times(requests),
        top_units: top_units(requests),
        costs: cost_analysis(requests),
    }
}

pub fn response_times(requests: &[MaintenanceRequest]) -> ResponseTimeAnalysis {
    let mut durations: Vec<i64> = requests
        .iter()
        .filter_map(MaintenanceRequest::response_hours)
        .collect();
    durations.sort_unstable();

    let (Some(&fastest), Some(&slowest)) = (durations.first(), durations.last()) else {
        return ResponseTimeAnalysis::default();
    };

    let as_float: Vec<f64> = durations.iter().map(|hours| *hours as f64).collect();

    ResponseTimeAnalysis {
        average: stats::mean(&as_float),
        median: stats::middle_element(&durations).unwrap_or_default(),
        fastest,
        slowest,
        total: durations.len(),
    }
}

fn top_units(requests: &[MaintenanceRequest]) -> Vec<UnitRequestCount> {
    aggregate::ranked_counts(requests, "unit_number")
        .into_iter()
        .take(TOP_UNIT_LIMIT)
        .map(|(unit_number, requests)| UnitRequestCount {
            unit_number,
            requests,
        })
        .collect()
}

fn cost_analysis(requests: &[MaintenanceRequest]) -> CostAnalysis {
    let costed: Vec<&MaintenanceRequest> = requests
        .iter()
        .filter(|request| request.estimated_cost.is_some())
        .collect();
    let emergency: Vec<&MaintenanceRequest> = costed
        .iter()
        .copied()
        .filter(|request| request.priority == Priority::Emergency)
        .collect();

    CostAnalysis {
        total_estimated: aggregate::sum(&costed, "estimated_cost"),
        average_estimated: aggregate::avg(&costed, "estimated_cost"),
        costed_requests: costed.len(),
        by_type: aggregate::group_and_sum(&costed, "request_type", "estimated_cost"),
        by_priority: aggregate::group_and_sum(&costed, "priority", "estimated_cost"),
        emergency_total: aggregate::sum(&emergency, "estimated_cost"),
    }
}
