use crate::aggregate::{self, stats};
use crate::domain::{Owner, Unit};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyMetrics {
    pub total_units: usize,
    pub occupied_units: usize,
    pub vacant_units: usize,
    /// Percentage of units with an owner, 0–100.
    pub occupancy_rate: f64,
    pub by_unit_type: BTreeMap<String, usize>,
    pub size_distribution: SizeDistribution,
    pub move_in_trend: BTreeMap<String, usize>,
    pub parking_spaces: u64,
    pub storage_units: usize,
}

/// Spread of known unit sizes in square metres.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeDistribution {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: f64,
    pub median: Option<f64>,
}

pub fn occupancy_metrics(units: &[Unit]) -> OccupancyMetrics {
    let total_units = units.len();
    let owners: Vec<&Owner> = units.iter().filter_map(|unit| unit.owner.as_ref()).collect();
    let occupied_units = owners.len();

    let with_move_in: Vec<&Owner> = owners
        .iter()
        .copied()
        .filter(|owner| owner.move_in_date.is_some())
        .collect();

    OccupancyMetrics {
        total_units,
        occupied_units,
        vacant_units: total_units - occupied_units,
        occupancy_rate: stats::percentage(occupied_units as f64, total_units as f64),
        by_unit_type: aggregate::group_by(units, "unit_type"),
        size_distribution: size_distribution(units),
        move_in_trend: aggregate::group_by(&with_move_in, "move_in_month"),
        parking_spaces: units.iter().map(|unit| unit.parking_spaces as u64).sum(),
        storage_units: units.iter().filter(|unit| unit.storage_unit).count(),
    }
}

pub fn size_distribution(units: &[Unit]) -> SizeDistribution {
    let mut sizes: Vec<f64> = units.iter().filter_map(|unit| unit.square_meters).collect();
    sizes.sort_by(f64::total_cmp);

    SizeDistribution {
        count: sizes.len(),
        min: aggregate::min(units, "square_meters"),
        max: aggregate::max(units, "square_meters"),
        average: aggregate::avg(units, "square_meters"),
        median: stats::middle_element(&sizes),
    }
}
