use super::Snapshot;
use crate::domain::{
    LevyPayment, LevyStatus, MaintenanceRequest, MaintenanceStatus, Owner, Priority, RecordError,
    Unit,
};
use crate::query::Table;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {table}: {source}")]
    Csv {
        table: Table,
        #[source]
        source: csv::Error,
    },
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{table} row {row}: unreadable {column} value `{value}`")]
    Field {
        table: Table,
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Loads a snapshot from a JSON document or from a directory holding
/// `units.csv`, `maintenance_requests.csv` and `levy_payments.csv`. Records
/// are validated and owners linked before the snapshot is returned.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, ImportError> {
    let snapshot = if path.is_dir() {
        read_csv_directory(path)?
    } else {
        let file = File::open(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        read_json_snapshot(file)?
    };

    let snapshot = snapshot.linked()?;
    info!(
        path = %path.display(),
        units = snapshot.units.len(),
        maintenance_requests = snapshot.maintenance_requests.len(),
        levy_payments = snapshot.levy_payments.len(),
        "loaded record snapshot"
    );
    Ok(snapshot)
}

pub(crate) fn read_json_snapshot<R: Read>(reader: R) -> Result<Snapshot, ImportError> {
    Ok(serde_json::from_reader(reader)?)
}

fn read_csv_directory(dir: &Path) -> Result<Snapshot, ImportError> {
    Ok(Snapshot {
        units: read_table(dir, Table::Units, parse_units)?,
        maintenance_requests: read_table(
            dir,
            Table::MaintenanceRequests,
            parse_maintenance_requests,
        )?,
        levy_payments: read_table(dir, Table::LevyPayments, parse_levy_payments)?,
    })
}

fn read_table<T>(
    dir: &Path,
    table: Table,
    parse: fn(File) -> Result<Vec<T>, ImportError>,
) -> Result<Vec<T>, ImportError> {
    let path = dir.join(format!("{}.csv", table.as_str()));
    if !path.exists() {
        warn!(path = %path.display(), "table file missing, treating as empty");
        return Ok(Vec::new());
    }
    let file = File::open(&path).map_err(|source| ImportError::Io { path, source })?;
    parse(file)
}

fn rows<T: DeserializeOwned, R: Read>(reader: R, table: Table) -> Result<Vec<T>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader
        .deserialize::<T>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ImportError::Csv { table, source })
}

pub(crate) fn parse_units<R: Read>(reader: R) -> Result<Vec<Unit>, ImportError> {
    rows::<UnitRow, _>(reader, Table::Units)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_unit(index + 1))
        .collect()
}

pub(crate) fn parse_maintenance_requests<R: Read>(
    reader: R,
) -> Result<Vec<MaintenanceRequest>, ImportError> {
    rows::<MaintenanceRow, _>(reader, Table::MaintenanceRequests)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_request(index + 1))
        .collect()
}

pub(crate) fn parse_levy_payments<R: Read>(reader: R) -> Result<Vec<LevyPayment>, ImportError> {
    rows::<LevyRow, _>(reader, Table::LevyPayments)?
        .into_iter()
        .enumerate()
        .map(|(index, row)| row.into_payment(index + 1))
        .collect()
}

#[derive(Debug, Deserialize)]
struct UnitRow {
    unit_number: String,
    unit_type: String,
    #[serde(default)]
    square_meters: Option<f64>,
    #[serde(default)]
    floor_level: Option<i32>,
    #[serde(default)]
    parking_spaces: Option<u32>,
    #[serde(default)]
    storage_unit: Option<String>,
    #[serde(default)]
    balcony_size: Option<f64>,
    #[serde(default)]
    owner_id: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    move_in_date: Option<String>,
}

impl UnitRow {
    fn into_unit(self, row: usize) -> Result<Unit, ImportError> {
        let storage_unit = match self.storage_unit.as_deref().map(str::to_ascii_lowercase) {
            None => false,
            Some(flag) => match flag.as_str() {
                "true" | "yes" | "y" | "1" => true,
                "false" | "no" | "n" | "0" | "" => false,
                _ => {
                    return Err(field_error(Table::Units, row, "storage_unit", &flag));
                }
            },
        };

        let owner = match non_empty(self.owner_id) {
            Some(owner_id) => Some(Owner {
                owner_id,
                first_name: self.first_name.unwrap_or_default(),
                last_name: self.last_name.unwrap_or_default(),
                email: non_empty(self.email),
                phone: non_empty(self.phone),
                move_in_date: optional_date(Table::Units, row, "move_in_date", self.move_in_date)?,
            }),
            None => None,
        };

        Ok(Unit {
            unit_number: self.unit_number,
            unit_type: self.unit_type,
            square_meters: self.square_meters,
            floor_level: self.floor_level,
            parking_spaces: self.parking_spaces.unwrap_or_default(),
            storage_unit,
            balcony_size: self.balcony_size,
            owner,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MaintenanceRow {
    request_id: String,
    unit_number: String,
    #[serde(default)]
    description: String,
    status: MaintenanceStatus,
    priority: Priority,
    #[serde(alias = "type")]
    request_type: String,
    #[serde(default)]
    location: Option<String>,
    created_at: String,
    #[serde(default)]
    completed_at: Option<String>,
    #[serde(default)]
    estimated_cost: Option<f64>,
}

impl MaintenanceRow {
    fn into_request(self, row: usize) -> Result<MaintenanceRequest, ImportError> {
        let table = Table::MaintenanceRequests;
        let created_at = parse_timestamp(&self.created_at)
            .ok_or_else(|| field_error(table, row, "created_at", &self.created_at))?;
        let completed_at = match non_empty(self.completed_at) {
            Some(value) => Some(
                parse_timestamp(&value)
                    .ok_or_else(|| field_error(table, row, "completed_at", &value))?,
            ),
            None => None,
        };

        Ok(MaintenanceRequest {
            request_id: self.request_id,
            unit_number: self.unit_number,
            description: self.description,
            status: self.status,
            priority: self.priority,
            request_type: self.request_type,
            location: non_empty(self.location),
            created_at,
            completed_at,
            estimated_cost: self.estimated_cost,
            owner: None,
        })
    }
}

#[derive(Debug, Deserialize)]
struct LevyRow {
    payment_id: String,
    unit_number: String,
    #[serde(default)]
    owner_id: Option<String>,
    quarter: u8,
    year: i32,
    amount: f64,
    status: LevyStatus,
    due_date: String,
    #[serde(default)]
    paid_date: Option<String>,
    #[serde(default)]
    late_fee: Option<f64>,
}

impl LevyRow {
    fn into_payment(self, row: usize) -> Result<LevyPayment, ImportError> {
        let table = Table::LevyPayments;
        let due_date = parse_timestamp(&self.due_date)
            .map(|at| at.date_naive())
            .ok_or_else(|| field_error(table, row, "due_date", &self.due_date))?;

        Ok(LevyPayment {
            payment_id: self.payment_id,
            unit_number: self.unit_number,
            owner_id: non_empty(self.owner_id),
            quarter: self.quarter,
            year: self.year,
            amount: self.amount,
            status: self.status,
            due_date,
            paid_date: optional_date(table, row, "paid_date", self.paid_date)?,
            late_fee: self.late_fee,
            owner: None,
        })
    }
}

fn field_error(table: Table, row: usize, column: &'static str, value: &str) -> ImportError {
    ImportError::Field {
        table,
        row,
        column,
        value: value.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn optional_date(
    table: Table,
    row: usize,
    column: &'static str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, ImportError> {
    match non_empty(value) {
        Some(value) => parse_timestamp(&value)
            .map(|at| Some(at.date_naive()))
            .ok_or_else(|| field_error(table, row, column, &value)),
        None => Ok(None),
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (read as UTC) or a bare
/// `YYYY-MM-DD` (midnight UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(at.with_timezone(&Utc));
    }

    if let Ok(at) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(at.and_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|at| at.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unit_rows_build_owners_only_when_owner_id_present() {
        let csv = "\
unit_number,unit_type,square_meters,floor_level,parking_spaces,storage_unit,balcony_size,owner_id,first_name,last_name,email,phone,move_in_date
101, Studio ,42.5,1,1,yes,,OWN-1,Mia,Chen,mia@example.com,,2025-06-01
102,2 Bedroom,,2,,,,,,,,,
";
        let units = parse_units(csv.as_bytes()).expect("units parse");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit_type, "Studio");
        assert!(units[0].storage_unit);
        assert_eq!(units[0].square_meters, Some(42.5));
        let owner = units[0].owner.as_ref().expect("owner");
        assert_eq!(owner.move_in_date, NaiveDate::from_ymd_opt(2025, 6, 1));
        assert!(owner.phone.is_none());
        assert!(units[1].owner.is_none());
        assert_eq!(units[1].square_meters, None);
        assert_eq!(units[1].parking_spaces, 0);
    }

    #[test]
    fn maintenance_rows_accept_mixed_timestamp_formats() {
        let csv = "\
request_id,unit_number,description,status,priority,type,location,created_at,completed_at,estimated_cost
MR-1,101,Leak,completed,high,plumbing,kitchen,2026-03-02T09:00:00Z,2026-03-02T14:00:00+00:00,120
MR-2,102,Squeak,in_progress,low,carpentry,,2026-03-05,,
";
        let requests = parse_maintenance_requests(csv.as_bytes()).expect("requests parse");
        assert_eq!(requests[0].response_hours(), Some(5));
        assert_eq!(requests[1].status, MaintenanceStatus::InProgress);
        assert_eq!(
            requests[1].created_at,
            Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap()
        );
        assert!(requests[1].location.is_none());
    }

    #[test]
    fn unreadable_timestamp_names_row_and_column() {
        let csv = "\
request_id,unit_number,description,status,priority,type,location,created_at,completed_at,estimated_cost
MR-1,101,Leak,pending,high,plumbing,,next tuesday,,
";
        let err = parse_maintenance_requests(csv.as_bytes()).expect_err("bad timestamp");
        assert!(matches!(
            err,
            ImportError::Field { row: 1, column: "created_at", .. }
        ));
    }

    #[test]
    fn levy_rows_treat_unpaid_as_pending() {
        let csv = "\
payment_id,unit_number,owner_id,quarter,year,amount,status,due_date,paid_date,late_fee
LP-1,101,OWN-1,1,2026,1275,paid,2026-03-31,2026-03-28,
LP-2,102,,1,2026,1275,unpaid,2026-03-31,,25
";
        let payments = parse_levy_payments(csv.as_bytes()).expect("payments parse");
        assert_eq!(payments[1].status, LevyStatus::Pending);
        assert_eq!(payments[1].late_fee, Some(25.0));
        assert!(payments[1].owner_id.is_none());
        assert!(payments[0].is_on_time());
    }

    #[test]
    fn json_snapshot_defaults_missing_tables() {
        let json = r#"{"units":[{"unit_number":"101","unit_type":"Studio"}]}"#;
        let snapshot = read_json_snapshot(json.as_bytes()).expect("json parses");
        assert_eq!(snapshot.units.len(), 1);
        assert!(snapshot.levy_payments.is_empty());
    }
}
