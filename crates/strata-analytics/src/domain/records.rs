use super::field::{FieldValue, Record};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Month-year grouping key, e.g. `2026-03`.
pub const MONTH_KEY: &str = "%Y-%m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStatus {
    Pending,
    #[serde(alias = "in_progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Emergency,
}

impl Priority {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Emergency => "emergency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevyStatus {
    Paid,
    #[serde(alias = "unpaid")]
    Pending,
    Overdue,
}

impl LevyStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
        }
    }
}

/// Registered owner of a unit on the strata roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub owner_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub move_in_date: Option<NaiveDate>,
}

impl Owner {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Record for Owner {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "owner_id" => Some(self.owner_id.as_str().into()),
            "first_name" => Some(self.first_name.as_str().into()),
            "last_name" => Some(self.last_name.as_str().into()),
            "owner_name" => Some(FieldValue::Text(Cow::Owned(self.full_name()))),
            "email" => self.email.as_deref().map(FieldValue::from),
            "phone" => self.phone.as_deref().map(FieldValue::from),
            "move_in_date" => self.move_in_date.map(start_of_day).map(FieldValue::Timestamp),
            "move_in_month" => self
                .move_in_date
                .map(|date| FieldValue::Text(Cow::Owned(date.format(MONTH_KEY).to_string()))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_number: String,
    pub unit_type: String,
    #[serde(default)]
    pub square_meters: Option<f64>,
    #[serde(default)]
    pub floor_level: Option<i32>,
    #[serde(default)]
    pub parking_spaces: u32,
    #[serde(default)]
    pub storage_unit: bool,
    #[serde(default)]
    pub balcony_size: Option<f64>,
    /// `None` marks a vacant unit.
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl Unit {
    pub fn is_occupied(&self) -> bool {
        self.owner.is_some()
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.unit_number.trim().is_empty() {
            return Err(RecordError::MissingUnitNumber);
        }
        if let Some(size) = self.square_meters {
            if !size.is_finite() || size < 0.0 {
                return Err(RecordError::NegativeAmount {
                    record: self.unit_number.clone(),
                    field: "square_meters",
                });
            }
        }
        Ok(())
    }
}

impl Record for Unit {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "unit_number" => Some(self.unit_number.as_str().into()),
            "unit_type" => Some(self.unit_type.as_str().into()),
            "square_meters" => self.square_meters.map(FieldValue::Number),
            "floor_level" => self.floor_level.map(|floor| FieldValue::Number(floor as f64)),
            "parking_spaces" => Some(FieldValue::Number(self.parking_spaces as f64)),
            "storage_unit" => Some(FieldValue::Flag(self.storage_unit)),
            "balcony_size" => self.balcony_size.map(FieldValue::Number),
            "occupied" => Some(FieldValue::Flag(self.is_occupied())),
            other => self.owner.as_ref().and_then(|owner| owner.field(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRequest {
    pub request_id: String,
    pub unit_number: String,
    pub description: String,
    pub status: MaintenanceStatus,
    pub priority: Priority,
    pub request_type: String,
    #[serde(default)]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    /// Owner of the unit at fetch time, attached by the record source.
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl MaintenanceRequest {
    /// Whole hours between creation and completion, when both are known.
    pub fn response_hours(&self) -> Option<i64> {
        if self.status != MaintenanceStatus::Completed {
            return None;
        }
        let completed_at = self.completed_at?;
        let seconds = (completed_at - self.created_at).num_seconds();
        debug_assert!(seconds >= 0, "completed_at precedes created_at");
        Some((seconds as f64 / 3600.0).round() as i64)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.unit_number.trim().is_empty() {
            return Err(RecordError::MissingUnitNumber);
        }
        if let Some(completed_at) = self.completed_at {
            if self.status != MaintenanceStatus::Completed {
                return Err(RecordError::CompletedAtWithoutCompletion {
                    request_id: self.request_id.clone(),
                });
            }
            if completed_at < self.created_at {
                return Err(RecordError::CompletedBeforeCreated {
                    request_id: self.request_id.clone(),
                });
            }
        }
        if let Some(cost) = self.estimated_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(RecordError::NegativeAmount {
                    record: self.request_id.clone(),
                    field: "estimated_cost",
                });
            }
        }
        Ok(())
    }
}

impl Record for MaintenanceRequest {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "request_id" => Some(self.request_id.as_str().into()),
            "unit_number" => Some(self.unit_number.as_str().into()),
            "description" => Some(self.description.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "priority" => Some(self.priority.as_str().into()),
            "request_type" => Some(self.request_type.as_str().into()),
            "location" => self.location.as_deref().map(FieldValue::from),
            "created_at" => Some(FieldValue::Timestamp(self.created_at.naive_utc())),
            "created_month" => Some(FieldValue::Text(Cow::Owned(
                self.created_at.format(MONTH_KEY).to_string(),
            ))),
            "completed_at" => self
                .completed_at
                .map(|at| FieldValue::Timestamp(at.naive_utc())),
            "estimated_cost" => self.estimated_cost.map(FieldValue::Number),
            other => self.owner.as_ref().and_then(|owner| owner.field(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevyPayment {
    pub payment_id: String,
    pub unit_number: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub quarter: u8,
    pub year: i32,
    pub amount: f64,
    pub status: LevyStatus,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub paid_date: Option<NaiveDate>,
    #[serde(default)]
    pub late_fee: Option<f64>,
    #[serde(default)]
    pub owner: Option<Owner>,
}

impl LevyPayment {
    pub fn is_paid(&self) -> bool {
        self.status == LevyStatus::Paid
    }

    /// Unpaid and past its due date as of `now`.
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        !self.is_paid() && start_of_day(self.due_date) < now
    }

    /// Paid on or before the due date.
    pub fn is_on_time(&self) -> bool {
        self.is_paid()
            && self
                .paid_date
                .is_some_and(|paid_date| paid_date <= self.due_date)
    }

    /// Days between due date and payment for payments settled late.
    pub fn days_late(&self) -> Option<i64> {
        if !self.is_paid() {
            return None;
        }
        let paid_date = self.paid_date?;
        let days = (paid_date - self.due_date).num_days();
        (days > 0).then_some(days)
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.unit_number.trim().is_empty() {
            return Err(RecordError::MissingUnitNumber);
        }
        if !(1..=4).contains(&self.quarter) {
            return Err(RecordError::InvalidQuarter {
                payment_id: self.payment_id.clone(),
                quarter: self.quarter,
            });
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(RecordError::NegativeAmount {
                record: self.payment_id.clone(),
                field: "amount",
            });
        }
        if self.paid_date.is_some() && !self.is_paid() {
            return Err(RecordError::PaidDateWithoutPayment {
                payment_id: self.payment_id.clone(),
            });
        }
        Ok(())
    }
}

impl Record for LevyPayment {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "payment_id" => Some(self.payment_id.as_str().into()),
            "unit_number" => Some(self.unit_number.as_str().into()),
            "owner_id" => self.owner_id.as_deref().map(FieldValue::from),
            "quarter" => Some(FieldValue::Number(self.quarter as f64)),
            "year" => Some(FieldValue::Number(self.year as f64)),
            "amount" => Some(FieldValue::Number(self.amount)),
            "status" => Some(self.status.as_str().into()),
            "due_date" => Some(FieldValue::Timestamp(start_of_day(self.due_date))),
            "paid_date" => self.paid_date.map(start_of_day).map(FieldValue::Timestamp),
            "late_fee" => self.late_fee.map(FieldValue::Number),
            other => self.owner.as_ref().and_then(|owner| owner.field(other)),
        }
    }
}

/// Invariant violations caught when records enter the system.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RecordError {
    #[error("record is missing its unit number")]
    MissingUnitNumber,
    #[error("request {request_id} has completed_at but is not completed")]
    CompletedAtWithoutCompletion { request_id: String },
    #[error("request {request_id} was completed before it was created")]
    CompletedBeforeCreated { request_id: String },
    #[error("payment {payment_id} has a paid_date but is not paid")]
    PaidDateWithoutPayment { payment_id: String },
    #[error("payment {payment_id} has quarter {quarter}, expected 1-4")]
    InvalidQuarter { payment_id: String, quarter: u8 },
    #[error("{record} has a negative or non-finite {field}")]
    NegativeAmount { record: String, field: &'static str },
}

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
