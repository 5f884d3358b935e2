use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::cmp::Ordering;

/// A single field read off a record by name.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Timestamp(NaiveDateTime),
    Flag(bool),
}

impl FieldValue<'_> {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) if value.is_finite() => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            FieldValue::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Raw value rendered as a grouping key. Whole numbers drop the
    /// fractional part so `quarter = 1` keys as `"1"`.
    pub fn to_key(&self) -> String {
        match self {
            FieldValue::Text(value) => value.to_string(),
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Timestamp(value) => value.format("%Y-%m-%dT%H:%M:%S").to_string(),
            FieldValue::Flag(value) => value.to_string(),
        }
    }

    /// Ordering used by sorted fetches. Values of different kinds compare
    /// by kind so mixed columns still sort deterministically.
    pub fn sort_cmp(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Flag(a), FieldValue::Flag(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Flag(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Timestamp(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }
}

impl From<f64> for FieldValue<'_> {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(Cow::Borrowed(value))
    }
}

/// Named field access shared by filters, sorting and aggregation.
///
/// Returning `None` means the field is missing (or null) on this record,
/// which is distinct from a present zero.
pub trait Record {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (**self).field(name)
    }
}
