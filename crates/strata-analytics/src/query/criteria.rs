use serde::{Deserialize, Deserializer, Serialize};

/// Caller-supplied filter values, one optional string per key.
///
/// Everything stays as raw text until [`super::FilterSpec::build`] decides
/// which keys apply to a table and parses them leniently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    #[serde(deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(alias = "dateFrom", deserialize_with = "empty_string_as_none")]
    pub date_from: Option<String>,
    #[serde(alias = "dateTo", deserialize_with = "empty_string_as_none")]
    pub date_to: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    pub status: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    pub priority: Option<String>,
    #[serde(
        rename = "type",
        alias = "request_type",
        deserialize_with = "empty_string_as_none"
    )]
    pub request_type: Option<String>,
    #[serde(alias = "paymentStatus", deserialize_with = "empty_string_as_none")]
    pub payment_status: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    pub quarter: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    pub year: Option<String>,
    #[serde(alias = "unitType", deserialize_with = "empty_string_as_none")]
    pub unit_type: Option<String>,
    #[serde(alias = "minSize", deserialize_with = "empty_string_as_none")]
    pub min_size: Option<String>,
    #[serde(alias = "maxSize", deserialize_with = "empty_string_as_none")]
    pub max_size: Option<String>,
}

impl FilterCriteria {
    /// Builds criteria from loose key/value pairs such as query-string
    /// parameters. Unknown keys and blank values are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::default();
        for (key, value) in pairs {
            let value = non_empty(value.as_ref());
            let slot = match key.as_ref() {
                "search" => &mut criteria.search,
                "date_from" | "dateFrom" => &mut criteria.date_from,
                "date_to" | "dateTo" => &mut criteria.date_to,
                "status" => &mut criteria.status,
                "priority" => &mut criteria.priority,
                "type" | "request_type" => &mut criteria.request_type,
                "payment_status" | "paymentStatus" => &mut criteria.payment_status,
                "quarter" => &mut criteria.quarter,
                "year" => &mut criteria.year,
                "unit_type" | "unitType" => &mut criteria.unit_type,
                "min_size" | "minSize" => &mut criteria.min_size,
                "max_size" | "maxSize" => &mut criteria.max_size,
                _ => continue,
            };
            *slot = value;
        }
        criteria
    }

    pub fn with_date_range(
        mut self,
        from: Option<chrono::NaiveDate>,
        to: Option<chrono::NaiveDate>,
    ) -> Self {
        if let Some(from) = from {
            self.date_from = Some(from.format("%Y-%m-%d").to_string());
        }
        if let Some(to) = to {
            self.date_to = Some(to.format("%Y-%m-%d").to_string());
        }
        self
    }
}

pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.as_deref().and_then(non_empty))
}
