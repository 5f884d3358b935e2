use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use strata_analytics::error::AppError;
use strata_analytics::source::load_snapshot;
use strata_analytics::{InMemorySource, Snapshot};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the record source from a JSON snapshot or CSV directory. Without a
/// path the service starts over an empty snapshot.
pub(crate) fn load_source(data_path: Option<&Path>) -> Result<InMemorySource, AppError> {
    match data_path {
        Some(path) => Ok(InMemorySource::new(load_snapshot(path)?)),
        None => {
            warn!("no data path configured, serving an empty snapshot");
            Ok(InMemorySource::new(Snapshot::default()))
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
