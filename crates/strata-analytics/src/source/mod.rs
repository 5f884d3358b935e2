//! Boundary to whatever store holds the strata records.

mod import;
mod memory;

pub use import::{load_snapshot, ImportError};
pub use memory::{InMemorySource, Snapshot};

use crate::domain::{LevyPayment, MaintenanceRequest, Unit};
use crate::query::{FetchRequest, Table};
use async_trait::async_trait;

/// Read access to the record store, one fetch per table. Implementations
/// apply the request's filter, sort and limit, and attach related owners to
/// maintenance requests and levy payments where they know them.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn units(&self, request: &FetchRequest) -> Result<Vec<Unit>, SourceError>;

    async fn maintenance_requests(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<MaintenanceRequest>, SourceError>;

    async fn levy_payments(&self, request: &FetchRequest)
        -> Result<Vec<LevyPayment>, SourceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{table} unavailable: {reason}")]
    Unavailable { table: Table, reason: String },
    #[error("{table} returned malformed data: {reason}")]
    Malformed { table: Table, reason: String },
}

impl SourceError {
    pub fn table(&self) -> Table {
        match self {
            SourceError::Unavailable { table, .. } | SourceError::Malformed { table, .. } => {
                *table
            }
        }
    }
}
