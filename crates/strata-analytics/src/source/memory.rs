use super::{RecordSource, SourceError};
use crate::domain::{LevyPayment, MaintenanceRequest, Owner, RecordError, Unit};
use crate::query::FetchRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable set of records a report is computed from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub maintenance_requests: Vec<MaintenanceRequest>,
    #[serde(default)]
    pub levy_payments: Vec<LevyPayment>,
}

impl Snapshot {
    /// Validates every record, then attaches each unit's owner to the
    /// requests and payments raised against it.
    pub fn linked(mut self) -> Result<Self, RecordError> {
        for unit in &self.units {
            unit.validate()?;
        }
        for request in &self.maintenance_requests {
            request.validate()?;
        }
        for payment in &self.levy_payments {
            payment.validate()?;
        }

        let owners: HashMap<&str, &Owner> = self
            .units
            .iter()
            .filter_map(|unit| unit.owner.as_ref().map(|owner| (unit.unit_number.as_str(), owner)))
            .collect();

        for request in &mut self.maintenance_requests {
            if request.owner.is_none() {
                request.owner = owners.get(request.unit_number.as_str()).map(|o| (*o).clone());
            }
        }

        for payment in &mut self.levy_payments {
            if payment.owner.is_none() {
                payment.owner = owners.get(payment.unit_number.as_str()).map(|o| (*o).clone());
            }
            if payment.owner_id.is_none() {
                payment.owner_id = payment.owner.as_ref().map(|owner| owner.owner_id.clone());
            }
        }

        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.maintenance_requests.is_empty() && self.levy_payments.is_empty()
    }
}

/// Record source backed by a shared, read-only snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshot: Arc<Snapshot>,
}

impl InMemorySource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn units(&self, request: &FetchRequest) -> Result<Vec<Unit>, SourceError> {
        Ok(request.apply(&self.snapshot.units))
    }

    async fn maintenance_requests(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<MaintenanceRequest>, SourceError> {
        Ok(request.apply(&self.snapshot.maintenance_requests))
    }

    async fn levy_payments(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<LevyPayment>, SourceError> {
        Ok(request.apply(&self.snapshot.levy_payments))
    }
}
