//! Analytics core for strata property management.
//!
//! Raw records (units and their owners, maintenance requests, levy payments)
//! flow through a filter builder, generic aggregation, domain calculators and
//! a cross-entity correlator before being assembled into reports and exported
//! as CSV.

pub mod aggregate;
pub mod config;
pub mod correlation;
pub mod domain;
pub mod error;
pub mod export;
pub mod metrics;
pub mod query;
pub mod report;
pub mod source;
pub mod telemetry;

pub use domain::{
    LevyPayment, LevyStatus, MaintenanceRequest, MaintenanceStatus, Owner, Priority, Unit,
};
pub use query::{FetchRequest, FilterCriteria, FilterSpec, SortSpec, Table};
pub use report::{Report, ReportError, ReportKind, ReportRequest, ReportService};
pub use source::{InMemorySource, RecordSource, Snapshot, SourceError};
