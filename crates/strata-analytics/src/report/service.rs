use super::insights::{executive_summary, financial_health, risk_assessment};
use super::views::{ComprehensiveReport, FinancialReport, MaintenanceReport, OccupancyReport};
use super::{Report, ReportKind, ReportRequest};
use crate::correlation::cross_analyze;
use crate::domain::{LevyPayment, MaintenanceRequest, Unit};
use crate::metrics::{financial_metrics, maintenance_metrics, occupancy_metrics};
use crate::query::{FetchRequest, FilterCriteria, SortSpec, Table};
use crate::source::{RecordSource, SourceError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to fetch report data: {0}")]
    Source(#[from] SourceError),
    #[error("report generation exceeded its {}ms deadline", .0.as_millis())]
    DeadlineExceeded(Duration),
}

/// Single entry point that turns a [`ReportRequest`] into a [`Report`].
///
/// Fetches for the comprehensive report run concurrently and the first
/// failure aborts the whole report. The fetch and compute pipeline runs
/// under the request's deadline, or the service default.
pub struct ReportService<S> {
    source: Arc<S>,
    default_deadline: Duration,
}

impl<S> Clone for ReportService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            default_deadline: self.default_deadline,
        }
    }
}

impl<S: RecordSource> ReportService<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self::with_deadline(source, DEFAULT_DEADLINE)
    }

    pub fn with_deadline(source: Arc<S>, default_deadline: Duration) -> Self {
        Self {
            source,
            default_deadline,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn generate(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let deadline = request.deadline.unwrap_or(self.default_deadline);

        match tokio::time::timeout(deadline, self.assemble(request)).await {
            Ok(Ok(report)) => {
                info!(kind = %request.kind, period = %report.period(), "report generated");
                Ok(report)
            }
            Ok(Err(err)) => {
                warn!(kind = %request.kind, error = %err, "report generation failed");
                Err(err)
            }
            Err(_) => {
                warn!(
                    kind = %request.kind,
                    deadline_ms = deadline.as_millis() as u64,
                    "report generation timed out"
                );
                Err(ReportError::DeadlineExceeded(deadline))
            }
        }
    }

    async fn assemble(&self, request: &ReportRequest) -> Result<Report, ReportError> {
        let criteria = request.effective_criteria();

        let report = match request.kind {
            ReportKind::Maintenance => {
                let requests = self.fetch_requests(&criteria).await?;
                Report::Maintenance(maintenance_report(request, requests))
            }
            ReportKind::Financial => {
                let payments = self.fetch_payments(&criteria).await?;
                Report::Financial(financial_report(request, payments))
            }
            ReportKind::Occupancy => {
                let units = self.fetch_units(&criteria).await?;
                Report::Occupancy(occupancy_report(request, units))
            }
            ReportKind::Comprehensive => {
                let (requests, payments, units) = tokio::try_join!(
                    self.fetch_requests(&criteria),
                    self.fetch_payments(&criteria),
                    self.fetch_units(&criteria),
                )?;
                Report::Comprehensive(Box::new(comprehensive_report(
                    request, requests, payments, units,
                )))
            }
        };

        Ok(report)
    }

    async fn fetch_requests(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<MaintenanceRequest>, SourceError> {
        let fetch = FetchRequest::for_table(Table::MaintenanceRequests, criteria)
            .sorted(SortSpec::descending("created_at"));
        self.source.maintenance_requests(&fetch).await
    }

    async fn fetch_payments(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<LevyPayment>, SourceError> {
        let fetch = FetchRequest::for_table(Table::LevyPayments, criteria)
            .sorted(SortSpec::descending("due_date"));
        self.source.levy_payments(&fetch).await
    }

    async fn fetch_units(&self, criteria: &FilterCriteria) -> Result<Vec<Unit>, SourceError> {
        let fetch = FetchRequest::for_table(Table::Units, criteria)
            .sorted(SortSpec::ascending("unit_number"));
        self.source.units(&fetch).await
    }
}

fn maintenance_report(
    request: &ReportRequest,
    requests: Vec<MaintenanceRequest>,
) -> MaintenanceReport {
    MaintenanceReport {
        period: request.period(),
        generated_at: request.as_of,
        metrics: maintenance_metrics(&requests),
        requests,
    }
}

fn financial_report(request: &ReportRequest, payments: Vec<LevyPayment>) -> FinancialReport {
    FinancialReport {
        period: request.period(),
        generated_at: request.as_of,
        metrics: financial_metrics(&payments, request.as_of),
        payments,
    }
}

fn occupancy_report(request: &ReportRequest, units: Vec<Unit>) -> OccupancyReport {
    OccupancyReport {
        period: request.period(),
        generated_at: request.as_of,
        metrics: occupancy_metrics(&units),
        units,
    }
}

fn comprehensive_report(
    request: &ReportRequest,
    requests: Vec<MaintenanceRequest>,
    payments: Vec<LevyPayment>,
    units: Vec<Unit>,
) -> ComprehensiveReport {
    let cross_analysis = cross_analyze(&requests, &payments);
    let maintenance = maintenance_report(request, requests);
    let financial = financial_report(request, payments);
    let occupancy = occupancy_report(request, units);

    let health = financial_health(&financial.metrics, &maintenance.metrics);
    let risks = risk_assessment(&financial.metrics, &occupancy.metrics, &maintenance.metrics);
    let summary = executive_summary(
        &maintenance.metrics,
        &financial.metrics,
        &occupancy.metrics,
        &cross_analysis,
        &health,
    );

    ComprehensiveReport {
        period: request.period(),
        generated_at: request.as_of,
        maintenance,
        financial,
        occupancy,
        cross_analysis,
        financial_health: health,
        risk_assessment: risks,
        executive_summary: summary,
    }
}
