use crate::infra::{deserialize_optional_date, AppState};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use strata_analytics::error::AppError;
use strata_analytics::export::{export_csv, export_file_name, CONTENT_TYPE};
use strata_analytics::{
    FilterCriteria, RecordSource, Report, ReportKind, ReportRequest, ReportService,
};

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    pub(crate) kind: ReportKind,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) date_to: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) filters: FilterCriteria,
    /// Per-request override of the configured fetch deadline.
    #[serde(default)]
    pub(crate) timeout_ms: Option<u64>,
}

impl ReportQuery {
    fn into_request(self) -> ReportRequest {
        let request = ReportRequest::new(self.kind)
            .between(self.date_from, self.date_to)
            .with_criteria(self.filters);
        match self.timeout_ms {
            Some(ms) if ms > 0 => request.with_deadline(Duration::from_millis(ms)),
            _ => request,
        }
    }
}

pub(crate) fn report_router<S>(service: Arc<ReportService<S>>) -> Router
where
    S: RecordSource + 'static,
{
    Router::new()
        .route("/api/v1/reports", post(report_endpoint::<S>))
        .route("/api/v1/reports/export", post(export_endpoint::<S>))
        .with_state(service)
}

pub(crate) fn with_report_routes<S>(service: Arc<ReportService<S>>) -> Router
where
    S: RecordSource + 'static,
{
    report_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn report_endpoint<S>(
    State(service): State<Arc<ReportService<S>>>,
    Json(query): Json<ReportQuery>,
) -> Result<Json<Report>, AppError>
where
    S: RecordSource + 'static,
{
    let report = service.generate(&query.into_request()).await?;
    Ok(Json(report))
}

pub(crate) async fn export_endpoint<S>(
    State(service): State<Arc<ReportService<S>>>,
    Json(query): Json<ReportQuery>,
) -> Result<impl IntoResponse, AppError>
where
    S: RecordSource + 'static,
{
    let report = service.generate(&query.into_request()).await?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&report));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export_csv(&report),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use strata_analytics::{InMemorySource, LevyPayment, LevyStatus, Snapshot};
    use tower::ServiceExt;

    fn snapshot() -> Snapshot {
        let due_date = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let payment = |id: &str, status: LevyStatus| LevyPayment {
            payment_id: id.to_string(),
            unit_number: "101".to_string(),
            owner_id: None,
            quarter: 1,
            year: 2026,
            amount: 1275.0,
            status,
            due_date,
            paid_date: (status == LevyStatus::Paid).then_some(due_date),
            late_fee: None,
            owner: None,
        };
        Snapshot {
            levy_payments: vec![
                payment("LP-1", LevyStatus::Paid),
                payment("LP-2", LevyStatus::Pending),
            ],
            ..Snapshot::default()
        }
    }

    fn app(ready: bool) -> Router {
        let service = Arc::new(ReportService::new(Arc::new(InMemorySource::new(
            snapshot(),
        ))));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_report_routes(service).layer(Extension(state))
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .expect("read body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[tokio::test]
    async fn report_route_returns_tagged_json() {
        let response = app(true)
            .oneshot(post_json(
                "/api/v1/reports",
                json!({ "kind": "financial", "filters": { "year": "2026" } }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("json body");
        assert_eq!(payload["kind"], "financial");
        assert_eq!(payload["metrics"]["total_levied"], 2550.0);
        assert_eq!(payload["metrics"]["collection_rate"], 50.0);
        assert_eq!(payload["period"], "All time");
    }

    #[tokio::test]
    async fn export_route_serves_csv_attachment() {
        let response = app(true)
            .oneshot(post_json(
                "/api/v1/reports/export",
                json!({ "kind": "financial", "date_from": "2026-01-01", "date_to": "2026-03-31" }),
            ))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], CONTENT_TYPE);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .expect("ascii header")
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"strata-financial-report-"));

        let csv = body_text(response).await;
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with("Payment ID,Unit,Owner,"));
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected() {
        let response = app(true)
            .oneshot(post_json("/api/v1/reports", json!({ "kind": "weekly" })))
            .await
            .expect("route executes");
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let response = app(false)
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app(true)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn query_maps_timeout_override() {
        let query: ReportQuery = serde_json::from_value(json!({
            "kind": "occupancy",
            "date_from": "",
            "timeout_ms": 250
        }))
        .expect("query parses");
        let request = query.into_request();
        assert_eq!(request.kind, ReportKind::Occupancy);
        assert_eq!(request.date_from, None);
        assert_eq!(request.deadline, Some(Duration::from_millis(250)));
    }
}
