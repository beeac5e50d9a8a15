use crate::infra::{AppState, Engine};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use conflict_signal::analysis::IncidentRecord;
use conflict_signal::error::{AppError, EngineError};
use conflict_signal::notifications::NotificationEvent;
use conflict_signal::{
    analysis_router, notification_router, threshold_router, IncidentCsvImporter,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct IncidentImportRequest {
    pub(crate) csv: String,
    /// Announce each valid imported incident through the notification rules.
    #[serde(default)]
    pub(crate) notify: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct IncidentImportResponse {
    pub(crate) imported: usize,
    pub(crate) valid: usize,
    pub(crate) invalid: usize,
    pub(crate) notifications_created: usize,
}

pub(crate) fn with_engine_routes(engine: &Engine) -> Router {
    analysis_router(engine.analysis.clone())
        .merge(notification_router(engine.notifications.clone()))
        .merge(threshold_router(engine.alerting.clone()))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/incidents/import", post(incident_import_endpoint))
        .layer(Extension(engine.clone()))
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

pub(crate) async fn incident_import_endpoint(
    Extension(engine): Extension<Engine>,
    Json(payload): Json<IncidentImportRequest>,
) -> Result<Json<IncidentImportResponse>, AppError> {
    let rows = IncidentCsvImporter::from_reader(Cursor::new(payload.csv.into_bytes()))?;
    let imported = rows.len();
    let records: Vec<IncidentRecord> = rows
        .iter()
        .filter_map(|row| IncidentRecord::try_from(row.clone()).ok())
        .collect();

    engine
        .store
        .extend(rows)
        .map_err(|err| AppError::from(EngineError::from(err)))?;

    let mut notifications_created = 0;
    if payload.notify {
        for record in &records {
            let summary = engine
                .notifications
                .evaluate(NotificationEvent::IncidentCreated, record)?;
            notifications_created += summary.created;
        }
    }

    info!(imported, valid = records.len(), notifications_created, "incident export imported");
    Ok(Json(IncidentImportResponse {
        imported,
        valid: records.len(),
        invalid: imported - records.len(),
        notifications_created,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{TimeZone, Utc};
    use conflict_signal::config::AnalysisConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(ready: bool) -> (Router, Engine) {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
        let engine = Engine::seeded(&AnalysisConfig::default(), now);
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        let router = with_engine_routes(&engine).layer(Extension(state));
        (router, engine)
    }

    async fn read_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 256 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn readiness_reflects_startup_flag() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let (router, _) = app(true);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn analysis_routes_are_mounted() {
        let (router, _) = app(true);

        let response = router
            .oneshot(
                Request::get("/api/v1/analysis/quality")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        let issues = body["issues"].as_array().expect("issues array");
        assert!(issues
            .iter()
            .all(|issue| issue["entity_id"] == "field-17"));
        assert!(!issues.is_empty());
    }

    #[tokio::test]
    async fn import_endpoint_stores_rows_and_notifies() {
        let (router, engine) = app(true);
        let csv = "ID,Title,Description,Location,Region,Category,Severity,Status,Verification,Reported At\n\
imp-1,Bridge attack,Gunmen attacked a bridge,Lokoja,North Central,banditry,critical,active,verified,2025-04-30T10:00:00Z\n\
imp-2,Rumour,,Abuja,North Central,unknown,,active,,2025-04-30\n";

        let response = router
            .oneshot(
                Request::post("/api/v1/incidents/import")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "csv": csv, "notify": true })).unwrap(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["imported"], 2);
        assert_eq!(body["valid"], 1);
        assert_eq!(body["invalid"], 1);
        // the critical-incident rule targets the supervisor and the analyst
        assert_eq!(body["notifications_created"], 2);
        assert_eq!(engine.inbox.sent().len(), 2);
    }
}
