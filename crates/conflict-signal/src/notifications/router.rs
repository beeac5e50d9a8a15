use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::NotificationEvent;
use super::engine::{NotificationDirectory, NotificationEngine, NotificationSink};
use crate::analysis::{
    AlertRecord, AlertRepository, IncidentRecord, IncidentRepository, RiskIndicatorRepository,
    ThresholdEvaluation, ThresholdMonitor,
};
use crate::error::{AppError, EngineError};

#[derive(Debug, Deserialize)]
pub struct EvaluateNotificationRequest {
    pub event: NotificationEvent,
    pub record: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ThresholdDispatch {
    #[serde(flatten)]
    pub evaluation: ThresholdEvaluation,
    pub notifications_created: usize,
}

pub fn notification_router<D, N>(engine: Arc<NotificationEngine<D, N>>) -> Router
where
    D: NotificationDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/notifications/evaluate",
            post(evaluate_handler::<D, N>),
        )
        .with_state(engine)
}

pub(crate) async fn evaluate_handler<D, N>(
    State(engine): State<Arc<NotificationEngine<D, N>>>,
    Json(request): Json<EvaluateNotificationRequest>,
) -> Response
where
    D: NotificationDirectory + 'static,
    N: NotificationSink + 'static,
{
    let result = match request.event {
        NotificationEvent::IncidentCreated => {
            serde_json::from_value::<IncidentRecord>(request.record)
                .map_err(|error| EngineError::validation(format!("invalid incident: {error}")))
                .and_then(|incident| engine.evaluate(request.event, &incident))
        }
        NotificationEvent::AlertCreated => serde_json::from_value::<AlertRecord>(request.record)
            .map_err(|error| EngineError::validation(format!("invalid alert: {error}")))
            .and_then(|alert| engine.evaluate(request.event, &alert)),
    };

    match result {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

/// Threshold monitor paired with the engine that announces its alerts.
pub struct AlertingState<S, K, D, N> {
    pub monitor: Arc<ThresholdMonitor<S, K>>,
    pub notifications: Arc<NotificationEngine<D, N>>,
}

impl<S, K, D, N> Clone for AlertingState<S, K, D, N> {
    fn clone(&self) -> Self {
        Self {
            monitor: Arc::clone(&self.monitor),
            notifications: Arc::clone(&self.notifications),
        }
    }
}

pub fn threshold_router<S, K, D, N>(state: AlertingState<S, K, D, N>) -> Router
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    K: AlertRepository + 'static,
    D: NotificationDirectory + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/alerts/thresholds/evaluate",
            post(thresholds_handler::<S, K, D, N>),
        )
        .with_state(state)
}

pub(crate) async fn thresholds_handler<S, K, D, N>(
    State(state): State<AlertingState<S, K, D, N>>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    K: AlertRepository + 'static,
    D: NotificationDirectory + 'static,
    N: NotificationSink + 'static,
{
    let evaluation = match state.monitor.evaluate() {
        Ok(evaluation) => evaluation,
        Err(error) => return AppError::from(error).into_response(),
    };

    let mut notifications_created = 0;
    for alert in &evaluation.alerts {
        match state
            .notifications
            .evaluate(NotificationEvent::AlertCreated, alert)
        {
            Ok(summary) => notifications_created += summary.created,
            Err(error) => warn!(%error, alert = %alert.id, "alert notifications failed"),
        }
    }

    let body = ThresholdDispatch {
        evaluation,
        notifications_created,
    };
    (StatusCode::OK, Json(body)).into_response()
}
