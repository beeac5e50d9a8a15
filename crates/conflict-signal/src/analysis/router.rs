use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::domain::IncidentId;
use super::repository::{AnalysisArchive, IncidentRepository, RiskIndicatorRepository};
use super::service::ConflictAnalysisService;
use crate::error::{AppError, EngineError};

pub const DEFAULT_PATTERN_TIMEFRAME_DAYS: u32 = 30;
pub const DEFAULT_PEACE_TIMEFRAME_DAYS: u32 = 90;

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScreenRequest {
    #[serde(default)]
    pub statement: String,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub text1: String,
    #[serde(default)]
    pub text2: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeframeQuery {
    pub timeframe_days: Option<u32>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub incident_id: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnomalyQuery {
    pub lookback_days: Option<u32>,
}

/// Router exposing the analysis operations under `/api/v1/analysis`.
pub fn analysis_router<S, A>(service: Arc<ConflictAnalysisService<S, A>>) -> Router
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    Router::new()
        .route("/api/v1/analysis/text", post(analyze_text_handler::<S, A>))
        .route("/api/v1/analysis/screen", post(screen_handler::<S, A>))
        .route("/api/v1/analysis/similarity", post(similarity_handler::<S, A>))
        .route("/api/v1/analysis/patterns", get(patterns_handler::<S, A>))
        .route("/api/v1/analysis/peace", get(peace_handler::<S, A>))
        .route(
            "/api/v1/analysis/escalation/:incident_id",
            get(escalation_handler::<S, A>),
        )
        .route(
            "/api/v1/analysis/recommendations",
            get(recommendations_handler::<S, A>),
        )
        .route("/api/v1/analysis/anomalies", get(anomalies_handler::<S, A>))
        .route("/api/v1/analysis/quality", get(quality_handler::<S, A>))
        .with_state(service)
}

fn respond<T: Serialize>(result: Result<T, EngineError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn analyze_text_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Json(request): Json<TextRequest>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.analyze_text(&request.text))
}

pub(crate) async fn screen_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Json(request): Json<ScreenRequest>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.screen_statement(&request.statement))
}

pub(crate) async fn similarity_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Json(request): Json<SimilarityRequest>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.calculate_similarity(&request.text1, &request.text2))
}

pub(crate) async fn patterns_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Query(query): Query<TimeframeQuery>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    let days = query
        .timeframe_days
        .unwrap_or(DEFAULT_PATTERN_TIMEFRAME_DAYS);
    respond(service.detect_patterns(days))
}

pub(crate) async fn peace_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Query(query): Query<TimeframeQuery>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    let days = query.timeframe_days.unwrap_or(DEFAULT_PEACE_TIMEFRAME_DAYS);
    respond(service.predict_peace(days, query.region.as_deref()))
}

pub(crate) async fn escalation_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Path(incident_id): Path<String>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.predict_escalation(&IncidentId(incident_id)))
}

pub(crate) async fn recommendations_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Query(query): Query<RecommendationQuery>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.recommendations(query.incident_id.as_deref(), query.region.as_deref()))
}

pub(crate) async fn anomalies_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
    Query(query): Query<AnomalyQuery>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.detect_anomalies(query.lookback_days))
}

pub(crate) async fn quality_handler<S, A>(
    State(service): State<Arc<ConflictAnalysisService<S, A>>>,
) -> Response
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    A: AnalysisArchive + 'static,
{
    respond(service.scan_quality())
}
