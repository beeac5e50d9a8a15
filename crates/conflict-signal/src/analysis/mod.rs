//! Heuristic conflict signal analysis over incident records.
//!
//! Every analyser is a pure function of its inputs and an injected `now`; the
//! service facade loads records through the repository ports and performs the
//! best-effort archive writes.

pub mod advisor;
pub mod anomaly;
pub mod domain;
pub mod escalation;
pub mod patterns;
pub mod peace;
pub mod repository;
pub mod router;
pub mod service;
pub mod text;
pub mod thresholds;

#[cfg(test)]
mod tests;

pub use advisor::{
    ResponseAdvisor, ResponseHorizon, ResponsePlan, ResponseRecommendation, ResponseScope,
};
pub use anomaly::{
    detect_anomalies, scan_quality, AnomalyConfig, AnomalyReport, DataQualityIssue,
    QualityIssueKind, QualityReport, VolumeAnomaly,
};
pub use domain::{
    AlertRecord, AlertSource, IncidentId, IncidentRecord, IncidentRow, IncidentStatus,
    IncidentValidationError, RiskIndicatorRecord, Severity, TimeWindow, VerificationStatus,
};
pub use escalation::{EscalationConfig, EscalationPrediction, EscalationPredictor, EscalationRisk};
pub use patterns::{
    ConflictPattern, PatternDetectionResult, PatternKind, PatternMiner, PatternSummary,
    PatternThresholds,
};
pub use peace::{
    OpportunityKind, OpportunityWindow, PeaceIndicatorsResult, PeaceOpportunity, PeacePredictor,
    PeaceSummary, PeaceThresholds, Priority, NATIONAL_REGION,
};
pub use repository::{
    AlertRepository, AnalysisArchive, IncidentRepository, PatternSnapshot,
    RiskIndicatorRepository, StorageError,
};
pub use router::analysis_router;
pub use service::ConflictAnalysisService;
pub use text::{
    calculate_similarity, ConflictAnalysis, Lexicon, ScreeningRecommendation, ScreeningResult,
    SentimentLabel, SimilarityResult, TextSignalScorer,
};
pub use thresholds::{
    evaluate_threshold_rules, AlertDraft, ThresholdEvaluation, ThresholdMonitor,
    ThresholdRuleConfig,
};
