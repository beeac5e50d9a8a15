use crate::infra::{as_of, Engine, InMemoryIncidentStore, InMemoryNotificationStore};
use chrono::NaiveDate;
use clap::Args;
use conflict_signal::analysis::{
    AnomalyReport, ConflictAnalysis, EscalationPrediction, IncidentId, IncidentRecord,
    IncidentRepository, PatternDetectionResult, PeaceIndicatorsResult, QualityReport, ResponsePlan,
    ThresholdEvaluation,
};
use conflict_signal::config::AnalysisConfig;
use conflict_signal::error::{AppError, EngineError};
use conflict_signal::notifications::NotificationEvent;
use conflict_signal::IncidentCsvImporter;
use std::path::PathBuf;

const DEMO_STATEMENT: &str = "Armed bandits attacked farmers near Gusau in Zamfara, several killed \
and families displaced, while community leaders call for dialogue";

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Text to score
    #[arg(long)]
    pub(crate) text: String,
}

#[derive(Args, Debug)]
pub(crate) struct PatternsArgs {
    /// Incident CSV export to analyse
    #[arg(long)]
    pub(crate) incidents_csv: PathBuf,
    /// Trailing window in days
    #[arg(long, default_value_t = 30)]
    pub(crate) timeframe_days: u32,
    /// Evaluate as of the end of this day (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Optional JSON file overriding analysis thresholds
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Evaluate as of the end of this day (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// Region used for the regional response plan
    #[arg(long, default_value = "North West")]
    pub(crate) region: String,
    /// Optional JSON file overriding analysis thresholds
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

fn analysis_config(path: Option<PathBuf>) -> Result<AnalysisConfig, AppError> {
    match path {
        Some(path) => Ok(AnalysisConfig::from_path(path)?),
        None => Ok(AnalysisConfig::default()),
    }
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let engine = Engine::new(
        InMemoryIncidentStore::default(),
        InMemoryNotificationStore::default(),
        &AnalysisConfig::default(),
    );
    let screening = engine.analysis.screen_statement(&args.text)?;

    render_analysis(&screening.analysis);
    println!(
        "Screening: conflict related = {} | confidence {}% | recommendation {:?}",
        screening.is_conflict_related, screening.confidence, screening.recommendation
    );
    Ok(())
}

pub(crate) fn run_patterns(args: PatternsArgs) -> Result<(), AppError> {
    let config = analysis_config(args.config)?;
    let rows = IncidentCsvImporter::from_path(&args.incidents_csv)?;
    let imported = rows.len();
    let engine = Engine::new(
        InMemoryIncidentStore::with_data(rows, Vec::new()),
        InMemoryNotificationStore::default(),
        &config,
    );

    println!(
        "Imported {} incident rows from {}",
        imported,
        args.incidents_csv.display()
    );
    let result = engine
        .analysis
        .detect_patterns_at(args.timeframe_days, as_of(args.as_of))?;
    render_patterns(&result);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = analysis_config(args.config)?;
    let now = as_of(args.as_of);
    let engine = Engine::seeded(&config, now);

    println!("Conflict signal engine demo ({})", now.format("%Y-%m-%d %H:%M UTC"));

    println!("\n== Text screening ==");
    println!("\"{DEMO_STATEMENT}\"");
    render_analysis(&engine.analysis.analyze_text(DEMO_STATEMENT)?);

    println!("\n== Pattern detection (30 days) ==");
    render_patterns(&engine.analysis.detect_patterns_at(30, now)?);

    println!("\n== Peace opportunities (90 days) ==");
    render_peace(&engine.analysis.predict_peace_at(90, None, now)?);

    println!("\n== Escalation outlook ==");
    let focus = IncidentId("ne-4".to_string());
    render_escalation(&engine.analysis.predict_escalation_at(&focus, now)?);

    println!("\n== Response plan for {} ==", args.region);
    render_plan(&engine.analysis.recommendations_at(None, Some(&args.region), now)?);

    println!("\n== Volume anomalies ==");
    render_anomalies(&engine.analysis.detect_anomalies_at(None, now)?);

    println!("\n== Data quality ==");
    render_quality(&engine.analysis.scan_quality_at(now)?);

    println!("\n== Threshold rules ==");
    let evaluation = engine.alerting.monitor.evaluate_at(now)?;
    render_thresholds(&evaluation);

    let mut notified = 0;
    for alert in &evaluation.alerts {
        notified += engine
            .notifications
            .evaluate(NotificationEvent::AlertCreated, alert)?
            .created;
    }
    if let Some(row) = engine.store.fetch(&focus).map_err(EngineError::from)? {
        let incident = IncidentRecord::try_from(row).map_err(EngineError::from)?;
        notified += engine
            .notifications
            .evaluate(NotificationEvent::IncidentCreated, &incident)?
            .created;
    }

    println!("\n== Notifications ==");
    println!("- {notified} notifications created");
    for draft in engine.inbox.sent().iter().take(6) {
        println!("  - [{:?}] {} -> {}", draft.notification_type, draft.title, draft.user_id);
    }

    Ok(())
}

fn render_analysis(analysis: &ConflictAnalysis) {
    println!(
        "Conflict score {} | peace score {} | risk {} | sentiment {:?} ({})",
        analysis.conflict_score,
        analysis.peace_score,
        analysis.risk_level.label(),
        analysis.sentiment.label,
        analysis.sentiment.score
    );
    let keywords: Vec<&str> = analysis
        .keywords
        .iter()
        .map(|keyword| keyword.term.as_str())
        .collect();
    if !keywords.is_empty() {
        println!("Keywords: {}", keywords.join(", "));
    }
    if !analysis.entities.locations.is_empty() {
        println!("Locations: {}", analysis.entities.locations.join(", "));
    }
}

fn render_patterns(result: &PatternDetectionResult) {
    println!(
        "- {} incidents analysed | {} patterns | {} critical | {} emerging threats",
        result.analyzed_incidents,
        result.summary.total_patterns,
        result.summary.critical_patterns,
        result.summary.emerging_threats
    );
    for pattern in &result.patterns {
        println!(
            "  - [{}] {} ({}% confidence, {} incidents)",
            pattern.severity.label(),
            pattern.title,
            pattern.confidence,
            pattern.related_incidents.len()
        );
    }
}

fn render_peace(result: &PeaceIndicatorsResult) {
    println!(
        "- {} opportunities | {} high priority | {}% average success probability",
        result.summary.total_opportunities,
        result.summary.high_priority,
        result.summary.average_success_probability
    );
    for opportunity in &result.opportunities {
        println!(
            "  - [{}] {} in {} ({}% confidence)",
            opportunity.priority.label(),
            opportunity.title,
            opportunity.region,
            opportunity.confidence
        );
    }
}

fn render_escalation(prediction: &EscalationPrediction) {
    println!(
        "- Incident {} ({}): {} risk, {}% within {} days",
        prediction.incident_id,
        prediction.region,
        prediction.escalation_risk.label(),
        prediction.probability,
        prediction.time_window_days
    );
    if !prediction.key_drivers.is_empty() {
        println!("  Drivers: {}", prediction.key_drivers.join(", "));
    }
}

fn render_plan(plan: &ResponsePlan) {
    println!("- Risk level {}", plan.risk_level.label());
    for recommendation in &plan.recommendations {
        println!(
            "  - [{} / {:?}] {}",
            recommendation.priority.label(),
            recommendation.horizon,
            recommendation.action
        );
    }
}

fn render_anomalies(report: &AnomalyReport) {
    if report.anomalies.is_empty() {
        println!("- No volume anomalies in the last {} days", report.lookback_days);
        return;
    }
    for anomaly in &report.anomalies {
        println!(
            "- {} {}: {} incidents vs {:.1} expected ({})",
            anomaly.date,
            anomaly.region,
            anomaly.observed,
            anomaly.expected,
            anomaly.severity.label()
        );
    }
}

fn render_quality(report: &QualityReport) {
    println!("- {} rows scanned | {} issues", report.scanned, report.issues.len());
    for issue in &report.issues {
        println!("  - {} {}: {}", issue.entity_type, issue.entity_id, issue.message);
    }
}

fn render_thresholds(evaluation: &ThresholdEvaluation) {
    println!(
        "- {} rules triggered | {} alerts stored",
        evaluation.triggered, evaluation.created
    );
    for alert in &evaluation.alerts {
        println!(
            "  - [{} / level {}] {}",
            alert.severity.label(),
            alert.escalation_level,
            alert.title
        );
    }
}
