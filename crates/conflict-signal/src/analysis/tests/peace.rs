use chrono::{Duration, TimeZone, Utc};

use super::common::*;

use crate::analysis::domain::{IncidentRecord, IncidentStatus, Severity};
use crate::analysis::peace::{
    OpportunityKind, PeaceIndicatorsResult, PeacePredictor, Priority, NATIONAL_REGION,
};

fn declining_north_east() -> Vec<IncidentRecord> {
    vec![
        incident("ne-1", "North East", Severity::High, "conflict", 80),
        incident("ne-2", "North East", Severity::Critical, "conflict", 70),
        incident("ne-3", "North East", Severity::High, "conflict", 60),
        incident("ne-4", "North East", Severity::Critical, "conflict", 50),
        incident("ne-5", "North East", Severity::Low, "conflict", 40),
    ]
}

fn resolved_south_west() -> Vec<IncidentRecord> {
    (0..3)
        .map(|n| {
            let mut record = incident(
                &format!("sw-{n}"),
                "South West",
                Severity::Medium,
                "communal",
                75 - n * 5,
            );
            record.status = IncidentStatus::Resolved;
            record.resolved_at = Some(record.reported_at + Duration::days(2));
            record
        })
        .collect()
}

fn predict(incidents: &[IncidentRecord], region: Option<&str>) -> PeaceIndicatorsResult {
    PeacePredictor::default().predict(incidents, 90, region, now())
}

fn find(
    result: &PeaceIndicatorsResult,
    kind: OpportunityKind,
    region: &str,
) -> Option<crate::analysis::PeaceOpportunity> {
    result
        .opportunities
        .iter()
        .find(|opportunity| opportunity.kind == kind && opportunity.region == region)
        .cloned()
}

#[test]
fn falling_severity_and_volume_signal_declining_violence() {
    let result = predict(&declining_north_east(), None);

    let opportunity = find(&result, OpportunityKind::DecliningViolence, "North East")
        .expect("declining violence opportunity");
    assert_eq!(opportunity.id, "peace-declining-violence-north-east");
    assert_eq!(opportunity.confidence, 90);
    assert_eq!(opportunity.success_probability, 80);
    assert_eq!(opportunity.priority, Priority::Critical);
    assert_eq!(opportunity.time_window.start, now());
    assert_eq!(opportunity.time_window.optimal, now() + Duration::days(7));
}

#[test]
fn steady_region_does_not_signal_declining_violence() {
    let incidents: Vec<IncidentRecord> = (0..6)
        .map(|n| {
            incident(
                &format!("st-{n}"),
                "North Central",
                Severity::High,
                "conflict",
                80 - n * 12,
            )
        })
        .collect();

    let result = predict(&incidents, None);
    assert!(find(&result, OpportunityKind::DecliningViolence, "North Central").is_none());
}

#[test]
fn three_incident_region_can_signal_declining_violence() {
    let incidents = vec![
        incident("ne-a", "North East", Severity::Critical, "conflict", 80),
        incident("ne-b", "North East", Severity::Critical, "conflict", 70),
        incident("ne-c", "North East", Severity::Low, "conflict", 10),
    ];

    let result = predict(&incidents, None);

    let opportunity = find(&result, OpportunityKind::DecliningViolence, "North East")
        .expect("two critical incidents followed by one low");
    assert_eq!(opportunity.confidence, 90);
    assert_eq!(
        opportunity.indicators,
        vec!["severity drop 3.00".to_string(), "volume ratio 0.50".to_string()]
    );
}

#[test]
fn single_incident_region_has_no_declining_signal() {
    let incidents = vec![incident("nw-a", "North West", Severity::Critical, "conflict", 80)];

    let result = predict(&incidents, None);
    assert!(find(&result, OpportunityKind::DecliningViolence, "North West").is_none());
}

#[test]
fn quick_resolutions_signal_resolution_pattern() {
    let result = predict(&resolved_south_west(), None);

    let opportunity = find(&result, OpportunityKind::ResolutionPattern, "South West")
        .expect("resolution opportunity");
    assert_eq!(opportunity.confidence, 70);
    assert_eq!(opportunity.success_probability, 65);
    assert_eq!(opportunity.priority, Priority::Medium);
}

#[test]
fn political_incidents_block_stability_opportunity() {
    let mut incidents = resolved_south_west();
    incidents.push(incident("pol-1", "South East", Severity::Medium, "Political", 10));
    incidents.push(incident("se-2", "South East", Severity::Low, "communal", 12));

    let result = predict(&incidents, None);

    let stable = find(&result, OpportunityKind::PoliticalStability, "South West")
        .expect("south west is politically stable");
    assert_eq!(stable.confidence, 75);
    assert_eq!(stable.success_probability, 70);
    assert!(find(&result, OpportunityKind::PoliticalStability, "South East").is_none());
}

#[test]
fn quiet_month_after_conflict_signals_reconciliation() {
    let mut incidents = declining_north_east();
    incidents.push(incident("nc-1", "North Central", Severity::Medium, "conflict", 5));

    let result = predict(&incidents, None);

    let reconciliation = find(&result, OpportunityKind::ReconciliationSignal, "North East")
        .expect("north east has been quiet for 30 days");
    assert_eq!(reconciliation.confidence, 65);
    assert!(find(&result, OpportunityKind::ReconciliationSignal, "North Central").is_none());
}

#[test]
fn empty_months_become_national_seasonal_windows() {
    let result = predict(&declining_north_east(), None);

    let june = result
        .opportunities
        .iter()
        .find(|opportunity| opportunity.id == "peace-seasonal-window-june")
        .expect("june has no recorded incidents");
    assert_eq!(june.region, NATIONAL_REGION);
    assert_eq!(june.confidence, 85);
    assert_eq!(june.success_probability, 70);
    assert_eq!(
        june.time_window.start,
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    );
    assert!(result
        .opportunities
        .iter()
        .filter(|opportunity| opportunity.kind == OpportunityKind::SeasonalWindow)
        .all(|opportunity| opportunity.region == NATIONAL_REGION));
}

#[test]
fn region_filter_keeps_requested_and_national() {
    let mut incidents = declining_north_east();
    incidents.extend(resolved_south_west());

    let result = predict(&incidents, Some("North East"));

    assert!(!result.opportunities.is_empty());
    assert!(result
        .opportunities
        .iter()
        .all(|opportunity| opportunity.region == "North East"
            || opportunity.region == NATIONAL_REGION));
    assert!(result
        .opportunities
        .iter()
        .any(|opportunity| opportunity.region == "North East"));
    assert_eq!(result.region.as_deref(), Some("North East"));
    assert_eq!(result.summary.total_opportunities, result.opportunities.len());
    assert_eq!(result.summary.regions, vec!["National", "North East"]);
}

#[test]
fn opportunities_are_sorted_by_confidence() {
    let mut incidents = declining_north_east();
    incidents.extend(resolved_south_west());

    let result = predict(&incidents, None);

    for pair in result.opportunities.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    assert_eq!(result.opportunities[0].kind, OpportunityKind::DecliningViolence);
}

#[test]
fn no_incidents_means_no_opportunities() {
    let result = predict(&[], None);
    assert!(result.opportunities.is_empty());
    assert_eq!(result.summary.average_confidence, 0);
}
