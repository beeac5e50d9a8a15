//! Prioritised response recommendations for a single incident or a region.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    IncidentId, IncidentRecord, IncidentStatus, Severity, TimeWindow, VerificationStatus,
};
use super::escalation::{EscalationPrediction, EscalationRisk};
use super::peace::Priority;
use super::text::TextSignalScorer;

/// Days of active incidents considered for a regional plan.
pub const REGION_LOOKBACK_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseScope {
    Incident,
    Region,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseHorizon {
    Immediate,
    ShortTerm,
    LongTerm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecommendation {
    pub priority: Priority,
    pub horizon: ResponseHorizon,
    pub action: String,
    pub rationale: String,
    pub stakeholders: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePlan {
    pub scope: ResponseScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<IncidentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub risk_level: Severity,
    pub recommendations: Vec<ResponseRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalation: Option<EscalationPrediction>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ResponseAdvisor {
    scorer: TextSignalScorer,
    resource_keywords: Vec<String>,
}

impl ResponseAdvisor {
    pub fn new(scorer: TextSignalScorer, resource_keywords: Vec<String>) -> Self {
        Self {
            scorer,
            resource_keywords,
        }
    }

    pub fn for_incident(
        &self,
        incident: &IncidentRecord,
        escalation: EscalationPrediction,
        now: DateTime<Utc>,
    ) -> ResponsePlan {
        let narrative = incident.narrative();
        let analysis = self.scorer.analyze(&narrative);
        let place = if incident.location.trim().is_empty() {
            incident.region.as_str()
        } else {
            incident.location.as_str()
        };

        let mut recommendations = vec![severity_response(incident.severity, place)];

        if escalation.escalation_risk == EscalationRisk::High {
            recommendations.push(recommendation(
                Priority::High,
                ResponseHorizon::Immediate,
                "Activate the early warning network for neighbouring communities".to_string(),
                format!("Escalation probability is {}%", escalation.probability),
                &["early warning focal points", "local government"],
            ));
        }

        if !analysis.indicators.humanitarian.is_empty() {
            recommendations.push(recommendation(
                Priority::High,
                ResponseHorizon::ShortTerm,
                format!("Coordinate humanitarian assistance for {place}"),
                format!(
                    "Report mentions {}",
                    analysis.indicators.humanitarian.join(", ")
                ),
                &["humanitarian agencies", "state emergency management agency"],
            ));
        }

        let lowered = narrative.to_lowercase();
        let resource_terms: Vec<&str> = self
            .resource_keywords
            .iter()
            .map(String::as_str)
            .filter(|keyword| lowered.contains(keyword))
            .collect();
        if !resource_terms.is_empty() {
            recommendations.push(recommendation(
                Priority::Medium,
                ResponseHorizon::LongTerm,
                "Convene mediation between farming and herding communities".to_string(),
                format!("Resource dispute terms: {}", resource_terms.join(", ")),
                &["traditional rulers", "community leaders", "ministry of agriculture"],
            ));
        }

        if incident.verification_status == VerificationStatus::Unverified {
            recommendations.push(recommendation(
                Priority::Medium,
                ResponseHorizon::Immediate,
                "Verify the report with field monitors before escalating".to_string(),
                "Incident has not been verified".to_string(),
                &["field monitors"],
            ));
        }

        sort_recommendations(&mut recommendations);

        ResponsePlan {
            scope: ResponseScope::Incident,
            incident_id: Some(incident.id.clone()),
            region: Some(incident.region.clone()).filter(|region| !region.is_empty()),
            risk_level: incident.severity.max(analysis.risk_level),
            recommendations,
            escalation: Some(escalation),
            generated_at: now,
        }
    }

    /// Plan for `region` from its active incidents over the trailing lookback.
    pub fn for_region(
        &self,
        region: &str,
        incidents: &[IncidentRecord],
        now: DateTime<Utc>,
    ) -> ResponsePlan {
        let window = TimeWindow::trailing_days(now, REGION_LOOKBACK_DAYS);
        let active: Vec<&IncidentRecord> = window
            .select(incidents)
            .into_iter()
            .filter(|incident| {
                incident.status == IncidentStatus::Active
                    && incident.region.eq_ignore_ascii_case(region.trim())
            })
            .collect();

        let mut recommendations = Vec::new();
        if active.is_empty() {
            recommendations.push(recommendation(
                Priority::Low,
                ResponseHorizon::ShortTerm,
                format!("Maintain routine monitoring in {region}"),
                format!("No active incidents in the last {REGION_LOOKBACK_DAYS} days"),
                &["field monitors"],
            ));
            return ResponsePlan {
                scope: ResponseScope::Region,
                incident_id: None,
                region: Some(region.to_string()),
                risk_level: Severity::Low,
                recommendations,
                escalation: None,
                generated_at: now,
            };
        }

        let critical = count_severity(&active, Severity::Critical);
        let high = count_severity(&active, Severity::High);

        if critical > 0 {
            recommendations.push(recommendation(
                Priority::Critical,
                ResponseHorizon::Immediate,
                format!("Deploy rapid response teams across {region}"),
                format!("{critical} active critical incidents"),
                &["security agencies", "state emergency management agency"],
            ));
        }
        if high > 0 {
            recommendations.push(recommendation(
                Priority::High,
                ResponseHorizon::Immediate,
                format!("Increase security presence and patrols in {region}"),
                format!("{high} active high severity incidents"),
                &["security agencies", "local government"],
            ));
        }

        if let Some((category, count)) = dominant_category(&active) {
            recommendations.push(recommendation(
                Priority::Medium,
                ResponseHorizon::ShortTerm,
                format!("Target {category} interventions in {region}"),
                format!("{count} of {} active incidents are {category}", active.len()),
                &["community leaders", "civil society organisations"],
            ));
        }

        if active
            .iter()
            .any(|incident| incident.verification_status == VerificationStatus::Unverified)
        {
            recommendations.push(recommendation(
                Priority::Medium,
                ResponseHorizon::Immediate,
                format!("Verify outstanding reports in {region}"),
                "Some active incidents are unverified".to_string(),
                &["field monitors"],
            ));
        }

        recommendations.push(recommendation(
            Priority::Low,
            ResponseHorizon::LongTerm,
            format!("Strengthen early warning and peace committees in {region}"),
            format!("{} active incidents in the last {REGION_LOOKBACK_DAYS} days", active.len()),
            &["peace committees", "traditional rulers"],
        ));

        sort_recommendations(&mut recommendations);

        let risk_level = active
            .iter()
            .map(|incident| incident.severity)
            .max()
            .unwrap_or(Severity::Low);

        ResponsePlan {
            scope: ResponseScope::Region,
            incident_id: None,
            region: Some(region.to_string()),
            risk_level,
            recommendations,
            escalation: None,
            generated_at: now,
        }
    }
}

fn severity_response(severity: Severity, place: &str) -> ResponseRecommendation {
    match severity {
        Severity::Critical => recommendation(
            Priority::Critical,
            ResponseHorizon::Immediate,
            format!("Deploy rapid response and security teams to {place}"),
            "Incident is rated critical".to_string(),
            &["security agencies", "state emergency management agency"],
        ),
        Severity::High => recommendation(
            Priority::High,
            ResponseHorizon::Immediate,
            format!("Alert security agencies and dispatch field monitors to {place}"),
            "Incident is rated high severity".to_string(),
            &["security agencies", "field monitors"],
        ),
        Severity::Medium => recommendation(
            Priority::Medium,
            ResponseHorizon::ShortTerm,
            format!("Engage community leaders in {place} to prevent escalation"),
            "Incident is rated medium severity".to_string(),
            &["community leaders"],
        ),
        Severity::Low => recommendation(
            Priority::Low,
            ResponseHorizon::ShortTerm,
            format!("Keep {place} under routine monitoring"),
            "Incident is rated low severity".to_string(),
            &["field monitors"],
        ),
    }
}

fn recommendation(
    priority: Priority,
    horizon: ResponseHorizon,
    action: String,
    rationale: String,
    stakeholders: &[&str],
) -> ResponseRecommendation {
    ResponseRecommendation {
        priority,
        horizon,
        action,
        rationale,
        stakeholders: stakeholders.iter().map(|s| s.to_string()).collect(),
    }
}

fn sort_recommendations(recommendations: &mut [ResponseRecommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.horizon.cmp(&b.horizon))
    });
}

fn count_severity(incidents: &[&IncidentRecord], severity: Severity) -> usize {
    incidents
        .iter()
        .filter(|incident| incident.severity == severity)
        .count()
}

/// Most frequent non-blank category; alphabetical order breaks ties.
fn dominant_category<'a>(incidents: &[&'a IncidentRecord]) -> Option<(&'a str, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for incident in incidents {
        let category = incident.category.trim();
        if !category.is_empty() {
            *counts.entry(category).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .fold(None, |best, (category, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((category, count)),
        })
}
