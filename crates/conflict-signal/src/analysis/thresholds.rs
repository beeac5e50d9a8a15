use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::{
    AlertRecord, AlertSource, IncidentRecord, IncidentStatus, RiskIndicatorRecord, Severity,
};
use super::repository::{AlertRepository, IncidentRepository, RiskIndicatorRepository};
use crate::error::EngineError;

/// Limits used by the automatic alert rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdRuleConfig {
    pub indicator_threshold: f64,
    pub critical_indicator_threshold: f64,
    pub regional_incident_threshold: usize,
    pub volume_window_hours: i64,
}

impl Default for ThresholdRuleConfig {
    fn default() -> Self {
        Self {
            indicator_threshold: 75.0,
            critical_indicator_threshold: 90.0,
            regional_incident_threshold: 5,
            volume_window_hours: 24,
        }
    }
}

/// Alert content before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    pub region: Option<String>,
    pub category: Option<String>,
    pub source: AlertSource,
    pub escalation_level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEvaluation {
    pub triggered: usize,
    pub created: usize,
    pub alerts: Vec<AlertRecord>,
}

/// Apply the indicator, volume and critical-incident rules to the supplied records.
pub fn evaluate_threshold_rules(
    incidents: &[IncidentRecord],
    indicators: &[RiskIndicatorRecord],
    now: DateTime<Utc>,
    config: &ThresholdRuleConfig,
) -> Vec<AlertDraft> {
    let mut drafts = indicator_alerts(indicators, config);
    let since = now - Duration::hours(config.volume_window_hours);
    let recent: Vec<&IncidentRecord> = incidents
        .iter()
        .filter(|incident| incident.reported_at >= since && incident.reported_at <= now)
        .collect();
    drafts.extend(volume_alerts(&recent, config));
    drafts.extend(critical_incident_alerts(&recent));
    drafts
}

fn indicator_alerts(
    indicators: &[RiskIndicatorRecord],
    config: &ThresholdRuleConfig,
) -> Vec<AlertDraft> {
    let mut latest: BTreeMap<(&str, &str), &RiskIndicatorRecord> = BTreeMap::new();
    for reading in indicators {
        let key = (reading.name.as_str(), reading.region.as_str());
        match latest.get(&key) {
            Some(current)
                if (current.timestamp, current.id.as_str())
                    >= (reading.timestamp, reading.id.as_str()) => {}
            _ => {
                latest.insert(key, reading);
            }
        }
    }

    latest
        .into_values()
        .filter(|reading| reading.value >= config.indicator_threshold)
        .map(|reading| {
            let critical = reading.value >= config.critical_indicator_threshold;
            AlertDraft {
                title: format!("Risk indicator threshold exceeded: {}", reading.name),
                message: format!(
                    "{} in {} reached {:.1}, above the alert threshold of {:.1}",
                    reading.name, reading.region, reading.value, config.indicator_threshold
                ),
                severity: if critical {
                    Severity::Critical
                } else {
                    Severity::High
                },
                region: Some(reading.region.clone()),
                category: Some("risk_indicator".to_string()),
                source: AlertSource::ThresholdRule,
                escalation_level: if critical { 3 } else { 2 },
            }
        })
        .collect()
}

fn volume_alerts(recent: &[&IncidentRecord], config: &ThresholdRuleConfig) -> Vec<AlertDraft> {
    let mut per_region: BTreeMap<&str, usize> = BTreeMap::new();
    for incident in recent {
        let region = incident.region.trim();
        if !region.is_empty() {
            *per_region.entry(region).or_default() += 1;
        }
    }

    per_region
        .into_iter()
        .filter(|(_, count)| *count >= config.regional_incident_threshold)
        .map(|(region, count)| AlertDraft {
            title: format!("Incident surge in {region}"),
            message: format!(
                "{count} incidents reported in {region} within {} hours",
                config.volume_window_hours
            ),
            severity: Severity::High,
            region: Some(region.to_string()),
            category: Some("incident_volume".to_string()),
            source: AlertSource::ThresholdRule,
            escalation_level: 2,
        })
        .collect()
}

fn critical_incident_alerts(recent: &[&IncidentRecord]) -> Vec<AlertDraft> {
    let mut critical: Vec<&IncidentRecord> = recent
        .iter()
        .copied()
        .filter(|incident| {
            incident.severity == Severity::Critical && incident.status == IncidentStatus::Active
        })
        .collect();
    super::domain::sort_chronologically(&mut critical);

    critical
        .into_iter()
        .map(|incident| AlertDraft {
            title: format!("Critical incident: {}", incident.title),
            message: format!(
                "Critical incident {} reported at {} ({})",
                incident.id, incident.location, incident.region
            ),
            severity: Severity::Critical,
            region: Some(incident.region.clone()).filter(|region| !region.is_empty()),
            category: Some(incident.category.clone()).filter(|category| !category.is_empty()),
            source: AlertSource::ThresholdRule,
            escalation_level: 4,
        })
        .collect()
}

/// Loads current records, applies the rules and stores the resulting alerts.
pub struct ThresholdMonitor<S, K> {
    store: Arc<S>,
    alerts: Arc<K>,
    config: ThresholdRuleConfig,
}

impl<S, K> ThresholdMonitor<S, K>
where
    S: IncidentRepository + RiskIndicatorRepository + 'static,
    K: AlertRepository + 'static,
{
    pub fn new(store: Arc<S>, alerts: Arc<K>, config: ThresholdRuleConfig) -> Self {
        Self {
            store,
            alerts,
            config,
        }
    }

    pub fn evaluate(&self) -> Result<ThresholdEvaluation, EngineError> {
        self.evaluate_at(Utc::now())
    }

    pub fn evaluate_at(&self, now: DateTime<Utc>) -> Result<ThresholdEvaluation, EngineError> {
        let since = now - Duration::hours(self.config.volume_window_hours);
        let incidents = super::service::valid_records(self.store.list(Some(since))?);
        let indicators = self.store.all()?;

        let drafts = evaluate_threshold_rules(&incidents, &indicators, now, &self.config);
        let triggered = drafts.len();

        let mut alerts = Vec::with_capacity(triggered);
        for draft in drafts {
            let title = draft.title.clone();
            match self.alerts.create(draft) {
                Ok(alert) => alerts.push(alert),
                Err(error) => warn!(%error, %title, "failed to store threshold alert"),
            }
        }

        info!(triggered, created = alerts.len(), "threshold rules evaluated");
        Ok(ThresholdEvaluation {
            triggered,
            created: alerts.len(),
            alerts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::{IncidentId, VerificationStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn reading(id: &str, name: &str, value: f64, hours_ago: i64) -> RiskIndicatorRecord {
        RiskIndicatorRecord {
            id: id.to_string(),
            name: name.to_string(),
            region: "North West".to_string(),
            value,
            timestamp: now() - Duration::hours(hours_ago),
        }
    }

    fn incident(id: &str, region: &str, severity: Severity, hours_ago: i64) -> IncidentRecord {
        IncidentRecord {
            id: IncidentId(id.to_string()),
            title: format!("Incident {id}"),
            description: String::new(),
            location: "Gusau".to_string(),
            region: region.to_string(),
            state: None,
            category: "conflict".to_string(),
            severity,
            status: IncidentStatus::Active,
            verification_status: VerificationStatus::Verified,
            reported_at: now() - Duration::hours(hours_ago),
            impacted_population: None,
            resolved_at: None,
        }
    }

    #[test]
    fn only_latest_indicator_reading_counts() {
        let indicators = vec![
            reading("r1", "displacement", 95.0, 10),
            reading("r2", "displacement", 60.0, 1),
            reading("r3", "arms flow", 92.0, 2),
            reading("r4", "food prices", 80.0, 2),
        ];

        let drafts =
            evaluate_threshold_rules(&[], &indicators, now(), &ThresholdRuleConfig::default());

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].severity, Severity::Critical);
        assert_eq!(drafts[0].escalation_level, 3);
        assert!(drafts[0].title.contains("arms flow"));
        assert_eq!(drafts[1].severity, Severity::High);
        assert_eq!(drafts[1].escalation_level, 2);
    }

    #[test]
    fn regional_surge_inside_window_raises_alert() {
        let mut incidents: Vec<IncidentRecord> = (0..5)
            .map(|n| incident(&format!("nw-{n}"), "North West", Severity::Medium, n))
            .collect();
        incidents.push(incident("ne-1", "North East", Severity::Low, 2));
        incidents.push(incident("nw-old", "North West", Severity::Low, 48));

        let drafts =
            evaluate_threshold_rules(&incidents, &[], now(), &ThresholdRuleConfig::default());

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].region.as_deref(), Some("North West"));
        assert_eq!(drafts[0].category.as_deref(), Some("incident_volume"));
    }

    #[test]
    fn active_critical_incidents_raise_level_four_alerts() {
        let mut resolved = incident("c2", "South South", Severity::Critical, 3);
        resolved.status = IncidentStatus::Resolved;
        let incidents = vec![
            incident("c1", "South South", Severity::Critical, 5),
            resolved,
            incident("c3", "South South", Severity::Critical, 30),
        ];

        let drafts =
            evaluate_threshold_rules(&incidents, &[], now(), &ThresholdRuleConfig::default());

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].escalation_level, 4);
        assert!(drafts[0].message.contains("c1"));
    }
}
