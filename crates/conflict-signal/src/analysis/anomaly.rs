use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    present, IncidentRecord, IncidentRow, IncidentStatus, Severity, VerificationStatus,
};

/// Constants for the daily volume anomaly check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub lookback_days: u32,
    pub moving_average_days: u32,
    pub multiplier: f64,
    pub minimum_expected: f64,
    pub minimum_observed: usize,
    pub high_ratio: f64,
    pub critical_ratio: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            moving_average_days: 7,
            multiplier: 2.0,
            minimum_expected: 1.0,
            minimum_observed: 3,
            high_ratio: 3.0,
            critical_ratio: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnomaly {
    pub date: NaiveDate,
    pub region: String,
    pub observed: usize,
    pub expected: f64,
    pub ratio: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub anomalies: Vec<VolumeAnomaly>,
    pub lookback_days: u32,
    pub analyzed_incidents: usize,
    pub generated_at: DateTime<Utc>,
}

/// Flag region-days whose incident count jumps well above the trailing average.
pub fn detect_anomalies(
    incidents: &[IncidentRecord],
    now: DateTime<Utc>,
    config: &AnomalyConfig,
) -> AnomalyReport {
    let today = now.date_naive();
    let first_day = today - Duration::days(i64::from(config.lookback_days));
    let baseline_start = first_day - Duration::days(i64::from(config.moving_average_days));

    let mut daily: BTreeMap<&str, BTreeMap<NaiveDate, usize>> = BTreeMap::new();
    let mut analyzed = 0;
    for incident in incidents {
        if incident.reported_at > now {
            continue;
        }
        let day = incident.reported_at.date_naive();
        if day < baseline_start {
            continue;
        }
        if day >= first_day {
            analyzed += 1;
        }
        *daily
            .entry(incident.region.as_str())
            .or_default()
            .entry(day)
            .or_default() += 1;
    }

    let mut anomalies = Vec::new();
    for (region, counts) in &daily {
        for (&day, &observed) in counts.range(first_day..=today) {
            if observed < config.minimum_observed {
                continue;
            }
            let expected = trailing_average(counts, day, config.moving_average_days)
                .max(config.minimum_expected);
            if (observed as f64) <= expected * config.multiplier {
                continue;
            }
            let ratio = observed as f64 / expected;
            let severity = if ratio >= config.critical_ratio {
                Severity::Critical
            } else if ratio >= config.high_ratio {
                Severity::High
            } else {
                Severity::Medium
            };
            anomalies.push(VolumeAnomaly {
                date: day,
                region: region.to_string(),
                observed,
                expected,
                ratio,
                severity,
            });
        }
    }

    anomalies.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.region.cmp(&b.region)));

    AnomalyReport {
        anomalies,
        lookback_days: config.lookback_days,
        analyzed_incidents: analyzed,
        generated_at: now,
    }
}

fn trailing_average(counts: &BTreeMap<NaiveDate, usize>, day: NaiveDate, days: u32) -> f64 {
    if days == 0 {
        return 0.0;
    }
    let start = day - Duration::days(i64::from(days));
    let total: usize = counts.range(start..day).map(|(_, count)| count).sum();
    total as f64 / f64::from(days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityIssueKind {
    MissingField,
    InvalidValue,
    FutureTimestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    pub entity_type: String,
    pub entity_id: String,
    pub issue_type: QualityIssueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub issues: Vec<DataQualityIssue>,
    pub scanned: usize,
    pub generated_at: DateTime<Utc>,
}

const INCIDENT_ENTITY: &str = "incident";

/// One issue per defect on every row; issues are never merged.
pub fn scan_quality(rows: &[IncidentRow], now: DateTime<Utc>) -> QualityReport {
    let issues = rows.iter().flat_map(|row| scan_row(row, now)).collect();
    QualityReport {
        issues,
        scanned: rows.len(),
        generated_at: now,
    }
}

fn scan_row(row: &IncidentRow, now: DateTime<Utc>) -> Vec<DataQualityIssue> {
    let entity_id = row.entity_id();
    let mut issues = Vec::new();
    let mut push = |kind: QualityIssueKind, field: &str, severity: Severity, message: String| {
        issues.push(DataQualityIssue {
            entity_type: INCIDENT_ENTITY.to_string(),
            entity_id: entity_id.clone(),
            issue_type: kind,
            field: Some(field.to_string()),
            severity,
            message,
        });
    };

    let text_fields: [(&str, &Option<String>, Severity); 6] = [
        ("id", &row.id, Severity::High),
        ("title", &row.title, Severity::Medium),
        ("description", &row.description, Severity::Low),
        ("location", &row.location, Severity::Medium),
        ("region", &row.region, Severity::Medium),
        ("category", &row.category, Severity::Medium),
    ];
    for (field, value, severity) in text_fields {
        if present(value).is_none() {
            push(
                QualityIssueKind::MissingField,
                field,
                severity,
                format!("incident is missing {field}"),
            );
        }
    }

    let enums: [(&str, &Option<String>, bool, fn(&str) -> bool); 3] = [
        ("severity", &row.severity, true, |raw| {
            Severity::parse(raw).is_some()
        }),
        ("status", &row.status, true, |raw| {
            IncidentStatus::parse(raw).is_some()
        }),
        ("verification_status", &row.verification_status, false, |raw| {
            VerificationStatus::parse(raw).is_some()
        }),
    ];
    for (field, value, required, valid) in enums {
        match present(value) {
            None if required => push(
                QualityIssueKind::MissingField,
                field,
                Severity::High,
                format!("incident is missing {field}"),
            ),
            None => {}
            Some(raw) if !valid(raw) => push(
                QualityIssueKind::InvalidValue,
                field,
                Severity::High,
                format!("{field} value `{raw}` is not recognised"),
            ),
            Some(_) => {}
        }
    }

    match row.reported_at {
        None => push(
            QualityIssueKind::MissingField,
            "reported_at",
            Severity::High,
            "incident is missing reported_at".to_string(),
        ),
        Some(reported_at) if reported_at > now => push(
            QualityIssueKind::FutureTimestamp,
            "reported_at",
            Severity::Medium,
            format!("reported_at {} is in the future", reported_at.to_rfc3339()),
        ),
        Some(_) => {}
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::domain::IncidentId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 31, 18, 0, 0).unwrap()
    }

    fn incident(id: &str, region: &str, at: DateTime<Utc>) -> IncidentRecord {
        IncidentRecord {
            id: IncidentId(id.to_string()),
            title: "Clash".to_string(),
            description: "Clash reported".to_string(),
            location: "Town".to_string(),
            region: region.to_string(),
            state: None,
            category: "conflict".to_string(),
            severity: Severity::Medium,
            status: IncidentStatus::Active,
            verification_status: VerificationStatus::Verified,
            reported_at: at,
            impacted_population: None,
            resolved_at: None,
        }
    }

    fn complete_row() -> IncidentRow {
        IncidentRow {
            id: Some("inc-1".to_string()),
            title: Some("Market clash".to_string()),
            description: Some("Traders clashed".to_string()),
            location: Some("Jos".to_string()),
            region: Some("North Central".to_string()),
            state: Some("Plateau".to_string()),
            category: Some("conflict".to_string()),
            severity: Some("high".to_string()),
            status: Some("active".to_string()),
            verification_status: Some("verified".to_string()),
            reported_at: Some(now() - Duration::days(1)),
            impacted_population: None,
            resolved_at: None,
        }
    }

    #[test]
    fn spike_over_quiet_baseline_is_flagged() {
        let spike_day = Utc.with_ymd_and_hms(2025, 3, 20, 9, 0, 0).unwrap();
        let mut incidents: Vec<IncidentRecord> = (0..5)
            .map(|n| incident(&format!("spike-{n}"), "North West", spike_day))
            .collect();
        incidents.push(incident(
            "baseline",
            "North West",
            spike_day - Duration::days(3),
        ));

        let report = detect_anomalies(&incidents, now(), &AnomalyConfig::default());

        assert_eq!(report.anomalies.len(), 1);
        let anomaly = &report.anomalies[0];
        assert_eq!(anomaly.region, "North West");
        assert_eq!(anomaly.observed, 5);
        // 1/7 average is floored to the minimum expected of 1.0
        assert_eq!(anomaly.expected, 1.0);
        assert_eq!(anomaly.severity, Severity::Critical);
    }

    #[test]
    fn busy_but_steady_region_is_not_flagged() {
        let mut incidents = Vec::new();
        for day in 0..40 {
            let at = now() - Duration::days(day);
            for n in 0..3 {
                incidents.push(incident(&format!("steady-{day}-{n}"), "South West", at));
            }
        }

        let report = detect_anomalies(&incidents, now(), &AnomalyConfig::default());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn below_minimum_observed_is_ignored() {
        let at = now() - Duration::days(2);
        let incidents = vec![incident("a", "North East", at), incident("b", "North East", at)];

        let report = detect_anomalies(&incidents, now(), &AnomalyConfig::default());
        assert!(report.anomalies.is_empty());
    }

    #[test]
    fn clean_row_has_no_issues() {
        let report = scan_quality(&[complete_row()], now());
        assert!(report.issues.is_empty());
        assert_eq!(report.scanned, 1);
    }

    #[test]
    fn future_timestamp_and_missing_location_yield_two_issues() {
        let mut row = complete_row();
        row.location = None;
        row.reported_at = Some(now() + Duration::days(2));

        let report = scan_quality(&[row], now());

        assert_eq!(report.issues.len(), 2);
        let kinds: Vec<QualityIssueKind> =
            report.issues.iter().map(|issue| issue.issue_type).collect();
        assert!(kinds.contains(&QualityIssueKind::MissingField));
        assert!(kinds.contains(&QualityIssueKind::FutureTimestamp));
    }

    #[test]
    fn unknown_enumeration_values_are_reported_per_field() {
        let mut row = complete_row();
        row.severity = Some("extreme".to_string());
        row.status = Some("archived".to_string());
        row.verification_status = Some("maybe".to_string());

        let report = scan_quality(&[row], now());

        assert_eq!(report.issues.len(), 3);
        assert!(report
            .issues
            .iter()
            .all(|issue| issue.issue_type == QualityIssueKind::InvalidValue));
    }
}
