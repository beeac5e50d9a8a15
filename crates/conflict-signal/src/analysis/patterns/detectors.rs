use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};

use super::super::domain::{
    escalating_pairs, IncidentId, IncidentRecord, Severity, TimeWindow,
};
use super::config::PatternThresholds;
use super::{ConflictPattern, PatternKind};

/// Inputs shared by every detector for a single run.
pub(crate) struct DetectionContext<'a> {
    pub incidents: Vec<&'a IncidentRecord>,
    pub window: TimeWindow,
    pub now: DateTime<Utc>,
    pub thresholds: &'a PatternThresholds,
}

impl<'a> DetectionContext<'a> {
    fn by_region(&self) -> BTreeMap<&'a str, Vec<&'a IncidentRecord>> {
        let mut groups: BTreeMap<&str, Vec<&IncidentRecord>> = BTreeMap::new();
        for incident in self.incidents.iter().copied() {
            groups
                .entry(incident.region.as_str())
                .or_default()
                .push(incident);
        }
        groups
    }

    fn pattern(&self, kind: PatternKind) -> ConflictPattern {
        ConflictPattern {
            id: format!("pattern-{}", kind.slug()),
            kind,
            title: String::new(),
            description: String::new(),
            confidence: 0,
            severity: Severity::Medium,
            affected_regions: Vec::new(),
            time_window: self.window,
            indicators: Vec::new(),
            related_incidents: Vec::new(),
            risk_factors: Vec::new(),
            recommendations: Vec::new(),
            detected_at: self.now,
        }
    }
}

pub(crate) fn capped_confidence(base: u32, step: u32, count: usize, max: u32) -> u8 {
    let raw = base.saturating_add(step.saturating_mul(count as u32));
    raw.min(max).min(100) as u8
}

fn ids(incidents: &[&IncidentRecord]) -> Vec<IncidentId> {
    incidents.iter().map(|incident| incident.id.clone()).collect()
}

fn distinct_regions(incidents: &[&IncidentRecord]) -> Vec<String> {
    incidents
        .iter()
        .map(|incident| incident.region.clone())
        .filter(|region| !region.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub(crate) fn geographic_escalation(ctx: &DetectionContext<'_>) -> Option<ConflictPattern> {
    let thresholds = &ctx.thresholds.geographic;
    let mut spreading: Vec<(&str, usize, usize)> = Vec::new();
    let mut related: Vec<&IncidentRecord> = Vec::new();

    for (region, incidents) in ctx.by_region() {
        if region.is_empty() {
            continue;
        }
        let pairs = escalating_pairs(&incidents);
        if pairs as f64 > thresholds.spreading_ratio * incidents.len() as f64 {
            spreading.push((region, pairs, incidents.len()));
            related.extend(incidents.iter().copied());
        }
    }

    if spreading.len() < thresholds.min_spreading_regions {
        return None;
    }

    let count = spreading.len();
    let severity = if count >= thresholds.critical_regions {
        Severity::Critical
    } else if count >= thresholds.high_regions {
        Severity::High
    } else {
        Severity::Medium
    };

    let mut pattern = ctx.pattern(PatternKind::GeographicEscalation);
    pattern.title = "Geographic escalation across regions".to_string();
    pattern.description = format!(
        "Severity is rising in {count} regions at once, suggesting spreading violence"
    );
    pattern.confidence = capped_confidence(
        thresholds.base_confidence,
        thresholds.confidence_per_region,
        count,
        thresholds.max_confidence,
    );
    pattern.severity = severity;
    pattern.affected_regions = spreading
        .iter()
        .map(|(region, _, _)| region.to_string())
        .collect();
    pattern.indicators = spreading
        .iter()
        .map(|(region, pairs, total)| {
            format!("{region}: {pairs} escalating step(s) across {total} incident(s)")
        })
        .collect();
    pattern.related_incidents = ids(&related);
    pattern.risk_factors = vec![
        "Simultaneous escalation in neighbouring regions".to_string(),
        "Possible coordination between armed groups".to_string(),
    ];
    pattern.recommendations = vec![
        "Coordinate security deployments across affected regions".to_string(),
        "Activate inter-state early warning channels".to_string(),
        "Pre-position humanitarian supplies along affected corridors".to_string(),
    ];
    Some(pattern)
}

pub(crate) fn temporal_clustering(ctx: &DetectionContext<'_>) -> Option<ConflictPattern> {
    let thresholds = &ctx.thresholds.temporal;
    let mut daily: BTreeMap<NaiveDate, Vec<&IncidentRecord>> = BTreeMap::new();
    for incident in ctx.incidents.iter().copied() {
        daily
            .entry(incident.reported_at.date_naive())
            .or_default()
            .push(incident);
    }

    if daily.is_empty() {
        return None;
    }

    let average = ctx.incidents.len() as f64 / daily.len() as f64;
    let flagged: Vec<(NaiveDate, &Vec<&IncidentRecord>)> = daily
        .iter()
        .filter(|(_, incidents)| incidents.len() as f64 > thresholds.spike_multiplier * average)
        .map(|(day, incidents)| (*day, incidents))
        .collect();

    if flagged.len() < thresholds.min_flagged_days {
        return None;
    }

    let related: Vec<&IncidentRecord> = flagged
        .iter()
        .flat_map(|(_, incidents)| incidents.iter().copied())
        .collect();

    let mut pattern = ctx.pattern(PatternKind::TemporalClustering);
    pattern.title = "Temporal clustering of incidents".to_string();
    pattern.description = format!(
        "{} day(s) recorded more than {:.1}x the average daily volume of {:.1}",
        flagged.len(),
        thresholds.spike_multiplier,
        average
    );
    pattern.confidence = capped_confidence(
        thresholds.base_confidence,
        thresholds.confidence_per_day,
        flagged.len(),
        thresholds.max_confidence,
    );
    pattern.severity = if flagged.len() >= thresholds.high_flagged_days {
        Severity::High
    } else {
        Severity::Medium
    };
    pattern.affected_regions = distinct_regions(&related);
    pattern.indicators = flagged
        .iter()
        .map(|(day, incidents)| format!("{day}: {} incident(s)", incidents.len()))
        .collect();
    pattern.related_incidents = ids(&related);
    pattern.risk_factors = vec![
        "Coordinated or retaliatory attack waves".to_string(),
        "Response capacity saturation on spike days".to_string(),
    ];
    pattern.recommendations = vec![
        "Review triggers that preceded spike days".to_string(),
        "Increase patrol readiness around recurring spike dates".to_string(),
    ];
    Some(pattern)
}

pub(crate) fn actor_based(ctx: &DetectionContext<'_>) -> Option<ConflictPattern> {
    let thresholds = &ctx.thresholds.actor;
    let mut by_category: BTreeMap<String, Vec<&IncidentRecord>> = BTreeMap::new();
    for incident in ctx.incidents.iter().copied() {
        let category = incident.category.trim().to_ascii_lowercase();
        if category.is_empty() {
            continue;
        }
        by_category.entry(category).or_default().push(incident);
    }

    let mut fragments: Vec<(String, usize, Vec<String>)> = Vec::new();
    let mut related: Vec<&IncidentRecord> = Vec::new();
    for (category, incidents) in &by_category {
        let regions = distinct_regions(incidents);
        if incidents.len() >= thresholds.min_incidents && regions.len() >= thresholds.min_regions
        {
            fragments.push((category.clone(), incidents.len(), regions));
            related.extend(incidents.iter().copied());
        }
    }

    if fragments.is_empty() {
        return None;
    }

    let mut pattern = ctx.pattern(PatternKind::ActorBased);
    pattern.title = "Multi-region actor activity".to_string();
    pattern.description = format!(
        "{} incident categor{} active across {} or more regions",
        fragments.len(),
        if fragments.len() == 1 { "y" } else { "ies" },
        thresholds.min_regions
    );
    pattern.confidence = capped_confidence(
        thresholds.base_confidence,
        thresholds.confidence_per_fragment,
        fragments.len(),
        thresholds.max_confidence,
    );
    pattern.severity = if fragments.len() >= thresholds.high_fragments {
        Severity::High
    } else {
        Severity::Medium
    };
    pattern.affected_regions = distinct_regions(&related);
    pattern.indicators = fragments
        .iter()
        .map(|(category, count, regions)| {
            format!(
                "{category}: {count} incident(s) in {}",
                regions.join(", ")
            )
        })
        .collect();
    pattern.related_incidents = ids(&related);
    pattern.risk_factors = vec![
        "Mobile armed actors operating across state lines".to_string(),
        "Shared tactics suggesting a common network".to_string(),
    ];
    pattern.recommendations = vec![
        "Share actor intelligence between regional commands".to_string(),
        "Map supply and movement routes between affected regions".to_string(),
    ];
    Some(pattern)
}

pub(crate) fn resource_conflict(ctx: &DetectionContext<'_>) -> Option<ConflictPattern> {
    let thresholds = &ctx.thresholds.resource;
    let matches: Vec<&IncidentRecord> = ctx
        .incidents
        .iter()
        .copied()
        .filter(|incident| {
            let text = incident.narrative().to_lowercase();
            thresholds
                .keywords
                .iter()
                .any(|keyword| text.contains(keyword.as_str()))
        })
        .collect();

    if matches.len() < thresholds.min_matches {
        return None;
    }

    let severe = matches
        .iter()
        .filter(|incident| incident.severity.is_severe())
        .count();
    let severity = if severe >= thresholds.high_severe_matches {
        Severity::High
    } else if severe >= thresholds.medium_severe_matches {
        Severity::Medium
    } else {
        Severity::Low
    };

    let mut pattern = ctx.pattern(PatternKind::ResourceConflict);
    pattern.title = "Resource-driven conflict".to_string();
    pattern.description = format!(
        "{} incident(s) reference land, water, grazing or livestock disputes",
        matches.len()
    );
    pattern.confidence = capped_confidence(
        thresholds.base_confidence,
        thresholds.confidence_per_match,
        matches.len(),
        thresholds.max_confidence,
    );
    pattern.severity = severity;
    pattern.affected_regions = distinct_regions(&matches);
    pattern.indicators = vec![
        format!("{} resource-related incident(s)", matches.len()),
        format!("{severe} of them high or critical severity"),
    ];
    pattern.related_incidents = ids(&matches);
    pattern.risk_factors = vec![
        "Competition over grazing land and water".to_string(),
        "Seasonal migration pressure".to_string(),
    ];
    pattern.recommendations = vec![
        "Convene farmer-herder mediation committees".to_string(),
        "Demarcate grazing routes and reserves".to_string(),
        "Support water access projects in hotspot communities".to_string(),
    ];
    Some(pattern)
}

pub(crate) fn severity_escalation(ctx: &DetectionContext<'_>) -> Option<ConflictPattern> {
    let thresholds = &ctx.thresholds.severity;
    let rate = escalation_rate(&ctx.incidents);
    if rate <= thresholds.min_rate {
        return None;
    }

    let severity = if rate > thresholds.critical_rate {
        Severity::Critical
    } else if rate > thresholds.high_rate {
        Severity::High
    } else {
        Severity::Medium
    };

    let mut related: Vec<&IncidentRecord> = Vec::new();
    for pair in ctx.incidents.windows(2) {
        if pair[1].severity > pair[0].severity {
            for incident in pair.iter().copied() {
                if !related.iter().any(|seen| seen.id == incident.id) {
                    related.push(incident);
                }
            }
        }
    }

    let confidence = (thresholds.base_confidence + thresholds.rate_weight * rate)
        .round()
        .min(f64::from(thresholds.max_confidence))
        .clamp(0.0, 100.0) as u8;

    let mut pattern = ctx.pattern(PatternKind::SeverityEscalation);
    pattern.title = "Escalating incident severity".to_string();
    pattern.description = format!(
        "{:.0}% of consecutive incidents were more severe than the one before",
        rate * 100.0
    );
    pattern.confidence = confidence;
    pattern.severity = severity;
    pattern.affected_regions = distinct_regions(&related);
    pattern.indicators = vec![format!("escalation rate {rate:.2}")];
    pattern.related_incidents = ids(&related);
    pattern.risk_factors = vec![
        "Retaliatory cycles raising the intensity of each incident".to_string(),
    ];
    pattern.recommendations = vec![
        "Prioritise de-escalation engagement with community leaders".to_string(),
        "Raise alert levels for responders in affected areas".to_string(),
    ];
    Some(pattern)
}

/// Share of adjacent pairs that escalate; 0 when fewer than two incidents.
pub(crate) fn escalation_rate(ordered: &[&IncidentRecord]) -> f64 {
    if ordered.len() <= 1 {
        return 0.0;
    }
    escalating_pairs(ordered) as f64 / (ordered.len() - 1) as f64
}
