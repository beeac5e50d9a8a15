use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use super::super::domain::{IncidentRecord, IncidentStatus, TimeWindow};
use super::config::PeaceThresholds;
use super::{OpportunityKind, OpportunityWindow, PeaceOpportunity, Priority, NATIONAL_REGION};

pub(crate) struct PeaceContext<'a> {
    pub incidents: Vec<&'a IncidentRecord>,
    pub window: TimeWindow,
    pub now: DateTime<Utc>,
    pub thresholds: &'a PeaceThresholds,
}

impl<'a> PeaceContext<'a> {
    fn by_region(&self) -> BTreeMap<&'a str, Vec<&'a IncidentRecord>> {
        let mut groups: BTreeMap<&str, Vec<&IncidentRecord>> = BTreeMap::new();
        for incident in self.incidents.iter().copied() {
            if incident.region.is_empty() {
                continue;
            }
            groups
                .entry(incident.region.as_str())
                .or_default()
                .push(incident);
        }
        groups
    }

    fn upcoming_window(&self) -> OpportunityWindow {
        OpportunityWindow {
            start: self.now,
            end: self.now + Duration::days(self.thresholds.horizon_days),
            optimal: self.now + Duration::days(self.thresholds.optimal_offset_days),
        }
    }

    fn opportunity(
        &self,
        kind: OpportunityKind,
        region: &str,
        confidence: u8,
        success_probability: u8,
    ) -> PeaceOpportunity {
        PeaceOpportunity {
            id: format!("peace-{}-{}", kind.slug(), slugify(region)),
            kind,
            title: String::new(),
            description: String::new(),
            region: region.to_string(),
            confidence,
            priority: Priority::from_confidence(confidence),
            time_window: self.upcoming_window(),
            indicators: Vec::new(),
            prerequisites: Vec::new(),
            recommendations: Vec::new(),
            risk_factors: Vec::new(),
            success_probability,
            detected_at: self.now,
        }
    }
}

fn slugify(value: &str) -> String {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn average_severity(incidents: &[&IncidentRecord]) -> f64 {
    if incidents.is_empty() {
        return 0.0;
    }
    let total: u32 = incidents
        .iter()
        .map(|incident| u32::from(incident.severity.score()))
        .sum();
    f64::from(total) / incidents.len() as f64
}

fn bounded(value: f64, max: u32) -> u8 {
    value.round().clamp(0.0, f64::from(max.min(100))) as u8
}

pub(crate) fn declining_violence(ctx: &PeaceContext<'_>) -> Vec<PeaceOpportunity> {
    let thresholds = &ctx.thresholds.declining;
    let midpoint = ctx.window.start + (ctx.window.end - ctx.window.start) / 2;
    let mut opportunities = Vec::new();

    for (region, incidents) in ctx.by_region() {
        if incidents.len() < thresholds.min_incidents {
            continue;
        }

        let (first, second): (Vec<&IncidentRecord>, Vec<&IncidentRecord>) = incidents
            .iter()
            .copied()
            .partition(|incident| incident.reported_at < midpoint);
        if first.is_empty() {
            continue;
        }

        let drop = average_severity(&first) - average_severity(&second);
        let volume_ratio = second.len() as f64 / first.len() as f64;
        if drop <= thresholds.min_severity_drop || volume_ratio >= thresholds.max_volume_ratio {
            continue;
        }

        let confidence = bounded(
            thresholds.base_confidence + 20.0 * drop + 40.0 * (1.0 - volume_ratio),
            thresholds.max_confidence,
        );
        let mut opportunity = ctx.opportunity(
            OpportunityKind::DecliningViolence,
            region,
            confidence,
            confidence.saturating_sub(10),
        );
        opportunity.title = format!("Declining violence in {region}");
        opportunity.description = format!(
            "Incident volume fell from {} to {} and average severity dropped by {drop:.1} points",
            first.len(),
            second.len()
        );
        opportunity.indicators = vec![
            format!("severity drop {drop:.2}"),
            format!("volume ratio {volume_ratio:.2}"),
        ];
        opportunity.prerequisites = vec![
            "Sustained security presence to hold current gains".to_string(),
            "Buy-in from community and traditional leaders".to_string(),
        ];
        opportunity.recommendations = vec![
            "Launch community dialogue sessions while tensions are low".to_string(),
            "Invest in livelihood programmes for at-risk youth".to_string(),
        ];
        opportunity.risk_factors =
            vec!["Spoilers may attempt to reignite violence".to_string()];
        opportunities.push(opportunity);
    }

    opportunities
}

pub(crate) fn resolution_pattern(ctx: &PeaceContext<'_>) -> Vec<PeaceOpportunity> {
    let thresholds = &ctx.thresholds.resolution;
    let mut opportunities = Vec::new();

    for (region, incidents) in ctx.by_region() {
        let durations: Vec<f64> = incidents
            .iter()
            .filter(|incident| incident.status == IncidentStatus::Resolved)
            .filter_map(|incident| {
                incident
                    .resolved_at
                    .filter(|resolved| *resolved >= incident.reported_at)
                    .map(|resolved| (resolved - incident.reported_at).num_minutes() as f64 / 1440.0)
            })
            .collect();

        if durations.len() < thresholds.min_resolved {
            continue;
        }
        let average_days = durations.iter().sum::<f64>() / durations.len() as f64;
        if average_days >= thresholds.max_average_days {
            continue;
        }

        let confidence = (thresholds.base_confidence
            + thresholds.confidence_per_resolution * durations.len() as u32)
            .min(thresholds.max_confidence)
            .min(100) as u8;
        let mut opportunity = ctx.opportunity(
            OpportunityKind::ResolutionPattern,
            region,
            confidence,
            confidence.saturating_sub(5),
        );
        opportunity.title = format!("Effective incident resolution in {region}");
        opportunity.description = format!(
            "{} incident(s) resolved in an average of {average_days:.1} days",
            durations.len()
        );
        opportunity.indicators = vec![
            format!("{} resolved incident(s)", durations.len()),
            format!("average resolution {average_days:.1} days"),
        ];
        opportunity.prerequisites =
            vec!["Continued funding for local resolution mechanisms".to_string()];
        opportunity.recommendations = vec![
            "Document and replicate the local resolution approach".to_string(),
            "Formalise the mechanism as a standing peace committee".to_string(),
        ];
        opportunity.risk_factors =
            vec!["Resolution capacity may not scale to larger incidents".to_string()];
        opportunities.push(opportunity);
    }

    opportunities
}

pub(crate) fn seasonal_windows(ctx: &PeaceContext<'_>) -> Vec<PeaceOpportunity> {
    let thresholds = &ctx.thresholds.seasonal;
    if ctx.incidents.is_empty() {
        return Vec::new();
    }

    let mut monthly = [0usize; 12];
    for incident in &ctx.incidents {
        monthly[incident.reported_at.month0() as usize] += 1;
    }
    let average = ctx.incidents.len() as f64 / 12.0;

    let candidates: Vec<u32> = (1..=12u32)
        .filter(|month| {
            (monthly[(*month - 1) as usize] as f64) < thresholds.candidate_ratio * average
        })
        .collect();
    let candidate_names: Vec<&str> = candidates.iter().map(|month| month_name(*month)).collect();

    let mut opportunities = Vec::new();
    for month in &candidates {
        let count = monthly[(*month - 1) as usize];
        let ratio = count as f64 / average;
        if ratio >= thresholds.opportunity_ratio {
            continue;
        }

        let confidence = bounded(
            thresholds.base_confidence + 50.0 * (1.0 - ratio),
            thresholds.max_confidence,
        );
        let mut opportunity = ctx.opportunity(
            OpportunityKind::SeasonalWindow,
            NATIONAL_REGION,
            confidence,
            confidence.saturating_sub(15),
        );
        opportunity.id = format!(
            "peace-{}-{}",
            OpportunityKind::SeasonalWindow.slug(),
            month_name(*month).to_ascii_lowercase()
        );
        opportunity.title = format!("Seasonal low in {}", month_name(*month));
        opportunity.description = format!(
            "{} historically records {count} incident(s) against a monthly average of {average:.1}",
            month_name(*month)
        );
        opportunity.time_window = month_window(ctx.now, *month);
        opportunity.indicators = vec![
            format!("{count} incident(s) vs {average:.1} average"),
            format!("low-activity months: {}", candidate_names.join(", ")),
        ];
        opportunity.prerequisites =
            vec!["Peace programming prepared ahead of the low season".to_string()];
        opportunity.recommendations = vec![
            "Schedule national dialogue events for the low-activity month".to_string(),
            "Time disarmament and reintegration drives to the seasonal lull".to_string(),
        ];
        opportunity.risk_factors =
            vec!["Seasonal patterns may shift with climate or migration".to_string()];
        opportunities.push(opportunity);
    }

    opportunities
}

pub(crate) fn political_stability(ctx: &PeaceContext<'_>) -> Vec<PeaceOpportunity> {
    let thresholds = &ctx.thresholds.political;
    let mut opportunities = Vec::new();

    for (region, incidents) in ctx.by_region() {
        if incidents
            .iter()
            .any(|incident| incident.has_category(&thresholds.category))
        {
            continue;
        }

        let mut opportunity = ctx.opportunity(
            OpportunityKind::PoliticalStability,
            region,
            thresholds.confidence,
            70,
        );
        opportunity.title = format!("Political stability in {region}");
        opportunity.description = format!(
            "No political incidents recorded in {region} across {} incident(s)",
            incidents.len()
        );
        opportunity.indicators = vec!["zero political incidents in window".to_string()];
        opportunity.prerequisites =
            vec!["Engagement of state and local government officials".to_string()];
        opportunity.recommendations = vec![
            "Use the stable political climate to pass local peace agreements".to_string(),
            "Strengthen inclusive governance forums".to_string(),
        ];
        opportunity.risk_factors =
            vec!["Upcoming elections may disrupt stability".to_string()];
        opportunities.push(opportunity);
    }

    opportunities
}

pub(crate) fn reconciliation_signals(ctx: &PeaceContext<'_>) -> Vec<PeaceOpportunity> {
    let thresholds = &ctx.thresholds.reconciliation;
    let quiet_since = ctx.now - Duration::days(thresholds.quiet_days);
    let mut opportunities = Vec::new();

    for (region, incidents) in ctx.by_region() {
        let conflicts: Vec<&IncidentRecord> = incidents
            .iter()
            .copied()
            .filter(|incident| incident.has_category(&thresholds.category))
            .collect();
        if conflicts.is_empty()
            || conflicts
                .iter()
                .any(|incident| incident.reported_at >= quiet_since)
        {
            continue;
        }

        let mut opportunity = ctx.opportunity(
            OpportunityKind::ReconciliationSignal,
            region,
            thresholds.confidence,
            60,
        );
        opportunity.title = format!("Reconciliation window in {region}");
        opportunity.description = format!(
            "{} earlier conflict incident(s) but none in the last {} days",
            conflicts.len(),
            thresholds.quiet_days
        );
        opportunity.indicators = vec![format!(
            "{} day(s) without conflict incidents",
            thresholds.quiet_days
        )];
        opportunity.prerequisites = vec![
            "Willingness of former parties to meet".to_string(),
            "Neutral mediators trusted by both communities".to_string(),
        ];
        opportunity.recommendations = vec![
            "Facilitate reconciliation meetings between affected communities".to_string(),
            "Support joint community projects to rebuild trust".to_string(),
        ];
        opportunity.risk_factors =
            vec!["Unaddressed grievances may resurface".to_string()];
        opportunities.push(opportunity);
    }

    opportunities
}

fn month_window(now: DateTime<Utc>, month: u32) -> OpportunityWindow {
    let year = if month >= now.month() {
        now.year()
    } else {
        now.year() + 1
    };
    let first = start_of_month(year, month).unwrap_or(now);
    let next = if month == 12 {
        start_of_month(year + 1, 1)
    } else {
        start_of_month(year, month + 1)
    }
    .unwrap_or(first + Duration::days(30));

    let start = first.max(now);
    let end = next - Duration::seconds(1);
    let optimal = (first + Duration::days(14)).max(start).min(end);

    OpportunityWindow {
        start,
        end,
        optimal,
    }
}

fn start_of_month(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("Unknown")
}
