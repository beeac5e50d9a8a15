use super::mapping::field_for_header;
use super::normalizer::{normalize_label, normalize_text};
use crate::analysis::IncidentRow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::io::Read;

/// Reads the export into rows. Unknown columns are ignored and unparseable
/// cells become `None`, leaving the judgement to validation and the quality scan.
pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<IncidentRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // first column wins when two headers alias the same field
    let mut seen = HashSet::new();
    let headers: csv::StringRecord = csv_reader
        .headers()?
        .iter()
        .map(|header| match field_for_header(header) {
            Some(field) if seen.insert(field) => field,
            _ => "ignored",
        })
        .collect();
    csv_reader.set_headers(headers);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize::<CsvIncident>() {
        rows.push(record?.into_row());
    }

    Ok(rows)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvIncident {
    #[serde(deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    title: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    description: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    severity: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    verification_status: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    reported_at: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    resolved_at: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    impacted_population: Option<String>,
}

impl CsvIncident {
    fn into_row(self) -> IncidentRow {
        let text = |value: Option<String>| value.map(|value| normalize_text(&value));
        let label = |value: Option<String>| value.map(|value| normalize_label(&value));

        IncidentRow {
            id: text(self.id),
            title: text(self.title),
            description: text(self.description),
            location: text(self.location),
            region: text(self.region),
            state: text(self.state),
            category: label(self.category),
            severity: label(self.severity),
            status: label(self.status),
            verification_status: label(self.verification_status),
            reported_at: self.reported_at.as_deref().and_then(parse_timestamp),
            resolved_at: self.resolved_at.as_deref().and_then(parse_timestamp),
            impacted_population: self
                .impacted_population
                .as_deref()
                .and_then(parse_population),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !normalize_text(value).is_empty()))
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    None
}

fn parse_population(value: &str) -> Option<u32> {
    value.trim().replace(',', "").parse().ok()
}

#[cfg(test)]
pub(crate) fn parse_timestamp_for_tests(value: &str) -> Option<DateTime<Utc>> {
    parse_timestamp(value)
}
