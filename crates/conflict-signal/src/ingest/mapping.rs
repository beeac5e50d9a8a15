use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;

static HEADER_MAP: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

/// Canonical field for an export header, if the header is recognised.
pub(crate) fn field_for_header(header: &str) -> Option<&'static str> {
    header_map().get(&normalize_header(header)).copied()
}

fn header_map() -> &'static HashMap<String, &'static str> {
    HEADER_MAP.get_or_init(|| {
        const HEADER_TO_FIELD: &[(&str, &str)] = &[
            ("ID", "id"),
            ("Incident ID", "id"),
            ("Title", "title"),
            ("Description", "description"),
            ("Details", "description"),
            ("Location", "location"),
            ("Region", "region"),
            ("Geopolitical Zone", "region"),
            ("State", "state"),
            ("Category", "category"),
            ("Incident Type", "category"),
            ("Severity", "severity"),
            ("Status", "status"),
            ("Verification", "verification_status"),
            ("Verification Status", "verification_status"),
            ("Reported At", "reported_at"),
            ("Reported", "reported_at"),
            ("Date", "reported_at"),
            ("Resolved At", "resolved_at"),
            ("Impacted Population", "impacted_population"),
            ("Casualties", "impacted_population"),
        ];

        HEADER_TO_FIELD
            .iter()
            .map(|(header, field)| (normalize_header(header), *field))
            .collect()
    })
}
