/// Strips BOM and zero-width characters and collapses runs of whitespace.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Header key used for alias lookup: cleaned, lowercase, `_` and `-` read as spaces.
pub(crate) fn normalize_header(value: &str) -> String {
    normalize_text(&value.replace(['_', '-'], " ")).to_ascii_lowercase()
}

/// Enumeration cells are stored lowercase with spaces as underscores.
pub(crate) fn normalize_label(value: &str) -> String {
    normalize_text(value).to_ascii_lowercase().replace(' ', "_")
}
