use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Weighted term extracted from a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub weight: f64,
}

/// TF-IDF over a corpus holding only `tokens`; returns the `limit` heaviest terms.
///
/// With a single document every term shares the same idf, so ranking reduces to
/// term frequency. Ties are broken alphabetically.
pub(crate) fn extract_keywords(
    tokens: &[String],
    stopwords: &BTreeSet<String>,
    limit: usize,
) -> Vec<Keyword> {
    let mut frequencies: BTreeMap<&str, u32> = BTreeMap::new();
    for token in tokens {
        if token.len() < 2 || stopwords.contains(token) || is_numeric(token) {
            continue;
        }
        *frequencies.entry(token.as_str()).or_default() += 1;
    }

    let documents = 1.0_f64;
    let idf = 1.0 + (documents / (1.0 + 1.0)).ln();

    let mut weighted: Vec<Keyword> = frequencies
        .into_iter()
        .map(|(term, count)| Keyword {
            term: term.to_string(),
            weight: f64::from(count) * idf,
        })
        .collect();

    weighted.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    weighted.truncate(limit);
    weighted
}

fn is_numeric(token: &str) -> bool {
    token.chars().all(|c| c.is_ascii_digit())
}
