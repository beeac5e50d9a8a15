use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// Word-valence sentiment summary for a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: i32,
    pub comparative: f64,
    pub label: SentimentLabel,
}

pub(crate) fn score_tokens(tokens: &[String], valence: &HashMap<String, i32>) -> SentimentScore {
    let score: i32 = tokens
        .iter()
        .filter_map(|token| valence.get(token))
        .sum();

    let comparative = if tokens.is_empty() {
        0.0
    } else {
        f64::from(score) / tokens.len() as f64
    };

    let label = if score > 2 {
        SentimentLabel::Positive
    } else if score < -2 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentScore {
        score,
        comparative,
        label,
    }
}
