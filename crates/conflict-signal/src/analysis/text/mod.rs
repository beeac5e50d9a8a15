//! Lexicon-driven scoring of free-text incident reports.

mod keywords;
mod lexicon;
mod sentiment;

pub use keywords::Keyword;
pub use lexicon::Lexicon;
pub use sentiment::{SentimentLabel, SentimentScore};

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::Severity;

const KEYWORD_LIMIT: usize = 10;
pub const DUPLICATE_THRESHOLD: f64 = 0.7;

/// Lexicon terms found in a report, one entry per distinct term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorHits {
    pub violence: Vec<String>,
    pub tension: Vec<String>,
    pub peace: Vec<String>,
    pub humanitarian: Vec<String>,
}

impl IndicatorHits {
    /// Hits that point towards conflict (violence, tension, humanitarian).
    pub fn conflict_hits(&self) -> usize {
        self.violence.len() + self.tension.len() + self.humanitarian.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub locations: Vec<String>,
    pub groups: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictAnalysis {
    pub conflict_score: u8,
    pub peace_score: u8,
    pub sentiment: SentimentScore,
    pub indicators: IndicatorHits,
    pub risk_level: Severity,
    pub keywords: Vec<Keyword>,
    pub entities: ExtractedEntities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningRecommendation {
    Accept,
    Review,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub is_conflict_related: bool,
    pub confidence: u8,
    pub analysis: ConflictAnalysis,
    pub recommendation: ScreeningRecommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub similarity: f64,
    pub is_duplicate: bool,
    pub confidence: u8,
}

/// Stateless scorer; the lexicon is injected so alternates can be tested.
#[derive(Debug, Clone)]
pub struct TextSignalScorer {
    lexicon: Arc<Lexicon>,
}

impl Default for TextSignalScorer {
    fn default() -> Self {
        Self::new(Lexicon::standard())
    }
}

impl TextSignalScorer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Score `text`. Callers reject empty input before getting here.
    pub fn analyze(&self, text: &str) -> ConflictAnalysis {
        let lowered = text.to_lowercase();
        let tokens = tokenize(&lowered);

        let indicators = IndicatorHits {
            violence: matching_terms(&lowered, &self.lexicon.violence),
            tension: matching_terms(&lowered, &self.lexicon.tension),
            peace: matching_terms(&lowered, &self.lexicon.peace),
            humanitarian: matching_terms(&lowered, &self.lexicon.humanitarian),
        };

        let sentiment = sentiment::score_tokens(&tokens, &self.lexicon.valence);

        let conflict_raw = 10 * indicators.violence.len() as i64
            + 5 * indicators.tension.len() as i64
            + 3 * i64::from((-sentiment.score).max(0));
        let peace_raw =
            10 * indicators.peace.len() as i64 + 3 * i64::from(sentiment.score.max(0));

        let conflict_score = conflict_raw.min(100) as u8;
        let peace_score = peace_raw.min(100) as u8;

        ConflictAnalysis {
            conflict_score,
            peace_score,
            sentiment,
            indicators,
            risk_level: risk_level_for(conflict_score),
            keywords: keywords::extract_keywords(&tokens, &self.lexicon.stopwords, KEYWORD_LIMIT),
            entities: ExtractedEntities {
                locations: matching_terms(&lowered, &self.lexicon.locations),
                groups: matching_terms(&lowered, &self.lexicon.groups),
            },
        }
    }

    /// Decide whether a submitted statement belongs in the incident pipeline.
    pub fn screen_statement(&self, text: &str) -> ScreeningResult {
        let analysis = self.analyze(text);
        let total_hits = analysis.indicators.conflict_hits();

        let is_conflict_related = total_hits > 0 || analysis.conflict_score > 20;
        let confidence = (15 * total_hits
            + 10 * analysis.entities.locations.len()
            + 15 * analysis.entities.groups.len())
        .min(100) as u8;

        let recommendation = match (is_conflict_related, confidence) {
            (true, c) if c >= 70 => ScreeningRecommendation::Accept,
            (true, c) if c >= 40 => ScreeningRecommendation::Review,
            _ => ScreeningRecommendation::Reject,
        };

        ScreeningResult {
            is_conflict_related,
            confidence,
            analysis,
            recommendation,
        }
    }

    pub fn compare(&self, first: &str, second: &str) -> SimilarityResult {
        let similarity = calculate_similarity(first, second);
        SimilarityResult {
            similarity,
            is_duplicate: similarity >= DUPLICATE_THRESHOLD,
            confidence: (similarity * 100.0).round() as u8,
        }
    }
}

/// Jaccard similarity of lower-cased token sets, in `[0, 1]`.
pub fn calculate_similarity(first: &str, second: &str) -> f64 {
    let left: BTreeSet<String> = tokenize(&first.to_lowercase()).into_iter().collect();
    let right: BTreeSet<String> = tokenize(&second.to_lowercase()).into_iter().collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 1.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}

pub(crate) fn tokenize(lowered: &str) -> Vec<String> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn matching_terms(lowered: &str, terms: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for term in terms {
        if lowered.contains(term.as_str()) && !found.contains(term) {
            found.push(term.clone());
        }
    }
    found
}

pub(crate) fn risk_level_for(conflict_score: u8) -> Severity {
    match conflict_score {
        70.. => Severity::Critical,
        50..=69 => Severity::High,
        30..=49 => Severity::Medium,
        _ => Severity::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scorer() -> TextSignalScorer {
        TextSignalScorer::default()
    }

    #[test]
    fn bandit_attack_report_scores_high() {
        let analysis =
            scorer().analyze("Armed bandits attacked farmers in Zamfara, several killed");

        assert!(analysis.indicators.violence.contains(&"kill".to_string()));
        assert!(analysis.indicators.violence.contains(&"armed".to_string()));
        assert!(analysis.entities.locations.contains(&"zamfara".to_string()));
        assert!(analysis.entities.groups.contains(&"bandits".to_string()));
        assert!(matches!(
            analysis.risk_level,
            Severity::High | Severity::Critical
        ));
        assert_eq!(analysis.sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn peace_report_scores_peace_terms() {
        let analysis = scorer()
            .analyze("Community leaders signed a peace agreement after dialogue; calm restored");

        assert!(analysis.peace_score >= 40);
        assert_eq!(analysis.risk_level, Severity::Low);
        assert!(analysis.indicators.violence.is_empty());
    }

    #[test]
    fn repeated_terms_are_not_double_counted() {
        let analysis = scorer().analyze("attack attack attack");
        assert_eq!(analysis.indicators.violence, vec!["attack".to_string()]);
    }

    #[test]
    fn keywords_are_capped_at_ten() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let analysis = scorer().analyze(text);
        assert_eq!(analysis.keywords.len(), 10);
    }

    #[test]
    fn risk_levels_cover_every_band() {
        assert_eq!(risk_level_for(0), Severity::Low);
        assert_eq!(risk_level_for(29), Severity::Low);
        assert_eq!(risk_level_for(30), Severity::Medium);
        assert_eq!(risk_level_for(50), Severity::High);
        assert_eq!(risk_level_for(70), Severity::Critical);
        assert_eq!(risk_level_for(100), Severity::Critical);
    }

    #[test]
    fn screening_accepts_detailed_conflict_report() {
        let result = scorer().screen_statement(
            "Boko Haram militants attacked Maiduguri in Borno; many killed and displaced",
        );
        assert!(result.is_conflict_related);
        assert!(result.confidence >= 70);
        assert_eq!(result.recommendation, ScreeningRecommendation::Accept);
    }

    #[test]
    fn screening_rejects_unrelated_text() {
        let result = scorer().screen_statement("The weather today is sunny and pleasant");
        assert!(!result.is_conflict_related);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.recommendation, ScreeningRecommendation::Reject);
    }

    #[test]
    fn screening_reviews_moderate_reports() {
        let result = scorer().screen_statement("Protest reported in Kano over fuel prices");
        assert!(result.is_conflict_related);
        assert_eq!(result.confidence, 25);
        assert_eq!(result.recommendation, ScreeningRecommendation::Reject);

        let result =
            scorer().screen_statement("Protest and unrest reported in Kano and Kaduna markets");
        assert!(result.is_conflict_related);
        assert_eq!(result.recommendation, ScreeningRecommendation::Review);
    }

    #[test]
    fn similarity_is_reflexive_and_symmetric() {
        let a = "Gunmen attacked a village in Benue";
        let b = "A village in Benue was attacked overnight";
        assert_eq!(calculate_similarity(a, a), 1.0);
        assert_eq!(calculate_similarity(a, b), calculate_similarity(b, a));
        assert!(calculate_similarity(a, b) > 0.0);
        assert_eq!(calculate_similarity("", ""), 1.0);
        assert_eq!(calculate_similarity("alpha", "beta"), 0.0);
    }

    #[test]
    fn compare_flags_duplicates_at_threshold() {
        let result = scorer().compare(
            "Herders clash with farmers in Plateau",
            "herders CLASH with farmers in plateau!",
        );
        assert!(result.is_duplicate);
        assert_eq!(result.confidence, 100);

        let result = scorer().compare("Herders clash in Plateau", "Flooding in Lagos");
        assert!(!result.is_duplicate);
    }

    #[test]
    fn substitute_lexicon_changes_matches() {
        let lexicon = Lexicon {
            violence: vec!["stampede".to_string()],
            tension: Vec::new(),
            peace: Vec::new(),
            humanitarian: Vec::new(),
            locations: vec!["gotham".to_string()],
            groups: Vec::new(),
            stopwords: BTreeSet::new(),
            valence: HashMap::new(),
        };
        let scorer = TextSignalScorer::new(Arc::new(lexicon));
        let analysis = scorer.analyze("Stampede in Gotham after attack");

        assert_eq!(analysis.indicators.violence, vec!["stampede".to_string()]);
        assert_eq!(analysis.entities.locations, vec!["gotham".to_string()]);
        assert_eq!(analysis.conflict_score, 10);
    }
}
