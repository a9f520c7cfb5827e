//! Confidence scoring for a whole document.
//!
//! [`Detector::analyze`] combines the evidence in a fixed order:
//!
//! 1. pattern matches (no matches, no detection)
//! 2. base score: maximum weight per rule, summed, capped at [`BASE_SCORE_CAP`]
//! 3. negative penalties, uncapped below
//! 4. linguistic bonus from the [`ContextScorer`]
//! 5. clamp to `[0, 1]`; anything under [`DETECTION_FLOOR`] is no detection

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::context_scorer::ContextScorer;
use crate::excerpt::{extract_context, DEFAULT_CONTEXT_WINDOW};
use crate::linguistic::LinguisticConfig;
use crate::pattern::{PatternLibrary, PatternMatch};

/// Ceiling for pattern evidence alone.
pub const BASE_SCORE_CAP: f64 = 0.9;
/// Final scores below this are reported as no detection.
pub const DETECTION_FLOOR: f64 = 0.1;

/// Outcome of a successful [`Detector::analyze`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    /// Final score rounded to 3 decimals, within `[0, 1]`
    pub confidence: f64,
    pub matches: Vec<PatternMatch>,
    /// Text of the strongest match
    pub matched_text: String,
    /// Excerpt around the strongest match
    pub context: String,
    /// Distinct identifiers of every rule that fired
    pub pattern_names: BTreeSet<&'static str>,
}

/// The individual terms behind a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Capped sum of per-rule maximum weights
    pub base: f64,
    /// Sum of negative penalties (zero or below)
    pub penalty: f64,
    /// Linguistic bonus
    pub bonus: f64,
    /// Base with each penalty applied in turn, plus the bonus, clamped to
    /// `[0, 1]`; unrounded
    pub score: f64,
}

#[derive(Debug)]
pub struct Detector {
    library: PatternLibrary,
    scorer: ContextScorer,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    /// Detector with the built-in linguistic processor, or without linguistic
    /// scoring if it cannot be built.
    pub fn new() -> Self {
        Self::from_config(&LinguisticConfig::default())
    }

    pub fn from_config(config: &LinguisticConfig) -> Self {
        Self::with_scorer(ContextScorer::from_config(config))
    }

    pub fn with_scorer(scorer: ContextScorer) -> Self {
        Self {
            library: PatternLibrary::standard(),
            scorer,
        }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn scorer(&self) -> &ContextScorer {
        &self.scorer
    }

    /// Score terms for `text`, or `None` when no rule matches.
    pub fn score_breakdown(&self, text: &str) -> Option<ScoreBreakdown> {
        let matches = self.library.find_all_matches(text);
        if matches.is_empty() {
            return None;
        }
        Some(self.breakdown(text, &matches))
    }

    fn breakdown(&self, text: &str, matches: &[PatternMatch]) -> ScoreBreakdown {
        let base = base_score(matches);
        let mut penalty = 0.0;
        let mut penalized = base;
        for (_, rule_penalty) in self.library.find_negative_matches(text) {
            penalty += rule_penalty;
            penalized += rule_penalty;
        }
        let bonus = self.scorer.score_context(text, matches);

        ScoreBreakdown {
            base,
            penalty,
            bonus,
            score: (penalized + bonus).clamp(0.0, 1.0),
        }
    }

    /// Analyze a document's plain text.
    ///
    /// Returns `None` when nothing matches or the combined score falls below
    /// [`DETECTION_FLOOR`].
    pub fn analyze(&self, text: &str) -> Option<DetectionResult> {
        let matches = self.library.find_all_matches(text);
        if matches.is_empty() {
            return None;
        }

        let breakdown = self.breakdown(text, &matches);
        debug!(
            matches = matches.len(),
            base = breakdown.base,
            penalty = breakdown.penalty,
            bonus = breakdown.bonus,
            score = breakdown.score,
            "scored document"
        );

        if breakdown.score < DETECTION_FLOOR {
            return None;
        }

        let best = best_match(&matches)?;
        let context = extract_context(text, best.start, best.end, DEFAULT_CONTEXT_WINDOW);
        let matched_text = best.matched_text.clone();
        let pattern_names = matches.iter().map(|m| m.rule_id).collect();

        Some(DetectionResult {
            confidence: round3(breakdown.score),
            matches,
            matched_text,
            context,
            pattern_names,
        })
    }
}

/// Sum of the highest weight seen per rule, capped at [`BASE_SCORE_CAP`].
///
/// A rule firing five times contributes its weight once. Rules are summed in
/// the order they first appear in `matches`.
pub fn base_score(matches: &[PatternMatch]) -> f64 {
    let mut per_rule: Vec<(&str, f64)> = Vec::new();
    for found in matches {
        match per_rule.iter_mut().find(|(rule_id, _)| *rule_id == found.rule_id) {
            Some((_, weight)) => *weight = weight.max(found.weight),
            None => per_rule.push((found.rule_id, found.weight)),
        }
    }
    per_rule
        .iter()
        .fold(0.0_f64, |sum, &(_, weight)| sum + weight)
        .min(BASE_SCORE_CAP)
}

/// The highest-weight match; ties go to the earliest in `matches`.
pub fn best_match(matches: &[PatternMatch]) -> Option<&PatternMatch> {
    matches.iter().fold(None, |best: Option<&PatternMatch>, candidate| match best {
        Some(current) if current.weight >= candidate.weight => Some(current),
        _ => Some(candidate),
    })
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Category;

    fn pattern_match(rule_id: &'static str, weight: f64, start: usize) -> PatternMatch {
        PatternMatch {
            rule_id,
            category: Category::Strong,
            matched_text: rule_id.to_string(),
            start,
            end: start + rule_id.len(),
            weight,
        }
    }

    #[test]
    fn base_score_keeps_max_per_rule() {
        let matches = vec![
            pattern_match("a", 0.2, 0),
            pattern_match("a", 0.3, 10),
            pattern_match("b", 0.1, 20),
        ];
        assert!((base_score(&matches) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn base_score_sums_in_first_appearance_order() {
        let matches = vec![
            pattern_match("c", 0.1, 0),
            pattern_match("a", 0.3, 5),
            pattern_match("b", 0.2, 10),
            pattern_match("a", 0.1, 15),
        ];
        assert_eq!(base_score(&matches), 0.1 + 0.3 + 0.2);
    }

    #[test]
    fn base_score_is_capped() {
        let matches = vec![
            pattern_match("a", 0.8, 0),
            pattern_match("b", 0.8, 10),
        ];
        assert_eq!(base_score(&matches), BASE_SCORE_CAP);
    }

    #[test]
    fn best_match_prefers_first_on_tie() {
        let matches = vec![
            pattern_match("low", 0.2, 0),
            pattern_match("first", 0.8, 5),
            pattern_match("second", 0.8, 1),
        ];
        assert_eq!(best_match(&matches).unwrap().rule_id, "first");
        assert!(best_match(&[]).is_none());
    }

    #[test]
    fn rounding() {
        assert_eq!(round3(0.123_456), 0.123);
        assert_eq!(round3(0.999_6), 1.0);
    }

    #[test]
    fn empty_text_is_no_detection() {
        let detector = Detector::new();
        assert!(detector.analyze("").is_none());
        assert!(detector.score_breakdown("").is_none());
    }
}
