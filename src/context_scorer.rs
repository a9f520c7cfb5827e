//! Linguistic refinement of pattern evidence.
//!
//! The scorer looks past the raw matches at the text around them and returns
//! a bounded bonus:
//!
//! | cue | bonus |
//! |---|---|
//! | at least 3 legal-vocabulary tokens in the document | +0.10 once |
//! | sentence holding a match contains an action word | +0.10 per match |
//! | sentence holding a match contains "if you" | +0.10 per match |
//! | monetary amount within 300 characters of a match | +0.15 per amount |
//!
//! The total is capped at [`MAX_BONUS`]. When no linguistic processor could be
//! built the scorer is [`ContextScorer::Disabled`] and always returns `0.0`.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;

use crate::linguistic::{
    EntityLabel, Lexicon, LinguisticConfig, LinguisticError, LinguisticProcessor,
    RuleBasedProcessor,
};
use crate::pattern::PatternMatch;

/// Upper bound of the linguistic bonus.
pub const MAX_BONUS: f64 = 0.4;
/// Only this many leading characters are annotated.
pub const MAX_SCORED_CHARS: usize = 100_000;

const LEGAL_CONTEXT_MIN_TERMS: usize = 3;
const LEGAL_CONTEXT_BONUS: f64 = 0.1;
const ACTION_SENTENCE_BONUS: f64 = 0.1;
const CONDITIONAL_SENTENCE_BONUS: f64 = 0.1;
const MONEY_NEARBY_BONUS: f64 = 0.15;
const MONEY_PROXIMITY_CHARS: usize = 300;

/// Vocabulary whose presence marks a genuine legal document.
pub const LEGAL_TERMS: &[&str] = &[
    "hereby",
    "whereas",
    "notwithstanding",
    "herein",
    "hereinafter",
    "pursuant",
    "indemnify",
    "liability",
    "arbitration",
    "jurisdiction",
    "governing",
    "warranties",
    "disclaimers",
    "severability",
    "termination",
    "confidentiality",
    "intellectual",
    "thereof",
];

/// Instructional verbs; matched as substrings of the lowercased sentence.
pub const ACTION_WORDS: &[&str] = &["email", "call", "contact", "visit", "send", "write", "reply"];

const CONDITIONAL_PHRASE: &str = "if you";

pub enum ContextScorer {
    Active {
        processor: Box<dyn LinguisticProcessor>,
        legal_terms: HashSet<String>,
    },
    Disabled,
}

impl fmt::Debug for ContextScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextScorer::Active { legal_terms, .. } => {
                write!(f, "ContextScorer::Active({} legal terms)", legal_terms.len())
            }
            ContextScorer::Disabled => f.write_str("ContextScorer::Disabled"),
        }
    }
}

impl Default for ContextScorer {
    fn default() -> Self {
        Self::from_config(&LinguisticConfig::default())
    }
}

impl ContextScorer {
    /// An active scorer over `processor` with the built-in legal vocabulary.
    pub fn active(processor: Box<dyn LinguisticProcessor>) -> Self {
        ContextScorer::Active {
            processor,
            legal_terms: LEGAL_TERMS.iter().map(|term| term.to_string()).collect(),
        }
    }

    pub fn disabled() -> Self {
        ContextScorer::Disabled
    }

    /// Build the scorer described by `config`.
    ///
    /// A processor that fails to build is reported once here; the scorer then
    /// stays disabled for its whole lifetime.
    pub fn from_config(config: &LinguisticConfig) -> Self {
        if !config.enabled {
            return ContextScorer::Disabled;
        }

        match Self::try_from_config(config) {
            Ok(scorer) => scorer,
            Err(error) => {
                warn!(%error, "linguistic processor unavailable; context scoring disabled");
                ContextScorer::Disabled
            }
        }
    }

    /// Like [`from_config`](Self::from_config) but surfaces the failure.
    pub fn try_from_config(config: &LinguisticConfig) -> Result<Self, LinguisticError> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::default(),
        };
        let processor = RuleBasedProcessor::with_lexicon(&lexicon)?;

        let mut scorer = Self::active(Box::new(processor));
        if let ContextScorer::Active { legal_terms, .. } = &mut scorer {
            legal_terms.extend(lexicon.legal_terms.iter().map(|term| term.to_lowercase()));
        }
        Ok(scorer)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ContextScorer::Active { .. })
    }

    /// Bonus in `[0.0, MAX_BONUS]` for the given matches over `text`.
    pub fn score_context(&self, text: &str, matches: &[PatternMatch]) -> f64 {
        let (processor, legal_terms) = match self {
            ContextScorer::Active {
                processor,
                legal_terms,
            } => (processor, legal_terms),
            ContextScorer::Disabled => return 0.0,
        };
        if matches.is_empty() {
            return 0.0;
        }

        let annotations = processor.annotate(truncate_chars(text, MAX_SCORED_CHARS));
        let mut score = 0.0;

        let legal_count = annotations
            .token_texts()
            .filter(|token| legal_terms.contains(&token.to_lowercase()))
            .count();
        if legal_count >= LEGAL_CONTEXT_MIN_TERMS {
            score += LEGAL_CONTEXT_BONUS;
        }

        for found in matches {
            if let Some(sentence) = annotations.sentence_at(found.start) {
                let lower = annotations.slice(sentence).to_lowercase();
                if ACTION_WORDS.iter().any(|word| lower.contains(word)) {
                    score += ACTION_SENTENCE_BONUS;
                }
                if lower.contains(CONDITIONAL_PHRASE) {
                    score += CONDITIONAL_SENTENCE_BONUS;
                }
            }
        }

        for entity in annotations.entities_labelled(EntityLabel::Money) {
            let nearby = matches.iter().any(|found| {
                within_chars(text, entity.span.start, found.start, MONEY_PROXIMITY_CHARS)
            });
            if nearby {
                score += MONEY_NEARBY_BONUS;
            }
        }

        score.min(MAX_BONUS)
    }
}

/// The prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Whether fewer than `limit` characters separate byte offsets `a` and `b`.
fn within_chars(text: &str, a: usize, b: usize, limit: usize) -> bool {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let bytes = hi - lo;
    // A char is 1..=4 bytes, so most pairs are decided without counting.
    if bytes < limit {
        return true;
    }
    if bytes >= limit * 4 {
        return false;
    }
    text.get(lo..hi)
        .map_or(false, |between| between.chars().count() < limit)
}
