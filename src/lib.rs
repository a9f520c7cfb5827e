#![doc(
    issue_tracker_base_url = "https://github.com/fineprint/fineprint/issues/"
)]

//! Detection of hidden-reward language in terms-of-service text.
//!
//! Some publishers bury a prize in their fine print ("if you've read this far,
//! email us to claim a $500 gift card"). This crate scores a document's plain
//! text for that kind of language.
//!
//! ## Components
//!
//! - [`PatternLibrary`] - Weighted signal rules and negative (boilerplate) rules
//! - [`LinguisticProcessor`] - Token, sentence and monetary-entity annotation
//! - [`ContextScorer`] - Bounded bonus from sentence and entity context
//! - [`Detector`] - Combines the above into a [`DetectionResult`]
//! - [`extract_context`] - Excerpt around the strongest match
//! - [`MatchDisplay`] - Matches rendered under their text for review
//!
//! ## Scoring
//!
//! The base score sums the highest weight of each rule that fired and is
//! capped at 0.9. Boilerplate penalties are added next, then a linguistic
//! bonus of at most 0.4. The result is clamped to `[0, 1]` and anything below
//! 0.1 is treated as no detection.
//!
//! ## Example
//!
//! ```
//! use fineprint::Detector;
//!
//! let detector = Detector::new();
//! let result = detector
//!     .analyze("If you've read this far, email us at prize@company.com")
//!     .unwrap();
//! assert!(result.confidence >= 0.3);
//! assert!(result.pattern_names.contains("read_this_far"));
//! ```

mod context_scorer;
mod detector;
mod display;
mod excerpt;
mod linguistic;
mod pattern;

pub use context_scorer::{ContextScorer, ACTION_WORDS, LEGAL_TERMS, MAX_BONUS, MAX_SCORED_CHARS};
pub use detector::{
    base_score, best_match, DetectionResult, Detector, ScoreBreakdown, BASE_SCORE_CAP,
    DETECTION_FLOOR,
};
pub use display::MatchDisplay;
pub use excerpt::{extract_context, DEFAULT_CONTEXT_WINDOW};
pub use linguistic::{
    Annotations, Entity, EntityLabel, Lexicon, LinguisticConfig, LinguisticError,
    LinguisticProcessor, RuleBasedProcessor, Span,
};
pub use pattern::{
    find_all_matches, find_negative_matches, Category, NegativeRule, PatternLibrary,
    PatternMatch, PatternRule,
};
