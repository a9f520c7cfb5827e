//! Linguistic annotation capability used by the context scorer.
//!
//! A [`LinguisticProcessor`] turns plain text into [`Annotations`]: word
//! tokens, sentence spans and labelled entity spans. Only the span contract
//! matters to callers, so any segmenter can stand behind the trait.
//!
//! [`RuleBasedProcessor`] is the built-in implementation:
//! - tokens and sentences come from Unicode text segmentation (UAX #29)
//! - sentence breaks after common abbreviations ("Dr.", "Inc.") are re-joined
//! - monetary amounts ("$1,000", "€20", "50 dollars") are tagged as [`EntityLabel::Money`]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Errors raised while building a linguistic processor.
#[derive(Debug, Error)]
pub enum LinguisticError {
    /// The lexicon file could not be read or parsed.
    #[error("failed to load lexicon: {path}: {message}")]
    Lexicon { path: String, message: String },

    /// An entity pattern failed to compile.
    #[error("invalid entity pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Linguistic scoring configuration, usually the `[linguistic]` table of the
/// application settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinguisticConfig {
    /// When false the context scorer is disabled outright.
    pub enabled: bool,
    /// Optional TOML lexicon extending abbreviations and legal vocabulary.
    pub lexicon_path: Option<PathBuf>,
}

impl Default for LinguisticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lexicon_path: None,
        }
    }
}

/// Extra vocabulary loaded from a TOML file:
///
/// ```toml
/// abbreviations = ["para", "sec"]
/// legal_terms = ["forthwith"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub abbreviations: Vec<String>,
    pub legal_terms: Vec<String>,
}

impl Lexicon {
    pub fn load(path: &Path) -> Result<Self, LinguisticError> {
        let content = fs::read_to_string(path).map_err(|e| LinguisticError::Lexicon {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| LinguisticError::Lexicon {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Byte span `[start, end)` into the annotated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Containment with both ends inclusive, so an offset sitting exactly on
    /// a sentence end still belongs to that sentence.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLabel {
    /// A monetary amount ("$500", "1,000 dollars")
    Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entity {
    pub label: EntityLabel,
    pub span: Span,
}

/// Annotation layers over a single text.
#[derive(Debug, Clone)]
pub struct Annotations<'t> {
    text: &'t str,
    pub tokens: Vec<Span>,
    pub sentences: Vec<Span>,
    pub entities: Vec<Entity>,
}

impl<'t> Annotations<'t> {
    pub fn new(text: &'t str) -> Self {
        Self {
            text,
            tokens: Vec::new(),
            sentences: Vec::new(),
            entities: Vec::new(),
        }
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn slice(&self, span: Span) -> &'t str {
        self.text.get(span.start..span.end).unwrap_or("")
    }

    pub fn token_texts(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.tokens.iter().map(move |span| self.slice(*span))
    }

    /// The first sentence containing `offset`, if any.
    pub fn sentence_at(&self, offset: usize) -> Option<Span> {
        self.sentences
            .iter()
            .copied()
            .find(|sentence| sentence.contains_inclusive(offset))
    }

    pub fn entities_labelled(&self, label: EntityLabel) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(move |entity| entity.label == label)
    }
}

/// A source of token, sentence and entity annotations.
///
/// Implementations are shared read-only across threads once built.
pub trait LinguisticProcessor: Send + Sync {
    fn annotate<'t>(&self, text: &'t str) -> Annotations<'t>;
}

const MONEY_PATTERN: &str = concat!(
    r"(?i)",
    r"[$€£¥]\s?\d+(?:,\d{3})*(?:\.\d+)?(?:\s?(?:k|m|million|billion|thousand)\b)?",
    r"|\b(?:usd|eur|gbp)\s?\d+(?:,\d{3})*(?:\.\d+)?",
    r"|\b\d+(?:,\d{3})*(?:\.\d+)?\s?(?:dollars|usd|euros|pounds|bucks)\b",
);

/// Abbreviations that end in a period without ending a sentence.
const COMMON_ABBREVIATIONS: &[&str] = &[
    "dr", "mr", "mrs", "ms", "prof", "sr", "jr",
    "inc", "ltd", "corp", "co", "llc",
    "e.g", "i.e", "vs", "etc", "approx",
    "u.s", "u.k", "p.m", "a.m",
    "ave", "blvd", "dept",
];

/// Abbreviations that are also ordinary words; they only hold a sentence
/// together when a number follows ("No. 5", "Art. 12").
const NUMBERED_ABBREVIATIONS: &[&str] = &["no", "art", "sec", "fig"];

/// Segmentation and entity tagging from Unicode rules and regular expressions.
#[derive(Debug, Clone)]
pub struct RuleBasedProcessor {
    abbreviations: HashSet<String>,
    money: Regex,
}

impl RuleBasedProcessor {
    pub fn new() -> Result<Self, LinguisticError> {
        Self::with_lexicon(&Lexicon::default())
    }

    pub fn with_lexicon(lexicon: &Lexicon) -> Result<Self, LinguisticError> {
        let abbreviations = COMMON_ABBREVIATIONS
            .iter()
            .map(|abbrev| abbrev.to_string())
            .chain(
                lexicon
                    .abbreviations
                    .iter()
                    .map(|abbrev| abbrev.trim_end_matches('.').to_lowercase()),
            )
            .collect();

        Ok(Self {
            abbreviations,
            money: Regex::new(MONEY_PATTERN)?,
        })
    }

    /// Whether `sentence` ends in an abbreviation that continues into `next`.
    fn continues_into(&self, sentence: &str, next: &str) -> bool {
        let last_word = match sentence.split_whitespace().last() {
            Some(word) => word,
            None => return false,
        };
        if !last_word.ends_with('.') {
            return false;
        }
        let normalized = last_word
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .trim_end_matches('.')
            .to_lowercase();
        if self.abbreviations.contains(&normalized) {
            return true;
        }
        NUMBERED_ABBREVIATIONS.contains(&normalized.as_str())
            && next.starts_with(|c: char| c.is_ascii_digit())
    }

    fn tokens(&self, text: &str) -> Vec<Span> {
        text.unicode_word_indices()
            .map(|(start, word)| Span::new(start, start + word.len()))
            .collect()
    }

    fn sentences(&self, text: &str) -> Vec<Span> {
        let mut sentences: Vec<Span> = Vec::new();

        for (offset, raw) in text.split_sentence_bound_indices() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let start = offset + (raw.len() - raw.trim_start().len());
            let span = Span::new(start, start + trimmed.len());

            match sentences.last_mut() {
                Some(previous)
                    if self.continues_into(&text[previous.start..previous.end], trimmed) =>
                {
                    previous.end = span.end;
                }
                _ => sentences.push(span),
            }
        }

        sentences
    }

    fn entities(&self, text: &str) -> Vec<Entity> {
        self.money
            .find_iter(text)
            .map(|found| Entity {
                label: EntityLabel::Money,
                span: Span::new(found.start(), found.end()),
            })
            .collect()
    }
}

impl LinguisticProcessor for RuleBasedProcessor {
    fn annotate<'t>(&self, text: &'t str) -> Annotations<'t> {
        Annotations {
            text,
            tokens: self.tokens(text),
            sentences: self.sentences(text),
            entities: self.entities(text),
        }
    }
}
