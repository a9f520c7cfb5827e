//! Weighted signal rules and the matcher that applies them.
//!
//! Rules are plain data: each [`PatternRule`] pairs an identifier and a weight
//! with a case-insensitive regular expression. The matcher iterates the table
//! in declaration order and collects every occurrence, so adding or tuning a
//! signal never touches the scoring code.
//!
//! - **Strong** signals explicitly describe a hidden reward
//!   ("if you've read this far", "email us at ... to claim your prize")
//! - **Medium** signals are suggestive but also appear in ordinary contests
//! - **Weak** signals are context dependent with a high false-positive rate
//!
//! [`NegativeRule`]s recognize standard sweepstakes boilerplate and subtract
//! from the score instead.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Strength class of a positive signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Strong,
    Medium,
    Weak,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Strong => "strong",
            Category::Medium => "medium",
            Category::Weak => "weak",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A positive signal contributing its weight to the base score.
pub struct PatternRule {
    /// Unique rule identifier (e.g. `read_this_far`)
    pub id: &'static str,
    pub category: Category,
    /// Contribution in (0, 1]
    pub weight: f64,
    regex: Regex,
}

impl PatternRule {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternRule({}, {}, {})", self.id, self.category, self.weight)
    }
}

/// A signal of standard contest boilerplate; its penalty is negative.
pub struct NegativeRule {
    pub id: &'static str,
    pub penalty: f64,
    regex: Regex,
}

impl NegativeRule {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl fmt::Debug for NegativeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NegativeRule({}, {})", self.id, self.penalty)
    }
}

/// One occurrence of a positive rule in a text.
///
/// `start` and `end` are byte offsets into the analyzed text and always fall
/// on `char` boundaries, so `&text[m.start..m.end] == m.matched_text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternMatch {
    pub rule_id: &'static str,
    pub category: Category,
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
    pub weight: f64,
}

// (id, category, pattern, weight)
const RULE_TABLE: &[(&str, Category, &str, f64)] = &[
    (
        "read_this_far",
        Category::Strong,
        r"(?i)if\s+you['\u{2019}]?ve?\s+read\s+this\s+far",
        0.8,
    ),
    (
        "first_person_to",
        Category::Strong,
        r"(?i)first\s+person\s+to\s+(read|find|notice|discover|email|contact|call|respond)",
        0.7,
    ),
    (
        "hidden_reward",
        Category::Strong,
        r"(?i)hidden\s+(prize|reward|contest|message|bonus|easter\s+egg|offer)",
        0.7,
    ),
    (
        "congratulations_found",
        Category::Strong,
        r"(?i)congratulations.*?you\s+(found|discovered|are\s+one\s+of|actually\s+read)",
        0.8,
    ),
    (
        "claim_instruction",
        Category::Strong,
        r"(?i)(email|call|contact|write)\s+(us|to)\s+.{0,80}(to\s+)?(claim|win|receive|collect|get)\s+.{0,30}(prize|reward|gift|bonus|money|card)",
        0.7,
    ),
    (
        "email_to_win",
        Category::Strong,
        r"(?i)email\s+us\s+at\s+\S+@\S+.{0,100}(prize|reward|win|gift|bonus)",
        0.8,
    ),
    (
        "dollar_prize",
        Category::Strong,
        r"(?i)\$\s?\d{1,3}(?:,\d{3})*(?:\.\d{2})?\s*(prize|reward|gift\s*card|bonus|cash\s*prize)",
        0.7,
    ),
    (
        "few_who_read",
        Category::Strong,
        r"(?i)(one\s+of\s+the\s+(very\s+)?few|rare\s+person|actually\s+read(s|ing)?)\s+.{0,50}(terms|policy|agreement|contract|fine\s+print|document)",
        0.8,
    ),
    (
        "contest_words",
        Category::Medium,
        r"(?i)\b(sweepstakes|giveaway|raffle|drawing|jackpot)\b",
        0.3,
    ),
    (
        "winner_language",
        Category::Medium,
        r"(?i)(you\s+(could\s+)?win|winner\s+will\s+(be\s+)?(selected|chosen|notified)|eligible\s+to\s+win|chance\s+to\s+win)",
        0.3,
    ),
    (
        "reward_mention",
        Category::Medium,
        r"(?i)\b(prize|reward|bonus|gift\s*card|free\s+(product|service|subscription|item))\b",
        0.2,
    ),
    (
        "easter_egg_mention",
        Category::Weak,
        r"(?i)\b(easter\s+egg|secret\s+message|buried\s+in)\b",
        0.1,
    ),
    (
        "urgency_scarcity",
        Category::Weak,
        r"(?i)(limited\s+(time|offer)|act\s+(now|fast|quickly)|first\s+\d+\s+(people|readers|customers))",
        0.1,
    ),
];

// (id, pattern, penalty)
const NEGATIVE_TABLE: &[(&str, &str, f64)] = &[
    (
        "official_rules",
        r"(?i)(official\s+rules|no\s+purchase\s+necessary|void\s+where\s+prohibited)",
        -0.4,
    ),
    (
        "sweepstakes_terms",
        r"(?i)(sweepstakes\s+(rules|terms|conditions)|contest\s+rules|odds\s+of\s+winning|eligibility\s+requirements)",
        -0.3,
    ),
    (
        "legal_boilerplate",
        r"(?i)(this\s+promotion\s+is\s+sponsored\s+by|by\s+entering.*?you\s+agree\s+to|open\s+to\s+(legal\s+)?residents)",
        -0.3,
    ),
];

// The tables above are literals covered by `all_rules_compile`.
static PATTERN_RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(id, category, pattern, weight)| PatternRule {
            id,
            category,
            weight,
            regex: Regex::new(pattern).expect("static pattern rule compiles"),
        })
        .collect()
});

static NEGATIVE_RULES: Lazy<Vec<NegativeRule>> = Lazy::new(|| {
    NEGATIVE_TABLE
        .iter()
        .map(|&(id, pattern, penalty)| NegativeRule {
            id,
            penalty,
            regex: Regex::new(pattern).expect("static negative rule compiles"),
        })
        .collect()
});

/// The process-wide rule set and its matching functions.
#[derive(Debug, Clone, Copy)]
pub struct PatternLibrary {
    rules: &'static [PatternRule],
    negative_rules: &'static [NegativeRule],
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternLibrary {
    /// The built-in rule tables, compiled on first use.
    pub fn standard() -> Self {
        Self {
            rules: Lazy::force(&PATTERN_RULES).as_slice(),
            negative_rules: Lazy::force(&NEGATIVE_RULES).as_slice(),
        }
    }

    pub fn rules(&self) -> &'static [PatternRule] {
        self.rules
    }

    pub fn negative_rules(&self) -> &'static [NegativeRule] {
        self.negative_rules
    }

    /// Look up a positive rule by identifier.
    pub fn rule(&self, id: &str) -> Option<&'static PatternRule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    /// Every non-overlapping occurrence of every positive rule.
    ///
    /// Results are grouped by rule in declaration order, then by position.
    /// Occurrences of different rules may overlap; none are suppressed.
    pub fn find_all_matches(&self, text: &str) -> Vec<PatternMatch> {
        let mut matches = Vec::new();

        for rule in self.rules {
            for found in rule.regex.find_iter(text) {
                matches.push(PatternMatch {
                    rule_id: rule.id,
                    category: rule.category,
                    matched_text: found.as_str().to_string(),
                    start: found.start(),
                    end: found.end(),
                    weight: rule.weight,
                });
            }
        }

        matches
    }

    /// `(id, penalty)` for each negative rule present anywhere in `text`.
    pub fn find_negative_matches(&self, text: &str) -> Vec<(&'static str, f64)> {
        self.negative_rules
            .iter()
            .filter(|rule| rule.regex.is_match(text))
            .map(|rule| (rule.id, rule.penalty))
            .collect()
    }
}

/// [`PatternLibrary::find_all_matches`] over the standard rules.
pub fn find_all_matches(text: &str) -> Vec<PatternMatch> {
    PatternLibrary::standard().find_all_matches(text)
}

/// [`PatternLibrary::find_negative_matches`] over the standard rules.
pub fn find_negative_matches(text: &str) -> Vec<(&'static str, f64)> {
    PatternLibrary::standard().find_negative_matches(text)
}
