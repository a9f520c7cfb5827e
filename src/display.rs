//! Terminal rendering of matches under the text they cover.
//!
//! ```text
//! A hidden prize awaits.
//!   ╰──────────╯hidden_reward(0.7)
//!          ╰───╯reward_mention(0.2)
//! ```

use std::fmt::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::detector::DetectionResult;
use crate::pattern::PatternMatch;

/// One line of text with a row per included match.
///
/// Line breaks and tabs in the text are shown as spaces so underline columns
/// stay aligned.
pub struct MatchDisplay<'a> {
    text: &'a str,
    matches: Vec<&'a PatternMatch>,
}

impl<'a> MatchDisplay<'a> {
    pub fn new(text: &'a str) -> Self {
        MatchDisplay {
            text,
            matches: Vec::new(),
        }
    }

    /// Text of a detection with all of its matches; `text` must be the
    /// document the detection was computed from.
    pub fn for_detection(text: &'a str, result: &'a DetectionResult) -> Self {
        Self::new(text).with_matches(&result.matches)
    }

    /// Include a match; ignored when its span does not lie within the text.
    pub fn include(&mut self, found: &'a PatternMatch) {
        if found.start <= found.end && self.text.get(found.start..found.end).is_some() {
            self.matches.push(found);
        }
    }

    /// Takes self
    pub fn with_matches(mut self, matches: impl IntoIterator<Item = &'a PatternMatch>) -> Self {
        for found in matches {
            self.include(found);
        }
        self
    }

    /// Display column of `offset`, counting substituted whitespace as one.
    fn column(&self, offset: usize) -> usize {
        self.text[..offset].chars().map(display_width).sum()
    }
}

fn displayed(c: char) -> char {
    match c {
        '\n' | '\r' | '\t' => ' ',
        _ => c,
    }
}

fn display_width(c: char) -> usize {
    UnicodeWidthChar::width(displayed(c)).unwrap_or(0)
}

impl<'a> fmt::Display for MatchDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.text.chars() {
            f.write_char(displayed(c))?;
        }

        for found in &self.matches {
            f.write_char('\n')?;

            let start_col = self.column(found.start);
            let end_col = self.column(found.end);
            for _ in 0..start_col {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col - start_col > 1 {
                f.write_char('╯')?;
            }

            write!(f, "{}({})", found.rule_id, found.weight)?;
        }

        Ok(())
    }
}
