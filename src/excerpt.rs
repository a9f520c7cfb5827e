//! Human-readable excerpts around a match.

/// Characters kept on each side of a match by default.
pub const DEFAULT_CONTEXT_WINDOW: usize = 300;

/// How far into a left-truncated excerpt we look for a sentence start.
const SENTENCE_SEARCH_CHARS: usize = 100;

/// Extract up to `window` characters on each side of the byte range
/// `start..end`, trimmed of surrounding whitespace.
///
/// When the excerpt is cut on the left, it is advanced past the first ". "
/// found within its first 100 characters so it begins on a sentence. The
/// right edge is left as is. Offsets that fall inside a character are widened
/// to include that character.
///
/// ```
/// use fineprint::extract_context;
///
/// let text = format!("{}HIDDEN PRIZE HERE{}", "A".repeat(500), "B".repeat(500));
/// let context = extract_context(&text, 500, 517, 50);
/// assert!(context.contains("HIDDEN PRIZE HERE"));
/// assert_eq!(context.len(), 117);
/// ```
pub fn extract_context(text: &str, start: usize, end: usize, window: usize) -> String {
    let mut start = start.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = end.clamp(start, text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }

    let ctx_start = text[..start]
        .char_indices()
        .rev()
        .take(window)
        .last()
        .map_or(start, |(idx, _)| idx);
    let ctx_end = text[end..]
        .char_indices()
        .nth(window)
        .map_or(text.len(), |(idx, _)| end + idx);

    let context = text[ctx_start..ctx_end].trim();

    if ctx_start > 0 {
        if let Some(period) = context.find(". ") {
            if period > 0 && context[..period].chars().count() < SENTENCE_SEARCH_CHARS {
                return context[period + 2..].to_string();
            }
        }
    }

    context.to_string()
}
