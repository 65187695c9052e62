//! Formatting helpers shared by the preview, the editor and the exporters.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Format a score with exactly one decimal place ("8.9", "9.0").
pub fn format_score(score: f32) -> String {
    format!("{:.1}", score)
}

/// Clamp a number between `min` and `max`. NaN collapses to `min`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Initials for the avatar placeholder.
///
/// One word yields its first letter, several words yield the first letters
/// of the first and last word. Blank input yields `"?"`.
pub fn initials(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let first_letter = |word: &str| word.chars().next();

    let letters: Vec<char> = match words.as_slice() {
        [] => return "?".to_string(),
        [only] => first_letter(only).into_iter().collect(),
        [first, .., last] => first_letter(first)
            .into_iter()
            .chain(first_letter(last))
            .collect(),
    };

    if letters.is_empty() {
        return "?".to_string();
    }
    letters.into_iter().flat_map(char::to_uppercase).collect()
}

/// Truncate to `max_len` graphemes, ending with "..." when shortened.
pub fn truncate(text: &str, max_len: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max_len {
        return text.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = graphemes[..keep].concat();
    out.push_str("...");
    out
}

/// Truncate to a terminal display width, ending with "…" when shortened.
pub fn fit_width(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = grapheme.width();
        if used + w > width - 1 {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}
