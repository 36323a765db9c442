use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

/// Decode HTML entities. Decoding twice survives double-escaped sources
/// (`&amp;amp;` and friends show up in real scraper output).
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(&decode_html_entities(text)).into_owned()
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(?:br|/p|/div|/li|/h[1-6])\s*/?\s*>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\r\u{00a0}]+").unwrap());

/// Strip markup tags from a fragment, keeping block/line breaks as newlines.
pub fn strip_tags(html: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(html, "\n");
    TAG_RE.replace_all(&with_breaks, "").into_owned()
}

/// Collapse runs of horizontal whitespace and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WS_RE.replace_all(text, " ").trim().to_string()
}

// List markers seen in scraped and pasted ingredient lists: dashes,
// asterisks, interpuncts, and the checkbox glyphs recipe plugins render.
const LINE_MARKERS: &[char] = &[
    '-', '*', '•', '◦', '·', '▢', '□', '☐', '✓', '✔', '‣', '–', '—',
];

/// Strip leading list markers and stray punctuation from a line.
pub fn strip_line_markers(text: &str) -> &str {
    let mut rest = text.trim_start();
    loop {
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) if LINE_MARKERS.contains(&c) => {
                rest = chars.as_str().trim_start();
            }
            _ => break,
        }
    }
    rest
}

/// Full per-line cleanup: entity decode, marker strip, whitespace collapse.
pub fn clean_line(text: &str) -> String {
    let decoded = decode_entities(text);
    collapse_whitespace(strip_line_markers(&decoded))
}

/// Number of whitespace-separated tokens containing at least one letter.
pub fn alphabetic_token_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|t| t.chars().any(|c| c.is_alphabetic()))
        .count()
}

/// Count of alphabetic characters in the line.
pub fn alphabetic_char_count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Lowercased text with leading/trailing non-word characters and a trailing
/// colon removed. Used for header-lexicon matching.
pub fn normalize_header(text: &str) -> String {
    let trimmed = text
        .trim_matches(|c: char| !c.is_alphanumeric())
        .trim_end_matches(':');
    collapse_whitespace(trimmed).to_lowercase()
}
