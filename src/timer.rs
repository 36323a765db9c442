//! Duration extraction from step text.
//!
//! Every minute/hour/second mention is collected in text order; the label
//! is inferred from the surrounding words against an ordered keyword table,
//! defaulting to "Cook".

use crate::model::TimerSpec;
use once_cell::sync::Lazy;
use regex::Regex;

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(minutes?|mins?|hours?|hrs?|seconds?|secs?)\b").unwrap());

/// Ordered keyword table for label inference. Earlier rows win.
const TIMER_LABELS: &[(&str, &str)] = &[
    ("rest", "Rest"),
    ("chill", "Chill"),
    ("refrigerate", "Chill"),
    ("cool", "Chill"),
    ("rise", "Rise"),
    ("proof", "Rise"),
    ("ferment", "Rise"),
    ("marinate", "Marinate"),
    ("simmer", "Simmer"),
    ("boil", "Boil"),
    ("bake", "Bake"),
    ("roast", "Roast"),
    ("fry", "Fry"),
    ("sauté", "Fry"),
    ("saute", "Fry"),
    ("grill", "Grill"),
    ("steam", "Steam"),
    ("soak", "Soak"),
    ("freeze", "Freeze"),
    ("thaw", "Thaw"),
    ("wait", "Wait"),
    ("let sit", "Wait"),
    ("stand", "Wait"),
    ("set", "Set"),
    ("brown", "Brown"),
    ("toast", "Toast"),
    ("blend", "Blend"),
    ("knead", "Knead"),
];

const DEFAULT_LABEL: &str = "Cook";

// Context windows inspected around a duration mention.
const BEFORE_WINDOW: usize = 50;
const AFTER_WINDOW: usize = 20;

/// Find every duration reference in step text, in text order.
pub fn extract_timers(text: &str) -> Vec<TimerSpec> {
    let mut found: Vec<(usize, usize, u32)> = Vec::new();
    for caps in DURATION_RE.captures_iter(text) {
        let whole = caps.get(0).expect("match group 0");
        let Ok(amount) = caps[1].parse::<u32>() else {
            continue;
        };
        let unit = caps[2].to_lowercase();
        let seconds = match unit.chars().next() {
            Some('h') => amount.saturating_mul(3600),
            Some('m') => amount.saturating_mul(60),
            _ => amount,
        };
        found.push((whole.start(), whole.end(), seconds));
    }
    // captures_iter already yields matches in offset order
    let total = found.len();

    found
        .iter()
        .enumerate()
        .map(|(i, &(start, end, seconds))| {
            let before = before_context(text, start);
            let after = after_context(text, end);
            let label = find_label_before(before)
                .or_else(|| find_label_after(after))
                .unwrap_or_else(|| trailing_default(before, i, total));
            TimerSpec::new(seconds, label)
        })
        .collect()
}

fn before_context(text: &str, start: usize) -> &str {
    let mut from = start.saturating_sub(BEFORE_WINDOW);
    while !text.is_char_boundary(from) {
        from -= 1;
    }
    &text[from..start]
}

fn after_context(text: &str, end: usize) -> &str {
    let mut to = (end + AFTER_WINDOW).min(text.len());
    while !text.is_char_boundary(to) {
        to += 1;
    }
    &text[end..to]
}

/// Label from the words preceding the timer. When several keywords sit in
/// the window the one nearest the timer wins; table order breaks ties.
fn find_label_before(context: &str) -> Option<&'static str> {
    let lower = context.to_lowercase();
    let mut best: Option<(usize, &'static str)> = None;
    for &(keyword, label) in TIMER_LABELS {
        if let Some(pos) = word_positions(&lower, keyword).last().copied() {
            if best.map_or(true, |(best_pos, _)| pos > best_pos) {
                best = Some((pos, label));
            }
        }
    }
    best.map(|(_, label)| label)
}

/// Label from the words following the timer; the nearest keyword wins.
fn find_label_after(context: &str) -> Option<&'static str> {
    let lower = context.to_lowercase();
    let mut best: Option<(usize, &'static str)> = None;
    for &(keyword, label) in TIMER_LABELS {
        if let Some(pos) = word_positions(&lower, keyword).first().copied() {
            if best.map_or(true, |(best_pos, _)| pos < best_pos) {
                best = Some((pos, label));
            }
        }
    }
    best.map(|(_, label)| label)
}

/// Byte offsets of whole-word occurrences; `keyword` may be a multi-word
/// phrase.
fn word_positions(haystack: &str, keyword: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut search = haystack;
    let mut offset = 0;
    while let Some(pos) = search.find(keyword) {
        let abs = offset + pos;
        let before_ok = haystack[..abs]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphabetic());
        let after_ok = haystack[abs + keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphabetic());
        if before_ok && after_ok {
            positions.push(abs);
        }
        let step = pos + keyword.len();
        offset += step;
        search = &search[step..];
    }
    positions
}

fn contains_word(haystack: &str, keyword: &str) -> bool {
    !word_positions(haystack, keyword).is_empty()
}

/// With no keyword in range, the last of several timers following a
/// sequencing word reads as a resting period.
fn trailing_default(before: &str, index: usize, total: usize) -> &'static str {
    if total >= 2 && index == total - 1 {
        let lower = before.to_lowercase();
        if contains_word(&lower, "then") || contains_word(&lower, "after") {
            return "Rest";
        }
    }
    DEFAULT_LABEL
}
