//! Stateful section assembly.
//!
//! Consumes classified lines strictly in index order and produces the final
//! [`AssembledRecipe`]: mode switching on headers, subsection tracking,
//! metadata capture, wrapped-line merging, numbered-step splitting, title
//! selection, and the implicit sauce-section inference. The assembler never
//! errors; emptiness is judged by the caller.

use crate::classify::{self, LineClassifier, MetadataLine};
use crate::model::{AssembledRecipe, CookStep, Ingredient, LineLabel, RawLine, SectionItems};
use crate::quantity;
use crate::textutil;
use crate::timer;
use log::debug;

const DEFAULT_TITLE: &str = "Untitled Recipe";
const DEFAULT_YIELDS: &str = "4 servings";

/// Metadata recovered ahead of assembly (by the document extractor or a
/// platform adapter). Anything present wins over what the line scan finds.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub yields: Option<String>,
    pub total_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Unknown,
    Ingredients,
    Steps,
    Notes,
}

#[derive(Debug)]
struct Entry {
    text: String,
    section: Option<String>,
    numbered: bool,
}

const TIPS_MARKERS: &[&str] = &["tips and variations", "tips & variations"];

/// Words that glue a wrapped continuation line onto its predecessor.
const CONTINUATION_STARTERS: &[&str] = &["and", "or", "plus", "with", "such", "as"];

/// Trailing words that leave the predecessor dangling.
const DANGLING_ENDINGS: &[&str] = &["and", "or", "with", "of", "plus", "for"];

/// Assemble classified lines into a recipe. Pure: same lines and overrides,
/// same recipe (row ids aside).
pub fn assemble(
    lines: &[RawLine],
    overrides: Overrides,
    classifier: &LineClassifier,
) -> AssembledRecipe {
    let mut mode = Mode::Unknown;
    let mut ingredient_section: Option<String> = None;
    let mut step_section: Option<String> = None;

    let mut ingredient_entries: Vec<Entry> = Vec::new();
    let mut step_entries: Vec<Entry> = Vec::new();
    let mut note_lines: Vec<String> = Vec::new();

    let mut title: Option<String> = overrides.title.clone();
    let mut yields: Option<String> = None;
    let mut prep_minutes: Option<u32> = None;
    let mut cook_minutes: Option<u32> = None;
    let mut total_minutes: Option<u32> = None;

    for line in lines {
        let cleaned = textutil::clean_line(&line.text);
        if cleaned.is_empty() {
            continue;
        }

        // metadata is captured and never emitted as content, whatever the
        // current mode
        if let Some(metadata) = classify::metadata_line(&cleaned) {
            debug!("metadata at line {}: {:?}", line.index, metadata);
            match metadata {
                MetadataLine::Serving(serving) => yields = yields.or(Some(serving)),
                MetadataLine::PrepMinutes(m) => prep_minutes = prep_minutes.or(Some(m)),
                MetadataLine::CookMinutes(m) => cook_minutes = cook_minutes.or(Some(m)),
                MetadataLine::TotalMinutes(m) => total_minutes = total_minutes.or(Some(m)),
            }
            continue;
        }

        let label = classifier.classify(&cleaned).label;
        if label == LineLabel::Junk {
            continue;
        }

        // inline "tips and variations" marker, with or without trailing text
        if let Some(remainder) = strip_tips_marker(&cleaned) {
            mode = Mode::Notes;
            if !remainder.is_empty() {
                note_lines.push(remainder.to_string());
            }
            continue;
        }

        if label == LineLabel::Header {
            if classify::is_ingredient_header(&cleaned) {
                debug!("ingredient header at line {}", line.index);
                mode = Mode::Ingredients;
                ingredient_section = None;
                continue;
            }
            if classify::is_step_header(&cleaned) {
                debug!("step header at line {}", line.index);
                mode = Mode::Steps;
                step_section = None;
                continue;
            }
            if classify::is_notes_header(&cleaned) {
                mode = Mode::Notes;
                continue;
            }
            // a hinted Header that matches no top-level lexicon falls
            // through to the subsection check below
        }

        if is_subsection_header(&cleaned) {
            let name = subsection_name(&cleaned);
            match mode {
                Mode::Notes => note_lines.push(cleaned.clone()),
                Mode::Steps => step_section = Some(name),
                Mode::Ingredients => ingredient_section = Some(name),
                Mode::Unknown => {
                    mode = Mode::Ingredients;
                    ingredient_section = Some(name);
                }
            }
            continue;
        }

        // in Notes, content-labelled lines are re-examined before the
        // regular dispatch
        if mode == Mode::Notes {
            if let Some(pieces) = split_numbered_steps(&cleaned) {
                mode = Mode::Steps;
                for piece in pieces {
                    step_entries.push(Entry {
                        text: piece,
                        section: step_section.clone(),
                        numbered: true,
                    });
                }
                continue;
            }
            let escapes_to_ingredients = label == LineLabel::Ingredient
                && quantity::extract_quantity_and_unit(&cleaned).is_some();
            if !escapes_to_ingredients {
                note_lines.push(cleaned);
                continue;
            }
        }

        match label {
            LineLabel::Ingredient => {
                // a headerless instruction mislabelled as ingredient flips
                // the mode
                if classify::is_instruction_like(&cleaned)
                    || split_numbered_steps(&cleaned).is_some()
                {
                    mode = Mode::Steps;
                    push_step_text(&mut step_entries, &cleaned, &step_section);
                    continue;
                }
                if mode == Mode::Steps && !is_really_ingredient(&cleaned) {
                    push_step_text(&mut step_entries, &cleaned, &step_section);
                    continue;
                }
                mode = Mode::Ingredients;
                ingredient_entries.push(Entry {
                    text: cleaned,
                    section: ingredient_section.clone(),
                    numbered: false,
                });
            }
            LineLabel::Step => {
                mode = Mode::Steps;
                push_step_text(&mut step_entries, &cleaned, &step_section);
            }
            LineLabel::Title => {
                if mode == Mode::Ingredients {
                    // a name-only line mid-list ("Fresh basil", "For the
                    // sauce") belongs to the ingredient list
                    ingredient_entries.push(Entry {
                        text: cleaned,
                        section: ingredient_section.clone(),
                        numbered: false,
                    });
                } else if title.is_none() && classify::is_plausible_title(&cleaned) {
                    title = Some(cleaned);
                } else {
                    note_lines.push(cleaned);
                }
            }
            LineLabel::Note => {
                // inside a content block, prose without an explicit note
                // prefix belongs to that block
                if classify::has_note_prefix(&cleaned) {
                    note_lines.push(cleaned);
                } else if mode == Mode::Steps {
                    push_step_text(&mut step_entries, &cleaned, &step_section);
                } else if mode == Mode::Ingredients {
                    ingredient_entries.push(Entry {
                        text: cleaned,
                        section: ingredient_section.clone(),
                        numbered: false,
                    });
                } else {
                    note_lines.push(cleaned);
                }
            }
            LineLabel::Header | LineLabel::Junk => {}
        }
    }

    // title fallback: first plausible line anywhere, then a promoted note
    if title.is_none() {
        title = lines
            .iter()
            .map(|l| textutil::clean_line(&l.text))
            .find(|t| classify::is_plausible_title(t));
    }
    if title.is_none() {
        if let Some(pos) = note_lines
            .iter()
            .position(|n| classify::is_plausible_title(n))
        {
            title = Some(note_lines.remove(pos));
        }
    }

    let ingredient_entries = merge_wrapped_ingredients(ingredient_entries);
    let ingredient_entries = infer_marker_sections(ingredient_entries, &step_entries);

    let ingredients: Vec<Ingredient> = ingredient_entries
        .iter()
        .filter_map(|e| quantity::parse_ingredient_line(&e.text, e.section.as_deref()))
        .collect();

    let step_entries = merge_step_continuations(step_entries);
    let steps: Vec<CookStep> = step_entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| CookStep {
            timers: timer::extract_timers(&entry.text),
            section: entry.section,
            ..CookStep::new(index, entry.text)
        })
        .collect();

    let total_minutes = overrides
        .total_minutes
        .or(total_minutes)
        .or_else(|| match (prep_minutes, cook_minutes) {
            (None, None) => None,
            (p, c) => Some(p.unwrap_or(0) + c.unwrap_or(0)),
        })
        .filter(|m| *m > 0);

    let ingredient_sections = group_sections(
        ingredients
            .iter()
            .map(|i| (i.section.as_deref(), i.name.clone())),
    );
    let step_sections = group_sections(
        steps
            .iter()
            .map(|s| (s.section.as_deref(), s.text.clone())),
    );

    let notes = if note_lines.is_empty() {
        None
    } else {
        Some(note_lines.join("\n"))
    };

    AssembledRecipe {
        title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        source_url: overrides.source_url,
        source_title: overrides.source_title,
        yields: overrides
            .yields
            .or(yields)
            .unwrap_or_else(|| DEFAULT_YIELDS.to_string()),
        total_minutes,
        ingredients,
        steps,
        note_lines,
        notes,
        ingredient_sections,
        step_sections,
        image_url: overrides.image_url,
        tags: overrides.tags,
    }
}

fn push_step_text(entries: &mut Vec<Entry>, cleaned: &str, section: &Option<String>) {
    match split_numbered_steps(cleaned) {
        Some(pieces) => {
            for piece in pieces {
                entries.push(Entry {
                    text: piece,
                    section: section.clone(),
                    numbered: true,
                });
            }
        }
        None => {
            let numbered = classify::has_step_number(cleaned);
            entries.push(Entry {
                text: strip_step_number(cleaned).to_string(),
                section: section.clone(),
                numbered,
            });
        }
    }
}

fn strip_tips_marker(cleaned: &str) -> Option<&str> {
    let lower = cleaned.to_lowercase();
    for marker in TIPS_MARKERS {
        if lower.starts_with(marker) {
            let rest = &cleaned[marker.len()..];
            return Some(rest.trim_start_matches([':', '-', ' ']).trim());
        }
    }
    None
}

/// Short colon-terminated line introducing a subsection; top-level headers
/// are handled before this check.
fn is_subsection_header(cleaned: &str) -> bool {
    cleaned.ends_with(':')
        && cleaned.len() <= 90
        && cleaned.split_whitespace().count() <= 7
        && !cleaned.chars().any(|c| c.is_ascii_digit())
        && !classify::is_ingredient_header(cleaned)
        && !classify::is_step_header(cleaned)
        && !classify::is_notes_header(cleaned)
}

fn subsection_name(cleaned: &str) -> String {
    cleaned.trim_end_matches(':').trim().to_string()
}

/// Split "1. Preheat. 2. Mix." style lines at each numbered boundary.
/// Requires at least two boundaries with the first at offset 0.
pub(crate) fn split_numbered_steps(text: &str) -> Option<Vec<String>> {
    let bytes = text.as_bytes();
    let mut boundaries: Vec<(usize, usize)> = Vec::new(); // (start, content offset)
    let mut i = 0;
    while i < bytes.len() {
        let at_start = i == 0;
        let after_separator = i > 0
            && bytes[i - 1].is_ascii_whitespace()
            && !bytes[..i]
                .iter()
                .rev()
                .skip_while(|b| b.is_ascii_whitespace())
                .next()
                .map_or(false, |b| b.is_ascii_digit());
        if (at_start || after_separator) && bytes[i].is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() && j - i < 2 {
                j += 1;
            }
            if j < bytes.len() && (bytes[j] == b'.' || bytes[j] == b')') {
                let mut k = j + 1;
                if k < bytes.len() && bytes[k].is_ascii_whitespace() {
                    while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                        k += 1;
                    }
                    boundaries.push((i, k));
                    i = k;
                    continue;
                }
            }
        }
        i += 1;
    }

    if boundaries.len() < 2 || boundaries[0].0 != 0 {
        return None;
    }

    let mut pieces = Vec::with_capacity(boundaries.len());
    for (n, &(_, content)) in boundaries.iter().enumerate() {
        let end = boundaries
            .get(n + 1)
            .map(|&(start, _)| start)
            .unwrap_or(text.len());
        let piece = text[content..end].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
    }
    Some(pieces)
}

fn strip_step_number(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() && i < 2 {
        i += 1;
    }
    if i > 0 && i < bytes.len() && (bytes[i] == b'.' || bytes[i] == b')') {
        let rest = text[i + 1..].trim_start();
        if !rest.is_empty() {
            return rest;
        }
    }
    text
}

/// Secondary check for ingredient-looking lines seen while in step mode:
/// quantity with a real unit, or a short noun phrase, and never a duration.
fn is_really_ingredient(cleaned: &str) -> bool {
    let Some((parsed, rest)) = quantity::extract_quantity_and_unit(cleaned) else {
        return false;
    };
    let first_rest = rest
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();
    if matches!(
        first_rest.as_str(),
        "minute" | "minutes" | "min" | "mins" | "hour" | "hours" | "hr" | "hrs" | "second"
            | "seconds" | "sec" | "secs"
    ) {
        return false;
    }
    if classify::is_instruction_like(&rest) {
        return false;
    }
    parsed.unit != crate::model::UnitKind::Whole || rest.split_whitespace().count() <= 4
}

/// Merge wrapped ingredient continuations into their predecessor.
fn merge_wrapped_ingredients(entries: Vec<Entry>) -> Vec<Entry> {
    let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let continues = quantity::extract_quantity_and_unit(&entry.text).is_none()
            && merged.last().map_or(false, |prev: &Entry| {
                prev.section == entry.section
                    && (ends_dangling(&prev.text) || starts_with_continuation(&entry.text))
            });
        if continues {
            let prev = merged.last_mut().expect("checked non-empty");
            prev.text.push(' ');
            prev.text.push_str(&entry.text);
        } else {
            merged.push(entry);
        }
    }
    merged
}

fn ends_dangling(text: &str) -> bool {
    let trimmed = text.trim_end();
    if trimmed.ends_with([',', '-', '(']) {
        return true;
    }
    let last = trimmed
        .rsplit(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default()
        .to_lowercase();
    DANGLING_ENDINGS.contains(&last.as_str())
}

fn starts_with_continuation(text: &str) -> bool {
    let first = text
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| !c.is_alphabetic())
        .to_lowercase();
    CONTINUATION_STARTERS.contains(&first.as_str())
}

/// Merge step continuations: an unnumbered line starting lowercase or with
/// a connective, after a predecessor left dangling, joins that predecessor.
fn merge_step_continuations(entries: Vec<Entry>) -> Vec<Entry> {
    let mut merged: Vec<Entry> = Vec::with_capacity(entries.len());
    for entry in entries {
        let starts_soft = entry
            .text
            .chars()
            .next()
            .map_or(false, |c| c.is_lowercase())
            || starts_with_continuation(&entry.text);
        let continues = !entry.numbered
            && starts_soft
            && merged.last().map_or(false, |prev: &Entry| {
                prev.section == entry.section && !ends_terminal(&prev.text)
            });
        if continues {
            let prev = merged.last_mut().expect("checked non-empty");
            prev.text.push(' ');
            prev.text.push_str(&entry.text);
        } else {
            merged.push(entry);
        }
    }
    merged
}

fn ends_terminal(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?', ':'])
}

/// Implicit section split: a colonless marker line ("For the sauce") inside
/// a long unsectioned list partitions everything after it, when the steps
/// actually talk about a sauce and both halves keep at least two items.
fn infer_marker_sections(entries: Vec<Entry>, step_entries: &[Entry]) -> Vec<Entry> {
    if entries.len() < 6 || entries.iter().any(|e| e.section.is_some()) {
        return entries;
    }
    let steps_mention_sauce = step_entries
        .iter()
        .any(|s| word_in_text(&s.text.to_lowercase(), "sauce"));
    if !steps_mention_sauce {
        return entries;
    }

    let marker = entries.iter().position(|e| {
        let lower = e.text.to_lowercase();
        lower == "for the sauce" || lower == "sauce" || lower == "for serving"
            || lower == "to serve"
    });
    let Some(pos) = marker else {
        return entries;
    };
    if pos < 2 || entries.len() - pos - 1 < 2 {
        return entries;
    }

    let lower = entries[pos].text.to_lowercase();
    let section = if lower.contains("serv") {
        "For Serving"
    } else {
        "Sauce"
    };
    debug!("inferred '{}' section at entry {}", section, pos);

    entries
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != pos)
        .map(|(i, mut entry)| {
            if i > pos {
                entry.section = Some(section.to_string());
            }
            entry
        })
        .collect()
}

fn word_in_text(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphabetic())
        .any(|t| t == word)
}

/// Group item names by section, first-seen order, default group first when
/// present.
fn group_sections<'a>(
    items: impl Iterator<Item = (Option<&'a str>, String)>,
) -> Vec<SectionItems> {
    let mut sections: Vec<SectionItems> = Vec::new();
    for (section, item) in items {
        let name = section.map(str::to_string);
        match sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.items.push(item),
            None => sections.push(SectionItems {
                name,
                items: vec![item],
            }),
        }
    }
    sections
}
