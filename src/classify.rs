//! Line classification.
//!
//! `classify` is pure and total: every input string gets exactly one
//! [`LineLabel`], worst case `Junk`. Rules are evaluated in fixed priority
//! order (Junk > Header > Ingredient > Step > Title > Note) over ordered
//! lexicon tables so each rule is testable on its own.

use crate::model::{LineClassification, LineLabel};
use crate::quantity;
use crate::textutil;
use crate::{duration, model::UnitKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Boilerplate lines that carry no recipe content. Matched whole against
/// the normalized line.
const JUNK_PHRASES: &[&str] = &[
    "ad",
    "ads",
    "advertisement",
    "advert",
    "sponsored",
    "sponsored content",
    "print recipe",
    "pin recipe",
    "print",
    "pin",
    "jump to recipe",
    "jump to video",
    "scroll to continue",
    "continue reading",
    "continue reading below",
    "read more",
    "watch the video",
    "save recipe",
    "save this recipe",
    "rate this recipe",
    "leave a comment",
    "leave a review",
    "share this recipe",
    "cook mode",
    "prevent your screen from going dark",
    "us customary",
    "metric",
    "scale",
    "follow me on instagram",
    "subscribe to my newsletter",
];

/// Tiny tokens allowed to stand alone as content lines.
const SHORT_TOKEN_ALLOW_LIST: &[&str] = &["oil", "egg", "eggs"];

const INGREDIENT_HEADERS: &[&str] = &[
    "ingredients",
    "ingredient",
    "ingredients list",
    "ingredient list",
    "for the ingredients",
    "what you need",
    "what you'll need",
    "what you will need",
    "you will need",
    "shopping list",
];

const STEP_HEADERS: &[&str] = &[
    "instructions",
    "instruction",
    "directions",
    "direction",
    "method",
    "steps",
    "preparation",
    "how to make",
    "how to make it",
    "to prepare",
    "to make",
];

const NOTES_HEADERS: &[&str] = &[
    "notes",
    "note",
    "tips",
    "tips and variations",
    "tips & variations",
    "tips and tricks",
    "variations",
    "recipe notes",
    "cook's notes",
    "chef's notes",
    "storage",
    "make ahead",
];

/// Cook-action lexicon. A line opening with one of these reads as an
/// instruction.
const INSTRUCTION_VERBS: &[&str] = &[
    "add", "arrange", "bake", "beat", "blanch", "blend", "boil", "bring", "brown", "brush",
    "caramelize", "chill", "chop", "combine", "cook", "cool", "cover", "crush", "cut", "dice",
    "divide", "drain", "drizzle", "fold", "freeze", "fry", "garnish", "grate", "grease",
    "grill", "heat", "knead", "let", "marinate", "melt", "mix", "place", "pour", "preheat",
    "reduce", "refrigerate", "remove", "repeat", "rest", "return", "rinse", "roast", "roll",
    "saute", "sauté", "sear", "season", "serve", "set", "simmer", "slice", "soak", "spread",
    "sprinkle", "steam", "stir", "strain", "toast", "top", "toss", "transfer", "whip",
    "whisk",
];

/// Connectives that may front an instruction ("Then stir", "In a bowl,
/// mix...").
const STEP_CONNECTIVES: &[&str] = &[
    "in", "then", "now", "next", "first", "finally", "meanwhile", "once", "when", "after",
];

const NOTE_PREFIXES: &[&str] = &[
    "note:", "notes:", "tip:", "tips:", "pro tip:", "variation:", "variations:", "nb:",
];

const NOTE_HINTS: &[&str] = &[
    "flavor",
    "flavour",
    "optional",
    "variation",
    "nutrition",
    "wine",
    "twist",
    "pairs well",
    "substitute",
    "leftovers",
    "store",
];

static STEP_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,3}[.)]\s+").unwrap());
static SERVING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:serves|servings?|yields?|makes)\s*[:\-]?\s*(\d+\s*[a-z\s]*)$").unwrap()
});
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(prep|cook|bake|roast|total)(?:ing)?\s*time\s*[:\-]?\s*(.+)$").unwrap()
});

/// A metadata line captured by the assembler rather than emitted as content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataLine {
    Serving(String),
    PrepMinutes(u32),
    CookMinutes(u32),
    TotalMinutes(u32),
}

/// Recognize serving-count and time metadata lines.
pub fn metadata_line(text: &str) -> Option<MetadataLine> {
    let cleaned = textutil::clean_line(text);
    if let Some(caps) = SERVING_RE.captures(&cleaned) {
        let serving = textutil::collapse_whitespace(&caps[1]);
        let serving = if serving.chars().any(|c| c.is_alphabetic()) {
            serving
        } else {
            format!("{serving} servings")
        };
        return Some(MetadataLine::Serving(serving));
    }
    if let Some(caps) = TIME_RE.captures(&cleaned) {
        let minutes = duration::human_minutes(&caps[2])?;
        let kind = caps[1].to_lowercase();
        return Some(match kind.as_str() {
            "prep" => MetadataLine::PrepMinutes(minutes),
            "total" => MetadataLine::TotalMinutes(minutes),
            _ => MetadataLine::CookMinutes(minutes),
        });
    }
    None
}

pub fn is_ingredient_header(line: &str) -> bool {
    let normalized = textutil::normalize_header(line);
    INGREDIENT_HEADERS.contains(&normalized.as_str())
}

pub fn is_step_header(line: &str) -> bool {
    let normalized = textutil::normalize_header(line);
    STEP_HEADERS.contains(&normalized.as_str())
}

pub fn is_notes_header(line: &str) -> bool {
    let normalized = textutil::normalize_header(line);
    NOTES_HEADERS.contains(&normalized.as_str())
}

fn is_any_header(line: &str) -> bool {
    is_ingredient_header(line) || is_step_header(line) || is_notes_header(line)
}

fn is_junk(cleaned: &str) -> bool {
    if cleaned.is_empty() {
        return true;
    }
    let normalized = textutil::normalize_header(cleaned);
    if JUNK_PHRASES.contains(&normalized.as_str()) {
        return true;
    }
    if textutil::alphabetic_char_count(cleaned) <= 1 {
        return true;
    }
    let mut tokens = cleaned.split_whitespace();
    if let (Some(only), None) = (tokens.next(), tokens.next()) {
        let lower = only.to_lowercase();
        if only.chars().count() <= 2 && !SHORT_TOKEN_ALLOW_LIST.contains(&lower.as_str()) {
            return true;
        }
    }
    false
}

/// Leading step-number marker ("1.", "2)").
pub fn has_step_number(line: &str) -> bool {
    STEP_NUMBER_RE.is_match(line)
}

/// First token of the line, lowercased, stripped of trailing punctuation.
fn first_token(line: &str) -> Option<String> {
    line.split_whitespace()
        .next()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
}

/// Whether the line opens with a cook-action verb, directly or behind a
/// connective ("In a large bowl, whisk...").
pub fn is_instruction_like(line: &str) -> bool {
    let Some(first) = first_token(line) else {
        return false;
    };
    if INSTRUCTION_VERBS.contains(&first.as_str()) {
        return true;
    }
    if STEP_CONNECTIVES.contains(&first.as_str()) {
        let lower = line.to_lowercase();
        return INSTRUCTION_VERBS
            .iter()
            .any(|verb| word_in(&lower, verb));
    }
    false
}

fn word_in(haystack: &str, word: &str) -> bool {
    haystack.split(|c: char| !c.is_alphabetic()).any(|t| t == word)
}

fn looks_like_ingredient(cleaned: &str) -> bool {
    if has_step_number(cleaned) {
        return false;
    }
    let Some((parsed, rest)) = quantity::extract_quantity_and_unit(cleaned) else {
        return false;
    };
    let starts_numeric = cleaned
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_digit() || "½¼¾⅓⅔⅛⅜⅝⅞".contains(c));
    if starts_numeric || parsed.unit != UnitKind::Whole {
        return true;
    }
    // word quantity with no unit ("two eggs"): only a short noun phrase,
    // never an instruction opening
    let token_count = rest.split_whitespace().count();
    token_count > 0 && token_count <= 3 && !is_instruction_like(&rest)
}

fn looks_like_step(cleaned: &str) -> bool {
    has_step_number(cleaned) || is_instruction_like(cleaned)
}

fn contains_header_phrase(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    INGREDIENT_HEADERS
        .iter()
        .chain(STEP_HEADERS)
        .chain(NOTES_HEADERS)
        .any(|phrase| {
            phrase
                .split_whitespace()
                .all(|word| word_in(&lower, word))
                && lower.contains(phrase)
        })
}

/// The loose title shape used during classification.
pub fn looks_like_title(cleaned: &str) -> bool {
    let tokens = textutil::alphabetic_token_count(cleaned);
    if !(2..=16).contains(&tokens) {
        return false;
    }
    if cleaned.ends_with('.') {
        return false;
    }
    if metadata_line(cleaned).is_some() {
        return false;
    }
    if contains_header_phrase(cleaned) {
        return false;
    }
    !is_instruction_like(cleaned)
}

/// Section-marker shapes ("For the sauce", "To serve") that must never be
/// promoted to a title.
const MARKER_PREFIXES: &[&str] = &["for the ", "for a ", "for an ", "for serving", "to serve"];

/// The stricter check gating actual title assignment in the assembler.
pub fn is_plausible_title(line: &str) -> bool {
    let cleaned = textutil::clean_line(line);
    let lower = cleaned.to_lowercase();
    looks_like_title(&cleaned)
        && !is_junk(&cleaned)
        && !is_any_header(&cleaned)
        && !looks_like_ingredient(&cleaned)
        && !has_step_number(&cleaned)
        && !MARKER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// Explicit note-prefix vocabulary ("Note:", "Tip:").
pub fn has_note_prefix(line: &str) -> bool {
    let lower = textutil::clean_line(line).to_lowercase();
    NOTE_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn has_note_vocabulary(cleaned: &str) -> bool {
    let lower = cleaned.to_lowercase();
    if NOTE_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return true;
    }
    NOTE_HINTS.iter().any(|hint| {
        if hint.contains(' ') {
            lower.contains(hint)
        } else {
            word_in(&lower, hint)
        }
    })
}

/// Deterministic classification, priority order Junk > Header > Ingredient
/// > Step > Title > Note.
pub fn classify(line: &str) -> LineLabel {
    let cleaned = textutil::clean_line(line);
    if is_junk(&cleaned) {
        return LineLabel::Junk;
    }
    if is_any_header(&cleaned) {
        return LineLabel::Header;
    }
    if looks_like_ingredient(&cleaned) {
        return LineLabel::Ingredient;
    }
    if looks_like_step(&cleaned) {
        return LineLabel::Step;
    }
    if looks_like_title(&cleaned) {
        return LineLabel::Title;
    }
    if has_note_vocabulary(&cleaned) {
        return LineLabel::Note;
    }
    // free-running prose reads as a note, anything symbol-heavy was
    // already junked above
    LineLabel::Note
}

/// Optional statistical hint consulted ahead of the deterministic rules.
pub trait ClassifierHint {
    fn suggest(&self, line: &str) -> Option<LineClassification>;
}

/// Hint suggestions below this confidence fall back to the rules.
pub const DEFAULT_HINT_THRESHOLD: f32 = 0.8;

/// Hybrid classifier: a hint at or above the confidence threshold wins,
/// everything else falls back to the deterministic rules.
pub struct LineClassifier {
    hint: Option<Box<dyn ClassifierHint>>,
    threshold: f32,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl LineClassifier {
    pub fn deterministic() -> Self {
        Self {
            hint: None,
            threshold: 1.0,
        }
    }

    pub fn with_hint(hint: Box<dyn ClassifierHint>, threshold: f32) -> Self {
        Self {
            hint: Some(hint),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn classify(&self, line: &str) -> LineClassification {
        if let Some(hint) = &self.hint {
            if let Some(suggestion) = hint.suggest(line) {
                if suggestion.confidence >= self.threshold {
                    return suggestion;
                }
            }
        }
        LineClassification::certain(classify(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_totality() {
        for line in ["", "   ", "!!!", "•", "1", "ab", "a perfectly normal sentence"] {
            // must not panic, must return exactly one label
            let _ = classify(line);
        }
    }

    #[test]
    fn test_junk() {
        assert_eq!(classify(""), LineLabel::Junk);
        assert_eq!(classify("Advertisement"), LineLabel::Junk);
        assert_eq!(classify("***"), LineLabel::Junk);
        assert_eq!(classify("x"), LineLabel::Junk);
        assert_eq!(classify("ok"), LineLabel::Junk);
        assert_eq!(classify("Jump to Recipe"), LineLabel::Junk);
    }

    #[test]
    fn test_short_allow_list() {
        assert_ne!(classify("oil"), LineLabel::Junk);
        assert_ne!(classify("eggs"), LineLabel::Junk);
    }

    #[test]
    fn test_headers() {
        assert_eq!(classify("Ingredients:"), LineLabel::Header);
        assert_eq!(classify("INSTRUCTIONS"), LineLabel::Header);
        assert_eq!(classify("Method"), LineLabel::Header);
        assert_eq!(classify("Tips and Variations"), LineLabel::Header);
        assert_eq!(classify("For the ingredients"), LineLabel::Header);
    }

    #[test]
    fn test_ingredients() {
        assert_eq!(classify("2 cups flour"), LineLabel::Ingredient);
        assert_eq!(classify("½ tsp salt"), LineLabel::Ingredient);
        assert_eq!(classify("2-3 tbsp olive oil"), LineLabel::Ingredient);
        assert_eq!(classify("a dozen eggs"), LineLabel::Ingredient);
        assert_eq!(classify("two eggs"), LineLabel::Ingredient);
    }

    #[test]
    fn test_steps() {
        assert_eq!(classify("1. Preheat the oven to 350F"), LineLabel::Step);
        assert_eq!(classify("2) Mix the dry ingredients"), LineLabel::Step);
        assert_eq!(classify("Whisk the eggs with the milk"), LineLabel::Step);
        assert_eq!(
            classify("In a large bowl, combine flour and sugar"),
            LineLabel::Step
        );
        assert_eq!(classify("Then stir in the chocolate"), LineLabel::Step);
    }

    #[test]
    fn test_title() {
        assert_eq!(classify("Classic Chocolate Chip Cookies"), LineLabel::Title);
        assert_eq!(classify("Grandma's Apple Pie"), LineLabel::Title);
    }

    #[test]
    fn test_notes() {
        assert_eq!(
            classify("Note: this keeps for a week in the fridge"),
            LineLabel::Note
        );
        assert_eq!(
            classify("A splash of white wine gives the sauce extra depth of taste."),
            LineLabel::Note
        );
    }

    #[test]
    fn test_metadata_line() {
        assert_eq!(
            metadata_line("Serves 4"),
            Some(MetadataLine::Serving("4 servings".into()))
        );
        assert_eq!(
            metadata_line("Makes 24 cookies"),
            Some(MetadataLine::Serving("24 cookies".into()))
        );
        assert_eq!(
            metadata_line("Prep time: 15 minutes"),
            Some(MetadataLine::PrepMinutes(15))
        );
        assert_eq!(
            metadata_line("Total time: 1 hour 10 minutes"),
            Some(MetadataLine::TotalMinutes(70))
        );
        assert_eq!(metadata_line("Cook Time - 25 min"),
            Some(MetadataLine::CookMinutes(25))
        );
        assert_eq!(metadata_line("Serve warm"), None);
    }

    #[test]
    fn test_metadata_never_title() {
        assert!(!is_plausible_title("Serves 4"));
        assert!(!is_plausible_title("Total time: 45 minutes"));
        assert!(is_plausible_title("Weeknight Chicken Curry"));
    }

    #[test]
    fn test_hint_gating() {
        struct FixedHint(f32);
        impl ClassifierHint for FixedHint {
            fn suggest(&self, _line: &str) -> Option<LineClassification> {
                Some(LineClassification {
                    label: LineLabel::Note,
                    confidence: self.0,
                })
            }
        }

        let confident = LineClassifier::with_hint(Box::new(FixedHint(0.95)), 0.8);
        assert_eq!(confident.classify("2 cups flour").label, LineLabel::Note);

        let unsure = LineClassifier::with_hint(Box::new(FixedHint(0.4)), 0.8);
        let result = unsure.classify("2 cups flour");
        assert_eq!(result.label, LineLabel::Ingredient);
        assert_eq!(result.confidence, 1.0);
    }
}
