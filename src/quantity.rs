//! Quantity and unit parsing for ingredient lines.
//!
//! Handles digits, unicode vulgar fractions, simple and mixed fractions,
//! ranges ("2-3", "2 to 3"), locale decimal commas, and word quantities
//! ("a dozen", "two and a half"). Unit spellings normalize onto the closed
//! [`UnitKind`] set; an unrecognized unit token is left on the remainder and
//! the quantity defaults to `Whole`.

use crate::model::{Ingredient, Quantity, UnitKind};
use crate::textutil;

/// Word-quantity prefix table. Matched as whole leading tokens.
const WORD_QUANTITIES: &[(&str, f64)] = &[
    ("a", 1.0),
    ("an", 1.0),
    ("one", 1.0),
    ("two", 2.0),
    ("three", 3.0),
    ("four", 4.0),
    ("five", 5.0),
    ("six", 6.0),
    ("seven", 7.0),
    ("eight", 8.0),
    ("nine", 9.0),
    ("ten", 10.0),
    ("eleven", 11.0),
    ("twelve", 12.0),
    ("dozen", 12.0),
    ("half", 0.5),
    ("quarter", 0.25),
    ("couple", 2.0),
    ("few", 3.0),
];

/// Unicode vulgar fractions rewritten to ASCII fraction text before parsing.
const VULGAR_FRACTIONS: &[(char, &str)] = &[
    ('½', "1/2"),
    ('¼', "1/4"),
    ('¾', "3/4"),
    ('⅓', "1/3"),
    ('⅔', "2/3"),
    ('⅛', "1/8"),
    ('⅜', "3/8"),
    ('⅝', "5/8"),
    ('⅞', "7/8"),
];

/// Every recognized unit spelling, lowercased, mapped onto its canonical
/// unit. Two-word spellings are matched before single tokens.
const UNIT_ABBREVIATIONS: &[(&str, UnitKind)] = &[
    ("teaspoon", UnitKind::Teaspoon),
    ("teaspoons", UnitKind::Teaspoon),
    ("tsp", UnitKind::Teaspoon),
    ("tsps", UnitKind::Teaspoon),
    ("t", UnitKind::Teaspoon),
    ("ts", UnitKind::Teaspoon),
    ("tablespoon", UnitKind::Tablespoon),
    ("tablespoons", UnitKind::Tablespoon),
    ("tbsp", UnitKind::Tablespoon),
    ("tbsps", UnitKind::Tablespoon),
    ("tbs", UnitKind::Tablespoon),
    ("tbl", UnitKind::Tablespoon),
    ("cup", UnitKind::Cup),
    ("cups", UnitKind::Cup),
    ("c", UnitKind::Cup),
    ("ounce", UnitKind::Ounce),
    ("ounces", UnitKind::Ounce),
    ("oz", UnitKind::Ounce),
    ("ozs", UnitKind::Ounce),
    ("pound", UnitKind::Pound),
    ("pounds", UnitKind::Pound),
    ("lb", UnitKind::Pound),
    ("lbs", UnitKind::Pound),
    ("gram", UnitKind::Gram),
    ("grams", UnitKind::Gram),
    ("g", UnitKind::Gram),
    ("gr", UnitKind::Gram),
    ("kilogram", UnitKind::Kilogram),
    ("kilograms", UnitKind::Kilogram),
    ("kg", UnitKind::Kilogram),
    ("kgs", UnitKind::Kilogram),
    ("kilo", UnitKind::Kilogram),
    ("kilos", UnitKind::Kilogram),
    ("milliliter", UnitKind::Milliliter),
    ("milliliters", UnitKind::Milliliter),
    ("millilitre", UnitKind::Milliliter),
    ("millilitres", UnitKind::Milliliter),
    ("ml", UnitKind::Milliliter),
    ("mls", UnitKind::Milliliter),
    ("liter", UnitKind::Liter),
    ("liters", UnitKind::Liter),
    ("litre", UnitKind::Liter),
    ("litres", UnitKind::Liter),
    ("l", UnitKind::Liter),
    ("pint", UnitKind::Pint),
    ("pints", UnitKind::Pint),
    ("pt", UnitKind::Pint),
    ("pts", UnitKind::Pint),
    ("quart", UnitKind::Quart),
    ("quarts", UnitKind::Quart),
    ("qt", UnitKind::Quart),
    ("qts", UnitKind::Quart),
    ("gallon", UnitKind::Gallon),
    ("gallons", UnitKind::Gallon),
    ("gal", UnitKind::Gallon),
    ("gals", UnitKind::Gallon),
    ("floz", UnitKind::FluidOunce),
    ("pinch", UnitKind::Pinch),
    ("pinches", UnitKind::Pinch),
    ("dash", UnitKind::Dash),
    ("dashes", UnitKind::Dash),
    ("piece", UnitKind::Piece),
    ("pieces", UnitKind::Piece),
    ("slice", UnitKind::Piece),
    ("slices", UnitKind::Piece),
    ("fillet", UnitKind::Piece),
    ("fillets", UnitKind::Piece),
    ("sprig", UnitKind::Piece),
    ("sprigs", UnitKind::Piece),
    ("head", UnitKind::Piece),
    ("heads", UnitKind::Piece),
    ("ear", UnitKind::Piece),
    ("ears", UnitKind::Piece),
    ("sheet", UnitKind::Piece),
    ("sheets", UnitKind::Piece),
    ("stalk", UnitKind::Piece),
    ("stalks", UnitKind::Piece),
    ("stick", UnitKind::Piece),
    ("sticks", UnitKind::Piece),
    ("handful", UnitKind::Piece),
    ("handfuls", UnitKind::Piece),
    ("clove", UnitKind::Clove),
    ("cloves", UnitKind::Clove),
    ("bunch", UnitKind::Bunch),
    ("bunches", UnitKind::Bunch),
    ("can", UnitKind::Can),
    ("cans", UnitKind::Can),
    ("tin", UnitKind::Can),
    ("tins", UnitKind::Can),
    ("package", UnitKind::Package),
    ("packages", UnitKind::Package),
    ("pkg", UnitKind::Package),
    ("pkgs", UnitKind::Package),
    ("packet", UnitKind::Package),
    ("packets", UnitKind::Package),
    ("box", UnitKind::Package),
    ("boxes", UnitKind::Package),
    ("whole", UnitKind::Whole),
];

/// Two-word unit spellings, checked before single tokens.
const TWO_WORD_UNITS: &[(&str, UnitKind)] = &[
    ("fl oz", UnitKind::FluidOunce),
    ("fluid ounce", UnitKind::FluidOunce),
    ("fluid ounces", UnitKind::FluidOunce),
];

/// Look up a single unit token (case-insensitive, trailing period ignored).
pub fn unit_from_token(token: &str) -> Option<UnitKind> {
    let normalized = token.trim().trim_end_matches('.').to_lowercase();
    UNIT_ABBREVIATIONS
        .iter()
        .find(|(spelling, _)| *spelling == normalized)
        .map(|(_, unit)| *unit)
}

fn word_quantity(token: &str) -> Option<f64> {
    let normalized = token.to_lowercase();
    WORD_QUANTITIES
        .iter()
        .find(|(word, _)| *word == normalized)
        .map(|(_, value)| *value)
}

fn substitute_vulgar_fractions(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for c in text.chars() {
        match VULGAR_FRACTIONS.iter().find(|(vc, _)| *vc == c) {
            Some((_, ascii)) => {
                // keep mixed numbers like "1½" parseable as "1 1/2"
                if out.ends_with(|p: char| p.is_ascii_digit()) {
                    out.push(' ');
                }
                out.push_str(ascii);
            }
            None => out.push(c),
        }
    }
    out
}

fn parse_simple_fraction(text: &str) -> Option<f64> {
    let (num, den) = text.split_once('/')?;
    let num: f64 = num.trim().parse().ok()?;
    let den: f64 = den.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}

/// Sum of word-number tokens, skipping a leading article ("a dozen" is 12,
/// not 13). All tokens must be known for the lookup to succeed.
fn parse_word_number(text: &str) -> Option<f64> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    // compound sum: "two and a half"
    if let Some((left, right)) = lower.split_once(" and ") {
        return Some(parse_word_number(left)? + parse_word_number(right)?);
    }

    let tokens: Vec<&str> = lower.split_whitespace().collect();
    let body = if tokens.len() > 1 && matches!(tokens[0], "a" | "an") {
        &tokens[1..]
    } else {
        &tokens[..]
    };

    let mut sum = 0.0;
    for token in body {
        sum += word_quantity(token)?;
    }
    Some(sum)
}

/// Parse quantity text into a single value. Ranges collapse to their
/// arithmetic mean; see [`extract_quantity_and_unit`] for endpoint
/// preservation.
pub fn parse_quantity_value(text: &str) -> Option<f64> {
    let text = substitute_vulgar_fractions(text.trim());
    let text = text.replace(['–', '—'], "-");
    let text = text.trim().trim_end_matches(['.', ',', '-']).trim();
    if text.is_empty() {
        return None;
    }

    // range "X-Y" or "X to Y": arithmetic mean of the endpoints
    if let Some((low, high)) = split_range(text) {
        return Some((low + high) / 2.0);
    }

    // mixed number "N M/D"
    if let Some((whole, frac)) = text.split_once(' ') {
        if frac.contains('/') {
            if let (Ok(whole), Some(frac)) =
                (whole.trim().parse::<f64>(), parse_simple_fraction(frac))
            {
                return Some(whole + frac);
            }
        }
    }

    // simple fraction "N/M"
    if text.contains('/') {
        return parse_simple_fraction(text);
    }

    // locale decimal comma: "1,5" with at most two trailing digits
    if !text.contains('.') {
        if let Some((int_part, dec_part)) = text.split_once(',') {
            if !dec_part.is_empty()
                && dec_part.len() <= 2
                && dec_part.chars().all(|c| c.is_ascii_digit())
                && int_part.chars().all(|c| c.is_ascii_digit())
            {
                return format!("{int_part}.{dec_part}").parse().ok();
            }
        }
    }

    if let Ok(value) = text.parse::<f64>() {
        return Some(value);
    }

    parse_word_number(text)
}

/// Split range syntax into parsed endpoints, if both sides parse.
fn split_range(text: &str) -> Option<(f64, f64)> {
    let (left, right) = if let Some((l, r)) = text.split_once(" to ") {
        (l, r)
    } else if let Some((l, r)) = text.split_once('-') {
        (l, r)
    } else {
        return None;
    };
    let low = parse_quantity_value(left)?;
    let high = parse_quantity_value(right)?;
    Some((low, high))
}

fn is_quantity_char(c: char) -> bool {
    c.is_ascii_digit()
        || matches!(c, '.' | '/' | '-' | ' ' | ',' | '–' | '—')
        || VULGAR_FRACTIONS.iter().any(|(vc, _)| *vc == c)
}

/// Extract a leading quantity and unit from ingredient text, returning the
/// remainder. Range endpoints are preserved on the returned [`Quantity`].
/// `None` when the text has no leading quantity at all.
pub fn extract_quantity_and_unit(text: &str) -> Option<(Quantity, String)> {
    let text = text.trim();

    // word-quantity prefix ("a dozen eggs", "half a cup of sugar")
    if let Some(result) = extract_word_quantity(text) {
        return Some(result);
    }

    // leading run of quantity characters
    let end = text
        .char_indices()
        .find(|(_, c)| !is_quantity_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let mut quantity_text = &text[..end];
    let mut rest = &text[end..];

    // "2 to 3 cups": the word range connective interrupts the scan
    if let Some(extended) = extend_to_range(text, quantity_text) {
        quantity_text = &text[..extended];
        rest = &text[extended..];
    }

    if !quantity_text
        .chars()
        .any(|c| c.is_ascii_digit() || VULGAR_FRACTIONS.iter().any(|(vc, _)| *vc == c))
    {
        return None;
    }

    let quantity = parse_quantity_text(quantity_text.trim())?;
    let (unit, remainder) = take_unit(rest, quantity.unit);
    let quantity = Quantity { unit, ..quantity };
    Some((quantity, remainder))
}

/// Parse quantity text into a `Quantity` with `Whole` as the placeholder
/// unit, keeping range endpoints.
fn parse_quantity_text(quantity_text: &str) -> Option<Quantity> {
    let normalized = substitute_vulgar_fractions(quantity_text);
    let normalized = normalized.replace(['–', '—'], "-");
    let normalized = normalized.trim().trim_end_matches(['.', ',', '-']).trim();

    if let Some((low, high)) = split_range(normalized) {
        return Some(Quantity::range(low, high, UnitKind::Whole));
    }
    parse_quantity_value(normalized).map(|v| Quantity::exact(v, UnitKind::Whole))
}

fn extract_word_quantity(text: &str) -> Option<(Quantity, String)> {
    let first = text.split_whitespace().next()?;
    word_quantity(first)?;

    // greedily take the longest word-quantity prefix ("a dozen", "two and a half")
    let mut best: Option<(f64, usize)> = None;
    let token_count = text.split_whitespace().count();
    for i in 0..token_count {
        let Some(end) = find_nth_token_end(text, i) else {
            break;
        };
        let prefix = &text[..end];
        if let Some(value) = parse_word_number(prefix) {
            best = Some((value, end));
        } else {
            let last = prefix
                .split_whitespace()
                .last()
                .unwrap_or_default()
                .to_lowercase();
            if best.is_some() && !matches!(last.as_str(), "a" | "an" | "and") {
                break;
            }
        }
    }
    let (value, len) = best?;
    let rest = &text[len..];

    // a bare article is not a quantity unless a plausible unit or noun follows
    let next = rest.split_whitespace().next()?;
    if value == 1.0 && matches!(first.to_lowercase().as_str(), "a" | "an") {
        unit_from_token(next)?;
    }

    let (unit, remainder) = take_unit(rest, UnitKind::Whole);
    Some((Quantity::exact(value, unit), remainder))
}

fn find_nth_token_end(text: &str, n: usize) -> Option<usize> {
    let mut count = 0;
    let mut in_token = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if in_token {
                count += 1;
                if count == n + 1 {
                    return Some(i);
                }
                in_token = false;
            }
        } else {
            in_token = true;
        }
    }
    if in_token {
        count += 1;
        if count == n + 1 {
            return Some(text.len());
        }
    }
    None
}

/// Extend the scanned quantity run across a "to" range connective
/// ("2 to 3 cups"). Returns the new end offset.
fn extend_to_range(text: &str, scanned: &str) -> Option<usize> {
    if scanned.trim().is_empty() || !scanned.trim().chars().all(is_quantity_char) {
        return None;
    }
    let rest = &text[scanned.len()..];
    let after_to = rest.strip_prefix("to ")?;
    let second_end = after_to
        .char_indices()
        .find(|(_, c)| !is_quantity_char(*c))
        .map(|(i, _)| i)
        .unwrap_or(after_to.len());
    if !after_to[..second_end].chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(scanned.len() + 3 + second_end)
}

/// Consume a unit token (or two-word unit) from the head of `rest`. An
/// unrecognized token is left in place and the fallback unit is kept.
fn take_unit(rest: &str, fallback: UnitKind) -> (UnitKind, String) {
    let rest = rest.trim_start();

    let lower = rest.to_lowercase();
    for (spelling, unit) in TWO_WORD_UNITS {
        if let Some(after) = lower.strip_prefix(spelling) {
            if after.is_empty() || after.starts_with([' ', '.', ',']) {
                let consumed = &rest[spelling.len()..];
                return (*unit, strip_of(consumed).to_string());
            }
        }
    }

    let token = match rest.split_whitespace().next() {
        Some(t) => t,
        None => return (fallback, String::new()),
    };
    match unit_from_token(token) {
        Some(unit) => {
            let consumed = rest[token.len()..].trim_start();
            (unit, strip_of(consumed).to_string())
        }
        None => (fallback, rest.to_string()),
    }
}

/// Drop a leading "of" left over after a unit match ("2 cups of flour").
fn strip_of(text: &str) -> &str {
    let trimmed = text.trim_start_matches(['.', ' ']).trim_start();
    trimmed
        .strip_prefix("of ")
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

/// Whether a line reads like a measurement (used by the last-resort list
/// screen in the heuristic extractor).
pub fn looks_like_measurement(text: &str) -> bool {
    extract_quantity_and_unit(text).is_some()
}

/// Parse a full ingredient line into an [`Ingredient`]. A line with no
/// parseable quantity keeps `quantity: None` rather than being discarded;
/// returns `None` only when no name survives sanitation.
pub fn parse_ingredient_line(text: &str, section: Option<&str>) -> Option<Ingredient> {
    let cleaned = textutil::clean_line(text);
    if cleaned.is_empty() {
        return None;
    }

    // parenthetical: an alternate measurement becomes an additional
    // quantity, anything else becomes the note
    let mut additional = Vec::new();
    let mut note: Option<String> = None;
    let mut body = String::with_capacity(cleaned.len());
    let mut scan = cleaned.as_str();
    while let Some(open) = scan.find('(') {
        let Some(close_rel) = scan[open..].find(')') else {
            break;
        };
        let close = open + close_rel;
        body.push_str(&scan[..open]);
        let inner = scan[open + 1..close].trim();
        match extract_quantity_and_unit(inner) {
            Some((quantity, remainder)) if remainder.trim().is_empty() => {
                additional.push(quantity);
            }
            _ => {
                if !inner.is_empty() {
                    append_note(&mut note, inner);
                }
            }
        }
        scan = &scan[close + 1..];
    }
    body.push_str(scan);
    let body = textutil::collapse_whitespace(&body);

    let (quantity, mut name) = match extract_quantity_and_unit(&body) {
        Some((quantity, remainder)) => (Some(quantity), remainder),
        None => (None, body),
    };

    // comma or dash delimited trailer is preparation detail, not name
    if let Some((head, trailer)) = name.split_once(',') {
        let head = head.trim().to_string();
        let trailer = trailer.trim().to_string();
        if !head.is_empty() && !trailer.is_empty() {
            append_note(&mut note, &trailer);
            name = head;
        }
    } else if let Some((head, trailer)) = name.split_once(" - ") {
        let head = head.trim().to_string();
        let trailer = trailer.trim().to_string();
        if !head.is_empty() && !trailer.is_empty() {
            append_note(&mut note, &trailer);
            name = head;
        }
    }

    let name = strip_ocr_artifact(name.trim().trim_end_matches([',', ';', '.']).trim());
    if name.is_empty() || !name.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    Some(Ingredient {
        quantity,
        additional_quantities: additional,
        note,
        section: section.map(str::to_string),
        ..Ingredient::new(name)
    })
}

fn append_note(note: &mut Option<String>, text: &str) {
    match note {
        Some(existing) => {
            existing.push_str(", ");
            existing.push_str(text);
        }
        None => *note = Some(text.to_string()),
    }
}

/// Strip a stray single-letter token left at the end of a name by OCR.
fn strip_ocr_artifact(name: &str) -> String {
    if let Some((head, last)) = name.rsplit_once(' ') {
        if last.len() == 1 && last.chars().all(|c| c.is_alphabetic()) && !head.is_empty() {
            return head.trim().to_string();
        }
    }
    name.to_string()
}
