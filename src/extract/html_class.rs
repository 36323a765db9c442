//! Heuristic extraction by markup-pattern scanning.
//!
//! Ordered selector tables keyed by class/attribute hints, tried until one
//! yields usable content, with bare `<ul>`/`<ol>` scans as the last resort.

use crate::error::ParseError;
use crate::extract::{resolve_image_url, Extraction, Extractor, ParsingContext};
use crate::quantity;
use crate::textutil;
use log::debug;
use scraper::{ElementRef, Html, Selector};

pub struct HtmlClassExtractor;

/// Ingredient markup patterns, most specific first. The first pattern
/// yielding any parsed ingredient wins.
const INGREDIENT_PATTERNS: &[&str] = &[
    ".wprm-recipe-ingredient",
    ".tasty-recipes-ingredients li",
    ".mv-create-ingredients li",
    "[itemprop='recipeIngredient']",
    "[data-ingredient]",
    ".recipe-ingredients li",
    ".recipe-ingredient",
    ".ingredients li",
    "li[class*='ingredient']",
    "[class*='ingredient'] li",
];

/// Instruction markup patterns, same progressive-fallback scheme.
const STEP_PATTERNS: &[&str] = &[
    ".wprm-recipe-instruction",
    ".tasty-recipes-instructions li",
    ".mv-create-instructions li",
    "[itemprop='recipeInstructions'] li",
    ".recipe-instructions li",
    ".recipe-instruction",
    ".instructions li",
    ".directions li",
    "li[class*='instruction']",
    "li[class*='direction']",
    "[class*='step'] li",
];

/// Recipe-image fallbacks when no Open Graph tag is present.
const IMAGE_PATTERNS: &[&str] = &[
    "img[class*='recipe']",
    ".recipe-image img",
    "[itemprop='image']",
];

// Steps shorter than this after tag stripping are markup debris.
const MIN_STEP_LEN: usize = 6;

impl Extractor for HtmlClassExtractor {
    fn extract(&self, context: &ParsingContext) -> Result<Extraction, ParseError> {
        let document = &context.document;

        let ingredient_lines = find_ingredients(document);
        let step_lines = find_steps(document);

        if ingredient_lines.is_empty() && step_lines.is_empty() {
            return Err(ParseError::NoRecipeFound);
        }
        if ingredient_lines.is_empty() {
            return Err(ParseError::NoIngredientsFound);
        }
        if step_lines.is_empty() {
            return Err(ParseError::NoStepsFound);
        }

        Ok(Extraction {
            title: find_title(document),
            ingredient_lines,
            step_lines,
            note_lines: Vec::new(),
            yields: None,
            total_minutes: None,
            image_url: find_image(document, context),
            tags: Vec::new(),
        })
    }
}

fn element_line(element: ElementRef) -> String {
    textutil::collapse_whitespace(&textutil::decode_entities(
        &element.text().collect::<Vec<_>>().join(" "),
    ))
}

fn select_lines(document: &Html, selector_str: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector_str) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(element_line)
        .filter(|line| !line.is_empty())
        .collect()
}

fn find_ingredients(document: &Html) -> Vec<String> {
    for pattern in INGREDIENT_PATTERNS {
        let lines = select_lines(document, pattern);
        let parsed = lines
            .iter()
            .filter(|l| quantity::parse_ingredient_line(l, None).is_some())
            .count();
        if parsed >= 1 {
            debug!("ingredients via pattern {pattern}: {} lines", lines.len());
            return lines;
        }
    }

    // lists whose class mentions ingredients
    let ul_selector = Selector::parse("ul").unwrap();
    let li_selector = Selector::parse("li").unwrap();
    for list in document.select(&ul_selector) {
        let class_hit = list
            .value()
            .attr("class")
            .is_some_and(|c| c.to_lowercase().contains("ingredient"));
        if !class_hit {
            continue;
        }
        let lines: Vec<String> = list
            .select(&li_selector)
            .map(element_line)
            .filter(|l| !l.is_empty())
            .collect();
        let parsed = lines
            .iter()
            .filter(|l| quantity::parse_ingredient_line(l, None).is_some())
            .count();
        if parsed >= 2 {
            debug!("ingredients via ul class scan: {} lines", lines.len());
            return lines;
        }
    }

    // last resort: any list with at least two measurement-looking items
    for list in document.select(&ul_selector) {
        let lines: Vec<String> = list
            .select(&li_selector)
            .map(element_line)
            .filter(|l| !l.is_empty())
            .collect();
        let measured = lines
            .iter()
            .filter(|l| quantity::looks_like_measurement(l))
            .count();
        if measured >= 2 {
            debug!("ingredients via bare ul scan: {} lines", lines.len());
            return lines;
        }
    }

    Vec::new()
}

fn find_steps(document: &Html) -> Vec<String> {
    for pattern in STEP_PATTERNS {
        let lines = usable_steps(select_lines(document, pattern));
        if !lines.is_empty() {
            debug!("steps via pattern {pattern}: {} lines", lines.len());
            return lines;
        }
    }
    usable_steps(select_lines(document, "ol li"))
}

/// Drop markup debris and case-insensitive duplicates, preserving order.
fn usable_steps(lines: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut out = Vec::new();
    for line in lines {
        if line.len() < MIN_STEP_LEN {
            continue;
        }
        let key = line.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        out.push(line);
    }
    out
}

/// Title from the first usable `<h1>`, else `<title>` with a trailing
/// " | site" / " - site" suffix stripped.
fn find_title(document: &Html) -> Option<String> {
    let h1_selector = Selector::parse("h1").unwrap();
    for h1 in document.select(&h1_selector) {
        let text = element_line(h1);
        if !text.is_empty() && text.len() < 100 {
            return Some(text);
        }
    }

    let title_selector = Selector::parse("title").unwrap();
    let text = element_line(document.select(&title_selector).next()?);
    if text.is_empty() {
        return None;
    }
    let stripped = text
        .rsplit_once(" | ")
        .or_else(|| text.rsplit_once(" - "))
        .map(|(head, _)| head.trim().to_string())
        .unwrap_or(text);
    (!stripped.is_empty()).then_some(stripped)
}

fn find_image(document: &Html, context: &ParsingContext) -> Option<String> {
    let og_selector = Selector::parse("meta[property='og:image']").unwrap();
    if let Some(meta) = document.select(&og_selector).next() {
        if let Some(content) = meta.value().attr("content") {
            if let Some(resolved) = resolve_image_url(content, context.url.as_deref()) {
                return Some(resolved);
            }
        }
    }
    for pattern in IMAGE_PATTERNS {
        let Ok(selector) = Selector::parse(pattern) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(src) = element.value().attr("src") {
                if let Some(resolved) = resolve_image_url(src, context.url.as_deref()) {
                    return Some(resolved);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(html: &str) -> ParsingContext {
        ParsingContext::new(html, Some("https://example.com/pie"))
    }

    #[test]
    fn test_class_hint_extraction() {
        let html = r#"
            <html><head><title>Sugar Pie | Example Site</title></head>
            <body>
                <h1>Sugar Pie</h1>
                <ul>
                    <li class="ingredient-item">1 cup sugar</li>
                    <li class="ingredient-item">1 cup cream</li>
                </ul>
                <ol>
                    <li>Whisk the sugar into the cream.</li>
                    <li>Bake for 45 minutes.</li>
                </ol>
            </body></html>
        "#;
        let extraction = HtmlClassExtractor.extract(&context(html)).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Sugar Pie"));
        assert_eq!(
            extraction.ingredient_lines,
            vec!["1 cup sugar", "1 cup cream"]
        );
        assert_eq!(extraction.step_lines.len(), 2);
    }

    #[test]
    fn test_bare_list_measurement_fallback() {
        let html = r#"
            <html><body>
                <ul>
                    <li>Home</li>
                    <li>About</li>
                </ul>
                <ul>
                    <li>2 cups flour</li>
                    <li>1 tsp baking soda</li>
                    <li>pinch of salt</li>
                </ul>
                <ol>
                    <li>Mix the dry ingredients together.</li>
                    <li>Bake until done.</li>
                </ol>
            </body></html>
        "#;
        let extraction = HtmlClassExtractor.extract(&context(html)).unwrap();
        assert_eq!(extraction.ingredient_lines.len(), 3);
        assert_eq!(extraction.ingredient_lines[0], "2 cups flour");
    }

    #[test]
    fn test_short_steps_filtered_and_deduped() {
        let html = r#"
            <html><body>
                <ul><li class="ingredient">1 cup rice</li></ul>
                <ol>
                    <li>Ad</li>
                    <li>Rinse the rice well.</li>
                    <li>rinse the rice well.</li>
                    <li>Steam for 20 minutes.</li>
                </ol>
            </body></html>
        "#;
        let extraction = HtmlClassExtractor.extract(&context(html)).unwrap();
        assert_eq!(
            extraction.step_lines,
            vec!["Rinse the rice well.", "Steam for 20 minutes."]
        );
    }

    #[test]
    fn test_title_suffix_stripping() {
        let html = r#"
            <html><head><title>Apple Crumble - Grandma's Kitchen</title></head>
            <body>
                <ul><li class="ingredient">3 apples</li></ul>
                <ol><li>Bake the crumble until golden.</li></ol>
            </body></html>
        "#;
        let extraction = HtmlClassExtractor.extract(&context(html)).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Apple Crumble"));
    }

    #[test]
    fn test_og_image_preferred() {
        let html = r#"
            <html><head>
                <meta property="og:image" content="/img/pie.jpg">
            </head>
            <body>
                <ul><li class="ingredient">1 cup sugar</li></ul>
                <ol><li>Caramelize the sugar slowly.</li></ol>
            </body></html>
        "#;
        let extraction = HtmlClassExtractor.extract(&context(html)).unwrap();
        assert_eq!(
            extraction.image_url.as_deref(),
            Some("https://example.com/img/pie.jpg")
        );
    }

    #[test]
    fn test_no_recipe_content() {
        let html = "<html><body><p>Just a blog post about travel.</p></body></html>";
        assert_eq!(
            HtmlClassExtractor.extract(&context(html)),
            Err(ParseError::NoRecipeFound)
        );
    }

    #[test]
    fn test_missing_ingredients_specific_error() {
        let html = r#"
            <html><body>
                <ol><li>Stir everything together well.</li></ol>
            </body></html>
        "#;
        assert_eq!(
            HtmlClassExtractor.extract(&context(html)),
            Err(ParseError::NoIngredientsFound)
        );
    }
}
