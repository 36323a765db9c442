//! Structured extraction from embedded schema.org JSON-LD blocks.
//!
//! Each `application/ld+json` script is sanitized, decoded, and searched
//! recursively for a recipe node; the first block that yields at least one
//! ingredient and one step wins.

use crate::duration;
use crate::error::ParseError;
use crate::extract::{resolve_image_url, Extraction, Extractor, ParsingContext};
use crate::textutil;
use log::debug;
use scraper::Selector;
use serde_json::Value;

pub struct JsonLdExtractor;

const INGREDIENT_FIELDS: &[&str] = &["recipeIngredient", "ingredients", "ingredient"];
const INSTRUCTION_FIELDS: &[&str] = &["recipeInstructions", "instructions", "step"];

/// Containers searched, in order, for a nested recipe node.
const CONTAINER_FIELDS: &[&str] = &[
    "mainEntity",
    "mainEntityOfPage",
    "@graph",
    "@list",
    "itemListElement",
];

impl Extractor for JsonLdExtractor {
    fn extract(&self, context: &ParsingContext) -> Result<Extraction, ParseError> {
        let selector = Selector::parse("script[type='application/ld+json']").unwrap();

        let mut partial: Option<ParseError> = None;
        for (index, script) in context.document.select(&selector).enumerate() {
            let cleaned = sanitize_json(&script.inner_html());
            let value: Value = match serde_json::from_str(&cleaned) {
                Ok(value) => value,
                Err(err) => {
                    debug!("script {index}: unparseable JSON-LD ({err})");
                    continue;
                }
            };
            let Some(node) = find_recipe_node(&value) else {
                debug!("script {index}: no recipe node");
                continue;
            };
            match build_extraction(node, context) {
                Ok(extraction) => {
                    debug!(
                        "script {index}: {} ingredients, {} steps",
                        extraction.ingredient_lines.len(),
                        extraction.step_lines.len()
                    );
                    return Ok(extraction);
                }
                // remember the first partial block, but keep trying later
                // candidates for a full one
                Err(err) => partial = partial.or(Some(err)),
            }
        }
        Err(partial.unwrap_or(ParseError::NoRecipeFound))
    }
}

/// Recursive recipe-node search over the decoded value graph.
fn find_recipe_node(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe_node),
        Value::Object(map) => {
            if is_recipe_node(value) {
                return Some(value);
            }
            CONTAINER_FIELDS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(find_recipe_node)
        }
        _ => None,
    }
}

/// A node is recipe-shaped when its type mentions "recipe" (string or list
/// of strings), or when it carries the schema ingredient and instruction
/// fields without declaring a type.
fn is_recipe_node(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    let type_matches = match map.get("@type") {
        Some(Value::String(s)) => s.to_lowercase().contains("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .any(|t| t.as_str().is_some_and(|s| s.to_lowercase().contains("recipe"))),
        _ => false,
    };
    if type_matches {
        return true;
    }
    INGREDIENT_FIELDS.iter().any(|f| map.contains_key(*f))
        && INSTRUCTION_FIELDS.iter().any(|f| map.contains_key(*f))
}

fn build_extraction(node: &Value, context: &ParsingContext) -> Result<Extraction, ParseError> {
    let map = node.as_object().ok_or(ParseError::NoRecipeFound)?;

    let ingredient_lines = INGREDIENT_FIELDS
        .iter()
        .filter_map(|f| map.get(*f))
        .map(collect_ingredient_lines)
        .find(|lines| !lines.is_empty())
        .unwrap_or_default();
    if ingredient_lines.is_empty() {
        return Err(ParseError::NoIngredientsFound);
    }

    let step_lines = INSTRUCTION_FIELDS
        .iter()
        .filter_map(|f| map.get(*f))
        .map(|value| {
            let mut lines = Vec::new();
            unwrap_instructions(value, &mut lines);
            dedup_case_insensitive(lines)
        })
        .find(|lines| !lines.is_empty())
        .unwrap_or_default();
    if step_lines.is_empty() {
        return Err(ParseError::NoStepsFound);
    }

    let title = map
        .get("name")
        .and_then(Value::as_str)
        .map(clean_fragment)
        .filter(|t| !t.is_empty());

    Ok(Extraction {
        title,
        ingredient_lines,
        step_lines,
        note_lines: Vec::new(),
        yields: parse_yields(map.get("recipeYield")),
        total_minutes: parse_total_minutes(map),
        image_url: parse_image(map.get("image"), context),
        tags: collect_tags(map),
    })
}

fn clean_fragment(text: &str) -> String {
    textutil::collapse_whitespace(&textutil::decode_entities(&textutil::strip_tags(text)))
}

/// Normalize an ingredient field to a line list; non-list values wrap as a
/// singleton.
fn collect_ingredient_lines(value: &Value) -> Vec<String> {
    let entries: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(clean_fragment(s)),
            Value::Object(obj) => obj
                .get("name")
                .or_else(|| obj.get("text"))
                .and_then(Value::as_str)
                .map(clean_fragment),
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Recursive unwrap of `recipeInstructions` shapes: strings (split on
/// newlines or sentence boundaries), lists, and HowToStep/HowToSection
/// objects. Section names become colon-terminated subsection lines.
fn unwrap_instructions(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let cleaned = textutil::decode_entities(&textutil::strip_tags(s));
            if cleaned.contains('\n') {
                for line in cleaned.lines() {
                    let line = textutil::collapse_whitespace(line);
                    if !line.is_empty() {
                        out.push(line);
                    }
                }
            } else {
                for piece in split_sentences(&textutil::collapse_whitespace(&cleaned)) {
                    out.push(piece);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                unwrap_instructions(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(name) = map.get("name").and_then(Value::as_str) {
                let has_nested = map.contains_key("itemListElement");
                if has_nested {
                    let name = clean_fragment(name);
                    if !name.is_empty() {
                        out.push(format!("{name}:"));
                    }
                }
            }
            if let Some(text) = map.get("text").and_then(Value::as_str) {
                unwrap_instructions(&Value::String(text.to_string()), out);
            } else if let Some(nested) = map.get("itemListElement") {
                unwrap_instructions(nested, out);
            } else if let Some(name) = map.get("name").and_then(Value::as_str) {
                let name = clean_fragment(name);
                if !name.is_empty() {
                    out.push(name);
                }
            }
        }
        _ => {}
    }
}

/// Split a single-line instruction blob on sentence boundaries.
fn split_sentences(text: &str) -> Vec<String> {
    text.split(". ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.ends_with(['.', '!', '?']) {
                p.to_string()
            } else {
                format!("{p}.")
            }
        })
        .collect()
}

fn dedup_case_insensitive(lines: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(lines.len());
    let mut out = Vec::with_capacity(lines.len());
    for line in lines {
        let key = line.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(line);
        }
    }
    out
}

/// Prefer `totalTime`; otherwise sum prep, cook, and perform times,
/// treating unparsable components as zero. A zero sum is no answer.
fn parse_total_minutes(map: &serde_json::Map<String, Value>) -> Option<u32> {
    if let Some(total) = map
        .get("totalTime")
        .and_then(Value::as_str)
        .and_then(duration::iso8601_minutes)
    {
        if total > 0 {
            return Some(total);
        }
    }
    let sum: u32 = ["prepTime", "cookTime", "performTime"]
        .iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .filter_map(duration::iso8601_minutes)
        .sum();
    (sum > 0).then_some(sum)
}

/// Yield field: string, number, array (first element), or object with a
/// text/value field.
fn parse_yields(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let cleaned = clean_fragment(s);
            (!cleaned.is_empty()).then_some(cleaned)
        }
        Value::Number(n) => Some(format!("{n} servings")),
        Value::Array(items) => parse_yields(items.first()),
        Value::Object(map) => parse_yields(map.get("text").or_else(|| map.get("value"))),
        _ => None,
    }
}

fn parse_image(value: Option<&Value>, context: &ParsingContext) -> Option<String> {
    let raw = match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => match items.first()? {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
            _ => None,
        },
        Value::Object(map) => map.get("url").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }?;
    resolve_image_url(&textutil::decode_entities(&raw), context.url.as_deref())
}

/// Category, cuisine, and split keywords, case-insensitively de-duplicated
/// with the first-seen casing kept.
fn collect_tags(map: &serde_json::Map<String, Value>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: &str| {
        let tag = textutil::collapse_whitespace(&textutil::decode_entities(tag));
        if tag.is_empty() {
            return;
        }
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    };

    for key in ["recipeCategory", "recipeCuisine"] {
        match map.get(key) {
            Some(Value::String(s)) => push(s),
            Some(Value::Array(items)) => {
                for item in items.iter().filter_map(Value::as_str) {
                    push(item);
                }
            }
            _ => {}
        }
    }
    match map.get("keywords") {
        Some(Value::String(s)) => {
            for piece in s.split([',', ';']) {
                push(piece);
            }
        }
        Some(Value::Array(items)) => {
            for item in items.iter().filter_map(Value::as_str) {
                push(item);
            }
        }
        _ => {}
    }
    tags
}

/// Clean a JSON-LD payload before parsing: trim to the first brace, drop
/// trailing commas, and strip embedded HTML comments. Real CMS output
/// needs all three.
fn sanitize_json(json_str: &str) -> String {
    let mut cleaned = json_str.trim().to_string();

    if !cleaned.starts_with('{') && !cleaned.starts_with('[') {
        if let Some(start) = cleaned.find(['{', '[']) {
            cleaned = cleaned[start..].to_string();
        }
    }

    cleaned = cleaned.replace(",]", "]").replace(",}", "}");
    cleaned = cleaned.replace("<!--", "").replace("-->", "");

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_with(json_ld: &str) -> ParsingContext {
        let html = format!(
            r#"
            <!DOCTYPE html>
            <html>
            <head>
                <script type="application/ld+json">
                    {json_ld}
                </script>
            </head>
            <body></body>
            </html>
            "#
        );
        ParsingContext::new(&html, Some("https://example.com/recipe"))
    }

    #[test]
    fn test_basic_recipe() {
        let context = document_with(
            r#"
            {
                "@context": "https://schema.org/",
                "@type": "Recipe",
                "name": "Chocolate Chip Cookies",
                "image": "https://example.com/cookie.jpg",
                "recipeIngredient": ["2 cups flour", "1 cup sugar"],
                "recipeInstructions": "Mix ingredients. Bake at 350F for 10 minutes.",
                "recipeYield": "24 cookies",
                "totalTime": "PT25M",
                "recipeCategory": "Dessert",
                "keywords": "cookies, baking, cookies"
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Chocolate Chip Cookies"));
        assert_eq!(extraction.ingredient_lines, vec!["2 cups flour", "1 cup sugar"]);
        assert_eq!(
            extraction.step_lines,
            vec!["Mix ingredients.", "Bake at 350F for 10 minutes."]
        );
        assert_eq!(extraction.yields.as_deref(), Some("24 cookies"));
        assert_eq!(extraction.total_minutes, Some(25));
        assert_eq!(
            extraction.image_url.as_deref(),
            Some("https://example.com/cookie.jpg")
        );
        assert_eq!(extraction.tags, vec!["Dessert", "cookies", "baking"]);
    }

    #[test]
    fn test_howto_steps_and_type_list() {
        let context = document_with(
            r#"
            {
                "@type": ["Recipe", "NewsArticle"],
                "name": "Pasta",
                "recipeIngredient": ["200 g spaghetti"],
                "recipeInstructions": [
                    {"@type": "HowToStep", "text": "Boil the pasta."},
                    {"@type": "HowToStep", "text": "Drain and serve."},
                    {"@type": "HowToStep", "text": "boil the pasta."}
                ]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        // duplicates drop case-insensitively, first occurrence kept
        assert_eq!(
            extraction.step_lines,
            vec!["Boil the pasta.", "Drain and serve."]
        );
    }

    #[test]
    fn test_howto_sections_emit_subsection_lines() {
        let context = document_with(
            r#"
            {
                "@type": "Recipe",
                "name": "Layer Cake",
                "recipeIngredient": ["2 cups flour"],
                "recipeInstructions": [
                    {
                        "@type": "HowToSection",
                        "name": "Cake",
                        "itemListElement": [
                            {"@type": "HowToStep", "text": "Bake the layers."}
                        ]
                    },
                    {
                        "@type": "HowToSection",
                        "name": "Frosting",
                        "itemListElement": [
                            {"@type": "HowToStep", "text": "Whip the cream."}
                        ]
                    }
                ]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(
            extraction.step_lines,
            vec!["Cake:", "Bake the layers.", "Frosting:", "Whip the cream."]
        );
    }

    #[test]
    fn test_graph_and_nested_lookup() {
        let context = document_with(
            r#"
            {
                "@context": "https://schema.org",
                "@graph": [
                    {"@type": "WebSite", "name": "Food Site"},
                    {
                        "@type": "Recipe",
                        "name": "Soup",
                        "recipeIngredient": ["1 onion"],
                        "recipeInstructions": [{"@type": "HowToStep", "text": "Simmer the onion."}]
                    }
                ]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Soup"));
    }

    #[test]
    fn test_typeless_node_with_schema_fields() {
        let context = document_with(
            r#"
            {
                "name": "Untyped Dish",
                "ingredients": ["1 cup rice"],
                "instructions": ["Cook the rice."]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.ingredient_lines, vec!["1 cup rice"]);
    }

    #[test]
    fn test_time_sum_fallback() {
        let context = document_with(
            r#"
            {
                "@type": "Recipe",
                "name": "Bread",
                "prepTime": "PT20M",
                "cookTime": "PT40M",
                "recipeIngredient": ["500 g flour"],
                "recipeInstructions": ["Knead. Bake."]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.total_minutes, Some(60));
    }

    #[test]
    fn test_numeric_yield() {
        let context = document_with(
            r#"
            {
                "@type": "Recipe",
                "name": "Stew",
                "recipeYield": 6,
                "recipeIngredient": ["1 lb beef"],
                "recipeInstructions": ["Brown the beef. Simmer for 2 hours."]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.yields.as_deref(), Some("6 servings"));
    }

    #[test]
    fn test_protocol_relative_image() {
        let context = document_with(
            r#"
            {
                "@type": "Recipe",
                "name": "Tart",
                "image": {"url": "//cdn.example.com/tart.jpg"},
                "recipeIngredient": ["3 apples"],
                "recipeInstructions": ["Slice apples. Bake the tart."]
            }
            "#,
        );
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(
            extraction.image_url.as_deref(),
            Some("https://cdn.example.com/tart.jpg")
        );
    }

    #[test]
    fn test_no_recipe_node() {
        let context = document_with(r#"{"@type": "WebSite", "name": "Not food"}"#);
        assert_eq!(
            JsonLdExtractor.extract(&context),
            Err(ParseError::NoRecipeFound)
        );
    }

    #[test]
    fn test_missing_steps_is_specific() {
        let context = document_with(
            r#"
            {
                "@type": "Recipe",
                "name": "Mystery",
                "recipeIngredient": ["1 cup of something"]
            }
            "#,
        );
        assert_eq!(
            JsonLdExtractor.extract(&context),
            Err(ParseError::NoStepsFound)
        );
    }

    #[test]
    fn test_partial_block_loses_to_full_block() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
                {"@type": "Recipe", "name": "Partial", "recipeIngredient": ["1 egg"]}
            </script>
            <script type="application/ld+json">
                {"@type": "Recipe", "name": "Full",
                 "recipeIngredient": ["2 eggs"],
                 "recipeInstructions": ["Scramble the eggs. Serve hot."]}
            </script>
            </head><body></body></html>
        "#;
        let context = ParsingContext::new(html, None);
        let extraction = JsonLdExtractor.extract(&context).unwrap();
        assert_eq!(extraction.title.as_deref(), Some("Full"));
    }
}
