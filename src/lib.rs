//! recipe-distill: rule-driven extraction of structured recipes from HTML,
//! social captions, and plain pasted text.
//!
//! The whole pipeline is a pure function from text to an
//! [`AssembledRecipe`]; no I/O happens here. Fetching documents, persisting
//! results, and rendering them are the caller's concern.

pub mod assemble;
pub mod classify;
pub mod duration;
pub mod error;
pub mod extract;
pub mod model;
pub mod platform;
pub mod quantity;
pub mod textutil;
pub mod timer;

use log::debug;
use url::Url;

pub use crate::assemble::Overrides;
pub use crate::classify::{ClassifierHint, LineClassifier};
pub use crate::error::ParseError;
pub use crate::model::{
    AssembledRecipe, CookStep, Ingredient, LineLabel, Quantity, RawLine, SectionItems, TimerSpec,
    UnitKind,
};
pub use crate::platform::{CleanedCaption, Platform};

use crate::extract::ParsingContext;

/// Recipe parser with a pluggable classifier. The default is the fully
/// deterministic rule engine.
#[derive(Default)]
pub struct RecipeParser {
    classifier: LineClassifier,
}

impl RecipeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult a statistical hint ahead of the deterministic rules,
    /// gated on [`classify::DEFAULT_HINT_THRESHOLD`].
    pub fn with_hint(hint: Box<dyn ClassifierHint>) -> Self {
        Self {
            classifier: LineClassifier::with_hint(hint, classify::DEFAULT_HINT_THRESHOLD),
        }
    }

    /// Same, with an explicit confidence threshold.
    pub fn with_hint_threshold(hint: Box<dyn ClassifierHint>, threshold: f32) -> Self {
        Self {
            classifier: LineClassifier::with_hint(hint, threshold),
        }
    }

    /// Parse an HTML document: structured JSON-LD first, markup heuristics
    /// as the fallback.
    pub fn parse_html(
        &self,
        html: &str,
        source_url: Option<&str>,
    ) -> Result<AssembledRecipe, ParseError> {
        if let Some(url) = source_url {
            Url::parse(url).map_err(|_| ParseError::InvalidSource(url.to_string()))?;
        }

        let context = ParsingContext::new(html, source_url);
        let extraction = extract::extract_document(&context)?;
        debug!(
            "extraction: {} ingredient lines, {} step lines",
            extraction.ingredient_lines.len(),
            extraction.step_lines.len()
        );

        let overrides = Overrides {
            title: extraction.title.clone(),
            yields: extraction.yields.clone(),
            total_minutes: extraction.total_minutes,
            image_url: extraction.image_url.clone(),
            tags: extraction.tags.clone(),
            source_url: source_url.map(str::to_string),
            source_title: extract::source_title(source_url),
        };
        let lines = extraction.raw_lines();
        ensure_content(assemble::assemble(&lines, overrides, &self.classifier))
    }

    /// Parse plain pasted text.
    pub fn parse_text(&self, text: &str) -> Result<AssembledRecipe, ParseError> {
        let lines: Vec<RawLine> = text
            .lines()
            .enumerate()
            .map(|(index, line)| RawLine::new(index, line))
            .collect();
        ensure_content(assemble::assemble(
            &lines,
            Overrides::default(),
            &self.classifier,
        ))
    }

    /// Parse a pre-cleaned line list from a platform adapter, with any
    /// metadata the adapter recovered.
    pub fn parse_lines(
        &self,
        lines: &[String],
        overrides: Overrides,
    ) -> Result<AssembledRecipe, ParseError> {
        let raw: Vec<RawLine> = lines
            .iter()
            .enumerate()
            .map(|(index, line)| RawLine::new(index, line.clone()))
            .collect();
        ensure_content(assemble::assemble(&raw, overrides, &self.classifier))
    }

    /// Parse a social caption for a known platform post URL.
    pub fn parse_caption(
        &self,
        post_url: &str,
        caption: &str,
    ) -> Result<AssembledRecipe, ParseError> {
        let platform = Platform::from_url(post_url)?;
        let cleaned = platform.clean_caption(caption);
        let overrides = Overrides {
            tags: cleaned.tags,
            source_url: Some(post_url.to_string()),
            source_title: extract::source_title(Some(post_url)),
            ..Overrides::default()
        };
        self.parse_lines(&cleaned.lines, overrides)
    }
}

/// Parse an HTML document with the deterministic rule engine.
pub fn parse_html(html: &str, source_url: Option<&str>) -> Result<AssembledRecipe, ParseError> {
    RecipeParser::new().parse_html(html, source_url)
}

/// Parse plain pasted text with the deterministic rule engine.
pub fn parse_text(text: &str) -> Result<AssembledRecipe, ParseError> {
    RecipeParser::new().parse_text(text)
}

/// Emptiness is judged here, once, after assembly; the assembler itself
/// never errors.
fn ensure_content(recipe: AssembledRecipe) -> Result<AssembledRecipe, ParseError> {
    if recipe.ingredients.is_empty() {
        return Err(ParseError::NoIngredientsFound);
    }
    if recipe.steps.is_empty() {
        return Err(ParseError::NoStepsFound);
    }
    Ok(recipe)
}
