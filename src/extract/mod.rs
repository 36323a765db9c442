//! Document extraction strategies.
//!
//! The structured JSON-LD walk is tried first; markup-pattern scanning is
//! the fallback. Each strategy reduces the document to candidate lines plus
//! whatever metadata it can recover directly; classification and assembly
//! happen downstream.

use crate::error::ParseError;
use crate::model::RawLine;
use log::debug;
use scraper::Html;
use url::Url;

mod html_class;
mod json_ld;

pub use html_class::HtmlClassExtractor;
pub use json_ld::JsonLdExtractor;

/// Parsed document plus the originating URL (used only for relative-link
/// resolution and source attribution).
pub struct ParsingContext {
    pub document: Html,
    pub url: Option<String>,
}

impl ParsingContext {
    pub fn new(html: &str, url: Option<&str>) -> Self {
        Self {
            document: Html::parse_document(html),
            url: url.map(str::to_string),
        }
    }
}

/// What a strategy recovered from the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub title: Option<String>,
    pub ingredient_lines: Vec<String>,
    pub step_lines: Vec<String>,
    pub note_lines: Vec<String>,
    pub yields: Option<String>,
    pub total_minutes: Option<u32>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

impl Extraction {
    /// Flatten the extraction into an ordered candidate-line stream with
    /// explicit headers, ready for classification and assembly.
    pub fn raw_lines(&self) -> Vec<RawLine> {
        let mut lines: Vec<String> = Vec::new();
        if !self.ingredient_lines.is_empty() {
            lines.push("Ingredients:".to_string());
            lines.extend(self.ingredient_lines.iter().cloned());
        }
        if !self.step_lines.is_empty() {
            lines.push("Instructions:".to_string());
            lines.extend(self.step_lines.iter().cloned());
        }
        if !self.note_lines.is_empty() {
            lines.push("Notes:".to_string());
            lines.extend(self.note_lines.iter().cloned());
        }
        lines
            .into_iter()
            .enumerate()
            .map(|(index, text)| RawLine::new(index, text))
            .collect()
    }
}

pub trait Extractor {
    fn extract(&self, context: &ParsingContext) -> Result<Extraction, ParseError>;
}

/// Run the strategy chain over a document: structured first, heuristic as
/// the fallback. Only when both fail does an error surface.
pub fn extract_document(context: &ParsingContext) -> Result<Extraction, ParseError> {
    match JsonLdExtractor.extract(context) {
        Ok(extraction) => Ok(extraction),
        Err(structured_err) => {
            debug!("structured extraction failed: {structured_err}, trying heuristic");
            match HtmlClassExtractor.extract(context) {
                Ok(extraction) => Ok(extraction),
                Err(heuristic_err) => Err(pick_error(structured_err, heuristic_err)),
            }
        }
    }
}

/// Prefer the more specific failure over a bare "no recipe".
fn pick_error(structured: ParseError, heuristic: ParseError) -> ParseError {
    match (&structured, &heuristic) {
        (_, ParseError::NoIngredientsFound) | (_, ParseError::NoStepsFound) => heuristic,
        (ParseError::NoIngredientsFound, _) | (ParseError::NoStepsFound, _) => structured,
        _ => ParseError::NoRecipeFound,
    }
}

/// Resolve an image reference against the source URL. Accepts absolute
/// http(s) URLs, protocol-relative `//…`, and document-relative `/…`;
/// anything else is rejected.
pub(crate) fn resolve_image_url(raw: &str, source_url: Option<&str>) -> Option<String> {
    let raw = raw.trim();
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }
    if raw.starts_with('/') {
        let base = Url::parse(source_url?).ok()?;
        return base.join(raw).ok().map(|u| u.to_string());
    }
    None
}

/// Host-derived attribution for the source, `www.` stripped.
pub(crate) fn source_title(source_url: Option<&str>) -> Option<String> {
    let url = Url::parse(source_url?).ok()?;
    let host = url.host_str()?;
    Some(host.trim_start_matches("www.").to_string())
}
