//! Thin adapters for social-media captions.
//!
//! Platform captions arrive as one escaped blob full of hashtags and
//! engagement counters. The adapter turns that into the clean line list the
//! core consumes; everything recipe-shaped stays untouched.

use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Instagram,
    TikTok,
    YouTube,
    Pinterest,
}

impl Platform {
    /// Detect the platform from a post URL.
    pub fn from_url(url: &str) -> Result<Self, ParseError> {
        let parsed =
            Url::parse(url).map_err(|_| ParseError::InvalidSource(url.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| ParseError::InvalidSource(url.to_string()))?
            .trim_start_matches("www.");

        if host.ends_with("instagram.com") {
            Ok(Platform::Instagram)
        } else if host.ends_with("tiktok.com") {
            Ok(Platform::TikTok)
        } else if host.ends_with("youtube.com") || host == "youtu.be" {
            Ok(Platform::YouTube)
        } else if host.ends_with("pinterest.com") || host.ends_with("pin.it") {
            Ok(Platform::Pinterest)
        } else {
            Err(ParseError::PlatformNotSupported(host.to_string()))
        }
    }

    /// Clean a raw caption into content lines plus any hashtags found.
    pub fn clean_caption(&self, caption: &str) -> CleanedCaption {
        clean_caption(caption)
    }
}

/// Adapter output: cleaned lines ready for the core, hashtags as tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedCaption {
    pub lines: Vec<String>,
    pub tags: Vec<String>,
}

static COUNTER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[\d,.]+\s*[km]?\s*(likes?|comments?|views?|shares?|followers?)\b")
        .unwrap()
});
static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[\w\p{L}]+").unwrap());

fn clean_caption(caption: &str) -> CleanedCaption {
    let unescaped = unescape_json(caption);
    let decoded = crate::textutil::decode_entities(&unescaped);

    let mut lines = Vec::new();
    let mut tags: Vec<String> = Vec::new();

    for raw_line in decoded.lines() {
        let line = crate::textutil::collapse_whitespace(raw_line);
        if line.is_empty() {
            continue;
        }
        // engagement counters are platform chrome, not content
        if COUNTER_LINE_RE.is_match(&line) {
            continue;
        }
        for tag in HASHTAG_RE.find_iter(&line) {
            let name = tag.as_str().trim_start_matches('#');
            if !tags.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                tags.push(name.to_string());
            }
        }
        let without_tags =
            crate::textutil::collapse_whitespace(&HASHTAG_RE.replace_all(&line, ""));
        if !without_tags.is_empty() {
            lines.push(without_tags);
        }
    }

    CleanedCaption { lines, tags }
}

/// Undo JSON string escapes left in scraped caption payloads.
fn unescape_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => {}
            Some('"') => out.push('"'),
            Some('/') => out.push('/'),
            Some('\\') => out.push('\\'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                if let Some(decoded) = u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    out.push(decoded);
                } else {
                    out.push_str("\\u");
                    out.push_str(&code);
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        assert_eq!(
            Platform::from_url("https://www.instagram.com/p/abc123/"),
            Ok(Platform::Instagram)
        );
        assert_eq!(
            Platform::from_url("https://vm.tiktok.com/xyz"),
            Ok(Platform::TikTok)
        );
        assert_eq!(
            Platform::from_url("https://youtu.be/dQw4w9WgXcQ"),
            Ok(Platform::YouTube)
        );
        assert_eq!(
            Platform::from_url("https://example.com/recipe"),
            Err(ParseError::PlatformNotSupported("example.com".to_string()))
        );
        assert!(matches!(
            Platform::from_url("not a url"),
            Err(ParseError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_caption_cleanup() {
        let caption = "1,234 likes\\nEasy Weeknight Pasta\\nIngredients:\\n2 cups pasta\\n#easyrecipe #pasta";
        let cleaned = Platform::Instagram.clean_caption(caption);
        assert_eq!(
            cleaned.lines,
            vec!["Easy Weeknight Pasta", "Ingredients:", "2 cups pasta"]
        );
        assert_eq!(cleaned.tags, vec!["easyrecipe", "pasta"]);
    }

    #[test]
    fn test_entity_and_unicode_unescape() {
        let caption = "Mac &amp; Cheese\\nAdd \\u00bd cup milk";
        let cleaned = Platform::TikTok.clean_caption(caption);
        assert_eq!(cleaned.lines, vec!["Mac & Cheese", "Add ½ cup milk"]);
    }

    #[test]
    fn test_hashtag_only_line_dropped() {
        let cleaned = Platform::Instagram.clean_caption("#food #yum\nServe warm.");
        assert_eq!(cleaned.lines, vec!["Serve warm."]);
        assert_eq!(cleaned.tags, vec!["food", "yum"]);
    }
}
