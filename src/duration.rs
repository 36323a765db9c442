use once_cell::sync::Lazy;
use regex::Regex;

static ISO_HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)H").unwrap());
static ISO_MINUTES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)M").unwrap());

/// Parse an ISO-8601-style duration fragment (`PT1H30M`, `PT45M`) into a
/// minute count. Only hour and minute components are recognized; a fragment
/// with neither yields `None`.
pub fn iso8601_minutes(text: &str) -> Option<u32> {
    let body = text.trim().strip_prefix("PT").or_else(|| {
        // Some sites emit the date-time form P0DT1H30M
        text.trim().split_once('T').map(|(_, rest)| rest)
    })?;

    let hours = ISO_HOURS_RE
        .captures(body)
        .and_then(|c| c[1].parse::<u32>().ok());
    let minutes = ISO_MINUTES_RE
        .captures(body)
        .and_then(|c| c[1].parse::<u32>().ok());

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0) * 60 + m.unwrap_or(0)),
    }
}

static HUMAN_HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:hours?|hrs?|h)\b").unwrap());
static HUMAN_MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(?:minutes?|mins?|m)\b").unwrap());
static BARE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*$").unwrap());

/// Parse a human duration phrase ("1 hour 20 minutes", "45 min", "90") into
/// a minute count. A bare number is read as minutes.
pub fn human_minutes(text: &str) -> Option<u32> {
    if let Some(caps) = BARE_NUMBER_RE.captures(text) {
        return caps[1].parse().ok();
    }

    let hours = HUMAN_HOURS_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok());
    // Skip the hour match so "1 h 30 m" doesn't read the hour digits twice
    let minute_search = match HUMAN_HOURS_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    };
    let minutes = HUMAN_MINUTES_RE
        .captures(minute_search)
        .and_then(|c| c[1].parse::<u32>().ok());

    match (hours, minutes) {
        (None, None) => None,
        (h, m) => Some(h.unwrap_or(0) * 60 + m.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_minutes() {
        assert_eq!(iso8601_minutes("PT30M"), Some(30));
        assert_eq!(iso8601_minutes("PT1H"), Some(60));
        assert_eq!(iso8601_minutes("PT1H30M"), Some(90));
        assert_eq!(iso8601_minutes("PT2H15M"), Some(135));
        assert_eq!(iso8601_minutes("P0DT1H10M"), Some(70));
        assert_eq!(iso8601_minutes("PT0M"), Some(0));
        assert_eq!(iso8601_minutes("PT300S"), None);
        assert_eq!(iso8601_minutes("invalid"), None);
        assert_eq!(iso8601_minutes(""), None);
    }

    #[test]
    fn test_human_minutes() {
        assert_eq!(human_minutes("45 minutes"), Some(45));
        assert_eq!(human_minutes("1 hour 20 minutes"), Some(80));
        assert_eq!(human_minutes("2 hrs"), Some(120));
        assert_eq!(human_minutes("35 min"), Some(35));
        assert_eq!(human_minutes("90"), Some(90));
        assert_eq!(human_minutes("overnight"), None);
    }
}
