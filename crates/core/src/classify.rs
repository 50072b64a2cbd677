//! Content disambiguation.
//!
//! A section body is classified by looking at every non-blank line:
//!
//! ```text
//! List    every line starts with a bullet marker        - item
//! Metric  every line is  lower_ident: num / num [unit]   entry_loc: 142 / 200 lines
//! Map     every line is  UPPER_IDENT: rest               MAX_TOKENS: 4000
//! Text    anything else (lines joined with '\n')
//! ```
//!
//! Metric and Map never overlap because of the case of the leading
//! identifier. The parser and every piece of code that builds sections by
//! hand go through this module so the two can never disagree.

use crate::document::{Content, MapEntry, MetricEntry};
use regex_lite::Regex;
use std::sync::LazyLock;

static METRIC_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z][a-z0-9_]*):\s*(-?\d+(?:\.\d+)?)\s*/\s*(-?\d+(?:\.\d+)?)(?:\s+(.*))?$")
        .expect("metric line pattern is valid")
});

static MAP_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z0-9_]*):(?:\s+(.*))?$").expect("map line pattern is valid")
});

static METRIC_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("metric key pattern is valid"));

/// Bullet markers accepted at the start of a list line.
const BULLET_MARKERS: [char; 3] = ['-', '*', '•'];

/// Strip a bullet marker. `None` if the line is not a bullet.
///
/// The marker must be followed by whitespace or end the line, so `**bold**`
/// and `-3` are not bullets.
pub fn bullet_item(line: &str) -> Option<&str> {
    let line = line.trim();
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !BULLET_MARKERS.contains(&marker) {
        return None;
    }
    let rest = chars.as_str();
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

/// Parse `lower_ident: value / ceiling [unit]`.
pub fn parse_metric_line(line: &str) -> Option<MetricEntry> {
    let caps = METRIC_LINE.captures(line.trim())?;
    let value = caps.get(2)?.as_str().parse::<f64>().ok()?;
    let ceiling = caps.get(3)?.as_str().parse::<f64>().ok()?;
    let unit = caps.get(4).map(|m| m.as_str().trim()).unwrap_or_default();
    Some(MetricEntry::new(&caps[1], value, ceiling, unit))
}

/// Parse `UPPER_IDENT: rest`. Never matches a metric line.
pub fn parse_map_line(line: &str) -> Option<MapEntry> {
    let caps = MAP_LINE.captures(line.trim())?;
    let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
    Some(MapEntry::new(&caps[1], value))
}

/// Apply the disambiguation rule to a section body.
///
/// Lines are trimmed and blank lines ignored. An empty body is an empty Text.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Content {
    let lines: Vec<&str> = lines
        .iter()
        .map(|l| l.as_ref().trim())
        .filter(|l| !l.is_empty())
        .collect();

    if lines.is_empty() {
        return Content::text("");
    }

    if let Some(items) = lines.iter().map(|l| bullet_item(l)).collect::<Option<Vec<_>>>() {
        return Content::list(items);
    }
    if let Some(entries) = lines
        .iter()
        .map(|l| parse_metric_line(l))
        .collect::<Option<Vec<_>>>()
    {
        return Content::metric(entries);
    }
    if let Some(entries) = lines
        .iter()
        .map(|l| parse_map_line(l))
        .collect::<Option<Vec<_>>>()
    {
        return Content::map(entries);
    }

    Content::text(lines.join("\n"))
}

/// Decorative filler the parser drops: code fences and horizontal rules
/// such as `---`, `===` or `***`.
pub fn is_noise_line(trimmed: &str) -> bool {
    if trimmed.starts_with("```") {
        return true;
    }
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) if matches!(first, '-' | '=' | '*' | '_' | '~') => {
            trimmed.chars().count() >= 3 && chars.all(|c| c == first)
        }
        _ => false,
    }
}

/// Check that hand-built content would survive a format/parse round trip
/// as the same content.
///
/// Collections must be non-empty: an empty list, map or metric block has no
/// body and reads back as an empty Text.
pub fn check_content(content: &Content) -> Result<(), String> {
    match content {
        Content::Text { value } => check_text(value),
        Content::List { items } => {
            if items.is_empty() {
                return Err("an empty list has no text form; remove the section instead".into());
            }
            if let Some(item) = items.iter().find(|i| i.contains('\n')) {
                return Err(format!("list item spans multiple lines: {item:?}"));
            }
            if let Some(item) = items.iter().find(|i| i.trim() != i.as_str()) {
                return Err(format!("list item has surrounding whitespace: {item:?}"));
            }
            Ok(())
        }
        Content::Map { entries } => {
            if entries.is_empty() {
                return Err("an empty map has no text form; remove the section instead".into());
            }
            for entry in entries {
                if !crate::vocabulary::is_valid_key(&entry.key) {
                    return Err(format!(
                        "map key '{}' must match [A-Z][A-Z0-9_]*",
                        entry.key
                    ));
                }
                if entry.value.contains('\n') {
                    return Err(format!("map value for '{}' spans multiple lines", entry.key));
                }
                if entry.value.trim() != entry.value {
                    return Err(format!(
                        "map value for '{}' has surrounding whitespace",
                        entry.key
                    ));
                }
            }
            Ok(())
        }
        Content::Metric { entries } => {
            if entries.is_empty() {
                return Err(
                    "an empty metric block has no text form; remove the section instead".into(),
                );
            }
            for entry in entries {
                if !METRIC_KEY.is_match(&entry.key) {
                    return Err(format!(
                        "metric key '{}' must match [a-z][a-z0-9_]*",
                        entry.key
                    ));
                }
                if !entry.value.is_finite() || !entry.ceiling.is_finite() {
                    return Err(format!("metric '{}' has a non-finite number", entry.key));
                }
                if entry.unit.contains('\n') || entry.unit.trim() != entry.unit {
                    return Err(format!(
                        "metric unit for '{}' must be a single trimmed line",
                        entry.key
                    ));
                }
            }
            Ok(())
        }
    }
}

/// Text must read back as the very same Text: no blank, untrimmed or noise
/// lines, and no body that classifies as a list, map or metric block.
fn check_text(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Ok(());
    }
    let lines: Vec<&str> = value.split('\n').collect();
    for line in &lines {
        if line.trim().is_empty() {
            return Err("text holds a blank line".into());
        }
        if line.trim() != *line {
            return Err(format!("text line has surrounding whitespace: {line:?}"));
        }
        if is_noise_line(line) {
            return Err(format!("text line {line:?} would be dropped as a rule or fence"));
        }
    }
    match classify_lines(&lines) {
        Content::Text { value: reread } if reread == value => Ok(()),
        other => Err(format!(
            "text would read back as {} content; use that content type instead",
            other.content_type()
        )),
    }
}
