//! ADF parser.
//!
//! Two passes with no shared state: a line lexer that classifies every raw
//! line, and a builder that groups lexed lines into sections and hands each
//! body to the shared content classifier.
//!
//! Grammar (informal):
//! ```text
//! document = [version] section*
//! version  = "ADF:" VERSION
//! section  = header body*
//! header   = [glyph] KEY ["[" weight "]"] ":" [inline]      (column 0)
//! body     = INDENT line
//! weight   = "load-bearing" | "advisory"
//! ```
//!
//! The lexer is tolerant: CRLF endings, trailing whitespace, markdown heading
//! markers, horizontal rules, code fences and stray text before the first
//! header are all absorbed rather than rejected.

use adf_core::classify::{classify_lines, is_noise_line};
use adf_core::vocabulary::normalize_key;
use adf_core::{ADF_VERSION, Document, ParseError, ParseResult, Section, Weight};
use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][A-Z0-9_-]*)\s*(?:\[([^\]]*)\])?\s*:(.*)$")
        .expect("header pattern is valid")
});

/// Key of the version declaration line.
const VERSION_KEY: &str = "ADF";

/// Parse raw ADF text into a [`Document`].
///
/// Fails only on a malformed or unsupported version declaration.
pub fn parse(raw: &str) -> ParseResult<Document> {
    let text = normalize_newlines(raw);
    let mut doc = Document::new();
    let mut current: Option<PendingSection<'_>> = None;
    let mut seen_header = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        match lex_line(raw_line) {
            Line::Blank | Line::Noise => {}
            Line::Header(header) if !seen_header && header.key == VERSION_KEY => {
                seen_header = true;
                doc.version = check_version(header.inline, line_no)?;
            }
            Line::Header(header) => {
                seen_header = true;
                if let Some(pending) = current.take() {
                    doc.sections.push(pending.finish());
                }
                current = Some(PendingSection::open(header, line_no));
            }
            Line::Body(body) => match current.as_mut() {
                Some(pending) => pending.lines.push(body),
                None => debug!(line = line_no, "ignoring text before the first section"),
            },
        }
    }

    if let Some(pending) = current.take() {
        doc.sections.push(pending.finish());
    }

    Ok(doc)
}

fn normalize_newlines(raw: &str) -> String {
    raw.strip_prefix('\u{feff}')
        .unwrap_or(raw)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

fn check_version(declared: &str, line_no: usize) -> ParseResult<String> {
    let declared = declared.trim();
    if declared.is_empty() {
        return Err(ParseError::at_line("missing ADF version after 'ADF:'", line_no));
    }
    if declared != ADF_VERSION {
        return Err(ParseError::at_line(
            format!("unsupported ADF version '{declared}' (expected {ADF_VERSION})"),
            line_no,
        ));
    }
    Ok(declared.to_string())
}

// ─── Lexer ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Line<'a> {
    Blank,
    /// Decorative filler: horizontal rules, code fences.
    Noise,
    Header(Header<'a>),
    /// Trimmed body text.
    Body(&'a str),
}

#[derive(Debug, PartialEq)]
struct Header<'a> {
    decoration: Option<&'a str>,
    key: String,
    weight: Option<Weight>,
    /// Tag inside `[...]` that is not a known weight.
    unknown_tag: Option<&'a str>,
    inline: &'a str,
}

fn lex_line(line: &str) -> Line<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Line::Blank;
    }
    if is_noise_line(trimmed) {
        return Line::Noise;
    }
    if let Some(header) = lex_header(line) {
        return Line::Header(header);
    }
    Line::Body(trimmed)
}

/// Headers start in column 0; anything indented is body text.
fn lex_header(line: &str) -> Option<Header<'_>> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let line = line.trim_end();

    // Markdown heading markers are accepted and dropped.
    let rest = if line.starts_with('#') {
        line.trim_start_matches('#').trim_start()
    } else {
        line
    };

    let glyph_len = rest
        .char_indices()
        .find(|(_, c)| c.is_ascii() || c.is_whitespace() || c.is_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    let (glyph, rest) = rest.split_at(glyph_len);
    let rest = rest.trim_start();

    let caps = HEADER.captures(rest)?;
    let (weight, unknown_tag) = match caps.get(2) {
        Some(tag) => match Weight::from_tag(tag.as_str()) {
            Some(weight) => (Some(weight), None),
            None => (None, Some(tag.as_str())),
        },
        None => (None, None),
    };

    Some(Header {
        decoration: (!glyph.is_empty()).then_some(glyph),
        key: normalize_key(caps.get(1)?.as_str()),
        weight,
        unknown_tag,
        inline: caps.get(3).map(|m| m.as_str().trim()).unwrap_or_default(),
    })
}

// ─── Builder ─────────────────────────────────────────────────────────

struct PendingSection<'a> {
    key: String,
    decoration: Option<&'a str>,
    weight: Option<Weight>,
    lines: Vec<&'a str>,
}

impl<'a> PendingSection<'a> {
    fn open(header: Header<'a>, line_no: usize) -> Self {
        if let Some(tag) = header.unknown_tag {
            debug!(
                line = line_no,
                key = %header.key,
                tag,
                "dropping unrecognised weight tag"
            );
        }
        let mut lines = Vec::new();
        if !header.inline.is_empty() && !is_noise_line(header.inline) {
            lines.push(header.inline);
        }
        Self {
            key: header.key,
            decoration: header.decoration,
            weight: header.weight,
            lines,
        }
    }

    fn finish(self) -> Section {
        Section {
            key: self.key,
            decoration: self.decoration.map(str::to_string),
            content: classify_lines(&self.lines),
            weight: self.weight,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use adf_core::{Content, ContentType, MapEntry, MetricEntry};

    #[test]
    fn single_text_section() {
        let doc = parse("TASK: Build feature").unwrap();
        assert_eq!(doc.version, ADF_VERSION);
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].key, "TASK");
        assert_eq!(doc.sections[0].decoration, None);
        assert_eq!(doc.sections[0].content, Content::text("Build feature"));
    }

    #[test]
    fn empty_and_version_only_inputs() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n\n  \n").unwrap().is_empty());
        let doc = parse("ADF: 0.1\n").unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.version, "0.1");
    }

    #[test]
    fn unsupported_version_is_an_error() {
        let err = parse("\nADF: 2.0\nTASK: x").unwrap_err();
        assert_eq!(err.line, Some(2));
        assert!(err.message.contains("2.0"));
    }

    #[test]
    fn empty_version_is_an_error() {
        let err = parse("ADF:\nTASK: x").unwrap_err();
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn decorations_and_weights() {
        let raw = "ADF: 0.1\n⚠️ CONSTRAINTS [load-bearing]:\n  - No new deps\n📋 CONTEXT [advisory]:\n  - React 18\n";
        let doc = parse(raw).unwrap();
        let constraints = doc.section("CONSTRAINTS").unwrap();
        assert_eq!(constraints.decoration.as_deref(), Some("⚠️"));
        assert_eq!(constraints.weight, Some(Weight::LoadBearing));
        assert_eq!(constraints.content, Content::list(["No new deps"]));
        assert_eq!(doc.section("CONTEXT").unwrap().weight, Some(Weight::Advisory));
    }

    #[test]
    fn glyph_without_space_and_markdown_heading() {
        let doc = parse("🎯TASK: a\n## RULES:\n  - b").unwrap();
        assert_eq!(doc.sections[0].decoration.as_deref(), Some("🎯"));
        assert_eq!(doc.sections[1].key, "RULES");
        assert_eq!(doc.sections[1].decoration, None);
    }

    #[test]
    fn unknown_weight_tag_degrades_to_untagged() {
        let doc = parse("RISKS [critical]:\n  - outage").unwrap();
        assert_eq!(doc.sections[0].key, "RISKS");
        assert_eq!(doc.sections[0].weight, None);
    }

    #[test]
    fn hyphenated_keys_are_normalized() {
        let doc = parse("ON-DEMAND:\n  - ui.adf").unwrap();
        assert_eq!(doc.sections[0].key, "ON_DEMAND");
    }

    #[test]
    fn metric_section() {
        let doc = parse("📊 METRICS:\n  entry_loc: 142 / 200 lines\n  deps: 3 / 5").unwrap();
        assert_eq!(
            doc.sections[0].content,
            Content::metric(vec![
                MetricEntry::new("entry_loc", 142.0, 200.0, "lines"),
                MetricEntry::new("deps", 3.0, 5.0, ""),
            ])
        );
    }

    #[test]
    fn map_section() {
        let doc = parse("💰 BUDGET:\n  MAX_TOKENS: 4000\n  MODE: strict").unwrap();
        assert_eq!(
            doc.sections[0].content,
            Content::map(vec![
                MapEntry::new("MAX_TOKENS", "4000"),
                MapEntry::new("MODE", "strict"),
            ])
        );
    }

    #[test]
    fn mixed_body_is_text() {
        let doc = parse("CONTEXT: Intro line\n  more detail\n  - not all bullets").unwrap();
        assert_eq!(
            doc.sections[0].content,
            Content::text("Intro line\nmore detail\n- not all bullets")
        );
    }

    #[test]
    fn inline_bullet_joins_list_body() {
        let doc = parse("RULES: - first\n  - second").unwrap();
        assert_eq!(doc.sections[0].content, Content::list(["first", "second"]));
    }

    #[test]
    fn tolerates_crlf_noise_and_preamble() {
        let raw = "Here is your context:\r\n```adf\r\nADF: 0.1\r\n---\r\n🎯 TASK: Ship it   \r\n\r\n📋 CONTEXT:\r\n  - one\r\n  ---\r\n  - two\r\n```\r\n";
        let doc = parse(raw).unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[0].content, Content::text("Ship it"));
        assert_eq!(doc.sections[1].content, Content::list(["one", "two"]));
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let doc = parse("NOTES: a\nNOTES: b").unwrap();
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[1].content, Content::text("b"));
    }

    #[test]
    fn indented_header_shape_is_body() {
        let doc = parse("CONTEXT:\n  TASK: nested").unwrap();
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(doc.sections[0].content.content_type(), ContentType::Map);
    }

    #[test]
    fn lexer_classifies_lines() {
        assert_eq!(lex_line("   "), Line::Blank);
        assert_eq!(lex_line("====="), Line::Noise);
        assert_eq!(lex_line("```"), Line::Noise);
        assert_eq!(lex_line("  - item "), Line::Body("- item"));
        assert!(matches!(lex_line("TASK: x"), Line::Header(h) if h.key == "TASK" && h.inline == "x"));
        assert_eq!(lex_line("lowercase: x"), Line::Body("lowercase: x"));
    }
}
