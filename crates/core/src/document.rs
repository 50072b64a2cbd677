//! Document model: the AST every ADF operation works on.

use serde::{Deserialize, Serialize};

/// The only ADF version this engine reads and writes.
pub const ADF_VERSION: &str = "0.1";

// ── Document ─────────────────────────────────────────────────────────────

/// A parsed ADF document: a version plus an ordered sequence of sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version, always [`ADF_VERSION`] for documents built by this crate.
    pub version: String,
    /// Sections in parse / insertion order.
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document at the supported version.
    pub fn new() -> Self {
        Self {
            version: ADF_VERSION.to_string(),
            sections: Vec::new(),
        }
    }

    /// Builder-style section append.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// First section with the given key.
    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Mutable access to the first section with the given key.
    pub fn section_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.key == key)
    }

    /// Index of the first section with the given key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every metric entry in the document, paired with its owning section.
    pub fn metric_entries(&self) -> impl Iterator<Item = (&Section, &MetricEntry)> {
        self.sections.iter().flat_map(|section| {
            let entries: &[MetricEntry] = match &section.content {
                Content::Metric { entries } => entries,
                _ => &[],
            };
            entries.iter().map(move |entry| (section, entry))
        })
    }

    /// Sections tagged `[load-bearing]`.
    pub fn load_bearing_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_load_bearing())
    }
}

// ── Section ──────────────────────────────────────────────────────────────

/// Governance weight of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Weight {
    /// Content the task cannot be done correctly without.
    LoadBearing,
    /// Helpful but droppable content.
    Advisory,
}

impl Weight {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadBearing => "load-bearing",
            Self::Advisory => "advisory",
        }
    }

    /// Lenient tag lookup: case-insensitive, `_` and spaces accepted for `-`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .trim()
            .chars()
            .map(|c| match c {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "load-bearing" | "loadbearing" => Some(Self::LoadBearing),
            "advisory" => Some(Self::Advisory),
            _ => None,
        }
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyed unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Canonical identifier, e.g. `TASK` or `CONSTRAINTS`.
    pub key: String,
    /// Leading glyph as written in the source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decoration: Option<String>,
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl Section {
    pub fn new(key: impl Into<String>, content: Content) -> Self {
        Self {
            key: key.into(),
            decoration: None,
            content,
            weight: None,
        }
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn with_decoration(mut self, decoration: impl Into<String>) -> Self {
        self.decoration = Some(decoration.into());
        self
    }

    pub fn is_load_bearing(&self) -> bool {
        self.weight == Some(Weight::LoadBearing)
    }
}

// ── Content ──────────────────────────────────────────────────────────────

/// A `KEY: value` pair inside a Map section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: String,
    pub value: String,
}

impl MapEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A `key: value / ceiling unit` measurement inside a Metric section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub key: String,
    pub value: f64,
    pub ceiling: f64,
    #[serde(default)]
    pub unit: String,
}

impl MetricEntry {
    pub fn new(key: impl Into<String>, value: f64, ceiling: f64, unit: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value,
            ceiling,
            unit: unit.into(),
        }
    }
}

/// The body of a section. Exactly one of four shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { value: String },
    List { items: Vec<String> },
    Map { entries: Vec<MapEntry> },
    Metric { entries: Vec<MetricEntry> },
}

impl Content {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn map(entries: Vec<MapEntry>) -> Self {
        Self::Map { entries }
    }

    pub fn metric(entries: Vec<MetricEntry>) -> Self {
        Self::Metric { entries }
    }

    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text { .. } => ContentType::Text,
            Self::List { .. } => ContentType::List,
            Self::Map { .. } => ContentType::Map,
            Self::Metric { .. } => ContentType::Metric,
        }
    }

    /// Number of items / entries; a Text counts as one line per `\n` segment.
    pub fn len(&self) -> usize {
        match self {
            Self::Text { value } if value.is_empty() => 0,
            Self::Text { value } => value.lines().count(),
            Self::List { items } => items.len(),
            Self::Map { entries } => entries.len(),
            Self::Metric { entries } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Discriminant of [`Content`], used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    List,
    Map,
    Metric,
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::List => write!(f, "list"),
            Self::Map => write!(f, "map"),
            Self::Metric => write!(f, "metric"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new()
            .with_section(Section::new("TASK", Content::text("Build feature")))
            .with_section(
                Section::new("CONSTRAINTS", Content::list(["No new deps", "Keep API"]))
                    .with_weight(Weight::LoadBearing),
            )
            .with_section(Section::new(
                "METRICS",
                Content::metric(vec![
                    MetricEntry::new("entry_loc", 142.0, 200.0, "lines"),
                    MetricEntry::new("bundle_kb", 80.0, 100.0, "kb"),
                ]),
            ))
    }

    #[test]
    fn new_document_uses_supported_version() {
        let doc = Document::new();
        assert_eq!(doc.version, ADF_VERSION);
        assert!(doc.is_empty());
    }

    #[test]
    fn section_lookup_returns_first_match() {
        let doc = sample().with_section(Section::new("TASK", Content::text("second")));
        assert_eq!(doc.section("TASK").unwrap().content, Content::text("Build feature"));
        assert_eq!(doc.position("CONSTRAINTS"), Some(1));
        assert!(!doc.contains("RISKS"));
    }

    #[test]
    fn metric_entries_walks_metric_sections_only() {
        let doc = sample();
        let keys: Vec<_> = doc.metric_entries().map(|(_, e)| e.key.as_str()).collect();
        assert_eq!(keys, ["entry_loc", "bundle_kb"]);
    }

    #[test]
    fn load_bearing_sections_filter() {
        let doc = sample();
        let keys: Vec<_> = doc.load_bearing_sections().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["CONSTRAINTS"]);
    }

    #[test]
    fn weight_tags_are_lenient() {
        assert_eq!(Weight::from_tag("load-bearing"), Some(Weight::LoadBearing));
        assert_eq!(Weight::from_tag("Load_Bearing"), Some(Weight::LoadBearing));
        assert_eq!(Weight::from_tag(" advisory "), Some(Weight::Advisory));
        assert_eq!(Weight::from_tag("critical"), None);
        assert_eq!(Weight::LoadBearing.to_string(), "load-bearing");
    }

    #[test]
    fn content_serializes_with_type_tag() {
        let json = serde_json::to_value(Content::list(["a"])).unwrap();
        assert_eq!(json, serde_json::json!({"type": "list", "items": ["a"]}));

        let back: Content =
            serde_json::from_value(serde_json::json!({"type": "text", "value": "hi"})).unwrap();
        assert_eq!(back, Content::text("hi"));
    }

    #[test]
    fn content_len_counts_units() {
        assert_eq!(Content::text("").len(), 0);
        assert_eq!(Content::text("a\nb").len(), 2);
        assert_eq!(Content::list(["x", "y", "z"]).len(), 3);
        assert_eq!(Content::list(Vec::<String>::new()).content_type(), ContentType::List);
    }
}
