//! Canonical section vocabulary.
//!
//! The table is closed, the key space is not: any well-formed key is legal
//! and ranks after every canonical one.

/// Canonical keys in output order, with their default decoration.
const CANONICAL_KEYS: &[(&str, &str)] = &[
    ("TASK", "🎯"),
    ("ROLE", "🎭"),
    ("CONTEXT", "📋"),
    ("OUTPUT", "📤"),
    ("CONSTRAINTS", "⚠️"),
    ("RULES", "📐"),
    ("DEFAULT_LOAD", "📦"),
    ("ON_DEMAND", "📂"),
    ("FILES", "📁"),
    ("TOOLS", "🛠️"),
    ("RISKS", "🚨"),
    ("STATE", "🧠"),
    ("BUDGET", "💰"),
    ("METRICS", "📊"),
    ("SYNC", "🔄"),
    ("CADENCE", "⏱️"),
];

/// Rank shared by every non-canonical key.
pub const FALLBACK_RANK: usize = CANONICAL_KEYS.len();

/// Sort rank of a key. Total: unknown keys get [`FALLBACK_RANK`].
pub fn rank(key: &str) -> usize {
    CANONICAL_KEYS
        .iter()
        .position(|(k, _)| *k == key)
        .unwrap_or(FALLBACK_RANK)
}

/// Glyph written before a canonical key that carries no decoration of its own.
pub fn default_decoration(key: &str) -> Option<&'static str> {
    CANONICAL_KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, glyph)| *glyph)
}

pub fn is_canonical(key: &str) -> bool {
    rank(key) < FALLBACK_RANK
}

/// Canonical keys in output order.
pub fn canonical_keys() -> impl Iterator<Item = &'static str> {
    CANONICAL_KEYS.iter().map(|(k, _)| *k)
}

/// `[A-Z][A-Z0-9_]*`
pub fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        _ => false,
    }
}

/// A decoration is a run of non-ASCII symbol characters (emoji and their
/// variation selectors). Anything else would not survive a round trip.
pub fn is_valid_decoration(glyph: &str) -> bool {
    !glyph.is_empty()
        && glyph
            .chars()
            .all(|c| !c.is_ascii() && !c.is_whitespace() && !c.is_alphanumeric())
}

/// Normalise a header key as written (`ON-DEMAND` → `ON_DEMAND`).
pub fn normalize_key(raw: &str) -> String {
    raw.replace('-', "_")
}
