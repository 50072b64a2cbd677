//! Typed, immutable edits over ADF documents.
//!
//! A patch is an ordered list of [`PatchOp`]s applied in sequence, each
//! against the result of the previous one. The input document is only ever
//! borrowed; the output is a fresh deep copy, so callers holding the original
//! never observe a change.
//!
//! # Example Payload
//!
//! ```json
//! [
//!   { "op": "ADD_BULLET", "section": "CONSTRAINTS", "value": "No new deps" },
//!   { "op": "UPDATE_METRIC", "section": "METRICS", "key": "entry_loc", "value": 150 },
//!   { "op": "ADD_SECTION", "key": "RISKS",
//!     "content": { "type": "list", "items": ["Migration downtime"] },
//!     "weight": "advisory" }
//! ]
//! ```
//!
//! Any invalid operation aborts the whole patch with a [`PatchError`]; there
//! is no partial application.

mod engine;
mod ops;

pub use engine::{apply_patch, apply_patches};
pub use ops::{PatchOp, parse_ops};

use adf_core::ContentType;

/// Result alias for patch operations.
pub type PatchResult<T> = std::result::Result<T, PatchError>;

/// A failed patch: which operation failed and why.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("patch operation #{op_index} ({op}) failed: {kind}")]
pub struct PatchError {
    /// Position of the failing operation in the submitted list.
    pub op_index: usize,
    /// Wire name of the failing operation, e.g. `REPLACE_BULLET`.
    pub op: &'static str,
    pub kind: PatchErrorKind,
}

impl PatchError {
    /// Section or key the failing operation targeted.
    pub fn target(&self) -> &str {
        self.kind.target()
    }
}

/// Why a single operation could not be applied.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PatchErrorKind {
    #[error("section '{section}' not found")]
    SectionNotFound { section: String },

    #[error("section '{section}' already exists")]
    DuplicateSection { section: String },

    #[error(
        "index {index} out of range for section '{section}' (valid range {})",
        valid_range(.len)
    )]
    IndexOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },

    #[error("section '{section}' holds {found} content, expected {expected}")]
    ContentTypeMismatch {
        section: String,
        expected: &'static str,
        found: ContentType,
    },

    #[error("metric '{key}' not found in section '{section}'")]
    MetricNotFound { section: String, key: String },

    #[error("'{value}' is not a 'KEY: value' entry for map section '{section}'")]
    InvalidMapEntry { section: String, value: String },

    #[error("invalid section key '{key}': keys must match [A-Z][A-Z0-9_]*")]
    InvalidKey { key: String },

    #[error("invalid decoration {decoration:?} for section '{section}'")]
    InvalidDecoration { section: String, decoration: String },

    #[error("invalid content for section '{section}': {detail}")]
    InvalidContent { section: String, detail: String },
}

impl PatchErrorKind {
    pub fn target(&self) -> &str {
        match self {
            Self::SectionNotFound { section }
            | Self::DuplicateSection { section }
            | Self::IndexOutOfRange { section, .. }
            | Self::ContentTypeMismatch { section, .. }
            | Self::MetricNotFound { section, .. }
            | Self::InvalidMapEntry { section, .. }
            | Self::InvalidDecoration { section, .. }
            | Self::InvalidContent { section, .. } => section,
            Self::InvalidKey { key } => key,
        }
    }
}

fn valid_range(len: &usize) -> String {
    match *len {
        0 => "none, section is empty".to_string(),
        n => format!("[0,{}]", n - 1),
    }
}
