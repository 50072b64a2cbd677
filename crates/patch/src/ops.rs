//! Patch operation model and JSON payload decoding.

use adf_core::{Content, Weight};
use serde::{Deserialize, Serialize};

/// One typed edit. Serialized with an `op` tag, e.g. `{"op": "REMOVE_SECTION", "key": "RISKS"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchOp {
    /// Append an item to a List section or a `KEY: value` entry to a Map section.
    AddBullet { section: String, value: String },

    /// Replace the item / entry at `index`.
    ReplaceBullet {
        section: String,
        index: usize,
        value: String,
    },

    /// Remove the item / entry at `index`.
    RemoveBullet { section: String, index: usize },

    /// Append a new section. Fails if `key` already exists.
    AddSection {
        key: String,
        content: Content,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<Weight>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decoration: Option<String>,
    },

    /// Swap a section's content in place; decoration and weight are kept
    /// unless given.
    ReplaceSection {
        key: String,
        content: Content,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weight: Option<Weight>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        decoration: Option<String>,
    },

    RemoveSection { key: String },

    /// Change the value of one metric entry. Ceiling and unit are fixed.
    UpdateMetric {
        section: String,
        key: String,
        value: f64,
    },
}

impl PatchOp {
    /// Wire name of the operation.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AddBullet { .. } => "ADD_BULLET",
            Self::ReplaceBullet { .. } => "REPLACE_BULLET",
            Self::RemoveBullet { .. } => "REMOVE_BULLET",
            Self::AddSection { .. } => "ADD_SECTION",
            Self::ReplaceSection { .. } => "REPLACE_SECTION",
            Self::RemoveSection { .. } => "REMOVE_SECTION",
            Self::UpdateMetric { .. } => "UPDATE_METRIC",
        }
    }

    /// Section key the operation targets.
    pub fn target(&self) -> &str {
        match self {
            Self::AddBullet { section, .. }
            | Self::ReplaceBullet { section, .. }
            | Self::RemoveBullet { section, .. }
            | Self::UpdateMetric { section, .. } => section,
            Self::AddSection { key, .. }
            | Self::ReplaceSection { key, .. }
            | Self::RemoveSection { key } => key,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Many(Vec<PatchOp>),
    One(PatchOp),
    Wrapped { ops: Vec<PatchOp> },
}

/// Decode a JSON patch payload: an array of operations, a single operation,
/// or `{"ops": [...]}`.
pub fn parse_ops(json: &str) -> Result<Vec<PatchOp>, serde_json::Error> {
    Ok(match serde_json::from_str::<Payload>(json)? {
        Payload::Many(ops) | Payload::Wrapped { ops } => ops,
        Payload::One(op) => vec![op],
    })
}
