//! Manifest-driven module bundling for ADF.
//!
//! A manifest is an ordinary ADF document whose routing sections
//! (`DEFAULT_LOAD`, `ON_DEMAND`, `BUDGET`, ...) are projected into a
//! [`Manifest`]. Given a set of task keywords, [`resolve_modules`] picks the
//! module documents a task needs and [`bundle_modules`] merges them into one
//! document with token accounting.
//!
//! The engine never touches the filesystem itself. Module text is pulled
//! through a [`ModuleReader`], which any `Fn(&Path) -> io::Result<String>`
//! satisfies.

pub mod bundle;
pub mod manifest;
pub mod resolve;
pub mod tokens;

pub use bundle::{
    BudgetOverrun, BundleResult, LoadReason, MANIFEST_FILE, TriggerMatch, bundle_modules,
    bundle_with_manifest,
};
pub use manifest::{CadenceCheck, Manifest, MetricSource, OnDemandModule, SyncPair};
pub use resolve::{matched_keywords, resolve_modules};
pub use tokens::estimate_tokens;

use adf_core::{ContentType, ParseError};
use std::io;
use std::path::Path;

/// Source of module text.
pub trait ModuleReader {
    fn read_module(&self, path: &Path) -> io::Result<String>;
}

impl<F> ModuleReader for F
where
    F: Fn(&Path) -> io::Result<String>,
{
    fn read_module(&self, path: &Path) -> io::Result<String> {
        self(path)
    }
}

/// Errors from bundling. Every variant names the module it came from.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BundleError {
    #[error("failed to read module '{module_path}': {reason}")]
    Read { module_path: String, reason: String },

    #[error("failed to parse module '{module_path}': {source}")]
    Parse {
        module_path: String,
        source: ParseError,
    },

    #[error(
        "section '{key}' is {existing} content but module '{module_path}' provides {incoming} content"
    )]
    ContentTypeConflict {
        key: String,
        module_path: String,
        existing: ContentType,
        incoming: ContentType,
    },
}

impl BundleError {
    /// Path of the offending module, relative to the bundle base.
    pub fn module_path(&self) -> &str {
        match self {
            Self::Read { module_path, .. }
            | Self::Parse { module_path, .. }
            | Self::ContentTypeConflict { module_path, .. } => module_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_readers() {
        let reader = |path: &Path| -> io::Result<String> { Ok(path.display().to_string()) };
        assert_eq!(reader.read_module(Path::new("a.adf")).unwrap(), "a.adf");
    }

    #[test]
    fn errors_carry_module_path() {
        let err = BundleError::ContentTypeConflict {
            key: "CONSTRAINTS".into(),
            module_path: "b.adf".into(),
            existing: ContentType::List,
            incoming: ContentType::Text,
        };
        assert_eq!(err.module_path(), "b.adf");
        assert_eq!(
            err.to_string(),
            "section 'CONSTRAINTS' is list content but module 'b.adf' provides text content"
        );

        let err = BundleError::Parse {
            module_path: "c.adf".into(),
            source: ParseError::at_line("unsupported ADF version '9'", 1),
        };
        assert!(err.to_string().starts_with("failed to parse module 'c.adf'"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
