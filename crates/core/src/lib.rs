//! # ADF Core
//!
//! Domain types for the ADF engine. This crate defines the document model
//! every other crate works against: documents, sections, the four content
//! types, and weight annotations.
//!
//! ## Design Philosophy
//!
//! The model is a tree of owned values. Nothing here holds interior
//! mutability, so a `Document` cloned by one caller can never be observed
//! changing by another. Two pieces of shared policy also live here because
//! both the parser and programmatic synthesizers must agree on them:
//! - [`classify`]: the content disambiguation rule (List / Metric / Map / Text)
//! - [`vocabulary`]: canonical key ranking and default decorations

pub mod classify;
pub mod document;
pub mod error;
pub mod vocabulary;

// Re-export key types at crate root for ergonomics
pub use classify::{check_content, classify_lines};
pub use document::{
    ADF_VERSION, Content, ContentType, Document, MapEntry, MetricEntry, Section, Weight,
};
pub use error::{ParseError, ParseResult};
