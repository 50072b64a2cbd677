//! ADF text syntax: a tolerant parser and a canonical formatter.
//!
//! ```text
//! raw text ──parse──▶ Document ──format──▶ canonical text
//! ```
//!
//! The two sides share nothing but the [`Document`](adf_core::Document)
//! value. Parsing absorbs decorative noise; formatting is strict and
//! idempotent:
//!
//! ```
//! let canonical = adf_syntax::format(&adf_syntax::parse("TASK: Build feature").unwrap());
//! assert_eq!(canonical, "ADF: 0.1\n🎯 TASK: Build feature\n");
//! assert!(adf_syntax::is_formatted(&canonical).unwrap());
//! ```

mod formatter;
mod parser;

pub use formatter::{INDENT, format, format_number, is_formatted};
pub use parser::parse;
