//! Patch application.
//!
//! Every call starts from a deep clone of the borrowed input and mutates only
//! that clone, so the caller's document is untouched even when a later
//! operation fails.

use crate::ops::PatchOp;
use crate::{PatchError, PatchErrorKind};
use adf_core::classify::{check_content, parse_map_line};
use adf_core::vocabulary::{is_valid_decoration, is_valid_key};
use adf_core::{Content, Document, MapEntry, Section};
use tracing::debug;

/// Apply `ops` in order and return the patched copy.
pub fn apply_patches(doc: &Document, ops: &[PatchOp]) -> Result<Document, PatchError> {
    let mut next = doc.clone();
    for (op_index, op) in ops.iter().enumerate() {
        apply_in_place(&mut next, op).map_err(|kind| PatchError {
            op_index,
            op: op.kind(),
            kind,
        })?;
        debug!(op_index, op = op.kind(), target = op.target(), "applied patch operation");
    }
    Ok(next)
}

/// Apply a single operation and return the patched copy.
pub fn apply_patch(doc: &Document, op: &PatchOp) -> Result<Document, PatchError> {
    apply_patches(doc, std::slice::from_ref(op))
}

fn apply_in_place(doc: &mut Document, op: &PatchOp) -> Result<(), PatchErrorKind> {
    match op {
        PatchOp::AddBullet { section, value } => {
            let target = find_mut(doc, section)?;
            match &mut target.content {
                Content::List { items } => items.push(value.trim().to_string()),
                Content::Map { entries } => entries.push(map_entry(section, value)?),
                other => return Err(mismatch(section, "list or map", other)),
            }
            check(section, &target.content)
        }

        PatchOp::ReplaceBullet {
            section,
            index,
            value,
        } => {
            let target = find_mut(doc, section)?;
            match &mut target.content {
                Content::List { items } => {
                    check_index(section, *index, items.len())?;
                    items[*index] = value.trim().to_string();
                }
                Content::Map { entries } => {
                    check_index(section, *index, entries.len())?;
                    entries[*index] = map_entry(section, value)?;
                }
                other => return Err(mismatch(section, "list or map", other)),
            }
            check(section, &target.content)
        }

        PatchOp::RemoveBullet { section, index } => {
            let target = find_mut(doc, section)?;
            match &mut target.content {
                Content::List { items } => {
                    check_removal(section, *index, items.len())?;
                    items.remove(*index);
                }
                Content::Map { entries } => {
                    check_removal(section, *index, entries.len())?;
                    entries.remove(*index);
                }
                other => return Err(mismatch(section, "list or map", other)),
            }
            check(section, &target.content)
        }

        PatchOp::AddSection {
            key,
            content,
            weight,
            decoration,
        } => {
            if !is_valid_key(key) {
                return Err(PatchErrorKind::InvalidKey { key: key.clone() });
            }
            if doc.contains(key) {
                return Err(PatchErrorKind::DuplicateSection {
                    section: key.clone(),
                });
            }
            check_decoration(key, decoration.as_deref())?;
            check(key, content)?;
            doc.sections.push(Section {
                key: key.clone(),
                decoration: decoration.clone(),
                content: content.clone(),
                weight: *weight,
            });
            Ok(())
        }

        PatchOp::ReplaceSection {
            key,
            content,
            weight,
            decoration,
        } => {
            check_decoration(key, decoration.as_deref())?;
            check(key, content)?;
            let target = find_mut(doc, key)?;
            target.content = content.clone();
            if weight.is_some() {
                target.weight = *weight;
            }
            if decoration.is_some() {
                target.decoration = decoration.clone();
            }
            Ok(())
        }

        PatchOp::RemoveSection { key } => {
            let position = doc
                .position(key)
                .ok_or_else(|| PatchErrorKind::SectionNotFound {
                    section: key.clone(),
                })?;
            doc.sections.remove(position);
            Ok(())
        }

        PatchOp::UpdateMetric {
            section,
            key,
            value,
        } => {
            if !value.is_finite() {
                return Err(PatchErrorKind::InvalidContent {
                    section: section.clone(),
                    detail: format!("metric '{key}' value must be a finite number"),
                });
            }
            let target = find_mut(doc, section)?;
            let found = target.content.content_type();
            let Content::Metric { entries } = &mut target.content else {
                return Err(PatchErrorKind::ContentTypeMismatch {
                    section: section.clone(),
                    expected: "metric",
                    found,
                });
            };
            let entry = entries.iter_mut().find(|e| e.key == *key).ok_or_else(|| {
                PatchErrorKind::MetricNotFound {
                    section: section.clone(),
                    key: key.clone(),
                }
            })?;
            entry.value = *value;
            Ok(())
        }
    }
}

fn find_mut<'a>(doc: &'a mut Document, key: &str) -> Result<&'a mut Section, PatchErrorKind> {
    doc.section_mut(key)
        .ok_or_else(|| PatchErrorKind::SectionNotFound {
            section: key.to_string(),
        })
}

fn check_index(section: &str, index: usize, len: usize) -> Result<(), PatchErrorKind> {
    if index < len {
        Ok(())
    } else {
        Err(PatchErrorKind::IndexOutOfRange {
            section: section.to_string(),
            index,
            len,
        })
    }
}

/// An emptied list or map would be written as a bare header and read back
/// as Text, so the last item can only go with its section.
fn check_removal(section: &str, index: usize, len: usize) -> Result<(), PatchErrorKind> {
    check_index(section, index, len)?;
    if len == 1 {
        return Err(PatchErrorKind::InvalidContent {
            section: section.to_string(),
            detail: "cannot remove the last item; use REMOVE_SECTION".into(),
        });
    }
    Ok(())
}

fn map_entry(section: &str, value: &str) -> Result<MapEntry, PatchErrorKind> {
    parse_map_line(value).ok_or_else(|| PatchErrorKind::InvalidMapEntry {
        section: section.to_string(),
        value: value.to_string(),
    })
}

fn mismatch(section: &str, expected: &'static str, found: &Content) -> PatchErrorKind {
    PatchErrorKind::ContentTypeMismatch {
        section: section.to_string(),
        expected,
        found: found.content_type(),
    }
}

fn check(section: &str, content: &Content) -> Result<(), PatchErrorKind> {
    check_content(content).map_err(|detail| PatchErrorKind::InvalidContent {
        section: section.to_string(),
        detail,
    })
}

fn check_decoration(section: &str, decoration: Option<&str>) -> Result<(), PatchErrorKind> {
    match decoration {
        Some(glyph) if !is_valid_decoration(glyph) => Err(PatchErrorKind::InvalidDecoration {
            section: section.to_string(),
            decoration: glyph.to_string(),
        }),
        _ => Ok(()),
    }
}
