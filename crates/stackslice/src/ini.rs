//! In-place patching of `key = value` slicer config files.
//!
//! Only the values of targeted keys change. Comments, unrelated keys, line
//! order and each line's own line ending are kept byte for byte.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, StackError};

/// Config key holding the first-layer Z offset.
pub const Z_OFFSET_KEY: &str = "z_offset";

/// Config key holding the extrusion multiplier.
pub const EXTRUSION_MULTIPLIER_KEY: &str = "extrusion_multiplier";

/// A config line split from its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    content: &'a str,
    /// `"\r\n"`, `"\n"`, or `""` for a final line without newline.
    ending: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find('\n') {
            Some(i) => {
                let (content, ending) = if i > 0 && rest.as_bytes()[i - 1] == b'\r' {
                    (&rest[..i - 1], &rest[i - 1..=i])
                } else {
                    (&rest[..i], &rest[i..=i])
                };
                lines.push(Line { content, ending });
                rest = &rest[i + 1..];
            }
            None => {
                lines.push(Line {
                    content: rest,
                    ending: "",
                });
                rest = "";
            }
        }
    }

    lines
}

/// Key of an assignment line, or `None` for comments and lines without `=`.
fn assignment_key(content: &str) -> Option<&str> {
    let stripped = content.trim_start();
    if stripped.starts_with('#') || stripped.starts_with(';') {
        return None;
    }
    content.split_once('=').map(|(key, _)| key.trim())
}

/// Result of patching config text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    /// New file contents.
    pub text: String,
    /// Whether at least one existing line was rewritten.
    pub updated: bool,
    /// Keys that were not present and got appended, in append order.
    pub appended: Vec<String>,
}

/// Patch config text.
///
/// Every assignment whose key is in `replacements` is rewritten as
/// `key = value`, keeping the line's ending. Keys not found anywhere are
/// appended at the end in map order.
pub fn patch_str(text: &str, replacements: &BTreeMap<String, String>) -> Patched {
    let lines = split_lines(text);
    let mut out = String::with_capacity(text.len() + 64);
    let mut applied: BTreeSet<&str> = BTreeSet::new();

    for line in &lines {
        match assignment_key(line.content).and_then(|k| replacements.get_key_value(k)) {
            Some((key, value)) => {
                out.push_str(key);
                out.push_str(" = ");
                out.push_str(value);
                out.push_str(line.ending);
                applied.insert(key.as_str());
            }
            None => {
                out.push_str(line.content);
                out.push_str(line.ending);
            }
        }
    }

    let appended: Vec<String> = replacements
        .keys()
        .filter(|k| !applied.contains(k.as_str()))
        .cloned()
        .collect();

    if !appended.is_empty() && lines.last().is_some_and(|l| l.ending.is_empty()) {
        out.push('\n');
    }
    for key in &appended {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(&replacements[key]);
        out.push('\n');
    }

    Patched {
        text: out,
        updated: !applied.is_empty(),
        appended,
    }
}

/// Patch the config file at `path` in place.
///
/// Returns `true` if at least one existing line was updated, `false` if
/// every key had to be appended. The new contents are written to a sibling
/// temporary file and renamed over `path`, so readers never see a partial
/// file. Symlinks are followed and the file keeps its permissions.
pub fn patch_config(path: impl AsRef<Path>, replacements: &BTreeMap<String, String>) -> Result<bool> {
    let path = path.as_ref();
    let target = std::fs::canonicalize(path).map_err(|e| StackError::config_file(path, e))?;
    let text = std::fs::read_to_string(&target).map_err(|e| StackError::config_file(path, e))?;
    let permissions = std::fs::metadata(&target)
        .map_err(|e| StackError::config_file(path, e))?
        .permissions();

    let patched = patch_str(&text, replacements);

    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StackError::config_file(path, e))?;
    tmp.write_all(patched.text.as_bytes())
        .map_err(|e| StackError::config_file(path, e))?;
    tmp.as_file()
        .set_permissions(permissions)
        .map_err(|e| StackError::config_file(path, e))?;
    tmp.persist(&target)
        .map_err(|e| StackError::config_file(path, e.error))?;

    Ok(patched.updated)
}
