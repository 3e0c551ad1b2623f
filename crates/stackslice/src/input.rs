//! Discovery and ordering of input mesh files.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, StackError};

/// An STL file in the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshFile {
    /// File name, used to look up per-object settings.
    pub name: String,
    /// Full path.
    pub path: PathBuf,
}

/// Integer prefix of a file name, e.g. `12` for `12.part.stl`.
pub fn numeric_prefix(name: &str) -> Result<u64> {
    let stem = name.split('.').next().unwrap_or(name);
    stem.parse::<u64>()
        .map_err(|_| StackError::InvalidFilename(name.to_string()))
}

fn is_stl(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"))
}

/// Sort file names numerically by their integer prefix.
///
/// `10.stl` sorts after `2.stl`. Equal prefixes fall back to the file name.
pub fn sort_by_numeric_prefix<S: AsRef<str>>(names: &[S]) -> Result<Vec<(u64, String)>> {
    let mut keyed = names
        .iter()
        .map(|n| Ok((numeric_prefix(n.as_ref())?, n.as_ref().to_string())))
        .collect::<Result<Vec<_>>>()?;
    keyed.sort();
    Ok(keyed)
}

/// List the STL files of `dir` in processing order.
///
/// Only regular files with an `.stl` extension (any case) are considered.
/// Every such file must have a numeric name prefix.
pub fn discover_meshes(dir: impl AsRef<Path>) -> Result<Vec<MeshFile>> {
    let dir = dir.as_ref();
    let mut names = Vec::new();

    let entries = std::fs::read_dir(dir).map_err(|e| StackError::input_dir(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| StackError::input_dir(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| StackError::input_dir(dir, e))?;
        if !file_type.is_file() || !is_stl(&path) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    let files: Vec<MeshFile> = sort_by_numeric_prefix(&names)?
        .into_iter()
        .map(|(_, name)| MeshFile {
            path: dir.join(&name),
            name,
        })
        .collect();

    debug!(dir = %dir.display(), count = files.len(), "discovered meshes");
    Ok(files)
}
