//! Source path → destination name.
//!
//! `/data/foo/` and `/data/foo` both land in `<output>/foo`; a file keeps
//! its base name, extension included.

use std::path::{Component, Path, PathBuf};

use crate::error::BackupError;

/// Lexically normalise `path`, without touching the filesystem.
///
/// Collapses repeated separators, drops `.` segments and trailing
/// separators, and folds `name/..` pairs.  An empty result becomes `.`.
pub fn normalize(path: &str) -> String {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                },
                // `/..` is `/`.
                Some(Component::RootDir | Component::Prefix(_)) => {},
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return ".".into();
    }
    out.iter().collect::<PathBuf>().to_string_lossy().into_owned()
}

/// Name the backup of `path` will get under the output root.
///
/// Fails with [`BackupError::PathNotFound`] when `path` does not exist.
pub fn destination_name(path: &str) -> Result<String, BackupError> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(BackupError::PathNotFound(p.to_path_buf()));
    }

    if !p.is_dir() {
        return p
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| BackupError::UnnamedSource(p.to_path_buf()));
    }

    let last = path
        .trim_end_matches('/')
        .rsplit('/')
        .find(|segment| !segment.is_empty());

    match last {
        // `.`, `..` and `foo/..` name nothing useful; ask the filesystem.
        Some("." | "..") => p
            .canonicalize()
            .ok()
            .and_then(|abs| abs.file_name().map(|n| n.to_string_lossy().into_owned()))
            .ok_or_else(|| BackupError::UnnamedSource(p.to_path_buf())),
        Some(name) => Ok(name.to_string()),
        None => Err(BackupError::UnnamedSource(p.to_path_buf())),
    }
}
