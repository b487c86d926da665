//! Filesystem access for config documents.

use std::path::{Component, Path, PathBuf};

use super::ResolutionError;

/// Reads the raw bytes of a config file.
pub(crate) fn read_config_file(path: &Path) -> Result<Vec<u8>, ResolutionError> {
    match std::fs::read(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ResolutionError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(ResolutionError::ReadFailure {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Resolves an include entry against the directory of the file declaring it.
pub(crate) fn resolve_include(including_file: &Path, include: &str) -> PathBuf {
    let dir = including_file.parent().unwrap_or_else(|| Path::new(""));
    normalize(&dir.join(include))
}

/// Lexically cleans a path: drops `.` segments and folds `name/..` pairs.
///
/// Leading `..` segments of a relative path are kept, and `..` directly under
/// the root is dropped. Symlinks are not followed.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
