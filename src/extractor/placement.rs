use crate::error::{OszError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Move `from` onto `to`, replacing any regular file already at `to`.
///
/// The replacement is a single rename; `to` is never missing in between.
pub fn replace_file(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }

    if to.is_dir() {
        return Err(OszError::InvalidPath {
            path: format!("{} is a directory", to.display()),
        });
    }

    fs::rename(from, to)?;
    debug!(from = %from.display(), to = %to.display(), "moved file into place");
    Ok(())
}

/// Remove empty directories from `start` upward, stopping at the first
/// non-empty one or at `root`. `root` itself is never removed.
///
/// Returns the directories that were removed, innermost first.
pub fn remove_empty_parents(start: &Path, root: &Path) -> Result<Vec<PathBuf>> {
    let root = normalize(root);
    let mut current = normalize(start);
    let mut removed = Vec::new();

    if !is_strictly_inside(&current, &root) {
        if current == root {
            return Ok(removed);
        }
        return Err(OszError::OutsideOutputRoot {
            path: start.display().to_string(),
        });
    }

    while current != root {
        if !is_strictly_inside(&current, &root) {
            return Err(OszError::OutsideOutputRoot {
                path: current.display().to_string(),
            });
        }

        if fs::read_dir(&current)?.next().is_some() {
            break;
        }

        fs::remove_dir(&current)?;
        debug!(dir = %current.display(), "removed empty directory");
        removed.push(current.clone());

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    Ok(removed)
}

/// Component-wise equality after dropping `.` segments.
pub fn is_same_dir(a: &Path, b: &Path) -> bool {
    normalize(a) == normalize(b)
}

/// Containment is decided on path components, never on string prefixes.
pub fn is_strictly_inside(path: &Path, root: &Path) -> bool {
    path != root && path.starts_with(root)
}

/// Lexically drop `.` components so that `out/./x` and `out/x` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
