//! Path authorization for the unit-file write path.
//!
//! A resolved unit-file path is only writable when it is a strict descendant
//! of an allow-listed directory. The checks are layered: lexical
//! normalization first, a component-wise prefix check (so a sibling directory
//! sharing a string prefix cannot pass), a traversal re-check on the relative
//! remainder, and an lstat symlink refusal.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{PanelError, UpdateErrorKind};

/// Lexically normalize a path: resolve `.` and `..` segments and collapse
/// separators without consulting the filesystem (and therefore without
/// following symlinks).
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::RootDir => out.push(Component::RootDir),
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping at the root is a no-op; "/.." stays "/"
                out.pop();
            }
            Component::Normal(name) => out.push(name),
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
        }
    }
    out
}

/// Refuse a path whose final component is currently a symbolic link.
///
/// Uses `symlink_metadata` (lstat) so the link itself is inspected, not its
/// target. A path that does not exist yet passes. Called again immediately
/// before the write to narrow the check-to-use window; the remaining race is
/// closed only on the direct-write path, which opens with O_NOFOLLOW.
pub fn refuse_symlink(path: &Path) -> Result<(), PanelError> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            warn!(path = %path.display(), "Refusing symbolic link target");
            Err(PanelError::Update {
                kind: UpdateErrorKind::PathForbidden {
                    path: path.to_path_buf(),
                },
            })
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PanelError::Io(e)),
    }
}

/// Authorize a candidate write path against the allow-listed directories.
///
/// Returns the normalized absolute path on success. Authorization requires,
/// for at least one allowed directory:
///
/// 1. the normalized candidate is a strict descendant of the directory
///    (writing to the directory itself, or to a sibling that merely shares a
///    string prefix, is rejected), and
/// 2. the relative remainder contains no traversal segment, and
/// 3. the candidate is not currently a symbolic link.
pub fn authorize_write_path(
    candidate: &Path,
    allowed_dirs: &[PathBuf],
) -> Result<PathBuf, PanelError> {
    if !candidate.is_absolute() {
        return Err(PanelError::Update {
            kind: UpdateErrorKind::PathForbidden {
                path: candidate.to_path_buf(),
            },
        });
    }

    let normalized = normalize_lexical(candidate);

    let mut authorized = false;
    for allowed in allowed_dirs {
        if !allowed.is_absolute() {
            continue;
        }
        let allowed = normalize_lexical(allowed);

        // Component-wise prefix check; a strict descendant only.
        if !normalized.starts_with(&allowed) || normalized == allowed {
            continue;
        }

        // Traversal re-check on the remainder, independent of normalization.
        let relative = match normalized.strip_prefix(&allowed) {
            Ok(rel) => rel,
            Err(_) => continue,
        };
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            warn!(
                path = %normalized.display(),
                allowed = %allowed.display(),
                "Traversal segment survived normalization"
            );
            continue;
        }

        debug!(
            path = %normalized.display(),
            allowed = %allowed.display(),
            "Write path authorized"
        );
        authorized = true;
        break;
    }

    if !authorized {
        return Err(PanelError::Update {
            kind: UpdateErrorKind::PathForbidden { path: normalized },
        });
    }

    refuse_symlink(&normalized)?;

    Ok(normalized)
}
