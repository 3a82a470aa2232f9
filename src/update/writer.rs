//! Unit-file write primitive.
//!
//! Two paths to disk: when the daemon itself has write privilege the file is
//! opened directly with O_NOFOLLOW, so a symlink swapped in after
//! authorization fails the open itself instead of being followed. When the
//! daemon is unprivileged the content is piped to the configured write
//! helper (tee under sudo); there the lstat check immediately before the
//! write narrows, but cannot fully close, the swap window.

use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{PanelError, UpdateErrorKind};
use crate::runner::{sanitize_output, CommandRunner};
use crate::validation::refuse_symlink;

/// Write `content` to `path`, which must already be authorized.
pub fn write_unit_file(
    runner: &dyn CommandRunner,
    tee_path: &Path,
    path: &Path,
    content: &str,
) -> Result<(), PanelError> {
    // Re-checked here, immediately before the write, not only at
    // authorization time.
    refuse_symlink(path)?;

    if runner.needs_elevation() {
        write_via_helper(runner, tee_path, path, content)
    } else {
        write_direct(path, content)
    }
}

fn write_via_helper(
    runner: &dyn CommandRunner,
    tee_path: &Path,
    path: &Path,
    content: &str,
) -> Result<(), PanelError> {
    let tee = tee_path.to_string_lossy();
    let target = path.to_string_lossy();
    debug!(path = %target, bytes = content.len(), "Writing unit file via helper");

    let output = runner.run(&[tee.as_ref(), target.as_ref()], true, Some(content))?;
    if !output.success() {
        return Err(PanelError::Update {
            kind: UpdateErrorKind::WriteFailed {
                message: sanitize_output(output.diagnostic(), 10),
            },
        });
    }

    info!(path = %target, bytes = content.len(), "Unit file written");
    Ok(())
}

fn write_direct(path: &Path, content: &str) -> Result<(), PanelError> {
    debug!(path = %path.display(), bytes = content.len(), "Writing unit file directly");

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .custom_flags(nix::libc::O_NOFOLLOW)
        .open(path)
        .map_err(|e| {
            if e.raw_os_error() == Some(nix::libc::ELOOP) {
                // Final component became a symlink between check and open
                PanelError::Update {
                    kind: UpdateErrorKind::PathForbidden {
                        path: path.to_path_buf(),
                    },
                }
            } else {
                PanelError::Update {
                    kind: UpdateErrorKind::WriteFailed {
                        message: format!("Failed to open {}: {}", path.display(), e),
                    },
                }
            }
        })?;

    file.write_all(content.as_bytes())
        .map_err(|e| PanelError::Update {
            kind: UpdateErrorKind::WriteFailed {
                message: format!("Failed to write {}: {}", path.display(), e),
            },
        })?;

    file.sync_all().map_err(|e| PanelError::Update {
        kind: UpdateErrorKind::WriteFailed {
            message: format!("Failed to sync {}: {}", path.display(), e),
        },
    })?;

    info!(path = %path.display(), bytes = content.len(), "Unit file written");
    Ok(())
}
