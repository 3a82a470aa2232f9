//! Unit-file update orchestration.
//!
//! A single update runs RESOLVE -> AUTHORIZE -> WRITE -> RELOAD, terminal on
//! the first failure, with no automatic retries. The size cap is enforced
//! before any subprocess is invoked, and a reload failure after a successful
//! write is reported as degraded success rather than plain failure.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::locks::{lock_unpoisoned, UnitLocks};
use super::writer::write_unit_file;
use crate::config::Settings;
use crate::error::{PanelError, PanelResult, UpdateErrorKind};
use crate::runner::{sanitize_output, CommandRunner};
use crate::validation::authorize_write_path;

/// Sentinel FragmentPath for units that have no backing file.
const NO_FILE_SENTINEL: &str = "/dev/null";

/// Terminal state of a completed update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Content persisted and the manager reloaded cleanly.
    Applied {
        path: PathBuf,
        reload_output: String,
    },
    /// Content persisted but the reload did not complete; distinct from both
    /// clean success and plain failure.
    ReloadFailed { path: PathBuf, reload_error: String },
}

/// Sequences a unit-file replacement against the service manager.
pub struct UnitFileUpdater {
    settings: Arc<Settings>,
    runner: Arc<dyn CommandRunner>,
    locks: UnitLocks,
}

impl UnitFileUpdater {
    pub fn new(settings: Arc<Settings>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            settings,
            runner,
            locks: UnitLocks::new(),
        }
    }

    /// Replace the unit's definition file with `content` and reload the
    /// manager.
    ///
    /// Updates to the same unit name are serialized; updates to different
    /// units proceed independently.
    pub fn apply(&self, unit: &str, content: &str) -> PanelResult<UpdateOutcome> {
        // Size cap first: no path resolution, no subprocess, for oversized
        // content. Measured in encoded bytes, not characters.
        let max = self.settings.write.max_unit_file_bytes;
        if content.len() > max {
            return Err(PanelError::Update {
                kind: UpdateErrorKind::ContentTooLarge {
                    size: content.len(),
                    max,
                },
            });
        }

        let lock = self.locks.for_unit(unit);
        let _guard = lock_unpoisoned(&lock);

        let candidate = self.resolve_fragment_path(unit)?;
        debug!(unit = %unit, path = %candidate.display(), "Resolved unit file path");

        let path = authorize_write_path(&candidate, &self.settings.write.allowed_dirs)?;

        write_unit_file(
            self.runner.as_ref(),
            &self.settings.runner.tee_path,
            &path,
            content,
        )?;

        self.reload_manager(unit, path)
    }

    /// Ask the manager for the canonical on-disk path backing the unit.
    fn resolve_fragment_path(&self, unit: &str) -> PanelResult<PathBuf> {
        let systemctl = self.settings.runner.systemctl_path.to_string_lossy();
        let output = self.runner.run(
            &[
                systemctl.as_ref(),
                "show",
                "-p",
                "FragmentPath",
                "--value",
                unit,
            ],
            true,
            None,
        )?;

        if !output.success() {
            return Err(PanelError::Update {
                kind: UpdateErrorKind::PathUnresolved {
                    unit: unit.to_string(),
                    message: sanitize_output(output.diagnostic(), 5),
                },
            });
        }

        let path = output.stdout.trim();
        if path.is_empty() || path == NO_FILE_SENTINEL {
            return Err(PanelError::Update {
                kind: UpdateErrorKind::PathUnresolved {
                    unit: unit.to_string(),
                    message: "manager reports no unit file".to_string(),
                },
            });
        }

        Ok(PathBuf::from(path))
    }

    /// Reload the manager after a persisted write. Any failure here, typed or
    /// nonzero-exit, downgrades the result instead of discarding it: the
    /// content is already on disk.
    fn reload_manager(&self, unit: &str, path: PathBuf) -> PanelResult<UpdateOutcome> {
        let systemctl = self.settings.runner.systemctl_path.to_string_lossy();
        match self.runner.run(&[systemctl.as_ref(), "daemon-reload"], true, None) {
            Ok(output) if output.success() => {
                info!(unit = %unit, path = %path.display(), "Unit file updated and manager reloaded");
                Ok(UpdateOutcome::Applied {
                    path,
                    reload_output: output.stdout.trim().to_string(),
                })
            }
            Ok(output) => {
                warn!(
                    unit = %unit,
                    path = %path.display(),
                    exit_code = ?output.exit_code,
                    "Unit file saved but manager reload failed"
                );
                Ok(UpdateOutcome::ReloadFailed {
                    path,
                    reload_error: sanitize_output(output.diagnostic(), 10),
                })
            }
            Err(e) => {
                warn!(unit = %unit, path = %path.display(), error = %e, "Unit file saved but reload errored");
                Ok(UpdateOutcome::ReloadFailed {
                    path,
                    reload_error: e.to_string(),
                })
            }
        }
    }
}
