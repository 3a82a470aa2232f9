//! Service inventory records.

use serde::{Deserialize, Serialize};

/// One service in the merged inventory.
///
/// Built fresh on every inventory request and never persisted. The `unit`
/// name is the identity key; `enabled` starts as `"unknown"` and is filled in
/// by merging the unit-file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Unit name, always containing a type suffix such as ".service".
    pub unit: String,
    /// Load state (loaded, not-found, masked, ...).
    pub load: String,
    /// High-level activation state (active, inactive, failed, ...).
    pub active: String,
    /// Low-level sub-state (running, dead, exited, ...).
    pub sub: String,
    /// Free-text description; may contain whitespace.
    pub description: String,
    /// Enabled state (enabled, disabled, static, ...), "unknown" when the
    /// unit-file listing had no entry for this unit.
    pub enabled: String,
}

impl ServiceRecord {
    pub(crate) fn new(unit: &str, load: &str, active: &str, sub: &str, description: &str) -> Self {
        Self {
            unit: unit.to_string(),
            load: load.to_string(),
            active: active.to_string(),
            sub: sub.to_string(),
            description: description.to_string(),
            enabled: "unknown".to_string(),
        }
    }
}
