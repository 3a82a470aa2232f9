//! Service lifecycle actions.
//!
//! The action set is a closed enum; anything outside it is rejected before a
//! command is ever constructed.

use crate::error::{PanelError, ValidationErrorKind};

/// A lifecycle action the panel can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
    /// Global configuration reload; the only action that takes no unit name.
    DaemonReload,
}

impl ServiceAction {
    /// Parse an action name, rejecting anything outside the fixed set.
    pub fn parse(action: &str) -> Result<Self, PanelError> {
        match action {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "restart" => Ok(Self::Restart),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "daemon-reload" => Ok(Self::DaemonReload),
            other => Err(PanelError::Validation {
                kind: ValidationErrorKind::InvalidAction {
                    action: other.to_string(),
                },
            }),
        }
    }

    /// The systemctl subcommand for this action.
    pub fn systemctl_arg(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::DaemonReload => "daemon-reload",
        }
    }

    /// Whether this action operates on a named unit.
    pub fn takes_unit(&self) -> bool {
        !matches!(self, Self::DaemonReload)
    }
}
