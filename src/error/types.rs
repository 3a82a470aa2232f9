//! Error types for the unitdeck daemon.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the daemon.
#[derive(Error, Debug)]
pub enum PanelError {
    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Socket-related errors.
    #[error("Socket error: {message}")]
    Socket { message: String },

    /// Authentication errors.
    #[error("Authentication error: {kind}")]
    Auth { kind: AuthErrorKind },

    /// Validation errors (always client-caused, never retried).
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Command execution errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// Unit-file update errors.
    #[error("Update error: {kind}")]
    Update { kind: UpdateErrorKind },

    /// Protocol errors.
    #[error("Protocol error: {kind}")]
    Protocol { kind: ProtocolErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PanelError {
    /// Stable machine-checkable code for this error.
    ///
    /// Every failure surfaces to the caller under one of these codes; nothing
    /// is collapsed into a generic failure.
    pub fn code(&self) -> &'static str {
        match self {
            PanelError::Config { .. } => "CONFIG_ERROR",
            PanelError::Socket { .. } => "SOCKET_ERROR",
            PanelError::Auth { .. } => "AUTH_ERROR",
            PanelError::Validation { .. } => "VALIDATION_ERROR",
            PanelError::Command { kind } => match kind {
                CommandErrorKind::UnknownCommand { .. } => "UNKNOWN_COMMAND",
                CommandErrorKind::NotFound { .. } => "COMMAND_NOT_FOUND",
                CommandErrorKind::Timeout { .. } => "COMMAND_TIMEOUT",
                CommandErrorKind::ExecutionFailed { .. } => "COMMAND_ERROR",
            },
            PanelError::Update { kind } => match kind {
                UpdateErrorKind::PathUnresolved { .. } => "PATH_UNRESOLVED",
                UpdateErrorKind::PathForbidden { .. } => "PATH_FORBIDDEN",
                UpdateErrorKind::ContentTooLarge { .. } => "CONTENT_TOO_LARGE",
                UpdateErrorKind::WriteFailed { .. } => "WRITE_FAILED",
            },
            PanelError::Protocol { .. } => "PROTOCOL_ERROR",
            PanelError::Io(_) => "IO_ERROR",
            PanelError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

/// Authentication error kinds.
#[derive(Error, Debug)]
pub enum AuthErrorKind {
    #[error("Unauthorized peer: UID {uid} not in allowed list")]
    UnauthorizedPeer { uid: u32 },
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Invalid unit name: {name}")]
    InvalidUnitName { name: String },

    #[error("Invalid action: {action}")]
    InvalidAction { action: String },

    #[error("Missing required parameter: {param}")]
    MissingParameter { param: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Unknown command: {name}")]
    UnknownCommand { name: String },

    #[error("Command not found: {program}")]
    NotFound { program: String },

    #[error("Command timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Command execution failed: {message}")]
    ExecutionFailed { message: String },
}

/// Unit-file update error kinds.
///
/// One kind per terminal failure state of the update sequence, so callers can
/// tell a name that resolves to no file apart from a file outside the
/// allow-list or a failed write helper.
#[derive(Error, Debug)]
pub enum UpdateErrorKind {
    #[error("No unit file path for '{unit}': {message}")]
    PathUnresolved { unit: String, message: String },

    #[error("Writing to {path:?} is not allowed")]
    PathForbidden { path: PathBuf },

    #[error("Content too large: {size} bytes exceeds maximum of {max} bytes")]
    ContentTooLarge { size: usize, max: usize },

    #[error("Write failed: {message}")]
    WriteFailed { message: String },
}

/// Protocol error kinds.
#[derive(Error, Debug)]
pub enum ProtocolErrorKind {
    #[error("Message too large: {size} bytes exceeds maximum of {max} bytes")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid message format: {message}")]
    InvalidMessageFormat { message: String },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out")]
    ConnectionTimeout,
}

/// Result type alias for daemon operations.
pub type PanelResult<T> = Result<T, PanelError>;
