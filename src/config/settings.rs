//! Configuration settings for the unitdeck daemon.
//!
//! All values are fixed at process start; the daemon never reloads its
//! configuration while running.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::PanelError;

/// Main configuration structure for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub socket: SocketConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
    #[serde(default)]
    pub write: WriteConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Socket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketConfig {
    /// Path to the Unix socket file.
    pub path: PathBuf,
    /// Socket file permissions (e.g., "0660").
    #[serde(default = "default_socket_permissions")]
    pub permissions: String,
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    /// List of allowed peer UIDs. Empty means reject everyone (fail closed).
    #[serde(default)]
    pub allowed_peer_uids: Vec<u32>,
}

/// Command runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Absolute path to the systemctl binary.
    #[serde(default = "default_systemctl_path")]
    pub systemctl_path: PathBuf,
    /// Absolute path to sudo, used when the daemon does not run as root.
    #[serde(default = "default_sudo_path")]
    pub sudo_path: PathBuf,
    /// Absolute path to tee, the privileged write helper.
    #[serde(default = "default_tee_path")]
    pub tee_path: PathBuf,
    /// Upper bound on any single subprocess invocation, in seconds.
    #[serde(default = "default_command_timeout")]
    pub timeout_seconds: u64,
}

/// Unit-file write configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteConfig {
    /// Directories under which unit-file writes are permitted.
    ///
    /// An authorized write's resolved path must be a strict descendant of one
    /// of these entries.
    #[serde(default = "default_allowed_dirs")]
    pub allowed_dirs: Vec<PathBuf>,
    /// Maximum unit-file content size in encoded bytes.
    #[serde(default = "default_max_unit_file_bytes")]
    pub max_unit_file_bytes: usize,
}

/// Limits configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum protocol message size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Maximum concurrent connections.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    /// Socket read/write timeout in seconds.
    #[serde(default = "default_socket_timeout")]
    pub socket_timeout_seconds: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format ("pretty" or "json").
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_socket_permissions() -> String {
    "0660".to_string()
}

fn default_systemctl_path() -> PathBuf {
    PathBuf::from("/bin/systemctl")
}

fn default_sudo_path() -> PathBuf {
    PathBuf::from("/usr/bin/sudo")
}

fn default_tee_path() -> PathBuf {
    PathBuf::from("/usr/bin/tee")
}

fn default_command_timeout() -> u64 {
    20
}

fn default_allowed_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("/etc/systemd/system/")]
}

fn default_max_unit_file_bytes() -> usize {
    1_048_576 // 1 MiB
}

fn default_max_message_size() -> usize {
    // Must leave headroom above max_unit_file_bytes for the JSON envelope.
    2_097_152
}

fn default_max_concurrent() -> usize {
    64
}

fn default_socket_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            systemctl_path: default_systemctl_path(),
            sudo_path: default_sudo_path(),
            tee_path: default_tee_path(),
            timeout_seconds: default_command_timeout(),
        }
    }
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            allowed_dirs: default_allowed_dirs(),
            max_unit_file_bytes: default_max_unit_file_bytes(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_size: default_max_message_size(),
            max_concurrent_requests: default_max_concurrent(),
            socket_timeout_seconds: default_socket_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PanelError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| PanelError::Config {
            message: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| PanelError::Config {
            message: format!("Failed to parse config file '{}': {}", path.display(), e),
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), PanelError> {
        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(PanelError::Config {
                message: format!(
                    "Invalid log level '{}'. Valid levels: {:?}",
                    self.logging.level, valid_levels
                ),
            });
        }

        // Validate log format
        let valid_formats = ["pretty", "json"];
        if !valid_formats.contains(&self.logging.format.to_lowercase().as_str()) {
            return Err(PanelError::Config {
                message: format!(
                    "Invalid log format '{}'. Valid formats: {:?}",
                    self.logging.format, valid_formats
                ),
            });
        }

        // Validate socket permissions format
        if !self.socket.permissions.chars().all(|c| c.is_ascii_digit()) {
            return Err(PanelError::Config {
                message: format!(
                    "Invalid socket permissions '{}'. Must be octal (e.g., '0660')",
                    self.socket.permissions
                ),
            });
        }

        if self.runner.timeout_seconds == 0 {
            return Err(PanelError::Config {
                message: "runner.timeout_seconds must be greater than zero".to_string(),
            });
        }

        // Relative allow-list entries would defeat the descendant check.
        if self.write.allowed_dirs.is_empty() {
            return Err(PanelError::Config {
                message: "write.allowed_dirs must not be empty".to_string(),
            });
        }
        for dir in &self.write.allowed_dirs {
            if !dir.is_absolute() {
                return Err(PanelError::Config {
                    message: format!(
                        "write.allowed_dirs entry '{}' must be an absolute path",
                        dir.display()
                    ),
                });
            }
        }

        if self.limits.max_message_size <= self.write.max_unit_file_bytes {
            return Err(PanelError::Config {
                message: "limits.max_message_size must exceed write.max_unit_file_bytes"
                    .to_string(),
            });
        }

        Ok(())
    }
}
