//! Unit name validation.
//!
//! Unit names are interpolated into systemctl invocations, so they are held
//! to a conservative character whitelist: no separators, no shell
//! metacharacters, no whitespace. Instantiated units ("foo@bar.service") and
//! dotted or hyphenated names pass.

use crate::error::{PanelError, ValidationErrorKind};

/// Upper bound on unit name length; systemd caps unit names well below this.
const MAX_UNIT_NAME_LEN: usize = 256;

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '@')
}

/// Validate a unit name against the allowed identifier pattern.
pub fn validate_unit_name(name: &str) -> Result<(), PanelError> {
    if name.is_empty() {
        return Err(PanelError::Validation {
            kind: ValidationErrorKind::InvalidParameter {
                param: "unit".to_string(),
                message: "Unit name cannot be empty".to_string(),
            },
        });
    }

    if name.len() > MAX_UNIT_NAME_LEN || !name.chars().all(is_allowed_char) {
        return Err(PanelError::Validation {
            kind: ValidationErrorKind::InvalidUnitName {
                name: name.to_string(),
            },
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PanelError, ValidationErrorKind};

    #[test]
    fn test_valid_unit_names() {
        assert!(validate_unit_name("nginx.service").is_ok());
        assert!(validate_unit_name("cron").is_ok());
        assert!(validate_unit_name("getty@tty1.service").is_ok());
        assert!(validate_unit_name("systemd-journald.service").is_ok());
        assert!(validate_unit_name("php8.3-fpm.service").is_ok());
        assert!(validate_unit_name("snap_daemon.service").is_ok());
    }

    #[test]
    fn test_shell_metacharacters_rejected() {
        assert!(validate_unit_name("nginx; rm -rf /").is_err());
        assert!(validate_unit_name("nginx$PATH").is_err());
        assert!(validate_unit_name("nginx`id`").is_err());
        assert!(validate_unit_name("nginx service").is_err());
        assert!(validate_unit_name("nginx\nmalicious").is_err());
        assert!(validate_unit_name("nginx|cat").is_err());
    }

    #[test]
    fn test_path_separators_rejected() {
        assert!(validate_unit_name("../etc/passwd").is_err());
        assert!(validate_unit_name("/etc/passwd").is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            validate_unit_name(""),
            Err(PanelError::Validation {
                kind: ValidationErrorKind::InvalidParameter { .. }
            })
        ));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let name = "a".repeat(300);
        assert!(validate_unit_name(&name).is_err());
    }
}
