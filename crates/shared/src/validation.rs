//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref IMEI_REGEX: Regex = Regex::new(r"^[0-9]{15,16}$").unwrap();
    static ref COMMAND_NAME_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.:-]+$").unwrap();
}

/// Validates that a device identity is a 15 or 16 digit IMEI.
pub fn validate_imei(imei: &str) -> Result<(), ValidationError> {
    if IMEI_REGEX.is_match(imei) {
        Ok(())
    } else {
        let mut err = ValidationError::new("imei_format");
        err.message = Some("IMEI must be 15 to 16 digits".into());
        Err(err)
    }
}

/// Validates a command name: letters, digits and `_ . : -` only.
pub fn validate_command_name(name: &str) -> Result<(), ValidationError> {
    if COMMAND_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        let mut err = ValidationError::new("command_name_format");
        err.message = Some(
            "Command name may only contain letters, digits, underscores, dots, colons and hyphens"
                .into(),
        );
        Err(err)
    }
}

/// Rejects text containing NUL characters, which PostgreSQL cannot store.
pub fn validate_no_nul(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        let mut err = ValidationError::new("nul_character");
        err.message = Some("Text must not contain NUL characters".into());
        Err(err)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_imei() {
        assert!(validate_imei("356938035643809").is_ok());
        assert!(validate_imei("3569380356438091").is_ok());
        assert!(validate_imei("35693803564380").is_err());
        assert!(validate_imei("35693803564380912").is_err());
        assert!(validate_imei("35693803564380a").is_err());
        assert!(validate_imei("").is_err());
    }

    #[test]
    fn test_validate_imei_error_message() {
        let err = validate_imei("123").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "IMEI must be 15 to 16 digits"
        );
    }

    #[test]
    fn test_validate_command_name() {
        assert!(validate_command_name("reboot").is_ok());
        assert!(validate_command_name("set_interval").is_ok());
        assert!(validate_command_name("gps.mode:on").is_ok());
        assert!(validate_command_name("rm -rf").is_err());
        assert!(validate_command_name("").is_err());
    }

    #[test]
    fn test_validate_no_nul() {
        assert!(validate_no_nul("").is_ok());
        assert!(validate_no_nul("OK;GPS:1").is_ok());
        let err = validate_no_nul("a\0b").unwrap_err();
        assert_eq!(err.code, "nul_character");
        assert!(validate_no_nul("\u{0}").is_err());
    }
}
