//! Input validation for account and device-credential fields.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Length of a `DevEUI` in hex characters.
pub const DEV_EUI_LEN: usize = 16;
/// Length of a network/application key in hex characters.
pub const SESSION_KEY_LEN: usize = 32;
/// Length of a device address in hex characters.
pub const DEV_ADDR_LEN: usize = 8;
/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex is valid")
});

/// Canonical form of an email address: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check that an (already normalized) email address is well formed.
pub fn email(value: &str) -> Result<()> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(Error::validation(format!("invalid email address: {value:?}")))
    }
}

pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Reject empty or whitespace-only values for a required field.
pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Check that `value` is exactly `len` hex digits.
pub fn hex(field: &str, value: &str, len: usize) -> Result<()> {
    if value.len() != len || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::validation(format!(
            "{field} must be {len} hex characters"
        )));
    }
    Ok(())
}

pub fn dev_eui(value: &str) -> Result<()> {
    hex("dev_eui", value, DEV_EUI_LEN)
}
