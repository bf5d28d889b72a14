//! Field checks shared by the input schemas.

use email_address::EmailAddress;

use crate::error::SchemaError;

const MAX_EMAIL_CHARS: usize = 150;

pub(crate) fn char_range(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), SchemaError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(SchemaError::invalid(
            field,
            format!("must be between {min} and {max} characters, got {len}"),
        ));
    }
    Ok(())
}

pub(crate) fn max_chars(field: &'static str, value: &str, max: usize) -> Result<(), SchemaError> {
    char_range(field, value, 0, max)
}

pub(crate) fn email(field: &'static str, value: &str) -> Result<(), SchemaError> {
    let value = value.trim();
    max_chars(field, value, MAX_EMAIL_CHARS)?;
    if !EmailAddress::is_valid(value) {
        return Err(SchemaError::invalid(field, format!("'{value}' is not a valid email address")));
    }
    Ok(())
}

pub(crate) fn phone_number(field: &'static str, value: &str) -> Result<(), SchemaError> {
    let value = value.trim();
    char_range(field, value, 1, 20)?;
    let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | ' ');
    if !value.chars().all(allowed) {
        return Err(SchemaError::invalid(
            field,
            "may only contain digits, spaces and + - ( )",
        ));
    }
    Ok(())
}
