//! Checks shared by the validation of every kind of client input.

use crate::Error;

/// Trim `value` and require it to be present and not blank.
///
/// # Errors
/// Returns [Error::MissingFields] if `value` is absent or blank.
pub fn required_text(value: Option<String>) -> Result<String, Error> {
    optional_text(value).ok_or(Error::MissingFields)
}

/// Trim `value`, treating blank text as absent.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Require `text` to have at most `max_length` characters.
///
/// # Errors
/// Returns [Error::InvalidField] naming `field` if `text` is too long.
pub fn check_length(field: &'static str, text: &str, max_length: usize) -> Result<(), Error> {
    if text.chars().count() > max_length {
        return Err(Error::InvalidField {
            field,
            reason: format!("must be at most {max_length} characters"),
        });
    }

    Ok(())
}

/// Require `text` to be a non-blank field value of at most `max_length`
/// characters when the client sent it, e.g. in a partial update.
///
/// # Errors
/// Returns [Error::InvalidField] naming `field` if `text` is blank or too long.
pub fn updated_text(
    field: &'static str,
    text: Option<String>,
    max_length: usize,
) -> Result<Option<String>, Error> {
    let Some(text) = text else {
        return Ok(None);
    };

    let text = text.trim().to_owned();
    if text.is_empty() {
        return Err(Error::InvalidField {
            field,
            reason: "must not be empty".to_owned(),
        });
    }
    check_length(field, &text, max_length)?;

    Ok(Some(text))
}

/// Check that `color` is a CSS hex color such as "#3b82f6" or "#fff" and
/// normalize it to lower case.
///
/// # Errors
/// Returns [Error::InvalidField] naming `field` if `color` is not a hex color.
pub fn parse_color(field: &'static str, color: &str) -> Result<String, Error> {
    let color = color.trim();
    let is_hex_color = color
        .strip_prefix('#')
        .is_some_and(|digits| {
            matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        });

    if !is_hex_color {
        return Err(Error::InvalidField {
            field,
            reason: format!("'{color}' is not a hex color like #3b82f6"),
        });
    }

    Ok(color.to_ascii_lowercase())
}
