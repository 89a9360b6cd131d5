//! Input refinement and display formatting shared by the screens.

use thiserror::Error;

/// Keep ASCII digits only.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Keep alphabetic characters only.
pub fn letters_only(input: &str) -> String {
    input.chars().filter(|c| c.is_alphabetic()).collect()
}

pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The first `max` characters of `input`.
pub fn cap(input: &str, max: usize) -> String {
    input.chars().take(max).collect()
}

/// Format a phone number for display.
///
/// The input is reduced to digits and prefixed with `+`; an empty input
/// becomes `+7`. Numbers of at least three digits are grouped as
/// `+7 999 123 45 67`, shorter ones are returned without spaces.
///
/// # Example
///
/// ```rust
/// use stateful_screens::format::format_phone;
///
/// assert_eq!(format_phone("79991234567"), "+7 999 123 45 67");
/// assert_eq!(format_phone("799"), "+7 99");
/// assert_eq!(format_phone(""), "+7");
/// ```
pub fn format_phone(number: &str) -> String {
    let digits = digits_only(number);
    if digits.is_empty() {
        return "+7".to_string();
    }
    let mut formatted = format!("+{digits}");
    if digits.len() < 3 {
        return formatted;
    }

    // space positions counted in the unspaced "+digits" text, highest first
    // so earlier insertions do not shift later ones
    let length = formatted.len();
    for (min_length, at) in [(11, 10), (9, 8), (6, 5), (3, 2)] {
        if length >= min_length {
            formatted.insert(at, ' ');
        }
    }
    formatted
}

/// An e-mail address that is not of the form `local@domain`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("Invalid e-mail entered")]
pub struct EmailValidationError;

/// Check an e-mail field.
///
/// An empty field is valid and means "no e-mail". Otherwise the text must
/// contain exactly one `@`.
pub fn check_email(email: &str) -> Result<Option<String>, EmailValidationError> {
    if email.is_empty() {
        return Ok(None);
    }
    if email.matches('@').count() == 1 {
        Ok(Some(email.to_string()))
    } else {
        Err(EmailValidationError)
    }
}
