use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// E.164-style number: optional `+`, 7 to 15 digits, no leading zero.
static PHONE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").expect("phone number regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhoneNumberError {
    #[error("phone number is empty")]
    Empty,

    #[error("'{0}' is not a valid phone number (expected optional '+' and 7 to 15 digits)")]
    Malformed(String),
}

/// Validate a phone number before handing it to the telephony provider.
///
/// Spaces, dashes and parentheses are not accepted; callers must send the
/// number in its canonical form.
pub fn validate_phone_number(number: &str) -> Result<(), PhoneNumberError> {
    if number.is_empty() {
        return Err(PhoneNumberError::Empty);
    }
    if !PHONE_NUMBER_RE.is_match(number) {
        return Err(PhoneNumberError::Malformed(number.to_string()));
    }
    Ok(())
}
