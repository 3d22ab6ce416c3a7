use lazy_static::lazy_static;
use regex::Regex;

/// US phone numbers are ten digits once formatting is stripped.
pub const PHONE_DIGITS: usize = 10;

lazy_static! {
    /// Something, an @, something, a dot, something. No whitespace.
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// An empty address is valid: contact details are optional.
pub fn is_valid_email(email: &str) -> bool {
    email.is_empty() || EMAIL_PATTERN.is_match(email)
}

/// An empty number is valid; otherwise exactly ten digits after stripping
/// punctuation.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.is_empty() || digits(phone).len() == PHONE_DIGITS
}

/// Digits only, truncated to ten. This is the stored form.
pub fn normalize_phone(phone: &str) -> String {
    digits(phone).chars().take(PHONE_DIGITS).collect()
}

/// Progressive `(XXX) XXX-XXXX` formatting for partial input. Digits past
/// the tenth are dropped.
pub fn format_phone_number(value: &str) -> String {
    let d = digits(value);
    let len = d.len();

    if len >= PHONE_DIGITS {
        format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..10])
    } else if len > 6 {
        format!("({}) {}-{}", &d[..3], &d[3..6], &d[6..])
    } else if len > 3 {
        format!("({}) {}", &d[..3], &d[3..])
    } else if len > 0 {
        format!("({d}")
    } else {
        String::new()
    }
}

fn digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
