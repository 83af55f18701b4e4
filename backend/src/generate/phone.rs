//! Phone number normalization and validation.

/// Values that show up where a phone number should be when a header row
/// leaks into the data.
const HEADER_TOKENS: [&str; 3] = ["phone", "telephone", "number"];

const MIN_DIGITS: usize = 7;
const MAX_DIGITS: usize = 15;

/// Remove every non-digit character.
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Whether a value is a phone column header rather than a number.
pub fn is_header_token(value: &str) -> bool {
    let lower = value.to_lowercase();
    HEADER_TOKENS.contains(&lower.as_str())
}

/// Whether a raw phone cell is usable.
///
/// Empty cells, "Landline Excluded" markers and numbers with fewer than
/// 7 or more than 15 digits are rejected.
pub fn is_valid_phone(phone: &str) -> bool {
    if phone.is_empty() {
        return false;
    }

    if phone.to_lowercase().contains("landline excluded") {
        return false;
    }

    let digits = normalize_phone(phone).len();
    (MIN_DIGITS..=MAX_DIGITS).contains(&digits)
}
