//! Validation primitives
//!
//! Pure predicates over strings, integers and timestamps. Entity constructors
//! and setters combine them into either the normalization tier (coerce to a
//! sentinel, collect a [`ValidationWarning`]) or the strict tier (return a
//! [`ValidationError`]).

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

pub const SECONDS_PER_DAY: i64 = 86_400;
pub const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

pub const MIN_PUBLICATION_YEAR: i32 = 1000;
pub const MAX_PUBLICATION_YEAR: i32 = 2025;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Non-fatal diagnostic produced when an input was coerced or ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    pub field: &'static str,
    pub message: String,
}

impl ValidationWarning {
    /// Build a warning and emit it as a diagnostic
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("{}: {}", field, message);
        Self { field, message }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// A value that went through the normalization tier, with the warnings it raised
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub warnings: Vec<ValidationWarning>,
}

impl<T> Normalized<T> {
    pub fn new(value: T, warnings: Vec<ValidationWarning>) -> Self {
        Self { value, warnings }
    }

    pub fn clean(value: T) -> Self {
        Self::new(value, Vec::new())
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Normalized<U> {
        Normalized {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Identifier made of alnum/`_`/`-` with a character count in `[min, max]`
pub fn is_valid_identifier(id: &str, min: usize, max: usize) -> bool {
    let len = id.chars().count();
    !id.is_empty() && len >= min && len <= max && id.chars().all(is_id_char)
}

/// Strict identifier check: non-empty, at most `max` chars, alnum/`_`/`-`
pub fn check_identifier(field: &'static str, id: &str, max: usize) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if id.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if !id.chars().all(is_id_char) {
        return Err(ValidationError::InvalidCharacters(field));
    }
    Ok(())
}

/// Strict free-text check: non-empty, at most `max` chars, not whitespace-only
pub fn check_text(field: &'static str, text: &str, max: usize) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    if text.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    if text.trim().is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(())
}

/// Strict length check with both bounds
pub fn check_length(
    field: &'static str,
    text: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::Empty(field));
    }
    let len = text.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if len > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// At least two characters, at least one ASCII letter
pub fn is_valid_label(text: &str) -> bool {
    text.chars().count() >= 2 && text.chars().any(|c| c.is_ascii_alphabetic())
}

pub fn is_valid_resource_id(id: &str) -> bool {
    is_valid_identifier(id, 3, usize::MAX)
}

pub fn is_valid_publication_year(year: i32) -> bool {
    (MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&year)
}

pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.chars().count() <= 100 && EMAIL_PATTERN.is_match(email)
}

/// Letters, spaces, `-` and `'`, at most 50 chars
pub fn is_valid_person_name(name: &str) -> bool {
    !name.is_empty()
        && name.chars().count() <= 50
        && name
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'')
}

/// `value` in the half-open interval `(0, max]`
pub fn is_positive_at_most(value: i32, max: i32) -> bool {
    value > 0 && value <= max
}

/// ISBN-10 or ISBN-13 (separators `-` and space ignored), or the `N/A` placeholder
pub fn is_valid_isbn(isbn: &str) -> bool {
    if isbn.is_empty() || isbn == "N/A" {
        return true;
    }
    let digits: Vec<char> = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
    let Some((last, body)) = digits.split_last() else {
        return false;
    };
    if digits.len() != 10 && digits.len() != 13 {
        return false;
    }
    body.iter().all(|c| c.is_ascii_digit())
        && (last.is_ascii_digit() || (digits.len() == 10 && *last == 'X'))
}

/// Empty, `N/A`, or a `10.` prefix followed by something
pub fn is_valid_doi(doi: &str) -> bool {
    doi.is_empty() || doi == "N/A" || (doi.len() > 3 && doi.starts_with("10."))
}

/// `-1` on either side means "no range"; otherwise positive, ordered, span under 1000
pub fn is_valid_page_range(start: i32, end: i32) -> bool {
    if start == -1 || end == -1 {
        return true;
    }
    start > 0 && end > 0 && start <= end && end - start < 1000
}

/// Not negative and no later than `now + tolerance`
pub fn is_not_after(date: i64, now: i64, tolerance: i64) -> bool {
    date >= 0 && date <= now.saturating_add(tolerance)
}

/// Within `[now - past, now + future]`
pub fn is_within_window(date: i64, now: i64, past: i64, future: i64) -> bool {
    date >= now.saturating_sub(past) && date <= now.saturating_add(future)
}

/// Case-insensitive substring test; an empty needle never matches
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_bounds() {
        assert!(is_valid_identifier("abc", 3, 20));
        assert!(is_valid_identifier("user_01-x", 3, 20));
        assert!(!is_valid_identifier("ab", 3, 20));
        assert!(!is_valid_identifier(&"a".repeat(21), 3, 20));
        assert!(!is_valid_identifier("bad id", 3, 20));
        assert!(!is_valid_identifier("", 0, 20));
    }

    #[test]
    fn test_check_identifier_reports_reason() {
        assert_eq!(check_identifier("Event ID", "", 30), Err(ValidationError::Empty("Event ID")));
        assert_eq!(
            check_identifier("Event ID", "x!", 30),
            Err(ValidationError::InvalidCharacters("Event ID"))
        );
        assert_eq!(
            check_identifier("Event ID", &"e".repeat(31), 30),
            Err(ValidationError::TooLong { field: "Event ID", max: 30 })
        );
        assert!(check_identifier("Event ID", "EVT1001", 30).is_ok());
    }

    #[test]
    fn test_check_text_rejects_blank() {
        assert_eq!(check_text("title", "   \t", 100), Err(ValidationError::Blank("title")));
        assert!(check_text("title", "Reading club", 100).is_ok());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("admin@library.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("a@b.c"));
        assert!(!is_valid_email(&format!("{}@x.com", "a".repeat(100))));
    }

    #[test]
    fn test_person_name() {
        assert!(is_valid_person_name("Anne-Marie O'Neil"));
        assert!(!is_valid_person_name("R2D2"));
        assert!(!is_valid_person_name(&"a".repeat(51)));
    }

    #[test]
    fn test_isbn() {
        assert!(is_valid_isbn("0306406152"));
        assert!(is_valid_isbn("978-0-306-40615-7"));
        assert!(is_valid_isbn("080442957X"));
        assert!(is_valid_isbn("N/A"));
        assert!(!is_valid_isbn("abc"));
        assert!(!is_valid_isbn("978030640615X"));
        assert!(!is_valid_isbn("12345"));
    }

    #[test]
    fn test_doi_and_page_range() {
        assert!(is_valid_doi("10.1000/xyz"));
        assert!(is_valid_doi(""));
        assert!(!is_valid_doi("xyz"));
        assert!(!is_valid_doi("10."));

        assert!(is_valid_page_range(-1, 40));
        assert!(is_valid_page_range(10, 1009));
        assert!(!is_valid_page_range(10, 1010));
        assert!(!is_valid_page_range(20, 10));
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("The Rust Book", "rust"));
        assert!(!contains_ignore_case("The Rust Book", ""));
        assert!(!contains_ignore_case("", "rust"));
    }
}
