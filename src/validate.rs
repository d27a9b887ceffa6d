//! Field validation for user form input.
//!
//! Validation is pure and runs on every submission attempt. All three
//! rules are applied independently so the user sees every failing field
//! at once, not just the first.

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static AGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

pub const NAME_MESSAGE: &str = "Name must only contain letters.";
pub const EMAIL_MESSAGE: &str = "Please enter a valid email.";
pub const AGE_MESSAGE: &str = "Age must only contain numbers.";

/// Per-field verdicts from one validation pass. A `Some` holds the
/// message to show for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub name: Option<&'static str>,
    pub email: Option<&'static str>,
    pub age: Option<&'static str>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }

    /// Messages for the failing fields, in field order.
    pub fn messages(&self) -> Vec<&'static str> {
        [self.name, self.email, self.age]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Validate the three raw text inputs. No short-circuit: every rule
/// runs so the verdict covers all fields.
pub fn validate(name: &str, email: &str, age: &str) -> Verdict {
    Verdict {
        name: (!NAME_RE.is_match(name)).then_some(NAME_MESSAGE),
        email: (!EMAIL_RE.is_match(email)).then_some(EMAIL_MESSAGE),
        age: (!AGE_RE.is_match(age)).then_some(AGE_MESSAGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_inputs() {
        let v = validate("Jane Doe", "jane@example.com", "29");
        assert!(v.is_valid());
        assert!(v.messages().is_empty());
    }

    #[test]
    fn test_name_rejects_digits_and_symbols() {
        assert_eq!(validate("Jane1", "a@b.c", "1").name, Some(NAME_MESSAGE));
        assert_eq!(validate("Jane!", "a@b.c", "1").name, Some(NAME_MESSAGE));
        assert_eq!(validate("", "a@b.c", "1").name, Some(NAME_MESSAGE));
    }

    #[test]
    fn test_name_allows_letters_and_whitespace() {
        assert!(validate("Jane Doe", "a@b.c", "1").name.is_none());
        assert!(validate("Mary Ann Smith", "a@b.c", "1").name.is_none());
    }

    #[test]
    fn test_email_shape() {
        assert!(validate("A", "jane@example.com", "1").email.is_none());
        assert_eq!(
            validate("A", "bad-email", "1").email,
            Some(EMAIL_MESSAGE)
        );
        // Missing dot after the @ part
        assert_eq!(validate("A", "jane@example", "1").email, Some(EMAIL_MESSAGE));
        // Embedded whitespace
        assert_eq!(
            validate("A", "jane doe@example.com", "1").email,
            Some(EMAIL_MESSAGE)
        );
        // Second @
        assert_eq!(
            validate("A", "jane@@example.com", "1").email,
            Some(EMAIL_MESSAGE)
        );
    }

    #[test]
    fn test_age_digits_only() {
        assert!(validate("A", "a@b.c", "0").age.is_none());
        assert!(validate("A", "a@b.c", "120").age.is_none());
        assert_eq!(validate("A", "a@b.c", "").age, Some(AGE_MESSAGE));
        assert_eq!(validate("A", "a@b.c", "abc").age, Some(AGE_MESSAGE));
        assert_eq!(validate("A", "a@b.c", "29 ").age, Some(AGE_MESSAGE));
        assert_eq!(validate("A", "a@b.c", "-3").age, Some(AGE_MESSAGE));
    }

    #[test]
    fn test_all_fields_fail_independently() {
        let v = validate("Jane1", "bad-email", "abc");
        assert_eq!(v.name, Some(NAME_MESSAGE));
        assert_eq!(v.email, Some(EMAIL_MESSAGE));
        assert_eq!(v.age, Some(AGE_MESSAGE));
        assert_eq!(v.messages().len(), 3);
    }
}
