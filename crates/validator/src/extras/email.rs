use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::unwrap_used)]
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap()
});

pub const EMAIL_MAX_LEN: usize = 254;

/// Validates a single e-mail address.
///
/// Address lists (`foo@bar.com, fred@bedrock.com`) and display
/// name forms (`Foo <foo@bar.com>`) are rejected, letter case is
/// not significant.
#[must_use]
pub fn validate_email(email: &str) -> bool {
  email.len() <= EMAIL_MAX_LEN && is_single_address(email) && EMAIL_REGEX.is_match(email)
}

/// Whether the value does not look like a list of addresses.
#[must_use]
pub fn is_single_address(value: &str) -> bool {
  !value.contains(&[',', ';'][..]) && value.matches('@').count() <= 1
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_validate_email() {
    assert!(validate_email("foo@bar.com"));
    assert!(validate_email("FOO@BAR.COM"));
    assert!(validate_email("first.last+tag@sub.example.org"));

    assert!(!validate_email(""));
    assert!(!validate_email("nada_neutho"));
    assert!(!validate_email("foo@bar.com, fred@bedrock.com"));
    assert!(!validate_email("foo@bar.com;fred@bedrock.com"));
    assert!(!validate_email("Foo <foo@bar.com>"));
    assert!(!validate_email("foo@@bar.com"));
  }

  #[test]
  fn test_is_single_address() {
    assert!(is_single_address("foo@bar.com"));
    assert!(!is_single_address("foo@bar.com,"));
    assert!(!is_single_address("foo@bar.com fred@bedrock.com"));
  }
}
