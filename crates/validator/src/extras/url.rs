use url::Url;

/// Only absolute `http` and `https` URLs are accepted since they
/// end up as links inside outgoing messages.
#[must_use]
pub fn validate_url(url: &str) -> bool {
  Url::parse(url).is_ok_and(|v| matches!(v.scheme(), "http" | "https"))
}

#[cfg(test)]
mod tests {
  use super::validate_url;

  #[test]
  fn test_validate_url() {
    assert!(validate_url("http://localhost:8080/plone"));
    assert!(validate_url("https://example.org"));
    assert!(!validate_url("ftp://example.org"));
    assert!(!validate_url("/relative/path"));
  }
}
