use indexmap::IndexMap;
use serde::{ser::SerializeMap, Serialize};
use std::borrow::Cow;

pub struct MessageBuilder(Vec<Cow<'static, str>>);

impl MessageBuilder {
  #[must_use]
  pub const fn new() -> Self {
    Self(Vec::new())
  }

  pub fn insert(&mut self, message: impl Into<Cow<'static, str>>) {
    self.0.push(message.into());
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Messages(self.0)
  }
}

pub struct FieldBuilder(IndexMap<Cow<'static, str>, ValidateError>);

#[allow(clippy::new_without_default)]
impl FieldBuilder {
  #[must_use]
  pub fn new() -> Self {
    Self(IndexMap::default())
  }

  /// Empty errors are skipped so callers can insert
  /// every checked field unconditionally.
  pub fn insert(&mut self, key: impl Into<Cow<'static, str>>, value: ValidateError) {
    if !value.is_empty() {
      self.0.insert(key.into(), value);
    }
  }

  #[must_use]
  pub fn build(self) -> ValidateError {
    ValidateError::Fields(self.0)
  }
}

// ---------------------------------------------------- //

#[derive(Clone, PartialEq, Eq)]
pub enum ValidateError {
  Fields(IndexMap<Cow<'static, str>, ValidateError>),
  Messages(Vec<Cow<'static, str>>),
}

impl std::fmt::Display for ValidateError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    fn write_messages(
      err: &ValidateError,
      path: &mut Vec<String>,
      f: &mut std::fmt::Formatter<'_>,
      first: &mut bool,
    ) -> std::fmt::Result {
      match err {
        ValidateError::Fields(fields) => {
          for (field, data) in fields {
            path.push(field.to_string());
            write_messages(data, path, f, first)?;
            path.pop();
          }
          Ok(())
        },
        ValidateError::Messages(messages) => {
          let field = path.join(".");
          for message in messages {
            if !*first {
              f.write_str("; ")?;
            }
            *first = false;
            if field.is_empty() {
              f.write_str(message)?;
            } else {
              write!(f, "{field}: {message}")?;
            }
          }
          Ok(())
        },
      }
    }

    if self.is_empty() {
      return f.write_str("Invalid data occurred");
    }

    let mut first = true;
    write_messages(self, &mut Vec::new(), f, &mut first)
  }
}

impl std::error::Error for ValidateError {}

impl std::fmt::Debug for ValidateError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ValidateError::Fields(n) => n.fmt(f),
      ValidateError::Messages(n) => f.debug_map().entry(&"_errors", &n).finish(),
    }
  }
}

impl ValidateError {
  #[must_use]
  pub fn field_builder() -> FieldBuilder {
    FieldBuilder::new()
  }

  #[must_use]
  pub fn msg_builder() -> MessageBuilder {
    MessageBuilder::new()
  }

  /// Shorthand for an error holding one message under one field.
  #[must_use]
  pub fn field(key: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
    let mut msg = Self::msg_builder();
    msg.insert(message);

    let mut fields = Self::field_builder();
    fields.insert(key, msg.build());
    fields.build()
  }
}

impl ValidateError {
  #[must_use]
  pub fn is_empty(&self) -> bool {
    match self {
      ValidateError::Fields(n) => n.is_empty(),
      ValidateError::Messages(n) => n.is_empty(),
    }
  }

  /// Looks up the messages recorded for a top-level field.
  #[must_use]
  pub fn messages_of(&self, key: &str) -> Option<&[Cow<'static, str>]> {
    match self {
      ValidateError::Fields(fields) => match fields.get(key)? {
        ValidateError::Messages(messages) => Some(messages),
        ValidateError::Fields(..) => None,
      },
      ValidateError::Messages(..) => None,
    }
  }

  #[must_use]
  pub fn has_field(&self, key: &str) -> bool {
    match self {
      ValidateError::Fields(fields) => fields.contains_key(key),
      ValidateError::Messages(..) => false,
    }
  }

  /// Merges the fields of `other` into this error. Messages under
  /// the same field are appended.
  pub fn merge(&mut self, other: ValidateError) {
    match (self, other) {
      (ValidateError::Fields(this), ValidateError::Fields(other)) => {
        for (key, value) in other {
          match this.get_mut(&key) {
            Some(existing) => existing.merge(value),
            None => {
              this.insert(key, value);
            },
          }
        }
      },
      (ValidateError::Messages(this), ValidateError::Messages(other)) => {
        this.extend(other);
      },
      (this, other) => {
        if this.is_empty() {
          *this = other;
        }
      },
    }
  }

  pub fn into_result(self) -> Result<(), Self> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(self)
    }
  }
}

impl Serialize for ValidateError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    match self {
      ValidateError::Fields(n) => {
        let mut map = serializer.serialize_map(Some(n.len()))?;
        for (key, value) in n {
          map.serialize_entry(key, value)?;
        }
        map.end()
      },
      ValidateError::Messages(n) => {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("_errors", &n)?;
        map.end()
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::Validate;

  use super::*;
  use serde_test::Token;

  #[derive(Debug)]
  struct Signup {
    email: &'static str,
    password: &'static str,
  }

  impl Validate for Signup {
    fn validate(&self) -> Result<(), ValidateError> {
      let mut fields = ValidateError::field_builder();
      fields.insert("email", {
        let mut msg = ValidateError::msg_builder();
        if self.email.is_empty() {
          msg.insert("You must enter an email address.");
        }
        msg.build()
      });
      fields.insert("password", {
        let mut msg = ValidateError::msg_builder();
        if self.password.len() < 5 {
          msg.insert("Your password must contain at least 5 characters.");
        }
        msg.build()
      });
      fields.build().into_result()
    }
  }

  #[test]
  fn test_debug_fmt() {
    const EXPECTED_FMT_MSG: &str = r#"{"email": {"_errors": ["You must enter an email address."]}}"#;

    let error = Signup { email: "", password: "secret" }.validate().unwrap_err();
    assert_eq!(EXPECTED_FMT_MSG, format!("{error:?}"));
  }

  #[test]
  fn test_display_fmt() {
    let error = Signup { email: "", password: "abc" }.validate().unwrap_err();
    assert_eq!(
      "email: You must enter an email address.; password: Your password must contain at least 5 characters.",
      error.to_string()
    );
  }

  #[test]
  fn test_serialize_impl() {
    let error = Signup { email: "", password: "secret" }.validate().unwrap_err();
    serde_test::assert_ser_tokens(
      &error,
      &[
        Token::Map { len: Some(1) },
        Token::Str("email"),
        Token::Map { len: Some(1) },
        Token::Str("_errors"),
        Token::Seq { len: Some(1) },
        Token::Str("You must enter an email address."),
        Token::SeqEnd,
        Token::MapEnd,
        Token::MapEnd,
      ],
    );
  }

  #[test]
  fn test_messages_of() {
    let error = ValidateError::field("member_id", "already taken");
    assert_eq!(error.messages_of("member_id").unwrap(), &["already taken"]);
    assert!(error.messages_of("email").is_none());
    assert!(error.has_field("member_id"));
  }

  #[test]
  fn test_merge() {
    let mut error = ValidateError::field("email", "first");
    error.merge(ValidateError::field("email", "second"));
    error.merge(ValidateError::field("password", "third"));

    assert_eq!(error.messages_of("email").unwrap(), &["first", "second"]);
    assert_eq!(error.messages_of("password").unwrap(), &["third"]);
  }

  #[test]
  fn validate_error_is_empty() {
    assert!(MessageBuilder::new().build().is_empty());
    assert!(FieldBuilder::new().build().is_empty());
    assert!(Signup { email: "foo@bar.com", password: "secret" }.validate().is_ok());

    let mut msg = MessageBuilder::new();
    msg.insert("Hello world!");
    assert!(!msg.build().is_empty());

    let mut err = FieldBuilder::new();
    err.insert("microbar", MessageBuilder::new().build());
    assert!(err.build().is_empty());
  }
}
