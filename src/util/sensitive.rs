use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// Keeps passwords, seeds and reset codes in memory without
/// leaking them through the console or logs.
#[derive(Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<hidden>")
    }
}

impl<T> Display for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<hidden>")
    }
}

impl<T> AsRef<T> for Sensitive<T> {
    fn as_ref(&self) -> &T {
        &self.0
    }
}

impl<T: AsRef<str>> Sensitive<T> {
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_str().chars().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl From<&str> for Sensitive<String> {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::borrow::Borrow<str> for Sensitive<String> {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Sensitive;
    use serde::{Deserialize, Serialize};
    use serde_test::Token;

    #[test]
    fn test_serde_impl() {
        #[derive(Debug, PartialEq, Deserialize, Serialize)]
        struct Credentials {
            pub login: String,
            pub password: Sensitive<String>,
        }

        let credentials = Credentials {
            login: "new_member".into(),
            password: "secret".into(),
        };
        serde_test::assert_tokens(
            &credentials,
            &[
                Token::Struct {
                    name: "Credentials",
                    len: 2,
                },
                Token::Str("login"),
                Token::Str("new_member"),
                Token::Str("password"),
                Token::Str("secret"),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_fmt() {
        let value = Sensitive::new("hello");
        assert_eq!(value.to_string(), "<hidden>");
        assert_eq!(format!("{value:?}"), "<hidden>");
    }

    #[test]
    fn test_len_counts_chars() {
        let value = Sensitive::<String>::from("Täst");
        assert_eq!(value.len(), 4);
        assert!(!value.is_empty());
    }
}
