use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role every registered account receives.
pub const MEMBER_ROLE: &str = "Member";

/// A registered account of the portal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Member {
    pub id: String,
    pub roles: Vec<String>,
    pub properties: Properties,
    pub created_at: DateTime<Utc>,
}

impl Member {
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.properties.email()
    }

    /// Name used to greet the member, falls back to the
    /// username property and then to the member id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.properties
            .fullname()
            .or_else(|| self.properties.get(Properties::USERNAME))
            .unwrap_or(self.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Group {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
        }
    }
}

/// Profile fields attached to a member (`username`, `email`,
/// `fullname` and anything else the portal collects).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub const EMAIL: &'static str = "email";
    pub const FULLNAME: &'static str = "fullname";
    pub const USERNAME: &'static str = "username";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get(Self::EMAIL)
    }

    #[must_use]
    pub fn fullname(&self) -> Option<&str> {
        self.get(Self::FULLNAME).filter(|v| !v.trim().is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
