use serde::Deserialize;
use validator::{extras, Validate, ValidateError};

/// Site-wide settings of the portal members register with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Portal {
    /// Id of the portal object itself, never available as a member id.
    pub id: String,
    pub title: String,
    /// Public base URL, used to build links inside notifications.
    pub url: String,
    pub email_from_name: String,
    pub email_from_address: String,
}

impl Default for Portal {
    fn default() -> Self {
        Self {
            id: "plone".into(),
            title: "Site".into(),
            url: "http://localhost:8080/plone".into(),
            email_from_name: "Site Administrator".into(),
            email_from_address: "postmaster@localhost".into(),
        }
    }
}

impl Portal {
    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Validate for Portal {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("id", {
            let mut error = ValidateError::msg_builder();
            if self.id.trim().is_empty() {
                error.insert("Portal id must not be empty");
            }
            error.build()
        });
        fields.insert("url", {
            let mut error = ValidateError::msg_builder();
            if !extras::validate_url(&self.url) {
                error.insert("Portal url must be an absolute http(s) URL");
            }
            error.build()
        });
        fields.insert("email_from_address", {
            let mut error = ValidateError::msg_builder();
            if !extras::validate_email(&self.email_from_address) {
                error.insert("Invalid sender e-mail address");
            }
            error.build()
        });
        fields.build().into_result()
    }
}
