use std::borrow::Cow;
use validator::{extras, ValidateError};

use super::RegistrationTool;
use crate::member::Properties;

pub(super) const MEMBER_ID_TAKEN: &str =
    "The login name you selected is already in use or is not valid. Please choose another.";

impl RegistrationTool {
    /// Whether `email` is exactly one syntactically valid address.
    #[must_use]
    pub fn is_valid_email(&self, email: &str) -> bool {
        extras::validate_email(email.trim())
    }

    /// Checks a new password and, when given, its confirmation.
    pub fn test_password_validity(
        &self,
        password: &str,
        confirm: Option<&str>,
    ) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("password", {
            let mut error = ValidateError::msg_builder();
            if password.chars().count() < self.settings.min_password_length {
                error.insert(format!(
                    "Your password must contain at least {} characters.",
                    self.settings.min_password_length
                ));
            }
            error.build()
        });

        if let Some(confirm) = confirm {
            let mut error = ValidateError::msg_builder();
            if password != confirm {
                error.insert("Your password and confirmation did not match.");
            }
            fields.insert("confirm_password", error.build());
        }

        fields.build().into_result()
    }

    /// Checks the profile properties of a member about to register.
    pub fn test_properties_validity(&self, properties: &Properties) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert(Properties::EMAIL, {
            let mut error = ValidateError::msg_builder();
            if let Some(message) = self.email_problem(properties.email()) {
                error.insert(message);
            }
            error.build()
        });
        fields.build().into_result()
    }

    fn email_problem(&self, email: Option<&str>) -> Option<Cow<'static, str>> {
        let email = email.map(str::trim).unwrap_or_default();
        if email.is_empty() {
            Some("You must enter an email address.".into())
        } else if !extras::is_single_address(email) {
            Some("You must enter a single email address.".into())
        } else if !self.is_valid_email(email) {
            Some("You must enter a valid email address.".into())
        } else {
            None
        }
    }
}
