use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidateError};

use crate::member::MEMBER_ROLE;

pub const DEFAULT_MEMBER_ID_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*$";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Registration {
    /// Passwords shorter than this (in characters) are rejected.
    pub min_password_length: usize,
    /// Member ids must match this pattern.
    pub member_id_pattern: String,
    /// Ids that can never be registered, on top of the portal id.
    pub reserved_ids: Vec<String>,
    /// How long password reset links stay usable.
    pub reset_expiry_hours: u32,
    /// Roles granted when a member registers without asking for any.
    pub default_roles: Vec<String>,
}

impl Default for Registration {
    fn default() -> Self {
        Self {
            min_password_length: 5,
            member_id_pattern: DEFAULT_MEMBER_ID_PATTERN.into(),
            reserved_ids: vec!["Anonymous User".into()],
            reset_expiry_hours: 168,
            default_roles: vec![MEMBER_ROLE.into()],
        }
    }
}

impl Validate for Registration {
    fn validate(&self) -> Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        fields.insert("member_id_pattern", {
            let mut error = ValidateError::msg_builder();
            if let Err(e) = Regex::new(&self.member_id_pattern) {
                error.insert(format!("Invalid member id pattern: {e}"));
            }
            error.build()
        });
        fields.insert("min_password_length", {
            let mut error = ValidateError::msg_builder();
            if self.min_password_length == 0 {
                error.insert("Minimum password length must be at least 1");
            }
            error.build()
        });
        fields.insert("reset_expiry_hours", {
            let mut error = ValidateError::msg_builder();
            if self.reset_expiry_hours == 0 {
                error.insert("Reset links must stay valid for at least an hour");
            }
            error.build()
        });
        fields.build().into_result()
    }
}
