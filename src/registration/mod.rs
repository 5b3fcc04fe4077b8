//! Member registration: account creation, member id checks,
//! notifications and password (re)generation.

use chrono::{Duration, Utc};
use error_stack::{Report, ResultExt};
use regex::Regex;
use validator::ValidateError;

use crate::config;
use crate::error::{Error, Result};
use crate::host::{Permission, Portal, StoreError};
use crate::member::{Member, Properties, MEMBER_ROLE};
use crate::password::PasswordGenerator;
use crate::util::Sensitive;

mod notify;
mod reset;
mod validation;

pub use reset::{ResetError, ResetRequest, ResetRequests};

/// Registers members of a [`Portal`] and looks after their
/// passwords.
#[derive(Debug)]
pub struct RegistrationTool {
    settings: config::Registration,
    member_id_pattern: Regex,
    passwords: PasswordGenerator,
    resets: ResetRequests,
}

impl RegistrationTool {
    pub const GENERATED_PASSWORD_LENGTH: usize = 6;
    pub const RESET_CODE_LENGTH: usize = 20;

    pub fn new(settings: config::Registration) -> Result<Self> {
        let member_id_pattern = Regex::new(&settings.member_id_pattern)
            .change_context_lazy(|| {
                Error::Invalid(ValidateError::field(
                    "member_id_pattern",
                    "Invalid member id pattern",
                ))
            })?;

        Ok(Self {
            settings,
            member_id_pattern,
            passwords: PasswordGenerator::new(),
            resets: ResetRequests::new(),
        })
    }

    /// Keeps reset requests in `resets` instead of in memory.
    #[must_use]
    pub fn with_resets(mut self, resets: ResetRequests) -> Self {
        self.resets = resets;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &config::Registration {
        &self.settings
    }

    #[must_use]
    pub fn passwords(&self) -> &PasswordGenerator {
        &self.passwords
    }

    #[must_use]
    pub fn resets(&self) -> &ResetRequests {
        &self.resets
    }
}

impl RegistrationTool {
    /// Registers a member with the configured default roles.
    pub fn add_member(
        &self,
        portal: &Portal,
        id: &str,
        password: Sensitive<String>,
        properties: Properties,
    ) -> Result<Member> {
        let roles = self.settings.default_roles.clone();
        self.add_member_with_roles(portal, id, password, roles, properties)
    }

    /// Validates the request and creates the account.
    ///
    /// Anyone allowed to add portal members may grant the `Member`
    /// role, any other role requires the `Manage users` permission.
    #[tracing::instrument(skip_all, fields(member.id = %id))]
    pub fn add_member_with_roles(
        &self,
        portal: &Portal,
        id: &str,
        password: Sensitive<String>,
        roles: Vec<String>,
        properties: Properties,
    ) -> Result<Member> {
        require_permission(portal, Permission::ADD_PORTAL_MEMBER)?;
        if roles.iter().any(|role| role != MEMBER_ROLE) {
            require_permission(portal, Permission::MANAGE_USERS)?;
        }

        if !self.is_member_id_allowed(portal, id)? {
            tracing::debug!("member id is not available");
            return Err(Error::invalid("member_id", validation::MEMBER_ID_TAKEN));
        }

        let mut problems = ValidateError::field_builder().build();
        if let Err(e) = self.test_password_validity(password.as_str(), None) {
            problems.merge(e);
        }
        if let Err(e) = self.test_properties_validity(&properties) {
            problems.merge(e);
        }
        if !problems.is_empty() {
            tracing::debug!(?problems, "rejected registration");
            return Err(Report::new(Error::Invalid(problems)));
        }

        let member = Member {
            id: id.to_string(),
            roles,
            properties,
            created_at: Utc::now(),
        };

        portal
            .users
            .add_user(member.clone(), password)
            .map_err(|report| {
                // someone else took the id since it was checked
                if matches!(report.current_context(), StoreError::Duplicate(..)) {
                    report.change_context(Error::Invalid(ValidateError::field(
                        "member_id",
                        validation::MEMBER_ID_TAKEN,
                    )))
                } else {
                    report.change_context(Error::Store)
                }
            })?;

        tracing::info!("registered new member");
        Ok(member)
    }

    /// Whether `id` can still be registered.
    ///
    /// Only exact matches against existing users, groups, the portal
    /// id and the reserved ids make an id unavailable.
    #[tracing::instrument(skip_all, fields(member.id = %id))]
    pub fn is_member_id_allowed(&self, portal: &Portal, id: &str) -> Result<bool> {
        if id.is_empty() || !self.member_id_pattern.is_match(id) {
            return Ok(false);
        }

        if id == portal.id() || self.settings.reserved_ids.iter().any(|v| v == id) {
            return Ok(false);
        }

        let taken = portal.users.user_exists(id).change_context(Error::Store)?
            || portal.users.group_exists(id).change_context(Error::Store)?;

        Ok(!taken)
    }

    /// Resets a member's password with a code from a reset request.
    #[tracing::instrument(skip_all, fields(member.id = %member_id))]
    pub fn reset_password(
        &self,
        portal: &Portal,
        member_id: &str,
        code: &str,
        password: Sensitive<String>,
        confirm: Option<&str>,
    ) -> Result<()> {
        if let Err(e) = self.resets.verify(code, member_id, Utc::now()) {
            tracing::warn!(reason = %e, "rejected password reset");
            let message = match e {
                ResetError::Unknown | ResetError::WrongMember => "Invalid password reset code.",
                ResetError::Expired => "Your password reset request has expired.",
            };
            return Err(Error::invalid("code", message).attach_printable(e));
        }

        self.test_password_validity(password.as_str(), confirm)
            .map_err(|e| Report::new(Error::Invalid(e)))?;

        portal
            .users
            .set_password(member_id, password)
            .map_err(|report| {
                if matches!(report.current_context(), StoreError::NotFound(..)) {
                    report.change_context(Error::Invalid(ValidateError::field(
                        "member_id",
                        "The member could not be found.",
                    )))
                } else {
                    report.change_context(Error::Store)
                }
            })?;

        self.resets.consume(code).change_context(Error::Store)?;
        tracing::info!("password has been reset");
        Ok(())
    }
}

impl RegistrationTool {
    /// Random when `salt` is absent, otherwise the same string for
    /// the same length and salt.
    #[must_use]
    pub fn get_password(&self, length: usize, salt: Option<&str>) -> Sensitive<String> {
        self.passwords.generate(length, salt)
    }

    #[must_use]
    pub fn generate_password(&self) -> Sensitive<String> {
        self.get_password(Self::GENERATED_PASSWORD_LENGTH, None)
    }

    #[must_use]
    pub fn generate_reset_code(&self, salt: &str) -> Sensitive<String> {
        self.get_password(Self::RESET_CODE_LENGTH, Some(salt))
    }

    fn reset_expiry(&self) -> Duration {
        Duration::hours(i64::from(self.settings.reset_expiry_hours))
    }
}

fn require_permission(portal: &Portal, permission: Permission) -> Result<()> {
    if portal.permissions.check_permission(permission) {
        Ok(())
    } else {
        tracing::warn!(%permission, "permission denied");
        Err(Report::new(Error::Unauthorized(permission)))
    }
}
