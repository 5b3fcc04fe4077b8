use error_stack::{Report, Result, ResultExt};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use validator::{Validate, ValidateError};

use crate::host::Permission;
use crate::util::{figment::FigmentErrorAttachable, validator::IntoValidatorReport};

mod logging;
mod portal;
mod registration;

pub use logging::{InvalidLoggingStyle, Logging, LoggingStyle};
pub use portal::Portal;
pub use registration::{Registration, DEFAULT_MEMBER_ID_PATTERN};

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub portal: Portal,
    pub registration: Registration,
    pub logging: Logging,
    pub store: Store,
    pub mail: Mail,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Store {
    /// JSON document holding users and groups.
    pub path: PathBuf,
    /// JSON document holding outstanding password reset codes.
    pub resets_path: PathBuf,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            path: PathBuf::from("members.json"),
            resets_path: PathBuf::from("resets.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Mail {
    /// Directory outgoing messages are written to.
    pub spool_dir: PathBuf,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            spool_dir: PathBuf::from("mail"),
        }
    }
}

/// Permissions granted to whoever runs the command line tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub granted: Vec<String>,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            granted: vec![
                Permission::ADD_PORTAL_MEMBER.name().into(),
                Permission::MAIL_FORGOTTEN_PASSWORD.name().into(),
            ],
        }
    }
}

impl Permissions {
    /// Known permissions among the granted names. Unknown names are
    /// reported by [`Config::validate`].
    pub fn resolve(&self) -> impl Iterator<Item = Permission> + '_ {
        self.granted.iter().filter_map(|v| Permission::from_name(v))
    }
}

impl Validate for Config {
    fn validate(&self) -> std::result::Result<(), ValidateError> {
        let mut fields = ValidateError::field_builder();
        if let Err(e) = self.portal.validate() {
            fields.insert("portal", e);
        }
        if let Err(e) = self.registration.validate() {
            fields.insert("registration", e);
        }
        fields.insert("permissions", {
            let mut error = ValidateError::msg_builder();
            for name in &self.permissions.granted {
                if Permission::from_name(name).is_none() {
                    error.insert(format!("Unknown permission {name:?}"));
                }
            }
            error.build()
        });
        fields.build().into_result()
    }
}

impl Config {
    const DEFAULT_CONFIG_FILE: &'static str = "registrar.toml";
    const CONFIG_FILE_VAR: &'static str = "REGISTRAR_CONFIG";

    /// Loads and validates the configuration from `path` (or the
    /// default config file) layered under `REGISTRAR_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        let path = match path {
            Some(path) => path.to_path_buf(),
            None => std::env::var_os(Self::CONFIG_FILE_VAR)
                .map_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_FILE), PathBuf::from),
        };

        let config = Self::figment(&path)
            .extract::<Self>()
            .map_err(|e| Report::new(ParseError).attach_figment_error(e))?;

        config
            .validate()
            .into_validator_report()
            .change_context(ParseError)?;

        Ok(config)
    }

    /// Creates the [`Figment`] the configuration is extracted from.
    /// A missing file is not an error, every key has a default.
    pub(crate) fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            // Env provider splits keys on every underscore, so the
            // keys with underscores in their names are mapped here.
            .merge(Env::prefixed("REGISTRAR_").map(|v| {
                match v.as_str().to_ascii_uppercase().as_str() {
                    "PORTAL_EMAIL_FROM_NAME" => "portal.email_from_name".into(),
                    "PORTAL_EMAIL_FROM_ADDRESS" => "portal.email_from_address".into(),

                    "REGISTRATION_MIN_PASSWORD_LENGTH" => {
                        "registration.min_password_length".into()
                    }
                    "REGISTRATION_MEMBER_ID_PATTERN" => "registration.member_id_pattern".into(),
                    "REGISTRATION_RESERVED_IDS" => "registration.reserved_ids".into(),
                    "REGISTRATION_RESET_EXPIRY_HOURS" => "registration.reset_expiry_hours".into(),
                    "REGISTRATION_DEFAULT_ROLES" => "registration.default_roles".into(),

                    "STORE_RESETS_PATH" => "store.resets_path".into(),
                    "MAIL_SPOOL_DIR" => "mail.spool_dir".into(),

                    other => other.to_ascii_lowercase().replacen('_', ".", 1).into(),
                }
            }))
    }
}
