use clap::Parser;
use error_stack::{Result, ResultExt};
use registrar::config::Config;
use registrar::host::{JsonFileStore, MailHost, Portal, SpoolMailHost, StaticPermissions};
use registrar::registration::{RegistrationTool, ResetRequests};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

mod member;
mod notify;
mod password;
mod reset;

#[derive(Debug, Error)]
#[error("Failed to run command")]
pub struct CliError;

/// Command line options for registrar.
#[derive(Debug, Parser)]
#[command(
    about = "Registers portal members and mails their account details",
    version,
    author,
    long_about
)]
pub struct Cli {
    /// Configuration file, defaults to `registrar.toml`.
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[clap(subcommand)]
    pub subcommand: Subcommand,
}

impl Cli {
    pub fn run(self) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref()).change_context(CliError)?;
        registrar::logging::init(&config.logging).change_context(CliError)?;

        let session = Session::open(&config)?;
        let result = match self.subcommand {
            Subcommand::Join(args) => self::member::join(&session, args),
            Subcommand::AddGroup(args) => self::member::add_group(&session, args),
            Subcommand::CheckId(args) => self::member::check_id(&session, &args),
            Subcommand::Notify(args) => self::notify::registered(&session, &args),
            Subcommand::MailPassword(args) => self::notify::mail_password(&session, &args),
            Subcommand::ResetPassword(args) => self::reset::run(&session, args),
            Subcommand::Password(args) => {
                self::password::run(&session, &args);
                Ok(())
            }
        };
        result.change_context(CliError)
    }
}

#[derive(Debug, Parser)]
pub enum Subcommand {
    /// Register a new member
    Join(self::member::JoinCommand),
    /// Create a group, its id can no longer be taken by members
    AddGroup(self::member::AddGroupCommand),
    /// Check whether a member id is still available
    CheckId(self::member::CheckIdCommand),
    /// Send the welcome email to a member
    Notify(self::notify::NotifyCommand),
    /// Send a password reset email to a member
    MailPassword(self::notify::NotifyCommand),
    /// Set a new password with the code from a reset email
    ResetPassword(self::reset::ResetPasswordCommand),
    /// Generate a password
    Password(self::password::PasswordCommand),
}

/// Everything a command needs to act on the configured portal.
pub struct Session {
    pub portal: Portal,
    pub tool: RegistrationTool,
}

impl Session {
    fn open(config: &Config) -> Result<Self, CliError> {
        let store = JsonFileStore::open(&config.store.path).change_context(CliError)?;
        let permissions = config.permissions.resolve().collect::<StaticPermissions>();

        let portal = Portal::new(config.portal.clone(), Arc::new(store), Arc::new(permissions));
        let mail: Arc<dyn MailHost> = Arc::new(SpoolMailHost::new(&config.mail.spool_dir));
        portal.utilities.register::<dyn MailHost>(mail);

        let resets = ResetRequests::open(&config.store.resets_path).change_context(CliError)?;
        let tool = RegistrationTool::new(config.registration.clone())
            .change_context(CliError)?
            .with_resets(resets);
        Ok(Self { portal, tool })
    }
}
