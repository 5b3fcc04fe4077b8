use clap::Parser;
use registrar::RegistrationTool;

use super::Session;

/// Generate a password
///
/// Salted passwords only repeat within one run, the seed they
/// are derived from is not kept between runs.
#[derive(Debug, Parser)]
pub struct PasswordCommand {
    #[clap(long, default_value_t = RegistrationTool::GENERATED_PASSWORD_LENGTH)]
    pub length: usize,
    #[clap(long)]
    pub salt: Option<String>,
}

pub fn run(session: &Session, args: &PasswordCommand) {
    let password = session.tool.get_password(args.length, args.salt.as_deref());
    println!("{}", password.as_str());
}
