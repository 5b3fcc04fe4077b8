use clap::Parser;
use registrar::util::Sensitive;
use registrar::Result;

use super::Session;

/// Set a new password with the code from a reset email
#[derive(Debug, Parser)]
pub struct ResetPasswordCommand {
    pub id: String,
    /// The code at the end of the emailed reset link.
    pub code: String,
    /// A password is generated and printed when left out.
    #[clap(long)]
    pub password: Option<String>,
}

pub fn run(session: &Session, args: ResetPasswordCommand) -> Result<()> {
    let (password, shown) = match args.password {
        Some(password) => (Sensitive::new(password), None),
        None => {
            let password = session.tool.generate_password();
            let shown = password.as_str().to_string();
            (password, Some(shown))
        }
    };

    session
        .tool
        .reset_password(&session.portal, &args.id, args.code.trim(), password, None)?;

    println!("Password of {} has been reset", args.id);
    if let Some(password) = shown {
        println!("Generated password: {password}");
    }
    Ok(())
}
