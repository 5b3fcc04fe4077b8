use clap::Parser;
use registrar::Result;

use super::Session;

#[derive(Debug, Parser)]
pub struct NotifyCommand {
    pub id: String,
}

pub fn registered(session: &Session, args: &NotifyCommand) -> Result<()> {
    session.tool.registered_notify(&session.portal, &args.id)?;
    println!("Welcome email for {} spooled", args.id);
    Ok(())
}

pub fn mail_password(session: &Session, args: &NotifyCommand) -> Result<()> {
    session.tool.mail_password(&session.portal, &args.id)?;
    println!("Password reset email for {} spooled", args.id);
    Ok(())
}
