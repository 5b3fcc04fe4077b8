use clap::Parser;
use error_stack::ResultExt;
use registrar::member::{Group, Properties};
use registrar::util::Sensitive;
use registrar::{Error, Result};

use super::Session;

/// Register a new member
#[derive(Debug, Parser)]
pub struct JoinCommand {
    pub id: String,
    #[clap(long)]
    pub email: String,
    /// A password is generated and printed when left out.
    #[clap(long)]
    pub password: Option<String>,
    #[clap(long)]
    pub fullname: Option<String>,
    /// Roles granted instead of the configured default roles.
    #[clap(long = "role")]
    pub roles: Vec<String>,
    /// Send the welcome email once registered.
    #[clap(long)]
    pub notify: bool,
}

pub fn join(session: &Session, args: JoinCommand) -> Result<()> {
    let mut properties = Properties::new()
        .with(Properties::USERNAME, args.id.as_str())
        .with(Properties::EMAIL, args.email);
    if let Some(fullname) = args.fullname {
        properties.insert(Properties::FULLNAME, fullname);
    }

    let (password, generated) = match args.password {
        Some(password) => (Sensitive::new(password), false),
        None => (session.tool.generate_password(), true),
    };
    let shown = generated.then(|| password.as_str().to_string());

    let member = if args.roles.is_empty() {
        session
            .tool
            .add_member(&session.portal, &args.id, password, properties)?
    } else {
        session
            .tool
            .add_member_with_roles(&session.portal, &args.id, password, args.roles, properties)?
    };

    println!("Registered {} ({})", member.id, member.roles.join(", "));
    if let Some(password) = shown {
        println!("Generated password: {password}");
    }

    if args.notify {
        session.tool.registered_notify(&session.portal, &member.id)?;
        println!("Welcome email sent to {}", member.email().unwrap_or_default());
    }
    Ok(())
}

/// Create a group
#[derive(Debug, Parser)]
pub struct AddGroupCommand {
    pub id: String,
    #[clap(long)]
    pub title: Option<String>,
}

pub fn add_group(session: &Session, args: AddGroupCommand) -> Result<()> {
    // groups and members share one id namespace
    if !session.tool.is_member_id_allowed(&session.portal, &args.id)? {
        return Err(Error::invalid("group_id", "This id is already in use or is not valid."));
    }

    let group = Group {
        id: args.id,
        title: args.title,
    };
    session
        .portal
        .users
        .add_group(group.clone())
        .change_context(Error::Store)?;

    tracing::info!(group.id = %group.id, "added group");
    println!("Added group {}", group.id);
    Ok(())
}

/// Check whether a member id is still available
#[derive(Debug, Parser)]
pub struct CheckIdCommand {
    pub id: String,
}

pub fn check_id(session: &Session, args: &CheckIdCommand) -> Result<()> {
    if session.tool.is_member_id_allowed(&session.portal, &args.id)? {
        println!("{} is available", args.id);
    } else {
        println!("{} is not available", args.id);
    }
    Ok(())
}
