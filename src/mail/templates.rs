//! Fixed bodies and subjects of the notifications sent to members.

use chrono::{DateTime, Utc};
use std::fmt::Write;

pub const PASSWORD_RESET_SUBJECT: &str = "Password reset request";

/// Values interpolated into both notification bodies.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    pub portal_title: &'a str,
    pub portal_url: &'a str,
    pub from_name: &'a str,
    pub from_address: &'a str,
    pub member_id: &'a str,
    pub member_name: &'a str,
    pub reset_url: &'a str,
    pub expires: DateTime<Utc>,
}

#[must_use]
pub fn welcome_subject(portal_title: &str) -> String {
    format!("User Account Information for {portal_title}")
}

#[must_use]
pub fn welcome_body(ctx: &Context<'_>) -> String {
    let mut body = String::new();
    // writing into a String cannot fail
    write!(
        body,
        "Welcome {name},\n\
         \n\
         your user account has been created.\n\
         Your user name is: {id}\n\
         \n\
         Please activate it by visiting\n\
         \n\
         {url}\n\
         \n\
         Please activate your account before {expires}.\n\
         \n\
         With kind regards,\n",
        name = ctx.member_name,
        id = ctx.member_id,
        url = ctx.reset_url,
        expires = format_expiry(ctx.expires),
    )
    .ok();
    write_signature(&mut body, ctx);
    body
}

#[must_use]
pub fn password_reset_body(ctx: &Context<'_>) -> String {
    let mut body = String::new();
    write!(
        body,
        "Password reset request for {title}\n\
         \n\
         Someone, hopefully you, asked to reset the password of the\n\
         account \"{id}\".\n\
         \n\
         The following link takes you to a page where you can set a\n\
         new password:\n\
         \n\
         {url}\n\
         \n\
         The link is valid until {expires}. If you did not ask for a\n\
         new password you can safely ignore this message.\n\
         \n\
         With kind regards,\n",
        title = ctx.portal_title,
        id = ctx.member_id,
        url = ctx.reset_url,
        expires = format_expiry(ctx.expires),
    )
    .ok();
    write_signature(&mut body, ctx);
    body
}

fn write_signature(body: &mut String, ctx: &Context<'_>) {
    write!(
        body,
        "\n\
         -- \n\
         {name}\n\
         {title} <{url}>\n\
         {address}\n",
        name = ctx.from_name,
        title = ctx.portal_title,
        url = ctx.portal_url,
        address = ctx.from_address,
    )
    .ok();
}

fn format_expiry(expires: DateTime<Utc>) -> String {
    expires.format("%Y-%m-%d %H:%M UTC").to_string()
}
