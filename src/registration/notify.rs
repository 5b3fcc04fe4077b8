use chrono::Utc;
use error_stack::{Report, ResultExt};

use super::RegistrationTool;
use crate::error::{Error, Result};
use crate::host::{Permission, Portal};
use crate::mail::{templates, Message};
use crate::member::Member;
use crate::password::PASSWORD_CHARS;
use crate::util::Sensitive;

const NONCE_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy)]
enum Notification {
    Welcome,
    PasswordReset,
}

impl RegistrationTool {
    /// Sends the welcome message to a freshly registered member.
    #[tracing::instrument(skip_all, fields(member.id = %member_id))]
    pub fn registered_notify(&self, portal: &Portal, member_id: &str) -> Result<()> {
        self.notify(portal, member_id, Notification::Welcome)
    }

    /// Sends a password reset link to a member.
    #[tracing::instrument(skip_all, fields(member.id = %member_id))]
    pub fn mail_password(&self, portal: &Portal, member_id: &str) -> Result<()> {
        super::require_permission(portal, Permission::MAIL_FORGOTTEN_PASSWORD)?;
        self.notify(portal, member_id, Notification::PasswordReset)
    }

    #[must_use]
    pub fn reset_url(&self, portal: &Portal, code: &str) -> String {
        format!("{}/passwordreset/{code}", portal.settings.base_url())
    }

    fn notify(&self, portal: &Portal, member_id: &str, kind: Notification) -> Result<()> {
        let member = self.recipient(portal, member_id)?;
        let Some(email) = member.email().map(str::trim) else {
            return Err(Error::invalid("email", "The member has no email address."));
        };

        let code = self.issue_reset_code(member_id);
        let expires = Utc::now() + self.reset_expiry();

        let settings = &portal.settings;
        let reset_url = self.reset_url(portal, code.as_str());
        let context = templates::Context {
            portal_title: &settings.title,
            portal_url: settings.base_url(),
            from_name: &settings.email_from_name,
            from_address: &settings.email_from_address,
            member_id,
            member_name: member.display_name(),
            reset_url: &reset_url,
            expires,
        };

        let (subject, body) = match kind {
            Notification::Welcome => (
                templates::welcome_subject(&settings.title),
                templates::welcome_body(&context),
            ),
            Notification::PasswordReset => (
                templates::PASSWORD_RESET_SUBJECT.to_string(),
                templates::password_reset_body(&context),
            ),
        };

        let message = Message::builder()
            .from(&settings.email_from_name, &settings.email_from_address)
            .to(email)
            .subject(subject)
            .body(body)
            .build()
            .change_context(Error::Mail)?;

        let Some(mail_host) = portal.mail_host() else {
            return Err(Report::new(Error::Mail).attach_printable("no mail host is registered"));
        };

        // the code has to be redeemable by the time the mail arrives
        self.resets
            .insert(&code, member_id, expires)
            .change_context(Error::Store)?;

        if let Err(report) = mail_host.send(&message) {
            self.withdraw(code.as_str());
            return Err(report.change_context(Error::Mail));
        }

        tracing::info!(?kind, "notification sent");
        Ok(())
    }

    fn recipient(&self, portal: &Portal, member_id: &str) -> Result<Member> {
        let member = portal
            .users
            .get_user(member_id)
            .change_context(Error::Store)?
            .ok_or_else(|| Error::invalid("member_id", "The member could not be found."))?;

        if !member.email().is_some_and(|v| self.is_valid_email(v)) {
            tracing::debug!("member has no usable email address");
            return Err(Error::invalid("email", "The member has no valid email address."));
        }

        Ok(member)
    }

    fn withdraw(&self, code: &str) {
        if let Err(error) = self.resets.consume(code) {
            tracing::warn!(?error, "could not withdraw unsent password reset code");
        }
    }

    fn issue_reset_code(&self, member_id: &str) -> Sensitive<String> {
        let nonce = random_string::generate(NONCE_LENGTH, PASSWORD_CHARS);
        self.generate_reset_code(&format!("{member_id}:{nonce}"))
    }
}
