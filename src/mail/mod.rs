use chrono::{DateTime, Utc};
use error_stack::{Report, Result};
use thiserror::Error;

pub mod encoding;
pub mod templates;

const MESSAGE_ID_CHARSET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("message has no sender address")]
    MissingSender,
    #[error("message has no recipient address")]
    MissingRecipient,
}

/// A single-part `text/plain` email ready to be handed to a
/// [mail host](crate::host::MailHost).
///
/// Header values are stored already encoded, the body is stored
/// quoted-printable encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    headers: Vec<(&'static str, String)>,
    date: DateTime<Utc>,
    body: String,
}

impl Message {
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Looks up a header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The encoded payload.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        write!(f, "\r\n{}\r\n", self.body)
    }
}

#[derive(Debug, Default)]
pub struct MessageBuilder {
    from: Option<(String, String)>,
    to: Option<String>,
    subject: String,
    body: String,
    date: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    #[must_use]
    pub fn from(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.from = Some((name.into(), address.into()));
        self
    }

    #[must_use]
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to = Some(address.into());
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn build(self) -> Result<Message, MessageError> {
        let (from_name, from_address) = self
            .from
            .filter(|(_, address)| !address.trim().is_empty())
            .ok_or_else(|| Report::new(MessageError::MissingSender))?;

        let to = self
            .to
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| Report::new(MessageError::MissingRecipient))?;

        let date = self.date.unwrap_or_else(Utc::now);
        let domain = from_address
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain);
        let message_id = format!(
            "<{}.{}@{domain}>",
            date.timestamp_micros(),
            random_string::generate(12, MESSAGE_ID_CHARSET)
        );
        let content_type = format!(
            "{}; charset=\"{}\"",
            mime::TEXT_PLAIN.essence_str(),
            encoding::CHARSET
        );

        let headers = vec![
            ("Date", date.to_rfc2822()),
            ("From", encoding::format_address(&from_name, &from_address)),
            ("To", to),
            ("Subject", encoding::encode_word(&self.subject)),
            ("Message-ID", message_id),
            ("MIME-Version", "1.0".to_string()),
            ("Content-Type", content_type),
            ("Content-Transfer-Encoding", "quoted-printable".to_string()),
        ];

        Ok(Message {
            headers,
            date,
            body: encoding::quoted_printable(&self.body),
        })
    }
}
