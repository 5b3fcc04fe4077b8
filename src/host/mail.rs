use error_stack::{Result, ResultExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

use crate::mail::Message;

#[derive(Debug, Error)]
#[error("Failed to deliver email")]
pub struct MailError;

/// Host collaborator handing fully formed messages to
/// whatever delivers them.
pub trait MailHost: Send + Sync {
    fn send(&self, message: &Message) -> Result<(), MailError>;
}

/// Keeps every rendered message in memory instead of delivering it.
#[derive(Debug, Default)]
pub struct MemoryMailHost {
    messages: Mutex<Vec<String>>,
}

impl MemoryMailHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered messages in the order they were sent.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MailHost for MemoryMailHost {
    fn send(&self, message: &Message) -> Result<(), MailError> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        Ok(())
    }
}

/// Writes every message as an `.eml` file into a spool directory
/// for an external agent to pick up.
#[derive(Debug)]
pub struct SpoolMailHost {
    dir: PathBuf,
    sent: AtomicUsize,
}

impl SpoolMailHost {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sent: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MailHost for SpoolMailHost {
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    fn send(&self, message: &Message) -> Result<(), MailError> {
        std::fs::create_dir_all(&self.dir)
            .change_context(MailError)
            .attach_printable_lazy(|| format!("could not create {}", self.dir.display()))?;

        let sequence = self.sent.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{}-{sequence}.eml",
            message.date().format("%Y%m%dT%H%M%S%.6f"),
            std::process::id()
        );
        let path = self.dir.join(name);

        std::fs::write(&path, message.to_string())
            .change_context(MailError)
            .attach_printable_lazy(|| format!("could not write {}", path.display()))?;

        tracing::info!(path = %path.display(), "spooled email");
        Ok(())
    }
}
