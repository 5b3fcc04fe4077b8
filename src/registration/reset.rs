use chrono::{DateTime, Utc};
use error_stack::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::host::{read_json, write_json, StoreError};
use crate::util::Sensitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResetError {
    #[error("unknown password reset code")]
    Unknown,
    #[error("password reset code was issued for another member")]
    WrongMember,
    #[error("password reset code has expired")]
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResetRequest {
    pub member_id: String,
    pub expires: DateTime<Utc>,
}

type Requests = HashMap<String, ResetRequest>;

/// Outstanding password reset codes.
///
/// Codes are kept as SHA-256 digests. Requests opened from a file
/// are written back after every change, so a code mailed by one
/// process can be redeemed by another.
#[derive(Debug, Default)]
pub struct ResetRequests {
    path: Option<PathBuf>,
    requests: Mutex<Requests>,
}

impl ResetRequests {
    /// Requests held in memory only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens file backed requests, a missing file means none are
    /// outstanding.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let requests = read_json::<Requests>(&path)?.unwrap_or_default();

        Ok(Self {
            path: Some(path),
            requests: Mutex::new(requests),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stores a new request. Requests that already expired are
    /// dropped on the way.
    pub fn insert(
        &self,
        code: &Sensitive<String>,
        member_id: &str,
        expires: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let request = ResetRequest {
            member_id: member_id.to_string(),
            expires,
        };
        let purged = self.modify(|requests| {
            let purged = retain_unexpired(requests, now);
            requests.insert(digest(code.as_str()), request);
            purged
        })?;

        if purged > 0 {
            tracing::debug!(purged, "dropped expired password reset codes");
        }
        Ok(())
    }

    /// Checks that `code` is outstanding, belongs to `member_id` and
    /// has not expired at `now`. Expired codes are dropped.
    pub fn verify(&self, code: &str, member_id: &str, now: DateTime<Utc>) -> std::result::Result<(), ResetError> {
        let key = digest(code);
        let request = self.lock().get(&key).cloned().ok_or(ResetError::Unknown)?;
        if request.member_id != member_id {
            return Err(ResetError::WrongMember);
        }
        if request.expires <= now {
            if let Err(error) = self.modify(|requests| requests.remove(&key)) {
                tracing::warn!(?error, "could not drop expired password reset code");
            }
            return Err(ResetError::Expired);
        }
        Ok(())
    }

    pub fn consume(&self, code: &str) -> Result<Option<ResetRequest>, StoreError> {
        let key = digest(code);
        self.modify(|requests| requests.remove(&key))
    }

    /// Drops every request expired at `now` and returns how many
    /// were dropped.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        self.modify(|requests| retain_unexpired(requests, now))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Same draft-then-swap scheme as the JSON user store.
    fn modify<T>(&self, change: impl FnOnce(&mut Requests) -> T) -> Result<T, StoreError> {
        let mut requests = self.lock();
        let Some(path) = &self.path else {
            return Ok(change(&mut requests));
        };

        let mut draft = requests.clone();
        let output = change(&mut draft);
        write_json(path, &draft)?;

        *requests = draft;
        Ok(output)
    }

    fn lock(&self) -> MutexGuard<'_, Requests> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn retain_unexpired(requests: &mut Requests, now: DateTime<Utc>) -> usize {
    let before = requests.len();
    requests.retain(|_, request| request.expires > now);
    before - requests.len()
}

fn digest(code: &str) -> String {
    hex::encode(Sha256::digest(code.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scratch_path;
    use chrono::Duration;

    fn code(value: &str) -> Sensitive<String> {
        Sensitive::new(value.to_string())
    }

    #[test]
    fn verify_and_consume() {
        let requests = ResetRequests::new();
        let now = Utc::now();
        requests
            .insert(&code("abc"), "new_member", now + Duration::hours(1))
            .unwrap();

        assert_eq!(requests.verify("abc", "new_member", now), Ok(()));
        assert_eq!(
            requests.verify("abc", "userid", now),
            Err(ResetError::WrongMember)
        );
        assert_eq!(
            requests.verify("xyz", "new_member", now),
            Err(ResetError::Unknown)
        );

        assert!(requests.consume("abc").unwrap().is_some());
        assert_eq!(
            requests.verify("abc", "new_member", now),
            Err(ResetError::Unknown)
        );
    }

    #[test]
    fn expired_codes_are_dropped() {
        let requests = ResetRequests::new();
        let now = Utc::now();
        requests
            .insert(&code("early"), "a", now + Duration::hours(1))
            .unwrap();
        requests
            .insert(&code("later"), "b", now + Duration::hours(3))
            .unwrap();
        requests
            .insert(&code("last"), "c", now + Duration::hours(5))
            .unwrap();

        let in_two_hours = now + Duration::hours(2);
        assert_eq!(
            requests.verify("early", "a", in_two_hours),
            Err(ResetError::Expired)
        );
        assert_eq!(requests.len(), 2);

        assert_eq!(requests.purge_expired(now + Duration::hours(4)).unwrap(), 1);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests.verify("last", "c", in_two_hours), Ok(()));
    }

    #[test]
    fn inserting_drops_expired_requests() {
        let requests = ResetRequests::new();
        let now = Utc::now();
        for (i, minutes) in [1, 5, 60].into_iter().enumerate() {
            requests
                .insert(&code(&format!("stale{i}")), "a", now - Duration::minutes(minutes))
                .unwrap();
        }

        requests
            .insert(&code("fresh"), "a", now + Duration::hours(1))
            .unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests.verify("fresh", "a", now), Ok(()));
    }

    #[test]
    fn survives_reopening() {
        let path = scratch_path("resets-reopen").join("resets.json");
        let now = Utc::now();
        {
            let requests = ResetRequests::open(&path).unwrap();
            assert!(requests.is_empty());
            requests
                .insert(&code("abc"), "new_member", now + Duration::hours(1))
                .unwrap();
        }

        // codes never reach the file in clear text
        let stored = std::fs::read_to_string(&path).unwrap();
        assert!(!stored.contains("\"abc\""));

        let requests = ResetRequests::open(&path).unwrap();
        assert_eq!(requests.verify("abc", "new_member", now), Ok(()));
        assert!(requests.consume("abc").unwrap().is_some());

        let requests = ResetRequests::open(&path).unwrap();
        assert_eq!(
            requests.verify("abc", "new_member", now),
            Err(ResetError::Unknown)
        );
    }

    #[test]
    fn corrupted_file() {
        let path = scratch_path("resets-corrupted").join("resets.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"[1, 2").unwrap();

        let error = ResetRequests::open(&path).unwrap_err();
        assert!(matches!(error.current_context(), StoreError::Corrupted));
    }
}
