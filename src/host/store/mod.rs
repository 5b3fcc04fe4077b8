use error_stack::{Report, Result, ResultExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Digest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::member::{Group, Member};
use crate::util::Sensitive;

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

/// User store related errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The id already names a user or a group.
    #[error("principal {0:?} already exists")]
    Duplicate(String),
    /// No user with this id exists.
    #[error("user {0:?} does not exist")]
    NotFound(String),
    /// The backing file could not be read or written.
    #[error("could not access the user store file")]
    Io,
    /// The backing file holds malformed data.
    #[error("could not parse the user store file")]
    Corrupted,
}

/// Host collaborator holding users and groups.
///
/// Lookups are always exact: an id is only found when it matches
/// a stored id character by character.
pub trait UserStore: Send + Sync {
    fn add_user(&self, member: Member, password: Sensitive<String>) -> Result<(), StoreError>;

    fn add_group(&self, group: Group) -> Result<(), StoreError>;

    fn get_user(&self, id: &str) -> Result<Option<Member>, StoreError>;

    fn get_group(&self, id: &str) -> Result<Option<Group>, StoreError>;

    fn set_password(&self, id: &str, password: Sensitive<String>) -> Result<(), StoreError>;

    /// Checks the given password against the stored one.
    fn authenticate(&self, id: &str, password: &str) -> Result<bool, StoreError>;

    fn user_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_user(id)?.is_some())
    }

    fn group_exists(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.get_group(id)?.is_some())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
struct StoredUser {
    #[serde(flatten)]
    member: Member,
    password_hash: String,
}

/// Users and groups shared by the in-memory and file backed stores.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct Principals {
    #[serde(default)]
    users: BTreeMap<String, StoredUser>,
    #[serde(default)]
    groups: BTreeMap<String, Group>,
}

impl Principals {
    fn is_taken(&self, id: &str) -> bool {
        self.users.contains_key(id) || self.groups.contains_key(id)
    }

    fn add_user(&mut self, member: Member, password: &Sensitive<String>) -> Result<(), StoreError> {
        if self.is_taken(&member.id) {
            return Err(Report::new(StoreError::Duplicate(member.id)));
        }

        let password_hash = hash_password(&member.id, password.as_str());
        self.users.insert(
            member.id.clone(),
            StoredUser {
                member,
                password_hash,
            },
        );
        Ok(())
    }

    fn add_group(&mut self, group: Group) -> Result<(), StoreError> {
        if self.is_taken(&group.id) {
            return Err(Report::new(StoreError::Duplicate(group.id)));
        }
        self.groups.insert(group.id.clone(), group);
        Ok(())
    }

    fn get_user(&self, id: &str) -> Option<Member> {
        self.users.get(id).map(|v| v.member.clone())
    }

    fn get_group(&self, id: &str) -> Option<Group> {
        self.groups.get(id).cloned()
    }

    fn set_password(&mut self, id: &str, password: &Sensitive<String>) -> Result<(), StoreError> {
        let Some(user) = self.users.get_mut(id) else {
            return Err(Report::new(StoreError::NotFound(id.to_string())));
        };
        user.password_hash = hash_password(id, password.as_str());
        Ok(())
    }

    fn authenticate(&self, id: &str, password: &str) -> bool {
        self.users
            .get(id)
            .is_some_and(|user| user.password_hash == hash_password(id, password))
    }
}

// The member id salts the digest so equal passwords of
// different members never share a hash.
fn hash_password(id: &str, password: &str) -> String {
    let mut hasher = sha2::Sha512::default();
    hasher.update(format!("{id}:{password}"));
    hex::encode(hasher.finalize())
}

/// Reads a JSON document, `None` when the file does not exist yet.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match std::fs::read(path) {
        Ok(bytes) => serde_json::from_slice::<T>(&bytes)
            .change_context(StoreError::Corrupted)
            .attach_printable_lazy(|| format!("in {}", path.display()))
            .map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e)
            .change_context(StoreError::Io)
            .attach_printable_lazy(|| format!("could not read {}", path.display())),
    }
}

/// Replaces the document at `path` through a temporary sibling
/// file, so readers never see a half written document.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value).change_context(StoreError::Io)?;

    if let Some(parent) = path.parent().filter(|v| !v.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .change_context(StoreError::Io)
            .attach_printable_lazy(|| format!("could not create {}", parent.display()))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    std::fs::write(&tmp, bytes)
        .change_context(StoreError::Io)
        .attach_printable_lazy(|| format!("could not write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .change_context(StoreError::Io)
        .attach_printable_lazy(|| format!("could not replace {}", path.display()))?;

    Ok(())
}
