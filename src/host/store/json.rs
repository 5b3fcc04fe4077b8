use error_stack::Result;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use super::{read_json, write_json, Principals, StoreError, UserStore};
use crate::member::{Group, Member};
use crate::util::Sensitive;

/// Users and groups persisted to a single JSON document.
///
/// The whole document is rewritten after every change. A failed
/// write leaves both the file and the in-memory copy untouched.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    principals: RwLock<Principals>,
}

impl JsonFileStore {
    /// Opens the store, a missing file is treated as an empty store.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let principals = read_json::<Principals>(&path)?.unwrap_or_else(|| {
            tracing::debug!("user store file does not exist yet, starting empty");
            Principals::default()
        });

        Ok(Self {
            path,
            principals: RwLock::new(principals),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    // Applies `change` on a copy and only swaps it in once the
    // copy has been written to disk.
    fn modify(
        &self,
        change: impl FnOnce(&mut Principals) -> Result<(), StoreError>,
    ) -> Result<(), StoreError> {
        let mut principals = self
            .principals
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let mut draft = principals.clone();
        change(&mut draft)?;
        write_json(&self.path, &draft)?;

        *principals = draft;
        Ok(())
    }
}

impl UserStore for JsonFileStore {
    fn add_user(&self, member: Member, password: Sensitive<String>) -> Result<(), StoreError> {
        self.modify(|principals| principals.add_user(member, &password))
    }

    fn add_group(&self, group: Group) -> Result<(), StoreError> {
        self.modify(|principals| principals.add_group(group))
    }

    fn get_user(&self, id: &str) -> Result<Option<Member>, StoreError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_user(id))
    }

    fn get_group(&self, id: &str) -> Result<Option<Group>, StoreError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get_group(id))
    }

    fn set_password(&self, id: &str, password: Sensitive<String>) -> Result<(), StoreError> {
        self.modify(|principals| principals.set_password(id, &password))
    }

    fn authenticate(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticate(id, password))
    }
}
