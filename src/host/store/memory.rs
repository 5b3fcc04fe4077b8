use error_stack::Result;
use std::sync::{PoisonError, RwLock};

use super::{Principals, StoreError, UserStore};
use crate::member::{Group, Member};
use crate::util::Sensitive;

/// Keeps every user and group in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    principals: RwLock<Principals>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryStore {
    fn add_user(&self, member: Member, password: Sensitive<String>) -> Result<(), StoreError> {
        self.principals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_user(member, &password)
    }

    fn add_group(&self, group: Group) -> Result<(), StoreError> {
        self.principals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_group(group)
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
        self.principals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set_password(id, &password)
    }

    fn authenticate(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        Ok(self
            .principals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .authenticate(id, password))
    }
}
