//! Capabilities supplied by the hosting platform: the user store,
//! the permission gate, the utility registry and mail delivery.

use std::sync::Arc;

mod mail;
mod permissions;
mod store;
mod utilities;

pub use mail::{MailError, MailHost, MemoryMailHost, SpoolMailHost};
pub use permissions::{Permission, PermissionGate, StaticPermissions};
pub use store::{InMemoryStore, JsonFileStore, StoreError, UserStore};
pub(crate) use store::{read_json, write_json};
pub use utilities::Utilities;

use crate::config;

/// The site registration operates on, bundled with the host
/// collaborators serving it.
#[derive(Clone)]
pub struct Portal {
    pub settings: config::Portal,
    pub users: Arc<dyn UserStore>,
    pub permissions: Arc<dyn PermissionGate>,
    pub utilities: Arc<Utilities>,
}

impl Portal {
    #[must_use]
    pub fn new(
        settings: config::Portal,
        users: Arc<dyn UserStore>,
        permissions: Arc<dyn PermissionGate>,
    ) -> Self {
        Self {
            settings,
            users,
            permissions,
            utilities: Arc::new(Utilities::new()),
        }
    }

    /// The portal's own id, it can never be taken by a member.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.settings.id
    }

    #[must_use]
    pub fn mail_host(&self) -> Option<Arc<dyn MailHost>> {
        self.utilities.lookup::<dyn MailHost>()
    }
}

impl std::fmt::Debug for Portal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Portal")
            .field("settings", &self.settings)
            .field("utilities", &self.utilities)
            .finish_non_exhaustive()
    }
}
