use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config;
use crate::host::{InMemoryStore, MailHost, MemoryMailHost, Portal, StaticPermissions, UserStore};
use crate::member::{Group, Member, Properties};
use crate::registration::RegistrationTool;

pub const MEMBER_ID: &str = "new_member";

pub struct Fixture {
    pub portal: Portal,
    pub tool: RegistrationTool,
    pub store: Arc<InMemoryStore>,
    pub mail: Arc<MemoryMailHost>,
}

/// A portal with user `userid` (password `password`), group
/// `groupid` and a recording mail host, where every permission is
/// granted.
pub fn fixture() -> Fixture {
    fixture_with(StaticPermissions::allow_all())
}

pub fn fixture_with(permissions: StaticPermissions) -> Fixture {
    crate::logging::init_for_tests();

    let store = Arc::new(InMemoryStore::new());
    store
        .add_user(bare_member("userid"), "password".into())
        .unwrap();
    store.add_group(Group::new("groupid")).unwrap();

    let portal = Portal::new(portal_settings(), store.clone(), Arc::new(permissions));
    let mail = Arc::new(MemoryMailHost::new());
    portal
        .utilities
        .register::<dyn MailHost>(mail.clone());

    Fixture {
        portal,
        tool: RegistrationTool::new(config::Registration::default()).unwrap(),
        store,
        mail,
    }
}

pub fn portal_settings() -> config::Portal {
    config::Portal {
        id: "plone".into(),
        title: "Täst Portal".into(),
        url: "http://localhost:8080/plone".into(),
        email_from_name: "Täst Admin".into(),
        email_from_address: "bar@baz.com".into(),
    }
}

pub fn member_properties() -> Properties {
    Properties::new()
        .with(Properties::USERNAME, MEMBER_ID)
        .with(Properties::EMAIL, "foo@bar.com")
}

/// A user without any properties, as created by the host itself.
pub fn bare_member(id: &str) -> Member {
    Member {
        id: id.to_string(),
        roles: Vec::new(),
        properties: Properties::new(),
        created_at: Utc::now(),
    }
}

/// An empty directory under the system temp dir, unique to this
/// process and `name`.
pub fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("registrar-{}-{name}", std::process::id()));
    std::fs::remove_dir_all(&dir).ok();
    dir
}
