use super::*;
use figment::Jail;

#[test]
fn defaults_without_file() {
    Jail::expect_with(|_jail| {
        let config: Config = Config::figment(Path::new("registrar.toml")).extract()?;
        assert_eq!(config, Config::default());
        assert_eq!(config.portal.id, "plone");
        assert_eq!(config.registration.min_password_length, 5);
        assert_eq!(config.registration.member_id_pattern, DEFAULT_MEMBER_ID_PATTERN);
        Ok(())
    });
}

#[test]
fn file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "registrar.toml",
            r#"
            [portal]
            id = "site"
            title = "Täst Portal"
            email_from_name = "Täst Admin"
            email_from_address = "bar@baz.com"

            [registration]
            reserved_ids = ["admin", "root"]
            reset_expiry_hours = 24

            [logging]
            style = "compact"
            "#,
        )?;

        let config: Config = Config::figment(Path::new("registrar.toml")).extract()?;
        assert_eq!(config.portal.id, "site");
        assert_eq!(config.portal.title, "Täst Portal");
        assert_eq!(config.portal.email_from_address, "bar@baz.com");
        assert_eq!(config.registration.reserved_ids, vec!["admin", "root"]);
        assert_eq!(config.registration.reset_expiry_hours, 24);
        assert_eq!(config.logging.style, LoggingStyle::Compact);
        // untouched keys keep their defaults
        assert_eq!(config.registration.min_password_length, 5);
        Ok(())
    });
}

#[test]
fn env_aliases() {
    Jail::expect_with(|jail| {
        jail.set_env("REGISTRAR_PORTAL_TITLE", "Env Portal");
        jail.set_env("REGISTRAR_PORTAL_EMAIL_FROM_NAME", "Env Admin");
        jail.set_env("REGISTRAR_PORTAL_EMAIL_FROM_ADDRESS", "env@example.org");
        jail.set_env("REGISTRAR_REGISTRATION_MIN_PASSWORD_LENGTH", "8");
        jail.set_env("REGISTRAR_REGISTRATION_RESET_EXPIRY_HOURS", "12");
        jail.set_env("REGISTRAR_MAIL_SPOOL_DIR", "/var/spool/registrar");
        jail.set_env("REGISTRAR_STORE_PATH", "/var/lib/registrar/members.json");
        jail.set_env("REGISTRAR_STORE_RESETS_PATH", "/var/lib/registrar/resets.json");
        jail.set_env("REGISTRAR_LOGGING_STYLE", "json");

        let config: Config = Config::figment(Path::new("registrar.toml")).extract()?;
        assert_eq!(config.portal.title, "Env Portal");
        assert_eq!(config.portal.email_from_name, "Env Admin");
        assert_eq!(config.portal.email_from_address, "env@example.org");
        assert_eq!(config.registration.min_password_length, 8);
        assert_eq!(config.registration.reset_expiry_hours, 12);
        assert_eq!(config.mail.spool_dir, PathBuf::from("/var/spool/registrar"));
        assert_eq!(
            config.store.path,
            PathBuf::from("/var/lib/registrar/members.json")
        );
        assert_eq!(
            config.store.resets_path,
            PathBuf::from("/var/lib/registrar/resets.json")
        );
        assert_eq!(config.logging.style, LoggingStyle::JSON);
        Ok(())
    });
}

#[test]
fn env_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file("custom.toml", "[portal]\ntitle = \"From file\"\n")?;
        jail.set_env("REGISTRAR_PORTAL_TITLE", "From env");

        let config: Config = Config::figment(Path::new("custom.toml")).extract()?;
        assert_eq!(config.portal.title, "From env");
        Ok(())
    });
}

#[test]
fn load_validates() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "registrar.toml",
            r#"
            [portal]
            url = "not a url"
            email_from_address = "foo@bar.com, fred@bedrock.com"

            [registration]
            member_id_pattern = "(unclosed"

            [permissions]
            granted = ["Add portal member", "Fly"]
            "#,
        )?;

        let error = Config::load(None).unwrap_err();
        let rendered = format!("{error:?}");
        assert!(rendered.contains("portal.url"));
        assert!(rendered.contains("portal.email_from_address"));
        assert!(rendered.contains("registration.member_id_pattern"));
        assert!(rendered.contains("Unknown permission \"Fly\""));
        Ok(())
    });
}

#[test]
fn load_from_explicit_path() {
    Jail::expect_with(|jail| {
        jail.create_file("other.toml", "[portal]\nid = \"intranet\"\n")?;

        let config = Config::load(Some(Path::new("other.toml"))).unwrap();
        assert_eq!(config.portal.id, "intranet");
        assert_eq!(
            config.permissions.resolve().collect::<Vec<_>>(),
            vec![
                Permission::ADD_PORTAL_MEMBER,
                Permission::MAIL_FORGOTTEN_PASSWORD
            ]
        );
        Ok(())
    });
}

#[test]
fn bad_value_types_are_reported() {
    Jail::expect_with(|jail| {
        jail.set_env("REGISTRAR_REGISTRATION_MIN_PASSWORD_LENGTH", "many");

        let error = Config::load(None).unwrap_err();
        assert!(format!("{error:?}").to_lowercase().contains("min_password_length"));
        Ok(())
    });
}
