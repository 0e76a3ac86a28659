use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_describe_an_anonymous_local_client() {
    let settings = Settings::default();
    assert_eq!(settings.server_url, "http://127.0.0.1:8080");
    assert_eq!(settings.auth_context(), AuthContext::anonymous());
    assert!(settings.http_options().request_timeout.is_none());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
server_url = "https://wiki.example.org"
email = "alice@x.com"
role = "Admin"
request_timeout_secs = 30
"#,
    );

    assert_eq!(settings.server_url, "https://wiki.example.org");
    assert_eq!(settings.role, Role::Admin);
    assert_eq!(settings.request_timeout_secs, Some(30));
    assert!(settings.auth_context().can_administer());
}

#[test]
fn environment_overrides_file() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "server_url = \"https://file.example\"\nrole = \"Read\"\n");
    apply_env(
        &mut settings,
        env_from(&[
            ("GUFF_SERVER_URL", "https://env.example"),
            ("GUFF_ROLE", "write"),
            ("GUFF_AUTH_COOKIE", "abc"),
        ]),
    );

    assert_eq!(settings.server_url, "https://env.example");
    assert_eq!(settings.role, Role::Write);
    assert_eq!(settings.http_options().auth_cookie.as_deref(), Some("abc"));
}

#[test]
fn invalid_values_are_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "role = \"Owner\"\n");
    apply_env(
        &mut settings,
        env_from(&[("GUFF_ROLE", "root"), ("GUFF_REQUEST_TIMEOUT_SECS", "soon")]),
    );
    assert_eq!(settings.role, Role::Pending);
    assert_eq!(settings.request_timeout_secs, None);

    apply_file(&mut settings, "this is not toml = = =");
    assert_eq!(settings, Settings::default());
}

#[test]
fn missing_email_means_anonymous_even_with_role() {
    let settings = Settings {
        role: Role::Admin,
        ..Settings::default()
    };
    assert!(!settings.auth_context().can_administer());
}

#[test]
fn loads_settings_file_from_disk() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = env::temp_dir().join(format!("guff_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("guff.toml");
    fs::write(&path, "email = \"bob@x.com\"\nrole = \"Write\"\n").expect("write");

    let settings = load_settings(&path);
    if env::var("GUFF_EMAIL").is_err() {
        assert_eq!(settings.email.as_deref(), Some("bob@x.com"));
    }

    fs::remove_dir_all(temp_root).expect("cleanup");
}
