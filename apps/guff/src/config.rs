use std::{collections::HashMap, fs, path::Path, time::Duration};

use client_core::HttpOptions;
use shared::domain::{AuthContext, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub email: Option<String>,
    pub role: Role,
    pub auth_cookie: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            email: None,
            role: Role::Pending,
            auth_cookie: None,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Identity the front end renders controls for.
    pub fn auth_context(&self) -> AuthContext {
        match self.email.as_deref() {
            Some(email) if !email.is_empty() => AuthContext::signed_in(email, self.role),
            _ => AuthContext::anonymous(),
        }
    }

    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            auth_cookie: self.auth_cookie.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Defaults, then the optional settings file, then `GUFF_*` environment
/// variables.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!("ignoring unreadable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("email").and_then(toml::Value::as_str) {
        settings.email = Some(v.to_string());
    }
    if let Some(role) = file_cfg
        .get("role")
        .and_then(toml::Value::as_str)
        .and_then(|v| v.parse().ok())
    {
        settings.role = role;
    }
    if let Some(v) = file_cfg.get("auth_cookie").and_then(toml::Value::as_str) {
        settings.auth_cookie = Some(v.to_string());
    }
    if let Some(secs) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = Some(secs);
    }
}

pub(crate) fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("GUFF_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("GUFF_EMAIL") {
        settings.email = Some(v);
    }
    if let Some(v) = lookup("GUFF_ROLE") {
        match v.parse() {
            Ok(role) => settings.role = role,
            Err(err) => tracing::warn!("ignoring GUFF_ROLE: {err}"),
        }
    }
    if let Some(v) = lookup("GUFF_AUTH_COOKIE") {
        settings.auth_cookie = Some(v);
    }
    if let Some(v) = lookup("GUFF_REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
