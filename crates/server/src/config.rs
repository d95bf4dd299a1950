use std::{fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;
pub const SETTINGS_FILE: &str = "server.toml";

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub max_body_bytes: usize,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/contact.db".into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_filter: "info".into(),
        }
    }
}

/// Keys accepted in `server.toml`. All optional; unknown keys are an error.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    max_body_bytes: Option<usize>,
    log_filter: Option<String>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let file_cfg = read_file_settings(Path::new(SETTINGS_FILE))?;
    Ok(resolve_settings(&file_cfg, |key| std::env::var(key).ok()))
}

/// A missing file means defaults; an unreadable or malformed one is an error.
pub(crate) fn read_file_settings(path: &Path) -> anyhow::Result<FileSettings> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(FileSettings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };
    parse_file_settings(&raw).with_context(|| format!("invalid settings in '{}'", path.display()))
}

pub(crate) fn parse_file_settings(raw: &str) -> anyhow::Result<FileSettings> {
    Ok(toml::from_str(raw)?)
}

/// Defaults, then `server.toml`, then the environment. For each setting the
/// `APP__` variable wins over the bare one.
pub(crate) fn resolve_settings(
    file_cfg: &FileSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(v) = &file_cfg.bind_addr {
        settings.server_bind = v.clone();
    }
    if let Some(v) = &file_cfg.database_url {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.max_body_bytes.filter(|v| *v > 0) {
        settings.max_body_bytes = v;
    }
    if let Some(v) = &file_cfg.log_filter {
        settings.log_filter = v.clone();
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = env("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.trim().parse::<usize>() {
            if parsed > 0 {
                settings.max_body_bytes = parsed;
            }
        }
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }

    settings
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    storage::ensure_sqlite_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
