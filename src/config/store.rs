//! Configuration store backed by a shell-sourceable `config.env` file
//!
//! `Configuration` is a plain value: it is loaded once, edited as a working copy,
//! and passed explicitly to whatever needs it. Only `save` writes to disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::catalog::{self, Category};
use super::env_file;
use super::token::AuthToken;
use crate::constants::{config as file, display, interpret, keys};
use crate::error::ConfigError;
use crate::request::Endpoint;

/// Ordered mapping from parameter name to string value.
/// Unknown keys are kept as-is so newer files survive a load/save cycle.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: Vec<(String, String)>,
}

/// Result of a successful `save`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub path: PathBuf,
    /// Copy of the previous file, if there was one
    pub backup: Option<PathBuf>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the config file location.
    /// Priority: explicit path > FEEDPROBE_CONFIG > ./config.env (if present) > user config dir
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var(file::PATH_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        let local = PathBuf::from(file::FILENAME);
        if local.exists() {
            return local;
        }
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(file::APP_DIR);
        path.push(file::FILENAME);
        path
    }

    pub fn backup_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(file::BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// Load from `path`. A missing file is `ConfigError::Missing`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::parse(&contents);
        if config.is_empty() {
            warn!(path = %path.display(), "config file has no assignments");
        }
        info!(path = %path.display(), entries = config.len(), "loaded configuration");
        Ok(config)
    }

    /// Build from file contents; later assignments of a key win
    pub fn parse(contents: &str) -> Self {
        let mut config = Self::new();
        for (key, value) in env_file::parse(contents) {
            config.set(key, value);
        }
        config.migrate_legacy_keys();
        config
    }

    /// Rename `API_BASE_URL` / `API_ENDPOINT_PATH` from older files.
    /// Current keys with a value win; an unrecognised path is left in place.
    fn migrate_legacy_keys(&mut self) {
        if self.value(keys::API_HOST).trim().is_empty() {
            if let Some(base_url) = self.remove(keys::legacy::API_BASE_URL) {
                info!(from = keys::legacy::API_BASE_URL, to = keys::API_HOST, "migrated legacy key");
                self.set(keys::API_HOST, base_url);
            }
        }

        if self.value(keys::API_ENDPOINT).trim().is_empty() {
            let path = self.value(keys::legacy::API_ENDPOINT_PATH).to_string();
            if path.trim().is_empty() {
                return;
            }
            match Endpoint::from_path(&path) {
                Some(endpoint) => {
                    self.remove(keys::legacy::API_ENDPOINT_PATH);
                    info!(path = %path, endpoint = %endpoint, "migrated legacy endpoint path");
                    self.set(keys::API_ENDPOINT, endpoint.name());
                }
                None => warn!(path = %path, "unrecognised API_ENDPOINT_PATH, set API_ENDPOINT instead"),
            }
        }
    }

    /// Persist to `path`, copying any existing file to `<path>.backup` first.
    /// If the backup cannot be made nothing is written.
    pub fn save(&self, path: &Path) -> Result<SaveReport, ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let backup = if path.exists() {
            let backup = Self::backup_path(path);
            fs::copy(path, &backup).map_err(|source| ConfigError::Backup {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(backup = %backup.display(), "backed up previous config");
            Some(backup)
        } else {
            None
        };

        fs::write(path, self.render(Local::now())).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), entries = self.len(), "saved configuration");
        Ok(SaveReport {
            path: path.to_path_buf(),
            backup,
        })
    }

    /// File contents for this configuration, grouped by category
    pub fn render(&self, generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        let rule = format!("# {}\n", "=".repeat(76));
        out.push_str(&rule);
        out.push_str("# Realtime recommendation probe configuration\n");
        out.push_str(&rule);
        out.push_str("# Written by feedprobe; values are single-quoted for shell sourcing\n");
        out.push_str(&format!(
            "# Generated on: {}\n\n",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        for category in Category::ALL {
            let present: Vec<_> = catalog::in_category(category)
                .filter_map(|p| self.get(p.key).map(|v| (p.key, v)))
                .collect();
            if present.is_empty() {
                continue;
            }
            render_section(&mut out, category.title(), present);
        }

        let unknown: Vec<_> = self
            .entries
            .iter()
            .filter(|(k, _)| catalog::lookup(k).is_none())
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !unknown.is_empty() {
            render_section(&mut out, "Other", unknown);
        }
        out
    }

    /// Reject configurations that cannot be saved
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.value(keys::API_HOST).trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                key: keys::API_HOST,
            });
        }
        Ok(())
    }

    /// Human-readable problems that would stop or degrade a request
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.token().is_usable() {
            warnings.push(
                "Authorization token not set: use Set Auth Token, --token, or AUTHORIZATION_TOKEN"
                    .to_string(),
            );
        }
        if self.value(keys::API_HOST).trim().is_empty() {
            warnings.push("API host not configured: set API_HOST or apply an endpoint preset".to_string());
        }
        let endpoint = self.value(keys::API_ENDPOINT).trim();
        if !endpoint.is_empty() && endpoint.parse::<Endpoint>().is_err() {
            warnings.push(format!(
                "Unknown API_ENDPOINT '{endpoint}': falling back to {}",
                Endpoint::default().name()
            ));
        }
        warnings
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, empty when unset
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Set `key`, keeping its position if it already exists
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Boolean-like string ("true", "1", "yes", "on")
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.value(key).trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    }

    pub fn token(&self) -> AuthToken {
        AuthToken::from_raw(self.get(keys::AUTHORIZATION_TOKEN))
    }

    /// Configured endpoint, falling back to the default for empty or unknown names
    pub fn endpoint(&self) -> Endpoint {
        let name = self.value(keys::API_ENDPOINT).trim();
        if name.is_empty() {
            return Endpoint::default();
        }
        name.parse().unwrap_or_else(|_| {
            warn!(endpoint = %name, "unknown API_ENDPOINT, using default");
            Endpoint::default()
        })
    }

    pub fn extract_field(&self) -> &str {
        match self.value(keys::EXTRACT_FIELD).trim() {
            "" => interpret::DEFAULT_EXTRACT_FIELD,
            field => field,
        }
    }

    pub fn max_verbose_lines(&self) -> usize {
        self.value(keys::MAX_VERBOSE_LINES)
            .trim()
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .unwrap_or(display::DEFAULT_MAX_LINES)
    }
}

fn render_section<'a>(out: &mut String, title: &str, entries: Vec<(&'a str, &'a str)>) {
    out.push_str("# ----------------------\n");
    out.push_str(&format!("# {title}\n"));
    out.push_str("# ----------------------\n\n");
    for (key, value) in entries {
        if key == keys::AUTHORIZATION_TOKEN && value == file::NULL_SENTINEL {
            out.push_str(&format!("{key}={}\n", file::NULL_SENTINEL));
        } else {
            out.push_str(&format!("{key}={}\n", env_file::quote(value)));
        }
    }
    out.push('\n');
}

impl std::fmt::Debug for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if catalog::lookup(key).is_some_and(|p| p.sensitive) {
                map.entry(key, &format_args!("{:?}", AuthToken::from_raw(Some(value))));
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}
