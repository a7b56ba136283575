//! Configuration for the lemvue terminal client.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `lemvue_core::InstanceConfig`. Values layer as built-in
//! defaults, then the config file, then `LEMVUE_` environment variables
//! (`LEMVUE_DEFAULTS__PAGE_SIZE=50`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use lemvue_core::params::DEFAULT_PAGE_SIZE;
use lemvue_core::{AuthCredentials, InstanceConfig};

/// Keyring service name for stored secrets.
const KEYRING_SERVICE: &str = "lemvue";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password found for '{username}' in profile '{profile}'")]
    NoCredentials { profile: String, username: String },

    #[error("profile '{0}' not found")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named instance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The named profile, or the default one.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }

    /// Add or replace a profile. The first profile saved into a config
    /// whose default points nowhere becomes the default.
    pub fn insert_profile(&mut self, name: &str, profile: Profile) {
        let default_missing = self
            .default_profile
            .as_ref()
            .is_none_or(|d| !self.profiles.contains_key(d));
        self.profiles.insert(name.to_owned(), profile);
        if default_missing {
            self.default_profile = Some(name.to_owned());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Items per page in every list view.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Route opened at startup (`/`, `/c/rust`, `/inbox`...).
    #[serde(default = "default_start_route")]
    pub start_route: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            page_size: default_page_size(),
            start_route: default_start_route(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}
fn default_start_route() -> String {
    "/".into()
}

/// A named instance profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Instance base URL (e.g., "https://lemmy.ml").
    pub instance: String,

    /// Account name or email. Without it the profile browses anonymously.
    pub username: Option<String>,

    /// Session token (plaintext, prefer keyring or env var).
    pub jwt: Option<String>,

    /// Environment variable name containing the session token.
    pub jwt_env: Option<String>,

    /// Password (plaintext, prefer keyring).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override page size.
    pub page_size: Option<u32>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "lemvue", "lemvue").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lemvue");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LEMVUE_").split("__"))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, what: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{what}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

fn env_secret(var: Option<&str>) -> Option<SecretString> {
    var.and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Resolve a session token: env var, then keyring (signed-in profiles
/// only), then plaintext.
pub fn resolve_jwt(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    env_secret(profile.jwt_env.as_deref())
        .or_else(|| {
            profile
                .username
                .as_ref()
                .and_then(|_| keyring_secret(profile_name, "jwt"))
        })
        .or_else(|| profile.jwt.clone().map(SecretString::from))
}

/// Resolve a password: env var, then keyring, then plaintext.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    username: &str,
) -> Result<SecretString, ConfigError> {
    env_secret(profile.password_env.as_deref())
        .or_else(|| env_secret(Some("LEMVUE_PASSWORD")))
        .or_else(|| keyring_secret(profile_name, "password"))
        .or_else(|| profile.password.clone().map(SecretString::from))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            username: username.into(),
        })
}

/// Pick the credentials a profile signs in with. A stored token wins over
/// a password; a profile naming no account browses anonymously.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    if let Some(jwt) = resolve_jwt(profile, profile_name) {
        return Ok(AuthCredentials::Jwt(jwt));
    }
    let Some(username) = profile.username.clone() else {
        return Ok(AuthCredentials::Anonymous);
    };
    let password = resolve_password(profile, profile_name, &username)?;
    Ok(AuthCredentials::Password {
        username,
        password,
        totp: None,
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `InstanceConfig` from a profile and the global defaults.
pub fn profile_to_instance_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<InstanceConfig, ConfigError> {
    let url: url::Url = profile
        .instance
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "instance".into(),
            reason: format!("invalid URL: {}", profile.instance),
        })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "instance".into(),
            reason: format!("unsupported scheme: {}", url.scheme()),
        });
    }

    let page_size = profile.page_size.unwrap_or(defaults.page_size);
    if page_size == 0 {
        return Err(ConfigError::Validation {
            field: "page_size".into(),
            reason: "must be at least 1".into(),
        });
    }

    let auth = resolve_auth(profile, profile_name)?;
    let mut config = InstanceConfig::new(url).with_auth(auth);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.page_size = page_size;
    Ok(config)
}
