//! # configs
//!
//! Layered application settings. Later sources win:
//!
//! 1. built-in defaults (the `Default` impls below)
//! 2. `<dir>/default.toml` (optional)
//! 3. `<dir>/local.toml` (optional, not committed)
//! 4. environment: `INKWELL_<SECTION>__<KEY>`, e.g. `INKWELL_SERVER__PORT=9000`
//!
//! A `.env` file in the working directory is loaded into the environment first.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const ENV_PREFIX: &str = "INKWELL";
const DEFAULT_IP_SECRET: &str = "change-me";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub security: SecuritySettings,
    #[serde(default)]
    pub content: ContentSettings,
    #[serde(default)]
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8000 }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// The JSON document holding every collection.
    pub document_path: PathBuf,
    /// Root of the avatar/cover side-tree, served under `/static`.
    pub upload_dir: PathBuf,
    /// Write an empty document at startup when none exists.
    pub create_if_missing: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            document_path: PathBuf::from("db.json"),
            upload_dir: PathBuf::from("uploads"),
            create_if_missing: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: "info".into(), format: LogFormat::Pretty }
    }
}

#[derive(Debug, Deserialize)]
pub struct SecuritySettings {
    /// HMAC key for anonymous sender pseudonyms.
    #[serde(default = "default_ip_secret")]
    pub ip_hash_secret: SecretString,
}

fn default_ip_secret() -> SecretString {
    SecretString::from(DEFAULT_IP_SECRET)
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self { ip_hash_secret: default_ip_secret() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Case-insensitive substrings rejected in comments and anonymous messages.
    pub forbidden_words: Vec<String>,
    /// Repeat visits from one client inside this window count as one view.
    pub view_window_minutes: i64,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self { forbidden_words: Vec::new(), view_window_minutes: 30 }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeedSettings {
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: SecretString,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
}

fn default_admin_email() -> String {
    "admin@blog.com".into()
}

fn default_admin_password() -> SecretString {
    SecretString::from("123456")
}

fn default_admin_username() -> String {
    "admin".into()
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self {
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            admin_username: default_admin_username(),
        }
    }
}

impl Settings {
    /// Loads `.env`, then the layered sources from `./config`.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::load_from(Path::new("config"))
    }

    /// Layered load with config files looked up in `dir`.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join("local.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("content.forbidden_words"),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.content.view_window_minutes < 0 {
            return Err(ConfigError::Invalid(
                "content.view_window_minutes must not be negative".into(),
            ));
        }
        if self.security.ip_hash_secret.expose_secret().is_empty() {
            return Err(ConfigError::Invalid("security.ip_hash_secret must not be empty".into()));
        }
        Ok(())
    }

    /// Settings that load fine but should not reach production. Loading runs
    /// before logging is set up, so callers report these once it is.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.security.ip_hash_secret.expose_secret() == DEFAULT_IP_SECRET {
            out.push(
                "security.ip_hash_secret is the built-in default; set INKWELL_SECURITY__IP_HASH_SECRET",
            );
        }
        out
    }
}
