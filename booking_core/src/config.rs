//! Configuration file support for booksync.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/booksync/config.toml`
//! unless a path is given explicitly. Section names are lowercase; the
//! capitalised `[Account]` / `[Files]` layout of older `settings.toml`
//! files is accepted as well.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default, alias = "Account")]
    pub account: AccountConfig,

    #[serde(default, alias = "Files")]
    pub files: FilesConfig,

    #[serde(default, alias = "Http")]
    pub http: HttpConfig,
}

/// Credentials and target company
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AccountConfig {
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Company domain, e.g. `acme.secure.simplybook.it`
    #[serde(default)]
    pub domain: String,

    /// Overrides the API base URL derived from `domain`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
}

impl AccountConfig {
    /// Company login: the first label of the domain
    pub fn company(&self) -> &str {
        self.domain.split('.').next().unwrap_or_default()
    }

    /// Base URL of the admin API, without a trailing slash
    pub fn api_base(&self) -> String {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://user-api-v2.{}/admin", self.domain),
        }
    }
}

/// Input and log file locations
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct FilesConfig {
    #[serde(default)]
    pub import_csv: PathBuf,

    /// Receives every debug-level event of the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log: Option<PathBuf>,

    /// Receives warnings and errors only (skipped and failed rows)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_bookings_log: Option<PathBuf>,

    /// Skipped and failed rows in input format, for correction and re-run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejects_csv: Option<PathBuf>,
}

/// HTTP client settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub accept_invalid_certs: bool,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            accept_invalid_certs: false,
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("booksync/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            return Err(Error::Config(format!(
                "No config file found at {:?}",
                config_path
            )));
        }
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME").map_err(|_| {
                    Error::Config("HOME environment variable not set".into())
                })?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("booksync").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check that everything needed for an import run is present
    pub fn validate(&self) -> Result<()> {
        if self.account.user.trim().is_empty() {
            return Err(Error::Config("account.user is empty".into()));
        }
        if self.account.password.is_empty() {
            return Err(Error::Config("account.password is empty".into()));
        }
        if !self.account.domain.contains('.') || self.account.company().is_empty() {
            return Err(Error::Config(format!(
                "account.domain {:?} is not a company domain",
                self.account.domain
            )));
        }
        if self.files.import_csv.as_os_str().is_empty() {
            return Err(Error::Config("files.import_csv is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let toml_str = r#"
[account]
user = "admin@example.com"
password = "secret"
domain = "acme.secure.simplybook.it"

[files]
import_csv = "bookings.csv"
"#;
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn test_company_and_api_base() {
        let config = valid_config();
        assert_eq!(config.account.company(), "acme");
        assert_eq!(
            config.account.api_base(),
            "https://user-api-v2.acme.secure.simplybook.it/admin"
        );
    }

    #[test]
    fn test_api_base_override_strips_slash() {
        let mut config = valid_config();
        config.account.api_base = Some("http://127.0.0.1:8080/admin/".into());
        assert_eq!(config.account.api_base(), "http://127.0.0.1:8080/admin");
    }

    #[test]
    fn test_legacy_section_names() {
        let toml_str = r#"
[Account]
user = "ig"
password = "pw"
domain = "regtest.secure.simplybook.it"

[Files]
import_csv = "bookings.csv"
debug_log = "debug.log"
failed_bookings_log = "failed.log"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.account.company(), "regtest");
        assert_eq!(
            config.files.failed_bookings_log,
            Some(PathBuf::from("failed.log"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_http_defaults() {
        let config = valid_config();
        assert!(!config.http.accept_invalid_certs);
        assert!(config.http.timeout_secs.is_none());
        assert!(config.http.user_agent.starts_with("booksync/"));
    }

    #[test]
    fn test_validate_rejects_bad_domain() {
        let mut config = valid_config();
        config.account.domain = "localhost".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let mut config = valid_config();
        config.files.import_csv = PathBuf::new();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = valid_config();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.account.domain, config.account.domain);
        assert_eq!(loaded.files.import_csv, config.files.import_csv);
    }
}
