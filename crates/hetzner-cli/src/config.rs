//! Configuration loading and types

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::cli::Format;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "HETZNER_CONFIG";

const REDACTED: &str = "***";

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub robot: RobotConfig,
    #[serde(default)]
    pub auction: AuctionConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuctionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Defaults for global flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_timeout_secs: Option<u64>,
}

impl Config {
    /// Pick the config file: explicit path, then `$HETZNER_CONFIG`, then
    /// `<config dir>/hetzner/config.toml`
    pub fn resolve_path(explicit: Option<&Path>, env_value: Option<String>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env_value.filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("hetzner").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .wrap_err_with(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load from `path`, or use defaults when the file does not exist
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or parsed
    pub fn load_or_default(path: Option<&Path>) -> eyre::Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                Ok(Config::default())
            }
            None => Ok(Config::default()),
        }
    }

    /// Write the config, creating parent directories
    ///
    /// # Errors
    /// Returns error if the file cannot be written
    pub fn save(&self, path: &Path) -> eyre::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // The file holds credentials; never create it readable by others
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(path)
            .wrap_err_with(|| format!("failed to open {}", path.display()))?;

        // An existing file keeps its old mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))
                .wrap_err_with(|| format!("failed to restrict {}", path.display()))?;
        }

        file.write_all(content.as_bytes())
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Set a dotted key such as `cloud.token`
    ///
    /// # Errors
    /// Returns error for unknown keys or values of the wrong type
    pub fn set(&mut self, key: &str, value: &str) -> eyre::Result<()> {
        let text = Some(value.to_string());
        match key {
            "cloud.token" => self.cloud.token = text,
            "cloud.endpoint" => self.cloud.endpoint = text,
            "robot.user" => self.robot.user = text,
            "robot.password" => self.robot.password = text,
            "robot.endpoint" => self.robot.endpoint = text,
            "auction.endpoint" => self.auction.endpoint = text,
            "defaults.output" => {
                let format = match value {
                    "table" => Format::Table,
                    "json" => Format::Json,
                    other => bail!("invalid output format `{other}` (expected table or json)"),
                };
                self.defaults.output = Some(format);
            }
            "defaults.per_page" => {
                let per_page: u32 = value.parse().wrap_err("per_page must be a number")?;
                if per_page == 0 {
                    bail!("per_page must be at least 1");
                }
                self.defaults.per_page = Some(per_page);
            }
            "defaults.poll_interval_ms" => {
                let interval: u64 = value.parse().wrap_err("poll_interval_ms must be a number")?;
                if interval == 0 {
                    bail!("poll_interval_ms must be at least 1");
                }
                self.defaults.poll_interval_ms = Some(interval);
            }
            "defaults.action_timeout_secs" => {
                self.defaults.action_timeout_secs =
                    Some(value.parse().wrap_err("action_timeout_secs must be a number")?);
            }
            other => bail!("unknown config key `{other}`"),
        }
        Ok(())
    }

    /// Copy with secrets replaced, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.cloud.token.is_some() {
            config.cloud.token = Some(REDACTED.to_string());
        }
        if config.robot.password.is_some() {
            config.robot.password = Some(REDACTED.to_string());
        }
        config
    }
}
