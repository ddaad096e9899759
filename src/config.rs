use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "HOSTSCOPE_";

const MAX_COMMAND_TIMEOUT_SECS: u64 = 10;
const MAX_EXTERNAL_IP_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the HTTP transport.
    pub host: String,
    /// HTTP port. Unset means stdio.
    pub port: Option<u16>,
    pub log_level: String,
    pub log_format: LogFormat,
    pub command_timeout_secs: u64,
    pub external_ip_url: String,
    pub external_ip_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            command_timeout_secs: MAX_COMMAND_TIMEOUT_SECS,
            external_ip_url: "http://checkip.amazonaws.com".to_string(),
            external_ip_timeout_secs: MAX_EXTERNAL_IP_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("hostscope").join("config.yaml"))
    }

    /// `host:port` when the HTTP transport is selected.
    pub fn http_addr(&self) -> Option<String> {
        self.port.map(|port| format!("{}:{}", self.host, port))
    }

    fn clamped(mut self) -> Self {
        self.command_timeout_secs = self.command_timeout_secs.clamp(1, MAX_COMMAND_TIMEOUT_SECS);
        self.external_ip_timeout_secs = self
            .external_ip_timeout_secs
            .clamp(1, MAX_EXTERNAL_IP_TIMEOUT_SECS);
        self
    }
}

/// Values that override every file and prefixed-env setting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// The bare `HOST` / `PORT` variables. An empty `PORT` counts as unset.
pub fn host_port_env(host: Option<String>, port: Option<String>) -> Result<Overrides> {
    let host = host.filter(|h| !h.trim().is_empty());
    let port = match port.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(p) => Some(
            p.parse::<u16>()
                .with_context(|| format!("invalid PORT value {:?}", p))?,
        ),
    };
    Ok(Overrides {
        host,
        port,
        log_level: None,
    })
}

fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(ServerConfig::default()));
    if let Some(path) = file {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX))
}

/// Layer defaults, the YAML file, `HOSTSCOPE_*`, `HOST`/`PORT`, then `cli`.
pub fn load(explicit: Option<&Path>, cli: Overrides) -> Result<ServerConfig> {
    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            Some(path.to_path_buf())
        }
        None => ServerConfig::default_path().filter(|p| p.exists()),
    };

    let env = host_port_env(std::env::var("HOST").ok(), std::env::var("PORT").ok())?;
    extract(file.as_deref(), env, cli)
}

fn extract(file: Option<&Path>, env: Overrides, cli: Overrides) -> Result<ServerConfig> {
    let config: ServerConfig = figment(file)
        .merge(Serialized::defaults(env))
        .merge(Serialized::defaults(cli))
        .extract()
        .with_context(|| match file {
            Some(path) => format!("loading configuration from {}", path.display()),
            None => "loading configuration".to_string(),
        })?;
    Ok(config.clamped())
}
