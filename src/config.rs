use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// HTTP endpoint returning a JSON array of records.
    #[serde(default)]
    pub url: Option<String>,
    /// Local JSON file holding an array of records.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Page URL that share links are built on.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_url: default_base_url(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}
fn default_base_url() -> String {
    "http://localhost:7340/".to_string()
}

impl Config {
    /// Defaults only: built-in sample records, default bind address.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Relative record paths are resolved against the config file's directory
    if let Some(rel) = config.source.path.clone().filter(|p| p.is_relative()) {
        if let Some(dir) = path.parent() {
            config.source.path = Some(dir.join(&rel));
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let source = &config.source;

    if source.url.is_some() && source.path.is_some() {
        anyhow::bail!("source.url and source.path are mutually exclusive");
    }

    if let Some(url) = &source.url {
        let parsed = Url::parse(url).with_context(|| format!("Invalid source.url: {}", url))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => anyhow::bail!(
                "Unsupported source.url scheme: '{}'. Must be http or https.",
                other
            ),
        }
    }

    if source.timeout_secs == 0 {
        anyhow::bail!("source.timeout_secs must be > 0");
    }

    Url::parse(&config.server.base_url)
        .with_context(|| format!("Invalid server.base_url: {}", config.server.base_url))?;

    Ok(())
}
