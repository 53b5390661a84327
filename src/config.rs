use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub database: Database,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub auth: Auth,
}

impl Config {
    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(source: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(source)?)
    }
}

/// The config file used when none is given on the command line.
pub fn default_path() -> PathBuf {
    directories_next::ProjectDirs::from("", "", "ownbin")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .filter(|path| path.exists())
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Cache {
    pub kind: CacheKind,
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for Cache {
    fn default() -> Self {
        Cache {
            kind: CacheKind::Memory,
            capacity: 1024,
            ttl_secs: 3600,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Memory,
    None,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_paste_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_paste_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Auth {
    /// Request header carrying the verified caller identity, set by the
    /// authenticating proxy in front of the server.
    pub identity_header: String,
}

impl Default for Auth {
    fn default() -> Self {
        Auth {
            identity_header: "X-Forwarded-Email".to_owned(),
        }
    }
}
