use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub sandbox: Sandbox,
    #[serde(default)]
    pub convert: Convert,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}
fn default_name() -> String { "webpgate".to_string() }
fn default_version() -> String { env!("CARGO_PKG_VERSION").to_string() }

impl Default for Server {
    fn default() -> Self { Self { name: default_name(), version: default_version() } }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Sandbox {
    #[serde(default)]
    pub allowed_dirs: Vec<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Convert {
    #[serde(default = "default_quality")]
    pub default_quality: u8,
    #[serde(default)]
    pub default_lossless: bool,
    #[serde(default)]
    pub default_keep_original: bool,
}
fn default_quality() -> u8 { 80 }

impl Default for Convert {
    fn default() -> Self {
        Self { default_quality: default_quality(), default_lossless: false, default_keep_original: false }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Limits {
    #[serde(default = "default_encode_timeout_s")]
    pub encode_timeout_s: u64,
    #[serde(default = "default_max_batch_items")]
    pub max_batch_items: usize,
}
fn default_encode_timeout_s() -> u64 { 120 }
fn default_max_batch_items() -> usize { 256 }

impl Default for Limits {
    fn default() -> Self {
        Self { encode_timeout_s: default_encode_timeout_s(), max_batch_items: default_max_batch_items() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Logging {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_level")]
    pub level: String,
}
fn default_level() -> String { "info".to_string() }

impl Default for Logging {
    fn default() -> Self { Self { format: LogFormat::default(), level: default_level() } }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sandbox.allowed_dirs.is_empty() {
            anyhow::bail!("at least one allowed directory is required");
        }
        for dir in &self.sandbox.allowed_dirs {
            if !dir.is_dir() {
                anyhow::bail!("allowed directory does not exist or is not a directory: {}", dir.display());
            }
        }
        if self.convert.default_quality > 100 { anyhow::bail!("default_quality must be within 0..=100"); }
        if self.limits.encode_timeout_s == 0 { anyhow::bail!("encode_timeout_s must be > 0"); }
        if self.limits.max_batch_items == 0 { anyhow::bail!("max_batch_items must be > 0"); }
        Ok(())
    }
}
