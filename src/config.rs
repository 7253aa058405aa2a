// src/config.rs
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_PATH: &str = "DASHBOARD_CONFIG_PATH";
const DEFAULT_PATH: &str = "config/dashboard.toml";

/// Application configuration: where the dataset lives, where to serve, and
/// an optional fixed analysis reference date (defaults to "today" when
/// absent, which is what the live dashboard wants; tests pin it).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub csv_path: PathBuf,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/subscriptions.csv"),
            bind_addr: default_bind_addr(),
            reference_date: None,
        }
    }
}

impl AppConfig {
    /// Load from an explicit TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $DASHBOARD_CONFIG_PATH
    /// 2) config/dashboard.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::from_path(&pb);
            }
            return Err(anyhow!("DASHBOARD_CONFIG_PATH points to non-existent path"));
        }
        let default = PathBuf::from(DEFAULT_PATH);
        if default.exists() {
            return Self::from_path(&default);
        }
        Ok(Self::default())
    }
}
