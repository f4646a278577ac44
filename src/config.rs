use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default nginx configuration root on Debian-style systems
pub const DEFAULT_ROOT: &str = "/etc/nginx";

/// Where site files, enable links and logs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn sites_available(&self) -> PathBuf {
        self.root.join("sites-available")
    }

    pub fn sites_enabled(&self) -> PathBuf {
        self.root.join("sites-enabled")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Site file for a domain (e.g., "/etc/nginx/sites-available/example.com")
    pub fn site_path(&self, domain: &str) -> PathBuf {
        self.sites_available().join(domain)
    }

    pub fn enabled_path(&self, domain: &str) -> PathBuf {
        self.sites_enabled().join(domain)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT)
    }
}

/// Prompt defaults from a JSON file passed with --defaults
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Presets {
    pub domain: Option<String>,

    #[serde(rename = "upstreamHost")]
    pub upstream_host: Option<String>,

    #[serde(rename = "upstreamPort")]
    pub upstream_port: Option<u16>,

    /// Optional: path "/" redirects to
    #[serde(rename = "rootRedirect")]
    pub root_redirect: Option<String>,

    #[serde(rename = "customLogs")]
    pub custom_logs: Option<bool>,

    /// Optional: answer to the certificate question
    pub tls: Option<bool>,
}

impl Presets {
    /// Load presets from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;

        let presets: Presets = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;

        Ok(presets)
    }
}
