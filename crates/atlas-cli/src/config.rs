//! Configuration for the `atlas` binary.
//!
//! Read from a TOML file (`atlas.toml` by default). A missing file means all
//! defaults; credentials may also come from the environment, which wins over
//! the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const ENV_GOOGLE_API_KEY: &str = "ATLAS_GOOGLE_API_KEY";
pub const ENV_PHOTOS_TOKEN: &str = "ATLAS_PHOTOS_TOKEN";

const MASK: &str = "********";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub media: MediaConfig,
    pub google: GoogleConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the content table.
    pub table_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from("atlas-table.json"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory uploaded images are written under.
    pub root: PathBuf,
    /// Public URL prefix the site serves `root` from.
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            base_url: "/media".into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub api_key: Option<String>,
    pub photos_access_token: Option<String>,
}

impl AppConfig {
    /// Load `path`, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply credential overrides found through `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(ENV_GOOGLE_API_KEY).filter(|v| !v.is_empty()) {
            self.google.api_key = Some(key);
        }
        if let Some(token) = lookup(ENV_PHOTOS_TOKEN).filter(|v| !v.is_empty()) {
            self.google.photos_access_token = Some(token);
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    pub fn api_key(&self) -> anyhow::Result<&str> {
        self.google.api_key.as_deref().with_context(|| {
            format!("google.api_key is not configured (set it in the config file or {ENV_GOOGLE_API_KEY})")
        })
    }

    pub fn photos_access_token(&self) -> anyhow::Result<&str> {
        self.google.photos_access_token.as_deref().with_context(|| {
            format!(
                "google.photos_access_token is not configured (set it in the config file or {ENV_PHOTOS_TOKEN})"
            )
        })
    }

    /// A copy safe to print.
    pub fn masked(&self) -> Self {
        let mut copy = self.clone();
        for secret in [
            &mut copy.google.api_key,
            &mut copy.google.photos_access_token,
        ] {
            if secret.is_some() {
                *secret = Some(MASK.into());
            }
        }
        copy
    }
}
