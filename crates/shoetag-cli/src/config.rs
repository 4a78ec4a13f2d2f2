//! Runtime configuration, layered from an optional TOML file and
//! `SHOETAG_*` environment variables.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Deserialize;
use shoetag_core::{
  Registry,
  error::RegistryError,
  registry::{Category, Entry},
};

const DEFAULT_STORE_PATH: &str = "~/.local/share/shoetag/ledger.db";

#[derive(Debug, Deserialize)]
pub struct Settings {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default)]
  pub catalog:    CatalogConfig,
}

/// Replacement registries. A category left empty keeps the built-in entries.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogConfig {
  #[serde(default)]
  pub models: Vec<Entry>,
  #[serde(default)]
  pub colors: Vec<Entry>,
}

fn default_store_path() -> PathBuf { PathBuf::from(DEFAULT_STORE_PATH) }

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("SHOETAG"))
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    settings
      .try_deserialize()
      .context("failed to deserialise settings")
  }
}

impl CatalogConfig {
  pub fn into_registry(self) -> Result<Registry, RegistryError> {
    let builtin = Registry::default();
    let or_builtin = |entries: Vec<Entry>, category| {
      if entries.is_empty() {
        builtin.entries(category).to_vec()
      } else {
        entries
      }
    };

    Registry::new(
      or_builtin(self.models, Category::Model),
      or_builtin(self.colors, Category::Color),
    )
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
