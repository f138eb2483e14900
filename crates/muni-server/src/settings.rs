//! Runtime server configuration.
//!
//! Layered from an optional TOML file and `MUNI__`-prefixed environment
//! variables (`MUNI__PORT=8080`, `MUNI__ROLES__GLOBAL=...`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use muni_core::roles::GlobalRoleSet;
use serde::Deserialize;

/// Server settings, deserialised once at startup.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  /// SQL file executed against the directory after it is opened.
  #[serde(default)]
  pub fixtures:   Option<PathBuf>,
  /// Roles exempt from geographic scoping; read-only after startup.
  #[serde(default)]
  pub roles:      GlobalRoleSet,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

impl ServerConfig {
  /// Load from `path` (if it exists) overlaid with the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("MUNI")
          .prefix_separator("__")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("roles.global")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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
