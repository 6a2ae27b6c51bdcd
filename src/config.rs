use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::IndexResult;
use crate::policy::IgnorePolicy;

pub const CONFIG_ENV: &str = "CLASSPATH_DUPES_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct IndexConfig {
    pub use_default_ignore_list: bool,
    pub ignored_resource_patterns: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            use_default_ignore_list: true,
            ignored_resource_patterns: Vec::new(),
        }
    }
}

impl IndexConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn build_policy(&self) -> IndexResult<IgnorePolicy> {
        IgnorePolicy::new(self.use_default_ignore_list, &self.ignored_resource_patterns)
    }
}

pub fn resolve_config_path(cli: &Cli) -> Option<PathBuf> {
    if let Some(p) = cli.config.clone() {
        return Some(p);
    }

    if let Ok(p) = env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }

    let default_path = dirs::config_dir()?.join("classpath-dupes").join("config.json");
    default_path.exists().then_some(default_path)
}

/// Loads the config file (if any) and layers the command-line flags on top.
pub fn resolve_config(cli: &Cli) -> Result<IndexConfig> {
    let mut config = match resolve_config_path(cli) {
        Some(path) => {
            log::debug!("loading config from {}", path.display());
            IndexConfig::load(&path)?
        }
        None => IndexConfig::default(),
    };

    if cli.no_default_ignores {
        config.use_default_ignore_list = false;
    }
    config.ignored_resource_patterns.extend(cli.ignore.iter().cloned());
    Ok(config)
}
