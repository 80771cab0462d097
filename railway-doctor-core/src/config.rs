// optional railway-doctor.toml - defaults for the cli and extra catalog patterns

use crate::catalog::{Category, PatternCatalog};
use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "railway-doctor.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// github user analysed when --github-user is not given
    pub github_user: Option<String>,
    /// analyse at most this many repositories
    pub limit: Option<usize>,
    /// directory reports are written to
    pub output_dir: Option<PathBuf>,
    /// extra regexes appended to built-in categories, keyed by category id
    pub patterns: BTreeMap<Category, Vec<String>>,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// load `path`, or the default file if none is given; a missing default file is not an error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), extra_patterns = config.patterns.len(), "config loaded");
        Ok(config)
    }

    /// built-in catalog extended with this config's patterns
    pub fn catalog(&self) -> Result<PatternCatalog> {
        PatternCatalog::builtin()?.with_extra_patterns(&self.patterns)
    }
}
