//! # Lint Configuration
//!
//! Loaded from an optional TOML file (`kolint.toml` by default):
//!
//! ```toml
//! disabled_rules = ["experimental:function-naming"]
//! extensions = ["kt", "kts"]
//! exclude_dirs = ["build", ".gradle"]
//! ```
//!
//! Every key is optional. Unknown keys are rejected so that typos surface
//! instead of silently falling back to defaults.

use crate::{CommonError, RuleId};
use serde::Deserialize;
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "kolint.toml";

const DEFAULT_EXTENSIONS: &[&str] = &["kt", "kts"];

const DEFAULT_EXCLUDE_DIRS: &[&str] = &["build", ".gradle", ".git", ".idea", "out", "node_modules"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Rule ids (`ruleset:rule`) or bare rule names to switch off.
    pub disabled_rules: Vec<String>,
    /// File extensions (without the dot) that are linted.
    pub extensions: Vec<String>,
    /// Directory names pruned during discovery.
    pub exclude_dirs: Vec<String>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LintConfig {
    /// Loads an explicitly requested config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, CommonError> {
        if !path.is_file() {
            return Err(CommonError::ConfigNotFound(path.display().to_string()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, &path.display().to_string())
    }

    /// Loads the config file at `path` if it exists, otherwise returns defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, CommonError> {
        if path.is_file() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parses TOML text; `origin` names the source in error messages.
    pub fn from_toml_str(text: &str, origin: &str) -> Result<Self, CommonError> {
        toml::from_str(text).map_err(|source| CommonError::ConfigParse {
            path: origin.to_string(),
            source,
        })
    }

    /// Appends a rule to the disabled list (CLI `--disable`).
    pub fn disable(&mut self, rule: impl Into<String>) {
        self.disabled_rules.push(rule.into());
    }

    pub fn is_rule_enabled(&self, id: &RuleId) -> bool {
        !self.disabled_rules.iter().any(|name| id.matches(name))
    }

    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }
}
