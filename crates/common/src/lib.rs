pub mod config;

pub use config::LintConfig;

use serde::Serialize;
use std::fmt;

/// Errors from configuration handling.
#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config file not found: {0}")]
    ConfigNotFound(String),
    #[error("Config parse error in {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Stable identifier of a rule: `<ruleset>:<rule>`.
///
/// Used by the host for enabling/disabling rules and for grouping reports.
///
/// # Examples
/// ```
/// # use common::RuleId;
/// let id = RuleId::new("experimental", "function-naming");
/// assert_eq!(id.to_string(), "experimental:function-naming");
/// assert_eq!(id.rule(), "function-naming");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId {
    rule_set: &'static str,
    rule: &'static str,
}

impl RuleId {
    pub const fn new(rule_set: &'static str, rule: &'static str) -> Self {
        Self { rule_set, rule }
    }

    pub fn rule_set(&self) -> &'static str {
        self.rule_set
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }

    /// Returns `true` if `name` designates this rule, either fully qualified
    /// (`experimental:function-naming`) or by bare rule name (`function-naming`).
    pub fn matches(&self, name: &str) -> bool {
        match name.split_once(':') {
            Some((set, rule)) => set == self.rule_set && rule == self.rule,
            None => name == self.rule,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.rule_set, self.rule)
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A convention violation reported by a rule at a byte offset of the file.
///
/// Emitted, never stored by the rule itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule_id: RuleId,
    /// Byte offset of the offending token in the source file.
    pub offset: u32,
    pub message: String,
    pub auto_correctable: bool,
}

/// Reporter-facing form of a [`Diagnostic`], resolved to a file position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Normalized file path (UTF-8, forward slashes).
    pub file: String,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed column, in characters.
    pub column: u32,
    #[serde(rename = "rule")]
    pub rule_id: RuleId,
    pub message: String,
    pub auto_correctable: bool,
}

impl Violation {
    pub fn from_diagnostic(file: &str, (line, column): (u32, u32), diagnostic: Diagnostic) -> Self {
        Self {
            file: file.to_string(),
            line,
            column,
            rule_id: diagnostic.rule_id,
            message: diagnostic.message,
            auto_correctable: diagnostic.auto_correctable,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} ({})",
            self.file, self.line, self.column, self.message, self.rule_id
        )
    }
}
