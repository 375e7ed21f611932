//! Drives the enabled rules over one file's tree.

use anatomist::{SourceFile, SyntaxTree};
use common::{Diagnostic, LintConfig, RuleId, Violation};

use crate::{FileCheck, RuleSet};

/// The enabled rules of a configuration.
///
/// Holds no per-file state; every `check_*` call owns the states it creates,
/// so a shared `&LintEngine` can lint files on several threads at once.
pub struct LintEngine {
    checks: Vec<Box<dyn FileCheck>>,
}

impl LintEngine {
    /// Keeps the rules of `rule_sets` that `config` does not disable.
    pub fn new(rule_sets: Vec<RuleSet>, config: &LintConfig) -> Self {
        let checks: Vec<Box<dyn FileCheck>> = rule_sets
            .into_iter()
            .flat_map(|set| set.rules)
            .filter(|check| {
                let enabled = config.is_rule_enabled(&check.rule_id());
                if !enabled {
                    tracing::debug!(rule = %check.rule_id(), "rule disabled");
                }
                enabled
            })
            .collect();
        Self { checks }
    }

    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.checks.iter().map(|c| c.rule_id()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Diagnostics of all enabled rules, rule by rule, each in emission order.
    pub fn check_tree(&self, tree: &SyntaxTree) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for check in &self.checks {
            check.check_file(tree, &mut |d| diagnostics.push(d));
        }
        diagnostics
    }

    /// Like [`check_tree`](Self::check_tree), resolved to line and column of `file`.
    pub fn check_file(&self, file: &SourceFile) -> Vec<Violation> {
        let violations: Vec<Violation> = self
            .check_tree(&file.tree)
            .into_iter()
            .map(|d| Violation::from_diagnostic(&file.path, file.position(d.offset), d))
            .collect();
        tracing::debug!(file = %file.path, violations = violations.len(), "linted");
        violations
    }
}
