//! # Rule Sets
//!
//! **Role**: Lint rules over the [`anatomist`] syntax model and the engine that
//! drives them over one file at a time.
//!
//! **Core Types**:
//! - `Rule`: a visitor invoked once per node in document order, with a per-file
//!   state value threaded through by `&mut`.
//! - `FileCheck`: object-safe form of `Rule`, so rule sets can hold rules with
//!   different state types.
//! - `LintEngine`: the enabled rules of a configuration; `&self` only, so one
//!   engine serves any number of threads.

pub mod engine;
pub mod function_naming;

pub use engine::LintEngine;
pub use function_naming::FunctionNamingRule;

use anatomist::{SyntaxNode, SyntaxTree};
use common::{Diagnostic, RuleId};

/// A lint rule.
///
/// Rules hold no per-file data. Everything a rule learns while walking a file
/// lives in `FileState`, created fresh for every file and dropped afterwards.
///
/// # Example
/// ```
/// use anatomist::{NodeKind, SyntaxNode};
/// use common::{Diagnostic, RuleId};
/// use ruleset::Rule;
///
/// struct NoImports;
///
/// impl Rule for NoImports {
///     type FileState = ();
///
///     fn id(&self) -> RuleId {
///         RuleId::new("custom", "no-imports")
///     }
///
///     fn description(&self) -> &'static str {
///         "Imports are not allowed"
///     }
///
///     fn visit(&self, node: &SyntaxNode, _: &mut (), emit: &mut dyn FnMut(Diagnostic)) {
///         if let NodeKind::ImportDirective(_) = node.kind {
///             emit(Diagnostic {
///                 rule_id: self.id(),
///                 offset: node.offset,
///                 message: "import found".into(),
///                 auto_correctable: false,
///             });
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    type FileState: Default;

    fn id(&self) -> RuleId;

    fn description(&self) -> &'static str;

    /// Called once per node of a file, in document order.
    fn visit(
        &self,
        node: &SyntaxNode,
        state: &mut Self::FileState,
        emit: &mut dyn FnMut(Diagnostic),
    );
}

/// Type-erased rule, as stored in a [`RuleSet`].
pub trait FileCheck: Send + Sync {
    fn rule_id(&self) -> RuleId;

    fn rule_description(&self) -> &'static str;

    /// Walks one file's tree with a fresh state, passing diagnostics to `sink`.
    fn check_file(&self, tree: &SyntaxTree, sink: &mut dyn FnMut(Diagnostic));
}

impl<R: Rule> FileCheck for R {
    fn rule_id(&self) -> RuleId {
        self.id()
    }

    fn rule_description(&self) -> &'static str {
        self.description()
    }

    fn check_file(&self, tree: &SyntaxTree, sink: &mut dyn FnMut(Diagnostic)) {
        let mut state = R::FileState::default();
        for node in tree.root.preorder() {
            self.visit(node, &mut state, sink);
        }
    }
}

/// A named group of rules; its id is the prefix of each member's `RuleId`.
pub struct RuleSet {
    pub id: &'static str,
    pub rules: Vec<Box<dyn FileCheck>>,
}

impl RuleSet {
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rules.iter().map(|r| r.rule_id())
    }
}

/// Rules still settling their defaults.
pub fn experimental() -> RuleSet {
    RuleSet {
        id: "experimental",
        rules: vec![Box::new(FunctionNamingRule)],
    }
}

/// Every rule set this crate ships.
pub fn all_rule_sets() -> Vec<RuleSet> {
    vec![experimental()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use anatomist::{FunctionDeclaration, NodeKind};

    /// Counts nodes per file; proves state is fresh for every file.
    struct NodeCounter;

    impl Rule for NodeCounter {
        type FileState = u32;

        fn id(&self) -> RuleId {
            RuleId::new("test", "node-counter")
        }

        fn description(&self) -> &'static str {
            "Reports the node count at the file root"
        }

        fn visit(&self, node: &SyntaxNode, seen: &mut u32, emit: &mut dyn FnMut(Diagnostic)) {
            *seen += 1;
            if let NodeKind::File = node.kind {
                emit(Diagnostic {
                    rule_id: self.id(),
                    offset: *seen,
                    message: String::new(),
                    auto_correctable: false,
                });
            }
        }
    }

    #[test]
    fn test_check_file_visits_in_order_with_fresh_state() {
        let tree = SyntaxTree::new(SyntaxNode::file(vec![SyntaxNode::function(
            FunctionDeclaration::named("run", 4),
            0,
        )]));

        let rule: Box<dyn FileCheck> = Box::new(NodeCounter);
        for _ in 0..2 {
            let mut offsets = Vec::new();
            rule.check_file(&tree, &mut |d| offsets.push(d.offset));
            // Root comes first, so the counter is 1 on both passes.
            assert_eq!(offsets, vec![1]);
        }
    }

    #[test]
    fn test_experimental_set() {
        let set = experimental();
        assert_eq!(set.id, "experimental");
        let ids: Vec<String> = set.rule_ids().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["experimental:function-naming"]);
        assert!(set.rules.iter().all(|r| r.rule_id().rule_set() == set.id));
    }
}
