//! `experimental:function-naming`
//!
//! Function names start with a lowercase letter and use camel case. Two
//! exemptions:
//! - factory methods, whose declared return type is written exactly like the
//!   function name (`fun Widget(): Widget`);
//! - in test files, backtick names (`` fun `user can log in`() ``) and
//!   underscores (`fun login_fails_without_token()`).
//!
//! A file becomes a test file at its first `org.junit`, `org.testng` or
//! `kotlin.test` import. Declarations above that import are still checked with
//! the ordinary grammar.

use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, Anchored, Input, StartKind};
use anatomist::{FunctionDeclaration, ImportDirective, NodeKind, SyntaxNode};
use common::{Diagnostic, RuleId};
use regex::Regex;

use crate::Rule;

pub const FUNCTION_NAMING: RuleId = RuleId::new("experimental", "function-naming");

pub const MESSAGE: &str =
    "Function name should start with a lowercase letter (except factory methods) and use camel case";

/// Reported offset when a declaration has no identifier.
const FALLBACK_OFFSET: u32 = 1;

const TEST_IMPORT_PREFIXES: [&str; 3] = ["org.junit", "org.testng", "kotlin.test"];

static ORDINARY_NAME: OnceLock<Regex> = OnceLock::new();
static TEST_NAME: OnceLock<Regex> = OnceLock::new();
static TEST_IMPORTS: OnceLock<AhoCorasick> = OnceLock::new();

fn ordinary_name() -> &'static Regex {
    ORDINARY_NAME.get_or_init(|| {
        Regex::new(r"^[a-z][A-Za-z0-9]*$")
            .expect("ordinary name regex failed to compile: bug in the hardcoded pattern")
    })
}

fn test_name() -> &'static Regex {
    TEST_NAME.get_or_init(|| {
        Regex::new(r"^(?:`.*`|[a-z][A-Za-z0-9_]*)$")
            .expect("test name regex failed to compile: bug in the hardcoded pattern")
    })
}

fn test_imports() -> &'static AhoCorasick {
    TEST_IMPORTS.get_or_init(|| {
        AhoCorasick::builder()
            .start_kind(StartKind::Anchored)
            .build(TEST_IMPORT_PREFIXES)
            .expect("test import automaton failed to build: bug in the hardcoded prefixes")
    })
}

/// `^[a-z][A-Za-z0-9]*$`
pub fn is_valid_ordinary_name(name: &str) -> bool {
    ordinary_name().is_match(name)
}

/// A backtick-delimited name, or `^[a-z][A-Za-z0-9_]*$`.
pub fn is_valid_test_name(name: &str) -> bool {
    test_name().is_match(name)
}

/// Textual comparison only: `fun Widget(): app.Widget` is not a factory method.
pub fn is_factory_method(decl: &FunctionDeclaration) -> bool {
    decl.has_declared_return_type() && decl.return_type_text() == Some(decl.name_text())
}

/// Whether an import path starts with a test framework package.
pub fn is_test_import(path: &str) -> bool {
    test_imports().is_match(Input::new(path).anchored(Anchored::Yes))
}

/// Per-file state: `NORMAL` until a test import is seen, then `TEST_FILE` for
/// the rest of the file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileState {
    is_test_file: bool,
}

impl FileState {
    pub fn is_test_file(&self) -> bool {
        self.is_test_file
    }

    /// Marks the file as a test file if `import` names a test framework.
    /// Never clears the flag.
    pub fn observe_import(&mut self, import: &ImportDirective) {
        if self.is_test_file {
            return;
        }
        if let Some(path) = import.path.as_deref() {
            if is_test_import(path) {
                tracing::debug!(import = path, "test file");
                self.is_test_file = true;
            }
        }
    }
}

/// Checks one declaration under the current file state.
pub fn check_function(decl: &FunctionDeclaration, state: &FileState) -> Option<Diagnostic> {
    let name = decl.name_text();
    if is_factory_method(decl)
        || (state.is_test_file && is_valid_test_name(name))
        || is_valid_ordinary_name(name)
    {
        return None;
    }
    Some(Diagnostic {
        rule_id: FUNCTION_NAMING,
        offset: decl.name.as_ref().map_or(FALLBACK_OFFSET, |t| t.offset),
        message: MESSAGE.to_string(),
        auto_correctable: false,
    })
}

pub struct FunctionNamingRule;

impl Rule for FunctionNamingRule {
    type FileState = FileState;

    fn id(&self) -> RuleId {
        FUNCTION_NAMING
    }

    fn description(&self) -> &'static str {
        "Function names are lower camel case; factory methods and test names are exempt"
    }

    fn visit(&self, node: &SyntaxNode, state: &mut FileState, emit: &mut dyn FnMut(Diagnostic)) {
        match &node.kind {
            NodeKind::ImportDirective(import) => state.observe_import(import),
            NodeKind::FunctionDeclaration(decl) => {
                if let Some(diagnostic) = check_function(decl, state) {
                    tracing::trace!(name = decl.name_text(), offset = diagnostic.offset, "violation");
                    emit(diagnostic);
                }
            }
            NodeKind::File | NodeKind::Identifier(_) | NodeKind::Other(_) => {}
        }
    }
}
