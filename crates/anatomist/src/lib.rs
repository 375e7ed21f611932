//! # The Anatomist: Source Parsing & Syntax Model
//!
//! **Role**: Turns Kotlin source into an owned, immutable [`SyntaxTree`] that lint
//! rules walk in document order.
//!
//! **Core Types**:
//! - `SyntaxNode`: one node of the tree; its `NodeKind` is a closed sum type, so rules
//!   dispatch with an exhaustive `match` instead of downcasting.
//! - `FunctionDeclaration` / `ImportDirective`: typed views carried by the node kinds
//!   rules care about.
//! - `KotlinHost` (feature `kotlin`): tree-sitter frontend lowering the concrete
//!   syntax tree into the model above.
//!
//! **Design**:
//! - Offsets are byte offsets into the UTF-8 source (`u32`, files over 4GB are rejected).
//! - The model knows nothing about rules; rules borrow nodes and never mutate them.

#[cfg(feature = "kotlin")]
pub mod kotlin;
pub mod path_util;
pub mod syntax;

#[cfg(feature = "kotlin")]
pub use kotlin::KotlinHost;
pub use syntax::{
    line_col, FunctionDeclaration, ImportDirective, NodeKind, Preorder, SyntaxNode, SyntaxTree,
    Token,
};

/// A parsed source file, ready for linting.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Normalized file path (UTF-8, forward slashes).
    pub path: String,
    pub source: String,
    pub tree: SyntaxTree,
}

impl SourceFile {
    /// Resolves a byte offset of this file to a 1-indexed `(line, column)`.
    pub fn position(&self, offset: u32) -> (u32, u32) {
        line_col(&self.source, offset)
    }
}

/// Errors produced by the Anatomist crate.
#[derive(Debug, thiserror::Error)]
pub enum AnatomistError {
    /// Grammar loading or parsing failed, or the source is not UTF-8.
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Byte range exceeds u32::MAX (file too large).
    #[error("Byte range overflow: file size exceeds 4GB limit")]
    ByteRangeOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_file_position() {
        let file = SourceFile {
            path: "Foo.kt".into(),
            source: "package a\nfun DoWork() {}\n".into(),
            tree: SyntaxTree::new(SyntaxNode::file(vec![])),
        };
        assert_eq!(file.position(0), (1, 1));
        assert_eq!(file.position(14), (2, 5));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AnatomistError::ParseFailure("boom".into()).to_string(),
            "Parse failure: boom"
        );
        assert!(AnatomistError::ByteRangeOverflow
            .to_string()
            .contains("4GB"));
    }
}
