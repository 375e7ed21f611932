//! Grammar-agnostic syntax model handed to lint rules.
//!
//! A [`SyntaxTree`] is built once per file (by a frontend such as
//! [`KotlinHost`](crate::KotlinHost), or by hand in tests) and is immutable
//! afterwards. Rules receive nodes through [`SyntaxNode::preorder`], which is
//! the document order the rule engine guarantees.

/// A leaf token: its exact source text and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    pub offset: u32,
}

impl Token {
    pub fn new(text: impl Into<String>, offset: u32) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }
}

/// `import org.junit.Test` / `import kotlin.test.*` / `import a.b.C as D`.
///
/// `path` is the dotted path only (no alias, no `.*`). It is `None` when the
/// frontend could not resolve one, e.g. for a malformed directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDirective {
    pub path: Option<String>,
}

impl ImportDirective {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

/// View over a `fun` declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDeclaration {
    /// The identifier token, absent for malformed declarations.
    pub name: Option<Token>,
    /// The declared return type reference, exactly as written in the source.
    pub return_type: Option<Token>,
}

impl FunctionDeclaration {
    /// A declaration whose identifier is `text` at byte `offset`.
    pub fn named(text: impl Into<String>, offset: u32) -> Self {
        Self {
            name: Some(Token::new(text, offset)),
            return_type: None,
        }
    }

    /// Adds a declared return type.
    pub fn returning(mut self, text: impl Into<String>, offset: u32) -> Self {
        self.return_type = Some(Token::new(text, offset));
        self
    }

    pub fn has_declared_return_type(&self) -> bool {
        self.return_type.is_some()
    }

    /// Identifier text, or `""` when the identifier is absent.
    pub fn name_text(&self) -> &str {
        self.name.as_ref().map_or("", |t| t.text.as_str())
    }

    pub fn return_type_text(&self) -> Option<&str> {
        self.return_type.as_ref().map(|t| t.text.as_str())
    }
}

/// Node kinds distinguished by the model. Everything rules do not inspect
/// collapses into `Other`, which keeps the grammar's own kind tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    ImportDirective(ImportDirective),
    FunctionDeclaration(FunctionDeclaration),
    Identifier(Token),
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Byte offset of the first character of the node.
    pub offset: u32,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, offset: u32, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            offset,
            children,
        }
    }

    /// The root of a file.
    pub fn file(children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::File, 0, children)
    }

    /// An import directive with a resolved path.
    pub fn import(path: &str, offset: u32) -> Self {
        Self::new(
            NodeKind::ImportDirective(ImportDirective::new(path)),
            offset,
            Vec::new(),
        )
    }

    /// A function declaration node. The identifier, if any, is also attached
    /// as an `Identifier` child so generic walks see it.
    pub fn function(decl: FunctionDeclaration, offset: u32) -> Self {
        let children = decl
            .name
            .iter()
            .map(|t| Self::identifier(&t.text, t.offset))
            .collect();
        Self::new(NodeKind::FunctionDeclaration(decl), offset, children)
    }

    pub fn identifier(text: &str, offset: u32) -> Self {
        Self::new(
            NodeKind::Identifier(Token::new(text, offset)),
            offset,
            Vec::new(),
        )
    }

    pub fn other(kind: &str, offset: u32, children: Vec<SyntaxNode>) -> Self {
        Self::new(NodeKind::Other(kind.to_string()), offset, children)
    }

    pub fn as_function(&self) -> Option<&FunctionDeclaration> {
        match &self.kind {
            NodeKind::FunctionDeclaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_import(&self) -> Option<&ImportDirective> {
        match &self.kind {
            NodeKind::ImportDirective(import) => Some(import),
            _ => None,
        }
    }

    /// Iterates this node and all descendants in document order.
    ///
    /// # Example
    /// ```
    /// # use anatomist::{FunctionDeclaration, SyntaxNode};
    /// let root = SyntaxNode::file(vec![
    ///     SyntaxNode::import("org.junit.Test", 0),
    ///     SyntaxNode::function(FunctionDeclaration::named("run", 27), 23),
    /// ]);
    /// let offsets: Vec<u32> = root.preorder().map(|n| n.offset).collect();
    /// assert_eq!(offsets, vec![0, 0, 23, 27]);
    /// ```
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order, left-to-right traversal. Iterative, so deeply nested trees
/// cannot overflow the call stack.
pub struct Preorder<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Immutable tree of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    pub fn nodes(&self) -> Preorder<'_> {
        self.root.preorder()
    }
}

/// Maps a byte offset to a 1-indexed `(line, column)`; columns count characters.
///
/// Offsets past the end of `source` clamp to the position after the last character.
pub fn line_col(source: &str, offset: u32) -> (u32, u32) {
    let limit = (offset as usize).min(source.len());
    let mut line = 1;
    let mut column = 1;
    for (i, ch) in source.char_indices() {
        if i >= limit {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}
