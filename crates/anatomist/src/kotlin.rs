//! Tree-sitter Kotlin frontend.
//!
//! Lowers the `tree-sitter-kotlin-ng` concrete syntax tree into the
//! grammar-agnostic [`SyntaxTree`]. Only named, non-extra nodes are kept;
//! punctuation and keywords are dropped. Lowering never fails on syntax
//! errors: tree-sitter recovers and the `ERROR` nodes become `Other`.

use std::fs::File;
use std::path::Path;

use memmap2::MmapOptions;
use tree_sitter::{Node, Parser};

use crate::path_util::normalize_path;
use crate::syntax::{FunctionDeclaration, ImportDirective, NodeKind, SyntaxNode, SyntaxTree, Token};
use crate::{AnatomistError, SourceFile};

/// Identifier leaf kinds across Kotlin grammar revisions.
const IDENTIFIER_KINDS: &[&str] = &["identifier", "simple_identifier"];

/// Parameter list kinds; the return type is only looked for after one of these.
const PARAMETER_KINDS: &[&str] = &["function_value_parameters", "function_parameters"];

/// Parser host for Kotlin sources (`.kt`, `.kts`).
///
/// # Example
/// ```no_run
/// use anatomist::KotlinHost;
/// use std::path::Path;
///
/// let mut host = KotlinHost::new().unwrap();
/// let file = host.dissect(Path::new("src/main/kotlin/App.kt")).unwrap();
/// for node in file.tree.nodes() {
///     if let Some(decl) = node.as_function() {
///         println!("{}", decl.name_text());
///     }
/// }
/// ```
pub struct KotlinHost {
    parser: Parser,
}

impl KotlinHost {
    /// Creates a host with the Kotlin grammar loaded.
    ///
    /// # Errors
    /// `AnatomistError::ParseFailure` if the grammar is ABI-incompatible with the
    /// linked tree-sitter runtime.
    pub fn new() -> Result<Self, AnatomistError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_kotlin_ng::LANGUAGE.into())
            .map_err(|e| {
                AnatomistError::ParseFailure(format!("Failed to load Kotlin grammar: {}", e))
            })?;
        Ok(Self { parser })
    }

    /// Reads and parses a Kotlin file using memory-mapped I/O.
    ///
    /// # Errors
    /// - `IoError`: file not found, permission denied, mmap failure
    /// - `ByteRangeOverflow`: file larger than 4GB
    /// - `ParseFailure`: non-UTF-8 content or tree-sitter returned no tree
    pub fn dissect(&mut self, path: &Path) -> Result<SourceFile, AnatomistError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        if file_len > u32::MAX as u64 {
            return Err(AnatomistError::ByteRangeOverflow);
        }

        let normalized_path = normalize_path(path)?;
        let source = if file_len == 0 {
            String::new()
        } else {
            // SAFETY: the file handle outlives the read-only mapping, which is
            // copied into an owned String before either is dropped.
            let mmap = unsafe { MmapOptions::new().map(&file)? };
            std::str::from_utf8(&mmap[..])
                .map_err(|e| {
                    AnatomistError::ParseFailure(format!("{normalized_path}: not UTF-8: {e}"))
                })?
                .to_string()
        };

        let tree = self.parse_source(&source)?;
        tracing::debug!(path = %normalized_path, bytes = source.len(), "parsed");
        Ok(SourceFile {
            path: normalized_path,
            source,
            tree,
        })
    }

    /// Parses source text into a [`SyntaxTree`].
    pub fn parse_source(&mut self, source: &str) -> Result<SyntaxTree, AnatomistError> {
        if source.len() > u32::MAX as usize {
            return Err(AnatomistError::ByteRangeOverflow);
        }
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            AnatomistError::ParseFailure("Tree-sitter parse returned None".to_string())
        })?;
        Ok(SyntaxTree::new(lower(tree.root_node(), source)))
    }
}

/// One node under construction: its lowered form plus the CST children still to visit.
struct Frame<'t> {
    lowered: SyntaxNode,
    pending: std::vec::IntoIter<Node<'t>>,
}

impl<'t> Frame<'t> {
    fn open(node: Node<'t>, source: &str) -> Self {
        let mut cursor = node.walk();
        let pending: Vec<Node<'t>> = node
            .children(&mut cursor)
            // Recovered `ERROR` nodes are extras too, but may hold declarations.
            .filter(|c| c.is_named() && (!c.is_extra() || c.is_error()))
            .collect();
        Self {
            lowered: SyntaxNode::new(node_kind(node, source), node.start_byte() as u32, Vec::new()),
            pending: pending.into_iter(),
        }
    }
}

/// Iterative post-order assembly; Kotlin expression chains can nest far deeper
/// than a recursive walk would tolerate.
fn lower(root: Node<'_>, source: &str) -> SyntaxNode {
    let mut stack = vec![Frame::open(root, source)];
    loop {
        let next_child = match stack.last_mut() {
            Some(frame) => frame.pending.next(),
            None => return SyntaxNode::file(Vec::new()),
        };
        if let Some(child) = next_child {
            stack.push(Frame::open(child, source));
            continue;
        }
        let Some(done) = stack.pop() else {
            return SyntaxNode::file(Vec::new());
        };
        match stack.last_mut() {
            Some(parent) => parent.lowered.children.push(done.lowered),
            None => return done.lowered,
        }
    }
}

fn node_kind(node: Node<'_>, source: &str) -> NodeKind {
    match node.kind() {
        "source_file" => NodeKind::File,
        "import" | "import_header" => NodeKind::ImportDirective(import_directive(node, source)),
        "function_declaration" => NodeKind::FunctionDeclaration(function_declaration(node, source)),
        kind if IDENTIFIER_KINDS.contains(&kind) => NodeKind::Identifier(token(node, source)),
        kind => NodeKind::Other(kind.to_string()),
    }
}

/// Collects the dotted path: the first contiguous run of identifier and `.`
/// children. The run ends at the alias (`as`) or the wildcard (`*`).
fn import_directive(node: Node<'_>, source: &str) -> ImportDirective {
    let mut raw = String::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_extra() {
            continue;
        }
        match child.kind() {
            "qualified_identifier" | "identifier" | "simple_identifier" | "." => {
                raw.push_str(text(child, source))
            }
            _ if raw.is_empty() => {} // `import` keyword
            _ => break,
        }
    }
    let path: String = raw.split_whitespace().collect();
    let path = path.trim_end_matches('.');
    ImportDirective {
        path: (!path.is_empty()).then(|| path.to_string()),
    }
}

fn function_declaration(node: Node<'_>, source: &str) -> FunctionDeclaration {
    let mut name = node
        .child_by_field_name("name")
        .filter(|n| IDENTIFIER_KINDS.contains(&n.kind()));
    let named_by_field = name.is_some();
    let mut return_type = None;
    let mut seen_params = false;
    let mut after_colon = false;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_extra() {
            continue;
        }
        let kind = child.kind();
        if !seen_params {
            if PARAMETER_KINDS.contains(&kind) {
                seen_params = true;
            } else if !named_by_field && IDENTIFIER_KINDS.contains(&kind) {
                // Last identifier before the parameters; a receiver type comes first.
                name = Some(child);
            }
            continue;
        }
        if kind == ":" && !after_colon {
            after_colon = true;
            continue;
        }
        if after_colon && child.is_named() {
            return_type = Some(child);
        }
        break;
    }

    FunctionDeclaration {
        name: name.map(|n| token(n, source)),
        return_type: return_type.map(|t| token(t, source)),
    }
}

fn token(node: Node<'_>, source: &str) -> Token {
    Token::new(text(node, source), node.start_byte() as u32)
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}
