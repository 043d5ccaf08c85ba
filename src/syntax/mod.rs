//! Declaration-level C# syntax tree.
//!
//! The tree is an arena of nodes addressed by [`NodeId`], allocated in
//! document order. Every significant token keeps the trivia (whitespace,
//! comments, directives) that surrounds it, so documentation comments can be
//! recovered from the first token of a declaration.
//!
//! Only declaration headers are modelled. Method bodies, accessor lists and
//! members that never show up in the generated pages are kept as opaque
//! token groups.

mod lexer;
mod parser;

pub use lexer::{Token, TokenKind, Trivia, TriviaKind};
pub use parser::parse;

use std::ops::Range;

/// Stable index of a node inside a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    CompilationUnit,
    /// Block-scoped or file-scoped namespace.
    Namespace,
    /// Qualified name of a namespace.
    Name,
    Class,
    Interface,
    Struct,
    Record,
    Enum,
    Constructor,
    Method,
    Property,
    /// Fields, events, indexers, operators, destructors and delegates.
    Member,
    AttributeList,
    Type,
    TypeParameterList,
    TypeParameter,
    ParameterList,
    Parameter,
    /// Default value of an optional parameter, without the `=`.
    DefaultValue,
    ConstraintClause,
    BaseList,
    ConstructorInitializer,
    /// `IFoo.` prefix of an explicitly implemented member.
    ExplicitInterface,
    Block,
    /// `=> expression` body.
    ArrowBody,
    AccessorList,
}

impl NodeKind {
    /// Whether this node is the body of a method, constructor or property.
    pub fn is_body(self) -> bool {
        matches!(self, NodeKind::Block | NodeKind::ArrowBody)
    }

    /// Whether this node declares a type with a member scope.
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Struct
                | NodeKind::Record
                | NodeKind::Enum
        )
    }
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    tokens: Range<usize>,
    identifier: Option<usize>,
    modifiers: Vec<usize>,
}

/// A parsed source unit. Immutable once built.
#[derive(Debug)]
pub struct SyntaxTree {
    tokens: Vec<Token>,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Immediate children in source order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// All nodes below `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// First immediate child of the given kind.
    pub fn child(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    /// Name token of a declaration, type parameter or parameter.
    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.nodes[id.0]
            .identifier
            .map(|index| self.tokens[index].text.as_str())
    }

    /// Modifier keywords (`public`, `static`, `ref`, ...) in source order.
    pub fn modifiers(&self, id: NodeId) -> impl Iterator<Item = &str> + '_ {
        self.nodes[id.0]
            .modifiers
            .iter()
            .map(|&index| self.tokens[index].text.as_str())
    }

    /// Significant tokens covered by the node.
    pub fn tokens(&self, id: NodeId) -> &[Token] {
        &self.tokens[self.nodes[id.0].tokens.clone()]
    }

    /// Trivia in front of the node's first token.
    pub fn leading_trivia(&self, id: NodeId) -> &[Trivia] {
        self.tokens(id)
            .first()
            .map(|token| token.leading.as_slice())
            .unwrap_or(&[])
    }

    /// Trivia after the node's last token, up to the end of that line.
    pub fn trailing_trivia(&self, id: NodeId) -> &[Trivia] {
        self.tokens(id)
            .last()
            .map(|token| token.trailing.as_slice())
            .unwrap_or(&[])
    }

    /// Source text of the node on a single line.
    ///
    /// Tokens are separated by one space wherever the source had any trivia
    /// between them and written back to back otherwise, so `List<int>` and
    /// `(int a, int b = 5)` keep their shape while line breaks and comments
    /// collapse.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut prev: Option<&Token> = None;
        for token in self.tokens(id) {
            if let Some(prev) = prev {
                if !prev.trailing.is_empty() || !token.leading.is_empty() {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
            prev = Some(token);
        }
        out
    }
}

/// Pre-order iterator returned by [`SyntaxTree::descendants`].
pub struct Descendants<'t> {
    tree: &'t SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(tree: &SyntaxTree, kind: NodeKind) -> NodeId {
        tree.descendants(tree.root())
            .find(|&id| tree.kind(id) == kind)
            .unwrap()
    }

    #[test]
    fn descendants_follow_document_order() {
        let tree = parse(
            "namespace N { class A { void M() {} } interface I { void P(); } }",
        );
        let kinds: Vec<NodeKind> = tree
            .descendants(tree.root())
            .map(|id| tree.kind(id))
            .filter(|kind| {
                matches!(kind, NodeKind::Class | NodeKind::Interface | NodeKind::Method)
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Class,
                NodeKind::Method,
                NodeKind::Interface,
                NodeKind::Method
            ]
        );
    }

    #[test]
    fn text_collapses_line_breaks() {
        let tree = parse("namespace N { class A { void M(int a,\n    int b = 5) {} } }");
        let params = first(&tree, NodeKind::ParameterList);
        assert_eq!(tree.text(params), "(int a, int b = 5)");
    }

    #[test]
    fn text_keeps_adjacent_tokens_together() {
        let tree = parse("namespace N { class A { List<int> M() => null; } }");
        let ty = first(&tree, NodeKind::Type);
        assert_eq!(tree.text(ty), "List<int>");
    }

    #[test]
    fn parent_links_point_upwards() {
        let tree = parse("namespace N { struct S { S(int x) {} } }");
        let ctor = first(&tree, NodeKind::Constructor);
        let parent = tree.parent(ctor).unwrap();
        assert_eq!(tree.kind(parent), NodeKind::Struct);
        assert_eq!(tree.identifier(parent), Some("S"));
    }
}
