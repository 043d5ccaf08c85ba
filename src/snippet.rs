//! One-line signature snippets for declarations.

use crate::syntax::{NodeId, NodeKind, SyntaxTree, TokenKind};

/// Signature of a type, method or constructor declaration without its body.
pub fn snippet(tree: &SyntaxTree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::Method | NodeKind::Constructor => member_snippet(tree, id),
        kind if kind.is_type_declaration() => type_snippet(tree, id),
        _ => tree.text(id),
    }
}

/// Tokens from the start of the declaration up to its opening brace, one
/// space apart. Attributes, modifiers, generic parameters, base list and
/// constraints all come along without being looked at individually.
fn type_snippet(tree: &SyntaxTree, id: NodeId) -> String {
    let mut out = String::new();
    for token in tree.tokens(id) {
        if matches!(token.kind, TokenKind::LBrace | TokenKind::Semi) {
            break;
        }
        out.push_str(&token.text);
        out.push(' ');
    }
    out.trim().to_string()
}

/// Modifiers, then the child nodes up to the body, with the name put back
/// after the return type (methods) or first (constructors).
fn member_snippet(tree: &SyntaxTree, id: NodeId) -> String {
    let name_slot = if tree.kind(id) == NodeKind::Constructor {
        0
    } else {
        1
    };
    let identifier = tree.identifier(id).unwrap_or_default();

    let mut out = tree.modifiers(id).collect::<Vec<_>>().join(" ");
    out.push(' ');

    let children = tree
        .children(id)
        .iter()
        .copied()
        .filter(|&child| tree.kind(child) != NodeKind::AttributeList);

    for (i, child) in children.enumerate() {
        let kind = tree.kind(child);
        if kind.is_body() {
            break;
        }

        if i == name_slot {
            if kind == NodeKind::ExplicitInterface {
                out.push_str(&tree.text(child));
                out.push_str(identifier);
                out.push(' ');
                continue;
            }
            out.push_str(identifier);
        }

        // `Name(` rather than `Name (`
        if kind == NodeKind::ParameterList {
            let len = out.trim_end().len();
            out.truncate(len);
        }

        out.push_str(&tree.text(child));
        out.push(' ');
    }

    out.trim().to_string()
}
