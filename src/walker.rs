//! Declaration walker.
//!
//! Visits one parsed source unit and asks the renderer for each fragment in
//! a fixed order:
//!
//! 1. namespace line
//! 2. top-level classes, each with navigation and its member sections
//! 3. top-level interfaces, the same way
//!
//! Output is fully determined by the tree.

use crate::comment::CommentTagSet;
use crate::error::DocError;
use crate::model::*;
use crate::render::Renderer;
use crate::snippet;
use crate::syntax::{NodeId, NodeKind, SyntaxTree, Trivia, TriviaKind};
use regex::Regex;
use std::sync::LazyLock;

/// Heading level of methods and constructors on a class or interface page.
const MEMBER_LEVEL: usize = 3;
/// Heading level of constructors listed under their struct.
const NESTED_MEMBER_LEVEL: usize = 4;

static RE_LINE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^//+").unwrap());

/// What to do with a declaration whose documentation comment is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Emit a diagnostic placeholder and keep going.
    #[default]
    Isolate,
    /// Give up on the whole unit.
    Abort,
}

pub struct Walker<'r> {
    renderer: &'r dyn Renderer,
    policy: FailurePolicy,
}

impl<'r> Walker<'r> {
    pub fn new(renderer: &'r dyn Renderer, policy: FailurePolicy) -> Self {
        Self { renderer, policy }
    }

    /// Render the complete page for one source unit.
    pub fn document(&self, tree: &SyntaxTree) -> Result<String, DocError> {
        let namespace = tree
            .descendants(tree.root())
            .find(|&id| tree.kind(id) == NodeKind::Namespace)
            .ok_or(DocError::MissingNamespace)?;
        let namespace = tree
            .child(namespace, NodeKind::Name)
            .map(|name| tree.text(name))
            .unwrap_or_default();

        let mut out = String::new();
        out.push_str(&self.renderer.begin(&namespace));
        out.push_str(&self.renderer.namespace(&namespace));

        for (kind, node_kind) in [
            (DeclKind::Class, NodeKind::Class),
            (DeclKind::Interface, NodeKind::Interface),
        ] {
            let types = top_level(tree, node_kind);
            for (i, &id) in types.iter().enumerate() {
                self.type_page(&mut out, tree, id, kind)?;
                if i + 1 < types.len() {
                    out.push_str(&self.renderer.separator());
                }
            }
        }

        out.push_str(&self.renderer.end());
        Ok(out)
    }

    fn type_page(
        &self,
        out: &mut String,
        tree: &SyntaxTree,
        id: NodeId,
        kind: DeclKind,
    ) -> Result<(), DocError> {
        tracing::debug!(kind = %kind, name = tree.identifier(id).unwrap_or_default(), "documenting");
        self.emit(out, tree, id, kind, MEMBER_LEVEL)?;

        let properties: Vec<NodeId> = if kind == DeclKind::Class {
            of_kind(tree, tree.children(id).iter().copied(), NodeKind::Property)
        } else {
            Vec::new()
        };
        let structs = of_kind(tree, tree.descendants(id), NodeKind::Struct);
        let constructors: Vec<NodeId> = of_kind(tree, tree.descendants(id), NodeKind::Constructor)
            .into_iter()
            .filter(|&ctor| {
                tree.parent(ctor)
                    .is_none_or(|parent| tree.kind(parent) != NodeKind::Struct)
            })
            .collect();
        let methods = of_kind(tree, tree.descendants(id), NodeKind::Method);

        let sections: Vec<Section> = [
            (Section::Properties, properties.is_empty()),
            (Section::Structs, structs.is_empty()),
            (Section::Constructors, constructors.is_empty()),
            (Section::Methods, methods.is_empty()),
        ]
        .into_iter()
        .filter(|&(_, empty)| !empty)
        .map(|(section, _)| section)
        .collect();

        if sections.is_empty() {
            return Ok(());
        }
        out.push_str(&self.renderer.navigation(&sections));

        if !properties.is_empty() {
            out.push_str(&self.renderer.section(Section::Properties));
            let rows: Vec<PropertyRecord> = properties
                .iter()
                .map(|&prop| property_record(tree, prop))
                .collect();
            out.push_str(&self.renderer.properties(&rows));
        }

        if !structs.is_empty() {
            out.push_str(&self.renderer.section(Section::Structs));
            for &structure in &structs {
                self.emit(out, tree, structure, DeclKind::Struct, MEMBER_LEVEL)?;
                let own = of_kind(
                    tree,
                    tree.children(structure).iter().copied(),
                    NodeKind::Constructor,
                );
                for ctor in own {
                    self.emit(out, tree, ctor, DeclKind::Constructor, NESTED_MEMBER_LEVEL)?;
                }
            }
        }

        if !constructors.is_empty() {
            out.push_str(&self.renderer.section(Section::Constructors));
            for &ctor in &constructors {
                self.emit(out, tree, ctor, DeclKind::Constructor, MEMBER_LEVEL)?;
            }
        }

        if !methods.is_empty() {
            out.push_str(&self.renderer.section(Section::Methods));
            for &method in &methods {
                self.emit(out, tree, method, DeclKind::Method, MEMBER_LEVEL)?;
            }
        }

        Ok(())
    }

    /// Render one declaration, applying the failure policy when its comment
    /// cannot be read.
    fn emit(
        &self,
        out: &mut String,
        tree: &SyntaxTree,
        id: NodeId,
        kind: DeclKind,
        level: usize,
    ) -> Result<(), DocError> {
        let name = tree.identifier(id).unwrap_or_default();
        let tags = match CommentTagSet::parse(tree.leading_trivia(id)) {
            Ok(tags) => tags,
            Err(error) => {
                return match self.policy {
                    FailurePolicy::Abort => Err(DocError::MalformedComment {
                        kind,
                        name: name.to_string(),
                        error,
                    }),
                    FailurePolicy::Isolate => {
                        tracing::warn!(kind = %kind, name, %error, "skipping declaration");
                        out.push_str(&self.renderer.diagnostic(kind, name, &error.to_string()));
                        Ok(())
                    }
                };
            }
        };

        let record = describe(tree, id, kind, &tags);
        let fragment = match kind {
            DeclKind::Class => self.renderer.class(&record),
            DeclKind::Interface => self.renderer.interface(&record),
            DeclKind::Struct => self.renderer.structure(&record),
            DeclKind::Constructor | DeclKind::Method => self.renderer.method(&record, level),
        };
        out.push_str(&fragment);
        Ok(())
    }
}

/// Classes or interfaces not nested inside another type, in document order.
fn top_level(tree: &SyntaxTree, kind: NodeKind) -> Vec<NodeId> {
    tree.descendants(tree.root())
        .filter(|&id| tree.kind(id) == kind)
        .filter(|&id| {
            let mut parent = tree.parent(id);
            while let Some(p) = parent {
                if tree.kind(p).is_type_declaration() {
                    return false;
                }
                parent = tree.parent(p);
            }
            true
        })
        .collect()
}

fn of_kind(tree: &SyntaxTree, nodes: impl Iterator<Item = NodeId>, kind: NodeKind) -> Vec<NodeId> {
    nodes.filter(|&id| tree.kind(id) == kind).collect()
}

fn describe(tree: &SyntaxTree, id: NodeId, kind: DeclKind, tags: &CommentTagSet) -> DeclarationRecord {
    let name = tree.identifier(id).unwrap_or_default();
    let mut record = DeclarationRecord::new(kind, name, snippet::snippet(tree, id));
    record.summary = tags.tag("summary").to_string();

    if kind == DeclKind::Method {
        record.returns = tags.tag("returns").to_string();
        record.type_parameters = type_parameters(tree, id, tags);
    }
    if matches!(kind, DeclKind::Method | DeclKind::Constructor) {
        record.parameters = parameters(tree, id, tags);
    }
    record
}

fn type_parameters(tree: &SyntaxTree, id: NodeId, tags: &CommentTagSet) -> Vec<TypeParameterDescriptor> {
    let Some(list) = tree.child(id, NodeKind::TypeParameterList) else {
        return Vec::new();
    };
    tree.children(list)
        .iter()
        .filter_map(|&tp| tree.identifier(tp))
        .map(|name| TypeParameterDescriptor {
            name: name.to_string(),
            description: tags.type_param(name).to_string(),
        })
        .collect()
}

fn parameters(tree: &SyntaxTree, id: NodeId, tags: &CommentTagSet) -> Vec<ParameterDescriptor> {
    let Some(list) = tree.child(id, NodeKind::ParameterList) else {
        return Vec::new();
    };
    of_kind(tree, tree.children(list).iter().copied(), NodeKind::Parameter)
        .into_iter()
        .map(|param| {
            let name = tree.identifier(param).unwrap_or_default();
            let mut type_name: Vec<String> = tree.modifiers(param).map(str::to_string).collect();
            if let Some(ty) = tree.child(param, NodeKind::Type) {
                type_name.push(tree.text(ty));
            }
            ParameterDescriptor {
                type_name: type_name.join(" "),
                name: name.to_string(),
                default: tree
                    .child(param, NodeKind::DefaultValue)
                    .map(|value| tree.text(value)),
                description: tags.param(name).to_string(),
            }
        })
        .collect()
}

/// Plain `//` comments on the lines directly above a property, or else the
/// one trailing it on the same line.
fn property_record(tree: &SyntaxTree, id: NodeId) -> PropertyRecord {
    let leading = line_comments(attached(tree.leading_trivia(id)));
    let comment = if leading.is_empty() {
        line_comments(tree.trailing_trivia(id))
            .into_iter()
            .next()
            .unwrap_or_default()
    } else {
        leading.join(" ")
    };
    PropertyRecord {
        name: tree.identifier(id).unwrap_or_default().to_string(),
        comment,
    }
}

/// The tail of leading trivia after the last blank line or documentation
/// comment.
fn attached(trivia: &[Trivia]) -> &[Trivia] {
    let mut start = 0;
    let mut line_empty = true;
    for (i, t) in trivia.iter().enumerate() {
        match t.kind {
            TriviaKind::Whitespace => {}
            TriviaKind::EndOfLine => {
                if line_empty {
                    start = i + 1;
                }
                line_empty = true;
            }
            TriviaKind::DocComment => {
                start = i + 1;
                line_empty = false;
            }
            _ => line_empty = false,
        }
    }
    &trivia[start..]
}

fn line_comments(trivia: &[Trivia]) -> Vec<String> {
    trivia
        .iter()
        .filter(|t| t.kind == TriviaKind::LineComment)
        .map(|t| RE_LINE_COMMENT.replace(&t.text, "").trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::markdown::MarkdownRenderer;
    use crate::syntax::parse;

    fn render(source: &str) -> String {
        render_with(source, FailurePolicy::Isolate).unwrap()
    }

    fn render_with(source: &str, policy: FailurePolicy) -> Result<String, DocError> {
        let tree = parse(source);
        Walker::new(&MarkdownRenderer, policy).document(&tree)
    }

    #[test]
    fn single_documented_class() {
        let out = render("namespace N {\n/// <summary>Does X</summary>\npublic class Foo {}\n}\n");
        assert_eq!(
            out,
            "**Namespace:** N\n\n# class `Foo`\n```csharp\npublic class Foo\n```\n\nDoes X\n\n"
        );
    }

    #[test]
    fn method_parameters_and_returns() {
        let out = render(
            r#"namespace N {
public class Calc {
    /// <summary>Adds.</summary>
    /// <param name="a">first</param>
    /// <returns>The sum.</returns>
    public int Add(int a, int b = 5) { return a + b; }
}
}"#,
        );
        assert!(out.contains("**Navigate**\n- [Methods](#methods)\n\n## Methods\n### method `Add`\n"));
        assert!(out.contains("```csharp\npublic int Add(int a, int b = 5)\n```\n\nAdds.\n\n"));
        assert!(out.contains("**Returns:** The sum.\n\n"));
        assert!(out.contains("int **`a`** | first\n"));
        assert!(out.contains("int **`b`** = `5` |\n"));
    }

    #[test]
    fn separator_between_classes_only() {
        let out = render("namespace N { public class A {} public class B {} }");
        assert_eq!(out.matches("---\n\n").count(), 1);
        let a = out.find("# class `A`").unwrap();
        let sep = out.find("---\n\n").unwrap();
        let b = out.find("# class `B`").unwrap();
        assert!(a < sep && sep < b);
        assert!(!out.ends_with("---\n\n"));
    }

    #[test]
    fn interfaces_follow_classes() {
        let out = render("namespace N { public interface I { void Run(); } public class C {} }");
        let class = out.find("# class `C`").unwrap();
        let interface = out.find("# interface `I`").unwrap();
        assert!(class < interface);
        assert!(out.contains("### method `Run`\n```csharp\nvoid Run()\n```\n\n"));
    }

    #[test]
    fn struct_constructor_listed_once() {
        let out = render(
            r#"namespace N {
public class Outer {
    public Outer() { }
    public struct Point {
        /// <summary>Makes a point.</summary>
        public Point(int x) { }
    }
}
}"#,
        );
        assert_eq!(out.matches("constructor `Point`").count(), 1);
        assert!(out.contains("## Structs\n### struct `Point`\n"));
        assert!(out.contains("#### constructor `Point`\n"));
        assert!(out.contains("## Constructors\n### constructor `Outer`\n"));
        assert!(out.contains(
            "**Navigate**\n- [Structs](#structs)\n- [Constructors](#constructors)\n\n"
        ));
    }

    #[test]
    fn nested_class_is_not_top_level() {
        let out = render("namespace N { public class Outer { public class Inner { } } }");
        assert!(out.contains("# class `Outer`"));
        assert!(!out.contains("`Inner`"));
    }

    #[test]
    fn property_comments() {
        let out = render(
            r#"namespace N {
public class Item {
    // how many
    // in stock
    public int Count { get; set; }
    public string Name { get; set; } // display name
    public bool Hidden => false;
}
}"#,
        );
        assert!(out.contains(
            "## Properties\n|Property|Description|\n|---|---|\n\
             |Count|how many in stock|\n|Name|display name|\n|Hidden||\n\n"
        ));
    }

    #[test]
    fn property_comment_must_be_adjacent() {
        let out = render(
            r#"namespace N {
public class Item {
    // Section header

    /// <summary>Price in cents.</summary>
    public int Price { get; set; }
    // stale note

    public int Stock { get; set; }
    /// <summary>Label.</summary>
    // shown in lists
    public string Label { get; set; }
}
}"#,
        );
        assert!(out.contains("|Price||\n|Stock||\n|Label|shown in lists|\n\n"));
    }

    #[test]
    fn separator_between_interfaces_only() {
        let out = render("namespace N { public interface IA {} public interface IB {} }");
        assert_eq!(out.matches("---\n\n").count(), 1);
        let a = out.find("# interface `IA`").unwrap();
        let sep = out.find("---\n\n").unwrap();
        let b = out.find("# interface `IB`").unwrap();
        assert!(a < sep && sep < b);
        assert!(!out.ends_with("---\n\n"));
    }

    #[test]
    fn struct_only_constructors_leave_no_constructors_section() {
        let out = render(
            "namespace N { public class Outer { public struct Point { public Point(int x) { } } } }",
        );
        assert!(out.contains("**Navigate**\n- [Structs](#structs)\n\n"));
        assert!(!out.contains("## Constructors"));
        assert!(!out.contains("[Constructors]"));
        assert!(out.contains("#### constructor `Point`\n"));
    }

    #[test]
    fn generic_default_is_one_row() {
        let out = render("namespace N { public class A { public S M(S s = new S<int, int>()) { return s; } } }");
        assert!(out.contains("Parameter|Description\n---|---\nS **`s`** = `new S<int, int>()` |\n\n"));
    }

    #[test]
    fn interface_properties_are_not_listed() {
        let out = render("namespace N { public interface IItem { int Count { get; } } }");
        assert!(!out.contains("Properties"));
        assert!(!out.contains("**Navigate**"));
    }

    #[test]
    fn generic_method_type_parameters() {
        let out = render(
            r#"namespace N {
public class Factory {
    /// <typeparam name="T">product</typeparam>
    public T Make<T>() where T : new() => new T();
}
}"#,
        );
        assert!(out.contains("Type Parameter|Description\n---|---\n**`T`** | product\n\n"));
    }

    #[test]
    fn parameter_modifiers_join_the_type() {
        let out = render("namespace N { public class P { public bool TryGet(string key, out int value) { value = 0; return true; } } }");
        assert!(out.contains("string **`key`** |\n"));
        assert!(out.contains("out int **`value`** |\n"));
    }

    #[test]
    fn missing_namespace() {
        let err = render_with("public class Foo {}", FailurePolicy::Isolate).unwrap_err();
        assert!(matches!(err, DocError::MissingNamespace));
    }

    const BROKEN: &str = r#"namespace N {
public class C {
    /// <summary>unclosed
    public void Bad() { }

    /// <summary>fine</summary>
    public void Good() { }
}
}"#;

    #[test]
    fn malformed_comment_isolated() {
        let out = render_with(BROKEN, FailurePolicy::Isolate).unwrap();
        assert!(out.contains("> **Warning:** method `Bad` could not be documented: "));
        assert!(!out.contains("### method `Bad`"));
        assert!(out.contains("### method `Good`\n```csharp\npublic void Good()\n```\n\nfine\n\n"));
    }

    #[test]
    fn malformed_comment_aborts() {
        let err = render_with(BROKEN, FailurePolicy::Abort).unwrap_err();
        match err {
            DocError::MalformedComment { kind, name, .. } => {
                assert_eq!(kind, DeclKind::Method);
                assert_eq!(name, "Bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_is_deterministic() {
        let source = "namespace N { public class A { public void M() {} } public interface I {} }";
        assert_eq!(render(source), render(source));
    }

    #[test]
    fn file_scoped_namespace() {
        let out = render("namespace Acme.Tools;\n\npublic class Foo { }\n");
        assert!(out.starts_with("**Namespace:** Acme.Tools\n\n# class `Foo`\n"));
    }
}
