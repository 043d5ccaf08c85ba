//! XML documentation comment parser.
//!
//! Collects the `///` lines in front of a declaration, wraps them in a single
//! root element and reads the tags back out:
//!
//! - `<summary>`, `<returns>`, ... → first occurrence wins
//! - `<param name="x">`, `<typeparam name="T">` → keyed by name, last wins

use crate::error::MalformedComment;
use crate::syntax::{Trivia, TriviaKind};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static RE_DOC_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*///").unwrap());

/// Tags of one declaration's documentation comment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommentTagSet {
    tags: HashMap<String, String>,
    items: HashMap<String, HashMap<String, String>>,
}

impl CommentTagSet {
    /// Build the tag set from a declaration's leading trivia.
    ///
    /// Only single-line documentation comments are considered. A block that
    /// is not well-formed markup is an error.
    pub fn parse(trivia: &[Trivia]) -> Result<Self, MalformedComment> {
        let lines: Vec<String> = trivia
            .iter()
            .filter(|t| t.kind == TriviaKind::DocComment)
            .map(|t| RE_DOC_MARKER.replace(&t.text, "").trim().to_string())
            .collect();

        if lines.is_empty() {
            return Ok(Self::default());
        }
        Self::from_markup(&lines.join("\n"))
    }

    fn from_markup(markup: &str) -> Result<Self, MalformedComment> {
        let xml = format!("<doc>\n{}\n</doc>", markup);
        let document = roxmltree::Document::parse(&xml)?;

        let mut set = Self::default();
        for node in document
            .root_element()
            .descendants()
            .skip(1)
            .filter(|n| n.is_element())
        {
            let tag = node.tag_name().name();
            let text = inner_text(node);

            match node.attribute("name") {
                Some(name) => {
                    set.items
                        .entry(tag.to_string())
                        .or_default()
                        .insert(name.to_string(), text.clone());
                }
                None if tag == "param" || tag == "typeparam" => {
                    tracing::debug!(tag, "ignoring documentation tag without a name");
                }
                None => {}
            }
            set.tags.entry(tag.to_string()).or_insert(text);
        }
        Ok(set)
    }

    /// Text of the first `<name>` element, or `""`.
    pub fn tag(&self, name: &str) -> &str {
        self.tags.get(name).map(String::as_str).unwrap_or("")
    }

    /// Text of the `<tag name="...">` element for `name`, or `""`.
    pub fn item(&self, tag: &str, name: &str) -> &str {
        self.items
            .get(tag)
            .and_then(|items| items.get(name))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn param(&self, name: &str) -> &str {
        self.item("param", name)
    }

    pub fn type_param(&self, name: &str) -> &str {
        self.item("typeparam", name)
    }
}

/// Concatenated text of all descendant text nodes, trimmed.
fn inner_text(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(lines: &[&str]) -> Vec<Trivia> {
        let mut trivia = Vec::new();
        for line in lines {
            trivia.push(Trivia {
                kind: TriviaKind::Whitespace,
                text: "    ".to_string(),
            });
            trivia.push(Trivia {
                kind: TriviaKind::DocComment,
                text: line.to_string(),
            });
            trivia.push(Trivia {
                kind: TriviaKind::EndOfLine,
                text: "\n".to_string(),
            });
        }
        trivia
    }

    #[test]
    fn no_comment_gives_empty_tags() {
        let tags = CommentTagSet::parse(&[]).unwrap();
        assert_eq!(tags.tag("summary"), "");
        assert_eq!(tags.tag("returns"), "");
        assert_eq!(tags.param("x"), "");
    }

    #[test]
    fn summary_spanning_lines() {
        let tags = CommentTagSet::parse(&doc(&[
            "/// <summary>",
            "///   Adds two numbers.",
            "/// </summary>",
        ]))
        .unwrap();
        assert_eq!(tags.tag("summary"), "Adds two numbers.");
    }

    #[test]
    fn first_occurrence_wins_for_plain_tags() {
        let tags = CommentTagSet::parse(&doc(&[
            "/// <summary>first</summary>",
            "/// <summary>second</summary>",
        ]))
        .unwrap();
        assert_eq!(tags.tag("summary"), "first");
    }

    #[test]
    fn named_items_last_wins() {
        let tags = CommentTagSet::parse(&doc(&[
            "/// <param name=\"a\">old</param>",
            "/// <param name=\"b\">second</param>",
            "/// <param name=\"a\">new</param>",
            "/// <typeparam name=\"T\">element type</typeparam>",
        ]))
        .unwrap();
        assert_eq!(tags.param("a"), "new");
        assert_eq!(tags.param("b"), "second");
        assert_eq!(tags.param("c"), "");
        assert_eq!(tags.type_param("T"), "element type");
    }

    #[test]
    fn inner_text_skips_markup() {
        let tags = CommentTagSet::parse(&doc(&[
            "/// <returns>the <c>sum</c> of both &amp; more</returns>",
        ]))
        .unwrap();
        assert_eq!(tags.tag("returns"), "the sum of both & more");
    }

    #[test]
    fn plain_comments_are_ignored() {
        let mut trivia = doc(&["/// <summary>kept</summary>"]);
        trivia.push(Trivia {
            kind: TriviaKind::LineComment,
            text: "// <summary>dropped".to_string(),
        });
        let tags = CommentTagSet::parse(&trivia).unwrap();
        assert_eq!(tags.tag("summary"), "kept");
    }

    #[test]
    fn param_without_name_is_skipped() {
        let tags = CommentTagSet::parse(&doc(&["/// <param>orphan</param>"])).unwrap();
        assert_eq!(tags.param(""), "");
    }

    #[test]
    fn malformed_markup_is_an_error() {
        let result = CommentTagSet::parse(&doc(&["/// <summary>unclosed"]));
        assert!(result.is_err());
    }
}
