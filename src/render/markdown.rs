//! GitHub-flavored markdown renderer.
//!
//! Page layout:
//!
//! ```text
//! **Namespace:** Acme.Tools
//!
//! # class `Counter`
//! ```csharp
//! public class Counter
//! ```
//!
//! Summary text
//!
//! **Navigate**
//! - [Methods](#methods)
//!
//! ## Methods
//! ### method `Add`
//! ...
//! ---
//! ```

use crate::model::*;
use crate::render::Renderer;
use crate::toc;

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn file_extension(&self) -> &str {
        "md"
    }

    fn namespace(&self, name: &str) -> String {
        format!("**Namespace:** {}\n\n", name)
    }

    fn class(&self, decl: &DeclarationRecord) -> String {
        render_type(decl, 1)
    }

    fn interface(&self, decl: &DeclarationRecord) -> String {
        render_type(decl, 1)
    }

    fn structure(&self, decl: &DeclarationRecord) -> String {
        render_type(decl, 3)
    }

    fn method(&self, decl: &DeclarationRecord, level: usize) -> String {
        let mut out = render_type(decl, level);

        if !decl.returns.is_empty() {
            out.push_str(&format!("**Returns:** {}\n\n", decl.returns));
        }

        if !decl.type_parameters.is_empty() {
            out.push_str("Type Parameter|Description\n---|---\n");
            for tp in &decl.type_parameters {
                out.push_str(&format!("**`{}`** |", tp.name));
                push_cell(&mut out, &tp.description);
            }
            out.push('\n');
        }

        if !decl.parameters.is_empty() {
            out.push_str("Parameter|Description\n---|---\n");
            for param in &decl.parameters {
                out.push_str(&format!("{} **`{}`**", cell(&param.type_name), param.name));
                if let Some(ref default) = param.default {
                    out.push_str(&format!(" = `{}`", cell(default)));
                }
                out.push_str(" |");
                push_cell(&mut out, &param.description);
            }
            out.push('\n');
        }

        out
    }

    fn properties(&self, properties: &[PropertyRecord]) -> String {
        let mut out = String::from("|Property|Description|\n|---|---|\n");
        for prop in properties {
            out.push_str(&format!("|{}|{}|\n", prop.name, cell(&prop.comment)));
        }
        out.push('\n');
        out
    }

    fn navigation(&self, sections: &[Section]) -> String {
        let mut out = String::from("**Navigate**\n");
        for section in sections {
            out.push_str(&toc::render_toc_item(section.title()));
            out.push('\n');
        }
        out.push('\n');
        out
    }

    fn section(&self, section: Section) -> String {
        format!("## {}\n", section.title())
    }

    fn separator(&self) -> String {
        "---\n\n".to_string()
    }

    fn diagnostic(&self, kind: DeclKind, name: &str, message: &str) -> String {
        format!(
            "> **Warning:** {} `{}` could not be documented: {}\n\n",
            kind,
            name,
            cell(message)
        )
    }
}

/// Heading, fenced signature and summary paragraph.
fn render_type(decl: &DeclarationRecord, level: usize) -> String {
    let mut out = format!("{} {} `{}`\n", "#".repeat(level), decl.kind, decl.name);
    out.push_str("```csharp\n");
    out.push_str(&decl.snippet);
    out.push_str("\n```\n\n");
    if !decl.summary.is_empty() {
        out.push_str(&decl.summary);
        out.push_str("\n\n");
    }
    out
}

/// Description column of a table row, then the line break.
fn push_cell(out: &mut String, text: &str) {
    if !text.is_empty() {
        out.push(' ');
        out.push_str(&cell(text));
    }
    out.push('\n');
}

/// Keep table cells on one line and out of the column syntax.
fn cell(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace('\n', " ")
        .replace('|', "\\|")
}
