//! Renderer module: trait-based format dispatch.
//!
//! The walker decides what is documented and in which order; a renderer only
//! turns each piece into a fragment of the output page.

pub mod html;
pub mod markdown;

use crate::model::{DeclKind, DeclarationRecord, PropertyRecord, Section};
use anyhow::{anyhow, Result};

/// Output format plug-in. Every method returns a page fragment.
pub trait Renderer {
    fn file_extension(&self) -> &str;

    /// Page prologue, before the namespace line.
    fn begin(&self, _namespace: &str) -> String {
        String::new()
    }

    /// Page epilogue, after the last declaration.
    fn end(&self) -> String {
        String::new()
    }

    fn namespace(&self, name: &str) -> String;
    fn class(&self, decl: &DeclarationRecord) -> String;
    fn interface(&self, decl: &DeclarationRecord) -> String;
    fn structure(&self, decl: &DeclarationRecord) -> String;

    /// Method or constructor with a heading at the given nesting `level`.
    fn method(&self, decl: &DeclarationRecord, level: usize) -> String;

    fn properties(&self, properties: &[PropertyRecord]) -> String;

    /// Links to the sections present on a class or interface page.
    fn navigation(&self, sections: &[Section]) -> String;
    fn section(&self, section: Section) -> String;
    fn separator(&self) -> String;

    /// Placeholder for a declaration whose comment could not be read.
    fn diagnostic(&self, kind: DeclKind, name: &str, message: &str) -> String;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "html" => Ok(Box::new(html::HtmlRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or html", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("markdown").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("html").unwrap().file_extension(), "html");
    }

    #[test]
    fn unknown_format() {
        let err = create_renderer("json").err().unwrap();
        assert!(err.to_string().contains("unknown format: json"));
    }
}
