//! HTML renderer: standalone HTML page with semantic markup.

use crate::model::*;
use crate::render::Renderer;
use crate::toc::github_slug;

pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn file_extension(&self) -> &str {
        "html"
    }

    fn begin(&self, namespace: &str) -> String {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str(&format!("<title>{}</title>\n", html_escape(namespace)));
        out.push_str("<style>\n");
        out.push_str("body { font-family: system-ui, sans-serif; max-width: 48em; margin: 2em auto; padding: 0 1em; }\n");
        out.push_str("code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }\n");
        out.push_str("pre { background: #f4f4f4; padding: 1em; border-radius: 5px; overflow-x: auto; }\n");
        out.push_str("table { border-collapse: collapse; }\n");
        out.push_str("th, td { border: 1px solid #ddd; padding: 0.3em 0.6em; text-align: left; }\n");
        out.push_str(".warning { border-left: 4px solid #d9822b; padding-left: 1em; }\n");
        out.push_str("</style>\n");
        out.push_str("</head>\n<body>\n");
        out
    }

    fn end(&self) -> String {
        "</body>\n</html>\n".to_string()
    }

    fn namespace(&self, name: &str) -> String {
        format!("<p><strong>Namespace:</strong> {}</p>\n", html_escape(name))
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
            out.push_str(&format!(
                "<p><strong>Returns:</strong> {}</p>\n",
                html_escape(&decl.returns)
            ));
        }

        if !decl.type_parameters.is_empty() {
            out.push_str("<table>\n<tr><th>Type Parameter</th><th>Description</th></tr>\n");
            for tp in &decl.type_parameters {
                out.push_str(&format!(
                    "<tr><td><code>{}</code></td><td>{}</td></tr>\n",
                    html_escape(&tp.name),
                    html_escape(&tp.description)
                ));
            }
            out.push_str("</table>\n");
        }

        if !decl.parameters.is_empty() {
            out.push_str("<table>\n<tr><th>Parameter</th><th>Description</th></tr>\n");
            for param in &decl.parameters {
                let mut term = format!(
                    "{} <code>{}</code>",
                    html_escape(&param.type_name),
                    html_escape(&param.name)
                );
                if let Some(ref default) = param.default {
                    term.push_str(&format!(" = <code>{}</code>", html_escape(default)));
                }
                out.push_str(&format!(
                    "<tr><td>{}</td><td>{}</td></tr>\n",
                    term,
                    html_escape(&param.description)
                ));
            }
            out.push_str("</table>\n");
        }

        out
    }

    fn properties(&self, properties: &[PropertyRecord]) -> String {
        let mut out = String::from("<table>\n<tr><th>Property</th><th>Description</th></tr>\n");
        for prop in properties {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(&prop.name),
                html_escape(&prop.comment)
            ));
        }
        out.push_str("</table>\n");
        out
    }

    fn navigation(&self, sections: &[Section]) -> String {
        let mut out = String::from("<nav>\n<strong>Navigate</strong>\n<ul>\n");
        for section in sections {
            out.push_str(&format!(
                "  <li><a href=\"#{}\">{}</a></li>\n",
                github_slug(section.title()),
                section.title()
            ));
        }
        out.push_str("</ul>\n</nav>\n");
        out
    }

    fn section(&self, section: Section) -> String {
        format!(
            "<h2 id=\"{}\">{}</h2>\n",
            github_slug(section.title()),
            section.title()
        )
    }

    fn separator(&self) -> String {
        "<hr>\n".to_string()
    }

    fn diagnostic(&self, kind: DeclKind, name: &str, message: &str) -> String {
        format!(
            "<p class=\"warning\"><strong>Warning:</strong> {} <code>{}</code> could not be documented: {}</p>\n",
            kind,
            html_escape(name),
            html_escape(message)
        )
    }
}

fn render_type(decl: &DeclarationRecord, level: usize) -> String {
    let mut out = format!(
        "<h{level}>{} <code>{}</code></h{level}>\n",
        decl.kind,
        html_escape(&decl.name),
        level = level.clamp(1, 6)
    );
    out.push_str(&format!(
        "<pre><code class=\"language-csharp\">{}</code></pre>\n",
        html_escape(&decl.snippet)
    ));
    if !decl.summary.is_empty() {
        out.push_str(&format!("<p>{}</p>\n", html_escape(&decl.summary)));
    }
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_frame() {
        let begin = HtmlRenderer.begin("Acme<Tools>");
        assert!(begin.starts_with("<!DOCTYPE html>"));
        assert!(begin.contains("<title>Acme&lt;Tools&gt;</title>"));
        assert!(HtmlRenderer.end().ends_with("</html>\n"));
    }

    #[test]
    fn generic_signature_is_escaped() {
        let decl = DeclarationRecord::new(DeclKind::Method, "Make", "public T Make<T>()");
        let out = HtmlRenderer.method(&decl, 3);
        assert!(out.starts_with("<h3>method <code>Make</code></h3>\n"));
        assert!(out.contains("public T Make&lt;T&gt;()"));
    }

    #[test]
    fn section_anchor_matches_navigation() {
        let nav = HtmlRenderer.navigation(&[Section::Constructors]);
        assert!(nav.contains("<a href=\"#constructors\">Constructors</a>"));
        assert_eq!(
            HtmlRenderer.section(Section::Constructors),
            "<h2 id=\"constructors\">Constructors</h2>\n"
        );
    }
}
