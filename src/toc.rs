//! GitHub-flavored markdown anchor/slug generation for in-page navigation.

/// Markdown link to a heading on the same page.
pub fn render_toc_link(text: &str) -> String {
    format!("[{}](#{})", text, github_slug(text))
}

/// Navigation list item.
pub fn render_toc_item(title: &str) -> String {
    format!("- {}", render_toc_link(title))
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_section_titles() {
        assert_eq!(github_slug("Constructors"), "constructors");
        assert_eq!(github_slug("Methods"), "methods");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(github_slug("class `Foo<T>`"), "class-foot");
        assert_eq!(github_slug("Acme.Tools"), "acmetools");
    }

    #[test]
    fn toc_item() {
        assert_eq!(render_toc_item("Structs"), "- [Structs](#structs)");
    }
}
