//! Token stream with attached trivia.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // ========== Trivia ==========
    #[regex(r"[ \t\f]+")]
    Whitespace,
    #[regex(r"\r\n|\n|\r")]
    Newline,
    /// `//` and `///` comments; told apart in [`TokenKind::trivia`].
    #[regex(r"//[^\r\n]*")]
    LineComment,
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    BlockComment,
    #[regex(r"#[^\r\n]*")]
    Directive,

    // ========== Words and literals ==========
    /// Identifiers and keywords; the reader matches keywords by text.
    #[regex(r"@?[\p{L}_][\p{L}\p{N}_]*")]
    Ident,
    #[regex(r"[0-9][0-9A-Za-z_]*(\.[0-9][0-9A-Za-z_]*)?")]
    Number,
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r#"@"([^"]|"")*""#)]
    #[regex(r#"\$"([^"\\\r\n]|\\.)*""#)]
    #[regex(r#"(\$@|@\$)"([^"]|"")*""#)]
    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#)]
    String,
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    Char,

    // ========== Punctuation ==========
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("=>")]
    FatArrow,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,
    #[regex(r"[!%&*+\-/^|~\\]")]
    Punct,

    /// Anything the lexer does not recognise. Never produced by logos itself.
    Unknown,
}

impl TokenKind {
    /// Classify a trivia token, or `None` for significant tokens.
    fn trivia(self, text: &str) -> Option<TriviaKind> {
        match self {
            TokenKind::Whitespace => Some(TriviaKind::Whitespace),
            TokenKind::Newline => Some(TriviaKind::EndOfLine),
            TokenKind::LineComment if text.starts_with("///") && !text.starts_with("////") => {
                Some(TriviaKind::DocComment)
            }
            TokenKind::LineComment => Some(TriviaKind::LineComment),
            TokenKind::BlockComment => Some(TriviaKind::BlockComment),
            TokenKind::Directive => Some(TriviaKind::Directive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriviaKind {
    Whitespace,
    EndOfLine,
    /// Plain `//` comment.
    LineComment,
    /// Single-line documentation comment (`///`).
    DocComment,
    BlockComment,
    Directive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

/// A significant token and the trivia around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Trivia since the end of the previous token's line.
    pub leading: Vec<Trivia>,
    /// Trivia up to and including the end of this token's line.
    pub trailing: Vec<Trivia>,
}

/// Split `source` into significant tokens.
///
/// Trivia following a token on the same line (newline included) is trailing
/// trivia of that token; all other trivia leads the next token. Trivia after
/// the last token is dropped.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut pending: Vec<Trivia> = Vec::new();
    let mut trailing_open = false;

    let mut lex = TokenKind::lexer(source);
    while let Some(result) = lex.next() {
        let text = lex.slice();
        let kind = result.unwrap_or(TokenKind::Unknown);

        if let Some(trivia_kind) = kind.trivia(text) {
            let trivia = Trivia {
                kind: trivia_kind,
                text: text.to_string(),
            };
            match tokens.last_mut() {
                Some(last) if trailing_open => last.trailing.push(trivia),
                _ => pending.push(trivia),
            }
            if trivia_kind == TriviaKind::EndOfLine {
                trailing_open = false;
            }
            continue;
        }

        tokens.push(Token {
            kind,
            text: text.to_string(),
            leading: std::mem::take(&mut pending),
            trailing: Vec::new(),
        });
        trailing_open = true;
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn doc_comments_lead_the_next_token() {
        let tokens = tokenize("x;\n/// <summary>Hi</summary>\n// note\nclass");
        let class = tokens.last().unwrap();
        assert_eq!(class.text, "class");
        let kinds: Vec<TriviaKind> = class.leading.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TriviaKind::DocComment,
                TriviaKind::EndOfLine,
                TriviaKind::LineComment,
                TriviaKind::EndOfLine
            ]
        );
    }

    #[test]
    fn same_line_comment_trails_the_token() {
        let tokens = tokenize("a; // why\nb");
        assert_eq!(tokens[1].text, ";");
        assert!(tokens[1]
            .trailing
            .iter()
            .any(|t| t.kind == TriviaKind::LineComment && t.text == "// why"));
        assert!(tokens[2].leading.is_empty());
    }

    #[test]
    fn four_slashes_are_not_documentation() {
        let tokens = tokenize("//// old\nclass");
        assert_eq!(tokens[0].leading[0].kind, TriviaKind::LineComment);
    }

    #[test]
    fn strings_hide_braces() {
        assert_eq!(
            kinds(r#"{ "}" @"{" '}' }"#),
            vec![
                TokenKind::LBrace,
                TokenKind::String,
                TokenKind::String,
                TokenKind::Char,
                TokenKind::RBrace
            ]
        );
    }

    #[test]
    fn unknown_characters_do_not_stop_the_lexer() {
        assert_eq!(
            kinds("a ` b"),
            vec![TokenKind::Ident, TokenKind::Unknown, TokenKind::Ident]
        );
    }

    #[test]
    fn generic_closers_stay_separate() {
        assert_eq!(
            kinds("A<B<C>>"),
            vec![
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Lt,
                TokenKind::Ident,
                TokenKind::Gt,
                TokenKind::Gt
            ]
        );
    }
}
