//! Tolerant recursive-descent reader for C# declarations.
//!
//! Recognises namespaces, type declarations and the headers of their
//! members. Everything else is skipped as balanced token groups, so the
//! reader never fails and always makes progress.

use super::lexer::{tokenize, Token, TokenKind};
use super::{NodeData, NodeId, NodeKind, SyntaxTree};

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "abstract",
    "sealed",
    "virtual",
    "override",
    "readonly",
    "extern",
    "unsafe",
    "new",
    "async",
    "partial",
    "const",
    "volatile",
    "required",
    "fixed",
    "file",
];

const PARAMETER_MODIFIERS: &[&str] = &["this", "ref", "out", "in", "params", "scoped", "readonly"];

/// Parse C# source text into a declaration tree.
pub fn parse(source: &str) -> SyntaxTree {
    let mut parser = Parser::new(tokenize(source));
    let root = parser.start(NodeKind::CompilationUnit);
    parser.members(None, false);
    parser.finish(root);
    parser.into_tree()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    nodes: Vec<NodeData>,
    open: Vec<NodeId>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            nodes: Vec::new(),
            open: Vec::new(),
        }
    }

    fn into_tree(self) -> SyntaxTree {
        SyntaxTree {
            tokens: self.tokens,
            nodes: self.nodes,
        }
    }

    // -- Node building --------------------------------------------------------

    fn start(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent = self.open.last().copied();
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            tokens: self.pos..self.pos,
            identifier: None,
            modifiers: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        self.open.push(id);
        id
    }

    fn finish(&mut self, id: NodeId) {
        let closed = self.open.pop();
        debug_assert_eq!(closed, Some(id));
        self.nodes[id.0].tokens.end = self.pos;
    }

    fn set_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.0].kind = kind;
    }

    /// Record the current token as the node's name and step over it.
    fn name(&mut self, id: NodeId) {
        self.nodes[id.0].identifier = Some(self.pos);
        self.bump();
    }

    // -- Token access ---------------------------------------------------------

    fn nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n)
    }

    fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.nth(n).map(|token| token.kind)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.nth_kind(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn nth_is_word(&self, n: usize, word: &str) -> bool {
        self.nth(n)
            .is_some_and(|token| token.kind == TokenKind::Ident && token.text == word)
    }

    fn at_word(&self, word: &str) -> bool {
        self.nth_is_word(0, word)
    }

    fn at_punct(&self, punct: &str) -> bool {
        self.nth(0)
            .is_some_and(|token| token.kind == TokenKind::Punct && token.text == punct)
    }

    fn word(&self) -> Option<&str> {
        self.nth(0)
            .filter(|token| token.kind == TokenKind::Ident)
            .map(|token| token.text.as_str())
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    // -- Skipping -------------------------------------------------------------

    /// Step over one token, or over a whole bracketed group when at an opener.
    fn skip_balanced(&mut self) {
        match self.peek_kind() {
            Some(kind) if is_open(kind) => {}
            _ => {
                self.bump();
                return;
            }
        }
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            if is_open(kind) {
                depth += 1;
            } else if is_close(kind) {
                depth = depth.saturating_sub(1);
            }
            self.bump();
            if depth == 0 {
                break;
            }
        }
    }

    /// Skip `<...>`, counting nested angle brackets.
    fn skip_angle(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth = depth.saturating_sub(1),
                TokenKind::LParen | TokenKind::LBracket => {
                    self.skip_balanced();
                    continue;
                }
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semi => return,
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    /// Skip tokens at nesting depth zero until `stop` matches or a closing
    /// bracket of the surrounding group is reached.
    fn skip_until(&mut self, stop: impl Fn(&Token) -> bool) {
        while let Some(token) = self.nth(0) {
            if stop(token) || is_close(token.kind) {
                break;
            }
            if is_open(token.kind) {
                self.skip_balanced();
            } else {
                self.bump();
            }
        }
    }

    fn skip_statement(&mut self) {
        self.skip_until(|token| token.kind == TokenKind::Semi);
        self.eat(TokenKind::Semi);
    }

    /// Skip the rest of a member this reader does not model.
    fn skip_member_rest(&mut self) {
        loop {
            match self.peek_kind() {
                None | Some(TokenKind::RBrace) => return,
                Some(TokenKind::Semi) => {
                    self.bump();
                    return;
                }
                Some(TokenKind::LBrace) => {
                    self.skip_balanced();
                    self.eat(TokenKind::Semi);
                    return;
                }
                Some(_) => self.skip_balanced(),
            }
        }
    }

    // -- Declarations ---------------------------------------------------------

    /// Parse members until end of input, or until the closing brace of the
    /// current scope when `braced`.
    fn members(&mut self, enclosing: Option<&str>, braced: bool) {
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RBrace) if braced => break,
                Some(TokenKind::RBrace | TokenKind::Semi) => {
                    self.bump();
                    continue;
                }
                Some(TokenKind::LBrace) => {
                    self.skip_balanced();
                    continue;
                }
                _ => {}
            }
            let before = self.pos;
            self.member(enclosing);
            if self.pos == before {
                self.bump();
            }
        }
    }

    fn member(&mut self, enclosing: Option<&str>) {
        if self.at_word("using")
            || (self.at_word("global") && self.nth_is_word(1, "using"))
            || (self.at_word("extern") && self.nth_is_word(1, "alias"))
        {
            self.skip_statement();
            return;
        }

        // Assembly and module attributes stand on their own.
        if self.at(TokenKind::LBracket)
            && (self.nth_is_word(1, "assembly") || self.nth_is_word(1, "module"))
            && self.nth_kind(2) == Some(TokenKind::Colon)
        {
            let node = self.start(NodeKind::Member);
            self.attribute_list();
            self.finish(node);
            return;
        }

        let node = self.start(NodeKind::Member);
        while self.at(TokenKind::LBracket) {
            self.attribute_list();
        }
        self.modifiers(node);

        let word = self.word().map(str::to_string);
        match word.as_deref() {
            Some("namespace") => self.namespace(node),
            Some("class") => self.type_declaration(node, NodeKind::Class),
            Some("interface") => self.type_declaration(node, NodeKind::Interface),
            Some("struct") => self.type_declaration(node, NodeKind::Struct),
            Some("enum") => self.type_declaration(node, NodeKind::Enum),
            Some("record") => self.type_declaration(node, NodeKind::Record),
            Some("delegate") => self.skip_statement(),
            Some("event" | "implicit" | "explicit") => self.skip_member_rest(),
            Some(name)
                if Some(name) == enclosing && self.nth_kind(1) == Some(TokenKind::LParen) =>
            {
                self.constructor(node)
            }
            Some(_) => self.typed_member(node),
            None if self.at_punct("~") => self.skip_member_rest(),
            None => {}
        }

        self.finish(node);
    }

    fn modifiers(&mut self, node: NodeId) {
        while let Some(word) = self.word() {
            let is_modifier = MODIFIERS.contains(&word)
                || (word == "ref" && (self.nth_is_word(1, "struct") || self.nth_is_word(1, "partial")));
            if !is_modifier {
                break;
            }
            self.nodes[node.0].modifiers.push(self.pos);
            self.bump();
        }
    }

    fn attribute_list(&mut self) {
        let node = self.start(NodeKind::AttributeList);
        self.skip_balanced();
        self.finish(node);
    }

    fn namespace(&mut self, node: NodeId) {
        self.set_kind(node, NodeKind::Namespace);
        self.bump();

        let name = self.start(NodeKind::Name);
        while self.at(TokenKind::Ident) {
            self.bump();
            if !self.eat(TokenKind::Dot) {
                break;
            }
        }
        self.finish(name);

        if self.eat(TokenKind::LBrace) {
            self.members(None, true);
            self.eat(TokenKind::RBrace);
        } else if self.eat(TokenKind::Semi) {
            // File-scoped namespace: everything up to the end of input.
            self.members(None, false);
        }
    }

    fn type_declaration(&mut self, node: NodeId, kind: NodeKind) {
        self.set_kind(node, kind);
        self.bump();
        if kind == NodeKind::Record && !self.eat_word("class") {
            self.eat_word("struct");
        }

        if self.at(TokenKind::Ident) {
            self.name(node);
        }
        if self.at(TokenKind::Lt) {
            self.type_parameter_list();
        }
        if self.at(TokenKind::LParen) {
            self.parameter_list();
        }
        if self.at(TokenKind::Colon) {
            self.base_list();
        }
        while self.at_word("where") {
            self.constraint_clause();
        }

        if kind == NodeKind::Enum {
            if self.at(TokenKind::LBrace) {
                self.skip_balanced();
            }
        } else if self.eat(TokenKind::LBrace) {
            let name = self.nodes[node.0]
                .identifier
                .map(|index| self.tokens[index].text.clone());
            self.members(name.as_deref(), true);
            self.eat(TokenKind::RBrace);
        }
        self.eat(TokenKind::Semi);
    }

    fn base_list(&mut self) {
        let node = self.start(NodeKind::BaseList);
        self.bump();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::LBrace | TokenKind::Semi => break,
                TokenKind::Ident if self.at_word("where") => break,
                TokenKind::Lt => self.skip_angle(),
                kind if is_close(kind) => break,
                _ => self.skip_balanced(),
            }
        }
        self.finish(node);
    }

    fn constraint_clause(&mut self) {
        let node = self.start(NodeKind::ConstraintClause);
        self.bump();
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::LBrace | TokenKind::Semi | TokenKind::FatArrow => break,
                TokenKind::Ident if self.at_word("where") => break,
                TokenKind::Lt => self.skip_angle(),
                kind if is_close(kind) => break,
                _ => self.skip_balanced(),
            }
        }
        self.finish(node);
    }

    fn type_parameter_list(&mut self) {
        let list = self.start(NodeKind::TypeParameterList);
        self.bump();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::Gt) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Comma) => self.bump(),
                Some(TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semi) => break,
                Some(_) => {
                    let before = self.pos;
                    let param = self.start(NodeKind::TypeParameter);
                    while self.at(TokenKind::LBracket) {
                        self.attribute_list();
                    }
                    if !self.eat_word("in") {
                        self.eat_word("out");
                    }
                    if self.at(TokenKind::Ident) {
                        self.name(param);
                    }
                    self.finish(param);
                    if self.pos == before {
                        self.bump();
                    }
                }
            }
        }
        self.finish(list);
    }

    fn parameter_list(&mut self) {
        let list = self.start(NodeKind::ParameterList);
        self.bump();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::RParen) => {
                    self.bump();
                    break;
                }
                Some(TokenKind::Comma) => self.bump(),
                Some(kind) if is_close(kind) => break,
                Some(_) => {
                    let before = self.pos;
                    self.parameter();
                    if self.pos == before {
                        self.bump();
                    }
                }
            }
        }
        self.finish(list);
    }

    fn parameter(&mut self) {
        let node = self.start(NodeKind::Parameter);
        while self.at(TokenKind::LBracket) {
            self.attribute_list();
        }
        while let Some(word) = self.word() {
            if !PARAMETER_MODIFIERS.contains(&word) {
                break;
            }
            self.nodes[node.0].modifiers.push(self.pos);
            self.bump();
        }
        self.parse_type();
        if self.at(TokenKind::Ident) {
            self.name(node);
        }
        if self.eat(TokenKind::Eq) {
            let value = self.start(NodeKind::DefaultValue);
            self.default_value();
            self.finish(value);
        }
        self.skip_until(|token| token.kind == TokenKind::Comma);
        self.finish(node);
    }

    /// Skip a default value expression up to the next parameter. Commas inside
    /// type argument lists (`new S<int, int>()`) do not end it.
    fn default_value(&mut self) {
        while let Some(kind) = self.peek_kind() {
            match kind {
                TokenKind::Comma => break,
                kind if is_close(kind) => break,
                kind if is_open(kind) => self.skip_balanced(),
                TokenKind::Lt => match self.type_arguments_end(self.pos) {
                    Some(end) => self.pos = end,
                    None => self.bump(),
                },
                _ => self.bump(),
            }
        }
    }

    /// Index just past the `<...>` starting at `start`, when everything
    /// inside can only be type arguments. `None` for a less-than comparison.
    fn type_arguments_end(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (k, token) in self.tokens.iter().enumerate().skip(start) {
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(k + 1);
                    }
                }
                TokenKind::Ident
                | TokenKind::Comma
                | TokenKind::Dot
                | TokenKind::Question
                | TokenKind::LBracket
                | TokenKind::RBracket => {}
                _ => return None,
            }
        }
        None
    }

    /// Parse a type reference. Does nothing when no type starts here.
    fn parse_type(&mut self) {
        if !(self.at(TokenKind::Ident) || self.at(TokenKind::LParen)) {
            return;
        }
        let node = self.start(NodeKind::Type);

        if self.eat_word("ref") {
            self.eat_word("readonly");
        }
        if self.at(TokenKind::LParen) {
            self.skip_balanced();
        } else if self.at(TokenKind::Ident) {
            self.bump();
            loop {
                if self.at(TokenKind::Lt) {
                    self.skip_angle();
                }
                // `A.B` and `global::A`
                let separator = match (self.nth_kind(0), self.nth_kind(1), self.nth_kind(2)) {
                    (Some(TokenKind::Dot), Some(TokenKind::Ident), _) => 1,
                    (Some(TokenKind::Colon), Some(TokenKind::Colon), Some(TokenKind::Ident)) => 2,
                    _ => break,
                };
                self.pos += separator + 1;
            }
        }

        loop {
            if self.at(TokenKind::Question) || self.at_punct("*") {
                self.bump();
            } else if self.at(TokenKind::LBracket)
                && matches!(
                    self.nth_kind(1),
                    Some(TokenKind::RBracket | TokenKind::Comma)
                )
            {
                self.skip_balanced();
            } else {
                break;
            }
        }
        self.finish(node);
    }

    /// Members that start with a type: methods, properties and fields.
    fn typed_member(&mut self, node: NodeId) {
        self.parse_type();

        if self.at_word("operator") || self.at_word("this") || !self.at(TokenKind::Ident) {
            self.skip_member_rest();
            return;
        }

        self.explicit_interface();
        if !self.at(TokenKind::Ident) {
            self.skip_member_rest();
            return;
        }
        if self.at_word("operator") || self.at_word("this") {
            self.skip_member_rest();
            return;
        }
        self.name(node);

        match self.peek_kind() {
            Some(TokenKind::Lt | TokenKind::LParen) => self.method(node),
            Some(TokenKind::LBrace | TokenKind::FatArrow) => self.property(node),
            _ => self.skip_member_rest(),
        }
    }

    /// `IFoo.` / `IFoo<T>.` prefixes in front of an explicitly implemented
    /// member name.
    fn explicit_interface(&mut self) {
        let mut k = self.pos;
        let mut end = None;
        loop {
            if self.tokens.get(k).map(|t| t.kind) != Some(TokenKind::Ident) {
                break;
            }
            k += 1;
            if self.tokens.get(k).map(|t| t.kind) == Some(TokenKind::Lt) {
                k = self.angle_end(k);
            }
            if self.tokens.get(k).map(|t| t.kind) == Some(TokenKind::Dot) {
                k += 1;
                end = Some(k);
            } else {
                break;
            }
        }
        if let Some(end) = end {
            let node = self.start(NodeKind::ExplicitInterface);
            self.pos = end;
            self.finish(node);
        }
    }

    /// Index just past the `>` matching the `<` at `start`.
    fn angle_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        let mut k = start;
        while let Some(token) = self.tokens.get(k) {
            match token.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return k + 1;
                    }
                }
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Semi => return k,
                _ => {}
            }
            k += 1;
        }
        k
    }

    fn method(&mut self, node: NodeId) {
        self.set_kind(node, NodeKind::Method);
        if self.at(TokenKind::Lt) {
            self.type_parameter_list();
        }
        if self.at(TokenKind::LParen) {
            self.parameter_list();
        }
        while self.at_word("where") {
            self.constraint_clause();
        }
        self.body();
    }

    fn constructor(&mut self, node: NodeId) {
        self.set_kind(node, NodeKind::Constructor);
        self.name(node);
        self.parameter_list();
        if self.at(TokenKind::Colon) {
            let init = self.start(NodeKind::ConstructorInitializer);
            self.bump();
            if !self.eat_word("base") {
                self.eat_word("this");
            }
            if self.at(TokenKind::LParen) {
                self.skip_balanced();
            }
            self.finish(init);
        }
        self.body();
    }

    fn property(&mut self, node: NodeId) {
        self.set_kind(node, NodeKind::Property);
        if self.at(TokenKind::LBrace) {
            let accessors = self.start(NodeKind::AccessorList);
            self.skip_balanced();
            self.finish(accessors);
            if self.at(TokenKind::Eq) {
                self.skip_statement();
            }
        } else {
            self.body();
        }
    }

    /// Block body, expression body, or a bare `;`.
    fn body(&mut self) {
        match self.peek_kind() {
            Some(TokenKind::LBrace) => {
                let block = self.start(NodeKind::Block);
                self.skip_balanced();
                self.finish(block);
            }
            Some(TokenKind::FatArrow) => {
                let arrow = self.start(NodeKind::ArrowBody);
                self.bump();
                self.skip_until(|token| token.kind == TokenKind::Semi);
                self.finish(arrow);
                self.eat(TokenKind::Semi);
            }
            _ => {
                self.eat(TokenKind::Semi);
            }
        }
    }
}

fn is_open(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket
    )
}

fn is_close(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket
    )
}
