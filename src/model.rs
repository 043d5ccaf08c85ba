//! Format-agnostic records handed from the walker to a renderer.

use std::fmt;

/// Declaration categories the walker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Interface,
    Struct,
    Constructor,
    Method,
}

impl DeclKind {
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
            DeclKind::Struct => "struct",
            DeclKind::Constructor => "constructor",
            DeclKind::Method => "method",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Everything a renderer needs to document one declaration.
///
/// Text fields are empty strings when the source has nothing to say, never
/// missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub kind: DeclKind,
    pub name: String,
    /// One-line signature without the body.
    pub snippet: String,
    /// `<summary>` text
    pub summary: String,
    /// `<returns>` text (methods only)
    pub returns: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub type_parameters: Vec<TypeParameterDescriptor>,
}

impl DeclarationRecord {
    pub fn new(kind: DeclKind, name: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            snippet: snippet.into(),
            summary: String::new(),
            returns: String::new(),
            parameters: Vec::new(),
            type_parameters: Vec::new(),
        }
    }
}

/// A method or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    /// Parameter modifiers and type, e.g. `ref int`
    pub type_name: String,
    pub name: String,
    /// Default value literal, without the `=`
    pub default: Option<String>,
    /// `<param>` text
    pub description: String,
}

/// A generic type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParameterDescriptor {
    pub name: String,
    /// `<typeparam>` text
    pub description: String,
}

/// A property row: identifier and its attached plain comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub name: String,
    pub comment: String,
}

/// Member categories inside a class or interface page, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Properties,
    Structs,
    Constructors,
    Methods,
}

impl Section {
    pub fn title(self) -> &'static str {
        match self {
            Section::Properties => "Properties",
            Section::Structs => "Structs",
            Section::Constructors => "Constructors",
            Section::Methods => "Methods",
        }
    }
}
