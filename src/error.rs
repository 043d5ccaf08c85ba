//! Errors raised while documenting a source unit.

use crate::model::DeclKind;
use thiserror::Error;

/// A documentation comment block that is not well-formed markup.
#[derive(Error, Debug)]
#[error("malformed documentation comment: {0}")]
pub struct MalformedComment(#[from] pub roxmltree::Error);

#[derive(Error, Debug)]
pub enum DocError {
    #[error("no namespace declaration found")]
    MissingNamespace,
    #[error("{kind} `{name}`: {error}")]
    MalformedComment {
        kind: DeclKind,
        name: String,
        error: MalformedComment,
    },
}
