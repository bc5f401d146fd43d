//! Structural syntax tree used for the formatting equivalence check.
//!
//! The tree deliberately stores no line numbers and no comments: two parses
//! compare equal exactly when they carry the same token content in the same
//! structure, regardless of layout or comment placement.

use tarmac_common::token::Punct;

/// One node of a parsed form: a leaf token or a balanced bracket group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Punct(Punct),
    Atom(String),
    Var(String),
    Integer(String),
    Str(String),
    /// A balanced bracket span with its contents.
    Group { open: Punct, items: Vec<Term> },
}

/// A period-terminated top-level form. The terminating period itself is a
/// form boundary and is not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub terms: Vec<Term>,
}
