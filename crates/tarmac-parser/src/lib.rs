//! Tarmac parser: structural form parser for the equivalence check.
//!
//! This crate turns the token stream into a tree of period-terminated
//! forms with brackets matched into nested groups. It exists for one
//! purpose: the formatter's safety gate parses the input and the produced
//! output and requires the two trees to be equal. Because the tree drops
//! comments and line numbers, comment moves never fail the gate, while any
//! dropped, duplicated or reordered token does.

pub mod ast;
pub mod error;

use ast::{Form, Term};
use error::{ParseError, ParseErrorKind};
use tarmac_common::token::{Punct, Token, TokenKind};

/// Parse a token stream into period-terminated forms.
pub fn parse(tokens: &[Token]) -> Result<Vec<Form>, ParseError> {
    let mut forms: Vec<Form> = Vec::new();
    // Each entry is an open bracket with the items collected before it.
    let mut open_stack: Vec<(Punct, u32, Vec<Term>)> = Vec::new();
    let mut current: Vec<Term> = Vec::new();
    let mut last_line = 1;

    for tok in tokens {
        last_line = tok.line;
        let term = match &tok.kind {
            TokenKind::Comment(_) => continue,
            TokenKind::Atom(s) => Term::Atom(s.clone()),
            TokenKind::Var(s) => Term::Var(s.clone()),
            TokenKind::Integer(s) => Term::Integer(s.clone()),
            TokenKind::Str(s) => Term::Str(s.clone()),
            TokenKind::Punct(p) if p.is_opener() => {
                open_stack.push((*p, tok.line, std::mem::take(&mut current)));
                continue;
            }
            TokenKind::Punct(p) if p.is_closer() => {
                let Some((open, _line, outer)) = open_stack.pop() else {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedCloser(p.as_str().to_string()),
                        tok.line,
                    ));
                };
                if open.closer() != Some(*p) {
                    return Err(ParseError::new(
                        ParseErrorKind::MismatchedCloser {
                            expected: open.closer().map_or("", Punct::as_str).to_string(),
                            found: p.as_str().to_string(),
                        },
                        tok.line,
                    ));
                }
                let items = std::mem::replace(&mut current, outer);
                Term::Group { open, items }
            }
            TokenKind::Punct(Punct::Dot) if open_stack.is_empty() => {
                forms.push(Form {
                    terms: std::mem::take(&mut current),
                });
                continue;
            }
            TokenKind::Punct(p) => Term::Punct(*p),
        };
        current.push(term);
    }

    if let Some((open, line, _)) = open_stack.last() {
        return Err(ParseError::new(
            ParseErrorKind::UnclosedDelimiter(open.as_str().to_string()),
            *line,
        ));
    }
    if !current.is_empty() {
        return Err(ParseError::new(ParseErrorKind::UnterminatedForm, last_line));
    }
    Ok(forms)
}

/// Whether two parses carry the same token content.
///
/// Structural equality is the whole relation: the tree stores neither
/// positions nor comments.
pub fn equivalent(a: &[Form], b: &[Form]) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarmac_common::token::Punct;

    fn parse_source(source: &str) -> Result<Vec<Form>, ParseError> {
        // The lexer crate is not a dependency here; build tokens by hand in
        // these tests to keep the parser self-contained.
        let mut tokens = Vec::new();
        let mut line = 1;
        for word in source.split_whitespace() {
            let kind = match word {
                "(" => TokenKind::Punct(Punct::LParen),
                ")" => TokenKind::Punct(Punct::RParen),
                "[" => TokenKind::Punct(Punct::LBracket),
                "]" => TokenKind::Punct(Punct::RBracket),
                "{" => TokenKind::Punct(Punct::LBrace),
                "}" => TokenKind::Punct(Punct::RBrace),
                "." => TokenKind::Punct(Punct::Dot),
                "," => TokenKind::Punct(Punct::Comma),
                "->" => TokenKind::Punct(Punct::Arrow),
                "\\n" => {
                    line += 1;
                    continue;
                }
                w if w.starts_with('%') => TokenKind::Comment(w.to_string()),
                w if w.starts_with(|c: char| c.is_ascii_uppercase()) => {
                    TokenKind::Var(w.to_string())
                }
                w if w.chars().all(|c| c.is_ascii_digit()) => TokenKind::Integer(w.to_string()),
                w => TokenKind::Atom(w.to_string()),
            };
            tokens.push(Token::new(kind, line));
        }
        parse(&tokens)
    }

    #[test]
    fn splits_forms_at_periods() {
        let forms = parse_source("a . b .").expect("parses");
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].terms, vec![Term::Atom("a".to_string())]);
        assert_eq!(forms[1].terms, vec![Term::Atom("b".to_string())]);
    }

    #[test]
    fn brackets_nest() {
        let forms = parse_source("foo ( X , [ 1 ] ) .").expect("parses");
        assert_eq!(forms.len(), 1);
        assert_eq!(
            forms[0].terms,
            vec![
                Term::Atom("foo".to_string()),
                Term::Group {
                    open: Punct::LParen,
                    items: vec![
                        Term::Var("X".to_string()),
                        Term::Punct(Punct::Comma),
                        Term::Group {
                            open: Punct::LBracket,
                            items: vec![Term::Integer("1".to_string())],
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn comments_do_not_affect_the_parse() {
        let with = parse_source("%note \\n foo ( ) -> ok .").expect("parses");
        let without = parse_source("foo ( ) -> %trailing \\n ok .").expect("parses");
        assert!(equivalent(&with, &without));
    }

    #[test]
    fn layout_does_not_affect_the_parse() {
        let one = parse_source("foo ( X ) -> X .").expect("parses");
        let two = parse_source("foo ( \\n X \\n ) \\n -> \\n X .").expect("parses");
        assert!(equivalent(&one, &two));
    }

    #[test]
    fn different_token_content_is_distinguished() {
        let one = parse_source("foo ( X ) -> X .").expect("parses");
        let two = parse_source("foo ( Y ) -> Y .").expect("parses");
        assert!(!equivalent(&one, &two));
    }

    #[test]
    fn unclosed_delimiter_is_an_error() {
        let err = parse_source("foo ( X .").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnclosedDelimiter("(".to_string()));
    }

    #[test]
    fn unexpected_closer_is_an_error() {
        let err = parse_source("foo ) .").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedCloser(")".to_string()));
    }

    #[test]
    fn mismatched_closer_is_an_error() {
        let err = parse_source("( X ] .").unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::MismatchedCloser {
                expected: ")".to_string(),
                found: "]".to_string(),
            }
        );
    }

    #[test]
    fn trailing_tokens_are_an_error() {
        let err = parse_source("a . b").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedForm);
    }

    #[test]
    fn dot_inside_brackets_is_plain_content() {
        let forms = parse_source("( a . b ) .").expect("parses");
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn empty_input_is_no_forms() {
        assert_eq!(parse_source("").expect("parses"), Vec::<Form>::new());
    }
}
