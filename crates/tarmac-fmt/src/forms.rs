//! Structural compiler: top-level forms to one layout document.
//!
//! The driver consumes the token stream form by form -- module attributes,
//! specs, functions built from `;`-chained clauses, top-level configuration
//! terms and comment blocks -- and joins the form documents with the
//! separation the previous-term state machine dictates.

use crate::doc::{self, Doc, INDENT};
use crate::expr::{self, EndTag};
use crate::scanner::{self, TokenStream};
use tarmac_common::token::{Punct, Token, TokenKind};

/// Category of the most recently emitted top-level form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrevTerm {
    NewFile,
    Attribute,
    Spec,
    List,
    Function,
    Comment,
}

/// Compile a whole token stream into one document.
pub fn file(tokens: Vec<Token>) -> Doc {
    let mut stream = TokenStream::new(tokens);
    let mut out = doc::nil();
    let mut prev = PrevTerm::NewFile;

    while let Some(kind) = stream.peek().map(|t| t.kind.clone()) {
        let (cat, form) = match kind {
            TokenKind::Comment(body) => {
                stream.next();
                (PrevTerm::Comment, doc::text(body))
            }
            TokenKind::Punct(Punct::Minus) => attribute_or_spec(&mut stream),
            TokenKind::Punct(p) if p.is_opener() => {
                (PrevTerm::List, config_term(&mut stream))
            }
            TokenKind::Atom(_) => (PrevTerm::Function, function(&mut stream)),
            _ => {
                // Unexpected top-level token: compile one expression
                // generically so the driver always makes progress.
                let (_end, _fb, d) = expr::expr(&mut stream);
                (PrevTerm::List, d)
            }
        };
        out = join_form(out, prev, cat, form);
        prev = cat;
    }
    out
}

/// Join the next form onto the file document with the separation the
/// previous-term state machine dictates: comment runs and spec-to-function
/// adjacency use a single newline, everything else a blank line.
fn join_form(out: Doc, prev: PrevTerm, current: PrevTerm, form: Doc) -> Doc {
    match (prev, current) {
        (PrevTerm::NewFile, _) => doc::cons(out, form),
        (PrevTerm::Comment, PrevTerm::Comment) => doc::newline(out, form),
        (PrevTerm::Comment, PrevTerm::Function) => doc::newline(out, form),
        (PrevTerm::Spec, PrevTerm::Function) => doc::newline(out, form),
        _ => doc::newlines(out, form),
    }
}

/// Compile a `-` form: a spec or an ordinary module attribute.
fn attribute_or_spec(stream: &mut TokenStream) -> (PrevTerm, Doc) {
    stream.next(); // the leading `-`

    let name = match stream.peek() {
        Some(t) if matches!(t.kind, TokenKind::Atom(_)) => {
            let t = stream.next();
            t.map(|t| t.text()).unwrap_or_default()
        }
        _ => return (PrevTerm::Attribute, doc::text("-")),
    };

    if name == "spec" {
        // The whole spec body may be wrapped in parentheses; strip them and
        // compile the remainder as a function-style head and body.
        if stream.peek().is_some_and(|t| t.is_punct(Punct::LParen)) {
            scanner::remove_matching(Punct::LParen, Punct::RParen, stream);
        }
        let (_end, fb, head_and_body) = clause(stream);
        let d = doc::group(doc::force_break(
            fb,
            doc::cons(doc::text("-spec "), head_and_body),
        ));
        return (PrevTerm::Spec, d);
    }

    if stream.peek().is_some_and(|t| t.is_punct(Punct::LParen)) {
        stream.next();
        let (inside, _closer) = scanner::get_until(Punct::LParen, Punct::RParen, stream);
        let (g_fb, g) = expr::brackets(Punct::LParen, Punct::RParen, &inside);
        let (t_fb, tail) = dot_tail(stream);
        let d = doc::group(doc::force_break(
            g_fb || t_fb,
            doc::concat(vec![doc::text("-"), doc::text(name), g, tail]),
        ));
        return (PrevTerm::Attribute, d);
    }

    if stream.peek().is_some_and(|t| t.is_punct(Punct::Dot)) {
        let (t_fb, tail) = dot_tail(stream);
        let d = doc::force_break(t_fb, doc::cons(doc::text(format!("-{name}")), tail));
        return (PrevTerm::Attribute, d);
    }

    // Attribute body without parentheses: free expressions to the period.
    let (_end, b_fb, body) = expr::exprs(stream);
    let d = doc::group(doc::force_break(
        b_fb,
        doc::cons(
            doc::text(format!("-{name}")),
            doc::nest(INDENT, doc::cons(doc::break_(" "), body)),
        ),
    ));
    (PrevTerm::Attribute, d)
}

/// Compile a function: clauses chained with `;`, ended by `.`.
/// Comments between clauses stay inside the function.
fn function(stream: &mut TokenStream) -> Doc {
    let mut clauses: Vec<Doc> = Vec::new();
    loop {
        let (end_tag, _fb, c) = clause(stream);
        if matches!(c, Doc::Nil) {
            break;
        }
        clauses.push(c);
        if end_tag != EndTag::Semi {
            break;
        }
        loop {
            let comment = stream.peek().filter(|t| t.is_comment()).map(|t| t.text());
            match comment {
                Some(text) => {
                    stream.next();
                    clauses.push(doc::text(text));
                }
                None => break,
            }
        }
    }
    doc::join(doc::newline, clauses)
}

/// Compile one clause: `name(args) [guard] -> body`.
fn clause(stream: &mut TokenStream) -> (EndTag, bool, Doc) {
    let name = match stream.peek() {
        Some(t) if matches!(t.kind, TokenKind::Atom(_)) => {
            let t = stream.next();
            t.map(|t| t.text()).unwrap_or_default()
        }
        _ => return (EndTag::Empty, false, doc::nil()),
    };

    let (mut fb, mut head) = match stream.peek() {
        Some(t) if t.is_punct(Punct::LParen) => {
            stream.next();
            let (inside, _closer) = scanner::get_until(Punct::LParen, Punct::RParen, stream);
            let (a_fb, args) = expr::brackets(Punct::LParen, Punct::RParen, &inside);
            (a_fb, doc::group(doc::cons(doc::text(name), args)))
        }
        _ => (false, doc::text(name)),
    };

    // Guard tokens sit between the argument list and the arrow.
    let (arrow, guard_toks) = up_to_arrow(stream);
    if !guard_toks.is_empty() {
        let (_end, g_fb, guard) = expr::free_expr(&guard_toks);
        fb |= g_fb;
        head = doc::group(doc::space(head, guard));
    }

    let (end_tag, b_fb, body) = expr::exprs(stream);
    fb |= b_fb;

    let tail = if arrow {
        doc::cons(
            doc::text(" ->"),
            doc::nest(INDENT, doc::cons(doc::break_(" "), body)),
        )
    } else {
        body
    };
    let d = doc::group(doc::force_break(fb, doc::cons(head, tail)));
    (end_tag, fb, d)
}

/// Collect the tokens before the clause arrow, skipping bracketed spans
/// atomically. Returns whether an arrow was actually consumed; a clause
/// terminator stops the scan so a malformed head never swallows the body.
fn up_to_arrow(stream: &mut TokenStream) -> (bool, Vec<Token>) {
    let mut collected: Vec<Token> = Vec::new();
    loop {
        let next = match stream.peek() {
            Some(t) => t.punct(),
            None => return (false, collected),
        };
        match next {
            Some(Punct::Arrow) => {
                stream.next();
                return (true, collected);
            }
            Some(p) if p.is_terminator() => return (false, collected),
            Some(p) if p.is_opener() => {
                if let Some(open_tok) = stream.next() {
                    collected.push(open_tok);
                }
                if let Some(close) = p.closer() {
                    let (inside, closer) = scanner::get_until(p, close, stream);
                    collected.extend(inside);
                    if let Some(c) = closer {
                        collected.push(c);
                    }
                }
            }
            _ => {
                if let Some(tok) = stream.next() {
                    collected.push(tok);
                }
            }
        }
    }
}

/// Compile a top-level configuration term: a bare bracket group with an
/// optional closing period.
fn config_term(stream: &mut TokenStream) -> Doc {
    let Some(open_tok) = stream.next() else {
        return doc::nil();
    };
    let Some(open) = open_tok.punct().filter(|p| p.is_opener()) else {
        return doc::text(open_tok.text());
    };
    let Some(close) = open.closer() else {
        return doc::text(open_tok.text());
    };
    let (inside, _closer) = scanner::get_until(open, close, stream);
    let (g_fb, g) = expr::brackets(open, close, &inside);
    let (t_fb, tail) = dot_tail(stream);
    doc::group(doc::force_break(g_fb || t_fb, doc::cons(g, tail)))
}

/// Consume a closing period if present, keeping a same-line trailing
/// comment on the period's line.
fn dot_tail(stream: &mut TokenStream) -> (bool, Doc) {
    let dot_line = match stream.peek() {
        Some(t) if t.is_punct(Punct::Dot) => t.line,
        _ => return (false, doc::nil()),
    };
    stream.next();
    let mut d = doc::text(".");
    let mut fb = false;
    let trailing = stream
        .peek()
        .is_some_and(|t| t.is_comment() && t.line == dot_line);
    if trailing {
        if let Some(c) = stream.next() {
            d = doc::cons(d, doc::cons(doc::text(" "), doc::text(c.text())));
            fb = true;
        }
    }
    (fb, d)
}
