//! Expression compiler: token slices to layout documents.
//!
//! Expressions are compiled as a sequence of units joined by space breaks
//! inside a group. A unit is a call head glued to its argument list, a
//! bracket group, an arity or bit-string reference, or a free token.
//! Equations and pipe alternatives consume the remainder of the expression
//! to build their hanging layouts.
//!
//! Every compilation returns a force-break flag alongside its document;
//! flags are or-combined on the way up so a multi-line construct breaks
//! every bracket that contains it.

use crate::doc::{self, Doc, INDENT};
use crate::scanner::{self, TokenStream};
use tarmac_common::token::{Punct, Token, TokenKind};

/// How an expression ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTag {
    Dot,
    Semi,
    Comma,
    Comment,
    Empty,
}

/// Compile one expression from the stream.
pub fn expr(stream: &mut TokenStream) -> (EndTag, bool, Doc) {
    let toks = scanner::get_end_of_expr(stream);
    if toks.is_empty() {
        return (EndTag::Empty, false, doc::nil());
    }
    if toks.len() == 1 && toks[0].is_comment() {
        let d = doc::group(doc::force_break(true, doc::text(toks[0].text())));
        return (EndTag::Comment, true, d);
    }
    free_expr(&toks)
}

/// Compile a sequence of comma-joined expressions (a clause body).
///
/// Multi-expression bodies never collapse onto one line.
pub fn exprs(stream: &mut TokenStream) -> (EndTag, bool, Doc) {
    let mut docs: Vec<Doc> = Vec::new();
    let mut fb = false;
    let end_tag;
    loop {
        let (e, e_fb, d) = expr(stream);
        if !matches!(d, Doc::Nil) {
            fb |= e_fb;
            docs.push(d);
        }
        match e {
            EndTag::Comma | EndTag::Comment => continue,
            other => {
                end_tag = other;
                break;
            }
        }
    }
    let fb = fb || docs.len() > 1;
    let body = match docs.len() {
        0 => doc::nil(),
        1 => docs.remove(0),
        _ => doc::group(doc::force_break(true, doc::join(doc::space, docs))),
    };
    (end_tag, fb, body)
}

/// Compile a pre-cut token slice as one expression.
pub(crate) fn free_expr(toks: &[Token]) -> (EndTag, bool, Doc) {
    let mut parts: Vec<Doc> = Vec::new();
    let mut fb = false;
    // A free-standing comment ends its line, so the joins around it must
    // break; rendering them flat would swallow the rest of the line.
    let mut broken = false;
    let mut end_tag = EndTag::Empty;
    let mut i = 0;

    while i < toks.len() {
        let tok = &toks[i];

        if tok.is_punct(Punct::Question) {
            // Macro invocation: `?` sits flush against what follows.
            i += 1;
            if i < toks.len() {
                let (u_fb, unit) = one_unit(toks, &mut i);
                fb |= u_fb;
                parts.push(doc::cons(doc::text("?"), unit));
            } else {
                parts.push(doc::text("?"));
            }
            continue;
        }

        if let Some(p) = tok.punct() {
            if p.is_opener() {
                let (g_fb, g) = bracket_unit(toks, &mut i);
                fb |= g_fb;
                parts.push(g);
                continue;
            }
            if p == Punct::Pipe {
                // Alternative: the pipe hangs at the head of the rest.
                if i + 1 < toks.len() {
                    let (tail_end, tail_fb, tail) = free_expr(&toks[i + 1..]);
                    fb |= tail_fb;
                    end_tag = tail_end;
                    parts.push(doc::group(doc::cons(doc::text("| "), tail)));
                } else {
                    parts.push(doc::text("|"));
                }
                i = toks.len();
                continue;
            }
            if p.is_terminator() {
                let mut tail = doc::text(p.as_str());
                end_tag = match p {
                    Punct::Dot => EndTag::Dot,
                    Punct::Semi => EndTag::Semi,
                    _ => EndTag::Comma,
                };
                i += 1;
                if toks.get(i).is_some_and(Token::is_comment) {
                    // Trailing comment kept on the terminator's line.
                    tail = doc::cons(tail, doc::cons(doc::text(" "), doc::text(toks[i].text())));
                    fb = true;
                    i += 1;
                }
                match parts.last_mut() {
                    Some(last) => {
                        let prev = std::mem::replace(last, doc::nil());
                        *last = doc::cons(prev, tail);
                    }
                    None => parts.push(tail),
                }
                continue;
            }
        }

        if tok.is_comment() {
            fb = true;
            broken = true;
            parts.push(doc::group(doc::force_break(true, doc::text(tok.text()))));
            i += 1;
            continue;
        }

        if matches!(tok.kind, TokenKind::Var(_))
            && punct_at(toks, i + 1) == Some(Punct::Equals)
            && i + 2 < toks.len()
        {
            // Equation: `Var =` flat, the right side hanging under it.
            let lhs = doc::group(doc::text(format!("{} =", tok.text())));
            let (tail_end, tail_fb, rhs) = free_expr(&toks[i + 2..]);
            fb |= tail_fb;
            end_tag = tail_end;
            parts.push(doc::group(doc::cons(
                lhs,
                doc::nest(INDENT, doc::cons(doc::break_(" "), doc::group(rhs))),
            )));
            i = toks.len();
            continue;
        }

        let (u_fb, unit) = one_unit(toks, &mut i);
        fb |= u_fb;
        parts.push(unit);
    }

    let d = doc::group(doc::force_break(broken, doc::join(doc::space, parts)));
    (end_tag, fb, d)
}

/// Compile a single unit starting at `*i`, advancing past it.
fn one_unit(toks: &[Token], i: &mut usize) -> (bool, Doc) {
    let tok = &toks[*i];
    match &tok.kind {
        TokenKind::Atom(_) | TokenKind::Var(_) => ident_unit(toks, i),
        TokenKind::Punct(p) if p.is_opener() => bracket_unit(toks, i),
        TokenKind::Comment(_) => {
            *i += 1;
            (true, doc::group(doc::force_break(true, doc::text(tok.text()))))
        }
        _ => {
            *i += 1;
            (false, doc::text(tok.text()))
        }
    }
}

/// Compile a unit headed by an atom or variable: call heads glue to their
/// argument lists, arity references and bit-string tags concatenate
/// without spaces, and anything else is a free token.
fn ident_unit(toks: &[Token], i: &mut usize) -> (bool, Doc) {
    let head = &toks[*i];
    let atom_head = matches!(head.kind, TokenKind::Atom(_));
    let var_head = matches!(head.kind, TokenKind::Var(_));

    // Remote references: `m:f(...)` and `m:f/1`.
    if atom_head && punct_at(toks, *i + 1) == Some(Punct::Colon) && is_atom(toks, *i + 2) {
        if punct_at(toks, *i + 3) == Some(Punct::Slash) && is_integer(toks, *i + 4) {
            let t = format!(
                "{}:{}/{}",
                head.text(),
                toks[*i + 2].text(),
                toks[*i + 4].text()
            );
            *i += 5;
            return (false, doc::text(t));
        }
        if punct_at(toks, *i + 3) == Some(Punct::LParen) && toks[*i + 3].line == toks[*i + 2].line
        {
            let name = format!("{}:{}", head.text(), toks[*i + 2].text());
            *i += 3;
            let (fb, args) = bracket_unit(toks, i);
            return (fb, doc::cons(doc::text(name), args));
        }
    }

    // Arity reference `f/1`.
    if atom_head && punct_at(toks, *i + 1) == Some(Punct::Slash) && is_integer(toks, *i + 2) {
        let t = format!("{}/{}", head.text(), toks[*i + 2].text());
        *i += 3;
        return (false, doc::text(t));
    }

    // Sized bit-string tag `V:8/integer`.
    if var_head
        && punct_at(toks, *i + 1) == Some(Punct::Colon)
        && is_integer(toks, *i + 2)
        && punct_at(toks, *i + 3) == Some(Punct::Slash)
        && is_atom(toks, *i + 4)
    {
        let t = format!(
            "{}:{}/{}",
            head.text(),
            toks[*i + 2].text(),
            toks[*i + 4].text()
        );
        *i += 5;
        return (false, doc::text(t));
    }

    // Bit-string tag `V/binary`.
    if var_head && punct_at(toks, *i + 1) == Some(Punct::Slash) && is_atom(toks, *i + 2) {
        let t = format!("{}/{}", head.text(), toks[*i + 2].text());
        *i += 3;
        return (false, doc::text(t));
    }

    // Call head with the argument list opening on the same line.
    if punct_at(toks, *i + 1) == Some(Punct::LParen) && toks[*i + 1].line == head.line {
        let name = head.text();
        *i += 1;
        let (fb, args) = bracket_unit(toks, i);
        return (fb, doc::cons(doc::text(name), args));
    }

    *i += 1;
    (false, doc::text(head.text()))
}

/// Compile a balanced bracket span starting at the opener `toks[*i]`,
/// advancing past the closer.
fn bracket_unit(toks: &[Token], i: &mut usize) -> (bool, Doc) {
    let pair = toks[*i].punct().and_then(|p| p.closer().map(|c| (p, c)));
    let Some((open, close)) = pair else {
        let d = doc::text(toks[*i].text());
        *i += 1;
        return (false, d);
    };

    let mut depth = 0u32;
    let mut j = *i + 1;
    while j < toks.len() {
        if toks[j].is_punct(open) {
            depth += 1;
        } else if toks[j].is_punct(close) {
            if depth == 0 {
                break;
            }
            depth -= 1;
        }
        j += 1;
    }

    let inside = &toks[*i + 1..j.min(toks.len())];
    *i = (j + 1).min(toks.len());
    brackets(open, close, inside)
}

/// Build the bracket-group document for the contents of a balanced pair.
///
/// Rendered flat, the elements are joined by single spaces; broken, the
/// opener is followed by one element per line indented one step, with the
/// closer back at the opener's column. Empty pairs render with no interior
/// space and no break.
pub(crate) fn brackets(open: Punct, close: Punct, inside: &[Token]) -> (bool, Doc) {
    if inside.is_empty() {
        return (
            false,
            doc::text(format!("{}{}", open.as_str(), close.as_str())),
        );
    }
    let (fb, elems) = list_elements(inside);
    let opened = doc::stick(doc::text(open.as_str()), doc::join(doc::space, elems));
    let d = doc::group(doc::force_break(
        fb,
        doc::stick(doc::nest(INDENT, opened), doc::text(close.as_str())),
    ));
    (fb, d)
}

/// Compile the elements of a bracket pair, one expression each.
fn list_elements(inside: &[Token]) -> (bool, Vec<Doc>) {
    let mut stream = TokenStream::new(inside.to_vec());
    let mut fb = false;
    let mut elems = Vec::new();
    loop {
        let (_end, e_fb, d) = expr(&mut stream);
        if matches!(d, Doc::Nil) {
            break;
        }
        fb |= e_fb;
        elems.push(d);
    }
    (fb, elems)
}

fn punct_at(toks: &[Token], i: usize) -> Option<Punct> {
    toks.get(i).and_then(Token::punct)
}

fn is_atom(toks: &[Token], i: usize) -> bool {
    matches!(toks.get(i).map(|t| &t.kind), Some(TokenKind::Atom(_)))
}

fn is_integer(toks: &[Token], i: usize) -> bool {
    matches!(toks.get(i).map(|t| &t.kind), Some(TokenKind::Integer(_)))
}
