//! Bracket-balanced token scanning.
//!
//! The compilers consume tokens through a [`TokenStream`] front cursor.
//! Scanning is bracket-balanced throughout: a delimiter pair nesting inside
//! itself is tracked with a depth counter, and bracketed spans are skipped
//! atomically when cutting expressions.
//!
//! On truncated input (an opener with no closer) the scanners treat end of
//! stream as the closer instead of failing; `format_code` never reaches
//! that state because the safety gate parses the input first, and the pure
//! token entry point stays total.

use std::collections::VecDeque;

use tarmac_common::token::{Punct, Token};

/// A front cursor over the token stream being compiled.
pub struct TokenStream {
    toks: VecDeque<Token>,
}

impl TokenStream {
    /// Create a stream over the given tokens.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            toks: tokens.into(),
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Option<&Token> {
        self.toks.front()
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Option<Token> {
        self.toks.pop_front()
    }

    /// Put tokens back at the front of the stream, preserving their order.
    pub fn requeue(&mut self, tokens: Vec<Token>) {
        for tok in tokens.into_iter().rev() {
            self.toks.push_front(tok);
        }
    }
}

/// Collect tokens up to the balanced closer of `open`, consuming the
/// closer. The opener itself must already have been consumed. Returns the
/// contents (closer excluded) and the closer token, if one was found.
pub fn get_until(open: Punct, close: Punct, stream: &mut TokenStream) -> (Vec<Token>, Option<Token>) {
    let mut inside = Vec::new();
    let mut depth = 0u32;
    while let Some(tok) = stream.next() {
        if tok.is_punct(open) {
            depth += 1;
        } else if tok.is_punct(close) {
            if depth == 0 {
                return (inside, Some(tok));
            }
            depth -= 1;
        }
        inside.push(tok);
    }
    (inside, None)
}

/// Strip one balanced `open`..`close` pair from the front of the stream:
/// the opener must be the next token; the contents are requeued without the
/// surrounding delimiters. Used to strip the parentheses wrapping a whole
/// `-spec` body.
pub fn remove_matching(open: Punct, close: Punct, stream: &mut TokenStream) {
    if stream.peek().map(|t| t.is_punct(open)) != Some(true) {
        return;
    }
    stream.next();
    let (inside, _closer) = get_until(open, close, stream);
    stream.requeue(inside);
}

/// Cut one expression from the stream front: the tokens up to and
/// including the first `,`, `;` or `.` at the top nesting level.
/// Bracketed spans are skipped atomically.
///
/// Comments interact four ways:
/// - a leading comment is an expression by itself;
/// - a comment on the same line as the token before it is hoisted: the
///   scanned prefix goes back on the stream and only the comment returns,
///   so the surrounding expression list emits the comment first;
/// - a comment on a later line ends the expression without being consumed;
/// - a comment on the same line as the terminator rides along on the tail.
pub fn get_end_of_expr(stream: &mut TokenStream) -> Vec<Token> {
    let mut acc: Vec<Token> = Vec::new();
    while let Some(tok) = stream.next() {
        if tok.is_comment() {
            let Some(prev) = acc.last() else {
                return vec![tok];
            };
            if tok.line == prev.line {
                // Inline comment: emit it first, rescan the prefix after it.
                let prefix = std::mem::take(&mut acc);
                stream.requeue(prefix);
                return vec![tok];
            }
            // The comment belongs to whatever follows.
            stream.requeue(vec![tok]);
            return acc;
        }
        if let Some(p) = tok.punct() {
            if p.is_terminator() {
                let term_line = tok.line;
                acc.push(tok);
                let trailing = stream
                    .peek()
                    .is_some_and(|next| next.is_comment() && next.line == term_line);
                if trailing {
                    if let Some(comment) = stream.next() {
                        acc.push(comment);
                    }
                }
                return acc;
            }
            if let Some(close) = p.closer() {
                acc.push(tok);
                let (inside, closer) = get_until(p, close, stream);
                acc.extend(inside);
                if let Some(c) = closer {
                    acc.push(c);
                }
                continue;
            }
        }
        acc.push(tok);
    }
    acc
}
