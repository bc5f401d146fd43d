//! Width-aware layout engine.
//!
//! Reduces a [`Doc`] tree to a string in two passes: the engine linearises
//! the tree into a sequence of text and line events, deciding at each group
//! whether to render flat or broken, and the emitter serialises the events.
//! Both the fit oracle and the engine walk an explicit stack of
//! `(indent, mode, doc)` frames, so host stack depth stays bounded however
//! deeply the source nests.

use crate::doc::{Doc, Inherit, BLANK};

/// Default target column width.
pub const MAX_WIDTH: usize = 100;

/// Whether the current frame renders flat or broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Breaks emit their literal text.
    Flat,
    /// Breaks emit a newline plus the current indentation.
    Break,
}

/// One frame of the layout stack.
#[derive(Debug, Clone, Copy)]
struct Frame<'d> {
    indent: usize,
    mode: Mode,
    doc: &'d Doc,
}

/// One event of the linearised output.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SEvent<'d> {
    /// Verbatim text.
    Text(&'d str),
    /// A newline followed by the given number of spaces.
    Line(usize),
}

/// Decide whether the frames fit within `width` columns.
///
/// Walks the stack leftmost-first, charging every text and every flat
/// break against the remaining width. A break reached in break mode ends
/// the line, so the prefix fits; a force-break subtree will be broken
/// regardless, so no fit constraint applies to it.
fn fits(mut width: isize, mut stack: Vec<Frame<'_>>) -> bool {
    while let Some(frame) = stack.pop() {
        if width < 0 {
            return false;
        }
        match frame.doc {
            Doc::Nil => {}
            Doc::Cons(x, y) => {
                stack.push(Frame { doc: y, ..frame });
                stack.push(Frame { doc: x, ..frame });
            }
            Doc::Nest(n, d) => stack.push(Frame {
                indent: frame.indent + n,
                doc: d,
                ..frame
            }),
            Doc::Text(s) => width -= s.len() as isize,
            Doc::Break(s) => match frame.mode {
                Mode::Flat => width -= s.len() as isize,
                Mode::Break => return true,
            },
            Doc::Group(d, Inherit::SelfDecide) => stack.push(Frame {
                mode: Mode::Flat,
                doc: d,
                ..frame
            }),
            Doc::Group(d, Inherit::Inherit) => stack.push(Frame { doc: d, ..frame }),
            Doc::ForceBreak(_) => return true,
        }
    }
    width >= 0
}

/// Linearise a document within the given width.
fn layout(width: usize, root: &Doc) -> Vec<SEvent<'_>> {
    let mut events = Vec::new();
    let mut col = 0usize;
    let mut stack = vec![Frame {
        indent: 0,
        mode: Mode::Flat,
        doc: root,
    }];

    while let Some(frame) = stack.pop() {
        match frame.doc {
            Doc::Nil => {}
            Doc::Cons(x, y) => {
                stack.push(Frame { doc: y, ..frame });
                stack.push(Frame { doc: x, ..frame });
            }
            Doc::Nest(n, d) => stack.push(Frame {
                indent: frame.indent + n,
                doc: d,
                ..frame
            }),
            Doc::Text(s) => {
                events.push(SEvent::Text(s));
                col += s.len();
            }
            Doc::Break(s) => match frame.mode {
                Mode::Flat => {
                    events.push(SEvent::Text(s));
                    col += s.len();
                }
                Mode::Break => {
                    if s == BLANK {
                        events.push(SEvent::Line(0));
                    }
                    events.push(SEvent::Line(frame.indent));
                    col = frame.indent;
                }
            },
            Doc::ForceBreak(d) => stack.push(Frame {
                mode: Mode::Break,
                doc: d,
                ..frame
            }),
            Doc::Group(d, Inherit::Inherit) => stack.push(Frame { doc: d, ..frame }),
            Doc::Group(d, Inherit::SelfDecide) => {
                let probe = vec![Frame {
                    indent: frame.indent,
                    mode: Mode::Flat,
                    doc: d,
                }];
                let mode = if fits(width as isize - col as isize, probe) {
                    Mode::Flat
                } else {
                    Mode::Break
                };
                stack.push(Frame {
                    mode,
                    doc: d,
                    ..frame
                });
            }
        }
    }
    events
}

/// Serialise the event sequence, expanding indentation.
///
/// Trailing spaces never survive a line break, and non-empty output always
/// ends with exactly one newline.
fn emit(events: &[SEvent<'_>]) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            SEvent::Text(s) => out.push_str(s),
            SEvent::Line(indent) => {
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('\n');
                for _ in 0..*indent {
                    out.push(' ');
                }
            }
        }
    }
    if !out.is_empty() {
        while out.ends_with(' ') {
            out.pop();
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Render a document within the given column width.
pub fn pretty(doc: Doc, width: usize) -> String {
    // Wrapping the root makes it a decision point of its own.
    let root = crate::doc::group(doc);
    emit(&layout(width, &root))
}
