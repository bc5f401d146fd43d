//! Tarmac code formatter core.
//!
//! This crate formats Erlang-style source code in four stages:
//!
//! 1. Tokenize the source (via `tarmac-lexer`)
//! 2. Compile the token stream into a layout document
//! 3. Render the document within the target column width
//! 4. Re-parse the output and require it to be equivalent to the input
//!
//! Stage 4 is a safety gate: if formatting would change what the source
//! means, the original is kept and a structured error carrying both byte
//! sequences is returned instead. Width is the only layout parameter.

pub mod doc;
mod error;
mod expr;
mod forms;
mod printer;
mod scanner;

pub use error::FormatError;
pub use printer::{pretty, MAX_WIDTH};

use tarmac_common::token::Token;

/// Format a token stream within the given width.
///
/// This is the pure pretty-printer: no safety gate, no I/O. The output is
/// a function of the tokens and the width alone.
pub fn format_tokens(tokens: Vec<Token>, width: usize) -> String {
    printer::pretty(forms::file(tokens), width)
}

/// Format source code, refusing any output that changes what it means.
pub fn format_code(source: &str) -> Result<String, FormatError> {
    format_inner(source, None)
}

/// Like [`format_code`], labelling any refusal with a file path.
pub fn format_code_with_path(source: &str, path: &str) -> Result<String, FormatError> {
    format_inner(source, Some(path))
}

fn format_inner(source: &str, path: Option<&str>) -> Result<String, FormatError> {
    let tokens = tarmac_lexer::Lexer::tokenize(source)?;
    let before = tarmac_parser::parse(&tokens)?;
    let produced = format_tokens(tokens, MAX_WIDTH);

    let reparse = tarmac_lexer::Lexer::tokenize(&produced)
        .ok()
        .and_then(|toks| tarmac_parser::parse(&toks).ok());
    match reparse {
        Some(after) if tarmac_parser::equivalent(&after, &before) => Ok(produced),
        _ => Err(FormatError::CheckFailed {
            path: path.map(str::to_string),
            original: source.to_string(),
            produced,
        }),
    }
}



#[cfg(test)]
mod idempotency_tests {
    use super::format_code;

    fn assert_idempotent(name: &str, source: &str) {
        let first = format_code(source).expect("source should format");
        let second = format_code(&first).expect("output should reformat");
        assert_eq!(
            first, second,
            "idempotency failed for: {name}\nfirst:  {first:?}\nsecond: {second:?}"
        );
    }

    #[test]
    fn idempotent_empty_file() {
        assert_idempotent("empty file", "");
    }

    #[test]
    fn idempotent_attribute() {
        assert_idempotent("attribute", "-module(x).");
    }

    #[test]
    fn idempotent_module_header() {
        assert_idempotent("module header", "-module(x).\n-export([foo/1]).");
    }

    #[test]
    fn idempotent_single_clause() {
        assert_idempotent("single clause", "foo(X) -> X + 1.");
    }

    #[test]
    fn idempotent_multi_clause() {
        assert_idempotent("multi clause", "fib(0) -> 0;\nfib(1) -> 1;\nfib(N) -> fib(N - 1) + fib(N - 2).");
    }

    #[test]
    fn idempotent_multi_expression_body() {
        assert_idempotent("multi expression body", "init() -> X = start(), X.");
    }

    #[test]
    fn idempotent_comments() {
        assert_idempotent(
            "comments",
            "% header\n% more\nfoo() -> ok.\n% after",
        );
    }

    #[test]
    fn idempotent_inline_comment() {
        assert_idempotent("inline comment", "foo() ->\n    a, % note\n    b.");
    }

    #[test]
    fn idempotent_hoisted_comment() {
        assert_idempotent("hoisted comment", "foo() ->\n    ok % done\n.");
    }

    #[test]
    fn idempotent_spec_and_function() {
        assert_idempotent("spec and function", "-spec add(X, Y) -> X.\nadd(X, Y) -> X + Y.");
    }

    #[test]
    fn idempotent_bit_strings() {
        assert_idempotent("bit strings", "pack(X) -> <<X:8/integer>>.");
    }

    #[test]
    fn idempotent_config_term() {
        assert_idempotent("config term", "{app, [{key, [1, 2, 3]}, {other, \"text\"}]}.");
    }

    #[test]
    fn idempotent_nested_brackets() {
        assert_idempotent("nested brackets", "foo() -> {a, [b, {c, d}], <<>>}.");
    }
}

#[cfg(test)]
mod edge_case_tests {
    use super::format_code;

    fn fmt(source: &str) -> String {
        format_code(source).expect("source should format")
    }

    #[test]
    fn no_trailing_whitespace_on_any_line() {
        let result = fmt("foo() ->\n    X = 1, % note\n    [X,\n2].");
        for (i, line) in result.lines().enumerate() {
            assert!(
                !line.ends_with(' ') && !line.ends_with('\t'),
                "line {} has trailing whitespace: {line:?}",
                i + 1
            );
        }
    }

    #[test]
    fn output_ends_with_exactly_one_newline() {
        let result = fmt("foo() -> ok.");
        assert!(result.ends_with('\n'));
        assert!(!result.ends_with("\n\n"));
    }

    #[test]
    fn blank_line_runs_collapse() {
        let result = fmt("-module(x).\n\n\n\n\nfoo() -> ok.");
        assert_eq!(result, "-module(x).\n\nfoo() -> ok.\n");
    }

    #[test]
    fn comments_only_file() {
        let result = fmt("% just\n% comments");
        assert_eq!(result, "% just\n% comments\n");
    }

    #[test]
    fn long_string_is_not_wrapped() {
        let source = format!("msg() -> \"{}\".", "x".repeat(120));
        let result = fmt(&source);
        assert_eq!(result.trim_end().lines().count(), 2);
        assert!(result.contains(&"x".repeat(120)));
    }

    #[test]
    fn attribute_without_parentheses() {
        assert_eq!(fmt("-else."), "-else.\n");
    }

    #[test]
    fn deeply_nested_lists_stay_balanced() {
        let result = fmt("deep() -> [[[[[x]]]]].");
        assert_eq!(result, "deep() -> [[[[[x]]]]].\n");
    }
}
