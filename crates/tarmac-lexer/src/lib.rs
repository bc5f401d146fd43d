// Tarmac lexer -- tokenizer for Erlang-style source text.

mod cursor;

use cursor::Cursor;
use tarmac_common::error::{LexError, LexErrorKind};
use tarmac_common::token::{Punct, Token, TokenKind};

/// The Tarmac lexer. Converts source text into the flat token stream the
/// formatter consumes.
///
/// Wraps a [`Cursor`] for character-level iteration. Whitespace and
/// newlines are skipped; every token records the 1-based line it starts on.
/// Any byte outside the token universe is an error rather than being
/// silently dropped, so a file the lexer cannot represent is never
/// reformatted.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Convenience: tokenize the entire source into a `Vec<Token>`.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while let Some(tok) = lexer.next_token()? {
            tokens.push(tok);
        }
        Ok(tokens)
    }

    /// Produce the next token, or `None` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let line = self.cursor.line();
        let Some(c) = self.cursor.peek() else {
            return Ok(None);
        };

        let tok = match c {
            '(' => self.punct(Punct::LParen, line),
            ')' => self.punct(Punct::RParen, line),
            '{' => self.punct(Punct::LBrace, line),
            '}' => self.punct(Punct::RBrace, line),
            '[' => self.punct(Punct::LBracket, line),
            ']' => self.punct(Punct::RBracket, line),
            ',' => self.punct(Punct::Comma, line),
            ';' => self.punct(Punct::Semi, line),
            '.' => self.punct(Punct::Dot, line),
            '=' => self.punct(Punct::Equals, line),
            '/' => self.punct(Punct::Slash, line),
            ':' => self.punct(Punct::Colon, line),
            '|' => self.punct(Punct::Pipe, line),
            '?' => self.punct(Punct::Question, line),
            '+' => self.punct(Punct::Plus, line),
            '*' => self.punct(Punct::Star, line),
            '-' => self.lex_minus(line),
            '<' => self.lex_angle(c, Punct::BinOpen, line)?,
            '>' => self.lex_angle(c, Punct::BinClose, line)?,
            '%' => self.lex_comment(line),
            '"' => self.lex_string(line)?,
            '\'' => self.lex_quoted_atom(line)?,
            '0'..='9' => self.lex_number(line),
            c if is_ident_start(c) => self.lex_ident(line),
            _ => {
                return Err(LexError::new(LexErrorKind::UnexpectedCharacter(c), line));
            }
        };
        Ok(Some(tok))
    }

    // ── Helpers ────────────────────────────────────────────────────────

    /// Skip whitespace, including newlines (the cursor counts lines).
    fn skip_whitespace(&mut self) {
        self.cursor
            .eat_while(|c| c == ' ' || c == '\t' || c == '\r' || c == '\n');
    }

    /// Consume one character and return a punct token.
    fn punct(&mut self, p: Punct, line: u32) -> Token {
        self.cursor.advance();
        Token::new(TokenKind::Punct(p), line)
    }

    /// `-` -> `Minus`, `->` -> `Arrow`
    fn lex_minus(&mut self, line: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('>') {
            self.cursor.advance();
            Token::new(TokenKind::Punct(Punct::Arrow), line)
        } else {
            Token::new(TokenKind::Punct(Punct::Minus), line)
        }
    }

    /// `<<` and `>>` are the only angle tokens; a lone angle is an error.
    fn lex_angle(&mut self, c: char, p: Punct, line: u32) -> Result<Token, LexError> {
        self.cursor.advance();
        if self.cursor.peek() == Some(c) {
            self.cursor.advance();
            Ok(Token::new(TokenKind::Punct(p), line))
        } else {
            Err(LexError::new(LexErrorKind::UnexpectedCharacter(c), line))
        }
    }

    /// Lex a `%` comment to end of line; the marker stays in the body.
    fn lex_comment(&mut self, line: u32) -> Token {
        let start = self.cursor.pos();
        self.cursor.eat_while(|c| c != '\n');
        let body = self.cursor.slice(start, self.cursor.pos());
        Token::new(TokenKind::Comment(body.trim_end().to_string()), line)
    }

    /// Lex a string literal. The contents between the quotes are kept
    /// verbatim, escape sequences included, so output re-quotes them
    /// byte-for-byte.
    fn lex_string(&mut self, line: u32) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                Some('"') => {
                    let contents = self.cursor.slice(start, self.cursor.pos());
                    self.cursor.advance();
                    return Ok(Token::new(TokenKind::Str(contents.to_string()), line));
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some(_) => {
                    self.cursor.advance();
                }
                None => {
                    return Err(LexError::new(LexErrorKind::UnterminatedString, line));
                }
            }
        }
    }

    /// Lex a quoted atom. The lexeme keeps its quotes.
    fn lex_quoted_atom(&mut self, line: u32) -> Result<Token, LexError> {
        let start = self.cursor.pos();
        self.cursor.advance(); // opening quote
        loop {
            match self.cursor.peek() {
                Some('\'') => {
                    self.cursor.advance();
                    let lexeme = self.cursor.slice(start, self.cursor.pos());
                    return Ok(Token::new(TokenKind::Atom(lexeme.to_string()), line));
                }
                Some('\\') => {
                    self.cursor.advance();
                    self.cursor.advance();
                }
                Some('\n') | None => {
                    return Err(LexError::new(LexErrorKind::UnterminatedAtom, line));
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lex a numeric literal, lexeme preserved verbatim.
    ///
    /// Covers decimal integers, radix literals (`16#ff`) and floats with
    /// an optional exponent. A `.` not followed by a digit is left alone --
    /// it terminates the enclosing form.
    fn lex_number(&mut self, line: u32) -> Token {
        let start = self.cursor.pos();
        self.cursor.eat_while(|c| c.is_ascii_digit());

        if self.cursor.peek() == Some('#') {
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_alphanumeric());
        } else {
            if self.cursor.peek() == Some('.')
                && self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
            {
                self.cursor.advance();
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
            if matches!(self.cursor.peek(), Some('e') | Some('E'))
                && (self.cursor.peek_next().is_some_and(|c| c.is_ascii_digit())
                    || (matches!(self.cursor.peek_next(), Some('+') | Some('-'))))
            {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some('+') | Some('-')) {
                    self.cursor.advance();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }

        let lexeme = self.cursor.slice(start, self.cursor.pos());
        Token::new(TokenKind::Integer(lexeme.to_string()), line)
    }

    /// Lex an identifier: lower-case initial is an atom, upper-case or
    /// underscore initial is a variable. The lexeme `div` is the keyword
    /// operator.
    fn lex_ident(&mut self, line: u32) -> Token {
        let start = self.cursor.pos();
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
        let lexeme = self.cursor.slice(start, self.cursor.pos());

        let kind = if lexeme == "div" {
            TokenKind::Punct(Punct::Div)
        } else if lexeme.starts_with(|c: char| c.is_ascii_lowercase()) {
            TokenKind::Atom(lexeme.to_string())
        } else {
            TokenKind::Var(lexeme.to_string())
        };
        Token::new(kind, line)
    }
}

/// Whether a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .expect("source should tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn attribute_form() {
        assert_eq!(
            kinds("-module(foo)."),
            vec![
                TokenKind::Punct(Punct::Minus),
                TokenKind::Atom("module".to_string()),
                TokenKind::Punct(Punct::LParen),
                TokenKind::Atom("foo".to_string()),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::Dot),
            ]
        );
    }

    #[test]
    fn arrow_and_minus() {
        assert_eq!(
            kinds("X - 1 -> X"),
            vec![
                TokenKind::Var("X".to_string()),
                TokenKind::Punct(Punct::Minus),
                TokenKind::Integer("1".to_string()),
                TokenKind::Punct(Punct::Arrow),
                TokenKind::Var("X".to_string()),
            ]
        );
    }

    #[test]
    fn bit_string_delimiters() {
        assert_eq!(
            kinds("<<X>>"),
            vec![
                TokenKind::Punct(Punct::BinOpen),
                TokenKind::Var("X".to_string()),
                TokenKind::Punct(Punct::BinClose),
            ]
        );
    }

    #[test]
    fn lone_angle_is_an_error() {
        let err = Lexer::tokenize("X < 2").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('<'));
        assert_eq!(err.line, 1);
    }

    #[test]
    fn div_is_a_keyword_operator() {
        assert_eq!(
            kinds("X div 2"),
            vec![
                TokenKind::Var("X".to_string()),
                TokenKind::Punct(Punct::Div),
                TokenKind::Integer("2".to_string()),
            ]
        );
    }

    #[test]
    fn comment_runs_to_end_of_line() {
        let toks = Lexer::tokenize("% a comment\nfoo").expect("tokenizes");
        assert_eq!(toks[0].kind, TokenKind::Comment("% a comment".to_string()));
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].kind, TokenKind::Atom("foo".to_string()));
        assert_eq!(toks[1].line, 2);
    }

    #[test]
    fn string_contents_keep_escapes() {
        assert_eq!(
            kinds(r#""a \"b\" c""#),
            vec![TokenKind::Str(r#"a \"b\" c"#.to_string())]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn quoted_atom_keeps_quotes() {
        assert_eq!(
            kinds("'hello world'"),
            vec![TokenKind::Atom("'hello world'".to_string())]
        );
    }

    #[test]
    fn numbers_keep_their_lexemes() {
        assert_eq!(
            kinds("42 16#ff 3.14 1.0e-3"),
            vec![
                TokenKind::Integer("42".to_string()),
                TokenKind::Integer("16#ff".to_string()),
                TokenKind::Integer("3.14".to_string()),
                TokenKind::Integer("1.0e-3".to_string()),
            ]
        );
    }

    #[test]
    fn integer_before_form_period_stays_whole() {
        assert_eq!(
            kinds("foo() -> 1."),
            vec![
                TokenKind::Atom("foo".to_string()),
                TokenKind::Punct(Punct::LParen),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::Arrow),
                TokenKind::Integer("1".to_string()),
                TokenKind::Punct(Punct::Dot),
            ]
        );
    }

    #[test]
    fn variables_and_atoms_are_distinguished() {
        assert_eq!(
            kinds("Foo foo _Bar"),
            vec![
                TokenKind::Var("Foo".to_string()),
                TokenKind::Atom("foo".to_string()),
                TokenKind::Var("_Bar".to_string()),
            ]
        );
    }

    #[test]
    fn lines_are_monotonic() {
        let toks = Lexer::tokenize("a\nb\n\nc").expect("tokenizes");
        let lines: Vec<u32> = toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }

    #[test]
    fn empty_source_produces_no_tokens() {
        assert!(Lexer::tokenize("").expect("tokenizes").is_empty());
    }
}
