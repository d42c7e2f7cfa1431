//! Indentation-aware lexer (spec §4.1).
//!
//! Walks the source left to right with a byte-position cursor, tracking
//! 1-based line/column for diagnostics (grounded on the cursor-style
//! hand-rolled lexers common across the reference corpus). Indentation is
//! tracked with a stack of column widths seeded with `[0]`; entering a
//! deeper indentation pushes and emits `INDENT`, returning to a previous
//! width pops and emits one `DEDENT` per popped frame. Newlines and
//! indentation are suppressed while inside any bracket pair so that
//! multi-line list/dict/call literals lex as a single logical line.

use crate::error::{LexError, LexErrorKind};
use crate::token::{NumberKind, Token, TokenKind};

/// Tabs expand to the next multiple of this width (spec §4.1).
const TAB_WIDTH: u32 = 8;

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    indent_stack: Vec<u32>,
    bracket_depth: u32,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            line: 1,
            col: 1,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    /// Tokenizes the entire source, returning the token stream terminated by
    /// a single `EOF`, or the first lexical error encountered.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            if self.at_line_start && self.bracket_depth == 0 {
                if self.handle_line_start()? {
                    // blank/comment-only line: loop back to re-check line start
                    continue;
                }
            }
            self.skip_intra_line_whitespace();

            let Some(c) = self.peek() else {
                self.finish()?;
                break;
            };

            if c == '#' {
                self.skip_to_eol();
                continue;
            }

            if c == '\n' {
                self.consume_newline();
                continue;
            }
            if c == '\r' {
                self.advance();
                continue;
            }

            if c == '_' || c.is_alphabetic() {
                self.lex_identifier_or_keyword_or_string_prefix();
                continue;
            }
            if c.is_ascii_digit() {
                self.lex_number()?;
                continue;
            }
            if c == '\'' || c == '"' {
                self.lex_string(false)?;
                continue;
            }

            self.lex_punctuation()?;
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", self.line, self.col));
        Ok(self.tokens)
    }

    // --- cursor primitives -------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn push(&mut self, kind: TokenKind, lexeme: impl Into<String>, line: u32, col: u32) {
        self.tokens.push(Token::new(kind, lexeme, line, col));
    }

    // --- indentation ---------------------------------------------------

    /// Consumes leading whitespace on a fresh logical line, deciding whether
    /// it's blank (only whitespace/comment/newline) or real code. Returns
    /// `true` if the line was blank and should be skipped without emitting
    /// layout tokens.
    fn handle_line_start(&mut self) -> Result<bool, LexError> {
        let line = self.line;
        let mut width = 0u32;
        loop {
            match self.peek() {
                Some(' ') => {
                    width += 1;
                    self.advance();
                }
                Some('\t') => {
                    width = (width / TAB_WIDTH + 1) * TAB_WIDTH;
                    self.advance();
                }
                _ => break,
            }
        }
        match self.peek() {
            None => {
                self.at_line_start = false;
                return Ok(false);
            }
            Some('\n') => {
                self.advance();
                return Ok(true);
            }
            Some('\r') => {
                self.advance();
                return Ok(true);
            }
            Some('#') => {
                self.skip_to_eol();
                if self.peek() == Some('\n') {
                    self.advance();
                }
                return Ok(true);
            }
            _ => {}
        }

        self.at_line_start = false;
        let current = *self.indent_stack.last().expect("indent stack never empty");
        if width > current {
            self.indent_stack.push(width);
            self.push(TokenKind::Indent, "", line, 1);
        } else if width < current {
            while *self.indent_stack.last().expect("indent stack never empty") > width {
                self.indent_stack.pop();
                self.push(TokenKind::Dedent, "", line, 1);
            }
            if *self.indent_stack.last().expect("indent stack never empty") != width {
                return Err(LexError::new(
                    LexErrorKind::InconsistentDedent,
                    format!("unindent does not match any outer indentation level (width {width})"),
                    line,
                    1,
                ));
            }
        }
        Ok(false)
    }

    fn skip_intra_line_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.advance();
        }
    }

    fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn consume_newline(&mut self) {
        let (line, col) = (self.line, self.col);
        self.advance();
        if self.bracket_depth == 0 {
            self.at_line_start = true;
            if !matches!(
                self.tokens.last().map(|t| &t.kind),
                Some(TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent) | None
            ) {
                self.push(TokenKind::Newline, "", line, col);
            }
        }
    }

    /// Pops all remaining indentation and appends a trailing `NEWLINE`
    /// before `EOF`, so the parser always sees a balanced token stream.
    fn finish(&mut self) -> Result<(), LexError> {
        if !matches!(
            self.tokens.last().map(|t| &t.kind),
            Some(TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent) | None
        ) {
            self.push(TokenKind::Newline, "", self.line, self.col);
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push(TokenKind::Dedent, "", self.line, self.col);
        }
        Ok(())
    }

    // --- identifiers / keywords / raw-string prefix ------------------------

    fn lex_identifier_or_keyword_or_string_prefix(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        // `r`/`R` immediately followed by a quote is a raw-string prefix,
        // not an identifier.
        if matches!(self.peek(), Some('r' | 'R')) && matches!(self.peek_at(1), Some('\'' | '"')) {
            self.advance();
            let _ = self.lex_string(true);
            return;
        }
        while matches!(self.peek(), Some(c) if c == '_' || c.is_alphanumeric()) {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        match TokenKind::keyword(text) {
            Some(kind) => self.push(kind, text, line, col),
            Option::None => self.push(TokenKind::Identifier, text, line, col),
        }
    }

    // --- numbers ------------------------------------------------------

    fn lex_number(&mut self) -> Result<(), LexError> {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        let mut is_double = false;
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_double = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = &self.source[start..self.pos];
        if is_double {
            if text.parse::<f64>().is_err() {
                return Err(LexError::new(LexErrorKind::BadNumber, format!("invalid number literal '{text}'"), line, col));
            }
            self.push(TokenKind::Number(NumberKind::Double), text, line, col);
        } else {
            if text.parse::<i64>().is_err() {
                return Err(LexError::new(
                    LexErrorKind::BadNumber,
                    format!("invalid integer literal '{text}'"),
                    line,
                    col,
                ));
            }
            self.push(TokenKind::Number(NumberKind::Integer), text, line, col);
        }
        Ok(())
    }

    // --- strings ------------------------------------------------------

    fn lex_string(&mut self, raw: bool) -> Result<(), LexError> {
        let (line, col) = (self.line, self.col);
        let quote = self.peek().expect("caller checked for quote char");
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        "unterminated string literal",
                        line,
                        col,
                    ));
                }
                Some('\n') => {
                    return Err(LexError::new(
                        LexErrorKind::UnterminatedString,
                        "unterminated string literal (newline before closing quote)",
                        line,
                        col,
                    ));
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') if !raw => {
                    self.advance();
                    self.lex_escape(&mut value, line, col)?;
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        self.push(TokenKind::String, value, line, col);
        Ok(())
    }

    fn lex_escape(&mut self, out: &mut String, line: u32, col: u32) -> Result<(), LexError> {
        let Some(c) = self.peek() else {
            return Err(LexError::new(LexErrorKind::UnterminatedString, "unterminated escape", line, col));
        };
        match c {
            'n' => {
                out.push('\n');
                self.advance();
            }
            'r' => {
                out.push('\r');
                self.advance();
            }
            't' => {
                out.push('\t');
                self.advance();
            }
            '\\' => {
                out.push('\\');
                self.advance();
            }
            '"' => {
                out.push('"');
                self.advance();
            }
            '\'' => {
                out.push('\'');
                self.advance();
            }
            'x' => {
                self.advance();
                let code = self.read_hex_digits(2, line, col)?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'u' => {
                self.advance();
                let code = self.read_hex_digits(4, line, col)?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            other => {
                return Err(LexError::new(
                    LexErrorKind::BadEscape,
                    format!("unsupported escape sequence '\\{other}'"),
                    line,
                    col,
                ));
            }
        }
        Ok(())
    }

    fn read_hex_digits(&mut self, count: usize, line: u32, col: u32) -> Result<u32, LexError> {
        let mut value = 0u32;
        for _ in 0..count {
            let Some(c) = self.peek() else {
                return Err(LexError::new(LexErrorKind::BadEscape, "truncated hex escape", line, col));
            };
            let digit = c.to_digit(16).ok_or_else(|| {
                LexError::new(LexErrorKind::BadEscape, format!("invalid hex digit '{c}' in escape"), line, col)
            })?;
            value = value * 16 + digit;
            self.advance();
        }
        Ok(value)
    }

    // --- punctuation / operators ----------------------------------------

    fn lex_punctuation(&mut self) -> Result<(), LexError> {
        let (line, col) = (self.line, self.col);
        let c = self.advance().expect("caller checked for a character");
        macro_rules! two {
            ($next:expr, $two_kind:expr, $two_text:expr, $one_kind:expr, $one_text:expr) => {{
                if self.peek() == Some($next) {
                    self.advance();
                    self.push($two_kind, $two_text, line, col);
                } else {
                    self.push($one_kind, $one_text, line, col);
                }
            }};
        }
        match c {
            '(' => {
                self.bracket_depth += 1;
                self.push(TokenKind::LParen, "(", line, col);
            }
            ')' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.push(TokenKind::RParen, ")", line, col);
            }
            '[' => {
                self.bracket_depth += 1;
                self.push(TokenKind::LBracket, "[", line, col);
            }
            ']' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.push(TokenKind::RBracket, "]", line, col);
            }
            '{' => {
                self.bracket_depth += 1;
                self.push(TokenKind::LBrace, "{", line, col);
            }
            '}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                self.push(TokenKind::RBrace, "}", line, col);
            }
            ',' => self.push(TokenKind::Comma, ",", line, col),
            ':' => self.push(TokenKind::Colon, ":", line, col),
            '.' => self.push(TokenKind::Dot, ".", line, col),
            '+' => self.push(TokenKind::Plus, "+", line, col),
            '-' => self.push(TokenKind::Minus, "-", line, col),
            '%' => self.push(TokenKind::Percent, "%", line, col),
            '*' => two!('*', TokenKind::DoubleStar, "**", TokenKind::Star, "*"),
            '/' => two!('/', TokenKind::DoubleSlash, "//", TokenKind::Slash, "/"),
            '=' => two!('=', TokenKind::Eq, "==", TokenKind::Assign, "="),
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.push(TokenKind::NotEq, "!=", line, col);
                } else {
                    return Err(LexError::new(LexErrorKind::BadEscape, "unexpected character '!'", line, col));
                }
            }
            '<' => two!('=', TokenKind::LtEq, "<=", TokenKind::Lt, "<"),
            '>' => two!('=', TokenKind::GtEq, ">=", TokenKind::Gt, ">"),
            '?' => match self.peek() {
                Some('.') => {
                    self.advance();
                    self.push(TokenKind::SafeDot, "?.", line, col);
                }
                Some('[') => {
                    self.advance();
                    self.bracket_depth += 1;
                    self.push(TokenKind::SafeBracket, "?[", line, col);
                }
                _ => {
                    return Err(LexError::new(LexErrorKind::BadEscape, "unexpected character '?'", line, col));
                }
            },
            other => {
                return Err(LexError::new(
                    LexErrorKind::BadEscape,
                    format!("unexpected character '{other}'"),
                    line,
                    col,
                ));
            }
        }
        let _ = self.eof();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn indentation_round_trips() {
        let src = "def transform(INPUT):\n    x = 1\n    return x\n";
        let kinds = kinds(src);
        assert_eq!(
            kinds,
            vec![
                TokenKind::Def,
                TokenKind::Identifier,
                TokenKind::LParen,
                TokenKind::Identifier,
                TokenKind::RParen,
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number(NumberKind::Integer),
                TokenKind::Newline,
                TokenKind::Return,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn brackets_suppress_newlines() {
        let src = "x = [\n  1,\n  2,\n]\n";
        let kinds = kinds(src);
        assert!(!kinds.contains(&TokenKind::Indent));
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Newline).count(), 1);
    }

    #[test]
    fn multi_char_operators_win() {
        assert_eq!(kinds("a ** b"), vec![
            TokenKind::Identifier,
            TokenKind::DoubleStar,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Eof
        ]);
        assert_eq!(kinds("a?.b"), vec![
            TokenKind::Identifier,
            TokenKind::SafeDot,
            TokenKind::Identifier,
            TokenKind::Newline,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn raw_string_disables_escapes() {
        let tokens = Lexer::new("r'\\n'").tokenize().unwrap();
        assert_eq!(tokens[0].lexeme, "\\n");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = Lexer::new("'abc").tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn inconsistent_dedent_is_an_error() {
        let src = "if True:\n    if True:\n        x = 1\n  y = 2\n";
        let err = Lexer::new(src).tokenize().unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InconsistentDedent);
    }
}
