//! Lexer for GraphQL source text.

use crate::token::{Token, TokenKind};
use gqlbridge_core::{Interner, Span, Text};

/// Why the lexer produced a [`TokenKind::Error`] token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnexpectedCharacter(char),
    UnterminatedString,
    InvalidNumber(String),
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) if c.is_control() => {
                write!(f, "Invalid character: U+{:04X}.", *c as u32)
            }
            Self::UnexpectedCharacter(c) => write!(f, "Unexpected character: \"{c}\"."),
            Self::UnterminatedString => f.write_str("Unterminated string."),
            Self::InvalidNumber(reason) => write!(f, "Invalid number, {reason}."),
        }
    }
}

/// A lexer for GraphQL source code.
pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: u32,
    interner: &'a Interner,
    error: Option<LexError>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer.
    pub fn new(source: &'a str, interner: &'a Interner) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            interner,
            error: None,
        }
    }

    /// Returns the current position.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Takes the reason for the last error token.
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos as usize).copied()
    }

    #[inline]
    fn peek_at(&self, offset: u32) -> Option<u8> {
        self.bytes.get((self.pos + offset) as usize).copied()
    }

    #[inline]
    fn advance(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn advance_by(&mut self, n: u32) {
        self.pos += n;
    }

    fn fail(&mut self, error: LexError) -> TokenKind {
        self.error = Some(error);
        TokenKind::Error
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_ignored();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::empty(start));
        };

        let kind = match c {
            b'!' => self.punct(TokenKind::Bang),
            b'$' => self.punct(TokenKind::Dollar),
            b'&' => self.punct(TokenKind::Amp),
            b'(' => self.punct(TokenKind::LParen),
            b')' => self.punct(TokenKind::RParen),
            b':' => self.punct(TokenKind::Colon),
            b'=' => self.punct(TokenKind::Eq),
            b'@' => self.punct(TokenKind::At),
            b'[' => self.punct(TokenKind::LBracket),
            b']' => self.punct(TokenKind::RBracket),
            b'{' => self.punct(TokenKind::LBrace),
            b'|' => self.punct(TokenKind::Pipe),
            b'}' => self.punct(TokenKind::RBrace),
            b'.' if self.peek_at(1) == Some(b'.') && self.peek_at(2) == Some(b'.') => {
                self.advance_by(3);
                TokenKind::Spread
            }
            b'"' => self.scan_string(),
            b'-' | b'0'..=b'9' => self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(),
            _ => {
                let ch = self.source[self.pos as usize..]
                    .chars()
                    .next()
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                self.advance_by(ch.len_utf8() as u32);
                self.fail(LexError::UnexpectedCharacter(ch))
            }
        };

        Token::new(kind, Span::new(start, self.pos))
    }

    #[inline]
    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Skips whitespace, line terminators, commas, comments and the BOM.
    fn skip_ignored(&mut self) {
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\r' | b'\n' | b',') => self.advance(),
                Some(b'#') => {
                    let rest = &self.bytes[self.pos as usize..];
                    let len = memchr::memchr2(b'\n', b'\r', rest).unwrap_or(rest.len());
                    self.advance_by(len as u32);
                }
                Some(0xEF) if self.peek_at(1) == Some(0xBB) && self.peek_at(2) == Some(0xBF) => {
                    self.advance_by(3);
                }
                _ => break,
            }
        }
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos as usize;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        TokenKind::from_keyword(&self.source[start..self.pos as usize]).unwrap_or(TokenKind::Ident)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        (self.pos - start) as usize
    }

    /// Scans an int or float literal.
    fn scan_number(&mut self) -> TokenKind {
        let mut is_float = false;

        if self.peek() == Some(b'-') {
            self.advance();
        }

        if self.peek() == Some(b'0') {
            self.advance();
            if let Some(c @ b'0'..=b'9') = self.peek() {
                return self.fail(LexError::InvalidNumber(format!(
                    "unexpected digit after 0: \"{}\"",
                    c as char
                )));
            }
        } else if self.skip_digits() == 0 {
            return self.number_error();
        }

        if self.peek() == Some(b'.') {
            is_float = true;
            self.advance();
            if self.skip_digits() == 0 {
                return self.number_error();
            }
        }

        if let Some(b'e' | b'E') = self.peek() {
            is_float = true;
            self.advance();
            if let Some(b'+' | b'-') = self.peek() {
                self.advance();
            }
            if self.skip_digits() == 0 {
                return self.number_error();
            }
        }

        // A number may not run straight into a name or a dot.
        if let Some(c) = self.peek() {
            if c == b'.' || c == b'_' || c.is_ascii_alphabetic() {
                return self.fail(LexError::InvalidNumber(format!(
                    "expected digit but got: \"{}\"",
                    c as char
                )));
            }
        }

        if is_float {
            TokenKind::FloatLiteral
        } else {
            TokenKind::IntLiteral
        }
    }

    fn number_error(&mut self) -> TokenKind {
        let found = match self.peek() {
            Some(c) => format!("\"{}\"", c as char),
            None => "<EOF>".to_string(),
        };
        self.fail(LexError::InvalidNumber(format!(
            "expected digit but got: {found}"
        )))
    }

    /// Scans a string literal.
    fn scan_string(&mut self) -> TokenKind {
        if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') {
            self.advance_by(3);
            return self.scan_block_string();
        }

        self.advance();
        loop {
            match self.peek() {
                None | Some(b'\n' | b'\r') => return self.fail(LexError::UnterminatedString),
                Some(b'"') => {
                    self.advance();
                    return TokenKind::StringLiteral;
                }
                Some(b'\\') if self.peek_at(1).is_some() => self.advance_by(2),
                _ => self.advance(),
            }
        }
    }

    /// Scans the rest of a block string after the opening `"""`.
    fn scan_block_string(&mut self) -> TokenKind {
        loop {
            match self.peek() {
                None => return self.fail(LexError::UnterminatedString),
                Some(b'"') if self.peek_at(1) == Some(b'"') && self.peek_at(2) == Some(b'"') => {
                    self.advance_by(3);
                    return TokenKind::BlockStringLiteral;
                }
                Some(b'\\')
                    if self.peek_at(1) == Some(b'"')
                        && self.peek_at(2) == Some(b'"')
                        && self.peek_at(3) == Some(b'"') =>
                {
                    self.advance_by(4);
                }
                _ => self.advance(),
            }
        }
    }

    /// Interns the text at the given span.
    pub fn intern_span(&self, span: Span) -> Text {
        self.interner.intern(self.span_text(span))
    }

    /// Gets the text at the given span.
    pub fn span_text(&self, span: Span) -> &'a str {
        &self.source[span.start as usize..span.end as usize]
    }
}

/// Tokenizes the entire source.
pub fn tokenize(source: &str, interner: &Interner) -> Vec<Token> {
    let mut lexer = Lexer::new(source, interner);
    let mut tokens = Vec::new();

    loop {
        let token = lexer.next_token();
        let is_eof = token.is_eof();
        tokens.push(token);
        if is_eof {
            break;
        }
    }

    tokens
}

/// An escape sequence in a quoted string that is not valid GraphQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    /// Unknown `\x` escape, or a trailing backslash.
    Character(String),
    /// Malformed `\u` escape, or one that names no Unicode scalar value.
    Unicode(String),
}

impl std::fmt::Display for EscapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character(sequence) => {
                write!(f, "Invalid character escape sequence: \"{sequence}\".")
            }
            Self::Unicode(sequence) => {
                write!(f, "Invalid Unicode escape sequence: \"{sequence}\".")
            }
        }
    }
}

/// Decodes the escape sequences of a quoted string body.
///
/// `\uXXXX` takes exactly four hex digits and a surrogate pair written
/// as two such escapes decodes to one character. `\u{...}` takes any
/// number of hex digits.
///
/// # Errors
///
/// Returns the offending sequence when an escape is not valid GraphQL.
pub fn unescape(raw: &str) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(backslash) = memchr::memchr(b'\\', rest.as_bytes()) {
        out.push_str(&rest[..backslash]);
        let mut chars = rest[backslash + 1..].chars();
        let escaped = chars
            .next()
            .ok_or_else(|| EscapeError::Character("\\".to_string()))?;
        rest = chars.as_str();
        let decoded = match escaped {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let (decoded, len) = unicode_escape(rest)?;
                rest = &rest[len..];
                decoded
            }
            other => return Err(EscapeError::Character(format!("\\{other}"))),
        };
        out.push(decoded);
    }
    out.push_str(rest);
    Ok(out)
}

/// Decodes what follows `\u`, returning the character and the number of
/// bytes it spans.
fn unicode_escape(rest: &str) -> Result<(char, usize), EscapeError> {
    if let Some(braced) = rest.strip_prefix('{') {
        let digits = braced.bytes().take_while(u8::is_ascii_hexdigit).count();
        let closed = braced[digits..].starts_with('}');
        let invalid = || {
            let close = if closed { "}" } else { "" };
            EscapeError::Unicode(format!("\\u{{{}{close}", &braced[..digits]))
        };
        if digits == 0 || !closed {
            return Err(invalid());
        }
        let code = u32::from_str_radix(&braced[..digits], 16).map_err(|_| invalid())?;
        let decoded = char::from_u32(code).ok_or_else(invalid)?;
        return Ok((decoded, digits + 2));
    }

    let invalid = || EscapeError::Unicode(format!("\\u{}", rest.chars().take(4).collect::<String>()));
    let lead = hex4(rest).ok_or_else(invalid)?;
    if let Some(decoded) = char::from_u32(lead) {
        return Ok((decoded, 4));
    }
    if (0xD800..0xDC00).contains(&lead) {
        let trail = rest[4..].strip_prefix("\\u").and_then(hex4);
        if let Some(trail @ 0xDC00..=0xDFFF) = trail {
            let code = 0x10000 + ((lead - 0xD800) << 10) + (trail - 0xDC00);
            if let Some(decoded) = char::from_u32(code) {
                return Ok((decoded, 10));
            }
        }
    }
    Err(invalid())
}

/// Reads exactly four ASCII hex digits.
fn hex4(text: &str) -> Option<u32> {
    let digits = text.get(..4)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Computes the value of a block string body: common indentation is
/// removed and blank leading/trailing lines are dropped.
#[must_use]
pub fn block_string_value(raw: &str) -> String {
    let raw = raw.replace("\\\"\"\"", "\"\"\"");
    let lines: Vec<&str> = raw.split("\r\n").flat_map(|l| l.split(['\n', '\r'])).collect();

    let indent_of = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let common = lines
        .iter()
        .skip(1)
        .filter(|line| line.len() > indent_of(line))
        .map(|line| indent_of(line))
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.len() < common {
                *line
            } else {
                &line[common..]
            }
        })
        .collect();

    let is_blank = |line: &&str| line.trim_matches([' ', '\t']).is_empty();
    while out.first().is_some_and(is_blank) {
        out.remove(0);
    }
    while out.last().is_some_and(is_blank) {
        out.pop();
    }
    out.join("\n")
}
