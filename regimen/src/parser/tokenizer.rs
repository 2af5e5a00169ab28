//! Lexer for block member lists such as `warm (run walk) 2 cool`.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Alternatives are tried in this order at each position; the leftmost match wins.
/// A name needs at least one letter, `_` or `/`, so `12` is always a count.
/// Counts are ASCII digits only.
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?P<open>\()|(?P<close>\))|(?P<regime>[\w/]*[\p{Alphabetic}_/][\w/]*)|(?P<count>[0-9]+\b)",
    )
    .expect("token regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    OpenBracket,
    CloseBracket,
    /// A regime or block name.
    RegimeUnit,
    /// A repeat count following a closing bracket.
    CountUnit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Absolute byte span in the source file.
    pub span: Range<usize>,
}

/// Lazy token stream over one member list. Clone it to start over.
///
/// Text matching none of the token patterns is skipped.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    offset: usize,
    pos: usize,
}

/// Tokenize `text`, which starts at byte `offset` of the source file.
pub fn tokenize(text: &str, offset: usize) -> Tokens<'_> {
    Tokens {
        text,
        offset,
        pos: 0,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.text.len() {
            return None;
        }
        let caps = TOKEN_REGEX.captures_at(self.text, self.pos)?;
        let (kind, m) = if let Some(m) = caps.name("open") {
            (TokenKind::OpenBracket, m)
        } else if let Some(m) = caps.name("close") {
            (TokenKind::CloseBracket, m)
        } else if let Some(m) = caps.name("regime") {
            (TokenKind::RegimeUnit, m)
        } else {
            (TokenKind::CountUnit, caps.name("count")?)
        };
        self.pos = m.end();
        Some(Token {
            kind,
            text: m.as_str(),
            span: self.offset + m.start()..self.offset + m.end(),
        })
    }
}
