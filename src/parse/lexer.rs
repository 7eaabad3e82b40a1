use logos::{Lexer as LogosLexer, Logos};
use logos_iter::{LogosIter, PeekableLexer};
use std::fmt;

pub(crate) type Lexer<'a> = PeekableLexer<'a, LogosLexer<'a, TokenKind>, TokenKind>;

pub(crate) fn lexer(s: &str) -> Lexer {
    TokenKind::lexer(s).peekable_lexer()
}

// Whitespace is not skipped; it lexes as `Error` like any other stray character.
#[derive(Logos, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TokenKind {
    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[dD]")]
    Dice,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    #[regex(r"[dD][lL]")]
    DropLowest,
    #[regex(r"[dD][hH]")]
    DropHighest,

    #[token("!")]
    Bang,

    #[regex(r"[rR]")]
    Reroll,
    #[token(",")]
    Comma,

    #[error]
    Error,
}

impl TokenKind {
    pub const SEGMENTS: &'static [Self] = &[
        Self::Plus,
        Self::Minus,
        Self::DropLowest,
        Self::DropHighest,
        Self::Bang,
        Self::Reroll,
    ];

    pub fn as_str(&self) -> &'static str {
        use TokenKind::*;

        match self {
            Integer => "<integer>",
            Dice => "'d'",
            Plus => "'+'",
            Minus => "'-'",
            DropLowest => "'dl'",
            DropHighest => "'dh'",
            Bang => "'!'",
            Reroll => "'r'",
            Comma => "','",
            Error => "<error>",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
