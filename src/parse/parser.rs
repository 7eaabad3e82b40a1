use super::error::{Segment, SyntaxError, SyntaxErrorKind};
use super::lexer::*;
use crate::common::*;
use crate::error::NotationError;
use crate::expr::{DiceBuilder, DiceExpression};
use logos_iter::LogosIter;
use std::ops::Range;
use std::str::FromStr;

type PResult<T> = Result<T, SyntaxError>;

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    len: usize,
    max_dice: UInt,
}

/// Segment values seen so far; `None` means the segment has not appeared.
#[derive(Default)]
struct Segments {
    modifier: Option<Int>,
    drop_lowest: Option<UInt>,
    drop_highest: Option<UInt>,
    exploding: bool,
    reroll: Option<Vec<UInt>>,
}

impl<'a> Parser<'a> {
    const AFTER_SIDES: &'static [TokenKind] = TokenKind::SEGMENTS;

    pub fn new(s: &'a str, max_dice: UInt) -> Self {
        Self {
            lexer: lexer(s),
            len: s.len(),
            max_dice,
        }
    }

    pub fn parse(mut self) -> Result<DiceExpression, NotationError> {
        let builder = self.parse_expression()?;
        Ok(builder.max_dice(self.max_dice).build()?)
    }

    fn advance(&mut self) -> Option<TokenKind> {
        self.lexer.next()
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        self.lexer.peek().map_or(false, |&peeked| peeked == kind)
    }

    fn consume(&mut self, expected: TokenKind) -> PResult<()> {
        if self.matches(expected) {
            self.advance();
            Ok(())
        } else {
            self.unexpected_token(vec![expected])
        }
    }

    fn consume_as<T: FromStr>(&mut self, expected: TokenKind) -> PResult<T> {
        self.consume(expected)?;
        match self.lexer.slice().parse() {
            Ok(x) => Ok(x),
            Err(_) => self.error(SyntaxErrorKind::NumberOutOfRange),
        }
    }

    fn error<T>(&mut self, kind: SyntaxErrorKind) -> PResult<T> {
        self.error_at(kind, self.lexer.span(), self.lexer.slice().to_string())
    }

    fn error_at<T>(&self, kind: SyntaxErrorKind, span: Range<usize>, slice: String) -> PResult<T> {
        Err(SyntaxError { kind, span, slice })
    }

    fn unexpected_token<T>(&mut self, expected: Vec<TokenKind>) -> PResult<T> {
        match self.advance() {
            None => self.error_at(
                SyntaxErrorKind::UnexpectedToken {
                    found: None,
                    expected,
                },
                self.len..self.len,
                String::new(),
            ),
            Some(TokenKind::Error) => self.error(SyntaxErrorKind::UnexpectedString { expected }),
            found => self.error(SyntaxErrorKind::UnexpectedToken { found, expected }),
        }
    }

    fn duplicate<T>(&mut self, segment: Segment) -> PResult<T> {
        self.advance();
        self.error(SyntaxErrorKind::DuplicateSegment(segment))
    }

    fn parse_expression(&mut self) -> PResult<DiceBuilder> {
        let count: UInt = if self.matches(TokenKind::Integer) {
            self.consume_as(TokenKind::Integer)?
        } else {
            1
        };
        self.consume(TokenKind::Dice)?;
        let sides: UInt = self.consume_as(TokenKind::Integer)?;

        let segments = self.parse_segments()?;
        Ok(DiceExpression::builder(count, sides)
            .modifier(segments.modifier.unwrap_or(0))
            .drop_lowest(segments.drop_lowest.unwrap_or(0))
            .drop_highest(segments.drop_highest.unwrap_or(0))
            .exploding(segments.exploding)
            .reroll(segments.reroll.unwrap_or_default()))
    }

    fn parse_segments(&mut self) -> PResult<Segments> {
        let mut segments = Segments::default();

        while let Some(&kind) = self.lexer.peek() {
            match kind {
                TokenKind::Plus | TokenKind::Minus => {
                    if segments.modifier.is_some() {
                        return self.duplicate(Segment::Modifier);
                    }
                    segments.modifier = Some(self.parse_modifier()?);
                }
                TokenKind::DropLowest => {
                    if segments.drop_lowest.is_some() {
                        return self.duplicate(Segment::DropLowest);
                    }
                    segments.drop_lowest = Some(self.parse_drop(kind)?);
                }
                TokenKind::DropHighest => {
                    if segments.drop_highest.is_some() {
                        return self.duplicate(Segment::DropHighest);
                    }
                    segments.drop_highest = Some(self.parse_drop(kind)?);
                }
                TokenKind::Bang => {
                    if segments.exploding {
                        return self.duplicate(Segment::Explode);
                    }
                    self.advance();
                    segments.exploding = true;
                }
                TokenKind::Reroll => {
                    if segments.reroll.is_some() {
                        return self.duplicate(Segment::Reroll);
                    }
                    segments.reroll = Some(self.parse_reroll()?);
                }
                _ => return self.unexpected_token(Self::AFTER_SIDES.to_vec()),
            }
        }

        Ok(segments)
    }

    fn parse_modifier(&mut self) -> PResult<Int> {
        let negative = self.matches(TokenKind::Minus);
        self.advance();
        let magnitude: Int = self.consume_as(TokenKind::Integer)?;
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn parse_drop(&mut self, kind: TokenKind) -> PResult<UInt> {
        self.consume(kind)?;
        self.consume_as(TokenKind::Integer)
    }

    fn parse_reroll(&mut self) -> PResult<Vec<UInt>> {
        self.consume(TokenKind::Reroll)?;
        let mut faces = vec![self.consume_as(TokenKind::Integer)?];
        while self.matches(TokenKind::Comma) {
            self.advance();
            faces.push(self.consume_as(TokenKind::Integer)?);
        }
        Ok(faces)
    }
}
