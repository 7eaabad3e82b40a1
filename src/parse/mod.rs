mod error;
mod lexer;
mod parser;

pub use error::{Segment, SyntaxError, SyntaxErrorKind};
pub use lexer::TokenKind;

use crate::common::UInt;
use crate::error::NotationError;
use crate::expr::DiceExpression;

/// Parses notation such as `2d6+3`, `4d6dl1` or `1d20!` into a [`DiceExpression`].
///
/// Surrounding whitespace is ignored; whitespace between tokens is an error.
///
/// # Examples
/// ```
/// # use dice_notation::parse;
/// let expr = parse("4d6dl1").unwrap();
/// assert_eq!(expr.count(), 4);
/// assert_eq!(expr.drop_lowest(), 1);
/// assert_eq!(expr.to_string(), "4d6dl1");
/// ```
pub fn parse(s: &str) -> Result<DiceExpression, NotationError> {
    parse_with_limit(s, DiceExpression::DEFAULT_MAX_DICE)
}

/// Like [`parse`], but rejects expressions rolling more than `max_dice` dice.
pub fn parse_with_limit(s: &str, max_dice: UInt) -> Result<DiceExpression, NotationError> {
    let result = parser::Parser::new(s.trim(), max_dice).parse();
    match &result {
        Ok(expr) => tracing::debug!(notation = s, parsed = %expr, "parsed dice notation"),
        Err(why) => tracing::debug!(notation = s, error = %why, "rejected dice notation"),
    }
    result
}
