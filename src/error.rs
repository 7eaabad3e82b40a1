use crate::common::{Int, UInt};
use crate::parse::{Segment, SyntaxError};

/// A notation string that could not be turned into a [`DiceExpression`](crate::DiceExpression).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum NotationError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Well-formed notation that describes an impossible roll.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("cannot roll zero dice")]
    ZeroDice,
    #[error("cannot roll {count} dice at once; the limit is {max}")]
    TooManyDice { count: UInt, max: UInt },
    #[error("a die needs at least 2 sides, found d{0}")]
    TooFewSides(UInt),
    #[error("modifier {modifier} is outside the range -{max}..={max}")]
    ModifierOutOfRange { modifier: Int, max: Int },
    #[error("'{segment}{n}' must drop fewer than the {count} dice rolled")]
    DropTooMany { segment: Segment, n: UInt, count: UInt },
    #[error("cannot drop {lowest} lowest and {highest} highest from only {count} dice")]
    DropExceedsPool { lowest: UInt, highest: UInt, count: UInt },
    #[error("advantage and disadvantage cannot both be set")]
    ConflictingAdvantage,
    #[error("advantage and disadvantage apply to a single die, not {count} dice")]
    AdvantageOnPool { count: UInt },
    #[error("cannot reroll {value} on a d{sides}")]
    RerollOutOfRange { value: UInt, sides: UInt },
}

/// An auxiliary parameter outside its allowed range.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the number of trials must be positive")]
    ZeroTrials,
    #[error("the repeat count cannot be negative, found {0}")]
    NegativeCount(Int),
    #[error("at least one worker is required")]
    ZeroWorkers,
}

impl ValidationError {
    pub(crate) fn check_trials(trials: usize) -> Result<(), Self> {
        if trials == 0 {
            Err(Self::ZeroTrials)
        } else {
            Ok(())
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Notation(#[from] NotationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl From<SyntaxError> for Error {
    fn from(e: SyntaxError) -> Self {
        Self::Notation(e.into())
    }
}

impl From<SemanticError> for Error {
    fn from(e: SemanticError) -> Self {
        Self::Notation(e.into())
    }
}

/// Converts a signed repeat count from the command line.
pub fn repeat_count(n: Int) -> Result<usize, ValidationError> {
    usize::try_from(n).map_err(|_| ValidationError::NegativeCount(n))
}
