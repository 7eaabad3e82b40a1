//! Dice notation: parse `XdY+Z` style expressions, roll them, and simulate
//! many rolls for statistics or head-to-head comparison.
//!
//! ```
//! use dice_notation::{parse, RollContext};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let expr = parse("4d6dl1").unwrap();
//! let mut ctx = RollContext::new(100, StdRng::seed_from_u64(7));
//! let roll = ctx.eval(&expr);
//! assert!((3..=18).contains(&roll.total()));
//! ```

pub mod common;
pub mod compare;
pub mod config;
pub mod error;
pub mod expr;
pub mod parse;
pub mod roll;
mod sim;
pub mod stats;

use common::Int;

pub use common::AdvType;
pub use compare::{compare_parallel, ComparisonResult};
pub use config::RollConfig;
pub use error::{Error, NotationError, SemanticError, ValidationError};
pub use expr::{DiceBuilder, DiceExpression};
pub use parse::{parse, parse_with_limit};
pub use roll::{Provenance, RawRoll, RollContext, RollResult, Roller};
pub use stats::{aggregate_parallel, AggregateStats, Distribution, StatsAccumulator};

/// Rolls a notation string once with the thread-local generator.
///
/// ```
/// let total = dice_notation::roll("2d6+3").unwrap();
/// assert!((5..=15).contains(&total));
/// assert!(dice_notation::roll("2x6").is_err());
/// ```
pub fn roll(notation: &str) -> Result<Int, NotationError> {
    let expr = parse(notation)?;
    Ok(RollContext::default().eval(&expr).total())
}
