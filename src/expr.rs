use crate::common::*;
use crate::error::{NotationError, SemanticError};
use crate::parse::Segment;
use serde::Serialize;
use std::fmt::{self, Write};
use std::str::FromStr;

/// A validated description of what to roll.
///
/// Values are only produced by [`DiceBuilder::build`] (directly or through the
/// parser), so every `DiceExpression` satisfies its invariants:
///
/// - `1 <= count <= max_dice`, `sides >= 2`
/// - `|modifier| <= MAX_MODIFIER`
/// - `drop_lowest < count`, `drop_highest < count` and
///   `drop_lowest + drop_highest <= count`
/// - advantage/disadvantage only on a single die
/// - every reroll face lies in `1..=sides`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiceExpression {
    count: UInt,
    sides: NonZeroUInt,
    modifier: Int,
    drop_lowest: UInt,
    drop_highest: UInt,
    exploding: bool,
    reroll: Vec<UInt>,
    advantage: AdvType,
}

impl DiceExpression {
    pub const DEFAULT_MAX_DICE: UInt = 1000;
    /// Largest modifier magnitude accepted in either direction.
    pub const MAX_MODIFIER: Int = i32::MAX as Int;

    pub fn builder(count: UInt, sides: UInt) -> DiceBuilder {
        DiceBuilder::new(count, sides)
    }

    pub fn count(&self) -> UInt {
        self.count
    }

    pub fn sides(&self) -> UInt {
        self.sides.get()
    }

    pub(crate) fn nonzero_sides(&self) -> NonZeroUInt {
        self.sides
    }

    pub fn modifier(&self) -> Int {
        self.modifier
    }

    pub fn drop_lowest(&self) -> UInt {
        self.drop_lowest
    }

    pub fn drop_highest(&self) -> UInt {
        self.drop_highest
    }

    pub fn exploding(&self) -> bool {
        self.exploding
    }

    /// Faces that are rerolled once, ascending and without duplicates.
    pub fn reroll(&self) -> &[UInt] {
        &self.reroll
    }

    pub fn advantage(&self) -> AdvType {
        self.advantage
    }

    /// Returns a copy of this expression rolled with (dis)advantage.
    pub fn with_advantage(&self, advantage: AdvType) -> Result<Self, SemanticError> {
        self.to_builder().advantage(advantage).build()
    }

    /// Returns a copy of this expression with `extra` added to its modifier.
    pub fn with_extra_modifier(&self, extra: Int) -> Result<Self, SemanticError> {
        let modifier = self.modifier.saturating_add(extra);
        self.to_builder().modifier(modifier).build()
    }

    /// True when the total is a plain sum of uniform dice plus the modifier.
    pub fn is_simple(&self) -> bool {
        !self.exploding
            && self.drop_lowest == 0
            && self.drop_highest == 0
            && self.reroll.is_empty()
            && self.advantage == AdvType::None
    }

    fn to_builder(&self) -> DiceBuilder {
        DiceBuilder {
            count: self.count,
            sides: self.sides.get(),
            modifier: self.modifier,
            drop_lowest: self.drop_lowest,
            drop_highest: self.drop_highest,
            exploding: self.exploding,
            reroll: self.reroll.clone(),
            advantage: self.advantage,
            max_dice: UInt::MAX,
        }
    }
}

/// Canonical notation: `{count}d{sides}{±modifier}{dlN}{dhN}{!}{rA,B}`.
///
/// Advantage is not part of the notation and is not written.
impl fmt::Display for DiceExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;
        if self.modifier > 0 {
            write!(f, "+{}", self.modifier)?;
        } else if self.modifier < 0 {
            write!(f, "{}", self.modifier)?;
        }
        if self.drop_lowest > 0 {
            write!(f, "dl{}", self.drop_lowest)?;
        }
        if self.drop_highest > 0 {
            write!(f, "dh{}", self.drop_highest)?;
        }
        if self.exploding {
            f.write_char('!')?;
        }
        if let Some((first, rest)) = self.reroll.split_first() {
            write!(f, "r{}", first)?;
            for face in rest {
                write!(f, ",{}", face)?;
            }
        }
        Ok(())
    }
}

impl FromStr for DiceExpression {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse::parse(s)
    }
}

#[derive(Debug, Clone)]
pub struct DiceBuilder {
    count: UInt,
    sides: UInt,
    modifier: Int,
    drop_lowest: UInt,
    drop_highest: UInt,
    exploding: bool,
    reroll: Vec<UInt>,
    advantage: AdvType,
    max_dice: UInt,
}

impl DiceBuilder {
    pub fn new(count: UInt, sides: UInt) -> Self {
        Self {
            count,
            sides,
            modifier: 0,
            drop_lowest: 0,
            drop_highest: 0,
            exploding: false,
            reroll: Vec::new(),
            advantage: AdvType::None,
            max_dice: DiceExpression::DEFAULT_MAX_DICE,
        }
    }

    pub fn modifier(mut self, modifier: Int) -> Self {
        self.modifier = modifier;
        self
    }

    pub fn drop_lowest(mut self, n: UInt) -> Self {
        self.drop_lowest = n;
        self
    }

    pub fn drop_highest(mut self, n: UInt) -> Self {
        self.drop_highest = n;
        self
    }

    pub fn exploding(mut self, exploding: bool) -> Self {
        self.exploding = exploding;
        self
    }

    pub fn reroll(mut self, faces: impl IntoIterator<Item = UInt>) -> Self {
        self.reroll = faces.into_iter().collect();
        self
    }

    pub fn advantage(mut self, advantage: AdvType) -> Self {
        self.advantage = advantage;
        self
    }

    pub fn max_dice(mut self, max_dice: UInt) -> Self {
        self.max_dice = max_dice;
        self
    }

    /// Checks every invariant and freezes the expression.
    ///
    /// # Errors
    /// Returns the first [`SemanticError`] found, checking the dice count,
    /// then the sides, modifier, drops, advantage and finally the reroll faces.
    pub fn build(mut self) -> Result<DiceExpression, SemanticError> {
        let count = self.count;
        if count == 0 {
            return Err(SemanticError::ZeroDice);
        }
        if count > self.max_dice {
            return Err(SemanticError::TooManyDice {
                count,
                max: self.max_dice,
            });
        }

        let sides = match NonZeroUInt::new(self.sides) {
            Some(sides) if sides.get() >= 2 => sides,
            _ => return Err(SemanticError::TooFewSides(self.sides)),
        };

        let max = DiceExpression::MAX_MODIFIER;
        if !(-max..=max).contains(&self.modifier) {
            return Err(SemanticError::ModifierOutOfRange {
                modifier: self.modifier,
                max,
            });
        }

        for (segment, n) in [
            (Segment::DropLowest, self.drop_lowest),
            (Segment::DropHighest, self.drop_highest),
        ] {
            if n >= count {
                return Err(SemanticError::DropTooMany { segment, n, count });
            }
        }
        if u64::from(self.drop_lowest) + u64::from(self.drop_highest) > u64::from(count) {
            return Err(SemanticError::DropExceedsPool {
                lowest: self.drop_lowest,
                highest: self.drop_highest,
                count,
            });
        }

        if self.advantage != AdvType::None && count != 1 {
            return Err(SemanticError::AdvantageOnPool { count });
        }

        self.reroll.sort_unstable();
        self.reroll.dedup();
        if let Some(&value) = self.reroll.iter().find(|&&v| v == 0 || v > sides.get()) {
            return Err(SemanticError::RerollOutOfRange {
                value,
                sides: sides.get(),
            });
        }

        Ok(DiceExpression {
            count,
            sides,
            modifier: self.modifier,
            drop_lowest: self.drop_lowest,
            drop_highest: self.drop_highest,
            exploding: self.exploding,
            reroll: self.reroll,
            advantage: self.advantage,
        })
    }
}

impl AdvType {
    /// Combines the two command-line switches into a single flag.
    pub fn from_flags(advantage: bool, disadvantage: bool) -> Result<Self, SemanticError> {
        match (advantage, disadvantage) {
            (true, true) => Err(SemanticError::ConflictingAdvantage),
            (true, false) => Ok(Self::Advantage),
            (false, true) => Ok(Self::Disadvantage),
            (false, false) => Ok(Self::None),
        }
    }
}
