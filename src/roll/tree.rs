use crate::common::*;
use crate::expr::DiceExpression;
use serde::Serialize;
use std::fmt;

/// Why a physical roll does or does not count toward the total.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Kept,
    Dropped,
    /// An extra roll added to a die that landed on its highest face.
    Exploded,
    /// The losing candidate of an advantage or disadvantage roll.
    Discarded,
    /// A face that was replaced by a reroll.
    Rerolled,
}

impl Provenance {
    pub const fn counts(self) -> bool {
        matches!(self, Self::Kept | Self::Exploded)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Kept => "kept",
            Self::Dropped => "dropped",
            Self::Exploded => "exploded",
            Self::Discarded => "discarded",
            Self::Rerolled => "rerolled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct RawRoll {
    pub value: UInt,
    pub provenance: Provenance,
}

impl RawRoll {
    fn new(value: UInt, provenance: Provenance) -> Self {
        Self { value, provenance }
    }
}

/// One base die and every roll chained onto it (rerolls and explosions), in draw order.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Die {
    pub rolls: NonEmpty<RawRoll>,
}

impl Die {
    pub(crate) fn new(value: UInt) -> Self {
        Self {
            rolls: vec1![RawRoll::new(value, Provenance::Kept)],
        }
    }

    /// The face currently showing.
    pub fn value(&self) -> UInt {
        self.rolls.last().value
    }

    pub fn kept(&self) -> bool {
        self.rolls.last().provenance.counts()
    }

    /// Number of explosion rolls chained onto this die.
    pub fn explosions(&self) -> usize {
        self.rolls
            .iter()
            .filter(|r| r.provenance == Provenance::Exploded)
            .count()
    }

    /// Sum of this die's chain, whether or not the die is kept.
    pub fn chain_total(&self) -> Int {
        self.rolls
            .iter()
            .filter(|r| r.provenance != Provenance::Rerolled)
            .map(|r| Int::from(r.value))
            .sum()
    }

    /// What this die adds to the total.
    pub fn contribution(&self) -> Int {
        if self.kept() {
            self.chain_total()
        } else {
            0
        }
    }

    pub(crate) fn reroll(&mut self, value: UInt) {
        self.rolls.last_mut().provenance = Provenance::Rerolled;
        self.rolls.push(RawRoll::new(value, Provenance::Kept));
    }

    pub(crate) fn explode(&mut self, value: UInt) {
        self.rolls.push(RawRoll::new(value, Provenance::Exploded));
    }

    pub(crate) fn drop(&mut self) {
        self.mark(Provenance::Dropped);
    }

    pub(crate) fn discard(&mut self) {
        self.mark(Provenance::Discarded);
    }

    fn mark(&mut self, provenance: Provenance) {
        for roll in self.rolls.iter_mut() {
            if roll.provenance != Provenance::Rerolled {
                roll.provenance = provenance;
            }
        }
    }
}

/// The outcome of evaluating a [`DiceExpression`] once.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct RollResult<'a> {
    #[serde(serialize_with = "serialize_notation")]
    pub(crate) expression: &'a DiceExpression,
    pub(crate) dice: Vec<Die>,
    pub(crate) total: Int,
}

impl<'a> RollResult<'a> {
    pub(crate) fn new(expression: &'a DiceExpression, dice: Vec<Die>) -> Self {
        let kept: Int = dice.iter().map(Die::contribution).sum();
        Self {
            expression,
            dice,
            total: kept + expression.modifier(),
        }
    }

    pub fn expression(&self) -> &'a DiceExpression {
        self.expression
    }

    pub fn total(&self) -> Int {
        self.total
    }

    /// Every die rolled, including discarded advantage candidates.
    pub fn dice(&self) -> &[Die] {
        &self.dice
    }

    /// Every physical roll, grouped by die in roll order.
    pub fn raw_rolls(&self) -> impl Iterator<Item = &RawRoll> + '_ {
        self.dice.iter().flat_map(|die| die.rolls.iter())
    }

    /// Sum of the kept dice before the modifier.
    pub fn kept_sum(&self) -> Int {
        self.total - self.expression.modifier()
    }
}

fn serialize_notation<S: serde::Serializer>(
    expr: &&DiceExpression,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(*expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_die_chain() {
        let mut die = Die::new(6);
        die.explode(6);
        die.explode(3);
        assert_eq!(die.value(), 3);
        assert_eq!(die.explosions(), 2);
        assert_eq!(die.contribution(), 15);
        assert!(die.kept());
    }

    #[test]
    fn test_die_reroll_keeps_history() {
        let mut die = Die::new(1);
        die.reroll(4);
        assert_eq!(die.value(), 4);
        assert_eq!(die.contribution(), 4);
        assert_eq!(
            die.rolls.iter().map(|r| r.provenance).collect::<Vec<_>>(),
            vec![Provenance::Rerolled, Provenance::Kept]
        );
    }

    #[test]
    fn test_die_drop_marks_chain() {
        let mut die = Die::new(1);
        die.reroll(6);
        die.explode(2);
        die.drop();
        assert!(!die.kept());
        assert_eq!(die.contribution(), 0);
        assert_eq!(die.chain_total(), 8);
        assert_eq!(
            die.rolls.iter().map(|r| r.provenance).collect::<Vec<_>>(),
            vec![
                Provenance::Rerolled,
                Provenance::Dropped,
                Provenance::Dropped
            ]
        );
    }

    #[test]
    fn test_result_total() {
        let expr = DiceExpression::builder(2, 6).modifier(3).build().unwrap();
        let result = RollResult::new(&expr, vec![Die::new(4), Die::new(5)]);
        assert_eq!(result.total(), 12);
        assert_eq!(result.kept_sum(), 9);
        assert_eq!(
            result.raw_rolls().map(|r| r.value).collect::<Vec<_>>(),
            vec![4, 5]
        );
    }
}
