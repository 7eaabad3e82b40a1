use super::{roller::Roller, tree::*};
use crate::common::*;
use crate::config::RollConfig;
use crate::expr::DiceExpression;

pub type DefaultRoller = rand::prelude::ThreadRng;

/// Evaluates [`DiceExpression`]s against a [`Roller`].
pub struct RollContext<R = DefaultRoller> {
    explosion_cap: usize,
    roller: R,
}

impl<R: Roller> RollContext<R> {
    pub fn new(explosion_cap: usize, roller: R) -> Self {
        Self {
            explosion_cap,
            roller,
        }
    }

    pub fn with_config(config: &RollConfig, roller: R) -> Self {
        Self::new(config.explosion_cap, roller)
    }

    pub fn explosion_cap(&self) -> usize {
        self.explosion_cap
    }

    pub fn roller_mut(&mut self) -> &mut R {
        &mut self.roller
    }

    pub fn into_roller(self) -> R {
        self.roller
    }

    fn roll(&mut self, num: usize, sides: NonZeroUInt) -> impl Iterator<Item = UInt> + '_ {
        self.roller.roll_iter(num, sides)
    }

    fn roll_one(&mut self, sides: NonZeroUInt) -> UInt {
        self.roller.roll(sides)
    }

    /// Rolls `expr` once.
    ///
    /// The steps always run in the same order, so a scripted or seeded roller
    /// sees the same sequence of draws:
    ///
    /// 1. roll the base dice (two candidates under advantage or disadvantage),
    ///    reroll any listed faces once, then keep the winning candidate
    /// 2. explode every kept die that shows its highest face
    /// 3. drop the lowest and highest chains
    /// 4. sum the kept chains and add the modifier
    pub fn eval<'a>(&mut self, expr: &'a DiceExpression) -> RollResult<'a> {
        let sides = expr.nonzero_sides();
        let num = expr
            .advantage()
            .candidates()
            .unwrap_or(expr.count() as usize);

        let mut dice: Vec<Die> = self.roll(num, sides).map(Die::new).collect();
        self.reroll(expr.reroll(), sides, &mut dice);
        select_candidate(expr.advantage(), &mut dice);

        if expr.exploding() {
            for die in dice.iter_mut().filter(|die| die.kept()) {
                self.explode(sides, die);
            }
        }

        drop_extremes(
            expr.drop_lowest() as usize,
            expr.drop_highest() as usize,
            &mut dice,
        );

        let result = RollResult::new(expr, dice);
        tracing::trace!(notation = %expr, total = result.total(), "rolled");
        result
    }

    /// Rolls `expr` `count` times in sequence.
    pub fn eval_many<'a>(&mut self, expr: &'a DiceExpression, count: usize) -> Vec<RollResult<'a>> {
        (0..count).map(|_| self.eval(expr)).collect()
    }

    fn reroll(&mut self, faces: &[UInt], sides: NonZeroUInt, dice: &mut [Die]) {
        if faces.is_empty() {
            return;
        }
        for die in dice {
            if faces.binary_search(&die.value()).is_ok() {
                let value = self.roll_one(sides);
                die.reroll(value);
            }
        }
    }

    fn explode(&mut self, sides: NonZeroUInt, die: &mut Die) {
        while die.value() == sides.get() {
            if die.explosions() >= self.explosion_cap {
                tracing::debug!(
                    sides = sides.get(),
                    cap = self.explosion_cap,
                    "explosion chain reached its cap"
                );
                break;
            }
            let value = self.roll_one(sides);
            die.explode(value);
        }
    }
}

impl Default for RollContext {
    fn default() -> Self {
        Self::with_config(&RollConfig::default(), rand::thread_rng())
    }
}

/// Discards every candidate but the highest (advantage) or lowest (disadvantage).
/// Ties go to the candidate rolled first.
fn select_candidate(advantage: AdvType, dice: &mut [Die]) {
    let winner = match advantage {
        AdvType::None => return,
        AdvType::Advantage => dice
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, die)| die.value())
            .map(|(i, _)| i),
        AdvType::Disadvantage => dice
            .iter()
            .enumerate()
            .min_by_key(|(_, die)| die.value())
            .map(|(i, _)| i),
    };

    for (i, die) in dice.iter_mut().enumerate() {
        if Some(i) != winner {
            die.discard();
        }
    }
}

fn drop_extremes(lowest: usize, highest: usize, dice: &mut [Die]) {
    if lowest == 0 && highest == 0 {
        return;
    }

    let mut order: Vec<usize> = (0..dice.len()).filter(|&i| dice[i].kept()).collect();
    order.sort_by_key(|&i| dice[i].chain_total());

    let len = order.len();
    let lowest = lowest.min(len);
    let highest = highest.min(len - lowest);
    for &i in order[..lowest].iter().chain(&order[len - highest..]) {
        dice[i].drop();
    }
}
