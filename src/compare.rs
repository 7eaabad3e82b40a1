use crate::common::Float;
use crate::config::RollConfig;
use crate::error::ValidationError;
use crate::expr::DiceExpression;
use crate::roll::{RollContext, Roller};
use crate::sim;
use serde::Serialize;
use std::cmp::Ordering;

/// Win/lose/tie tally of two expressions rolled against each other.
///
/// `first_wins + second_wins + ties == trials` always holds.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub trials: usize,
    pub first_wins: usize,
    pub second_wins: usize,
    pub ties: usize,
}

impl ComparisonResult {
    fn record(&mut self, ordering: Ordering) {
        self.trials += 1;
        match ordering {
            Ordering::Greater => self.first_wins += 1,
            Ordering::Less => self.second_wins += 1,
            Ordering::Equal => self.ties += 1,
        }
    }

    fn merge(&mut self, other: Self) {
        self.trials += other.trials;
        self.first_wins += other.first_wins;
        self.second_wins += other.second_wins;
        self.ties += other.ties;
    }

    fn rate(&self, n: usize) -> Float {
        if self.trials == 0 {
            0.0
        } else {
            n as Float / self.trials as Float
        }
    }

    pub fn first_win_rate(&self) -> Float {
        self.rate(self.first_wins)
    }

    pub fn second_win_rate(&self) -> Float {
        self.rate(self.second_wins)
    }

    pub fn tie_rate(&self) -> Float {
        self.rate(self.ties)
    }

    /// Percentage of decided rounds won by each side, ignoring ties.
    /// Both are 0 when every round tied.
    pub fn decisive_percentages(&self) -> (Float, Float) {
        let decided = self.first_wins + self.second_wins;
        if decided == 0 {
            return (0.0, 0.0);
        }
        let decided = decided as Float;
        (
            self.first_wins as Float / decided * 100.0,
            self.second_wins as Float / decided * 100.0,
        )
    }
}

impl<R: Roller> RollContext<R> {
    /// Rolls `first` then `second` once per round for `trials` rounds and
    /// tallies which total was higher.
    pub fn compare(
        &mut self,
        first: &DiceExpression,
        second: &DiceExpression,
        trials: usize,
    ) -> Result<ComparisonResult, ValidationError> {
        ValidationError::check_trials(trials)?;
        tracing::debug!(%first, %second, trials, "comparing");

        let result = self.tally(first, second, trials);
        tracing::debug!(
            first_wins = result.first_wins,
            second_wins = result.second_wins,
            ties = result.ties,
            "compared"
        );
        Ok(result)
    }

    fn tally(
        &mut self,
        first: &DiceExpression,
        second: &DiceExpression,
        trials: usize,
    ) -> ComparisonResult {
        let mut result = ComparisonResult::default();
        for _ in 0..trials {
            let a = self.eval(first).total();
            let b = self.eval(second).total();
            result.record(a.cmp(&b));
        }
        result
    }
}

/// Like [`RollContext::compare`], but spread over `config.workers` threads,
/// each with its own generator derived from `seed`.
pub fn compare_parallel(
    first: &DiceExpression,
    second: &DiceExpression,
    config: &RollConfig,
    seed: u64,
    trials: usize,
) -> Result<ComparisonResult, ValidationError> {
    ValidationError::check_trials(trials)?;
    if config.workers == 0 {
        return Err(ValidationError::ZeroWorkers);
    }

    let shares = sim::plan(seed, trials, config.workers);
    tracing::debug!(%first, %second, trials, workers = shares.len(), "comparing in parallel");

    let parts = sim::run(&shares, |rng, n| {
        RollContext::with_config(config, rng).tally(first, second, n)
    });

    let mut result = ComparisonResult::default();
    for part in parts {
        result.merge(part);
    }
    Ok(result)
}
