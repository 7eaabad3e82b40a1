use crate::common::*;
use crate::config::RollConfig;
use crate::error::ValidationError;
use crate::expr::DiceExpression;
use crate::roll::{RollContext, Roller};
use crate::sim;
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary of many simulated rolls of one expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub trials: usize,
    pub mean: Float,
    pub min: Int,
    pub max: Int,
    /// Population standard deviation of the observed totals.
    pub stdev: Float,
    pub histogram: BTreeMap<Int, u64>,
}

impl AggregateStats {
    /// The most frequent total; the smallest one when several tie.
    pub fn mode(&self) -> Int {
        let mut best = (self.min, 0);
        for (&total, &seen) in &self.histogram {
            if seen > best.1 {
                best = (total, seen);
            }
        }
        best.0
    }

    /// Observed frequency of each total.
    pub fn probabilities(&self) -> BTreeMap<Int, Float> {
        let trials = self.trials as Float;
        self.histogram
            .iter()
            .map(|(&total, &seen)| (total, seen as Float / trials))
            .collect()
    }
}

/// Running totals that can be filled independently and merged.
///
/// Mean and variance use Welford's update, and Chan's formula when merging,
/// so merging in a fixed order always produces the same bits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAccumulator {
    trials: usize,
    mean: Float,
    m2: Float,
    range: Option<(Int, Int)>,
    histogram: BTreeMap<Int, u64>,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, total: Int) {
        self.trials += 1;
        let x = total as Float;
        let delta = x - self.mean;
        self.mean += delta / self.trials as Float;
        self.m2 += delta * (x - self.mean);

        self.range = Some(match self.range {
            Some((min, max)) => (min.min(total), max.max(total)),
            None => (total, total),
        });
        *self.histogram.entry(total).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: Self) {
        if other.trials == 0 {
            return;
        }
        if self.trials == 0 {
            *self = other;
            return;
        }

        let (na, nb) = (self.trials as Float, other.trials as Float);
        let n = na + nb;
        let delta = other.mean - self.mean;
        self.mean += delta * nb / n;
        self.m2 += other.m2 + delta * delta * na * nb / n;
        self.trials += other.trials;

        if let (Some((min_a, max_a)), Some((min_b, max_b))) = (self.range, other.range) {
            self.range = Some((min_a.min(min_b), max_a.max(max_b)));
        }
        for (total, seen) in other.histogram {
            *self.histogram.entry(total).or_insert(0) += seen;
        }
    }

    /// Returns `None` if nothing was pushed.
    pub fn finish(self) -> Option<AggregateStats> {
        let (min, max) = self.range?;
        Some(AggregateStats {
            trials: self.trials,
            mean: self.mean,
            min,
            max,
            stdev: (self.m2 / self.trials as Float).sqrt(),
            histogram: self.histogram,
        })
    }
}

impl<R: Roller> RollContext<R> {
    /// Rolls `expr` `trials` times and summarises the totals.
    pub fn aggregate(
        &mut self,
        expr: &DiceExpression,
        trials: usize,
    ) -> Result<AggregateStats, ValidationError> {
        ValidationError::check_trials(trials)?;
        tracing::debug!(notation = %expr, trials, "aggregating");

        let acc = self.accumulate(expr, trials);
        let stats = acc.finish().ok_or(ValidationError::ZeroTrials)?;
        tracing::debug!(mean = stats.mean, stdev = stats.stdev, "aggregated");
        Ok(stats)
    }

    fn accumulate(&mut self, expr: &DiceExpression, trials: usize) -> StatsAccumulator {
        let mut acc = StatsAccumulator::new();
        for _ in 0..trials {
            acc.push(self.eval(expr).total());
        }
        acc
    }
}

/// Like [`RollContext::aggregate`], but spread over `config.workers` threads,
/// each with its own generator derived from `seed`.
///
/// The result depends only on `seed`, `trials` and `config.workers`.
pub fn aggregate_parallel(
    expr: &DiceExpression,
    config: &RollConfig,
    seed: u64,
    trials: usize,
) -> Result<AggregateStats, ValidationError> {
    ValidationError::check_trials(trials)?;
    if config.workers == 0 {
        return Err(ValidationError::ZeroWorkers);
    }

    let shares = sim::plan(seed, trials, config.workers);
    tracing::debug!(notation = %expr, trials, workers = shares.len(), "aggregating in parallel");

    let parts = sim::run(&shares, |rng, n| {
        RollContext::with_config(config, rng).accumulate(expr, n)
    });

    let mut acc = StatsAccumulator::new();
    for part in parts {
        acc.merge(part);
    }
    acc.finish().ok_or(ValidationError::ZeroTrials)
}

/// Exact distribution of a plain `XdY+Z` roll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub min: Int,
    pub max: Int,
    pub mean: Float,
    pub stdev: Float,
    pub most_likely: Int,
    pub probabilities: BTreeMap<Int, Float>,
}

impl Distribution {
    /// Upper bound on distinct totals computed exactly.
    pub const MAX_OUTCOMES: u64 = 100_000;

    /// Computes the distribution by convolving one die at a time.
    ///
    /// Returns `None` for expressions that explode, drop, reroll or use
    /// (dis)advantage, and for pools with more than [`Self::MAX_OUTCOMES`]
    /// possible totals.
    pub fn exact(expr: &DiceExpression) -> Option<Self> {
        if !expr.is_simple() {
            return None;
        }

        let count = u64::from(expr.count());
        let sides = u64::from(expr.sides());
        if count * (sides - 1) + 1 > Self::MAX_OUTCOMES {
            return None;
        }

        let sides = sides as usize;
        let p_face = 1.0 / sides as Float;
        // ways[k] is the probability of a kept sum of `k + dice rolled so far`
        let mut ways = vec![p_face; sides];
        for _ in 1..count {
            let mut next = vec![0.0; ways.len() + sides - 1];
            let mut window = 0.0;
            for (k, slot) in next.iter_mut().enumerate() {
                if let Some(&p) = ways.get(k) {
                    window += p;
                }
                if k >= sides {
                    window -= ways[k - sides];
                }
                *slot = window * p_face;
            }
            ways = next;
        }

        let count = expr.count() as Int;
        let modifier = expr.modifier();
        let min = count + modifier;
        let probabilities: BTreeMap<_, _> = ways
            .into_iter()
            .enumerate()
            .map(|(k, p)| (min + k as Int, p))
            .collect();

        let sides = sides as Float;
        let most_likely = if count == 1 {
            min
        } else {
            count * (sides as Int + 1) / 2 + modifier
        };

        Some(Self {
            min,
            max: count * sides as Int + modifier,
            mean: count as Float * (sides + 1.0) / 2.0 + modifier as Float,
            stdev: (count as Float * (sides * sides - 1.0) / 12.0).sqrt(),
            most_likely,
            probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::roller::SequenceRoller;
    use rand::{rngs::StdRng, SeedableRng};

    fn expr(s: &str) -> DiceExpression {
        crate::parse(s).unwrap()
    }

    fn close(a: Float, b: Float) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_accumulator_basic() {
        let mut acc = StatsAccumulator::new();
        for x in [2, 4, 4, 4, 5, 5, 7, 9] {
            acc.push(x);
        }
        let stats = acc.finish().unwrap();
        assert_eq!(stats.trials, 8);
        assert!(close(stats.mean, 5.0));
        assert!(close(stats.stdev, 2.0));
        assert_eq!((stats.min, stats.max), (2, 9));
        assert_eq!(stats.mode(), 4);
        assert_eq!(stats.histogram[&5], 2);
    }

    #[test]
    fn test_accumulator_merge_matches_sequential() {
        let values = [3, 8, 1, 12, 7, 7, 2, 10, 4];
        let mut whole = StatsAccumulator::new();
        values.iter().for_each(|&x| whole.push(x));

        let mut left = StatsAccumulator::new();
        let mut right = StatsAccumulator::new();
        values[..4].iter().for_each(|&x| left.push(x));
        values[4..].iter().for_each(|&x| right.push(x));
        left.merge(right);

        let (a, b) = (whole.finish().unwrap(), left.finish().unwrap());
        assert_eq!(a.histogram, b.histogram);
        assert_eq!((a.min, a.max, a.trials), (b.min, b.max, b.trials));
        assert!(close(a.mean, b.mean));
        assert!(close(a.stdev, b.stdev));
    }

    #[test]
    fn test_empty_accumulator() {
        assert_eq!(StatsAccumulator::new().finish(), None);
        let mut acc = StatsAccumulator::new();
        acc.merge(StatsAccumulator::new());
        assert_eq!(acc.finish(), None);
    }

    #[test]
    fn test_aggregate_scripted() {
        let expr = expr("1d6+1");
        let mut ctx = RollContext::new(100, SequenceRoller::new([1, 2, 3, 4, 5, 6]));
        let stats = ctx.aggregate(&expr, 6).unwrap();
        assert!(close(stats.mean, 4.5));
        assert_eq!((stats.min, stats.max), (2, 7));
        assert!(close(stats.stdev, (35.0f64 / 12.0).sqrt()));
        assert_eq!(stats.histogram.len(), 6);
    }

    #[test]
    fn test_aggregate_rejects_zero_trials() {
        let mut ctx = RollContext::new(100, StdRng::seed_from_u64(1));
        assert_eq!(
            ctx.aggregate(&expr("1d6"), 0),
            Err(ValidationError::ZeroTrials)
        );
    }

    #[test]
    fn test_aggregate_converges() {
        let mut ctx = RollContext::new(100, StdRng::seed_from_u64(42));
        let stats = ctx.aggregate(&expr("1d6"), 100_000).unwrap();
        assert!((stats.mean - 3.5).abs() < 0.05, "mean {}", stats.mean);
        assert_eq!((stats.min, stats.max), (1, 6));

        let stats = ctx.aggregate(&expr("2d6"), 100_000).unwrap();
        assert_eq!(stats.mode(), 7);
    }

    #[test]
    fn test_aggregate_seeded_is_reproducible() {
        let expr = expr("4d6dl1!");
        let run = || {
            RollContext::new(100, StdRng::seed_from_u64(99))
                .aggregate(&expr, 2_000)
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_aggregate_parallel() {
        let expr = expr("3d6");
        let config = RollConfig {
            workers: 4,
            ..Default::default()
        };
        let a = aggregate_parallel(&expr, &config, 5, 40_000).unwrap();
        let b = aggregate_parallel(&expr, &config, 5, 40_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.trials, 40_000);
        assert_eq!(a.histogram.values().sum::<u64>(), 40_000);
        assert!((a.mean - 10.5).abs() < 0.1);

        let config = RollConfig {
            workers: 0,
            ..Default::default()
        };
        assert_eq!(
            aggregate_parallel(&expr, &config, 5, 10),
            Err(ValidationError::ZeroWorkers)
        );
    }

    #[test]
    fn test_exact_distribution() {
        let dist = Distribution::exact(&expr("2d6")).unwrap();
        assert_eq!((dist.min, dist.max), (2, 12));
        assert_eq!(dist.most_likely, 7);
        assert!(close(dist.mean, 7.0));
        assert!(close(dist.probabilities[&7], 6.0 / 36.0));
        assert!(close(dist.probabilities[&2], 1.0 / 36.0));
        assert!(close(dist.probabilities.values().sum(), 1.0));

        let dist = Distribution::exact(&expr("3d6+2")).unwrap();
        assert_eq!(dist.most_likely, 12);
        assert!(close(dist.probabilities[&12], 27.0 / 216.0));
        assert!(close(dist.probabilities[&13], 27.0 / 216.0));

        let dist = Distribution::exact(&expr("1d20-1")).unwrap();
        assert_eq!((dist.min, dist.max, dist.most_likely), (0, 19, 0));
    }

    #[test]
    fn test_exact_distribution_unsupported() {
        assert!(Distribution::exact(&expr("4d6dl1")).is_none());
        assert!(Distribution::exact(&expr("1d6!")).is_none());
        assert!(Distribution::exact(&expr("1000d1000")).is_none());
    }

    #[test]
    fn test_exact_distribution_extreme_modifier() {
        let dist = Distribution::exact(&expr("2d6+2147483647")).unwrap();
        assert_eq!(dist.min, 2 + 2_147_483_647);
        assert_eq!(dist.max, 12 + 2_147_483_647);
        let dist = Distribution::exact(&expr("2d6-2147483647")).unwrap();
        assert_eq!(dist.min, 2 - 2_147_483_647);
    }
}
