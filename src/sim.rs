//! Splitting trial loops across scoped worker threads.

use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::thread;

/// A worker's share of a simulation: its RNG seed and how many trials it runs.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Share {
    pub seed: u64,
    pub trials: usize,
}

/// Derives one seed per worker from `seed` and spreads `trials` as evenly as
/// possible, earlier workers taking the remainder. Never yields an empty share.
pub(crate) fn plan(seed: u64, trials: usize, workers: usize) -> Vec<Share> {
    let workers = workers.min(trials).max(1);
    let mut master = StdRng::seed_from_u64(seed);
    let base = trials / workers;
    let extra = trials % workers;

    (0..workers)
        .map(|i| Share {
            seed: master.next_u64(),
            trials: base + usize::from(i < extra),
        })
        .collect()
}

/// Runs `work` once per share on its own thread and returns the outputs in share order.
pub(crate) fn run<T, F>(shares: &[Share], work: F) -> Vec<T>
where
    T: Send,
    F: Fn(StdRng, usize) -> T + Sync,
{
    if let [share] = shares {
        return vec![work(StdRng::seed_from_u64(share.seed), share.trials)];
    }

    thread::scope(|s| {
        let work = &work;
        let handles: Vec<_> = shares
            .iter()
            .map(|share| s.spawn(move || work(StdRng::seed_from_u64(share.seed), share.trials)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_spreads_remainder() {
        let shares = plan(7, 10, 3);
        let trials: Vec<_> = shares.iter().map(|s| s.trials).collect();
        assert_eq!(trials, vec![4, 3, 3]);
        assert_eq!(shares, plan(7, 10, 3));
    }

    #[test]
    fn test_plan_never_empty() {
        let shares = plan(1, 2, 8);
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|s| s.trials == 1));
    }

    #[test]
    fn test_run_keeps_order() {
        let shares = plan(3, 9, 3);
        let out = run(&shares, |_, n| n * 10);
        assert_eq!(out, vec![30, 30, 30]);
    }
}
