use anyhow::{Context, Result};
use clap::Parser;
use dice_notation::error::repeat_count;
use dice_notation::roll::{
    str_comparison, str_distribution, str_stats, SimpleStringifier, VerboseStringifier,
};
use dice_notation::{
    aggregate_parallel, compare_parallel, parse_with_limit, AdvType, DiceExpression, Distribution,
    RollConfig, RollContext, ValidationError,
};
use rand::{rngs::StdRng, RngCore, SeedableRng};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dice")]
#[command(about = "Roll dice notation such as 2d6+3, 4d6dl1, 1d20! or 2d6r1")]
struct Cli {
    /// Dice notation to roll
    notation: String,
    /// Repeat the roll this many times
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    count: i64,
    /// Roll a single die twice and keep the higher result
    #[arg(long)]
    advantage: bool,
    /// Roll a single die twice and keep the lower result
    #[arg(long)]
    disadvantage: bool,
    /// Simulate many rolls and report mean, min, max, stdev and a histogram
    #[arg(long, conflicts_with = "compare")]
    stats: bool,
    /// Roll against a second notation and tally wins, losses and ties
    #[arg(long, value_name = "NOTATION")]
    compare: Option<String>,
    /// Show every physical roll and why it did or did not count
    #[arg(short, long)]
    verbose: bool,
    /// Seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,
    /// Trials for --stats or --compare
    #[arg(long, allow_negative_numbers = true)]
    trials: Option<i64>,
    /// Worker threads for --stats or --compare
    #[arg(long)]
    workers: Option<usize>,
    /// Extra rolls allowed per exploding die
    #[arg(long)]
    explosion_cap: Option<usize>,
    /// JSON file with default settings
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn load_config(&self) -> Result<RollConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read config file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => RollConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(cap) = self.explosion_cap {
            config.explosion_cap = cap;
        }
        config.validate()?;
        Ok(config)
    }

    fn trials(&self, default: usize) -> Result<usize, ValidationError> {
        match self.trials {
            None => Ok(default),
            Some(n) => usize::try_from(n)
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ValidationError::ZeroTrials),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dice_notation=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            eprintln!("error: {:#}", why);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.load_config()?;
    let advantage = AdvType::from_flags(cli.advantage, cli.disadvantage)?;
    let expr = parse_with_limit(&cli.notation, config.max_dice)?.with_advantage(advantage)?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut ctx = RollContext::with_config(&config, rng);

    if let Some(other) = &cli.compare {
        let other = parse_with_limit(other, config.max_dice)?;
        let trials = cli.trials(config.compare_trials)?;
        return compare(&cli, &config, &mut ctx, &expr, &other, trials);
    }
    if cli.stats {
        let trials = cli.trials(config.stats_trials)?;
        return stats(&cli, &config, &mut ctx, &expr, trials);
    }

    let count = repeat_count(cli.count)?;
    let rolls = ctx.eval_many(&expr, count);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&rolls)?);
    } else {
        for roll in &rolls {
            let line = if cli.verbose {
                VerboseStringifier::new().stringify(roll)
            } else {
                SimpleStringifier::new().stringify(roll)
            };
            println!("{}", line);
        }
    }
    Ok(())
}

fn stats(
    cli: &Cli,
    config: &RollConfig,
    ctx: &mut RollContext<StdRng>,
    expr: &DiceExpression,
    trials: usize,
) -> Result<()> {
    let stats = if config.workers > 1 {
        let seed = ctx_seed(ctx);
        aggregate_parallel(expr, config, seed, trials)?
    } else {
        ctx.aggregate(expr, trials)?
    };
    let exact = Distribution::exact(expr);

    if cli.json {
        let out = serde_json::json!({
            "expression": expr.to_string(),
            "stats": stats,
            "exact": exact,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", expr);
        print!("{}", str_stats(&stats));
        if let Some(exact) = &exact {
            println!("{}", str_distribution(exact));
        }
    }
    Ok(())
}

fn compare(
    cli: &Cli,
    config: &RollConfig,
    ctx: &mut RollContext<StdRng>,
    first: &DiceExpression,
    second: &DiceExpression,
    trials: usize,
) -> Result<()> {
    let result = if config.workers > 1 {
        let seed = ctx_seed(ctx);
        compare_parallel(first, second, config, seed, trials)?
    } else {
        ctx.compare(first, second, trials)?
    };

    if cli.json {
        let out = serde_json::json!({
            "first": first.to_string(),
            "second": second.to_string(),
            "result": result,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", str_comparison(first, second, &result));
    }
    Ok(())
}

/// Master seed for the parallel simulators, drawn from the (possibly seeded) generator.
fn ctx_seed(ctx: &mut RollContext<StdRng>) -> u64 {
    ctx.roller_mut().next_u64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_notation::{NotationError, SemanticError};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dice").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_negative_count() {
        let err = run(cli(&["1d6", "--count", "-1"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NegativeCount(-1))
        );
    }

    #[test]
    fn test_bad_notation_names_token() {
        let err = run(cli(&["2x6"])).unwrap_err();
        match err.downcast_ref::<NotationError>() {
            Some(NotationError::Syntax(e)) => assert_eq!(e.slice, "x"),
            other => panic!("expected a syntax error, got {:?}", other),
        }
        assert!(format!("{:#}", err).contains("(\"x\")"), "{:#}", err);

        let err = run(cli(&["1d6", "--compare", "1d6dl"])).unwrap_err();
        assert!(err.downcast_ref::<NotationError>().is_some(), "{:#}", err);
    }

    #[test]
    fn test_conflicting_flags() {
        let err = run(cli(&["1d20", "--advantage", "--disadvantage"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemanticError>(),
            Some(&SemanticError::ConflictingAdvantage)
        );

        let err = run(cli(&["2d20", "--advantage"])).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemanticError>(),
            Some(&SemanticError::AdvantageOnPool { count: 2 })
        );

        assert!(Cli::try_parse_from(["dice", "1d6", "--stats", "--compare", "1d8"]).is_err());
    }

    #[test]
    fn test_trials() {
        assert_eq!(cli(&["1d6", "--stats"]).trials(250), Ok(250));
        assert_eq!(cli(&["1d6", "--stats", "--trials", "40"]).trials(250), Ok(40));
        for bad in ["0", "-5"] {
            assert_eq!(
                cli(&["1d6", "--stats", "--trials", bad]).trials(250),
                Err(ValidationError::ZeroTrials)
            );
        }
    }

    #[test]
    fn test_run_ok() {
        assert!(run(cli(&["4d6dl1", "--seed", "3", "--count", "2", "--verbose"])).is_ok());
        assert!(run(cli(&["2d6", "--seed", "3", "--stats", "--trials", "100", "--json"])).is_ok());
        assert!(run(cli(&["1d20", "--seed", "3", "--compare", "1d12", "--trials", "100"])).is_ok());
        assert!(run(cli(&["1d6", "--count", "0"])).is_ok());
    }
}
