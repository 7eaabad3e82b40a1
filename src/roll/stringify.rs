use super::tree::{Die, Provenance, RawRoll, RollResult};
use crate::common::AdvType;
use crate::compare::ComparisonResult;
use crate::expr::DiceExpression;
use crate::stats::{AggregateStats, Distribution};

pub trait Stringify {
    fn str_roll(&mut self, roll: &RollResult<'_>) -> String {
        let dice = roll
            .dice()
            .iter()
            .map(|die| self.str_die(die))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} [{}] = {}",
            self.str_expression(roll.expression()),
            dice,
            roll.total()
        )
    }

    fn str_expression(&mut self, expr: &DiceExpression) -> String {
        match expr.advantage() {
            AdvType::None => expr.to_string(),
            adv => format!("{} ({})", expr, adv),
        }
    }

    fn str_die(&mut self, die: &Die) -> String {
        die.rolls
            .iter()
            .map(|r| self.str_raw_roll(r))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn str_raw_roll(&mut self, roll: &RawRoll) -> String {
        roll.value.to_string()
    }
}

/// Renders `2d6+3 [4, 5] = 12`; dice that do not count are struck through with `~`.
#[derive(Default)]
pub struct SimpleStringifier;

impl SimpleStringifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stringify(&mut self, roll: &RollResult<'_>) -> String {
        self.str_roll(roll)
    }
}

impl Stringify for SimpleStringifier {
    fn str_die(&mut self, die: &Die) -> String {
        let total = die.chain_total().to_string();
        if die.kept() {
            total
        } else {
            format!("~{}~", total)
        }
    }
}

/// Renders every physical roll with its provenance, e.g.
/// `1d6! [6 6! 3!] = 15` or `4d6dl1 [1(dropped), 6, 6, 4] = 16`.
#[derive(Default)]
pub struct VerboseStringifier;

impl VerboseStringifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stringify(&mut self, roll: &RollResult<'_>) -> String {
        self.str_roll(roll)
    }
}

impl Stringify for VerboseStringifier {
    fn str_raw_roll(&mut self, roll: &RawRoll) -> String {
        match roll.provenance {
            Provenance::Kept => roll.value.to_string(),
            Provenance::Exploded => format!("{}!", roll.value),
            other => format!("{}({})", roll.value, other),
        }
    }
}

pub fn str_stats(stats: &AggregateStats) -> String {
    let mut out = format!(
        "trials: {}\nmean: {:.3}\nstdev: {:.3}\nmin: {}\nmax: {}\nmode: {}\n",
        stats.trials,
        stats.mean,
        stats.stdev,
        stats.min,
        stats.max,
        stats.mode()
    );
    for (total, p) in stats.probabilities() {
        out.push_str(&format!("{:>6} {:>7.3}%\n", total, p * 100.0));
    }
    out
}

pub fn str_distribution(dist: &Distribution) -> String {
    format!(
        "exact: mean {:.3}, stdev {:.3}, range {}..={}, most likely {}",
        dist.mean, dist.stdev, dist.min, dist.max, dist.most_likely
    )
}

pub fn str_comparison(
    first: &DiceExpression,
    second: &DiceExpression,
    result: &ComparisonResult,
) -> String {
    let (first_pct, second_pct) = result.decisive_percentages();
    format!(
        "{} vs {} over {} trials\n{}: {} wins ({:.1}%)\n{}: {} wins ({:.1}%)\nties: {}",
        first,
        second,
        result.trials,
        first,
        result.first_wins,
        first_pct,
        second,
        result.second_wins,
        second_pct,
        result.ties
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::roller::SequenceRoller;
    use crate::roll::RollContext;

    fn roll_with<'a>(expr: &'a DiceExpression, values: &[u32]) -> RollResult<'a> {
        RollContext::new(100, SequenceRoller::new(values)).eval(expr)
    }

    #[test]
    fn test_simple() {
        let expr = crate::parse("4d6dl1").unwrap();
        let roll = roll_with(&expr, &[1, 6, 6, 4]);
        assert_eq!(
            SimpleStringifier::new().stringify(&roll),
            "4d6dl1 [~1~, 6, 6, 4] = 16"
        );
    }

    #[test]
    fn test_verbose() {
        let expr = crate::parse("4d6dl1").unwrap();
        let roll = roll_with(&expr, &[1, 6, 6, 4]);
        assert_eq!(
            VerboseStringifier::new().stringify(&roll),
            "4d6dl1 [1(dropped), 6, 6, 4] = 16"
        );

        let expr = crate::parse("1d6!").unwrap();
        let roll = roll_with(&expr, &[6, 6, 3]);
        assert_eq!(
            VerboseStringifier::new().stringify(&roll),
            "1d6! [6 6! 3!] = 15"
        );
    }

    #[test]
    fn test_verbose_advantage() {
        let expr = crate::parse("1d20+2")
            .unwrap()
            .with_advantage(AdvType::Advantage)
            .unwrap();
        let roll = roll_with(&expr, &[14, 9]);
        assert_eq!(
            VerboseStringifier::new().stringify(&roll),
            "1d20+2 (advantage) [14, 9(discarded)] = 16"
        );
    }
}
