use crate::common::UInt;
use crate::error::ValidationError;
use crate::expr::DiceExpression;
use serde::{Deserialize, Serialize};

/// Tunables shared by the evaluator and the simulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RollConfig {
    /// Extra rolls allowed per exploding die before its chain stops.
    pub explosion_cap: usize,
    /// Largest dice count accepted by the parser.
    pub max_dice: UInt,
    /// Threads used by the parallel simulators.
    pub workers: usize,
    /// Trials used for statistics when none are requested explicitly.
    pub stats_trials: usize,
    /// Trials used for comparisons when none are requested explicitly.
    pub compare_trials: usize,
}

impl RollConfig {
    pub const DEFAULT_EXPLOSION_CAP: usize = 100;

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.workers == 0 {
            return Err(ValidationError::ZeroWorkers);
        }
        ValidationError::check_trials(self.stats_trials)?;
        ValidationError::check_trials(self.compare_trials)
    }
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            explosion_cap: Self::DEFAULT_EXPLOSION_CAP,
            max_dice: DiceExpression::DEFAULT_MAX_DICE,
            workers: 1,
            stats_trials: 10_000,
            compare_trials: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: RollConfig = serde_json::from_str(r#"{ "workers": 4 }"#).unwrap();
        assert_eq!(config.workers, 4);
        assert_eq!(config.explosion_cap, 100);
        assert_eq!(config.stats_trials, 10_000);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<RollConfig>(r#"{ "worker": 4 }"#).is_err());
    }

    #[test]
    fn test_validate() {
        assert_eq!(RollConfig::default().validate(), Ok(()));
        let config = RollConfig {
            workers: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroWorkers));
        let config = RollConfig {
            stats_trials: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::ZeroTrials));
    }
}
