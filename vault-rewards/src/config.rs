//! Configuration for the rewards engine.

use serde::{Deserialize, Serialize};

use crate::projector::{Annualization, BoostApplication, RewardProjector, DEFAULT_REWARD_PERIOD_DAYS};
use crate::token::Erc20Token;
use crate::voting_power::{VotingPowerModel, DEFAULT_MAX_LOCK_DAYS};

/// Error types for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// YAML could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Values parsed but are unusable
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    /// Voting escrow settings
    pub voting: VotingConfig,
    /// Yield projection settings
    pub projection: ProjectionConfig,
    /// Token roles
    pub tokens: TokenConfig,
}

impl RewardsConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.voting.max_lock_days == 0 {
            return Err(ConfigError::Invalid(
                "voting.max_lock_days must be positive".to_string(),
            ));
        }
        if self.projection.reward_period_days == 0 {
            return Err(ConfigError::Invalid(
                "projection.reward_period_days must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn voting_power_model(&self) -> VotingPowerModel {
        VotingPowerModel::new(self.voting.max_lock_days)
    }

    pub fn reward_projector(&self) -> RewardProjector {
        RewardProjector::new(
            self.projection.reward_period_days,
            self.projection.annualization,
            self.projection.boost_application,
        )
    }
}

/// Voting escrow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Lock length that grants full voting power
    pub max_lock_days: u32,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            max_lock_days: DEFAULT_MAX_LOCK_DAYS,
        }
    }
}

/// Yield projection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Length of the period `pool_reward_for_duration` covers
    pub reward_period_days: u32,
    /// How period rates are annualized
    pub annualization: Annualization,
    /// Which part of the base rate the boost scales.
    ///
    /// Under `whole_base_rate` the boosted rate is already the full yield,
    /// so a display shows the same figure for boosted rewards and total
    /// APY. Use `increment_over_base` to show base and boost as separate
    /// parts that add up to the total.
    pub boost_application: BoostApplication,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            reward_period_days: DEFAULT_REWARD_PERIOD_DAYS,
            annualization: Annualization::Simple,
            boost_application: BoostApplication::WholeBaseRate,
        }
    }
}

/// Which tokens play which role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Token locked for voting power
    pub governance_token: Erc20Token,
    /// Token gauges emit
    pub reward_token: Erc20Token,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            governance_token: Erc20Token::Rbn,
            reward_token: Erc20Token::Rbn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RewardsConfig::default();
        assert_eq!(config.voting.max_lock_days, 1460);
        assert_eq!(config.projection.reward_period_days, 7);
        assert_eq!(config.projection.boost_application, BoostApplication::WholeBaseRate);
        assert_eq!(config.tokens.governance_token.decimals(), 18);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
voting:
  max_lock_days: 730
projection:
  boost_application: increment_over_base
"#;
        let config = RewardsConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.voting.max_lock_days, 730);
        assert_eq!(config.projection.reward_period_days, 7);
        assert_eq!(config.projection.annualization, Annualization::Simple);
        assert_eq!(
            config.projection.boost_application,
            BoostApplication::IncrementOverBase
        );
        assert_eq!(config.voting_power_model().max_lock_days(), 730);
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = RewardsConfig::default();
        config.projection.annualization = Annualization::Compound;
        config.tokens.reward_token = Erc20Token::Weth;

        let yaml = config.to_yaml().unwrap();
        assert_eq!(RewardsConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_rejects_zero_lengths() {
        let err = RewardsConfig::from_yaml("voting:\n  max_lock_days: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = RewardsConfig::from_yaml("projection:\n  reward_period_days: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_boost_application_reaches_projector() {
        let config = RewardsConfig::from_yaml("projection:\n  boost_application: increment_over_base\n").unwrap();
        assert_eq!(
            config.reward_projector().boost_application(),
            BoostApplication::IncrementOverBase
        );
        assert_eq!(
            RewardsConfig::default().reward_projector().boost_application(),
            BoostApplication::WholeBaseRate
        );
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = RewardsConfig::from_yaml("projection:\n  boost_application: sometimes\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
