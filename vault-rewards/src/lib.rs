//! Governance-Boosted Vault Rewards
//!
//! This crate projects staking yield for vault gauges and merges vault
//! positions held across contract versions:
//!
//! - **Voting power**: locked governance tokens decay linearly with remaining lock time
//! - **Boost**: voting power lifts a stake's working balance, up to 2.5x
//! - **Projection**: pool emissions and prices become base and boosted APY
//! - **Aggregation**: v1, v2 and earn records for one vault sum into one position
//!
//! Token quantities never leave exact fixed-point arithmetic until they are
//! turned into display figures.
//!
//! # Key Components
//!
//! - [`FixedPointAmount`]: Exact token amount tagged with its decimal scale
//! - [`VotingPowerModel`]: Converts a lock into an escrow balance
//! - [`BoostCalculator`]: Boost multiplier for a hypothetical stake and lock
//! - [`RewardProjector`]: Base and boosted yearly yield
//! - [`merge_across_versions`]: Cross-version position totals
//! - [`SnapshotLoader`]: Resolves inputs from the data sources
//! - [`RewardsCalculator`]: Free-text calculator inputs to display strings
//!
//! # Example
//!
//! ```ignore
//! use vault_rewards::{RewardsCalculator, RewardsConfig, SnapshotLoader};
//!
//! let config = RewardsConfig::from_yaml(&yaml)?;
//! let loader = SnapshotLoader::from_config(market_data, &config);
//! let snapshot = loader.load_rewards_snapshot("rETH-THETA").await?;
//!
//! let calculator = RewardsCalculator::new(config);
//! let shown = calculator.display(snapshot.as_ref(), &inputs);
//! ```

pub mod aggregator;
pub mod amount;
pub mod boost;
pub mod calculator;
pub mod config;
pub mod loader;
pub mod projector;
pub mod sources;
pub mod token;
pub mod types;
pub mod voting_power;

// Re-export main types
pub use aggregator::{
    merge_across_versions, AccountBook, AggregatedVaultAccount, AggregationError,
    VaultAccountRecord, VaultVersion, VersionedAccounts,
};
pub use amount::{AmountError, FixedPointAmount, ParseAmountError};
pub use boost::{BoostCalculator, BoostInputs, BoostMultiplier, BoostRatio, BoostRatioOutOfRange};
pub use calculator::{sanitize_input, CalculatorError, CalculatorInputs, RewardsCalculator, RewardsDisplay};
pub use config::{ConfigError, RewardsConfig};
pub use loader::SnapshotLoader;
pub use projector::{Annualization, BaseRewardInputs, BoostApplication, RewardProjector, RewardsProjection};
pub use sources::{
    GaugeDataSource, PriceSource, SourceError, StaticMarketData, VaultAccountSource,
    VaultDataSource, VotingEscrowSource,
};
pub use token::Erc20Token;
pub use types::*;
pub use voting_power::{LockPosition, LockupPeriod, VotingPowerModel};
