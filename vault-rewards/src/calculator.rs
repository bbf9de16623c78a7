//! Rewards calculator front end.
//!
//! Turns the user's free-text inputs (stake, pool size override, amount
//! locked, lockup period) plus a resolved [`RewardsSnapshot`] into a
//! projection and the strings a client shows for it.

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::{AmountError, FixedPointAmount, ParseAmountError};
use crate::boost::{BoostCalculator, BoostInputs};
use crate::config::RewardsConfig;
use crate::projector::{BaseRewardInputs, RewardProjector, RewardsProjection};
use crate::types::{Loadable, RewardsSnapshot};
use crate::voting_power::{LockupPeriod, VotingPowerModel};

/// Shown in place of a value while inputs are still resolving.
pub const LOADING_TEXT: &str = "Loading";

/// Shown in place of a value that cannot be computed.
pub const UNAVAILABLE_TEXT: &str = "---";

/// Error types for calculator operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculatorError {
    /// A user-entered field is not a valid amount
    #[error("Invalid {field}: {source}")]
    Input {
        field: &'static str,
        source: ParseAmountError,
    },

    /// Exact arithmetic failed
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Raw calculator form values, as typed.
///
/// Empty strings count as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct CalculatorInputs {
    /// Vault shares the user would stake
    pub stake: String,
    /// Pool size to assume; the gauge's current size when absent
    pub pool_size: Option<String>,
    /// Governance tokens the user would lock
    pub locked: String,
    pub lockup: LockupPeriod,
}

/// Formatted calculator output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RewardsDisplay {
    pub total_apy: String,
    pub base_rewards: String,
    pub boosted_rewards: String,
    pub rewards_booster: String,
}

impl RewardsDisplay {
    fn filled(text: &str) -> Self {
        Self {
            total_apy: text.to_string(),
            base_rewards: text.to_string(),
            boosted_rewards: text.to_string(),
            rewards_booster: text.to_string(),
        }
    }

    pub fn loading() -> Self {
        Self::filled(LOADING_TEXT)
    }

    pub fn unavailable() -> Self {
        Self::filled(UNAVAILABLE_TEXT)
    }

    pub fn from_projection(projection: &RewardsProjection) -> Self {
        Self {
            total_apy: format_percentage(projection.total_apy()),
            base_rewards: format_percentage(projection.base_apy),
            boosted_rewards: projection
                .boosted_apy
                .map(format_percentage)
                .unwrap_or_else(|| UNAVAILABLE_TEXT.to_string()),
            rewards_booster: projection.boost_multiplier.to_string(),
        }
    }
}

fn format_percentage(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value)
    } else {
        UNAVAILABLE_TEXT.to_string()
    }
}

/// Keep `input` only if it reads as a non-negative number.
///
/// Anything else clears the field. A leading numeric prefix is enough
/// (`"12abc"` is kept), so partially typed values like `"1."` survive.
pub fn sanitize_input(input: &str) -> String {
    match leading_number(input.trim_start()) {
        Some(value) if value >= 0.0 => input.to_string(),
        _ => String::new(),
    }
}

fn leading_number(input: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_point = false;
    for (i, c) in input.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    input[..end].parse().ok()
}

fn parse_field(
    field: &'static str,
    input: &str,
    scale: u8,
) -> Result<FixedPointAmount, CalculatorError> {
    if input.trim().is_empty() {
        return Ok(FixedPointAmount::zero(scale));
    }
    FixedPointAmount::parse(input, scale).map_err(|source| CalculatorError::Input { field, source })
}

/// Projects rewards for calculator inputs under one configuration.
#[derive(Debug, Clone)]
pub struct RewardsCalculator {
    config: RewardsConfig,
    voting: VotingPowerModel,
    projector: RewardProjector,
}

impl Default for RewardsCalculator {
    fn default() -> Self {
        Self::new(RewardsConfig::default())
    }
}

impl RewardsCalculator {
    pub fn new(config: RewardsConfig) -> Self {
        Self {
            voting: config.voting_power_model(),
            projector: config.reward_projector(),
            config,
        }
    }

    pub fn config(&self) -> &RewardsConfig {
        &self.config
    }

    /// Base and boosted yield for the hypothetical stake and lock.
    ///
    /// The stake joins the pool: both the boost and the base rate see
    /// `pool_size + stake` as the pool's liquidity.
    pub fn project(
        &self,
        inputs: &CalculatorInputs,
        snapshot: &RewardsSnapshot,
    ) -> Result<RewardsProjection, CalculatorError> {
        let share_scale = snapshot.vault.decimals;
        let governance_scale = self.config.tokens.governance_token.decimals();

        let stake = parse_field("stake", &inputs.stake, share_scale)?;
        let pool_size = match inputs.pool_size.as_deref() {
            Some(pool) => parse_field("pool size", pool, share_scale)?,
            None => snapshot.gauge.pool_size,
        };
        let locked = parse_field("locked amount", &inputs.locked, governance_scale)?;

        let liquidity = pool_size.checked_add(&stake)?;
        let escrow = self
            .voting
            .escrow_for_duration(&locked, inputs.lockup.duration());

        let multiplier = BoostCalculator::compute_boost_multiplier(&BoostInputs {
            gauge_balance: stake,
            pool_liquidity: liquidity,
            ve_token_amount: escrow,
            total_ve_token: snapshot.total_ve_supply,
            working_balance: snapshot.gauge.working_balance,
            working_supply: snapshot.gauge.working_supply,
        })?;

        let projection = self.projector.project(
            &BaseRewardInputs {
                pool_size: liquidity,
                pool_reward_for_duration: snapshot.gauge.pool_reward_for_duration,
                price_per_share: snapshot.vault.price_per_share,
                asset_price: snapshot.asset_price,
                reward_token_price: snapshot.reward_token_price,
            },
            multiplier,
        )?;

        debug!(
            stake = %stake,
            liquidity = %liquidity,
            escrow = %escrow,
            lockup = %inputs.lockup,
            base_apy = projection.base_apy,
            boost = %projection.boost_multiplier,
            "Projected rewards"
        );
        Ok(projection)
    }

    /// Display strings for the current inputs.
    ///
    /// Loading snapshots show [`LOADING_TEXT`]; invalid inputs show
    /// [`UNAVAILABLE_TEXT`] everywhere.
    pub fn display(
        &self,
        snapshot: Loadable<&RewardsSnapshot>,
        inputs: &CalculatorInputs,
    ) -> RewardsDisplay {
        let Loadable::Ready(snapshot) = snapshot else {
            return RewardsDisplay::loading();
        };
        match self.project(inputs, snapshot) {
            Ok(projection) => RewardsDisplay::from_projection(&projection),
            Err(e) => {
                debug!(error = %e, "Rewards unavailable for inputs");
                RewardsDisplay::unavailable()
            }
        }
    }

    /// The stake to fill in for "max": everything not yet staked.
    pub fn max_stake(&self, snapshot: &RewardsSnapshot) -> String {
        snapshot.gauge.unstaked_balance.to_string()
    }

    /// Initial value of the pool size field.
    pub fn initial_pool_size(&self, snapshot: &RewardsSnapshot) -> String {
        snapshot.gauge.pool_size.to_string()
    }
}
