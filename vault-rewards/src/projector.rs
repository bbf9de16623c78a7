//! Annualized reward projection.
//!
//! Pool valuation stays exact up to the point where prices enter; from
//! there on every number is a display-domain `f64`.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::{pow10, AmountError, FixedPointAmount};
use crate::boost::BoostMultiplier;
use crate::types::Percentage;

/// Default reward period length in days (one gauge epoch).
pub const DEFAULT_REWARD_PERIOD_DAYS: u32 = 7;

const DAYS_PER_YEAR: f64 = 365.0;

/// How a per-period reward rate becomes a yearly figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Annualization {
    /// rate × periods per year
    #[default]
    Simple,
    /// (1 + rate)^periods − 1
    Compound,
}

/// Which part of the base rate the boost multiplier scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum BoostApplication {
    /// Boosted rate is `base × multiplier`
    #[default]
    WholeBaseRate,
    /// Boosted rate is only the extra yield, `base × (multiplier − 1)`
    IncrementOverBase,
}

/// Inputs to the base reward rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BaseRewardInputs {
    /// Total staked vault shares
    pub pool_size: FixedPointAmount,
    /// Reward tokens emitted over one reward period
    pub pool_reward_for_duration: FixedPointAmount,
    /// Underlying asset per vault share
    pub price_per_share: FixedPointAmount,
    /// Resolved quote price of the underlying asset
    pub asset_price: f64,
    /// Resolved quote price of the reward token
    pub reward_token_price: f64,
}

/// Base and boosted yield for one hypothetical position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RewardsProjection {
    pub base_apy: Percentage,
    /// `None` when the boost multiplier is undefined
    pub boosted_apy: Option<Percentage>,
    pub boost_multiplier: BoostMultiplier,
    pub boost_application: BoostApplication,
}

impl RewardsProjection {
    /// Overall yield. Equals `base × multiplier` under either
    /// [`BoostApplication`], and the base rate when no boost applies.
    pub fn total_apy(&self) -> Percentage {
        match (self.boost_application, self.boosted_apy) {
            (_, None) => self.base_apy,
            (BoostApplication::WholeBaseRate, Some(boosted)) => boosted,
            (BoostApplication::IncrementOverBase, Some(boosted)) => self.base_apy + boosted,
        }
    }
}

/// Converts pool emissions and prices into yearly percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardProjector {
    reward_period_days: u32,
    annualization: Annualization,
    boost_application: BoostApplication,
}

impl Default for RewardProjector {
    fn default() -> Self {
        Self::new(
            DEFAULT_REWARD_PERIOD_DAYS,
            Annualization::default(),
            BoostApplication::default(),
        )
    }
}

impl RewardProjector {
    pub fn new(
        reward_period_days: u32,
        annualization: Annualization,
        boost_application: BoostApplication,
    ) -> Self {
        Self {
            reward_period_days,
            annualization,
            boost_application,
        }
    }

    pub fn boost_application(&self) -> BoostApplication {
        self.boost_application
    }

    pub fn periods_per_year(&self) -> f64 {
        DAYS_PER_YEAR / f64::from(self.reward_period_days.max(1))
    }

    /// Yearly percentage earned from reward emissions by the whole pool.
    ///
    /// An empty pool, or one valued at zero, yields `0.0`.
    pub fn compute_base_rewards(&self, inputs: &BaseRewardInputs) -> Result<Percentage, AmountError> {
        if inputs.pool_size.is_zero() {
            return Ok(0.0);
        }

        let one_share = pow10(inputs.price_per_share.scale()).ok_or(AmountError::Overflow)?;
        let pool_in_asset = inputs
            .pool_size
            .mul_div(inputs.price_per_share.raw(), one_share)?;

        let pool_value = pool_in_asset.to_display_f64() * inputs.asset_price;
        if !(pool_value.is_finite() && pool_value > 0.0) {
            return Ok(0.0);
        }
        let reward_value =
            inputs.pool_reward_for_duration.to_display_f64() * inputs.reward_token_price;
        let period_rate = reward_value / pool_value;

        let periods = self.periods_per_year();
        let apy = match self.annualization {
            Annualization::Simple => period_rate * periods * 100.0,
            Annualization::Compound => ((1.0 + period_rate).powf(periods) - 1.0) * 100.0,
        };
        Ok(apy)
    }

    /// Boosted yield, or `None` when the multiplier is undefined.
    pub fn compute_boosted_rewards(
        &self,
        base_apy: Percentage,
        multiplier: BoostMultiplier,
    ) -> Option<Percentage> {
        let ratio = multiplier.value()?;
        Some(match self.boost_application {
            BoostApplication::WholeBaseRate => base_apy * ratio,
            BoostApplication::IncrementOverBase => base_apy * (ratio - 1.0),
        })
    }

    pub fn project(
        &self,
        inputs: &BaseRewardInputs,
        multiplier: BoostMultiplier,
    ) -> Result<RewardsProjection, AmountError> {
        let base_apy = self.compute_base_rewards(inputs)?;
        Ok(RewardsProjection {
            base_apy,
            boosted_apy: self.compute_boosted_rewards(base_apy, multiplier),
            boost_multiplier: multiplier,
            boost_application: self.boost_application,
        })
    }
}
