//! Gauge boost multiplier.
//!
//! Follows the standard boosted-gauge working-balance rule: a staker earns on
//! a "working balance" of 40% of their stake, topped up by their share of
//! total voting power applied to total pool liquidity, capped at the full
//! stake. The multiplier compares the user's share of working supply with
//! and without that top-up, which bounds it to `[1.0, 2.5]`.
//!
//! All intermediates are exact integers. Percentages are folded in as
//! hundredths so that the 40% baseline never truncates to zero, and the
//! final ratio is produced by a single division at 1e18 precision.

use std::fmt;

use primitive_types::U512;
use serde::{Deserialize, Serialize};
use tracing::trace;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::{AmountError, FixedPointAmount};

/// Fixed-point precision of [`BoostRatio`].
pub const BOOST_PRECISION: u64 = 1_000_000_000_000_000_000;

/// Lower bound of a defined multiplier.
pub const MIN_BOOST: f64 = 1.0;

/// Upper bound of a defined multiplier.
pub const MAX_BOOST: f64 = 2.5;

/// Share of the raw stake that counts toward the working balance with no
/// voting power at all, in percent.
pub const TOKENLESS_PRODUCTION_PCT: u64 = 40;

const MIN_BOOST_WAD: u64 = BOOST_PRECISION;
const MAX_BOOST_WAD: u64 = BOOST_PRECISION / 2 * 5;

/// An exact boost ratio, scaled by [`BOOST_PRECISION`], within `[1.0, 2.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(try_from = "u64")]
pub struct BoostRatio(u64);

/// Error for 1e18-scaled values outside the multiplier bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Boost ratio {0} is outside the multiplier bounds")]
pub struct BoostRatioOutOfRange(pub u64);

impl TryFrom<u64> for BoostRatio {
    type Error = BoostRatioOutOfRange;

    fn try_from(wad: u64) -> Result<Self, Self::Error> {
        if (MIN_BOOST_WAD..=MAX_BOOST_WAD).contains(&wad) {
            Ok(Self(wad))
        } else {
            Err(BoostRatioOutOfRange(wad))
        }
    }
}

impl BoostRatio {
    pub const MIN: BoostRatio = BoostRatio(MIN_BOOST_WAD);
    pub const MAX: BoostRatio = BoostRatio(MAX_BOOST_WAD);

    /// Build from a 1e18-scaled value, clamping into `[MIN, MAX]`.
    pub fn from_wad_clamped(wad: u64) -> Self {
        Self(wad.clamp(MIN_BOOST_WAD, MAX_BOOST_WAD))
    }

    pub fn wad(&self) -> u64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / BOOST_PRECISION as f64
    }
}

/// Result of a boost computation.
///
/// `Undefined` means the multiplier is not meaningful for the inputs (empty
/// pool, zero stake). It is deliberately distinct from a ratio of `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "kind", content = "ratio", rename_all = "snake_case")]
pub enum BoostMultiplier {
    Undefined,
    Ratio(BoostRatio),
}

impl BoostMultiplier {
    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Ratio(_))
    }

    /// The ratio as a display number, if defined.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Undefined => None,
            Self::Ratio(ratio) => Some(ratio.as_f64()),
        }
    }
}

impl fmt::Display for BoostMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("---"),
            Self::Ratio(ratio) => write!(f, "{:.2}", ratio.as_f64()),
        }
    }
}

/// Inputs to a boost computation.
///
/// Pairs must share a scale: `gauge_balance`/`pool_liquidity` (staking
/// token), `ve_token_amount`/`total_ve_token` (governance token) and
/// `working_balance`/`working_supply` (boost accounting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BoostInputs {
    /// The user's hypothetical stake
    pub gauge_balance: FixedPointAmount,
    /// Total liquidity in the gauge
    pub pool_liquidity: FixedPointAmount,
    /// The user's voting power
    pub ve_token_amount: FixedPointAmount,
    /// Total voting power
    pub total_ve_token: FixedPointAmount,
    /// The user's current working balance
    pub working_balance: FixedPointAmount,
    /// Current working supply of the gauge
    pub working_supply: FixedPointAmount,
}

/// Stateless boost calculator.
pub struct BoostCalculator;

impl BoostCalculator {
    /// Compute the boost multiplier for a hypothetical stake and lock.
    ///
    /// Non-decreasing in `ve_token_amount` and non-increasing in
    /// `total_ve_token` when everything else is held fixed.
    pub fn compute_boost_multiplier(inputs: &BoostInputs) -> Result<BoostMultiplier, AmountError> {
        inputs.gauge_balance.checked_cmp(&inputs.pool_liquidity)?;
        inputs.ve_token_amount.checked_cmp(&inputs.total_ve_token)?;
        inputs.working_balance.checked_cmp(&inputs.working_supply)?;

        if inputs.pool_liquidity.is_zero() || inputs.gauge_balance.is_zero() {
            trace!("Boost undefined for empty pool or zero stake");
            return Ok(BoostMultiplier::Undefined);
        }

        // Stake and working amounts meet at the finer of their two scales.
        let scale = inputs
            .gauge_balance
            .scale()
            .max(inputs.working_balance.scale());
        let stake = inputs.gauge_balance.widened_at(scale)?;
        let liquidity = inputs.pool_liquidity.widened_at(scale)?;
        let supply = inputs.working_supply.widened_at(scale)?;
        let current = inputs.working_balance.widened_at(scale)?.min(supply);

        let hundred = U512::from(100u64);
        let tokenless = U512::from(TOKENLESS_PRODUCTION_PCT);

        // Working balances in hundredths of a base unit
        let noboost_limit = mul(stake, tokenless)?;
        let mut limit = noboost_limit;
        if !inputs.ve_token_amount.is_zero() {
            // A user's voting power is part of the total, so the share never exceeds one.
            let total_ve = inputs.total_ve_token.raw().max(inputs.ve_token_amount.raw());
            let weighted = mul(mul(liquidity, hundred - tokenless)?, inputs.ve_token_amount.raw().into())?;
            let share = weighted / U512::from(total_ve);
            limit = limit.checked_add(share).ok_or(AmountError::Overflow)?;
        }
        limit = limit.min(mul(stake, hundred)?);

        // Everyone else's working supply
        let others = mul(supply - current, hundred)?;
        let noboost_supply = others.checked_add(noboost_limit).ok_or(AmountError::Overflow)?;
        let boosted_supply = others.checked_add(limit).ok_or(AmountError::Overflow)?;

        // (limit / boosted_supply) / (noboost_limit / noboost_supply)
        let numerator = mul(mul(limit, noboost_supply)?, U512::from(BOOST_PRECISION))?;
        let denominator = mul(boosted_supply, noboost_limit)?;
        let wad = numerator / denominator;

        let ratio = BoostRatio::from_wad_clamped(clamp_to_u64(wad));
        trace!(
            limit = %limit,
            noboost_limit = %noboost_limit,
            ratio = ratio.as_f64(),
            "Computed boost multiplier"
        );
        Ok(BoostMultiplier::Ratio(ratio))
    }
}

fn mul(a: U512, b: U512) -> Result<U512, AmountError> {
    a.checked_mul(b).ok_or(AmountError::Overflow)
}

fn clamp_to_u64(value: U512) -> u64 {
    if value > U512::from(u64::MAX) {
        u64::MAX
    } else {
        value.low_u64()
    }
}
