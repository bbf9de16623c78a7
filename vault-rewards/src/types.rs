//! Resolved snapshots consumed by the engine.
//!
//! Everything here is fetched by an external data layer and handed to the
//! engine as an already-resolved value. The engine never mutates them.

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::FixedPointAmount;
use crate::token::Erc20Token;

/// Display-domain percentage (e.g. `12.5` means 12.5%).
pub type Percentage = f64;

/// Point-in-time state of a liquidity gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct GaugeState {
    /// The user's current working balance (boost-accounting scale)
    pub working_balance: FixedPointAmount,
    /// Sum of all working balances (boost-accounting scale)
    pub working_supply: FixedPointAmount,
    /// Total staked in the gauge (staking-token scale)
    pub pool_size: FixedPointAmount,
    /// Reward tokens emitted over one reward period (reward-token scale)
    pub pool_reward_for_duration: FixedPointAmount,
    /// Staking tokens the user holds but has not staked (staking-token scale)
    pub unstaked_balance: FixedPointAmount,
}

/// Vault share metadata needed to value a staking pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VaultData {
    /// Underlying asset the vault shares redeem into
    pub asset: Erc20Token,
    /// Decimal scale of the vault share (matches the underlying)
    pub decimals: u8,
    /// Underlying units per share, at the share scale
    pub price_per_share: FixedPointAmount,
}

/// A price reading from a price feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct PriceQuote {
    /// Quote-currency price per whole token
    pub price: f64,
    /// False while the feed is still loading; the price must not be used
    pub resolved: bool,
}

impl PriceQuote {
    pub fn resolved(price: f64) -> Self {
        Self {
            price,
            resolved: true,
        }
    }

    pub fn loading() -> Self {
        Self {
            price: 0.0,
            resolved: false,
        }
    }

    /// The price, only if the feed has resolved.
    pub fn value(&self) -> Option<f64> {
        self.resolved.then_some(self.price)
    }
}

/// Everything the rewards calculator needs about one gauge, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RewardsSnapshot {
    pub gauge: GaugeState,
    pub vault: VaultData,
    /// Total voting power (governance-token scale)
    pub total_ve_supply: FixedPointAmount,
    pub asset_price: f64,
    pub reward_token_price: f64,
}

/// A value the data layer may still be resolving.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn as_ref(&self) -> Loadable<&T> {
        match self {
            Self::Loading => Loadable::Loading,
            Self::Ready(value) => Loadable::Ready(value),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Self::Loading => None,
            Self::Ready(value) => Some(value),
        }
    }
}
