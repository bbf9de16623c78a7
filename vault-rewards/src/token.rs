//! ERC-20 token registry: decimal scales and display names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::{FixedPointAmount, ParseAmountError};

/// Tokens the vault platform prices, stakes or rewards in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum Erc20Token {
    Weth,
    Usdc,
    Wbtc,
    Yvusdc,
    Steth,
    Wsteth,
    Ldo,
    Aave,
    /// Governance and reward token
    Rbn,
    /// Vote-escrowed governance token
    Verbn,
    Wavax,
    Perp,
}

impl Erc20Token {
    pub const ALL: [Erc20Token; 12] = [
        Self::Weth,
        Self::Usdc,
        Self::Wbtc,
        Self::Yvusdc,
        Self::Steth,
        Self::Wsteth,
        Self::Ldo,
        Self::Aave,
        Self::Rbn,
        Self::Verbn,
        Self::Wavax,
        Self::Perp,
    ];

    /// Decimal scale of the token's base unit.
    pub fn decimals(&self) -> u8 {
        match self {
            Self::Usdc | Self::Yvusdc => 6,
            Self::Wbtc => 8,
            _ => 18,
        }
    }

    /// Lowercase identifier used in configs and price lookups.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weth => "weth",
            Self::Usdc => "usdc",
            Self::Wbtc => "wbtc",
            Self::Yvusdc => "yvusdc",
            Self::Steth => "steth",
            Self::Wsteth => "wsteth",
            Self::Ldo => "ldo",
            Self::Aave => "aave",
            Self::Rbn => "rbn",
            Self::Verbn => "verbn",
            Self::Wavax => "wavax",
            Self::Perp => "perp",
        }
    }

    /// Symbol as shown to users.
    pub fn display_name(&self) -> String {
        match self {
            Self::Yvusdc => "yvUSDC".to_string(),
            Self::Steth => "stETH".to_string(),
            Self::Verbn => "veRBN".to_string(),
            other => other.as_str().to_uppercase(),
        }
    }

    /// Parse a user-entered amount at this token's scale.
    pub fn parse_amount(&self, input: &str) -> Result<FixedPointAmount, ParseAmountError> {
        FixedPointAmount::parse(input, self.decimals())
    }

    pub fn zero(&self) -> FixedPointAmount {
        FixedPointAmount::zero(self.decimals())
    }
}

impl fmt::Display for Erc20Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Error for unknown token identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown token: {0}")]
pub struct UnknownToken(pub String);

impl FromStr for Erc20Token {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|token| token.as_str() == lower)
            .ok_or_else(|| UnknownToken(s.to_string()))
    }
}
