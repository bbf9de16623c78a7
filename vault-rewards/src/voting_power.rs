//! Voting power from locked governance tokens.
//!
//! Locking governance tokens for a duration yields voting power that scales
//! linearly with the lock length, reaching the full locked amount at the
//! maximum lock duration.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::FixedPointAmount;

/// Default maximum lock length in days (four years).
pub const DEFAULT_MAX_LOCK_DAYS: u32 = 1460;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Converts a lock (amount, duration) into an escrow balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VotingPowerModel {
    max_lock_days: u32,
}

impl Default for VotingPowerModel {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOCK_DAYS)
    }
}

impl VotingPowerModel {
    pub fn new(max_lock_days: u32) -> Self {
        Self { max_lock_days }
    }

    pub fn max_lock_days(&self) -> u32 {
        self.max_lock_days
    }

    /// Voting power for `locked` tokens held for `duration_days`.
    ///
    /// Durations are clamped to `[0, max_lock_days]`. The partial case is
    /// `locked * duration_days / max_lock_days`, truncated, in integer math.
    pub fn compute_escrow_balance(
        &self,
        locked: &FixedPointAmount,
        duration_days: i64,
    ) -> FixedPointAmount {
        if duration_days <= 0 {
            return FixedPointAmount::zero(locked.scale());
        }
        if duration_days >= i64::from(self.max_lock_days) {
            return *locked;
        }

        // 0 < duration_days < max_lock_days: the quotient is strictly below `locked`
        locked
            .mul_div(
                U256::from(duration_days as u64),
                U256::from(self.max_lock_days),
            )
            .unwrap_or(*locked)
    }

    /// Same as [`compute_escrow_balance`](Self::compute_escrow_balance) for a
    /// calendar duration, rounded to the nearest whole day.
    pub fn escrow_for_duration(
        &self,
        locked: &FixedPointAmount,
        duration: Duration,
    ) -> FixedPointAmount {
        self.compute_escrow_balance(locked, round_to_days(duration))
    }

    pub fn escrow_for_lockup(
        &self,
        locked: &FixedPointAmount,
        period: LockupPeriod,
    ) -> FixedPointAmount {
        self.escrow_for_duration(locked, period.duration())
    }
}

fn round_to_days(duration: Duration) -> i64 {
    (duration.num_seconds() + SECONDS_PER_DAY / 2).div_euclid(SECONDS_PER_DAY)
}

/// A hypothetical governance-token lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct LockPosition {
    pub amount: FixedPointAmount,
    pub duration_days: i64,
}

impl LockPosition {
    pub fn new(amount: FixedPointAmount, duration_days: i64) -> Self {
        Self {
            amount,
            duration_days,
        }
    }

    pub fn escrow_balance(&self, model: &VotingPowerModel) -> FixedPointAmount {
        model.compute_escrow_balance(&self.amount, self.duration_days)
    }
}

/// Preset lock durations offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum LockupPeriod {
    #[serde(rename = "WEEK")]
    Week,
    #[serde(rename = "MONTH")]
    Month,
    #[serde(rename = "3MONTH")]
    ThreeMonths,
    #[serde(rename = "6MONTH")]
    SixMonths,
    #[serde(rename = "YEAR")]
    Year,
    #[serde(rename = "2YEAR")]
    TwoYears,
}

impl LockupPeriod {
    pub const ALL: [LockupPeriod; 6] = [
        Self::Week,
        Self::Month,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::Year,
        Self::TwoYears,
    ];

    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::ThreeMonths => 90,
            Self::SixMonths => 180,
            Self::Year => 365,
            Self::TwoYears => 730,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }

    /// Stable key ("WEEK", "3MONTH", ...)
    pub fn key(&self) -> &'static str {
        match self {
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::ThreeMonths => "3MONTH",
            Self::SixMonths => "6MONTH",
            Self::Year => "YEAR",
            Self::TwoYears => "2YEAR",
        }
    }

    /// Label for dropdowns ("1 WEEK", "3 MONTHS", ...)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Week => "1 WEEK",
            Self::Month => "1 MONTH",
            Self::ThreeMonths => "3 MONTHS",
            Self::SixMonths => "6 MONTHS",
            Self::Year => "1 YEAR",
            Self::TwoYears => "2 YEARS",
        }
    }
}

impl Default for LockupPeriod {
    fn default() -> Self {
        Self::Week
    }
}

impl fmt::Display for LockupPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error for unknown lockup keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown lockup period: {0}")]
pub struct UnknownLockupPeriod(pub String);

impl FromStr for LockupPeriod {
    type Err = UnknownLockupPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|period| period.key() == s)
            .ok_or_else(|| UnknownLockupPeriod(s.to_string()))
    }
}
