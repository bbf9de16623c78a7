//! Cross-version vault position aggregation.
//!
//! The same logical vault can be deployed as several contract versions. A
//! user's position is reported per version; these helpers merge the versions
//! into a single exact total.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::amount::{AmountError, FixedPointAmount};

/// Error types for position aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregationError {
    /// Amounts across versions disagree on scale or overflow
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),

    /// A record for another vault was mixed in
    #[error("Vault mismatch: expected {expected}, found {found}")]
    VaultMismatch { expected: String, found: String },
}

/// Supported vault contract versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "lowercase")]
pub enum VaultVersion {
    V1,
    V2,
    Earn,
}

impl VaultVersion {
    pub const ALL: [VaultVersion; 3] = [Self::V1, Self::V2, Self::Earn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::Earn => "earn",
        }
    }
}

impl fmt::Display for VaultVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown version keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown vault version: {0}")]
pub struct UnknownVaultVersion(pub String);

impl FromStr for VaultVersion {
    type Err = UnknownVaultVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|version| version.as_str() == s)
            .ok_or_else(|| UnknownVaultVersion(s.to_string()))
    }
}

/// A user's account totals in one vault version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VaultAccountRecord {
    pub vault_id: String,
    pub version: VaultVersion,
    pub total_deposits: FixedPointAmount,
    pub total_yield_earned: FixedPointAmount,
    pub total_balance: FixedPointAmount,
}

/// A user's account totals summed over every version with history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct AggregatedVaultAccount {
    pub vault_id: String,
    pub total_deposits: FixedPointAmount,
    pub total_yield_earned: FixedPointAmount,
    pub total_balance: FixedPointAmount,
    /// Versions that contributed, in [`VaultVersion::ALL`] order
    pub versions: Vec<VaultVersion>,
}

impl AggregatedVaultAccount {
    fn from_record(record: &VaultAccountRecord) -> Self {
        Self {
            vault_id: record.vault_id.clone(),
            total_deposits: record.total_deposits,
            total_yield_earned: record.total_yield_earned,
            total_balance: record.total_balance,
            versions: vec![record.version],
        }
    }

    fn absorb(&mut self, record: &VaultAccountRecord) -> Result<(), AggregationError> {
        if record.vault_id != self.vault_id {
            return Err(AggregationError::VaultMismatch {
                expected: self.vault_id.clone(),
                found: record.vault_id.clone(),
            });
        }
        self.total_deposits = self.total_deposits.checked_add(&record.total_deposits)?;
        self.total_yield_earned = self
            .total_yield_earned
            .checked_add(&record.total_yield_earned)?;
        self.total_balance = self.total_balance.checked_add(&record.total_balance)?;
        self.versions.push(record.version);
        Ok(())
    }
}

/// One optional record per supported version of a single vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct VersionedAccounts {
    pub v1: Option<VaultAccountRecord>,
    pub v2: Option<VaultAccountRecord>,
    pub earn: Option<VaultAccountRecord>,
}

impl VersionedAccounts {
    pub fn get(&self, version: VaultVersion) -> Option<&VaultAccountRecord> {
        match version {
            VaultVersion::V1 => self.v1.as_ref(),
            VaultVersion::V2 => self.v2.as_ref(),
            VaultVersion::Earn => self.earn.as_ref(),
        }
    }

    fn slot_mut(&mut self, version: VaultVersion) -> &mut Option<VaultAccountRecord> {
        match version {
            VaultVersion::V1 => &mut self.v1,
            VaultVersion::V2 => &mut self.v2,
            VaultVersion::Earn => &mut self.earn,
        }
    }

    /// Place a record in its version's slot, returning any record it replaced.
    pub fn insert(&mut self, record: VaultAccountRecord) -> Option<VaultAccountRecord> {
        self.slot_mut(record.version).replace(record)
    }

    /// Store the outcome of a per-version lookup; `None` leaves the slot empty.
    pub fn set(&mut self, version: VaultVersion, record: Option<VaultAccountRecord>) {
        *self.slot_mut(version) = record.filter(|r| r.version == version);
    }

    pub fn is_empty(&self) -> bool {
        VaultVersion::ALL.iter().all(|v| self.get(*v).is_none())
    }

    /// Present records in [`VaultVersion::ALL`] order.
    pub fn records(&self) -> impl Iterator<Item = &VaultAccountRecord> + '_ {
        VaultVersion::ALL.into_iter().filter_map(move |v| self.get(v))
    }
}

/// Merge one vault's per-version records into a single total.
///
/// Absent versions contribute nothing; `None` when no version has data.
pub fn merge_across_versions(
    records: &VersionedAccounts,
) -> Result<Option<AggregatedVaultAccount>, AggregationError> {
    merge_in_order(records, &VaultVersion::ALL)
}

fn merge_in_order(
    records: &VersionedAccounts,
    order: &[VaultVersion],
) -> Result<Option<AggregatedVaultAccount>, AggregationError> {
    let mut merged: Option<AggregatedVaultAccount> = None;

    for record in order.iter().filter_map(|v| records.get(*v)) {
        match merged.as_mut() {
            None => merged = Some(AggregatedVaultAccount::from_record(record)),
            Some(acc) => acc.absorb(record)?,
        }
    }

    if let Some(acc) = merged.as_mut() {
        acc.versions.sort();
        trace!(
            vault = %acc.vault_id,
            versions = acc.versions.len(),
            "Merged vault account across versions"
        );
    }
    Ok(merged)
}

/// Account records for many vaults, keyed by vault id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBook {
    vaults: BTreeMap<String, VersionedAccounts>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a record under its vault and version.
    pub fn insert(&mut self, record: VaultAccountRecord) -> Option<VaultAccountRecord> {
        self.vaults
            .entry(record.vault_id.clone())
            .or_default()
            .insert(record)
    }

    pub fn vault(&self, vault_id: &str) -> Option<&VersionedAccounts> {
        self.vaults.get(vault_id)
    }

    /// Every vault's record for a single version.
    pub fn for_version(&self, version: VaultVersion) -> BTreeMap<&str, &VaultAccountRecord> {
        self.vaults
            .iter()
            .filter_map(|(id, accounts)| accounts.get(version).map(|r| (id.as_str(), r)))
            .collect()
    }

    /// Every vault merged across versions. Vaults with no history are omitted.
    pub fn aggregate_all(&self) -> Result<BTreeMap<String, AggregatedVaultAccount>, AggregationError> {
        let mut aggregated = BTreeMap::new();
        for (id, accounts) in &self.vaults {
            if let Some(merged) = merge_across_versions(accounts)? {
                aggregated.insert(id.clone(), merged);
            }
        }
        Ok(aggregated)
    }
}

impl FromIterator<VaultAccountRecord> for AccountBook {
    fn from_iter<I: IntoIterator<Item = VaultAccountRecord>>(iter: I) -> Self {
        let mut book = Self::new();
        for record in iter {
            book.insert(record);
        }
        book
    }
}
