//! Collaborator interfaces for on-chain and market data.
//!
//! The engine never fetches anything itself. These traits describe what the
//! surrounding data layer resolves before calling into the engine, so the
//! engine can be driven by a live subgraph/RPC client or by fixed data.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::aggregator::{VaultAccountRecord, VaultVersion};
use crate::amount::FixedPointAmount;
use crate::types::{GaugeState, PriceQuote, VaultData};

/// Error types for data source operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Source is not reachable
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Token price feed.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Latest quote for a token symbol; may still be loading.
    async fn get_price(&self, token_symbol: &str) -> Result<PriceQuote, SourceError>;
}

/// Liquidity gauge state reader.
#[async_trait]
pub trait GaugeDataSource: Send + Sync {
    async fn fetch_gauge_state(&self, gauge_id: &str) -> Result<GaugeState, SourceError>;
}

/// Voting escrow contract reader.
#[async_trait]
pub trait VotingEscrowSource: Send + Sync {
    /// Total voting power across all locks.
    async fn fetch_total_locked_supply(&self) -> Result<FixedPointAmount, SourceError>;
}

/// Vault share metadata reader.
#[async_trait]
pub trait VaultDataSource: Send + Sync {
    async fn fetch_vault_data(&self, vault_id: &str) -> Result<VaultData, SourceError>;
}

/// Per-version account history reader.
#[async_trait]
pub trait VaultAccountSource: Send + Sync {
    /// `Ok(None)` means the account has no history in that version.
    async fn fetch_account_record(
        &self,
        vault_id: &str,
        version: VaultVersion,
    ) -> Result<Option<VaultAccountRecord>, SourceError>;
}

/// In-memory implementation of every source, for tests and offline use.
#[derive(Clone, Default)]
pub struct StaticMarketData {
    prices: Arc<RwLock<HashMap<String, PriceQuote>>>,
    gauges: Arc<RwLock<HashMap<String, GaugeState>>>,
    vaults: Arc<RwLock<HashMap<String, VaultData>>>,
    accounts: Arc<RwLock<HashMap<(String, VaultVersion), VaultAccountRecord>>>,
    total_locked: Arc<RwLock<Option<FixedPointAmount>>>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_price(&self, token_symbol: &str, quote: PriceQuote) {
        self.prices
            .write()
            .await
            .insert(token_symbol.to_lowercase(), quote);
    }

    pub async fn set_gauge(&self, gauge_id: &str, state: GaugeState) {
        self.gauges.write().await.insert(gauge_id.to_string(), state);
    }

    pub async fn set_vault(&self, vault_id: &str, data: VaultData) {
        self.vaults.write().await.insert(vault_id.to_string(), data);
    }

    pub async fn set_total_locked(&self, supply: FixedPointAmount) {
        *self.total_locked.write().await = Some(supply);
    }

    pub async fn add_account(&self, record: VaultAccountRecord) {
        self.accounts
            .write()
            .await
            .insert((record.vault_id.clone(), record.version), record);
    }
}

#[async_trait]
impl PriceSource for StaticMarketData {
    async fn get_price(&self, token_symbol: &str) -> Result<PriceQuote, SourceError> {
        self.prices
            .read()
            .await
            .get(&token_symbol.to_lowercase())
            .copied()
            .ok_or_else(|| SourceError::NotFound(format!("price for {}", token_symbol)))
    }
}

#[async_trait]
impl GaugeDataSource for StaticMarketData {
    async fn fetch_gauge_state(&self, gauge_id: &str) -> Result<GaugeState, SourceError> {
        self.gauges
            .read()
            .await
            .get(gauge_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("gauge {}", gauge_id)))
    }
}

#[async_trait]
impl VotingEscrowSource for StaticMarketData {
    async fn fetch_total_locked_supply(&self) -> Result<FixedPointAmount, SourceError> {
        self.total_locked
            .read()
            .await
            .ok_or_else(|| SourceError::Unavailable("voting escrow supply not set".to_string()))
    }
}

#[async_trait]
impl VaultDataSource for StaticMarketData {
    async fn fetch_vault_data(&self, vault_id: &str) -> Result<VaultData, SourceError> {
        self.vaults
            .read()
            .await
            .get(vault_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("vault {}", vault_id)))
    }
}

#[async_trait]
impl VaultAccountSource for StaticMarketData {
    async fn fetch_account_record(
        &self,
        vault_id: &str,
        version: VaultVersion,
    ) -> Result<Option<VaultAccountRecord>, SourceError> {
        Ok(self
            .accounts
            .read()
            .await
            .get(&(vault_id.to_string(), version))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prices_are_case_insensitive() {
        let data = StaticMarketData::new();
        data.set_price("RBN", PriceQuote::resolved(0.5)).await;

        let quote = data.get_price("rbn").await.unwrap();
        assert_eq!(quote.value(), Some(0.5));
        assert!(matches!(
            data.get_price("weth").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_account_is_not_an_error() {
        let data = StaticMarketData::new();
        let record = data
            .fetch_account_record("rETH-THETA", VaultVersion::V1)
            .await
            .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_total_locked_unset_is_unavailable() {
        let data = StaticMarketData::new();
        assert!(matches!(
            data.fetch_total_locked_supply().await,
            Err(SourceError::Unavailable(_))
        ));

        data.set_total_locked(FixedPointAmount::parse("1000", 18).unwrap())
            .await;
        assert_eq!(
            data.fetch_total_locked_supply().await.unwrap().to_string(),
            "1000"
        );
    }
}
