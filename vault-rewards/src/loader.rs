//! Resolves engine inputs from the data sources.
//!
//! The loader is the only async part of the crate. It gathers a complete
//! [`RewardsSnapshot`] (or reports [`Loadable::Loading`] while prices are
//! unresolved) and queries account history once per supported version.
//! Polling cadence and caching stay with the caller.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::aggregator::{VaultVersion, VersionedAccounts};
use crate::config::RewardsConfig;
use crate::sources::{
    GaugeDataSource, PriceSource, SourceError, VaultAccountSource, VaultDataSource,
    VotingEscrowSource,
};
use crate::token::Erc20Token;
use crate::types::{Loadable, RewardsSnapshot};

/// Fetches and assembles engine inputs.
///
/// Gauges are keyed by the vault whose shares they stake, so one id serves
/// both the gauge and vault lookups.
#[derive(Clone)]
pub struct SnapshotLoader {
    prices: Arc<dyn PriceSource>,
    gauges: Arc<dyn GaugeDataSource>,
    vaults: Arc<dyn VaultDataSource>,
    escrow: Arc<dyn VotingEscrowSource>,
    accounts: Arc<dyn VaultAccountSource>,
    reward_token: Erc20Token,
}

impl SnapshotLoader {
    pub fn new(
        prices: Arc<dyn PriceSource>,
        gauges: Arc<dyn GaugeDataSource>,
        vaults: Arc<dyn VaultDataSource>,
        escrow: Arc<dyn VotingEscrowSource>,
        accounts: Arc<dyn VaultAccountSource>,
        reward_token: Erc20Token,
    ) -> Self {
        Self {
            prices,
            gauges,
            vaults,
            escrow,
            accounts,
            reward_token,
        }
    }

    /// Use one value that implements every source.
    pub fn from_source<S>(source: Arc<S>, reward_token: Erc20Token) -> Self
    where
        S: PriceSource
            + GaugeDataSource
            + VaultDataSource
            + VotingEscrowSource
            + VaultAccountSource
            + 'static,
    {
        Self::new(
            source.clone(),
            source.clone(),
            source.clone(),
            source.clone(),
            source,
            reward_token,
        )
    }

    /// Use one value that implements every source, pricing rewards in the
    /// configured reward token.
    pub fn from_config<S>(source: Arc<S>, config: &RewardsConfig) -> Self
    where
        S: PriceSource
            + GaugeDataSource
            + VaultDataSource
            + VotingEscrowSource
            + VaultAccountSource
            + 'static,
    {
        Self::from_source(source, config.tokens.reward_token)
    }

    pub fn reward_token(&self) -> Erc20Token {
        self.reward_token
    }

    /// Resolve everything the calculator needs for one gauge.
    ///
    /// Returns `Loading` rather than a snapshot while either price is
    /// unresolved, so unresolved prices never reach the engine.
    pub async fn load_rewards_snapshot(
        &self,
        gauge_id: &str,
    ) -> Result<Loadable<RewardsSnapshot>, SourceError> {
        let (gauge, vault, total_ve_supply) = futures::try_join!(
            self.gauges.fetch_gauge_state(gauge_id),
            self.vaults.fetch_vault_data(gauge_id),
            self.escrow.fetch_total_locked_supply(),
        )?;

        let (asset_quote, reward_quote) = futures::try_join!(
            self.prices.get_price(vault.asset.as_str()),
            self.prices.get_price(self.reward_token.as_str()),
        )?;

        let (Some(asset_price), Some(reward_token_price)) =
            (asset_quote.value(), reward_quote.value())
        else {
            warn!(
                gauge = %gauge_id,
                asset = %vault.asset,
                "Prices unresolved, withholding snapshot"
            );
            return Ok(Loadable::Loading);
        };

        debug!(
            gauge = %gauge_id,
            pool_size = %gauge.pool_size,
            asset_price,
            reward_token_price,
            "Resolved rewards snapshot"
        );

        Ok(Loadable::Ready(RewardsSnapshot {
            gauge,
            vault,
            total_ve_supply,
            asset_price,
            reward_token_price,
        }))
    }

    /// Query a vault's account history in every supported version.
    pub async fn load_vault_accounts(&self, vault_id: &str) -> Result<VersionedAccounts, SourceError> {
        let lookups = VaultVersion::ALL.map(|version| async move {
            let record = self.accounts.fetch_account_record(vault_id, version).await?;
            match record {
                Some(r) if r.version != version || r.vault_id != vault_id => {
                    Err(SourceError::InvalidResponse(format!(
                        "asked for {} {}, got {} {}",
                        vault_id, version, r.vault_id, r.version
                    )))
                }
                other => Ok((version, other)),
            }
        });

        let mut accounts = VersionedAccounts::default();
        for (version, record) in try_join_all(lookups).await? {
            accounts.set(version, record);
        }

        debug!(
            vault = %vault_id,
            versions = accounts.records().count(),
            "Loaded vault accounts"
        );
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{merge_across_versions, VaultAccountRecord};
    use crate::amount::FixedPointAmount;
    use crate::sources::StaticMarketData;
    use crate::types::{GaugeState, PriceQuote, VaultData};

    fn amount(value: &str, scale: u8) -> FixedPointAmount {
        FixedPointAmount::parse(value, scale).unwrap()
    }

    async fn seeded() -> Arc<StaticMarketData> {
        let data = Arc::new(StaticMarketData::new());
        data.set_gauge(
            "rUSDC-ETH-P-THETA",
            GaugeState {
                working_balance: amount("0", 6),
                working_supply: amount("400000", 6),
                pool_size: amount("1000000", 6),
                pool_reward_for_duration: amount("20000", 18),
                unstaked_balance: amount("2500", 6),
            },
        )
        .await;
        data.set_vault(
            "rUSDC-ETH-P-THETA",
            VaultData {
                asset: Erc20Token::Usdc,
                decimals: 6,
                price_per_share: amount("1.02", 6),
            },
        )
        .await;
        data.set_total_locked(amount("5000000", 18)).await;
        data
    }

    #[tokio::test]
    async fn test_snapshot_waits_for_prices() {
        let data = seeded().await;
        data.set_price("usdc", PriceQuote::resolved(1.0)).await;
        data.set_price("rbn", PriceQuote::loading()).await;

        let loader = SnapshotLoader::from_source(data, Erc20Token::Rbn);
        let snapshot = loader.load_rewards_snapshot("rUSDC-ETH-P-THETA").await.unwrap();
        assert!(snapshot.is_loading());
    }

    #[tokio::test]
    async fn test_snapshot_ready() {
        let data = seeded().await;
        data.set_price("usdc", PriceQuote::resolved(1.0)).await;
        data.set_price("rbn", PriceQuote::resolved(0.75)).await;

        let loader = SnapshotLoader::from_source(data, Erc20Token::Rbn);
        let snapshot = loader
            .load_rewards_snapshot("rUSDC-ETH-P-THETA")
            .await
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(snapshot.reward_token_price, 0.75);
        assert_eq!(snapshot.total_ve_supply.to_string(), "5000000");
        assert_eq!(snapshot.vault.asset, Erc20Token::Usdc);
    }

    #[tokio::test]
    async fn test_configured_reward_token_is_priced() {
        let data = seeded().await;
        data.set_price("usdc", PriceQuote::resolved(1.0)).await;
        data.set_price("rbn", PriceQuote::loading()).await;
        data.set_price("weth", PriceQuote::resolved(2500.0)).await;

        let mut config = RewardsConfig::default();
        config.tokens.reward_token = Erc20Token::Weth;

        let loader = SnapshotLoader::from_config(data, &config);
        assert_eq!(loader.reward_token(), Erc20Token::Weth);

        let snapshot = loader
            .load_rewards_snapshot("rUSDC-ETH-P-THETA")
            .await
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(snapshot.reward_token_price, 2500.0);
    }

    #[tokio::test]
    async fn test_missing_gauge_is_an_error() {
        let data = seeded().await;
        let loader = SnapshotLoader::from_source(data, Erc20Token::Rbn);
        assert!(matches!(
            loader.load_rewards_snapshot("rETH-THETA").await,
            Err(SourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_vault_accounts_across_versions() {
        let data = seeded().await;
        for (version, deposits) in [(VaultVersion::V1, "100"), (VaultVersion::V2, "50")] {
            data.add_account(VaultAccountRecord {
                vault_id: "rETH-THETA".to_string(),
                version,
                total_deposits: amount(deposits, 18),
                total_yield_earned: amount("0", 18),
                total_balance: amount(deposits, 18),
            })
            .await;
        }

        let loader = SnapshotLoader::from_source(data, Erc20Token::Rbn);
        let accounts = loader.load_vault_accounts("rETH-THETA").await.unwrap();
        assert!(accounts.earn.is_none());

        let merged = merge_across_versions(&accounts).unwrap().unwrap();
        assert_eq!(merged.total_deposits.to_string(), "150");

        let empty = loader.load_vault_accounts("rBTC-THETA").await.unwrap();
        assert!(empty.is_empty());
    }
}
