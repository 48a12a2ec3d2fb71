use std::sync::Arc;

use reqwest::Client;
use rust_decimal::Decimal;
use serde::Serialize;

use super::providers::{CoinGeckoPriceSource, CoinPaprikaPriceSource, FrankfurterRateSource};
use super::{FxRateTable, FxTable, PriceResolver};
use crate::cache::{CacheKey, PriceCache};
use crate::clock::Clock;
use crate::config::ResolvedConfig;

/// Everything the holdings pipeline needs to value balances in USD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferencePrices {
    pub stablecoin_usd: Option<Decimal>,
    pub staking_usd: Option<Decimal>,
    pub fx: Option<FxTable>,
}

/// The two reference price resolvers and the FX table, resolved together.
pub struct ReferencePriceService {
    stablecoin: PriceResolver,
    staking: PriceResolver,
    fx: FxRateTable,
}

impl ReferencePriceService {
    pub fn new(stablecoin: PriceResolver, staking: PriceResolver, fx: FxRateTable) -> Self {
        Self {
            stablecoin,
            staking,
            fx,
        }
    }

    /// Wire the public sources from config.
    ///
    /// Stablecoin: CoinGecko, then CoinPaprika. Staking token: CoinGecko only.
    pub fn from_config(
        config: &ResolvedConfig,
        cache: Arc<dyn PriceCache>,
        clock: Arc<dyn Clock>,
        client: Client,
    ) -> Self {
        let sources = &config.sources;
        let ttl = config.refresh.price_ttl;

        let stablecoin = PriceResolver::new(
            CacheKey::StablecoinPrice,
            ttl,
            Arc::new(
                CoinGeckoPriceSource::stablecoin()
                    .with_client(client.clone())
                    .with_base_url(&sources.coingecko_base_url),
            ),
            cache.clone(),
        )
        .with_fallback(Arc::new(
            CoinPaprikaPriceSource::stablecoin()
                .with_client(client.clone())
                .with_base_url(&sources.coinpaprika_base_url),
        ))
        .with_clock(clock.clone());

        let staking = PriceResolver::new(
            CacheKey::StakingPrice,
            ttl,
            Arc::new(
                CoinGeckoPriceSource::staking()
                    .with_client(client.clone())
                    .with_base_url(&sources.coingecko_base_url),
            ),
            cache,
        )
        .with_clock(clock.clone());

        let fx = FxRateTable::new(
            Arc::new(
                FrankfurterRateSource::new()
                    .with_client(client)
                    .with_base_url(&sources.frankfurter_base_url),
            ),
            config.fx.currencies.clone(),
            config.refresh.fx_ttl,
        )
        .with_clock(clock);

        Self::new(stablecoin, staking, fx)
    }

    /// Resolve all three concurrently. Never fails; unresolved parts are `None`.
    pub async fn resolve(&self) -> ReferencePrices {
        let (stablecoin, staking, fx) = tokio::join!(
            self.stablecoin.resolve(),
            self.staking.resolve(),
            self.fx.resolve()
        );

        ReferencePrices {
            stablecoin_usd: stablecoin.price,
            staking_usd: staking.price,
            fx,
        }
    }

    /// Last cached prices, without network access. The FX table is never
    /// persisted, so it is absent here.
    pub fn cached(&self) -> ReferencePrices {
        ReferencePrices {
            stablecoin_usd: self.stablecoin.cached(),
            staking_usd: self.staking.cached(),
            fx: None,
        }
    }
}
