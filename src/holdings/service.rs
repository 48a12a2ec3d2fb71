use std::sync::Arc;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::enrich::{enrich_coins, synthesize_reference_quote, EnrichedCoin, PriceContext};
use super::filter::{filter_coins, DustPolicy, FilterOptions};
use super::tokens::{rank_tokens, token_rows, IbcWhitelist, TokenRow};
use crate::cache::PriceCache;
use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::models::{Coin, ContractToken, NetworkMode, QuoteSet, STABLECOIN_DENOM};
use crate::prices::providers::FcdSwaprateSource;
use crate::prices::{ReferencePriceService, ReferencePrices, SwaprateSource};

/// One request cycle's input: the wallet's balances and display preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldingsRequest {
    /// Native and IBC balances.
    pub coins: Vec<Coin>,
    pub contract_tokens: Vec<ContractToken>,
    pub mode: NetworkMode,
    pub ibc_whitelist: IbcWhitelist,
    /// Preferred quote denom. Falls back to the configured one.
    pub display_currency: Option<String>,
    /// Denoms the chain lists; decides whether the display currency can be
    /// quoted against.
    pub known_denoms: Vec<String>,
    pub prices_enabled: bool,
    pub show_low_value_coins: bool,
    pub show_low_value_tokens: bool,
}

impl Default for HoldingsRequest {
    fn default() -> Self {
        Self {
            coins: Vec::new(),
            contract_tokens: Vec::new(),
            mode: NetworkMode::default(),
            ibc_whitelist: IbcWhitelist::new(),
            display_currency: None,
            known_denoms: Vec::new(),
            prices_enabled: true,
            show_low_value_coins: false,
            show_low_value_tokens: false,
        }
    }
}

/// Everything the holdings page renders.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingsView {
    pub coins: Vec<EnrichedCoin>,
    pub tokens: Vec<TokenRow>,
    pub prices: ReferencePrices,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotes: Option<QuoteSet>,
}

/// The denom swaprates are requested against: the display currency when the
/// chain lists it, otherwise `fallback`.
pub fn swaprate_denom<'a>(
    display_currency: &'a str,
    known_denoms: &[String],
    fallback: &'a str,
) -> &'a str {
    if known_denoms.iter().any(|denom| denom == display_currency) {
        display_currency
    } else {
        fallback
    }
}

pub struct HoldingsService {
    prices: ReferencePriceService,
    swaprates: Option<Arc<dyn SwaprateSource>>,
    standard_policy: DustPolicy,
    display_currency: String,
}

impl HoldingsService {
    pub fn new(prices: ReferencePriceService) -> Self {
        Self {
            prices,
            swaprates: None,
            standard_policy: DustPolicy::default(),
            display_currency: STABLECOIN_DENOM.to_string(),
        }
    }

    pub fn with_swaprate_source(mut self, source: Arc<dyn SwaprateSource>) -> Self {
        self.swaprates = Some(source);
        self
    }

    pub fn with_standard_policy(mut self, policy: DustPolicy) -> Self {
        self.standard_policy = policy;
        self
    }

    pub fn with_display_currency(mut self, denom: impl Into<String>) -> Self {
        self.display_currency = denom.into();
        self
    }

    pub fn from_config(
        config: &ResolvedConfig,
        cache: Arc<dyn PriceCache>,
        clock: Arc<dyn Clock>,
        client: Client,
    ) -> Self {
        let swaprates = FcdSwaprateSource::new()
            .with_client(client.clone())
            .with_base_url(&config.sources.fcd_base_url);

        Self::new(ReferencePriceService::from_config(config, cache, clock, client))
            .with_swaprate_source(Arc::new(swaprates))
            .with_standard_policy(config.filter.standard_policy)
            .with_display_currency(&config.display_currency)
    }

    /// Quotes are needed on the legacy network, and on the standard network
    /// when its dust filter values coins.
    fn wants_quotes(&self, mode: NetworkMode) -> bool {
        mode.is_classic() || self.standard_policy == DustPolicy::Value
    }

    async fn load_quotes(&self, request: &HoldingsRequest) -> Option<QuoteSet> {
        if !request.prices_enabled || !self.wants_quotes(request.mode) {
            return None;
        }
        let source = self.swaprates.as_ref()?;

        let display = request
            .display_currency
            .as_deref()
            .unwrap_or(&self.display_currency);
        let base = swaprate_denom(display, &request.known_denoms, STABLECOIN_DENOM);

        match source.fetch_swaprates(base).await {
            Ok(quotes) => Some(quotes),
            Err(e) => {
                warn!(source = %source.name(), base, error = %e, "swaprates unavailable");
                None
            }
        }
    }

    pub async fn build(&self, request: &HoldingsRequest) -> HoldingsView {
        let (native, ibc): (Vec<Coin>, Vec<Coin>) =
            request.coins.iter().cloned().partition(|coin| !coin.is_ibc());

        let (prices, quotes) = if request.prices_enabled {
            tokio::join!(self.prices.resolve(), self.load_quotes(request))
        } else {
            (self.prices.cached(), None)
        };

        let quotes =
            quotes.map(|q| synthesize_reference_quote(&q, STABLECOIN_DENOM, prices.stablecoin_usd));

        let ctx = PriceContext {
            quotes: quotes.as_ref(),
            stablecoin_usd: prices.stablecoin_usd,
            staking_usd: prices.staking_usd,
            mode: request.mode,
        };
        let options = FilterOptions {
            prices_enabled: request.prices_enabled,
            show_all: request.show_low_value_coins,
            mode: request.mode,
            standard_policy: self.standard_policy,
        };
        let coins = filter_coins(enrich_coins(&native, &ctx), &options);

        let tokens = rank_tokens(
            token_rows(&ibc, &request.ibc_whitelist, &request.contract_tokens),
            !request.show_low_value_tokens,
        );

        info!(
            coins = coins.len(),
            hidden = native.len() - coins.len(),
            tokens = tokens.len(),
            "holdings built"
        );

        HoldingsView {
            coins,
            tokens,
            prices,
            quotes,
        }
    }
}
