//! CoinGecko spot price source.
//!
//! Uses the free `/simple/price` endpoint. One request asks for several coin
//! ids at once because the same asset is listed under different ids over
//! time; the first id with a price wins.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;

use crate::prices::source::positive_decimal;
use crate::prices::PriceSource;

pub const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// `{ "<id>": { "<currency>": number | null } }`
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

pub struct CoinGeckoPriceSource {
    client: Client,
    base_url: String,
    /// Candidate ids in priority order.
    ids: Vec<String>,
    /// Quote currency for prices (e.g., "usd")
    quote_currency: String,
}

impl CoinGeckoPriceSource {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            client: Client::new(),
            base_url: COINGECKO_API_BASE.to_string(),
            ids: ids.into_iter().map(Into::into).collect(),
            quote_currency: "usd".to_string(),
        }
    }

    /// Stablecoin ids, current listing first.
    pub fn stablecoin() -> Self {
        Self::new(["terrausd", "terraclassicusd"])
    }

    /// Staking token ids, current listing first.
    pub fn staking() -> Self {
        Self::new(["terra", "terra-luna-2"])
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    fn pick_price(&self, data: &SimplePriceResponse) -> Option<Decimal> {
        self.ids.iter().find_map(|id| {
            data.get(id)
                .and_then(|prices| prices.get(&self.quote_currency))
                .copied()
                .flatten()
                .and_then(positive_decimal)
        })
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinGeckoPriceSource {
    async fn fetch_usd(&self) -> Result<Option<Decimal>> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            self.ids.join(","),
            self.quote_currency
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinGecko simple/price API error: {status} - {body}"));
        }

        let data: SimplePriceResponse = response
            .json()
            .await
            .context("Failed to parse CoinGecko simple/price response")?;

        Ok(self.pick_price(&data))
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}
