//! CoinPaprika ticker source, used as a fallback for a single asset.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::prices::source::positive_decimal;
use crate::prices::PriceSource;

pub const COINPAPRIKA_API_BASE: &str = "https://api.coinpaprika.com";

#[derive(Debug, Deserialize)]
struct TickerResponse {
    quotes: Option<Quotes>,
}

#[derive(Debug, Deserialize)]
struct Quotes {
    #[serde(rename = "USD")]
    usd: Option<UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: Option<f64>,
}

impl TickerResponse {
    fn usd_price(&self) -> Option<Decimal> {
        self.quotes
            .as_ref()?
            .usd
            .as_ref()?
            .price
            .and_then(positive_decimal)
    }
}

pub struct CoinPaprikaPriceSource {
    client: Client,
    base_url: String,
    ticker_id: String,
}

impl CoinPaprikaPriceSource {
    pub fn new(ticker_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: COINPAPRIKA_API_BASE.to_string(),
            ticker_id: ticker_id.into(),
        }
    }

    pub fn stablecoin() -> Self {
        Self::new("ust-terrausd")
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait::async_trait]
impl PriceSource for CoinPaprikaPriceSource {
    async fn fetch_usd(&self) -> Result<Option<Decimal>> {
        let url = format!("{}/v1/tickers/{}", self.base_url, self.ticker_id);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinPaprika API error: {status} - {body}"));
        }

        let ticker: TickerResponse = response
            .json()
            .await
            .context("Failed to parse CoinPaprika ticker response")?;

        Ok(ticker.usd_price())
    }

    fn name(&self) -> &str {
        "coinpaprika"
    }
}
