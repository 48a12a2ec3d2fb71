//! Swaprates from the chain's FCD (full client daemon) market endpoint.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::models::{MarketQuote, QuoteSet};
use crate::prices::SwaprateSource;

pub const FCD_BASE_URL: &str = "https://fcd.terra.dev";

pub struct FcdSwaprateSource {
    client: Client,
    base_url: String,
}

impl FcdSwaprateSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FCD_BASE_URL.to_string(),
        }
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

impl Default for FcdSwaprateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SwaprateSource for FcdSwaprateSource {
    async fn fetch_swaprates(&self, base_denom: &str) -> Result<QuoteSet> {
        let url = format!("{}/v1/market/swaprate/{}", self.base_url, base_denom);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("FCD swaprate API error: {status} - {body}"));
        }

        let quotes: Vec<MarketQuote> = response
            .json()
            .await
            .context("Failed to parse FCD swaprate response")?;

        Ok(quotes.into_iter().collect())
    }

    fn name(&self) -> &str {
        "fcd"
    }
}
