//! Frankfurter FX rate source (ECB daily reference rates).
//!
//! `/latest?from=USD&to=MNT,TWD` answers with "units of each target per one
//! USD". No API key is required.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::prices::FxRateSource;

pub const FRANKFURTER_BASE_URL: &str = "https://api.frankfurter.app";

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    /// Map of currency codes to rates. Absent when the service has nothing;
    /// a single code may also come back as `null`.
    #[serde(default)]
    rates: Option<HashMap<String, Option<f64>>>,
}

impl FrankfurterResponse {
    /// Numeric rates only. Null entries are left out.
    fn into_rates(self) -> Option<HashMap<String, f64>> {
        let rates = self.rates?;
        Some(
            rates
                .into_iter()
                .filter_map(|(code, rate)| rate.map(|rate| (code, rate)))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct FrankfurterRateSource {
    client: Client,
    base_url: String,
}

impl FrankfurterRateSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: FRANKFURTER_BASE_URL.to_string(),
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

impl Default for FrankfurterRateSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FxRateSource for FrankfurterRateSource {
    async fn fetch_rates(&self, base: &str, currencies: &[String]) -> Result<HashMap<String, f64>> {
        let base = base.trim().to_uppercase();
        let symbols = currencies
            .iter()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| *code != base)
            .collect::<Vec<_>>();

        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let url = format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            base,
            symbols.join(",")
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<FrankfurterResponse>()
            .await
            .context("Failed to parse Frankfurter response")?;

        response
            .into_rates()
            .ok_or_else(|| anyhow!("Frankfurter response has no rates"))
    }

    fn name(&self) -> &str {
        "frankfurter"
    }
}
