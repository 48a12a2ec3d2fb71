use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// One market quote: how many minor units of `denom` trade for one minor unit
/// of the reference asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub denom: String,
    pub swaprate: String,
    #[serde(default)]
    pub one_day_variation: String,
    #[serde(default)]
    pub one_day_variation_rate: String,
}

impl MarketQuote {
    pub fn new(denom: impl Into<String>, swaprate: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            swaprate: swaprate.into(),
            one_day_variation: "0".to_string(),
            one_day_variation_rate: "0".to_string(),
        }
    }

    /// The swaprate as a decimal; `None` when unparseable or not positive.
    pub fn rate(&self) -> Option<BigDecimal> {
        BigDecimal::from_str(self.swaprate.trim())
            .ok()
            .filter(|rate| rate > &BigDecimal::zero())
    }
}

/// Quotes keyed uniquely by denom, in the order they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuoteSet {
    quotes: Vec<MarketQuote>,
}

impl QuoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quote unless its denom is already quoted. Returns whether it was added.
    pub fn insert(&mut self, quote: MarketQuote) -> bool {
        if self.contains(&quote.denom) {
            return false;
        }
        self.quotes.push(quote);
        true
    }

    pub fn get(&self, denom: &str) -> Option<&MarketQuote> {
        self.quotes.iter().find(|q| q.denom == denom)
    }

    pub fn contains(&self, denom: &str) -> bool {
        self.get(denom).is_some()
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarketQuote> {
        self.quotes.iter()
    }
}

impl FromIterator<MarketQuote> for QuoteSet {
    fn from_iter<I: IntoIterator<Item = MarketQuote>>(iter: I) -> Self {
        let mut set = QuoteSet::new();
        for quote in iter {
            set.insert(quote);
        }
        set
    }
}
