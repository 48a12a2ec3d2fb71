use std::collections::HashMap;

use anyhow::Result;
use rust_decimal::Decimal;

use crate::models::QuoteSet;

/// A remote source for the USD price of one tracked asset.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    /// `Ok(None)` when the source answered but the expected field was absent.
    async fn fetch_usd(&self) -> Result<Option<Decimal>>;

    fn name(&self) -> &str;
}

/// A remote source of FX rates quoted as "units of currency per one `base`".
#[async_trait::async_trait]
pub trait FxRateSource: Send + Sync {
    async fn fetch_rates(&self, base: &str, currencies: &[String]) -> Result<HashMap<String, f64>>;

    fn name(&self) -> &str;
}

/// A remote source of market swaprates against one base denom.
#[async_trait::async_trait]
pub trait SwaprateSource: Send + Sync {
    async fn fetch_swaprates(&self, base_denom: &str) -> Result<QuoteSet>;

    fn name(&self) -> &str;
}

/// Turn a JSON number into a usable price: finite and strictly positive.
pub(crate) fn positive_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    value.to_string().parse::<Decimal>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn positive_decimal_keeps_shortest_repr() {
        assert_eq!(positive_decimal(1.02), Some(Decimal::from_str("1.02").unwrap()));
        assert_eq!(
            positive_decimal(0.00009012),
            Some(Decimal::from_str("0.00009012").unwrap())
        );
    }

    #[test]
    fn positive_decimal_rejects_unusable_numbers() {
        assert_eq!(positive_decimal(0.0), None);
        assert_eq!(positive_decimal(-1.0), None);
        assert_eq!(positive_decimal(f64::NAN), None);
        assert_eq!(positive_decimal(f64::INFINITY), None);
        // Larger than Decimal can hold.
        assert_eq!(positive_decimal(1e300), None);
    }
}
