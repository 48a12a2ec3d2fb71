use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::enrich::{EnrichedCoin, Valuation};
use crate::models::{is_always_shown, NetworkMode};

/// Smallest USD value kept by the value policy.
const MIN_VALUE_USD: i64 = 1;

/// Smallest amount kept by the magnitude policy: 0.01 display units.
const MIN_MINOR_UNITS: u32 = 10_000;

/// How dust is told apart from real balances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DustPolicy {
    /// Keep amounts of at least 10,000 minor units.
    #[default]
    Magnitude,
    /// Keep coins worth at least 1 USD. Unvalued coins are dropped.
    Value,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    pub prices_enabled: bool,
    /// The user asked to see low-value coins too.
    pub show_all: bool,
    pub mode: NetworkMode,
    /// Policy for the standard network.
    pub standard_policy: DustPolicy,
}

impl FilterOptions {
    /// The policy to apply, or `None` when the list passes through untouched.
    pub fn policy(&self) -> Option<DustPolicy> {
        if !self.prices_enabled || self.show_all {
            return None;
        }
        if self.mode.is_classic() {
            return Some(DustPolicy::Value);
        }
        Some(self.standard_policy)
    }
}

/// Drop dust according to `options`. Order is preserved.
pub fn filter_coins(coins: Vec<EnrichedCoin>, options: &FilterOptions) -> Vec<EnrichedCoin> {
    let Some(policy) = options.policy() else {
        return coins;
    };

    let min_value = BigDecimal::from(MIN_VALUE_USD);
    let min_units = BigInt::from(MIN_MINOR_UNITS);

    coins
        .into_iter()
        .filter(|enriched| {
            let denom = enriched.coin.denom.as_str();
            if is_always_shown(denom) {
                return true;
            }

            let keep = match policy {
                DustPolicy::Value => match &enriched.valuation {
                    Valuation::Known { usd } => *usd >= min_value,
                    Valuation::Unknown { reason } => {
                        debug!(denom, ?reason, "dropping coin without a USD value");
                        return false;
                    }
                },
                DustPolicy::Magnitude => enriched
                    .coin
                    .minor_units()
                    .is_ok_and(|units| units >= min_units),
            };

            if !keep {
                debug!(denom, amount = %enriched.coin.amount, ?policy, "dropping dust");
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holdings::enrich::UnknownReason;
    use crate::models::Coin;
    use std::str::FromStr;

    fn valued(denom: &str, amount: &str, usd: &str) -> EnrichedCoin {
        EnrichedCoin {
            coin: Coin::new(denom, amount),
            valuation: Valuation::Known {
                usd: BigDecimal::from_str(usd).unwrap(),
            },
        }
    }

    fn unvalued(denom: &str, amount: &str) -> EnrichedCoin {
        EnrichedCoin {
            coin: Coin::new(denom, amount),
            valuation: Valuation::Unknown {
                reason: UnknownReason::NoQuote,
            },
        }
    }

    fn classic() -> FilterOptions {
        FilterOptions {
            prices_enabled: true,
            mode: NetworkMode::Classic,
            ..Default::default()
        }
    }

    fn denoms(coins: &[EnrichedCoin]) -> Vec<&str> {
        coins.iter().map(|c| c.coin.denom.as_str()).collect()
    }

    #[test]
    fn overrides_return_input_unchanged() {
        let coins = vec![
            valued("ukrw", "1", "0.0001"),
            unvalued("umnt", "5"),
            valued("uluna", "1", "0"),
        ];

        let disabled = FilterOptions {
            prices_enabled: false,
            ..classic()
        };
        assert_eq!(filter_coins(coins.clone(), &disabled), coins);

        let show_all = FilterOptions {
            show_all: true,
            ..classic()
        };
        assert_eq!(filter_coins(coins.clone(), &show_all), coins);
    }

    #[test]
    fn value_policy_boundary() {
        let coins = vec![
            valued("ukrw", "1000000", "1.0"),
            valued("umnt", "1000000", "0.999999"),
            valued("usdr", "1000000", "0.50"),
        ];
        let kept = filter_coins(coins, &classic());
        assert_eq!(denoms(&kept), ["ukrw"]);
    }

    #[test]
    fn value_policy_drops_unknown_but_keeps_always_shown() {
        let coins = vec![
            unvalued("ukrw", "999999999999"),
            unvalued("uluna", "1"),
            valued("uusd", "500000", "0.51"),
        ];
        let kept = filter_coins(coins, &classic());
        assert_eq!(denoms(&kept), ["uluna", "uusd"]);
    }

    #[test]
    fn standard_mode_defaults_to_magnitude() {
        let options = FilterOptions {
            prices_enabled: true,
            ..Default::default()
        };
        assert_eq!(options.policy(), Some(DustPolicy::Magnitude));

        let coins = vec![
            unvalued("ukrw", "10000"),
            valued("umnt", "9999", "500"),
            unvalued("uluna", "1"),
            unvalued("usdr", "not-a-number"),
        ];
        let kept = filter_coins(coins, &options);
        assert_eq!(denoms(&kept), ["ukrw", "uluna"]);
    }

    #[test]
    fn standard_mode_can_use_value_policy() {
        let options = FilterOptions {
            prices_enabled: true,
            standard_policy: DustPolicy::Value,
            ..Default::default()
        };
        let coins = vec![valued("ukrw", "1", "2"), valued("umnt", "100000000", "0.5")];
        assert_eq!(denoms(&filter_coins(coins, &options)), ["ukrw"]);
    }

    #[test]
    fn classic_ignores_standard_policy() {
        let options = FilterOptions {
            standard_policy: DustPolicy::Magnitude,
            ..classic()
        };
        assert_eq!(options.policy(), Some(DustPolicy::Value));
    }

    #[test]
    fn policy_serde() {
        let policy: DustPolicy = serde_json::from_str(r#""value""#).unwrap();
        assert_eq!(policy, DustPolicy::Value);
        assert_eq!(serde_json::to_string(&DustPolicy::Magnitude).unwrap(), r#""magnitude""#);
    }
}
