use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::source::positive_decimal;
use super::FxRateSource;
use crate::clock::{Clock, SystemClock};

/// Base currency every FX rate is fetched against.
pub const FX_BASE: &str = "USD";

/// USD value of one unit of each tracked currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FxTable {
    usd_per_unit: BTreeMap<String, Decimal>,
}

impl FxTable {
    /// Invert "units per USD" rates for the requested codes.
    ///
    /// A code is left out when its rate is missing, zero, negative, not finite,
    /// or too extreme to invert.
    pub fn from_rates(rates: &HashMap<String, f64>, currencies: &[String]) -> Self {
        let usd_per_unit = currencies
            .iter()
            .map(|code| code.trim().to_uppercase())
            .filter_map(|code| {
                let rate = rates.get(&code).copied().and_then(positive_decimal)?;
                let inverted = Decimal::ONE.checked_div(rate)?;
                (!inverted.is_zero()).then_some((code, inverted))
            })
            .collect();

        Self { usd_per_unit }
    }

    pub fn usd_per_unit(&self, code: &str) -> Option<Decimal> {
        self.usd_per_unit.get(&code.trim().to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.usd_per_unit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usd_per_unit.is_empty()
    }
}

#[derive(Default)]
struct FxState {
    table: Option<FxTable>,
    attempted_at_millis: Option<i64>,
}

/// FX table refreshed at most once per TTL window, success or not.
///
/// Lives in memory only; the lock around the state also coalesces
/// concurrent refreshes.
pub struct FxRateTable {
    source: Arc<dyn FxRateSource>,
    currencies: Vec<String>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<FxState>,
}

impl FxRateTable {
    pub fn new(source: Arc<dyn FxRateSource>, currencies: Vec<String>, ttl: Duration) -> Self {
        Self {
            source,
            currencies,
            ttl,
            clock: Arc::new(SystemClock),
            state: Mutex::new(FxState::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn resolve(&self) -> Option<FxTable> {
        let mut state = self.state.lock().await;
        let now = self.clock.now_millis();
        let ttl_millis = i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX);

        if let Some(attempted) = state.attempted_at_millis {
            let age = now.saturating_sub(attempted);
            if age < ttl_millis {
                debug!(age_ms = age, "FX table still fresh, skipping fetch");
                return state.table.clone();
            }
        }

        match self.source.fetch_rates(FX_BASE, &self.currencies).await {
            Ok(rates) => {
                let table = FxTable::from_rates(&rates, &self.currencies);
                info!(
                    source = %self.source.name(),
                    currencies = table.len(),
                    "FX table fetched"
                );
                state.table = Some(table);
            }
            Err(e) => {
                warn!(source = %self.source.name(), error = %e, "FX source unavailable");
            }
        }

        state.attempted_at_millis = Some(self.clock.now_millis());
        state.table.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use anyhow::Result;
    use chrono::{TimeZone, Utc};
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn codes() -> Vec<String> {
        vec!["MNT".to_string(), "TWD".to_string()]
    }

    #[test]
    fn inverts_rates() {
        let rates = HashMap::from([("MNT".to_string(), 3450.0), ("TWD".to_string(), 32.0)]);
        let table = FxTable::from_rates(&rates, &codes());

        assert_eq!(table.len(), 2);
        assert_eq!(table.usd_per_unit("TWD"), Some(Decimal::from_str("0.03125").unwrap()));
        let mnt = table.usd_per_unit("mnt").unwrap();
        assert!((mnt * Decimal::from(3450) - Decimal::ONE).abs() < Decimal::new(1, 20));
    }

    #[test]
    fn omits_unusable_rates() {
        let rates = HashMap::from([
            ("MNT".to_string(), 0.0),
            ("TWD".to_string(), f64::INFINITY),
            ("EUR".to_string(), 0.9),
        ]);
        let table = FxTable::from_rates(&rates, &codes());
        assert!(table.is_empty());
        assert_eq!(table.usd_per_unit("MNT"), None);
    }

    #[test]
    fn omits_missing_codes() {
        let rates = HashMap::from([("TWD".to_string(), 32.0)]);
        let table = FxTable::from_rates(&rates, &codes());
        assert_eq!(table.len(), 1);
        assert_eq!(table.usd_per_unit("MNT"), None);
    }

    struct CountingFx {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl FxRateSource for CountingFx {
        async fn fetch_rates(&self, base: &str, _currencies: &[String]) -> Result<HashMap<String, f64>> {
            assert_eq!(base, "USD");
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("rate limited");
            }
            Ok(HashMap::from([("TWD".to_string(), 32.0)]))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    #[tokio::test]
    async fn refreshes_once_per_ttl() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
        let source = Arc::new(CountingFx {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let fx = FxRateTable::new(source.clone(), codes(), Duration::from_secs(12 * 3600))
            .with_clock(clock.clone());

        let (a, b) = tokio::join!(fx.resolve(), fx.resolve());
        assert_eq!(a, b);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::hours(11));
        fx.resolve().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::hours(2));
        fx.resolve().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_backs_off_too() {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()));
        let source = Arc::new(CountingFx {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let fx = FxRateTable::new(source.clone(), codes(), Duration::from_secs(12 * 3600))
            .with_clock(clock.clone());

        assert_eq!(fx.resolve().await, None);
        assert_eq!(fx.resolve().await, None);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }
}
