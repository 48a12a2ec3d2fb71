use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::PriceSource;
use crate::cache::{CacheKey, PriceCache};
use crate::clock::{Clock, SystemClock};

/// Outcome of asking one source for a price.
#[derive(Debug)]
pub enum Attempt {
    Resolved(Decimal),
    /// The source answered without the field we need.
    Missing,
    /// Network failure, non-2xx status or unparseable payload.
    Unavailable(anyhow::Error),
}

impl From<Result<Option<Decimal>>> for Attempt {
    fn from(result: Result<Option<Decimal>>) -> Self {
        match result {
            Ok(Some(price)) => Attempt::Resolved(price),
            Ok(None) => Attempt::Missing,
            Err(e) => Attempt::Unavailable(e),
        }
    }
}

/// Where a resolved price came from this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceOrigin {
    /// The cache was inside its TTL; no request was made.
    Cache,
    /// A source answered and the cache was updated.
    Network,
    /// Every source failed; the price (if any) is the last cached one.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub price: Option<Decimal>,
    pub origin: PriceOrigin,
}

/// Resolves one tracked price from an ordered list of sources, behind a TTL cache.
///
/// Concurrent callers are serialized on an internal lock held across the
/// whole check-fetch-write sequence, so a caller that waited finds the cache
/// already refreshed (or already marked as failed) and makes no request.
pub struct PriceResolver {
    key: CacheKey,
    ttl: Duration,
    sources: Vec<Arc<dyn PriceSource>>,
    cache: Arc<dyn PriceCache>,
    clock: Arc<dyn Clock>,
    in_flight: Mutex<()>,
}

impl PriceResolver {
    pub fn new(
        key: CacheKey,
        ttl: Duration,
        primary: Arc<dyn PriceSource>,
        cache: Arc<dyn PriceCache>,
    ) -> Self {
        Self {
            key,
            ttl,
            sources: vec![primary],
            cache,
            clock: Arc::new(SystemClock),
            in_flight: Mutex::new(()),
        }
    }

    /// Source tried after every earlier one failed.
    pub fn with_fallback(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Last cached price, without touching the network.
    pub fn cached(&self) -> Option<Decimal> {
        self.cache.get(self.key).and_then(|record| record.value)
    }

    pub async fn resolve(&self) -> Resolution {
        let _in_flight = self.in_flight.lock().await;

        let now = self.clock.now_millis();
        let cached = self.cache.get(self.key);
        if let Some(record) = cached.filter(|r| r.is_fresh(now, self.ttl)) {
            debug!(
                quantity = %self.key,
                age_ms = record.age_millis(now),
                has_value = record.value.is_some(),
                "cached price still fresh, skipping fetch"
            );
            return Resolution {
                price: record.value,
                origin: PriceOrigin::Cache,
            };
        }

        for source in &self.sources {
            match Attempt::from(source.fetch_usd().await) {
                Attempt::Resolved(price) => {
                    self.cache.set(self.key, price, self.clock.now_millis());
                    info!(
                        quantity = %self.key,
                        source = %source.name(),
                        price = %price,
                        "price fetched and cached"
                    );
                    return Resolution {
                        price: Some(price),
                        origin: PriceOrigin::Network,
                    };
                }
                Attempt::Missing => {
                    warn!(
                        quantity = %self.key,
                        source = %source.name(),
                        "source returned no usable price"
                    );
                }
                Attempt::Unavailable(e) => {
                    warn!(
                        quantity = %self.key,
                        source = %source.name(),
                        error = %e,
                        "price source unavailable"
                    );
                }
            }
        }

        self.cache.touch(self.key, self.clock.now_millis());
        let price = cached.and_then(|record| record.value);
        debug!(
            quantity = %self.key,
            has_cached = price.is_some(),
            "all price sources failed, backing off until TTL elapses"
        );
        Resolution {
            price,
            origin: PriceOrigin::Fallback,
        }
    }
}
