//! Point cache for the two resolved reference prices.
//!
//! Each tracked quantity occupies two string slots, `price:<quantity>` and
//! `price:<quantity>:ts`. A successful resolution writes both; a failed one
//! writes only the timestamp, which keeps the last good value but holds off
//! retries until the TTL elapses.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use tracing::warn;

mod json_file;
mod memory;

pub use json_file::JsonFilePriceCache;
pub use memory::MemoryPriceCache;

/// The quantities the cache knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    StablecoinPrice,
    StakingPrice,
}

impl CacheKey {
    pub fn quantity(self) -> &'static str {
        match self {
            CacheKey::StablecoinPrice => "stablecoin",
            CacheKey::StakingPrice => "staking",
        }
    }

    pub fn value_slot(self) -> String {
        format!("price:{}", self.quantity())
    }

    pub fn timestamp_slot(self) -> String {
        format!("price:{}:ts", self.quantity())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.quantity())
    }
}

/// What the cache holds for one quantity.
///
/// `value` is `None` when the only thing recorded is a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord {
    pub value: Option<Decimal>,
    pub written_at_millis: i64,
}

impl CacheRecord {
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis.saturating_sub(self.written_at_millis)
    }

    /// A record stamped in the future counts as stale.
    pub fn is_fresh(&self, now_millis: i64, ttl: Duration) -> bool {
        let ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let age = self.age_millis(now_millis);
        (0..ttl_millis).contains(&age)
    }
}

/// Synchronous, infallible key-value cache for resolved prices.
///
/// Backends swallow their own I/O errors: a read problem is a miss and a
/// write problem is logged.
pub trait PriceCache: Send + Sync {
    fn get(&self, key: CacheKey) -> Option<CacheRecord>;

    /// Write value and timestamp together.
    fn set(&self, key: CacheKey, value: Decimal, now_millis: i64);

    /// Update the timestamp only, keeping whatever value is stored.
    fn touch(&self, key: CacheKey, now_millis: i64);
}

pub(crate) type Slots = BTreeMap<String, String>;

pub(crate) fn read_record(slots: &Slots, key: CacheKey) -> Option<CacheRecord> {
    let raw_ts = slots.get(&key.timestamp_slot())?;
    let written_at_millis = match raw_ts.trim().parse::<i64>() {
        Ok(ts) => ts,
        Err(_) => {
            warn!(quantity = %key, raw = %raw_ts, "ignoring corrupt cache timestamp");
            return None;
        }
    };

    let value = slots.get(&key.value_slot()).and_then(|raw| {
        match Decimal::from_str(raw.trim()) {
            Ok(value) if !value.is_sign_negative() => Some(value),
            _ => {
                warn!(quantity = %key, raw = %raw, "ignoring corrupt cached price");
                None
            }
        }
    });

    Some(CacheRecord {
        value,
        written_at_millis,
    })
}

pub(crate) fn write_value(slots: &mut Slots, key: CacheKey, value: Decimal, now_millis: i64) {
    slots.insert(key.value_slot(), value.normalize().to_string());
    slots.insert(key.timestamp_slot(), now_millis.to_string());
}

pub(crate) fn write_timestamp(slots: &mut Slots, key: CacheKey, now_millis: i64) {
    slots.insert(key.timestamp_slot(), now_millis.to_string());
}
