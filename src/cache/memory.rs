use std::sync::{Mutex, PoisonError};

use rust_decimal::Decimal;

use super::{read_record, write_timestamp, write_value, CacheKey, CacheRecord, PriceCache, Slots};

/// In-process cache. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryPriceCache {
    slots: Mutex<Slots>,
}

impl MemoryPriceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw slot, e.g. to simulate what another session left behind.
    pub fn with_slot(self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), raw.into());
        self
    }
}

impl PriceCache for MemoryPriceCache {
    fn get(&self, key: CacheKey) -> Option<CacheRecord> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        read_record(&slots, key)
    }

    fn set(&self, key: CacheKey, value: Decimal, now_millis: i64) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        write_value(&mut slots, key, value, now_millis);
    }

    fn touch(&self, key: CacheKey, now_millis: i64) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        write_timestamp(&mut slots, key, now_millis);
    }
}
