use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{read_record, write_timestamp, write_value, CacheKey, CacheRecord, PriceCache, Slots};

/// Cache persisted as a single flat JSON object of string slots.
///
/// ```text
/// {
///   "price:stablecoin": "1.02",
///   "price:stablecoin:ts": "1760000000000",
///   "price:staking": "0.00009",
///   "price:staking:ts": "1760000000000"
/// }
/// ```
///
/// Every write rewrites the whole file through a temp file and a rename, so a
/// reader never sees a value without its timestamp.
pub struct JsonFilePriceCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePriceCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Slots> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Slots::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read price cache: {}", self.path.display())
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Slots::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse price cache: {}", self.path.display()))
    }

    fn load_or_empty(&self) -> Slots {
        match self.load() {
            Ok(slots) => slots,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "treating price cache as empty");
                Slots::new()
            }
        }
    }

    fn persist(&self, slots: &Slots) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;

        let content = serde_json::to_string_pretty(slots).context("Failed to serialize JSON")?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(content.as_bytes())
            .context("Failed to write price cache")?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn update(&self, key: CacheKey, apply: impl FnOnce(&mut Slots)) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut slots = self.load_or_empty();
        apply(&mut slots);
        match self.persist(&slots) {
            Ok(()) => debug!(quantity = %key, path = %self.path.display(), "price cache written"),
            Err(e) => warn!(quantity = %key, error = %e, "failed to write price cache"),
        }
    }
}

impl PriceCache for JsonFilePriceCache {
    fn get(&self, key: CacheKey) -> Option<CacheRecord> {
        read_record(&self.load_or_empty(), key)
    }

    fn set(&self, key: CacheKey, value: Decimal, now_millis: i64) {
        self.update(key, |slots| write_value(slots, key, value, now_millis));
    }

    fn touch(&self, key: CacheKey, now_millis: i64) {
        self.update(key, |slots| write_timestamp(slots, key, now_millis));
    }
}
