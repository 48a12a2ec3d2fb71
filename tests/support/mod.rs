use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use wallet_holdings::config::ResolvedConfig;

pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// Config with every remote source pointed at `base_url` and the price cache
/// inside `dir`.
pub fn config_for(base_url: &str, dir: &Path) -> Result<ResolvedConfig> {
    let config_path = dir.join("wallet-holdings.toml");
    let content = format!(
        r#"cache_path = "price-cache.json"

[refresh]
price_ttl = "5m"
fx_ttl = "12h"

[sources]
coingecko_base_url = "{base_url}"
coinpaprika_base_url = "{base_url}"
frankfurter_base_url = "{base_url}"
fcd_base_url = "{base_url}"
"#
    );
    std::fs::write(&config_path, content)?;
    ResolvedConfig::load(&config_path)
}
