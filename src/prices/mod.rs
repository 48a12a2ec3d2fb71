//! Reference prices: the stablecoin and staking token in USD, plus a small
//! FX table, each resolved from remote sources behind a TTL.

mod fx;
pub mod providers;
mod resolver;
mod service;
pub(crate) mod source;

pub use fx::{FxRateTable, FxTable, FX_BASE};
pub use resolver::{Attempt, PriceOrigin, PriceResolver, Resolution};
pub use service::{ReferencePriceService, ReferencePrices};
pub use source::{FxRateSource, PriceSource, SwaprateSource};
