//! Balance enrichment and dust filtering.
//!
//! A cycle runs: quote synthesis, USD valuation of every native coin, dust
//! filtering, then ranking of IBC and CW20 token rows.

mod enrich;
mod filter;
mod service;
mod tokens;

pub use enrich::{
    decimal_to_big, enrich_coins, synthesize_reference_quote, value_coin, EnrichedCoin,
    PriceContext, UnknownReason, Valuation,
};
pub use filter::{filter_coins, DustPolicy, FilterOptions};
pub use service::{swaprate_denom, HoldingsRequest, HoldingsService, HoldingsView};
pub use tokens::{rank_tokens, token_rows, IbcAssetInfo, IbcWhitelist, TokenKind, TokenRow};
