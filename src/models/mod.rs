mod coin;
mod denom;
mod quote;

pub use coin::{
    from_minor_units, parse_minor_units, to_minor_units, AmountError, Coin, ContractToken,
    DISPLAY_DECIMALS,
};
pub use denom::{
    classic_symbol, ibc_hash, is_always_shown, is_ibc_denom, is_redenominated, NetworkMode,
    STABLECOIN_DENOM, STAKING_DENOM,
};
pub use quote::{MarketQuote, QuoteSet};
