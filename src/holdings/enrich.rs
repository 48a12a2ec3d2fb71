use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, One};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{
    is_redenominated, AmountError, Coin, MarketQuote, NetworkMode, QuoteSet, STABLECOIN_DENOM,
    STAKING_DENOM,
};

/// Why a coin has no USD value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownReason {
    /// No market quote for the denom.
    NoQuote,
    /// Quoted, but the reference price needed to reach USD is missing.
    NoReferencePrice,
    /// The amount is not a non-negative integer.
    InvalidAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Valuation {
    Known { usd: BigDecimal },
    Unknown { reason: UnknownReason },
}

impl Valuation {
    pub fn usd(&self) -> Option<&BigDecimal> {
        match self {
            Valuation::Known { usd } => Some(usd),
            Valuation::Unknown { .. } => None,
        }
    }

    fn unknown(reason: UnknownReason) -> Self {
        Valuation::Unknown { reason }
    }
}

impl From<AmountError> for Valuation {
    fn from(_: AmountError) -> Self {
        Valuation::unknown(UnknownReason::InvalidAmount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedCoin {
    #[serde(flatten)]
    pub coin: Coin,
    pub valuation: Valuation,
}

/// Prices and quotes a coin is valued against.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceContext<'a> {
    pub quotes: Option<&'a QuoteSet>,
    pub stablecoin_usd: Option<Decimal>,
    pub staking_usd: Option<Decimal>,
    pub mode: NetworkMode,
}

/// Exact conversion; both types are an integer mantissa and a scale.
pub fn decimal_to_big(value: Decimal) -> BigDecimal {
    BigDecimal::new(BigInt::from(value.mantissa()), i64::from(value.scale()))
}

/// Append a quote for `denom` derived from its USD price, unless one exists.
///
/// The swaprate is `1 / price`. Nothing is added when the quote set already
/// has the denom or the price is missing or not positive.
pub fn synthesize_reference_quote(
    quotes: &QuoteSet,
    denom: &str,
    price_usd: Option<Decimal>,
) -> QuoteSet {
    let mut quotes = quotes.clone();
    let Some(price) = price_usd.filter(|p| p.is_sign_positive() && !p.is_zero()) else {
        return quotes;
    };
    if quotes.contains(denom) {
        return quotes;
    }

    let swaprate = BigDecimal::one() / decimal_to_big(price);
    quotes.insert(MarketQuote::new(denom, swaprate.normalized().to_string()));
    quotes
}

pub fn value_coin(coin: &Coin, ctx: &PriceContext<'_>) -> Valuation {
    let amount = match coin.display_amount() {
        Ok(amount) => amount,
        Err(e) => return e.into(),
    };

    let direct = match coin.denom.as_str() {
        STABLECOIN_DENOM => ctx.stablecoin_usd,
        STAKING_DENOM => ctx.staking_usd,
        _ => None,
    };
    if let Some(price) = direct {
        return Valuation::Known {
            usd: amount * decimal_to_big(price),
        };
    }

    let Some(rate) = ctx
        .quotes
        .and_then(|quotes| quotes.get(&coin.denom))
        .and_then(MarketQuote::rate)
    else {
        return Valuation::unknown(UnknownReason::NoQuote);
    };

    let value = amount / rate;
    if ctx.mode.is_classic() && is_redenominated(&coin.denom) {
        return match ctx.stablecoin_usd {
            Some(price) => Valuation::Known {
                usd: value * decimal_to_big(price),
            },
            None => Valuation::unknown(UnknownReason::NoReferencePrice),
        };
    }

    Valuation::Known { usd: value }
}

pub fn enrich_coins(coins: &[Coin], ctx: &PriceContext<'_>) -> Vec<EnrichedCoin> {
    coins
        .iter()
        .map(|coin| EnrichedCoin {
            coin: coin.clone(),
            valuation: value_coin(coin, ctx),
        })
        .collect()
}
