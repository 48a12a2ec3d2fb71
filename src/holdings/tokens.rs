use std::collections::HashMap;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    from_minor_units, ibc_hash, parse_minor_units, Coin, ContractToken, DISPLAY_DECIMALS,
};

/// Rows below 0.01 display units are hidden with low balances.
fn min_token_value() -> BigDecimal {
    BigDecimal::new(BigInt::from(1), 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Ibc,
    Cw20,
}

/// Registry entry for an IBC asset, keyed by the hash after `ibc/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IbcAssetInfo {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub decimals: Option<u32>,
}

pub type IbcWhitelist = HashMap<String, IbcAssetInfo>;

/// One IBC or CW20 line, valued in its own display units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenRow {
    /// Denom for IBC rows, contract address (or symbol) for CW20 rows.
    pub key: String,
    pub kind: TokenKind,
    pub symbol: String,
    /// Raw balance in minor units.
    pub amount: String,
    pub decimals: u32,
    /// `amount / 10^decimals`.
    pub value: BigDecimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn ibc_row(coin: &Coin, whitelist: &IbcWhitelist) -> Option<TokenRow> {
    let info = ibc_hash(&coin.denom).and_then(|hash| whitelist.get(hash));
    let decimals = info.and_then(|i| i.decimals).unwrap_or(DISPLAY_DECIMALS);

    let units = match parse_minor_units(&coin.amount) {
        Ok(units) => units,
        Err(e) => {
            debug!(denom = %coin.denom, error = %e, "skipping IBC balance");
            return None;
        }
    };

    Some(TokenRow {
        key: coin.denom.clone(),
        kind: TokenKind::Ibc,
        symbol: info
            .and_then(|i| i.symbol.clone())
            .unwrap_or_else(|| coin.denom.clone()),
        amount: coin.amount.clone(),
        decimals,
        value: from_minor_units(&units, decimals),
        icon: info.and_then(|i| i.icon.clone()),
        address: None,
    })
}

fn cw20_row(token: &ContractToken) -> Option<TokenRow> {
    let units = match parse_minor_units(&token.balance) {
        Ok(units) => units,
        Err(e) => {
            debug!(symbol = %token.symbol, error = %e, "skipping CW20 balance");
            return None;
        }
    };
    if units.is_zero() {
        return None;
    }

    let decimals = token.decimals.unwrap_or(DISPLAY_DECIMALS);
    Some(TokenRow {
        key: token
            .address
            .clone()
            .unwrap_or_else(|| token.symbol.clone()),
        kind: TokenKind::Cw20,
        symbol: token.symbol.clone(),
        amount: token.balance.clone(),
        decimals,
        value: from_minor_units(&units, decimals),
        icon: token.icon.clone(),
        address: token.address.clone(),
    })
}

/// IBC rows followed by CW20 rows. Zero CW20 balances and unparseable
/// amounts are left out.
pub fn token_rows(
    ibc_coins: &[Coin],
    whitelist: &IbcWhitelist,
    contract_tokens: &[ContractToken],
) -> Vec<TokenRow> {
    ibc_coins
        .iter()
        .filter_map(|coin| ibc_row(coin, whitelist))
        .chain(contract_tokens.iter().filter_map(cw20_row))
        .collect()
}

/// Sort descending by value, optionally dropping rows under 0.01.
///
/// The sort is stable, so equal values keep their input order.
pub fn rank_tokens(mut rows: Vec<TokenRow>, hide_low_value: bool) -> Vec<TokenRow> {
    if hide_low_value {
        let min = min_token_value();
        rows.retain(|row| row.value >= min);
    }
    rows.sort_by(|a, b| b.value.cmp(&a.value));
    rows
}
