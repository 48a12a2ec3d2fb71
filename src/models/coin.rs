use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::denom::is_ibc_denom;

/// Decimal places of every native and IBC minor unit unless a whitelist says otherwise.
pub const DISPLAY_DECIMALS: u32 = 6;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount {0:?} is negative")]
    Negative(String),
    #[error("amount {0:?} is not an integer number of minor units")]
    NotInteger(String),
}

/// One balance line: a denom and its amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    /// Amount as string; supplies can exceed any fixed-width integer.
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    pub fn minor_units(&self) -> Result<BigInt, AmountError> {
        parse_minor_units(&self.amount)
    }

    /// Amount in display units under the fixed 6-decimal convention.
    pub fn display_amount(&self) -> Result<BigDecimal, AmountError> {
        Ok(from_minor_units(&self.minor_units()?, DISPLAY_DECIMALS))
    }

    pub fn is_ibc(&self) -> bool {
        is_ibc_denom(&self.denom)
    }
}

/// A CW20 balance as reported by the token registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractToken {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub symbol: String,
    pub balance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ContractToken {
    pub fn new(symbol: impl Into<String>, balance: impl Into<String>) -> Self {
        Self {
            address: None,
            symbol: symbol.into(),
            balance: balance.into(),
            decimals: None,
            icon: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }
}

/// Parse a non-negative integer amount of minor units.
pub fn parse_minor_units(amount: &str) -> Result<BigInt, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(trimmed.to_string()));
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AmountError::NotInteger(trimmed.to_string()));
    }
    BigInt::from_str(trimmed).map_err(|_| AmountError::NotInteger(trimmed.to_string()))
}

/// Shift minor units into display units. Exact: only the scale changes.
pub fn from_minor_units(units: &BigInt, decimals: u32) -> BigDecimal {
    BigDecimal::new(units.clone(), i64::from(decimals))
}

/// Shift display units back into minor units, truncating past `decimals` places.
pub fn to_minor_units(value: &BigDecimal, decimals: u32) -> BigInt {
    let (digits, _) = value.with_scale(i64::from(decimals)).into_bigint_and_exponent();
    digits
}
