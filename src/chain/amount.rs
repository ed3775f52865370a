//! Conversion between human-readable token amounts and on-chain base units.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Largest decimal scale accepted for a coin.
pub const MAX_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount {0} is negative")]
    Negative(Decimal),

    #[error("decimal scale {0} is outside 0..={MAX_DECIMALS}")]
    UnsupportedScale(u8),

    #[error("amount {amount} with {decimals} decimals does not fit in u64 base units")]
    Overflow { amount: Decimal, decimals: u8 },

    #[error("slippage {0} must be a fraction between 0 and 1")]
    SlippageOutOfRange(Decimal),

    #[error("'{0}' is not a decimal number")]
    NotANumber(String),
}

fn scale_factor(decimals: u8) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedScale(decimals));
    }
    Ok(Decimal::from(10u64.pow(u32::from(decimals))))
}

/// Convert a human amount into integer base units (`amount * 10^decimals`).
///
/// Digits finer than one base unit are truncated toward zero.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, AmountError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(AmountError::Negative(amount));
    }
    let factor = scale_factor(decimals)?;
    let scaled = amount
        .checked_mul(factor)
        .ok_or(AmountError::Overflow { amount, decimals })?;
    scaled
        .trunc()
        .to_u64()
        .ok_or(AmountError::Overflow { amount, decimals })
}

/// Inverse of [`to_base_units`] for amounts that fit in base units exactly.
pub fn from_base_units(units: u64, decimals: u8) -> Result<Decimal, AmountError> {
    if decimals > MAX_DECIMALS {
        return Err(AmountError::UnsupportedScale(decimals));
    }
    Ok(Decimal::from_i128_with_scale(i128::from(units), u32::from(decimals)).normalize())
}

/// Convert a slippage fraction (0.01 = 1%) to basis points, rounding half up.
pub fn slippage_to_bps(slippage: Decimal) -> Result<u64, AmountError> {
    if slippage < Decimal::ZERO || slippage > Decimal::ONE {
        return Err(AmountError::SlippageOutOfRange(slippage));
    }
    (slippage * Decimal::from(10_000u32))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(AmountError::SlippageOutOfRange(slippage))
}

/// Read a JSON number as an exact decimal.
///
/// Goes through the number's shortest textual form so that values such as
/// `0.1` do not pick up binary floating point noise.
pub fn decimal_from_json(number: &serde_json::Number) -> Result<Decimal, AmountError> {
    let raw = number.to_string();
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| AmountError::NotANumber(raw))
}
