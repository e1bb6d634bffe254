//! Decimal amount conversion.
//!
//! Amounts arrive as human-readable decimal strings ("0.5", "10") and the
//! pool deals in integer base units. Conversion is done on the digit
//! string, never through floats, so `to_base_units` is exactly
//! `floor(amount * 10^decimals)`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount contains an invalid character: {0:?}")]
    InvalidCharacter(char),
    #[error("amount overflows the asset's base-unit range")]
    Overflow,
}

/// Converts a decimal string to base units, truncating fraction digits
/// beyond `decimals`.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<u64, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = int_part
        .chars()
        .chain(frac_part.chars())
        .find(|c| !c.is_ascii_digit())
    {
        return Err(AmountError::InvalidCharacter(c));
    }

    let scale = 10u128.pow(decimals as u32);
    let int_val: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| AmountError::Overflow)?
    };

    let mut frac_val: u128 = 0;
    for c in frac_part.chars().take(decimals as usize) {
        frac_val = frac_val * 10 + (c as u8 - b'0') as u128;
    }
    let taken = frac_part.len().min(decimals as usize) as u32;
    frac_val *= 10u128.pow(decimals as u32 - taken);

    let total = int_val
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_val))
        .ok_or(AmountError::Overflow)?;
    u64::try_from(total).map_err(|_| AmountError::Overflow)
}

/// Renders base units back as a decimal string, trimming trailing zeros.
pub fn from_base_units(amount: u64, decimals: u8) -> String {
    if decimals == 0 {
        return amount.to_string();
    }
    let scale = 10u128.pow(decimals as u32);
    let amount = amount as u128;
    let whole = amount / scale;
    let frac = amount % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
