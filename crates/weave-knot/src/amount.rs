//! Conversion between human decimal strings and base-unit amounts.
//!
//! The ledger fixes every token at 12 fractional digits. Parsing truncates
//! anything past the 12th digit; it never rounds.

use thiserror::Error;

/// Fractional digits of the base unit.
pub const DECIMALS: u32 = 12;

const SCALE: u128 = 10u128.pow(DECIMALS);

/// Errors from [`parse_amount`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),

    #[error("more than one decimal point")]
    MultipleDecimalPoints,

    #[error("amount exceeds u128 range")]
    Overflow,
}

/// Parse a decimal string into base units (scaled by 10^12).
///
/// Accepts `"1"`, `"1.5"`, `"1."` and `".5"`. Signs, separators and
/// exponents are rejected.
pub fn parse_amount(input: &str) -> Result<u128, AmountError> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => {
            if f.contains('.') {
                return Err(AmountError::MultipleDecimalPoints);
            }
            (w, f)
        }
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(AmountError::Empty);
    }
    if let Some(c) = whole.chars().chain(frac.chars()).find(|c| !c.is_ascii_digit()) {
        return Err(AmountError::InvalidCharacter(c));
    }

    let mut units: u128 = 0;
    for d in whole.bytes() {
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_add(u128::from(d - b'0')))
            .ok_or(AmountError::Overflow)?;
    }
    units = units.checked_mul(SCALE).ok_or(AmountError::Overflow)?;

    let mut fraction: u128 = 0;
    let kept = frac.bytes().take(DECIMALS as usize);
    let mut digits = 0;
    for d in kept {
        fraction = fraction * 10 + u128::from(d - b'0');
        digits += 1;
    }
    fraction *= 10u128.pow(DECIMALS - digits);

    units.checked_add(fraction).ok_or(AmountError::Overflow)
}

/// Format base units as the shortest decimal string.
///
/// Trailing fractional zeros are stripped and at least one integer digit is
/// always present.
pub fn format_amount(units: u128) -> String {
    let whole = units / SCALE;
    let frac = units % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}
