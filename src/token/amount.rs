//! Decimal amount parsing into fixed-point magnitudes.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;
use thiserror::Error;

/// Fractional digits of the token.
pub const TOKEN_DECIMALS: u8 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount must be a positive number")]
    NotNumeric,

    #[error("Amount must be a positive number")]
    NotPositive,

    #[error("Amount supports at most {0} decimal places")]
    TooManyDecimals(u8),

    #[error("Amount exceeds the maximum transferable value")]
    Overflow,
}

fn all_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Parse a decimal string such as `"1.5"` into base units at `decimals`
/// fractional digits, requiring a positive result that fits in 64 bits.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u64, AmountError> {
    let amount = amount.trim();
    let (negative, unsigned) = match amount.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, amount.strip_prefix('+').unwrap_or(amount)),
    };

    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(AmountError::NotNumeric);
    }

    let is_zero = int_part.chars().chain(frac_part.chars()).all(|c| c == '0');
    if negative || is_zero {
        return Err(AmountError::NotPositive);
    }

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }

    let scale = U256::from(10u64).pow(U256::from(decimals));
    let int_value = if int_part.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(int_part, 10).map_err(|_| AmountError::Overflow)?
    };

    let mut frac_digits = frac_trimmed.to_string();
    frac_digits.extend(std::iter::repeat('0').take(decimals as usize - frac_trimmed.len()));
    let frac_value = if frac_digits.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&frac_digits, 10).map_err(|_| AmountError::Overflow)?
    };

    let total = int_value
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or(AmountError::Overflow)?;

    u64::try_from(total).map_err(|_| AmountError::Overflow)
}

/// Render base units as a decimal token amount.
pub fn format_amount(raw: U256, decimals: u8) -> String {
    format_units(raw, decimals).unwrap_or_else(|_| raw.to_string())
}
