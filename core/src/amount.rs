//! Conversion between human-entered decimal amounts and integer base units.
//!
//! A token with `decimals = 6` has 1_000_000 base units per whole token,
//! so "1.5" becomes 1_500_000. Conversion never goes through floating point.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount cannot be empty")]
    Empty,
    #[error("Amount must be positive")]
    Negative,
    #[error("Invalid amount '{0}'")]
    Malformed(String),
    #[error("Too many decimal places. This token supports up to {max}.")]
    TooManyDecimals { max: u32 },
    #[error("Amount too large")]
    Overflow,
    #[error("Amount must be greater than 0")]
    Zero,
    #[error("Insufficient balance. At most {max} available.")]
    ExceedsBalance { max: String },
}

/// Largest precision whose unit (10^decimals) still fits in a u128.
pub const MAX_DECIMALS: u32 = 38;

fn unit(decimals: u32) -> Result<u128, AmountError> {
    10u128.checked_pow(decimals).ok_or(AmountError::Overflow)
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a human amount like "1.5" into base units for the given precision.
///
/// Trailing zeros past the precision are fine ("1.5000000" with 6 decimals);
/// any other digit there would leave a fractional base unit and is rejected.
pub fn to_base_units(input: &str, decimals: u32) -> Result<u128, AmountError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(AmountError::Empty);
    }
    if input.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(AmountError::Malformed(input.to_string()));
    }

    let scale = unit(decimals)?;
    let frac = frac.trim_end_matches('0');
    if frac.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals { max: decimals });
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| AmountError::Overflow)?
    };

    let frac_units: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = decimals as usize);
        padded
            .parse()
            .map_err(|_| AmountError::Malformed(input.to_string()))?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or(AmountError::Overflow)
}

/// Render base units as the shortest human amount: 1_500_000 -> "1.5".
#[must_use]
pub fn to_input(base_units: u128, decimals: u32) -> String {
    let Ok(unit) = unit(decimals) else {
        return "0".to_string();
    };
    let whole = base_units / unit;
    let frac = base_units % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:0>width$}", width = decimals as usize);
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Validate a typed amount against the spendable maximum.
///
/// Returns the base-unit amount when it is positive and affordable.
pub fn validate_input(input: &str, decimals: u32, max: u128) -> Result<u128, AmountError> {
    let amount = to_base_units(input, decimals)?;
    if amount == 0 {
        return Err(AmountError::Zero);
    }
    if amount > max {
        return Err(AmountError::ExceedsBalance {
            max: to_input(max, decimals),
        });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal() {
        assert_eq!(to_base_units("1.5", 6).unwrap(), 1_500_000);
    }

    #[test]
    fn parse_whole() {
        assert_eq!(to_base_units("2", 6).unwrap(), 2_000_000);
    }

    #[test]
    fn parse_smallest_unit() {
        assert_eq!(to_base_units("0.000001", 6).unwrap(), 1);
    }

    #[test]
    fn parse_leading_dot_and_trailing_dot() {
        assert_eq!(to_base_units(".5", 6).unwrap(), 500_000);
        assert_eq!(to_base_units("1.", 6).unwrap(), 1_000_000);
    }

    #[test]
    fn trailing_zeros_past_precision_are_fine() {
        assert_eq!(to_base_units("1.50000000", 6).unwrap(), 1_500_000);
    }

    #[test]
    fn too_many_decimals() {
        assert_eq!(
            to_base_units("1.0000001", 6),
            Err(AmountError::TooManyDecimals { max: 6 })
        );
        assert_eq!(
            to_base_units("0.5", 0),
            Err(AmountError::TooManyDecimals { max: 0 })
        );
    }

    #[test]
    fn zero_decimals() {
        assert_eq!(to_base_units("42", 0).unwrap(), 42);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(to_base_units("abc", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("1.2.3", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("+1", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units("1e6", 6), Err(AmountError::Malformed(_))));
        assert!(matches!(to_base_units(".", 6), Err(AmountError::Malformed(_))));
    }

    #[test]
    fn rejects_empty_and_negative() {
        assert_eq!(to_base_units("  ", 6), Err(AmountError::Empty));
        assert_eq!(to_base_units("-1", 6), Err(AmountError::Negative));
    }

    #[test]
    fn overflow_is_an_error() {
        let huge = "9".repeat(40);
        assert_eq!(to_base_units(&huge, 6), Err(AmountError::Overflow));
        assert_eq!(to_base_units("1", 60), Err(AmountError::Overflow));
    }

    #[test]
    fn precision_beyond_u128_is_overflow() {
        assert_eq!(to_base_units("1.5", MAX_DECIMALS + 1), Err(AmountError::Overflow));
        assert_eq!(to_base_units("1.5", 70_000), Err(AmountError::Overflow));
        assert_eq!(to_base_units("1.5", u32::MAX), Err(AmountError::Overflow));
        assert_eq!(
            validate_input("1.5", 70_000, u128::MAX),
            Err(AmountError::Overflow)
        );
        assert_eq!(to_input(15, 70_000), "0");
    }

    #[test]
    fn max_precision_still_converts() {
        assert_eq!(
            to_base_units("1.5", MAX_DECIMALS).unwrap(),
            15 * 10u128.pow(MAX_DECIMALS - 1)
        );
    }

    #[test]
    fn to_input_trims() {
        assert_eq!(to_input(1_500_000, 6), "1.5");
        assert_eq!(to_input(1, 6), "0.000001");
        assert_eq!(to_input(3_000_000, 6), "3");
        assert_eq!(to_input(0, 6), "0");
        assert_eq!(to_input(7, 0), "7");
    }

    #[test]
    fn validate_within_balance() {
        assert_eq!(validate_input("1.5", 6, 2_000_000).unwrap(), 1_500_000);
        assert_eq!(validate_input("2", 6, 2_000_000).unwrap(), 2_000_000);
    }

    #[test]
    fn validate_rejects_zero() {
        assert_eq!(validate_input("0.0", 6, 10), Err(AmountError::Zero));
    }

    #[test]
    fn validate_rejects_over_balance() {
        assert_eq!(
            validate_input("3", 6, 2_500_000),
            Err(AmountError::ExceedsBalance {
                max: "2.5".to_string()
            })
        );
    }
}
