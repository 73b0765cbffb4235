//! Fixed-point decimal rendering over arbitrary-precision integers.
//!
//! The tick-based price path must never materialize its ratio as a float;
//! everything here stays in `BigUint` until the final digit string.

use crate::core::error::{FetchError, FetchResult};
use num_bigint::BigUint;
use num_traits::Zero;

pub fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u8).pow(exp)
}

/// Render `numerator / denominator` as a decimal string with up to
/// `precision` fractional digits (truncating division, trailing zeros
/// stripped, separator omitted when the fraction empties).
pub fn ratio_to_decimal_string(
    numerator: &BigUint,
    denominator: &BigUint,
    precision: u32,
) -> FetchResult<String> {
    if denominator.is_zero() {
        return Err(FetchError::Math("ratio denominator is zero".to_string()));
    }

    let scaled = numerator * pow10(precision) / denominator;
    let digits = scaled.to_str_radix(10);
    let precision = precision as usize;

    let (int_part, frac_part) = if digits.len() > precision {
        let split = digits.len() - precision;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{digits:0>precision$}"))
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        Ok(int_part)
    } else {
        Ok(format!("{int_part}.{frac}"))
    }
}

/// Format an integer base-unit amount with exactly `decimals` fractional
/// digits (the UTXO display convention, e.g. "1.00000000").
pub fn format_units_fixed(amount: u64, decimals: u32) -> String {
    let factor = 10u64.pow(decimals);
    format!(
        "{}.{:0width$}",
        amount / factor,
        amount % factor,
        width = decimals as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn ratio(n: u128, d: u128, p: u32) -> String {
        ratio_to_decimal_string(&BigUint::from(n), &BigUint::from(d), p).unwrap()
    }

    #[test_case(1, 3, 4, "0.3333"; "one third")]
    #[test_case(1, 2, 18, "0.5"; "trailing zeros stripped")]
    #[test_case(10, 2, 18, "5"; "integer result drops separator")]
    #[test_case(5, 4, 2, "1.25"; "mixed part")]
    #[test_case(0, 7, 6, "0"; "zero numerator")]
    #[test_case(1, 1_000_000, 4, "0"; "underflows precision")]
    #[test_case(123_456, 1000, 0, "123"; "zero precision truncates")]
    fn test_ratio_to_decimal_string(n: u128, d: u128, p: u32, expected: &str) {
        assert_eq!(ratio(n, d, p), expected);
    }

    #[test]
    fn test_zero_denominator_is_an_error() {
        let err =
            ratio_to_decimal_string(&BigUint::from(1u8), &BigUint::zero(), 4).unwrap_err();
        assert!(matches!(err, crate::core::error::FetchError::Math(_)));
    }

    #[test]
    fn test_format_units_fixed() {
        assert_eq!(format_units_fixed(100_000_000, 8), "1.00000000");
        assert_eq!(format_units_fixed(123_456_789, 8), "1.23456789");
        assert_eq!(format_units_fixed(1, 8), "0.00000001");
        assert_eq!(format_units_fixed(0, 8), "0.00000000");
    }

    proptest! {
        /// Parsing the rendered string back and re-scaling must reproduce
        /// the truncating division exactly, and the fractional part never
        /// ends in a zero.
        #[test]
        fn prop_round_trip(n in 1u128..u128::MAX, d in 1u128..u128::MAX, p in 0u32..24) {
            let rendered = ratio(n, d, p);
            prop_assert!(!rendered.ends_with('0') || !rendered.contains('.'));

            let (int_part, frac_part) = match rendered.split_once('.') {
                Some((i, f)) => (i.to_string(), f.to_string()),
                None => (rendered.clone(), String::new()),
            };
            prop_assert!(frac_part.len() <= p as usize);

            let padded = format!("{frac_part:0<width$}", width = p as usize);
            let reparsed = BigUint::parse_bytes(int_part.as_bytes(), 10).unwrap()
                * pow10(p)
                + BigUint::parse_bytes(format!("0{padded}").as_bytes(), 10).unwrap();
            let expected = BigUint::from(n) * pow10(p) / BigUint::from(d);
            prop_assert_eq!(reparsed, expected);
        }
    }
}
