use bigdecimal::BigDecimal;
use num::{bigint::ToBigInt, BigInt, BigUint};
use primitive_types::U256;

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    let mut bytes = [0; 32];
    input.to_big_endian(&mut bytes);
    BigUint::from_bytes_be(&bytes)
}

pub fn u256_to_big_decimal(u256: &U256) -> BigDecimal {
    let big_uint = u256_to_big_uint(u256);
    BigDecimal::from(BigInt::from(big_uint))
}

/// None for values a fee column should never hold: fractional, negative,
/// or wider than 256 bits.
pub fn big_decimal_to_u256(big_decimal: &BigDecimal) -> Option<U256> {
    if !big_decimal.is_integer() {
        return None;
    }
    let big_uint = big_decimal.to_bigint()?.to_biguint()?;
    let bytes = big_uint.to_bytes_be();
    if bytes.len() > 32 {
        return None;
    }
    Some(U256::from_big_endian(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_u256_big_decimal_round_trip() {
        for value in [
            U256::zero(),
            U256::one(),
            U256::from(1_000_000_000_000_000_000u64),
            U256::MAX,
        ] {
            let decimal = u256_to_big_decimal(&value);
            assert_eq!(big_decimal_to_u256(&decimal), Some(value));
        }
    }

    #[test]
    fn test_fractional_is_rejected() {
        let decimal = BigDecimal::from_str("1.5").unwrap();
        assert_eq!(big_decimal_to_u256(&decimal), None);
    }

    #[test]
    fn test_negative_is_rejected() {
        let decimal = BigDecimal::from_str("-1").unwrap();
        assert_eq!(big_decimal_to_u256(&decimal), None);
    }

    #[test]
    fn test_too_wide_is_rejected() {
        // 2^256, one past U256::MAX
        let decimal = u256_to_big_decimal(&U256::MAX) + BigDecimal::from(1);
        assert_eq!(big_decimal_to_u256(&decimal), None);
    }

    #[test]
    fn test_max_u256_as_big_uint() {
        let max = u256_to_big_uint(&U256::MAX);
        assert_eq!(max.to_bytes_be(), [0xff; 32]);
    }
}
