//! Fixed-point math utilities for deterministic combat.
//!
//! Damage and multiplier math runs on fixed-point numbers so that a
//! seeded battle produces the same log on every platform. Data files
//! author fractional values as integer percentages.

use fixed::types::I32F32;

/// Fixed-point number type for all combat math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Convert an integer percentage (`150` = ×1.5) to a fixed-point factor.
///
/// Values beyond the fixed-point range saturate.
#[must_use]
pub fn percent(value: u32) -> Fixed {
    Fixed::saturating_from_num(value) / Fixed::from_num(100)
}

/// Scale `value` by `pct` percent, rounding toward zero.
///
/// Multiplies before dividing so integral results stay exact.
#[must_use]
pub fn scale_percent(value: i32, pct: u32) -> i32 {
    let scaled = i64::from(value) * i64::from(pct) / 100;
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Floor a non-negative fixed-point value to an integer, saturating at `i32::MAX`.
#[must_use]
pub fn floor_to_i32(value: Fixed) -> i32 {
    if value <= Fixed::ZERO {
        return 0;
    }
    value.floor().to_num::<i32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_conversion() {
        assert_eq!(percent(100), Fixed::ONE);
        assert_eq!(percent(150), Fixed::from_num(1.5));
        assert_eq!(percent(50), Fixed::from_num(0.5));
        assert_eq!(percent(0), Fixed::ZERO);
    }

    #[test]
    fn test_percent_saturates_above_range() {
        assert_eq!(percent(u32::MAX), Fixed::MAX / Fixed::from_num(100));
        assert!(percent(3_000_000_000) > Fixed::from_num(20_000_000));
    }

    #[test]
    fn test_scale_percent_exact_for_integral_results() {
        assert_eq!(scale_percent(10, 110), 11);
        assert_eq!(scale_percent(17, 120), 20);
        assert_eq!(scale_percent(-8, 150), -12);
        assert_eq!(scale_percent(5, 0), 0);
    }

    #[test]
    fn test_floor_to_i32() {
        assert_eq!(floor_to_i32(Fixed::from_num(16.99)), 16);
        assert_eq!(floor_to_i32(Fixed::from_num(17)), 17);
        assert_eq!(floor_to_i32(Fixed::from_num(-3)), 0);
    }
}
