//! # Numeric Bounds
//!
//! `Num` carries constraint operands (`gt`, `ge`, `lt`, `le`,
//! `multiple_of`) without losing the integer/float distinction the
//! declaration was written with. Comparisons between two integers are
//! exact; any comparison involving a float goes through `f64`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An integer or floating-point constraint operand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Num {
    /// Exact 64-bit integer.
    Int(i64),
    /// IEEE-754 double.
    Float(f64),
}

impl Num {
    /// Widen to `f64`.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// Convert a JSON number. Integers that fit in `i64` stay exact.
    pub fn from_json(n: &serde_json::Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            Some(Self::Int(i))
        } else {
            n.as_f64().map(Self::Float)
        }
    }

    /// Total-enough ordering for bound checks. Returns `None` only when a
    /// NaN is involved.
    pub fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }

    /// Whether `self` is an exact multiple of `divisor`.
    ///
    /// Float remainders are accepted within `|self| / 1e9` of zero or of
    /// the divisor, so representation error (`0.3 % 0.1`, `1e20 % 0.1`)
    /// scales with the value instead of hiding small inputs.
    pub fn is_multiple_of(self, divisor: Self) -> bool {
        match (self, divisor) {
            (_, Self::Int(0)) => false,
            (Self::Int(a), Self::Int(b)) => a.checked_rem(b).map_or(false, |r| r == 0),
            (a, b) => {
                let d = b.as_f64();
                if d == 0.0 || !d.is_finite() {
                    return false;
                }
                let a = a.as_f64();
                if !a.is_finite() {
                    return false;
                }
                let r = (a % d).abs();
                let threshold = a.abs() / 1e9;
                r <= threshold || (d.abs() - r).abs() <= threshold
            }
        }
    }
}

impl From<i64> for Num {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Num {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Num {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_comparison_is_exact() {
        let big = Num::Int(i64::MAX);
        let smaller = Num::Int(i64::MAX - 1);
        assert_eq!(big.compare(smaller), Some(Ordering::Greater));
    }

    #[test]
    fn test_mixed_comparison_widens() {
        assert_eq!(Num::Int(100).compare(Num::Float(100.0)), Some(Ordering::Equal));
        assert_eq!(Num::Float(99.5).compare(Num::Int(100)), Some(Ordering::Less));
    }

    #[test]
    fn test_nan_is_unordered() {
        assert_eq!(Num::Float(f64::NAN).compare(Num::Int(0)), None);
    }

    #[test]
    fn test_multiple_of() {
        assert!(Num::Int(10).is_multiple_of(Num::Int(5)));
        assert!(!Num::Int(11).is_multiple_of(Num::Int(5)));
        assert!(!Num::Int(11).is_multiple_of(Num::Int(0)));
        assert!(Num::Float(0.3).is_multiple_of(Num::Float(0.1)));
        assert!(Num::Float(7.5).is_multiple_of(Num::Float(2.5)));
        assert!(!Num::Float(7.4).is_multiple_of(Num::Float(2.5)));
    }

    #[test]
    fn test_float_multiple_tolerance_scales_with_value() {
        assert!(!Num::Float(4e-10).is_multiple_of(Num::Float(3.0)));
        assert!(!Num::Float(1e-10).is_multiple_of(Num::Int(1)));
        assert!(Num::Float(1e20).is_multiple_of(Num::Float(0.1)));
        assert!(Num::Float(0.0).is_multiple_of(Num::Float(0.1)));
        assert!(Num::Float(-9.0).is_multiple_of(Num::Float(3.0)));
        assert!(!Num::Float(f64::INFINITY).is_multiple_of(Num::Float(3.0)));
    }

    #[test]
    fn test_from_json_keeps_integers_exact() {
        let n: serde_json::Number = 42.into();
        assert_eq!(Num::from_json(&n), Some(Num::Int(42)));
        let f = serde_json::Number::from_f64(1.5).unwrap();
        assert_eq!(Num::from_json(&f), Some(Num::Float(1.5)));
    }

    #[test]
    fn test_untagged_serde() {
        let parsed: Num = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, Num::Int(7));
        let parsed: Num = serde_json::from_str("7.25").unwrap();
        assert_eq!(parsed, Num::Float(7.25));
        assert_eq!(serde_json::to_string(&Num::Int(-3)).unwrap(), "-3");
    }

    #[test]
    fn test_display() {
        assert_eq!(Num::Int(3).to_string(), "3");
        assert_eq!(Num::Float(3.0).to_string(), "3.0");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Integer comparison agrees with `i64::cmp` across the whole range.
        #[test]
        fn int_compare_matches_cmp(a in any::<i64>(), b in any::<i64>()) {
            prop_assert_eq!(Num::Int(a).compare(Num::Int(b)), Some(a.cmp(&b)));
        }

        /// Every integer product is a multiple of its non-zero factor.
        #[test]
        fn products_are_multiples(k in -10_000i64..10_000, m in 1i64..1_000) {
            prop_assert!(Num::Int(k * m).is_multiple_of(Num::Int(m)));
        }
    }
}
