//! Utilities related to numbers.

use ieee754;
use num;
use std::fmt;

/// Floating point marker trait for easier control over trait bounds.
pub trait BFloat:
    Sync + Send + num::Float + num::cast::FromPrimitive + ieee754::Ieee754 + fmt::Debug
{
}

impl BFloat for f32 {}
impl BFloat for f64 {}

/// Converts a field value to the given floating point type.
///
/// Any value representable by a `BFloat` is representable by the other
/// `BFloat` types (possibly as an infinity), so the conversion never fails
/// for `f32` and `f64`.
pub fn cast_float<F: BFloat, U: BFloat>(value: F) -> U {
    num::NumCast::from(value).unwrap_or_else(U::nan)
}

/// Clamps the given value into the range `[lower, upper]`.
///
/// NaN values are mapped to `upper`.
pub fn clamp_to_range<F: BFloat>(value: F, lower: F, upper: F) -> F {
    debug_assert!(lower <= upper);
    if value.is_nan() {
        upper
    } else if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}
