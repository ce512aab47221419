//! Strongly-typed numeric primitives (zero-cost newtypes).
//!
//! Lengths that leave the unit converter are always density-independent
//! pixels. Opacities are always inside `0..=1`. Anything printed into the
//! output document goes through [`Decimal`].

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Digits kept after the decimal point in emitted numbers
pub const PRECISION: i32 = 3;

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is negative when non-negative required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Length in density-independent pixels (dp)
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Length(pub f64);

impl Length {
    pub const ZERO: Length = Length(0.0);

    /// Create a Length with validation (rejects NaN/infinite)
    #[inline]
    pub fn try_new(val: f64) -> Result<Length, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else {
            Ok(Length(val))
        }
    }

    /// Create a non-negative Length with validation
    #[inline]
    pub fn try_non_negative(val: f64) -> Result<Length, NumericError> {
        let len = Self::try_new(val)?;
        if len.0 < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(len)
        }
    }

    /// Get the raw value
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    #[inline]
    pub fn min(self, other: Length) -> Length {
        Length(self.0.min(other.0))
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl Add for Length {
    type Output = Length;
    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;
    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;
    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Decimal(self.0), f)
    }
}

/// Opacity in `0..=1`
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Opacity(f64);

impl Opacity {
    pub const OPAQUE: Opacity = Opacity(1.0);

    /// Clamp into range. NaN is treated as fully opaque.
    pub fn new(val: f64) -> Opacity {
        if val.is_nan() {
            Opacity::OPAQUE
        } else {
            Opacity(val.clamp(0.0, 1.0))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }
}

impl Default for Opacity {
    fn default() -> Self {
        Opacity::OPAQUE
    }
}

impl Mul for Opacity {
    type Output = Opacity;
    fn mul(self, rhs: Opacity) -> Opacity {
        Opacity(self.0 * rhs.0)
    }
}

/// Canvas or viewport size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: Length,
    pub height: Length,
}

impl Size {
    pub fn new(width: Length, height: Length) -> Self {
        Self { width, height }
    }

    /// Width divided by height, `None` for a zero height
    pub fn aspect(self) -> Option<f64> {
        if self.height.is_zero() {
            None
        } else {
            Some(self.width.0 / self.height.0)
        }
    }
}

/// Round a value to the output precision, folding `-0` into `0`.
///
/// Values too large to scale are already integral and pass through.
#[inline]
pub fn quantize(val: f64) -> f64 {
    let scale = 10f64.powi(PRECISION);
    let scaled = val * scale;
    if !scaled.is_finite() {
        return val;
    }
    let q = scaled.round() / scale;
    if q == 0.0 { 0.0 } else { q }
}

/// Display wrapper printing a number the way the output document wants it:
/// fixed precision, no trailing zeros, no trailing point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal(pub f64);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quantize(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Length tests ====================

    #[test]
    fn length_try_new_valid() {
        assert!(Length::try_new(1.0).is_ok());
        assert!(Length::try_new(-1.0).is_ok());
        assert!(Length::try_new(0.0).is_ok());
    }

    #[test]
    fn length_try_new_rejects_nan_and_infinity() {
        assert_eq!(Length::try_new(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Length::try_new(f64::INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn length_try_non_negative() {
        assert!(Length::try_non_negative(0.0).is_ok());
        assert_eq!(Length::try_non_negative(-0.5), Err(NumericError::Negative));
    }

    #[test]
    fn length_arithmetic() {
        let a = Length(2.0);
        let b = Length(0.5);
        assert_eq!(a + b, Length(2.5));
        assert_eq!(a - b, Length(1.5));
        assert_eq!(a * 3.0, Length(6.0));
        assert_eq!(a.min(b), b);
    }

    // ==================== Opacity tests ====================

    #[test]
    fn opacity_clamps() {
        assert_eq!(Opacity::new(1.5).raw(), 1.0);
        assert_eq!(Opacity::new(-0.1).raw(), 0.0);
        assert_eq!(Opacity::new(f64::NAN), Opacity::OPAQUE);
    }

    #[test]
    fn opacity_composes_multiplicatively() {
        let o = Opacity::new(0.5) * Opacity::new(0.5);
        assert_eq!(o.raw(), 0.25);
    }

    // ==================== Size tests ====================

    #[test]
    fn size_aspect() {
        assert_eq!(Size::new(Length(200.0), Length(100.0)).aspect(), Some(2.0));
        assert_eq!(Size::new(Length(1.0), Length::ZERO).aspect(), None);
    }

    // ==================== Decimal tests ====================

    #[test]
    fn decimal_formatting() {
        assert_eq!(Decimal(10.0).to_string(), "10");
        assert_eq!(Decimal(0.5).to_string(), "0.5");
        assert_eq!(Decimal(1.0 / 3.0).to_string(), "0.333");
        assert_eq!(Decimal(2.0006).to_string(), "2.001");
        assert_eq!(Decimal(-0.0001).to_string(), "0");
        assert_eq!(Decimal(-12.25).to_string(), "-12.25");
        assert_eq!(Length(48.0).to_string(), "48");
    }

    #[test]
    fn huge_values_are_not_rounded_to_infinity() {
        assert_eq!(quantize(1e306), 1e306);
        assert_eq!(quantize(-f64::MAX), -f64::MAX);
        let printed = Decimal(1e306).to_string();
        assert!(!printed.contains("inf"), "{printed}");
        assert_eq!(printed.parse::<f64>().unwrap(), 1e306);
    }
}
