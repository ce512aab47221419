//! Length unit conversion into density-independent pixels.
//!
//! SVG user units are CSS pixels at 96 dpi, which line up one to one with
//! Android dp at mdpi. Absolute units scale from there.

use pest::Parser;

use crate::errors::LengthError;
use crate::types::Length;
use crate::{Rule, SvgGrammar};

/// Absolute length units understood by the converter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    Px,
    Pt,
    Pc,
    In,
    Mm,
    Cm,
    Dp,
}

impl Unit {
    /// dp per one of this unit
    pub const fn ratio(self) -> f64 {
        match self {
            Unit::Px => 1.0,
            Unit::Pt => 1.3333,
            Unit::Pc => 16.0,
            Unit::In => 96.0,
            Unit::Mm => 3.7795,
            Unit::Cm => 37.795,
            Unit::Dp => 1.0,
        }
    }

    /// Look up a unit suffix, case-insensitively
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        let unit = match suffix.to_ascii_lowercase().as_str() {
            "px" => Unit::Px,
            "pt" => Unit::Pt,
            "pc" => Unit::Pc,
            "in" => Unit::In,
            "mm" => Unit::Mm,
            "cm" => Unit::Cm,
            "dp" | "dip" => Unit::Dp,
            _ => return None,
        };
        Some(unit)
    }
}

/// Split a length into its number and optional unit suffix
pub(crate) fn parse_dimension(raw: &str) -> Result<(f64, Option<&str>), LengthError> {
    let mut pairs = SvgGrammar::parse(Rule::length, raw)
        .map_err(|_| LengthError::NotANumber(raw.trim().to_string()))?;
    let Some(length) = pairs.next() else {
        return Err(LengthError::NotANumber(raw.trim().to_string()));
    };

    let mut value = None;
    let mut unit = None;
    for inner in length.into_inner() {
        match inner.as_rule() {
            Rule::number => value = Some(crate::number(&inner)),
            Rule::unit => unit = Some(inner.as_str()),
            _ => {}
        }
    }

    let value = value.ok_or_else(|| LengthError::NotANumber(raw.trim().to_string()))?;
    Ok((value, unit))
}

/// Convert a raw length attribute into dp.
///
/// Unitless values are taken in `default_unit`. Relative units (`%`, `em`,
/// ...) have no meaning without layout context and are rejected.
pub fn convert(raw: &str, default_unit: Unit) -> Result<Length, LengthError> {
    let (value, suffix) = parse_dimension(raw)?;
    let unit = match suffix {
        None => default_unit,
        Some(s) => Unit::from_suffix(s).ok_or_else(|| LengthError::UnsupportedUnit {
            unit: s.to_string(),
        })?,
    };
    Length::try_new(value * unit.ratio()).map_err(|_| LengthError::NotFinite)
}
