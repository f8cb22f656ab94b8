//! Unit normalization.
//!
//! All geometry is computed in centimeters and all weights in kilograms.
//! Conversion happens once, at the boundary, before any packing run.
//!
//! Unit tags arriving as free text are handled permissively: an unknown tag
//! is treated as already canonical (multiplier 1). Callers that need strict
//! behavior use [`LengthUnit::from_tag`] / [`WeightUnit::from_tag`] and
//! reject `None` themselves.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported length units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LengthUnit {
    Millimeter,
    Centimeter,
    Inch,
    Foot,
    Meter,
}

impl LengthUnit {
    /// Multiplier from this unit to centimeters.
    pub const fn centimeters_per_unit(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 0.1,
            LengthUnit::Centimeter => 1.0,
            LengthUnit::Inch => 2.54,
            LengthUnit::Foot => 30.48,
            LengthUnit::Meter => 100.0,
        }
    }

    /// Converts a magnitude in this unit to centimeters.
    #[inline]
    pub fn to_centimeters(self, value: f64) -> f64 {
        value * self.centimeters_per_unit()
    }

    /// Resolves a textual unit tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let unit = match tag.trim().to_ascii_lowercase().as_str() {
            "mm" | "millimeter" | "millimeters" | "millimetre" | "millimetres" => {
                LengthUnit::Millimeter
            }
            "cm" | "centimeter" | "centimeters" | "centimetre" | "centimetres" => {
                LengthUnit::Centimeter
            }
            "in" | "inch" | "inches" | "\"" => LengthUnit::Inch,
            "ft" | "foot" | "feet" | "'" => LengthUnit::Foot,
            "m" | "meter" | "meters" | "metre" | "metres" => LengthUnit::Meter,
            _ => return None,
        };
        Some(unit)
    }

    pub const fn tag(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Centimeter => "cm",
            LengthUnit::Inch => "in",
            LengthUnit::Foot => "ft",
            LengthUnit::Meter => "m",
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LengthUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown length unit '{}'", s.trim()))
    }
}

/// Supported weight units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Gram,
    Kilogram,
    Pound,
    Ounce,
    Tonne,
}

impl WeightUnit {
    /// Multiplier from this unit to kilograms.
    pub const fn kilograms_per_unit(self) -> f64 {
        match self {
            WeightUnit::Gram => 0.001,
            WeightUnit::Kilogram => 1.0,
            WeightUnit::Pound => 0.453_592_37,
            WeightUnit::Ounce => 0.028_349_523_125,
            WeightUnit::Tonne => 1000.0,
        }
    }

    #[inline]
    pub fn to_kilograms(self, value: f64) -> f64 {
        value * self.kilograms_per_unit()
    }

    /// Resolves a textual unit tag. Returns `None` for unknown tags.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let unit = match tag.trim().to_ascii_lowercase().as_str() {
            "g" | "gram" | "grams" => WeightUnit::Gram,
            "kg" | "kilogram" | "kilograms" | "kgs" => WeightUnit::Kilogram,
            "lb" | "lbs" | "pound" | "pounds" => WeightUnit::Pound,
            "oz" | "ounce" | "ounces" => WeightUnit::Ounce,
            "t" | "tonne" | "tonnes" | "ton" | "tons" => WeightUnit::Tonne,
            _ => return None,
        };
        Some(unit)
    }
}

/// Converts a length given with a free-text unit tag to centimeters.
///
/// Unknown tags fall back to a multiplier of 1: the magnitude is assumed to
/// be in centimeters already. A warning is logged every time this happens.
pub fn normalize_length(value: f64, tag: &str) -> f64 {
    match LengthUnit::from_tag(tag) {
        Some(unit) => unit.to_centimeters(value),
        None => {
            tracing::warn!(
                unit = tag,
                "unknown length unit, treating value as centimeters"
            );
            value
        }
    }
}

/// Applies [`normalize_length`] to each axis of a triple.
pub fn normalize_dims(dims: (f64, f64, f64), tag: &str) -> (f64, f64, f64) {
    match LengthUnit::from_tag(tag) {
        Some(unit) => (
            unit.to_centimeters(dims.0),
            unit.to_centimeters(dims.1),
            unit.to_centimeters(dims.2),
        ),
        None => {
            tracing::warn!(
                unit = tag,
                "unknown length unit, treating dimensions as centimeters"
            );
            dims
        }
    }
}

/// Converts a weight given with a free-text unit tag to kilograms.
///
/// Same permissive fallback as [`normalize_length`].
pub fn normalize_weight(value: f64, tag: &str) -> f64 {
    match WeightUnit::from_tag(tag) {
        Some(unit) => unit.to_kilograms(value),
        None => {
            tracing::warn!(
                unit = tag,
                "unknown weight unit, treating value as kilograms"
            );
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn converts_known_length_units() {
        assert!(approx(normalize_length(25.0, "mm"), 2.5));
        assert!(approx(normalize_length(25.0, "cm"), 25.0));
        assert!(approx(normalize_length(2.0, "inch"), 5.08));
        assert!(approx(normalize_length(1.0, "ft"), 30.48));
        assert!(approx(normalize_length(1.2, "m"), 120.0));
    }

    #[test]
    fn length_tags_are_case_insensitive_and_trimmed() {
        assert_eq!(LengthUnit::from_tag("  MM "), Some(LengthUnit::Millimeter));
        assert_eq!(LengthUnit::from_tag("Meters"), Some(LengthUnit::Meter));
        assert_eq!(LengthUnit::from_tag("Feet"), Some(LengthUnit::Foot));
    }

    #[test]
    fn unknown_length_unit_is_identity() {
        assert_eq!(LengthUnit::from_tag("furlong"), None);
        assert!(approx(normalize_length(42.0, "furlong"), 42.0));
        assert_eq!(normalize_dims((1.0, 2.0, 3.0), ""), (1.0, 2.0, 3.0));
    }

    #[test]
    fn normalize_dims_applies_to_every_axis() {
        let dims = normalize_dims((1.0, 0.5, 0.25), "m");
        assert!(approx(dims.0, 100.0));
        assert!(approx(dims.1, 50.0));
        assert!(approx(dims.2, 25.0));
    }

    #[test]
    fn converts_weight_units() {
        assert!(approx(normalize_weight(500.0, "g"), 0.5));
        assert!(approx(normalize_weight(2.0, "t"), 2000.0));
        assert!((normalize_weight(1.0, "lb") - 0.45359237).abs() < 1e-12);
        assert!(approx(normalize_weight(7.0, "stone"), 7.0));
    }

    #[test]
    fn length_unit_parses_and_displays() {
        let unit: LengthUnit = "in".parse().unwrap();
        assert_eq!(unit, LengthUnit::Inch);
        assert_eq!(unit.to_string(), "in");
        assert!("parsec".parse::<LengthUnit>().is_err());
    }
}
