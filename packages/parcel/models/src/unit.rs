//! Area units and their conversion factors.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Unit an area is reported in.
///
/// The spatial store always measures in square meters; every other unit is
/// a fixed multiple of that.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AreaUnit {
    /// Square meters (canonical)
    #[default]
    SquareMeters,
    /// International square feet
    SquareFeet,
    /// International acres
    Acres,
    /// Hectares (10,000 m²)
    Hectares,
}

impl AreaUnit {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SquareMeters,
            Self::SquareFeet,
            Self::Acres,
            Self::Hectares,
        ]
    }

    /// Number of this unit in one square meter.
    #[must_use]
    pub const fn per_square_meter(self) -> f64 {
        match self {
            Self::SquareMeters => 1.0,
            Self::SquareFeet => 10.7639,
            Self::Acres => 0.000_247_105,
            Self::Hectares => 0.0001,
        }
    }

    /// Converts an area in square meters into this unit.
    #[must_use]
    pub fn convert_square_meters(self, square_meters: f64) -> f64 {
        square_meters * self.per_square_meter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_unit_has_a_positive_factor() {
        assert_eq!(AreaUnit::all().len(), 4);
        for unit in AreaUnit::all() {
            let factor = unit.per_square_meter();
            assert!(
                factor.is_finite() && factor > 0.0,
                "{unit:?} has invalid factor {factor}"
            );
        }
    }

    #[test]
    fn default_unit_is_square_meters() {
        assert_eq!(AreaUnit::default(), AreaUnit::SquareMeters);
        assert!((AreaUnit::default().convert_square_meters(42.5) - 42.5).abs() < f64::EPSILON);
    }

    #[test]
    fn square_feet_is_square_meters_times_factor() {
        let sq_m = 1234.5;
        let sq_ft = AreaUnit::SquareFeet.convert_square_meters(sq_m);
        assert!((sq_ft - sq_m * 10.7639).abs() < 1e-9);
    }

    #[test]
    fn one_acre_is_about_4047_square_meters() {
        let acres = AreaUnit::Acres.convert_square_meters(4046.86);
        assert!((acres - 1.0).abs() < 1e-4);
    }

    #[test]
    fn names_match_graphql_enum_values() {
        assert_eq!(AreaUnit::SquareMeters.to_string(), "SQUARE_METERS");
        assert_eq!(AreaUnit::SquareFeet.as_ref(), "SQUARE_FEET");
        assert_eq!("HECTARES".parse::<AreaUnit>().unwrap(), AreaUnit::Hectares);
        assert!("FURLONGS".parse::<AreaUnit>().is_err());
    }
}
