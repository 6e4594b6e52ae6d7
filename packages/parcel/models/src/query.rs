//! Validated query inputs.
//!
//! Every constructor here rejects bad input before anything reaches the
//! spatial store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of parcels returned by a bounding box search.
pub const MAX_BBOX_RESULTS: usize = 100;

const MAX_LONGITUDE: f64 = 180.0;
const MAX_LATITUDE: f64 = 90.0;

/// A query input that violates a documented constraint.
///
/// The message names the specific constraint so it can be shown to the
/// caller as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The bbox list did not have four elements.
    #[error("bbox must contain exactly four values [west, south, east, north], got {count}")]
    BboxArity {
        /// Number of values supplied.
        count: usize,
    },

    /// A coordinate or distance was `NaN` or infinite.
    #[error("{name} must be a finite number")]
    NotFinite {
        /// Parameter name.
        name: &'static str,
    },

    /// A coordinate fell outside its valid range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// The rejected value.
        value: f64,
    },

    /// `west > east`.
    #[error("west longitude must be less than east longitude (west {west}, east {east})")]
    WestOfEast {
        /// Western bound.
        west: f64,
        /// Eastern bound.
        east: f64,
    },

    /// `south > north`.
    #[error("south latitude must be less than north latitude (south {south}, north {north})")]
    SouthOfNorth {
        /// Southern bound.
        south: f64,
        /// Northern bound.
        north: f64,
    },

    /// The search radius was zero or negative.
    #[error("radiusMeters must be greater than 0, got {value}")]
    NonPositiveRadius {
        /// The rejected radius.
        value: f64,
    },

    /// A parcel identifier was empty.
    #[error("id must not be empty")]
    EmptyParcelId,
}

/// A geographic bounding box in WGS84 degrees.
///
/// Instances obtained through [`BoundingBox::new`] or
/// [`BoundingBox::from_values`] always satisfy `west <= east`,
/// `south <= north` and lie within valid longitude/latitude ranges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the first bound that is not
    /// finite, out of range, or out of order.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ValidationError> {
        check_coordinate("west longitude", west, MAX_LONGITUDE)?;
        check_coordinate("south latitude", south, MAX_LATITUDE)?;
        check_coordinate("east longitude", east, MAX_LONGITUDE)?;
        check_coordinate("north latitude", north, MAX_LATITUDE)?;

        if west > east {
            return Err(ValidationError::WestOfEast { west, east });
        }
        if south > north {
            return Err(ValidationError::SouthOfNorth { south, north });
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Creates a validated bounding box from `[west, south, east, north]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::BboxArity`] if `values` does not hold
    /// exactly four elements, otherwise whatever [`BoundingBox::new`]
    /// rejects.
    pub fn from_values(values: &[f64]) -> Result<Self, ValidationError> {
        match *values {
            [west, south, east, north] => Self::new(west, south, east, north),
            _ => Err(ValidationError::BboxArity {
                count: values.len(),
            }),
        }
    }
}

/// A validated radius search around a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearQuery {
    /// Latitude of the search center.
    pub lat: f64,
    /// Longitude of the search center.
    pub lon: f64,
    /// Search radius in meters.
    pub radius_meters: f64,
}

impl NearQuery {
    /// Creates a validated radius query.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming `lat`, `lon` or `radiusMeters`
    /// when that parameter is out of range.
    pub fn new(lat: f64, lon: f64, radius_meters: f64) -> Result<Self, ValidationError> {
        check_coordinate("lat", lat, MAX_LATITUDE)?;
        check_coordinate("lon", lon, MAX_LONGITUDE)?;

        if !radius_meters.is_finite() {
            return Err(ValidationError::NotFinite {
                name: "radiusMeters",
            });
        }
        if radius_meters <= 0.0 {
            return Err(ValidationError::NonPositiveRadius {
                value: radius_meters,
            });
        }

        Ok(Self {
            lat,
            lon,
            radius_meters,
        })
    }
}

/// Checks that a parcel identifier is usable for lookup.
///
/// Identifiers are opaque and owned by the loading process, so emptiness
/// is the only thing rejected.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyParcelId`] if `id` is empty.
pub const fn validate_parcel_id(id: &str) -> Result<&str, ValidationError> {
    if id.is_empty() {
        Err(ValidationError::EmptyParcelId)
    } else {
        Ok(id)
    }
}

fn check_coordinate(name: &'static str, value: f64, limit: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { name });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(ValidationError::OutOfRange {
            name,
            min: -limit,
            max: limit,
            value,
        });
    }
    Ok(())
}
