#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parcel record types and query value objects.
//!
//! These types describe parcels as read from the spatial store and the
//! validated inputs used to query it. Geometries are carried as parsed
//! `GeoJSON` values; conversion from the store's string encoding happens
//! in `parcel_gis_database` and never here.

pub mod query;
pub mod unit;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use query::{
    BoundingBox, MAX_BBOX_RESULTS, NearQuery, ValidationError, validate_parcel_id,
};
pub use unit::AreaUnit;

/// A land parcel as stored in the spatial store.
///
/// Parcels are created and updated by an external loading process. The
/// centroid is derived from the boundary by that process, so the two are
/// always read together and never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    /// Store primary key.
    pub id: i64,
    /// Stable external identifier, unique and immutable.
    pub parcel_id: String,
    /// Free-text street address.
    pub address: Option<String>,
    /// Owner of record.
    pub owner_name: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// Two-letter state code (e.g. "WA").
    pub state_code: Option<String>,
    /// Boundary polygon (EPSG:4326) as a `GeoJSON` geometry object.
    pub geom: Option<serde_json::Value>,
    /// Centroid point (EPSG:4326) as a `GeoJSON` geometry object.
    pub centroid: Option<serde_json::Value>,
    /// When the record was first loaded.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last modified by the loader.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Canonical area of a single parcel in square meters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParcelArea {
    /// The parcel the area belongs to.
    pub parcel_id: String,
    /// Spheroidal area in square meters, or `None` if the parcel has no
    /// boundary geometry.
    pub square_meters: Option<f64>,
}

impl ParcelArea {
    /// Returns the area expressed in `unit`, if the parcel has a boundary.
    #[must_use]
    pub fn in_unit(&self, unit: AreaUnit) -> Option<f64> {
        self.square_meters.map(|sq_m| unit.convert_square_meters(sq_m))
    }
}
