#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API types for the parcel GIS subgraph.
//!
//! GraphQL output types, the `GeoJSON` scalar, and the small JSON payloads
//! served next to the GraphQL endpoint. They are kept apart from the
//! domain types in `parcel_gis_parcel_models` so the public contract can
//! evolve independently.

pub mod geojson;

use async_graphql::{Enum, SimpleObject};
use parcel_gis_parcel_models::AreaUnit;
use serde::{Deserialize, Serialize};

pub use crate::geojson::GeoJson;

/// Unit an area is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(name = "AreaUnit", remote = "parcel_gis_parcel_models::AreaUnit")]
pub enum ApiAreaUnit {
    /// Square meters
    SquareMeters,
    /// Square feet
    SquareFeet,
    /// Acres
    Acres,
    /// Hectares
    Hectares,
}

impl Default for ApiAreaUnit {
    fn default() -> Self {
        AreaUnit::default().into()
    }
}

/// Area of a parcel in a requested unit.
#[derive(Debug, Clone, PartialEq, SimpleObject)]
#[graphql(name = "AreaResult", rename_fields = "snake_case")]
pub struct ApiAreaResult {
    /// The parcel measured.
    pub parcel_id: String,
    /// Area in `unit`.
    pub area: f64,
    /// Unit `area` is expressed in.
    pub unit: ApiAreaUnit,
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Always `true` when the process is serving.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
    /// Which spatial store backs this instance (`postgis` or `fixture`).
    pub store: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_unit_converts_both_ways() {
        for unit in AreaUnit::all() {
            let api: ApiAreaUnit = (*unit).into();
            let back: AreaUnit = api.into();
            assert_eq!(back, *unit);
        }
    }

    #[test]
    fn default_api_unit_is_square_meters() {
        assert_eq!(ApiAreaUnit::default(), ApiAreaUnit::SquareMeters);
    }
}
