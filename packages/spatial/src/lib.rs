#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory parcel store backed by an R-tree.
//!
//! Loads parcels from a `GeoJSON` `FeatureCollection`, builds an R-tree
//! over boundary envelopes, and answers the same queries as the `PostGIS`
//! store: envelope intersection, haversine radius search, and geodesic
//! area. Used to serve a fixture file without a database and as the
//! spatial engine behind resolver tests.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use geo::{
    BoundingRect, Centroid, Distance, GeodesicArea, Haversine, Intersects, MultiPolygon, Point,
    Rect, coord,
};
use geojson::{Feature, GeoJson};
use parcel_gis_database::{DbError, ParcelStore};
use parcel_gis_parcel_models::{BoundingBox, NearQuery, Parcel, ParcelArea};
use rstar::{AABB, RTree, RTreeObject};

/// Errors that can occur while loading a parcel fixture.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// Reading the fixture file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixture is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The fixture is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature had no `parcel_id` property.
    #[error("Feature {index} has no parcel_id property")]
    MissingParcelId {
        /// Position of the feature in the collection.
        index: usize,
    },

    /// Two features share a `parcel_id`.
    #[error("Duplicate parcel_id {parcel_id}")]
    DuplicateParcelId {
        /// The repeated identifier.
        parcel_id: String,
    },

    /// A feature's geometry is not a polygon.
    #[error("Parcel {parcel_id} boundary must be a Polygon or MultiPolygon")]
    UnsupportedGeometry {
        /// The offending parcel.
        parcel_id: String,
    },
}

/// A parcel with its parsed boundary.
struct IndexedParcel {
    parcel: Parcel,
    boundary: Option<MultiPolygon<f64>>,
    centroid: Option<Point<f64>>,
}

/// R-tree entry pointing back at a parcel by identifier.
struct EnvelopeEntry {
    parcel_id: String,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for EnvelopeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Read-only in-memory parcel store.
pub struct ParcelIndex {
    parcels: BTreeMap<String, IndexedParcel>,
    envelopes: RTree<EnvelopeEntry>,
}

impl ParcelIndex {
    /// Loads parcels from a `GeoJSON` `FeatureCollection` file.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the file cannot be read or any feature
    /// is not a valid parcel.
    pub fn load(path: &Path) -> Result<Self, SpatialError> {
        let contents = std::fs::read_to_string(path)?;
        let index = Self::from_geojson_str(&contents)?;
        log::info!("Loaded {} parcels from {}", index.len(), path.display());
        Ok(index)
    }

    /// Builds an index from `GeoJSON` text.
    ///
    /// Each feature must carry a string `parcel_id` property. Optional
    /// properties: `id` (integer, defaults to position + 1), `address`,
    /// `owner_name`, `county`, `state_code`, `created_at` and `updated_at`
    /// (RFC 3339). The centroid is derived from the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the text is not a `FeatureCollection`
    /// of valid parcels.
    pub fn from_geojson_str(geojson_str: &str) -> Result<Self, SpatialError> {
        let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let mut parcels = BTreeMap::new();
        let mut entries = Vec::new();

        for (index, feature) in collection.features.iter().enumerate() {
            let indexed = parse_feature(index, feature)?;
            let parcel_id = indexed.parcel.parcel_id.clone();

            if let Some(envelope) = indexed.boundary.as_ref().and_then(compute_envelope) {
                entries.push(EnvelopeEntry {
                    parcel_id: parcel_id.clone(),
                    envelope,
                });
            }

            if parcels.insert(parcel_id.clone(), indexed).is_some() {
                return Err(SpatialError::DuplicateParcelId { parcel_id });
            }
        }

        Ok(Self {
            parcels,
            envelopes: RTree::bulk_load(entries),
        })
    }

    /// Number of parcels in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    /// Whether the index holds no parcels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    fn in_bbox(&self, bbox: &BoundingBox, limit: usize) -> Vec<Parcel> {
        let query_env = AABB::from_corners([bbox.west, bbox.south], [bbox.east, bbox.north]);
        let query_poly = Rect::new(
            coord! { x: bbox.west, y: bbox.south },
            coord! { x: bbox.east, y: bbox.north },
        )
        .to_polygon();

        let mut hits: Vec<&IndexedParcel> = self
            .envelopes
            .locate_in_envelope_intersecting(&query_env)
            .filter_map(|entry| self.parcels.get(&entry.parcel_id))
            .filter(|indexed| {
                indexed
                    .boundary
                    .as_ref()
                    .is_some_and(|boundary| boundary.intersects(&query_poly))
            })
            .collect();

        hits.sort_by(|a, b| a.parcel.parcel_id.cmp(&b.parcel.parcel_id));
        hits.into_iter()
            .take(limit)
            .map(|indexed| indexed.parcel.clone())
            .collect()
    }

    /// Radius search on centroids. A linear scan: haversine distance is not
    /// expressible as an envelope near the poles or the antimeridian.
    fn near(&self, query: &NearQuery) -> Vec<Parcel> {
        let origin = Point::new(query.lon, query.lat);

        let mut hits: Vec<(f64, &Parcel)> = self
            .parcels
            .values()
            .filter_map(|indexed| {
                let centroid = indexed.centroid?;
                let distance = Haversine.distance(origin, centroid);
                (distance <= query.radius_meters).then_some((distance, &indexed.parcel))
            })
            .collect();

        hits.sort_by(|(da, a), (db, b)| {
            da.total_cmp(db).then_with(|| a.parcel_id.cmp(&b.parcel_id))
        });
        hits.into_iter().map(|(_, parcel)| parcel.clone()).collect()
    }
}

#[async_trait]
impl ParcelStore for ParcelIndex {
    async fn parcels_in_bbox(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<Parcel>, DbError> {
        Ok(self.in_bbox(bbox, limit))
    }

    async fn parcels_near(&self, query: &NearQuery) -> Result<Vec<Parcel>, DbError> {
        Ok(self.near(query))
    }

    async fn parcel_by_id(&self, parcel_id: &str) -> Result<Option<Parcel>, DbError> {
        Ok(self.parcels.get(parcel_id).map(|indexed| indexed.parcel.clone()))
    }

    async fn parcel_area(&self, parcel_id: &str) -> Result<Option<ParcelArea>, DbError> {
        Ok(self.parcels.get(parcel_id).map(|indexed| ParcelArea {
            parcel_id: parcel_id.to_string(),
            square_meters: indexed
                .boundary
                .as_ref()
                .map(|boundary| boundary.geodesic_area_unsigned()),
        }))
    }
}

fn parse_feature(index: usize, feature: &Feature) -> Result<IndexedParcel, SpatialError> {
    let parcel_id = string_property(feature, "parcel_id")
        .filter(|id| !id.is_empty())
        .ok_or(SpatialError::MissingParcelId { index })?;

    let boundary = match &feature.geometry {
        Some(geometry) => Some(
            geojson_to_multipolygon(geometry).ok_or_else(|| SpatialError::UnsupportedGeometry {
                parcel_id: parcel_id.clone(),
            })?,
        ),
        None => None,
    };

    let centroid = boundary.as_ref().and_then(Centroid::centroid);

    let id = feature
        .property("id")
        .and_then(serde_json::Value::as_i64)
        .unwrap_or_else(|| i64::try_from(index).map_or(i64::MAX, |i| i + 1));

    let parcel = Parcel {
        id,
        address: string_property(feature, "address"),
        owner_name: string_property(feature, "owner_name"),
        county: string_property(feature, "county"),
        state_code: string_property(feature, "state_code"),
        geom: feature.geometry.as_ref().and_then(geometry_to_json),
        centroid: centroid.and_then(|point| {
            geometry_to_json(&geojson::Geometry::new(geojson::Value::from(&point)))
        }),
        created_at: timestamp_property(feature, "created_at"),
        updated_at: timestamp_property(feature, "updated_at"),
        parcel_id,
    };

    Ok(IndexedParcel {
        parcel,
        boundary,
        centroid,
    })
}

fn string_property(feature: &Feature, name: &str) -> Option<String> {
    feature
        .property(name)
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
}

fn timestamp_property(feature: &Feature, name: &str) -> Option<DateTime<Utc>> {
    let raw = feature.property(name).and_then(serde_json::Value::as_str)?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("Ignoring unparseable {name} {raw:?}: {e}");
            None
        }
    }
}

fn geometry_to_json(geometry: &geojson::Geometry) -> Option<serde_json::Value> {
    serde_json::to_value(geometry)
        .inspect_err(|e| log::warn!("Failed to serialize geometry: {e}"))
        .ok()
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn geojson_to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
