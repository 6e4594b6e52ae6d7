//! `PostGIS` queries for parcel data.
//!
//! Each function issues exactly one parameterized statement via
//! `query_raw_params()`. Geometries are selected through `ST_AsGeoJSON`
//! and decoded by [`crate::geojson::decode_geometry`].

use chrono::{DateTime, NaiveDateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use parcel_gis_parcel_models::{BoundingBox, NearQuery, Parcel, ParcelArea};
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;
use crate::geojson::decode_geometry;

/// Columns selected for every parcel query.
const PARCEL_COLUMNS: &str = "id::bigint AS id, parcel_id, address, owner_name, county, state_code,
        ST_AsGeoJSON(geom) AS geom_geojson,
        ST_AsGeoJSON(centroid) AS centroid_geojson,
        created_at, updated_at";

fn bbox_sql(limit: usize) -> String {
    format!(
        r#"SELECT {PARCEL_COLUMNS}
         FROM parcels
         WHERE geom IS NOT NULL
           AND ST_Intersects(geom, ST_MakeEnvelope($1, $2, $3, $4, 4326))
         ORDER BY parcel_id COLLATE "C" ASC
         LIMIT {limit}"#
    )
}

fn near_sql() -> String {
    // `find_parcels_near` owns the radius filter (including great-circle
    // correction); the ordering is made explicit here.
    format!(
        r#"SELECT {PARCEL_COLUMNS}
         FROM find_parcels_near($1, $2, $3) AS parcels
         ORDER BY ST_Distance(
                      centroid::geography,
                      ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography
                  ) ASC NULLS LAST,
                  parcel_id COLLATE "C" ASC"#
    )
}

fn by_id_sql() -> String {
    format!(
        "SELECT {PARCEL_COLUMNS}
         FROM parcels
         WHERE parcel_id = $1
         LIMIT 1"
    )
}

/// Spheroidal area: casting to `geography` measures on the WGS84
/// ellipsoid rather than in planar degrees.
const AREA_SQL: &str = "SELECT parcel_id, ST_Area(geom::geography) AS area_sq_m
     FROM parcels
     WHERE parcel_id = $1
     LIMIT 1";

/// Returns up to `limit` parcels whose boundary intersects `bbox`, ordered
/// by `parcel_id` ascending.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a row cannot be
/// decoded.
pub async fn find_parcels_in_bbox(
    db: &dyn Database,
    bbox: &BoundingBox,
    limit: usize,
) -> Result<Vec<Parcel>, DbError> {
    log::debug!(
        "Querying parcels in bbox [{}, {}, {}, {}] (limit {limit})",
        bbox.west,
        bbox.south,
        bbox.east,
        bbox.north
    );

    let rows = db
        .query_raw_params(
            &bbox_sql(limit),
            &[
                DatabaseValue::Real64(bbox.west),
                DatabaseValue::Real64(bbox.south),
                DatabaseValue::Real64(bbox.east),
                DatabaseValue::Real64(bbox.north),
            ],
        )
        .await?;

    rows.iter().map(parcel_from_row).collect()
}

/// Returns parcels within `query.radius_meters` of the query point,
/// nearest centroid first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a row cannot be
/// decoded.
pub async fn find_parcels_near(
    db: &dyn Database,
    query: &NearQuery,
) -> Result<Vec<Parcel>, DbError> {
    log::debug!(
        "Querying parcels within {}m of ({}, {})",
        query.radius_meters,
        query.lat,
        query.lon
    );

    let rows = db
        .query_raw_params(
            &near_sql(),
            &[
                DatabaseValue::Real64(query.lat),
                DatabaseValue::Real64(query.lon),
                DatabaseValue::Real64(query.radius_meters),
            ],
        )
        .await?;

    rows.iter().map(parcel_from_row).collect()
}

/// Looks up a single parcel by its external identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the row cannot
/// be decoded.
pub async fn find_parcel_by_id(
    db: &dyn Database,
    parcel_id: &str,
) -> Result<Option<Parcel>, DbError> {
    let rows = db
        .query_raw_params(
            &by_id_sql(),
            &[DatabaseValue::String(parcel_id.to_string())],
        )
        .await?;

    rows.first().map(parcel_from_row).transpose()
}

/// Computes the area of a parcel's boundary in square meters.
///
/// Returns `None` when no parcel has this identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn get_parcel_area(
    db: &dyn Database,
    parcel_id: &str,
) -> Result<Option<ParcelArea>, DbError> {
    let rows = db
        .query_raw_params(AREA_SQL, &[DatabaseValue::String(parcel_id.to_string())])
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let square_meters: Option<f64> = row.to_value("area_sq_m").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse area for parcel {parcel_id}: {e}"),
    })?;

    Ok(Some(ParcelArea {
        parcel_id: parcel_id.to_string(),
        square_meters,
    }))
}

fn parcel_from_row(row: &Row) -> Result<Parcel, DbError> {
    let parcel_id: String = row.to_value("parcel_id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse parcel_id: {e}"),
    })?;

    let id: i64 = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse id for parcel {parcel_id}: {e}"),
    })?;

    let geom_geojson: Option<String> = row.to_value("geom_geojson").unwrap_or(None);
    let centroid_geojson: Option<String> = row.to_value("centroid_geojson").unwrap_or(None);
    let created_at: Option<NaiveDateTime> = row.to_value("created_at").unwrap_or(None);
    let updated_at: Option<NaiveDateTime> = row.to_value("updated_at").unwrap_or(None);

    Ok(Parcel {
        id,
        address: row.to_value("address").unwrap_or(None),
        owner_name: row.to_value("owner_name").unwrap_or(None),
        county: row.to_value("county").unwrap_or(None),
        state_code: row.to_value("state_code").unwrap_or(None),
        geom: decode_geometry(&parcel_id, "geom", geom_geojson.as_deref()),
        centroid: decode_geometry(&parcel_id, "centroid", centroid_geojson.as_deref()),
        created_at: created_at.map(to_utc),
        updated_at: updated_at.map(to_utc),
        parcel_id,
    })
}

fn to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_query_is_ordered_and_capped() {
        let sql = bbox_sql(100);
        assert!(sql.contains("ST_MakeEnvelope($1, $2, $3, $4, 4326)"));
        assert!(sql.contains(r#"ORDER BY parcel_id COLLATE "C" ASC"#));
        assert!(sql.trim_end().ends_with("LIMIT 100"));
    }

    #[test]
    fn near_query_delegates_radius_to_store_function() {
        let sql = near_sql();
        assert!(sql.contains("find_parcels_near($1, $2, $3)"));
        // ST_MakePoint takes (lon, lat)
        assert!(sql.contains("ST_MakePoint($2, $1)"));
        assert!(sql.contains(r#"parcel_id COLLATE "C" ASC"#));
    }

    #[test]
    fn parcel_id_ordering_ignores_database_collation() {
        for sql in [bbox_sql(100), near_sql()] {
            assert!(!sql.contains("parcel_id ASC"), "{sql}");
            assert_eq!(sql.matches(r#"parcel_id COLLATE "C" ASC"#).count(), 1, "{sql}");
        }
    }

    #[test]
    fn area_is_measured_on_geography() {
        assert!(AREA_SQL.contains("ST_Area(geom::geography)"));
    }

    #[test]
    fn every_parcel_query_selects_geojson_columns() {
        for sql in [bbox_sql(1), near_sql(), by_id_sql()] {
            assert!(sql.contains("ST_AsGeoJSON(geom) AS geom_geojson"));
            assert!(sql.contains("ST_AsGeoJSON(centroid) AS centroid_geojson"));
        }
    }
}
