//! Query resolution independent of the GraphQL layer.
//!
//! [`ParcelResolver`] validates arguments, makes exactly one bounded call
//! to the spatial store, and shapes the result. Validation failures never
//! reach the store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parcel_gis_database::{DbError, ParcelStore};
use parcel_gis_parcel_models::{
    AreaUnit, BoundingBox, MAX_BBOX_RESULTS, NearQuery, Parcel, validate_parcel_id,
};

use crate::error::GisError;

/// Stateless resolver shared by every request.
#[derive(Clone)]
pub struct ParcelResolver {
    store: Arc<dyn ParcelStore>,
    query_timeout: Duration,
}

impl ParcelResolver {
    /// Creates a resolver over `store` that gives up on any single store
    /// call after `query_timeout`.
    #[must_use]
    pub fn new(store: Arc<dyn ParcelStore>, query_timeout: Duration) -> Self {
        Self {
            store,
            query_timeout,
        }
    }

    /// Parcels intersecting `[west, south, east, north]`, ordered by
    /// `parcel_id`, at most [`MAX_BBOX_RESULTS`].
    ///
    /// # Errors
    ///
    /// Returns [`GisError::Validation`] for a malformed bbox, or a store
    /// error.
    pub async fn parcels_in_bbox(&self, bbox: &[f64]) -> Result<Vec<Parcel>, GisError> {
        let bbox = BoundingBox::from_values(bbox)?;

        let mut parcels = self
            .bounded(
                "parcelsInBBox",
                self.store.parcels_in_bbox(&bbox, MAX_BBOX_RESULTS),
            )
            .await?;
        parcels.truncate(MAX_BBOX_RESULTS);

        Ok(parcels)
    }

    /// Parcels within `radius_meters` of `(lat, lon)`, nearest first.
    ///
    /// # Errors
    ///
    /// Returns [`GisError::Validation`] naming the out-of-range parameter,
    /// or a store error.
    pub async fn parcels_near(
        &self,
        lat: f64,
        lon: f64,
        radius_meters: f64,
    ) -> Result<Vec<Parcel>, GisError> {
        let query = NearQuery::new(lat, lon, radius_meters)?;
        self.bounded("parcelsNear", self.store.parcels_near(&query)).await
    }

    /// Exact lookup. Absence is `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`GisError::Validation`] for an empty id, or a store error.
    pub async fn parcel(&self, id: &str) -> Result<Option<Parcel>, GisError> {
        let id = validate_parcel_id(id)?;
        self.bounded("parcel", self.store.parcel_by_id(id)).await
    }

    /// Area of a parcel's boundary in `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`GisError::NotFound`] if no parcel has this id,
    /// [`GisError::MissingBoundary`] if it has no boundary, or a store
    /// error.
    pub async fn parcel_area(&self, id: &str, unit: AreaUnit) -> Result<f64, GisError> {
        let id = validate_parcel_id(id)?;

        let area = self
            .bounded("parcelArea", self.store.parcel_area(id))
            .await?
            .ok_or_else(|| GisError::NotFound {
                parcel_id: id.to_string(),
            })?;

        area.in_unit(unit).ok_or_else(|| GisError::MissingBoundary {
            parcel_id: id.to_string(),
        })
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, DbError>> + Send,
    ) -> Result<T, GisError> {
        match tokio::time::timeout(self.query_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                log::error!("{operation} failed: {e}");
                Err(GisError::Store(e))
            }
            Err(_) => {
                log::error!("{operation} timed out after {:?}", self.query_timeout);
                Err(GisError::Timeout(self.query_timeout))
            }
        }
    }
}
