//! The read-only parcel store abstraction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parcel_gis_parcel_models::{BoundingBox, NearQuery, Parcel, ParcelArea};
use switchy_database::Database;

use crate::{DbError, db, queries};

/// Read access to parcel records.
///
/// Each method performs exactly one round-trip to the backing store and
/// holds no state between calls. Implementations must return bbox results
/// ordered by `parcel_id` ascending and near results ordered by ascending
/// distance from the query point, ties by `parcel_id`. `parcel_id` order is
/// byte order (`COLLATE "C"`), never a locale collation.
#[async_trait]
pub trait ParcelStore: Send + Sync {
    /// Parcels whose boundary intersects `bbox`, at most `limit` of them.
    async fn parcels_in_bbox(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<Parcel>, DbError>;

    /// Parcels within the query radius, nearest first.
    async fn parcels_near(&self, query: &NearQuery) -> Result<Vec<Parcel>, DbError>;

    /// Exact lookup by external identifier.
    async fn parcel_by_id(&self, parcel_id: &str) -> Result<Option<Parcel>, DbError>;

    /// Area of the named parcel in square meters, `None` if it doesn't exist.
    async fn parcel_area(&self, parcel_id: &str) -> Result<Option<ParcelArea>, DbError>;
}

/// [`ParcelStore`] backed by a `PostGIS` database.
#[derive(Clone)]
pub struct PostgisParcelStore {
    db: Arc<dyn Database>,
}

impl PostgisParcelStore {
    /// Wraps an existing database connection.
    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Connects using `DATABASE_URL` with the given statement timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection cannot be established.
    pub async fn connect_from_env(statement_timeout: Duration) -> Result<Self, DbError> {
        let db = db::connect_from_env(statement_timeout).await?;
        Ok(Self::new(Arc::from(db)))
    }
}

#[async_trait]
impl ParcelStore for PostgisParcelStore {
    async fn parcels_in_bbox(
        &self,
        bbox: &BoundingBox,
        limit: usize,
    ) -> Result<Vec<Parcel>, DbError> {
        queries::find_parcels_in_bbox(self.db.as_ref(), bbox, limit).await
    }

    async fn parcels_near(&self, query: &NearQuery) -> Result<Vec<Parcel>, DbError> {
        queries::find_parcels_near(self.db.as_ref(), query).await
    }

    async fn parcel_by_id(&self, parcel_id: &str) -> Result<Option<Parcel>, DbError> {
        queries::find_parcel_by_id(self.db.as_ref(), parcel_id).await
    }

    async fn parcel_area(&self, parcel_id: &str) -> Result<Option<ParcelArea>, DbError> {
        queries::get_parcel_area(self.db.as_ref(), parcel_id).await
    }
}
