//! Canned [`ParcelStore`] for resolver and schema tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parcel_gis_database::{DbError, ParcelStore};
use parcel_gis_parcel_models::{BoundingBox, NearQuery, Parcel, ParcelArea};

/// Store returning fixed data and counting every call it receives.
#[derive(Default)]
pub struct MockStore {
    pub calls: AtomicUsize,
    parcels: Vec<Parcel>,
    areas: BTreeMap<String, Option<f64>>,
    fail: bool,
    fail_area: bool,
    delay: Option<Duration>,
}

impl MockStore {
    pub fn with_parcels(parcels: Vec<Parcel>) -> Self {
        Self {
            parcels,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_area(mut self, parcel_id: &str, square_meters: Option<f64>) -> Self {
        self.areas.insert(parcel_id.to_string(), square_meters);
        self
    }

    pub const fn with_failing_area(mut self) -> Self {
        self.fail_area = true;
        self
    }

    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn enter(&self) -> Result<(), DbError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(DbError::Connection {
                message: "connection refused (os error 111)".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ParcelStore for MockStore {
    async fn parcels_in_bbox(
        &self,
        _bbox: &BoundingBox,
        _limit: usize,
    ) -> Result<Vec<Parcel>, DbError> {
        self.enter().await?;
        Ok(self.parcels.clone())
    }

    async fn parcels_near(&self, _query: &NearQuery) -> Result<Vec<Parcel>, DbError> {
        self.enter().await?;
        Ok(self.parcels.clone())
    }

    async fn parcel_by_id(&self, parcel_id: &str) -> Result<Option<Parcel>, DbError> {
        self.enter().await?;
        Ok(self
            .parcels
            .iter()
            .find(|p| p.parcel_id == parcel_id)
            .cloned())
    }

    async fn parcel_area(&self, parcel_id: &str) -> Result<Option<ParcelArea>, DbError> {
        self.enter().await?;
        if self.fail_area {
            return Err(DbError::Conversion {
                message: "ST_Area returned a non-numeric value".to_string(),
            });
        }
        Ok(self.areas.get(parcel_id).map(|square_meters| ParcelArea {
            parcel_id: parcel_id.to_string(),
            square_meters: *square_meters,
        }))
    }
}

/// A parcel with only its identifiers set.
pub fn parcel(parcel_id: &str) -> Parcel {
    Parcel {
        id: 1,
        parcel_id: parcel_id.to_string(),
        address: None,
        owner_name: None,
        county: None,
        state_code: None,
        geom: None,
        centroid: None,
        created_at: None,
        updated_at: None,
    }
}
