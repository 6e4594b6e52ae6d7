//! GraphQL schema for the parcel subgraph.
//!
//! Four root queries plus the federation entity resolver for `Parcel`,
//! keyed by `parcel_id`. Every resolver delegates to [`ParcelResolver`]
//! and maps [`GisError`] onto an `extensions.code`.

use async_graphql::{
    ComplexObject, Context, EmptyMutation, EmptySubscription, ErrorExtensions as _, ID, Object,
    Result, Schema, SDLExportOptions, SimpleObject,
};
use chrono::{DateTime, Utc};
use parcel_gis_parcel_models::Parcel;
use parcel_gis_server_models::{ApiAreaResult, ApiAreaUnit, GeoJson};

use crate::error::GisError;
use crate::resolvers::ParcelResolver;

/// The executable parcel schema.
pub type ParcelSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Per-request data made available to resolvers.
///
/// Carries the caller's `Authorization` header so a future authorization
/// layer can inspect it. No resolver enforces anything with it today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Raw `Authorization` header value, if sent.
    pub authorization: Option<String>,
}

/// A land parcel as exposed to GraphQL.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(name = "Parcel", complex, rename_fields = "snake_case")]
pub struct ApiParcel {
    /// Numeric surrogate key, as a string.
    pub id: ID,
    /// Stable external identifier.
    pub parcel_id: String,
    /// Free-text street address.
    pub address: Option<String>,
    /// Owner of record.
    pub owner_name: Option<String>,
    /// County name.
    pub county: Option<String>,
    /// Two-letter state code.
    pub state_code: Option<String>,
    /// Boundary polygon.
    pub geom: Option<GeoJson>,
    /// Boundary centroid.
    pub centroid: Option<GeoJson>,
    /// When the record was first loaded.
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last modified by the loader.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Parcel> for ApiParcel {
    fn from(parcel: Parcel) -> Self {
        Self {
            id: ID(parcel.id.to_string()),
            parcel_id: parcel.parcel_id,
            address: parcel.address,
            owner_name: parcel.owner_name,
            county: parcel.county,
            state_code: parcel.state_code,
            geom: parcel.geom.map(GeoJson::from),
            centroid: parcel.centroid.map(GeoJson::from),
            created_at: parcel.created_at,
            updated_at: parcel.updated_at,
        }
    }
}

#[ComplexObject]
impl ApiParcel {
    /// Area of the boundary in `unit`. Null when it cannot be computed;
    /// the failure is logged rather than failing the enclosing query.
    async fn area(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] unit: ApiAreaUnit,
    ) -> Result<Option<f64>> {
        let resolver = ctx.data::<ParcelResolver>()?;

        match resolver.parcel_area(&self.parcel_id, unit.into()).await {
            Ok(area) => Ok(Some(area)),
            Err(GisError::MissingBoundary { .. }) => Ok(None),
            Err(e) => {
                log::warn!("area for parcel {} unavailable: {e}", self.parcel_id);
                Ok(None)
            }
        }
    }
}

fn to_api(parcels: Vec<Parcel>) -> Vec<ApiParcel> {
    parcels.into_iter().map(ApiParcel::from).collect()
}

/// Root query type of the parcel subgraph.
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Parcels whose boundary intersects `[west, south, east, north]`.
    #[graphql(name = "parcelsInBBox")]
    async fn parcels_in_bbox(&self, ctx: &Context<'_>, bbox: Vec<f64>) -> Result<Vec<ApiParcel>> {
        let resolver = ctx.data::<ParcelResolver>()?;
        let parcels = resolver
            .parcels_in_bbox(&bbox)
            .await
            .map_err(|e| e.extend())?;

        Ok(to_api(parcels))
    }

    /// Parcels whose centroid lies within `radiusMeters` of the point,
    /// nearest first.
    async fn parcels_near(
        &self,
        ctx: &Context<'_>,
        lat: f64,
        lon: f64,
        radius_meters: f64,
    ) -> Result<Vec<ApiParcel>> {
        let resolver = ctx.data::<ParcelResolver>()?;
        let parcels = resolver
            .parcels_near(lat, lon, radius_meters)
            .await
            .map_err(|e| e.extend())?;

        Ok(to_api(parcels))
    }

    /// Parcel by `parcel_id`, or null.
    async fn parcel(&self, ctx: &Context<'_>, id: String) -> Result<Option<ApiParcel>> {
        let resolver = ctx.data::<ParcelResolver>()?;
        let parcel = resolver.parcel(&id).await.map_err(|e| e.extend())?;

        Ok(parcel.map(ApiParcel::from))
    }

    /// Area of the parcel's boundary in `unit`, square meters by default.
    async fn parcel_area(
        &self,
        ctx: &Context<'_>,
        id: String,
        #[graphql(default)] unit: ApiAreaUnit,
    ) -> Result<ApiAreaResult> {
        let resolver = ctx.data::<ParcelResolver>()?;
        let area = resolver
            .parcel_area(&id, unit.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(ApiAreaResult {
            parcel_id: id,
            area,
            unit,
        })
    }

    /// Federation entity lookup for `Parcel` by `parcel_id`.
    #[graphql(entity)]
    async fn find_parcel_by_parcel_id(
        &self,
        ctx: &Context<'_>,
        #[graphql(key, name = "parcel_id")] parcel_id: String,
    ) -> Result<Option<ApiParcel>> {
        let resolver = ctx.data::<ParcelResolver>()?;
        let parcel = resolver.parcel(&parcel_id).await.map_err(|e| e.extend())?;

        Ok(parcel.map(ApiParcel::from))
    }
}

/// Builds the federated schema over `resolver`.
#[must_use]
pub fn build_schema(resolver: ParcelResolver) -> ParcelSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .enable_federation()
        .data(resolver)
        .finish()
}

/// SDL of the subgraph with federation directives, as served by
/// `_service { sdl }`. Needs no store.
#[must_use]
pub fn federated_sdl() -> String {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .enable_federation()
        .finish()
        .sdl_with_options(SDLExportOptions::new().federation())
}
