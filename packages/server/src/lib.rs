#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web GraphQL subgraph serving land parcels.
//!
//! Exposes `POST /graphql` (federation-ready schema keyed on
//! `parcel_id`), `GET /graphql` (`GraphiQL`), and `GET /health`. Parcels
//! come from `PostGIS` or, for local development, from an in-memory index
//! loaded from a `GeoJSON` fixture.

pub mod config;
pub mod error;
mod handlers;
pub mod interactive;
pub mod resolvers;
pub mod schema;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use parcel_gis_database::{DbError, ParcelStore, PostgisParcelStore};
use parcel_gis_spatial::{ParcelIndex, SpatialError};

use crate::config::{ConfigError, ServerConfig};
use crate::resolvers::ParcelResolver;
use crate::schema::{ParcelSchema, build_schema};

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or running the HTTP server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Connecting to `PostGIS` failed.
    #[error(transparent)]
    Database(#[from] DbError),

    /// Loading the fixture failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Where parcels are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSource {
    /// `PostGIS` at `DATABASE_URL`.
    Postgis,
    /// A `GeoJSON` `FeatureCollection` loaded into memory.
    Fixture(PathBuf),
}

impl StoreSource {
    /// Short name reported by `/health`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Postgis => "postgis",
            Self::Fixture(_) => "fixture",
        }
    }
}

/// Shared application state.
pub struct AppState {
    /// The executable GraphQL schema.
    pub schema: ParcelSchema,
    /// Which store backs this instance.
    pub store_kind: &'static str,
}

impl AppState {
    /// Builds the state for a resolver over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ParcelStore>, source: &StoreSource, config: &ServerConfig) -> Self {
        Self {
            schema: build_schema(ParcelResolver::new(store, config.query_timeout)),
            store_kind: source.kind(),
        }
    }
}

/// Opens the parcel store named by `source`.
///
/// # Errors
///
/// Returns [`ServerError`] if the database is unreachable or the fixture
/// cannot be loaded.
pub async fn open_store(
    source: &StoreSource,
    config: &ServerConfig,
) -> Result<Arc<dyn ParcelStore>, ServerError> {
    let store: Arc<dyn ParcelStore> = match source {
        StoreSource::Postgis => {
            log::info!("Connecting to database...");
            Arc::new(PostgisParcelStore::connect_from_env(config.query_timeout).await?)
        }
        StoreSource::Fixture(path) => {
            log::info!("Loading parcel fixture {}...", path.display());
            Arc::new(ParcelIndex::load(path)?)
        }
    };

    Ok(store)
}

/// Registers the subgraph routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health)).service(
        web::resource("/graphql")
            .route(web::post().to(handlers::graphql))
            .route(web::get().to(handlers::graphiql)),
    );
}

/// Starts the parcel subgraph server.
///
/// Opens the store named by `source` and serves until the process is
/// stopped. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the store cannot be opened or the HTTP
/// server fails to bind.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig, source: StoreSource) -> Result<(), ServerError> {
    let store = open_store(&source, &config).await?;
    let state = web::Data::new(AppState::new(store, &source, &config));

    log::info!(
        "Starting parcel subgraph on {}:{} (store: {}, query timeout: {:?})",
        config.bind_addr,
        config.port,
        source.kind(),
        config.query_timeout
    );

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr.as_str(), config.port))?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::{MockStore, parcel};

    fn state(store: MockStore) -> web::Data<AppState> {
        web::Data::new(AppState::new(
            Arc::new(store),
            &StoreSource::Fixture(PathBuf::from("parcels.geojson")),
            &ServerConfig::default(),
        ))
    }

    #[actix_web::test]
    async fn health_reports_store_kind() {
        let app = test::init_service(
            App::new()
                .app_data(state(MockStore::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["healthy"], true);
        assert_eq!(body["store"], "fixture");
    }

    #[actix_web::test]
    async fn graphql_post_executes_queries() {
        let app = test::init_service(
            App::new()
                .app_data(state(MockStore::with_parcels(vec![parcel("LOT-7")])))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": r#"{ parcel(id: "LOT-7") { parcel_id } }"# }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["parcel"]["parcel_id"], "LOT-7");
    }

    #[actix_web::test]
    async fn graphql_errors_are_reported_in_body() {
        let app = test::init_service(
            App::new()
                .app_data(state(MockStore::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/graphql")
            .set_json(json!({ "query": "{ parcelsInBBox(bbox: [1, 2, 3]) { parcel_id } }" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");
    }

    #[actix_web::test]
    async fn graphql_get_serves_graphiql() {
        let app = test::init_service(
            App::new()
                .app_data(state(MockStore::default()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/graphql").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("graphiql"));
    }

    #[::core::prelude::v1::test]
    fn store_kinds() {
        assert_eq!(StoreSource::Postgis.kind(), "postgis");
        assert_eq!(
            StoreSource::Fixture(PathBuf::from("x.geojson")).kind(),
            "fixture"
        );
    }
}
