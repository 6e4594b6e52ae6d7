#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Spatial store access for parcel queries.
//!
//! Uses `switchy_database` raw parameterized queries against `PostGIS`.
//! All geometry work (envelope intersection, great-circle distance,
//! spheroidal area) runs inside the database; this crate only builds
//! statements and decodes rows. The parcel schema and the
//! `find_parcels_near` function are owned by the loading process and are
//! never created or migrated from here.

pub mod db;
pub mod geojson;
pub mod queries;
pub mod store;

pub use store::{ParcelStore, PostgisParcelStore};

/// Errors that can occur during spatial store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Connecting to the store failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of what went wrong.
        message: String,
    },

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
