//! Interactive mode for the server.
//!
//! Prompts for bind address, port and an optional fixture file before
//! starting the server.

use std::path::PathBuf;

use dialoguer::{Confirm, Input};

use crate::config::ServerConfig;
use crate::{ServerError, StoreSource};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Defaults for each prompt come from the environment (see
/// [`ServerConfig::from_env`]). An empty fixture answer serves from
/// `PostGIS`.
///
/// # Errors
///
/// Returns [`ServerError`] if the environment holds an invalid setting or
/// the server fails to start.
#[allow(clippy::future_not_send)]
pub async fn run() -> Result<(), ServerError> {
    println!("Parcel GIS Subgraph");
    println!();

    let defaults = ServerConfig::from_env()?;

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(defaults.bind_addr.clone())
        .interact_text()
        .unwrap_or_else(|_| defaults.bind_addr.clone());

    let port: u16 = Input::new()
        .with_prompt("Port")
        .default(defaults.port)
        .interact_text()
        .unwrap_or(defaults.port);

    let fixture: String = Input::new()
        .with_prompt("GeoJSON fixture (leave empty for PostGIS)")
        .allow_empty(true)
        .interact_text()
        .unwrap_or_default();

    let source = if fixture.trim().is_empty() {
        StoreSource::Postgis
    } else {
        StoreSource::Fixture(PathBuf::from(fixture.trim()))
    };

    if !Confirm::new()
        .with_prompt(format!(
            "Start server on {bind_addr}:{port} ({})?",
            source.kind()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    let config = ServerConfig {
        bind_addr,
        port,
        ..defaults
    };

    super::run_server(config, source).await
}
