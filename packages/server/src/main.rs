#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the parcel GIS subgraph.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parcel_gis_server::config::ServerConfig;
use parcel_gis_server::{ServerError, StoreSource, interactive, run_server, schema};

#[derive(Parser)]
#[command(name = "parcel_gis_server", about = "GraphQL subgraph for land parcels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the subgraph using settings from the environment
    Serve {
        /// Serve parcels from a `GeoJSON` `FeatureCollection` instead of `PostGIS`
        #[arg(long)]
        fixture: Option<PathBuf>,
    },
    /// Print the federated schema SDL and exit
    Schema,
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run().await;
    };

    match command {
        Commands::Serve { fixture } => {
            let config = ServerConfig::from_env()?;
            let source = fixture.map_or(StoreSource::Postgis, StoreSource::Fixture);
            run_server(config, source).await?;
        }
        Commands::Schema => {
            println!("{}", schema::federated_sdl());
        }
    }

    Ok(())
}
