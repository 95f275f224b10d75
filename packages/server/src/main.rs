#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web proxy server for courier tracking.
//!
//! Reads configuration from `COURIER_TRACK_CONFIG` and the environment
//! (see `courier_track_config`).

use courier_track_config::AppConfig;

#[actix_web::main]
async fn main() -> Result<(), courier_track_server::ServerError> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = AppConfig::load()?;
    courier_track_server::run_server(config).await
}
