#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web proxy server for courier tracking.
//!
//! Sits between the web clients and the remote order service. Customers
//! look up orders through `/track/{trackingId}`; couriers sign in with
//! Google and post status and position updates through `/update-order`,
//! which is refused unless the token belongs to an allow-listed email.

mod handlers;
pub mod interactive;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use courier_track_auth::{Authorizer, GoogleTokenInfo};
use courier_track_config::{AppConfig, ConfigError};
use courier_track_geocoder::service_registry::build_providers;
use courier_track_geocoder::{Geocoder, RoutePlanner};
use courier_track_order::{AppsScriptClient, OrderService};
use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration is incomplete or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The listener failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Remote order service.
    pub orders: Arc<dyn OrderService>,
    /// Courier identity check.
    pub authorizer: Arc<Authorizer>,
    /// Address geocoder for map markers.
    pub geocoder: Arc<dyn Geocoder>,
    /// Route service, if one is enabled.
    pub router: Option<Arc<dyn RoutePlanner>>,
    /// Refresh interval for tracking controllers.
    pub refresh_interval: Duration,
}

/// Builds the outbound HTTP client.
///
/// Nominatim refuses requests without an identifying user agent.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(concat!("courier-track/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
}

/// Wires the order service, identity check, geocoder and router from
/// `config`.
///
/// # Errors
///
/// Returns [`ServerError::Http`] if the HTTP client cannot be built.
pub fn build_state(config: &AppConfig) -> Result<AppState, ServerError> {
    let client = http_client()?;

    let orders = AppsScriptClient::new(client.clone(), config.endpoint.clone());
    let authorizer = Authorizer::new(
        Arc::new(GoogleTokenInfo::new(client.clone())),
        config.client_id.clone(),
        config.allow_list.clone(),
    );
    let (geocoder, router) = build_providers(
        &client,
        config.geocoder_url.as_deref(),
        config.router_url.as_deref(),
    );
    if router.is_none() {
        log::warn!("No route service enabled; maps will show markers only");
    }

    Ok(AppState {
        orders: Arc::new(orders),
        authorizer: Arc::new(authorizer),
        geocoder: Arc::new(geocoder),
        router: router.map(|r| Arc::new(r) as Arc<dyn RoutePlanner>),
        refresh_interval: config.refresh_interval(),
    })
}

/// Registers every route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/orders", web::post().to(handlers::create_order)),
    )
    .route("/verify-token", web::post().to(handlers::verify_token))
    .route("/update-order", web::post().to(handlers::update_order))
    .route("/track/{tracking_id}", web::get().to(handlers::track));
}

/// Starts the server.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if the identity settings are missing, the HTTP
/// client cannot be built, or the listener fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server(config: AppConfig) -> Result<(), ServerError> {
    config.require_identity()?;
    let state = web::Data::new(build_state(&config)?);

    log::info!("Order service: {}", config.endpoint);
    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

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
