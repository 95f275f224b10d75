#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding and driving-route clients for the tracking map.
//!
//! Free-text pickup and dropoff addresses are resolved to coordinates by a
//! chain of providers configured via TOML files in `services/`:
//!
//! 1. **Pelias** (priority 1): self-hosted, disabled unless an instance is
//!    configured.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free, 1 req/sec rate
//!    limit.
//!
//! Driving routes come from an **OSRM** server. Providers are loaded from
//! the [`service_registry`] and, for geocoding, tried in priority order by
//! [`GeocoderChain`].

pub mod nominatim;
pub mod osrm;
pub mod pelias;
pub mod service_registry;

use courier_track_order_models::Coordinate;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;
pub use pelias::PeliasGeocoder;

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    /// Resolved position.
    pub coordinate: Coordinate,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
    /// Which provider resolved this address.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingProvider {
    /// Self-hosted Pelias geocoder.
    Pelias,
    /// Nominatim / OpenStreetMap.
    Nominatim,
    /// Anything else (test doubles, custom providers).
    Other,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Errors from routing operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Resolves free-text addresses to coordinates.
#[async_trait::async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes one address. `Ok(None)` means the provider found no match.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError>;
}

/// A driving-route request: origin, destination and intermediate stops.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    /// Start of the route.
    pub origin: Coordinate,
    /// End of the route.
    pub destination: Coordinate,
    /// Stops between origin and destination, in order.
    pub waypoints: Vec<Coordinate>,
}

impl RouteRequest {
    /// All points of the request in travel order.
    #[must_use]
    pub fn stops(&self) -> Vec<Coordinate> {
        let mut stops = Vec::with_capacity(self.waypoints.len() + 2);
        stops.push(self.origin);
        stops.extend(self.waypoints.iter().copied());
        stops.push(self.destination);
        stops
    }
}

/// A computed route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    /// Polyline of the route.
    pub points: Vec<Coordinate>,
    /// Total length in meters.
    pub distance_meters: f64,
    /// Expected travel time in seconds.
    pub duration_seconds: f64,
}

/// Computes driving routes.
#[async_trait::async_trait]
pub trait RoutePlanner: Send + Sync {
    /// Plans a route through `request`'s stops. `Ok(None)` means no route
    /// exists between them.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the request or response parsing fails.
    async fn route(&self, request: &RouteRequest) -> Result<Option<RoutePath>, RouteError>;
}

/// Tries a list of geocoders in order until one finds a match.
///
/// A provider that errors is logged and skipped. If every provider either
/// errored or found nothing, the last error (if any) is returned.
pub struct GeocoderChain {
    providers: Vec<Box<dyn Geocoder>>,
}

impl GeocoderChain {
    /// Creates a chain from providers in priority order.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn Geocoder>>) -> Self {
        Self { providers }
    }

    /// Builds a chain from the enabled geocoding services.
    #[must_use]
    pub fn from_services(
        client: &reqwest::Client,
        services: &[service_registry::GeocodingService],
    ) -> Self {
        let providers = services
            .iter()
            .filter_map(|svc| -> Option<Box<dyn Geocoder>> {
                match &svc.provider {
                    service_registry::ProviderConfig::Nominatim {
                        base_url,
                        rate_limit_ms,
                        country_codes,
                    } => Some(Box::new(NominatimGeocoder::new(
                        client.clone(),
                        base_url.clone(),
                        country_codes.clone(),
                        std::time::Duration::from_millis(*rate_limit_ms),
                    ))),
                    service_registry::ProviderConfig::Pelias {
                        base_url,
                        country_code,
                    } => Some(Box::new(PeliasGeocoder::new(
                        client.clone(),
                        base_url.clone(),
                        country_code.clone(),
                    ))),
                    service_registry::ProviderConfig::Osrm { .. } => None,
                }
            })
            .collect();
        Self::new(providers)
    }
}

#[async_trait::async_trait]
impl Geocoder for GeocoderChain {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let mut last_err = None;

        for provider in &self.providers {
            match provider.geocode(address).await {
                Ok(Some(found)) => return Ok(Some(found)),
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Geocoder failed for '{address}': {e}");
                    last_err = Some(e);
                }
            }
        }

        last_err.map_or(Ok(None), Err)
    }
}
