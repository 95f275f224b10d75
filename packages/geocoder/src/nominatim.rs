//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on the
//! public instance. [`NominatimGeocoder`] spaces its own requests by the
//! `rate_limit_ms` from the service TOML configuration.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use courier_track_order_models::Coordinate;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider};

/// Free-form Nominatim search client.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl NominatimGeocoder {
    /// Creates a client for the search endpoint at `base_url`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        country_codes: Option<String>,
        min_interval: Duration,
    ) -> Self {
        Self {
            client,
            base_url,
            country_codes,
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous request.
    async fn throttle(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(prev) = *last {
            let ready_at = prev + self.min_interval;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}

#[async_trait::async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        self.throttle().await;

        let mut req = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")]);

        if let Some(codes) = &self.country_codes {
            req = req.query(&[("countrycodes", codes.as_str())]);
        }

        let resp = req.send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses Nominatim JSON response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let coordinate = Coordinate::new(lat, lon).ok_or_else(|| GeocodeError::Parse {
        message: format!("Nominatim returned out-of-range position {lat},{lon}"),
    })?;

    Ok(Some(GeocodedAddress {
        coordinate,
        matched_address: first["display_name"].as_str().map(String::from),
        provider: GeocodingProvider::Nominatim,
    }))
}
