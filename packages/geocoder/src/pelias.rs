//! Pelias geocoder client for self-hosted instances.
//!
//! Pelias exposes a `/v1/search` endpoint that accepts free-form text
//! queries and returns `GeoJSON` `FeatureCollection` responses. Since the
//! instance is self-hosted there are no external rate limits.
//!
//! See <https://github.com/pelias/documentation/blob/master/search.md>

use courier_track_order_models::Coordinate;

use crate::{GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider};

/// Pelias `/v1/search` client.
pub struct PeliasGeocoder {
    client: reqwest::Client,
    base_url: String,
    country_code: Option<String>,
}

impl PeliasGeocoder {
    /// Creates a client for the Pelias instance at `base_url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, country_code: Option<String>) -> Self {
        Self {
            client,
            base_url,
            country_code,
        }
    }
}

#[async_trait::async_trait]
impl Geocoder for PeliasGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        let url = format!("{}/v1/search", self.base_url);

        let mut req = self
            .client
            .get(&url)
            .query(&[("text", address), ("size", "1")]);

        if let Some(country) = &self.country_code {
            req = req.query(&[("boundary.country", country.as_str())]);
        }

        let resp = req.send().await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !resp.status().is_success() {
            return Err(GeocodeError::Parse {
                message: format!("Pelias returned status {}", resp.status()),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a Pelias `GeoJSON` `FeatureCollection` response.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let features = body
        .get("features")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Pelias response missing 'features' array".to_string(),
        })?;

    let Some(first) = features.first() else {
        return Ok(None);
    };

    let coords = first
        .pointer("/geometry/coordinates")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| GeocodeError::Parse {
            message: "Feature missing geometry.coordinates".to_string(),
        })?;

    let (Some(lng), Some(lat)) = (
        coords.first().and_then(serde_json::Value::as_f64),
        coords.get(1).and_then(serde_json::Value::as_f64),
    ) else {
        return Err(GeocodeError::Parse {
            message: "coordinates must be two numbers".to_string(),
        });
    };

    let coordinate = Coordinate::new(lat, lng).ok_or_else(|| GeocodeError::Parse {
        message: format!("Pelias returned out-of-range position {lat},{lng}"),
    })?;

    Ok(Some(GeocodedAddress {
        coordinate,
        matched_address: first
            .pointer("/properties/label")
            .and_then(serde_json::Value::as_str)
            .map(String::from),
        provider: GeocodingProvider::Pelias,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pelias_feature() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [-77.0364, 38.8951]
                },
                "properties": {
                    "label": "1600 Pennsylvania Ave NW, Washington, DC, USA"
                }
            }]
        });
        let result = parse_response(&body).unwrap().unwrap();
        assert!((result.coordinate.latitude - 38.8951).abs() < 1e-4);
        assert!((result.coordinate.longitude - -77.0364).abs() < 1e-4);
        assert_eq!(result.provider, GeocodingProvider::Pelias);
        assert_eq!(
            result.matched_address.as_deref(),
            Some("1600 Pennsylvania Ave NW, Washington, DC, USA")
        );
    }

    #[test]
    fn parses_pelias_empty() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": []
        });
        assert!(parse_response(&body).unwrap().is_none());
    }

    #[test]
    fn rejects_short_coordinates() {
        let body = serde_json::json!({
            "features": [{"geometry": {"coordinates": [-77.0]}}]
        });
        assert!(parse_response(&body).is_err());
    }
}
