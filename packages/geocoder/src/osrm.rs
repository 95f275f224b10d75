//! OSRM driving-route client.
//!
//! Uses the `route/v1/{profile}` service with `GeoJSON` geometry so the
//! route polyline comes back as plain `[lng, lat]` pairs.
//!
//! See <https://project-osrm.org/docs/v5.24.0/api/#route-service>

use courier_track_order_models::Coordinate;

use crate::{RouteError, RoutePath, RoutePlanner, RouteRequest};

/// OSRM route service client.
pub struct OsrmRouter {
    client: reqwest::Client,
    base_url: String,
    profile: String,
}

impl OsrmRouter {
    /// Creates a client for the OSRM server at `base_url`.
    #[must_use]
    pub const fn new(client: reqwest::Client, base_url: String, profile: String) -> Self {
        Self {
            client,
            base_url,
            profile,
        }
    }

    fn route_url(&self, request: &RouteRequest) -> String {
        let stops = request
            .stops()
            .iter()
            .map(|c| format!("{},{}", c.longitude, c.latitude))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{stops}",
            self.base_url.trim_end_matches('/'),
            self.profile
        )
    }
}

#[async_trait::async_trait]
impl RoutePlanner for OsrmRouter {
    async fn route(&self, request: &RouteRequest) -> Result<Option<RoutePath>, RouteError> {
        let resp = self
            .client
            .get(self.route_url(request))
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        // OSRM reports NoRoute and friends with 400 plus a JSON body, so the
        // body is read regardless of status.
        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses an OSRM route response.
fn parse_response(body: &serde_json::Value) -> Result<Option<RoutePath>, RouteError> {
    let code = body["code"].as_str().ok_or_else(|| RouteError::Parse {
        message: "OSRM response missing 'code'".to_string(),
    })?;

    match code {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Ok(None),
        other => {
            return Err(RouteError::Parse {
                message: format!(
                    "OSRM returned {other}: {}",
                    body["message"].as_str().unwrap_or("no message")
                ),
            });
        }
    }

    let Some(route) = body["routes"].as_array().and_then(|r| r.first()) else {
        return Ok(None);
    };

    let coords = route
        .pointer("/geometry/coordinates")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| RouteError::Parse {
            message: "Route missing geometry.coordinates".to_string(),
        })?;

    let points = coords
        .iter()
        .map(|pair| {
            let lng = pair.get(0).and_then(serde_json::Value::as_f64);
            let lat = pair.get(1).and_then(serde_json::Value::as_f64);
            lat.zip(lng)
                .and_then(|(lat, lng)| Coordinate::new(lat, lng))
                .ok_or_else(|| RouteError::Parse {
                    message: format!("Invalid route coordinate {pair}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(RoutePath {
        points,
        distance_meters: route["distance"].as_f64().unwrap_or_default(),
        duration_seconds: route["duration"].as_f64().unwrap_or_default(),
    }))
}
