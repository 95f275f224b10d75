#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the courier tracking server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the order types so the wire contract the web clients rely on can
//! evolve independently.

use courier_track_order_models::{Coordinate, NewOrder, OrderUpdate, Theme};
use serde::{Deserialize, Deserializer, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Generic error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body of `POST /verify-token`.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyTokenRequest {
    /// Google ID token.
    #[serde(default)]
    pub token: String,
}

/// Response of `POST /verify-token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyTokenResponse {
    /// Whether the token belongs to an allowed courier.
    pub success: bool,
    /// The courier's email, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Why verification failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyTokenResponse {
    /// A successful verification.
    #[must_use]
    pub const fn verified(email: String) -> Self {
        Self {
            success: true,
            email: Some(email),
            error: None,
        }
    }

    /// A failed verification.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            email: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /update-order`.
///
/// Web forms send coordinates as text, so `lat`/`lng` accept numbers or
/// numeric strings; blank text is treated as absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    /// Google ID token of the courier.
    #[serde(default)]
    pub token: String,
    /// Order to update.
    #[serde(default)]
    pub tracking_id: String,
    /// New status label.
    #[serde(default)]
    pub status: Option<String>,
    /// Courier latitude.
    #[serde(default, deserialize_with = "loose_number")]
    pub lat: Option<f64>,
    /// Courier longitude.
    #[serde(default, deserialize_with = "loose_number")]
    pub lng: Option<f64>,
}

impl UpdateOrderRequest {
    /// The update to forward, or `None` if no tracking id was given.
    ///
    /// The position is only included when both coordinates are present and
    /// valid.
    #[must_use]
    pub fn to_update(&self) -> Option<OrderUpdate> {
        let tracking_id = self.tracking_id.trim();
        if tracking_id.is_empty() {
            return None;
        }
        Some(OrderUpdate {
            tracking_id: tracking_id.to_string(),
            status: self
                .status
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
            location: self.lat.zip(self.lng).and_then(|(lat, lng)| Coordinate::new(lat, lng)),
        })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<LooseNumber>::deserialize(deserializer)? {
            Some(LooseNumber::Number(n)) => Some(n),
            Some(LooseNumber::Text(s)) => s.trim().parse().ok(),
            None => None,
        },
    )
}

/// Body of `POST /api/orders`.
///
/// Accepts both the descriptive field names and the short ones the order
/// service itself uses (`address`, `dropoff`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Customer name.
    #[serde(default)]
    pub full_name: String,
    /// Customer email.
    #[serde(default)]
    pub email: String,
    /// Pickup address.
    #[serde(default, alias = "address")]
    pub pickup_address: String,
    /// Dropoff address.
    #[serde(default, alias = "dropoff")]
    pub dropoff_address: String,
    /// Customer phone.
    #[serde(default)]
    pub phone: String,
    /// Package description.
    #[serde(default)]
    pub description: String,
}

impl CreateOrderRequest {
    /// Names of required fields that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("pickupAddress", &self.pickup_address),
            ("phone", &self.phone),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl From<CreateOrderRequest> for NewOrder {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            full_name: req.full_name.trim().to_string(),
            email: req.email.trim().to_string(),
            pickup_address: req.pickup_address.trim().to_string(),
            dropoff_address: req.dropoff_address.trim().to_string(),
            phone: req.phone.trim().to_string(),
            description: req.description.trim().to_string(),
        }
    }
}

/// Response of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum CreateOrderResponse {
    /// The order was created.
    Success {
        /// Tracking id of the new order.
        tracking_id: String,
    },
    /// The order was not created.
    Error {
        /// Why.
        message: String,
    },
}

/// Query string of `GET /track/{trackingId}`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TrackQuery {
    /// Page theme; light when absent.
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_request_accepts_text_coordinates() {
        let req: UpdateOrderRequest = serde_json::from_value(json!({
            "token": "tok",
            "trackingId": " ABC123 ",
            "status": "In Transit",
            "lat": "40.5",
            "lng": -74.25,
        }))
        .unwrap();

        let update = req.to_update().unwrap();
        assert_eq!(update.tracking_id, "ABC123");
        assert_eq!(update.status.as_deref(), Some("In Transit"));
        assert_eq!(
            update.location,
            Some(Coordinate {
                latitude: 40.5,
                longitude: -74.25
            })
        );
    }

    #[test]
    fn update_request_drops_half_position_and_blank_status() {
        let req: UpdateOrderRequest = serde_json::from_value(json!({
            "trackingId": "ABC123",
            "status": "  ",
            "lat": "",
            "lng": 10,
        }))
        .unwrap();

        let update = req.to_update().unwrap();
        assert!(update.status.is_none());
        assert!(update.location.is_none());
    }

    #[test]
    fn update_request_without_id_is_rejected() {
        let req: UpdateOrderRequest = serde_json::from_value(json!({ "token": "tok" })).unwrap();
        assert!(req.to_update().is_none());
    }

    #[test]
    fn create_request_accepts_short_names() {
        let req: CreateOrderRequest = serde_json::from_value(json!({
            "fullName": "Jane",
            "email": "jane@example.com",
            "address": "1 Main St",
            "dropoff": "9 Elm St",
            "phone": "555",
        }))
        .unwrap();
        assert!(req.missing_fields().is_empty());

        let order = NewOrder::from(req);
        assert_eq!(order.pickup_address, "1 Main St");
        assert_eq!(order.dropoff_address, "9 Elm St");
    }

    #[test]
    fn create_request_reports_missing_fields() {
        let req: CreateOrderRequest = serde_json::from_value(json!({ "fullName": "Jane" })).unwrap();
        assert_eq!(req.missing_fields(), ["email", "pickupAddress", "phone"]);
    }

    #[test]
    fn create_response_wire_format() {
        assert_eq!(
            serde_json::to_value(CreateOrderResponse::Success {
                tracking_id: "TRK1".to_string()
            })
            .unwrap(),
            json!({ "status": "success", "trackingId": "TRK1" })
        );
        assert_eq!(
            serde_json::to_value(CreateOrderResponse::Error {
                message: "nope".to_string()
            })
            .unwrap(),
            json!({ "status": "error", "message": "nope" })
        );
    }

    #[test]
    fn verify_response_omits_empty_fields() {
        assert_eq!(
            serde_json::to_value(VerifyTokenResponse::failed("Invalid token")).unwrap(),
            json!({ "success": false, "error": "Invalid token" })
        );
    }

    #[test]
    fn track_query_parses_theme() {
        let q: TrackQuery = serde_json::from_value(json!({ "theme": "dark" })).unwrap();
        assert_eq!(q.theme, Some(Theme::Dark));
    }
}
