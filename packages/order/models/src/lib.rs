#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Order types shared across the courier tracking workspace.
//!
//! The remote order service is a spreadsheet-backed script whose rows come
//! back with human-readable column names (`"Tracking Number"`,
//! `"Orderstatus"`, ...). [`OrderRecord`] wraps that raw row and
//! [`OrderSnapshot`] is the normalized form the tracking view works with.
//! Status presentation lives in [`status`].

pub mod status;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

pub use status::{BadgePalette, StatusCategory, Theme};

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, returning `None` when either component is not
    /// finite or out of range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }
}

/// Delivery status of an order.
///
/// The display form matches the labels the remote order service stores
/// (`"In Transit"`), so [`OrderStatus::to_string`] can be sent back as-is.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    /// Order placed, courier not yet dispatched.
    #[strum(to_string = "Pending")]
    Pending,
    /// Package collected from the pickup address.
    #[strum(to_string = "Picked Up", serialize = "PickedUp", serialize = "picked_up")]
    PickedUp,
    /// Package on its way to the dropoff address.
    #[strum(to_string = "In Transit", serialize = "InTransit", serialize = "in_transit")]
    InTransit,
    /// Package handed over at the dropoff address.
    #[strum(to_string = "Delivered")]
    Delivered,
    /// A label the service returned that none of the above recognize.
    #[strum(to_string = "Unrecognized")]
    Unrecognized,
}

impl OrderStatus {
    /// All statuses a courier may set.
    pub const SETTABLE: &[Self] = &[
        Self::Pending,
        Self::PickedUp,
        Self::InTransit,
        Self::Delivered,
    ];

    /// Interprets a raw status label.
    ///
    /// A blank label reads as [`OrderStatus::Pending`], which is what a
    /// freshly created order row holds. Unknown text becomes
    /// [`OrderStatus::Unrecognized`] rather than an error.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() {
            return Self::Pending;
        }
        label.parse().unwrap_or(Self::Unrecognized)
    }
}

/// Column names used by the remote order service.
pub mod fields {
    /// Tracking identifier column.
    pub const TRACKING_NUMBER: &str = "Tracking Number";
    /// Customer name column.
    pub const FULL_NAME: &str = "Full Name";
    /// Customer email column.
    pub const EMAIL: &str = "Email";
    /// Customer phone column.
    pub const PHONE: &str = "Phone";
    /// Pickup address column.
    pub const PICKUP_ADDRESS: &str = "Address";
    /// Dropoff address column.
    pub const DROPOFF_ADDRESS: &str = "Dropoff";
    /// Package description column.
    pub const PACKAGE_DESCRIPTION: &str = "Package Description";
    /// Status column.
    pub const STATUS: &str = "Orderstatus";
    /// Courier latitude column.
    pub const LATITUDE: &str = "latitude";
    /// Courier longitude column.
    pub const LONGITUDE: &str = "longitude";
    /// Last update timestamp column.
    pub const TIMESTAMP: &str = "Timestamp";
    /// Scheduled delivery date column.
    pub const DELIVERY_DATE: &str = "Delivery Date";
    /// Scheduled delivery time column.
    pub const DELIVERY_TIME: &str = "Delivery Time";
    /// Envelope field used by the service for outcomes such as `not_found`.
    pub const RESPONSE_STATUS: &str = "status";
}

/// One raw order row as returned by the remote order service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderRecord {
    fields: Map<String, Value>,
}

impl OrderRecord {
    /// Wraps a JSON value, returning `None` if it is not an object.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Returns a field as trimmed text.
    ///
    /// Spreadsheet cells come back as strings, numbers or booleans depending
    /// on the column format, so all three are accepted. Blank text is
    /// treated as absent.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<String> {
        let text = match self.fields.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    }

    /// Returns a field parsed as a float, accepting numbers and numeric text.
    #[must_use]
    pub fn number(&self, field: &str) -> Option<f64> {
        match self.fields.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether this response means the order does not exist.
    ///
    /// The service signals this either with an explicit
    /// `{"status": "not_found"}` envelope or by omitting the tracking number.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.text(fields::RESPONSE_STATUS).as_deref() == Some("not_found")
            || self.text(fields::TRACKING_NUMBER).is_none()
    }

    /// The courier position, if both coordinates are present and valid.
    #[must_use]
    pub fn courier_location(&self) -> Option<Coordinate> {
        Coordinate::new(
            self.number(fields::LATITUDE)?,
            self.number(fields::LONGITUDE)?,
        )
    }

    /// The row's `Timestamp` column parsed as RFC 3339.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.text(fields::TIMESTAMP)?;
        DateTime::parse_from_rfc3339(&raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// The normalized result of one successful order read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    /// Tracking identifier the order was looked up by.
    pub tracking_id: String,
    /// Customer name.
    pub full_name: String,
    /// Customer email.
    pub email: String,
    /// Customer phone.
    pub phone: String,
    /// Free-text pickup address.
    pub pickup_address: String,
    /// Free-text dropoff address.
    pub dropoff_address: String,
    /// What is being delivered.
    pub package_description: String,
    /// Parsed status.
    pub status: OrderStatus,
    /// Status text as shown to the customer.
    pub status_label: String,
    /// Last reported courier position.
    pub courier_location: Option<Coordinate>,
    /// When the order row last changed.
    pub last_updated: DateTime<Utc>,
    /// Scheduled delivery date, if set.
    pub delivery_date: Option<String>,
    /// Scheduled delivery time, if set.
    pub delivery_time: Option<String>,
}

impl OrderSnapshot {
    /// Normalizes a raw row into a snapshot.
    ///
    /// `fetched_at` stands in for `last_updated` when the row carries no
    /// parseable timestamp.
    #[must_use]
    pub fn from_record(tracking_id: &str, record: &OrderRecord, fetched_at: DateTime<Utc>) -> Self {
        let raw_status = record.text(fields::STATUS).unwrap_or_default();
        let status = OrderStatus::from_label(&raw_status);
        let status_label = if raw_status.is_empty() {
            status.to_string()
        } else {
            raw_status
        };

        Self {
            tracking_id: tracking_id.trim().to_string(),
            full_name: record.text(fields::FULL_NAME).unwrap_or_default(),
            email: record.text(fields::EMAIL).unwrap_or_default(),
            phone: record.text(fields::PHONE).unwrap_or_default(),
            pickup_address: record.text(fields::PICKUP_ADDRESS).unwrap_or_default(),
            dropoff_address: record.text(fields::DROPOFF_ADDRESS).unwrap_or_default(),
            package_description: record
                .text(fields::PACKAGE_DESCRIPTION)
                .unwrap_or_default(),
            status,
            status_label,
            courier_location: record.courier_location(),
            last_updated: record.timestamp().unwrap_or(fetched_at),
            delivery_date: record.text(fields::DELIVERY_DATE),
            delivery_time: record.text(fields::DELIVERY_TIME),
        }
    }

    /// Presentation category of the current status.
    #[must_use]
    pub const fn status_category(&self) -> StatusCategory {
        StatusCategory::for_status(self.status)
    }
}

/// Parameters for creating a new order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer name.
    pub full_name: String,
    /// Customer email.
    pub email: String,
    /// Pickup address.
    pub pickup_address: String,
    /// Dropoff address.
    #[serde(default)]
    pub dropoff_address: String,
    /// Customer phone.
    pub phone: String,
    /// Package description.
    #[serde(default)]
    pub description: String,
}

/// A courier's status and/or position update for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    /// Order being updated.
    pub tracking_id: String,
    /// New status label, if changing.
    pub status: Option<String>,
    /// New courier position, if reporting one.
    pub location: Option<Coordinate>,
}

/// Outcome reported by the order service for an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// The row was updated.
    Updated,
    /// No row has that tracking identifier.
    NotFound,
    /// The service answered with some other status.
    Rejected {
        /// The status text the service returned.
        reason: String,
    },
}
