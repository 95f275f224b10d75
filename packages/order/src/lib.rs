#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the remote order service.
//!
//! Orders live in a spreadsheet behind a web-app script. Every operation is
//! a `GET` against one endpoint, selected by query string:
//!
//! - `?trackingId=<id>` reads an order row;
//! - `?action=createOrder&...` appends a row and mints a tracking id;
//! - `?action=updateOrder&...` changes the status and courier position.
//!
//! [`OrderService`] is the seam the tracking view and the proxy server
//! depend on; [`apps_script::AppsScriptClient`] is the HTTP implementation.

pub mod apps_script;

use courier_track_order_models::{NewOrder, OrderRecord, OrderUpdate, UpdateOutcome};
use thiserror::Error;

pub use apps_script::AppsScriptClient;

/// Errors from order service calls.
#[derive(Debug, Error)]
pub enum OrderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success HTTP status.
    #[error("Order service returned status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The service refused the request.
    #[error("Order service rejected the request: {message}")]
    Rejected {
        /// Message the service gave, if any.
        message: String,
    },
}

/// Read and write access to orders.
#[async_trait::async_trait]
pub trait OrderService: Send + Sync {
    /// Reads one order row.
    ///
    /// Returns `Ok(None)` when the service reports the tracking id as
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] if the request fails or the response cannot be
    /// parsed.
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<OrderRecord>, OrderError>;

    /// Creates an order and returns its tracking id.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Rejected`] if the service declines the order,
    /// or another [`OrderError`] if the request fails.
    async fn create_order(&self, order: &NewOrder) -> Result<String, OrderError>;

    /// Applies a courier update.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError`] if the request fails or the response cannot be
    /// parsed.
    async fn update_order(&self, update: &OrderUpdate) -> Result<UpdateOutcome, OrderError>;
}
