#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Order tracking view: lookup, live refresh, and map overlays.
//!
//! - [`controller::TrackingController`] owns the lookup/refresh lifecycle.
//!   A successful lookup starts a background task that re-reads the order
//!   every refresh interval for as long as a snapshot is held.
//! - [`map::MapRenderer`] turns a snapshot into markers and a driving route,
//!   geocoding the pickup and dropoff addresses on demand.
//! - [`binding::bind`] keeps a renderer in step with a controller.
//! - [`page::TrackingPage`] is the rendered view model.

pub mod binding;
pub mod controller;
pub mod map;
pub mod page;

use courier_track_order::OrderError;
use thiserror::Error;

pub use binding::{MapBinding, bind};
pub use controller::{TrackingController, TrackingPhase, TrackingState, Viewport};
pub use map::{AddressResolution, MapOverlayState, MapRenderer, MarkerKind, RouteOutcome, SyncReport};
pub use page::TrackingPage;

/// Errors from a tracking lookup.
#[derive(Debug, Error)]
pub enum TrackingError {
    /// The tracking id was blank; no request was made.
    #[error("Tracking ID is empty")]
    EmptyInput,

    /// The order service has no order with this id.
    #[error("Tracking ID {tracking_id} not found")]
    NotFound {
        /// The id that was looked up.
        tracking_id: String,
    },

    /// The order service could not be reached or answered badly.
    #[error("Error fetching tracking data: {0}")]
    Transport(#[from] OrderError),

    /// A newer lookup started before this one finished; its result was
    /// discarded.
    #[error("Lookup superseded by a newer request")]
    Superseded,
}

impl TrackingError {
    /// Whether the view shows this error to the user.
    #[must_use]
    pub const fn is_user_visible(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Transport(_))
    }
}
