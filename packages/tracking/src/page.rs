//! The tracking page view model.

use std::fmt;

use courier_track_order_models::{BadgePalette, OrderSnapshot, StatusCategory, Theme};
use serde::Serialize;

use crate::{MapOverlayState, TrackingPhase, TrackingState, Viewport};

/// Shown for unset delivery fields.
pub const PLACEHOLDER: &str = "—";

/// One labeled line of order details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    /// Row label.
    pub label: &'static str,
    /// Display value.
    pub value: String,
}

/// The status pill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// Status text.
    pub label: String,
    /// Presentation category.
    pub category: StatusCategory,
    /// Colors for the current theme.
    pub palette: BadgePalette,
}

/// Everything needed to draw the tracking page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPage {
    /// Lifecycle phase.
    pub phase: TrackingPhase,
    /// Id of the current or last lookup.
    pub tracking_id: Option<String>,
    /// User-visible error message.
    pub error: Option<String>,
    /// Map viewport.
    pub viewport: Viewport,
    /// Order details, empty when no order is held.
    pub details: Vec<DetailRow>,
    /// Status pill, when an order is held.
    pub status: Option<StatusBadge>,
    /// Map overlays.
    pub overlays: MapOverlayState,
    /// Theme the page was rendered for.
    pub theme: Theme,
}

impl TrackingPage {
    /// Renders `state` with the given overlays.
    #[must_use]
    pub fn new(state: &TrackingState, overlays: MapOverlayState, theme: Theme) -> Self {
        let (details, status) = state.snapshot.as_ref().map_or_else(
            || (Vec::new(), None),
            |snapshot| (detail_rows(snapshot), Some(status_badge(snapshot, theme))),
        );

        Self {
            phase: state.phase,
            tracking_id: state.tracking_id.clone(),
            error: state.error.clone(),
            viewport: state.viewport,
            details,
            status,
            overlays,
            theme,
        }
    }

    /// Value of the detail row labeled `label`.
    #[must_use]
    pub fn detail(&self, label: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

fn detail_rows(snapshot: &OrderSnapshot) -> Vec<DetailRow> {
    let row = |label, value: &str| DetailRow {
        label,
        value: value.to_string(),
    };

    vec![
        row("Tracking ID", &snapshot.tracking_id),
        row("Name", &snapshot.full_name),
        row("Email", &snapshot.email),
        row("Phone", &snapshot.phone),
        row("Pickup Address", &snapshot.pickup_address),
        row("Dropoff Address", &snapshot.dropoff_address),
        row("Package Description", &snapshot.package_description),
        row("Status", &snapshot.status_label),
        row(
            "Delivery Date",
            snapshot.delivery_date.as_deref().unwrap_or(PLACEHOLDER),
        ),
        row(
            "Delivery Time",
            snapshot.delivery_time.as_deref().unwrap_or(PLACEHOLDER),
        ),
        row(
            "Last Updated",
            &snapshot
                .last_updated
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
        ),
    ]
}

fn status_badge(snapshot: &OrderSnapshot, theme: Theme) -> StatusBadge {
    let category = snapshot.status_category();
    StatusBadge {
        label: snapshot.status_label.clone(),
        category,
        palette: category.palette(theme),
    }
}

impl fmt::Display for TrackingPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📦 Track Your Package")?;

        if self.phase == TrackingPhase::Loading && self.details.is_empty() {
            writeln!(f, "Searching...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "{error}")?;
        }
        if self.details.is_empty() {
            return Ok(());
        }

        let width = self
            .details
            .iter()
            .map(|row| row.label.chars().count())
            .max()
            .unwrap_or(0);
        for row in &self.details {
            match (&self.status, row.label) {
                (Some(badge), "Status") => {
                    writeln!(f, "{:<width$}  [{}] ({})", row.label, row.value, badge.category)?;
                }
                _ => writeln!(f, "{:<width$}  {}", row.label, row.value)?,
            }
        }

        for marker in self.overlays.markers.values() {
            writeln!(
                f,
                "{} {:<8} {:.5}, {:.5}",
                marker.icon, marker.title, marker.position.latitude, marker.position.longitude
            )?;
        }
        if let Some(route) = &self.overlays.route {
            writeln!(
                f,
                "Route: {:.1} km, about {} min",
                route.distance_meters / 1000.0,
                (route.duration_seconds / 60.0).round()
            )?;
        }
        Ok(())
    }
}
