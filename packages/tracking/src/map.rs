//! Map overlays for a tracking view.
//!
//! [`MapRenderer::sync`] rebuilds the overlays from a snapshot: a courier
//! marker from the reported position, pickup and dropoff markers from
//! geocoded addresses, and a driving route once both endpoints are known.
//! Geocoding and routing failures never reach the user; they are recorded
//! in the returned [`SyncReport`].

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use courier_track_geocoder::{Geocoder, RoutePlanner, RouteRequest};
use courier_track_order_models::{Coordinate, OrderSnapshot, Theme};
use futures::StreamExt as _;
use futures::stream::FuturesUnordered;
use serde::Serialize;

/// Stroke weight of the route line.
pub const ROUTE_WEIGHT: u8 = 5;

/// Route line color for `theme`.
#[must_use]
pub const fn route_color(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "#2563eb",
        Theme::Dark => "#6366f1",
    }
}

/// Kind of map marker. At most one of each is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// Where the package is collected.
    Pickup,
    /// Where the package is delivered.
    Dropoff,
    /// Last reported courier position.
    Courier,
}

impl MarkerKind {
    /// Hover title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pickup => "Pickup",
            Self::Dropoff => "Dropoff",
            Self::Courier => "Courier",
        }
    }

    /// Marker glyph.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Pickup => "📍",
            Self::Dropoff => "🏠",
            Self::Courier => "🚚",
        }
    }
}

/// A placed marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Marker kind.
    pub kind: MarkerKind,
    /// Where it is placed.
    pub position: Coordinate,
    /// Hover title.
    pub title: &'static str,
    /// Glyph shown on the map.
    pub icon: &'static str,
}

impl Marker {
    const fn new(kind: MarkerKind, position: Coordinate) -> Self {
        Self {
            kind,
            position,
            title: kind.title(),
            icon: kind.icon(),
        }
    }
}

/// A drawn driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOverlay {
    /// Polyline.
    pub path: Vec<Coordinate>,
    /// Stroke color (`#rrggbb`).
    pub color: &'static str,
    /// Stroke weight.
    pub weight: u8,
    /// Total length in meters.
    pub distance_meters: f64,
    /// Expected travel time in seconds.
    pub duration_seconds: f64,
}

/// Everything currently drawn on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOverlayState {
    /// Placed markers by kind.
    pub markers: BTreeMap<MarkerKind, Marker>,
    /// The route, once both endpoints are resolved.
    pub route: Option<RouteOverlay>,
}

impl MapOverlayState {
    /// Marker of `kind`, if placed.
    #[must_use]
    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.get(&kind)
    }

    /// Whether nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.route.is_none()
    }
}

/// What happened to one address during a sync.
#[derive(Debug, Clone, PartialEq)]
pub enum AddressResolution {
    /// Geocoded and marked.
    Resolved(Coordinate),
    /// Geocoding failed or found nothing.
    Unresolved(String),
    /// Address was blank, or the position came straight from the order.
    Skipped,
}

impl AddressResolution {
    /// The resolved position, if any.
    #[must_use]
    pub const fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Self::Resolved(c) => Some(*c),
            Self::Unresolved(_) | Self::Skipped => None,
        }
    }
}

/// What happened to the route during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Route drawn.
    Drawn,
    /// The route service found no route between the stops.
    Unavailable,
    /// The route service failed.
    Failed(String),
    /// Not requested: an endpoint is unresolved or no route service is
    /// configured.
    NotAttempted,
}

/// Result of one [`MapRenderer::sync`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncReport {
    /// Pickup address outcome.
    pub pickup: AddressResolution,
    /// Dropoff address outcome.
    pub dropoff: AddressResolution,
    /// Courier marker position, if one was placed.
    pub courier: Option<Coordinate>,
    /// Route outcome.
    pub route: RouteOutcome,
    /// The route request that was issued, if any.
    pub route_request: Option<RouteRequest>,
    /// A newer sync or a clear started before this one finished; overlays
    /// from this sync may be partial.
    pub superseded: bool,
}

impl SyncReport {
    const fn new(courier: Option<Coordinate>) -> Self {
        Self {
            pickup: AddressResolution::Skipped,
            dropoff: AddressResolution::Skipped,
            courier,
            route: RouteOutcome::NotAttempted,
            route_request: None,
            superseded: false,
        }
    }

    fn set(&mut self, kind: MarkerKind, resolution: AddressResolution) {
        match kind {
            MarkerKind::Pickup => self.pickup = resolution,
            MarkerKind::Dropoff => self.dropoff = resolution,
            MarkerKind::Courier => {}
        }
    }
}

/// Draws a snapshot's markers and route.
///
/// All overlay mutation goes through a generation check, so an older sync
/// that is still waiting on the network cannot draw over a newer one.
pub struct MapRenderer {
    geocoder: Arc<dyn Geocoder>,
    router: Option<Arc<dyn RoutePlanner>>,
    overlays: Mutex<MapOverlayState>,
    generation: AtomicU64,
}

impl MapRenderer {
    /// Creates a renderer. Without a router no route is ever drawn.
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, router: Option<Arc<dyn RoutePlanner>>) -> Self {
        Self {
            geocoder,
            router,
            overlays: Mutex::new(MapOverlayState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// A copy of what is drawn.
    #[must_use]
    pub fn overlays(&self) -> MapOverlayState {
        self.overlays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes every overlay and invalidates any sync in flight.
    pub fn clear(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update(generation, |overlays| *overlays = MapOverlayState::default());
    }

    /// Rebuilds the overlays for `snapshot`.
    ///
    /// Calling it twice with the same snapshot leaves the same overlays.
    pub async fn sync(&self, snapshot: &OrderSnapshot, theme: Theme) -> SyncReport {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let courier = snapshot.courier_location;
        let mut report = SyncReport::new(courier);

        let current = self.update(generation, |overlays| {
            *overlays = MapOverlayState::default();
            if let Some(position) = courier {
                overlays
                    .markers
                    .insert(MarkerKind::Courier, Marker::new(MarkerKind::Courier, position));
            }
        });
        if !current {
            report.superseded = true;
            return report;
        }

        let geocoder = &self.geocoder;
        let mut pending = FuturesUnordered::new();
        for (kind, address) in [
            (MarkerKind::Pickup, snapshot.pickup_address.trim()),
            (MarkerKind::Dropoff, snapshot.dropoff_address.trim()),
        ] {
            if address.is_empty() {
                continue;
            }
            pending.push(async move { (kind, address, geocoder.geocode(address).await) });
        }

        let mut pickup = None;
        let mut dropoff = None;

        while let Some((kind, address, result)) = pending.next().await {
            let resolution = match result {
                Ok(Some(found)) => AddressResolution::Resolved(found.coordinate),
                Ok(None) => {
                    log::debug!("No geocoding match for {} address '{address}'", kind.title());
                    AddressResolution::Unresolved("no match".to_string())
                }
                Err(e) => {
                    log::warn!("Failed to geocode {} address '{address}': {e}", kind.title());
                    AddressResolution::Unresolved(e.to_string())
                }
            };

            if let AddressResolution::Resolved(position) = resolution {
                let placed = self.update(generation, |overlays| {
                    overlays.markers.insert(kind, Marker::new(kind, position));
                });
                if !placed {
                    report.set(kind, resolution);
                    report.superseded = true;
                    return report;
                }
                match kind {
                    MarkerKind::Pickup => pickup = Some(position),
                    MarkerKind::Dropoff => dropoff = Some(position),
                    MarkerKind::Courier => {}
                }
            }
            report.set(kind, resolution);

            if let (Some(origin), Some(destination)) = (pickup, dropoff) {
                let request = RouteRequest {
                    origin,
                    destination,
                    waypoints: courier.into_iter().collect(),
                };
                match self.draw_route(generation, &request, theme).await {
                    Some(outcome) => report.route = outcome,
                    None => report.superseded = true,
                }
                report.route_request = Some(request);
            }
        }

        report
    }

    /// Requests and draws the route. Returns `None` if superseded.
    async fn draw_route(
        &self,
        generation: u64,
        request: &RouteRequest,
        theme: Theme,
    ) -> Option<RouteOutcome> {
        let Some(router) = &self.router else {
            log::debug!("No route service configured");
            return Some(RouteOutcome::NotAttempted);
        };

        match router.route(request).await {
            Ok(Some(path)) => {
                let overlay = RouteOverlay {
                    path: path.points,
                    color: route_color(theme),
                    weight: ROUTE_WEIGHT,
                    distance_meters: path.distance_meters,
                    duration_seconds: path.duration_seconds,
                };
                self.update(generation, |overlays| overlays.route = Some(overlay))
                    .then_some(RouteOutcome::Drawn)
            }
            Ok(None) => {
                log::debug!("No driving route between pickup and dropoff");
                Some(RouteOutcome::Unavailable)
            }
            Err(e) => {
                log::warn!("Route request failed: {e}");
                Some(RouteOutcome::Failed(e.to_string()))
            }
        }
    }

    /// Applies `f` if `generation` is still current. Returns whether it was
    /// applied.
    fn update(&self, generation: u64, f: impl FnOnce(&mut MapOverlayState)) -> bool {
        let mut overlays = self
            .overlays
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        f(&mut overlays);
        true
    }
}
