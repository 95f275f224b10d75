//! Lookup and live-refresh lifecycle for one tracking view.
//!
//! ```text
//! Idle ──lookup──▶ Loading ──▶ Tracking ──tick──▶ Loading ──▶ Tracking
//!                     │                              │
//!                     └──▶ NotFound / Error ◀────────┘
//! ```
//!
//! `NotFound` and `Error` are not terminal: a new manual lookup re-enters
//! `Loading`. Every state change is published on a watch channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use courier_track_order::OrderService;
use courier_track_order_models::{Coordinate, OrderSnapshot};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::TrackingError;

/// Message shown when the order service does not know the id.
pub const NOT_FOUND_MESSAGE: &str = "Tracking ID not found.";

/// Message shown when the order service could not be read.
pub const TRANSPORT_ERROR_MESSAGE: &str = "Error fetching tracking data.";

/// Where the view is in the lookup lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackingPhase {
    /// No lookup yet.
    Idle,
    /// A read is in flight.
    Loading,
    /// A snapshot is held and being refreshed.
    Tracking,
    /// The last read found no such order.
    NotFound,
    /// The last read failed.
    Error,
}

/// Map center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    /// Map center.
    pub center: Coordinate,
    /// Zoom level.
    pub zoom: u8,
}

impl Viewport {
    /// Whole continental US.
    pub const DEFAULT: Self = Self {
        center: Coordinate {
            latitude: 37.0902,
            longitude: -95.7129,
        },
        zoom: 5,
    };
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything presentation needs to know about the view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingState {
    /// Lifecycle phase.
    pub phase: TrackingPhase,
    /// Id of the current or last lookup.
    pub tracking_id: Option<String>,
    /// The held order, if any.
    pub snapshot: Option<OrderSnapshot>,
    /// User-visible error, if the last lookup failed.
    pub error: Option<String>,
    /// Current map viewport.
    pub viewport: Viewport,
    /// Bumped every time `snapshot` is replaced or cleared.
    pub revision: u64,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self {
            phase: TrackingPhase::Idle,
            tracking_id: None,
            snapshot: None,
            error: None,
            viewport: Viewport::DEFAULT,
            revision: 0,
        }
    }
}

struct Inner {
    service: Arc<dyn OrderService>,
    refresh_interval: Duration,
    state: watch::Sender<TrackingState>,
    /// Sequence number of the newest read issued.
    latest_request: AtomicU64,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Inner {
    fn take_poller(&self) -> Option<JoinHandle<()>> {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.take_poller() {
            handle.abort();
        }
    }
}

/// Owns the lookup and refresh lifecycle of one tracking view.
///
/// Cloning is cheap and clones share state. The refresh task stops when
/// the last clone is dropped.
#[derive(Clone)]
pub struct TrackingController {
    inner: Arc<Inner>,
}

impl TrackingController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(service: Arc<dyn OrderService>, refresh_interval: Duration) -> Self {
        let (state, _) = watch::channel(TrackingState::default());
        Self {
            inner: Arc::new(Inner {
                service,
                refresh_interval,
                state,
                latest_request: AtomicU64::new(0),
                poller: Mutex::new(None),
            }),
        }
    }

    /// A copy of the current state.
    #[must_use]
    pub fn state(&self) -> TrackingState {
        self.inner.state.borrow().clone()
    }

    /// The held snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<OrderSnapshot> {
        self.inner.state.borrow().snapshot.clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TrackingState> {
        self.inner.state.subscribe()
    }

    /// Whether the refresh task is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Looks up `id` and, on success, (re)starts the refresh task.
    ///
    /// # Errors
    ///
    /// - [`TrackingError::EmptyInput`] if `id` is blank; state is untouched
    ///   and no request is made.
    /// - [`TrackingError::NotFound`] if the order does not exist; the
    ///   snapshot is cleared and the viewport reset.
    /// - [`TrackingError::Transport`] if the read failed; the snapshot is
    ///   cleared. Not retried.
    /// - [`TrackingError::Superseded`] if a newer lookup started meanwhile.
    pub async fn lookup(&self, id: &str) -> Result<OrderSnapshot, TrackingError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(TrackingError::EmptyInput);
        }

        let snapshot = self.fetch(id).await?;
        self.start_polling();
        Ok(snapshot)
    }

    /// Re-reads the held order once, without re-arming the refresh task.
    ///
    /// Does nothing and returns `Ok(None)` when no snapshot is held or a
    /// read is already in flight.
    ///
    /// # Errors
    ///
    /// Same as [`Self::lookup`], minus [`TrackingError::EmptyInput`].
    pub async fn refresh_tick(&self) -> Result<Option<OrderSnapshot>, TrackingError> {
        let id = {
            let state = self.inner.state.borrow();
            if state.phase == TrackingPhase::Loading {
                return Ok(None);
            }
            match &state.snapshot {
                Some(snapshot) => snapshot.tracking_id.clone(),
                None => return Ok(None),
            }
        };

        log::debug!("Refreshing order {id}");
        self.fetch(&id).await.map(Some)
    }

    fn holds_snapshot(&self) -> bool {
        self.inner.state.borrow().snapshot.is_some()
    }

    async fn fetch(&self, id: &str) -> Result<OrderSnapshot, TrackingError> {
        let seq = self.inner.latest_request.fetch_add(1, Ordering::SeqCst) + 1;

        self.inner.state.send_modify(|state| {
            state.phase = TrackingPhase::Loading;
            state.tracking_id = Some(id.to_string());
            state.error = None;
        });

        let outcome = self.inner.service.fetch_order(id).await;

        match outcome {
            Ok(Some(record)) => {
                let snapshot = OrderSnapshot::from_record(id, &record, Utc::now());
                let applied = self.apply(seq, |state| {
                    state.phase = TrackingPhase::Tracking;
                    state.snapshot = Some(snapshot.clone());
                    state.revision += 1;
                });
                if !applied {
                    return Err(TrackingError::Superseded);
                }
                log::debug!("Order {id} is {}", snapshot.status_label);
                Ok(snapshot)
            }
            Ok(None) => {
                let applied = self.apply(seq, |state| {
                    state.phase = TrackingPhase::NotFound;
                    state.snapshot = None;
                    state.error = Some(NOT_FOUND_MESSAGE.to_string());
                    state.viewport = Viewport::DEFAULT;
                    state.revision += 1;
                });
                if !applied {
                    return Err(TrackingError::Superseded);
                }
                log::info!("Tracking ID {id} not found");
                self.stop_polling();
                Err(TrackingError::NotFound {
                    tracking_id: id.to_string(),
                })
            }
            Err(e) => {
                let applied = self.apply(seq, |state| {
                    state.phase = TrackingPhase::Error;
                    state.snapshot = None;
                    state.error = Some(TRANSPORT_ERROR_MESSAGE.to_string());
                    state.revision += 1;
                });
                if !applied {
                    return Err(TrackingError::Superseded);
                }
                log::warn!("Failed to fetch order {id}: {e}");
                self.stop_polling();
                Err(TrackingError::Transport(e))
            }
        }
    }

    /// Applies `update` if `seq` is still the newest read. Returns whether
    /// it was applied.
    fn apply(&self, seq: u64, update: impl FnOnce(&mut TrackingState)) -> bool {
        self.inner.state.send_if_modified(|state| {
            if self.inner.latest_request.load(Ordering::SeqCst) != seq {
                log::debug!("Dropping stale response #{seq}");
                return false;
            }
            update(state);
            true
        })
    }

    fn start_polling(&self) {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = self.inner.refresh_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let controller = Self { inner };

                if !controller.holds_snapshot() {
                    log::debug!("No order held; refresh stopped");
                    break;
                }

                match controller.refresh_tick().await {
                    Ok(_) | Err(TrackingError::Superseded) => {}
                    Err(e) => {
                        log::debug!("Refresh stopped: {e}");
                        break;
                    }
                }
            }
        });

        let previous = self
            .inner
            .poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn stop_polling(&self) {
        if let Some(handle) = self.inner.take_poller() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle_over_default_region() {
        let state = TrackingState::default();
        assert_eq!(state.phase, TrackingPhase::Idle);
        assert!(state.snapshot.is_none());
        assert_eq!(state.viewport.zoom, 5);
        assert!((state.viewport.center.latitude - 37.0902).abs() < 1e-9);
    }

    #[test]
    fn phase_serializes_camel_case() {
        assert_eq!(
            serde_json::to_value(TrackingPhase::NotFound).unwrap(),
            serde_json::json!("notFound")
        );
    }
}
