//! Keeps a [`MapRenderer`] in step with a [`TrackingController`].

use std::sync::Arc;

use courier_track_order_models::Theme;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::{MapRenderer, TrackingController};

/// Handle to a running binding. Dropping it stops the binding.
#[derive(Debug)]
pub struct MapBinding {
    task: JoinHandle<()>,
}

impl MapBinding {
    /// Whether the binding has stopped (the controller was dropped).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for MapBinding {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Re-syncs `renderer` whenever the controller's snapshot or the theme
/// changes, and clears it whenever no snapshot is held.
///
/// A change that arrives while a sync is running cancels that sync.
#[must_use]
pub fn bind(
    controller: &TrackingController,
    renderer: Arc<MapRenderer>,
    mut theme: watch::Receiver<Theme>,
) -> MapBinding {
    let mut state = controller.subscribe();

    let task = tokio::spawn(async move {
        let mut rendered: Option<(u64, Theme)> = None;
        let mut in_flight: Option<JoinHandle<()>> = None;
        let mut theme_open = true;

        loop {
            let (revision, snapshot) = {
                let current = state.borrow_and_update();
                (current.revision, current.snapshot.clone())
            };
            let current_theme = *theme.borrow_and_update();

            if rendered != Some((revision, current_theme)) {
                rendered = Some((revision, current_theme));
                if let Some(handle) = in_flight.take() {
                    handle.abort();
                }

                if let Some(snapshot) = snapshot {
                    let renderer = renderer.clone();
                    in_flight = Some(tokio::spawn(async move {
                        let report = renderer.sync(&snapshot, current_theme).await;
                        log::debug!(
                            "Map synced for {}: pickup={:?} dropoff={:?} route={:?}",
                            snapshot.tracking_id,
                            report.pickup,
                            report.dropoff,
                            report.route
                        );
                    }));
                } else {
                    renderer.clear();
                }
            }

            tokio::select! {
                changed = state.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = theme.changed(), if theme_open => {
                    if changed.is_err() {
                        theme_open = false;
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            handle.abort();
        }
    });

    MapBinding { task }
}
