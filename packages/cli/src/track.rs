//! `track`: look up an order and print the page on every refresh.

use courier_track_config::AppConfig;
use courier_track_order_models::Theme;
use courier_track_tracking::{
    MapOverlayState, MapRenderer, TrackingController, TrackingError, TrackingPage, TrackingPhase,
};
use dialoguer::Input;

/// Runs the `track` command.
///
/// Stays attached until the order is no longer held (not found, or a
/// refresh failed) or Ctrl-C.
///
/// # Errors
///
/// Returns an error if the prompt fails, the HTTP client cannot be built,
/// or the tracking id is blank.
pub async fn run(
    config: &AppConfig,
    id: Option<String>,
    theme: Theme,
) -> Result<(), Box<dyn std::error::Error>> {
    let id = match id {
        Some(id) => id,
        None => Input::<String>::new()
            .with_prompt("Tracking ID")
            .interact_text()?,
    };

    let state = courier_track_server::build_state(config)?;
    let controller = TrackingController::new(state.orders.clone(), state.refresh_interval);
    let renderer = MapRenderer::new(state.geocoder.clone(), state.router.clone());
    let mut updates = controller.subscribe();

    match controller.lookup(&id).await {
        Err(TrackingError::EmptyInput) => return Err(TrackingError::EmptyInput.into()),
        Err(e) => log::debug!("Lookup of {id} failed: {e}"),
        Ok(_) => log::info!(
            "Following {id}; refreshing every {}s",
            state.refresh_interval.as_secs()
        ),
    }

    let mut printed = None;

    loop {
        let current = updates.borrow_and_update().clone();

        if current.phase != TrackingPhase::Loading && printed != Some(current.revision) {
            printed = Some(current.revision);

            let overlays = if let Some(snapshot) = &current.snapshot {
                renderer.sync(snapshot, theme).await;
                renderer.overlays()
            } else {
                renderer.clear();
                MapOverlayState::default()
            };
            println!("{}", TrackingPage::new(&current, overlays, theme));

            if current.snapshot.is_none() {
                break;
            }
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                break;
            }
        }
    }

    Ok(())
}
