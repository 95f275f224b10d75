//! `create` and `update`: direct order service operations.

use courier_track_config::AppConfig;
use courier_track_order::{AppsScriptClient, OrderService as _};
use courier_track_order_models::{
    Coordinate, NewOrder, OrderStatus, OrderUpdate, UpdateOutcome,
};
use dialoguer::{Confirm, Input, Select};

fn client(config: &AppConfig) -> Result<AppsScriptClient, Box<dyn std::error::Error>> {
    let http = courier_track_server::http_client()?;
    Ok(AppsScriptClient::new(http, config.endpoint.clone()))
}

fn required(prompt: &str) -> Result<String, dialoguer::Error> {
    Input::<String>::new().with_prompt(prompt).interact_text()
}

fn optional(prompt: &str) -> Result<String, dialoguer::Error> {
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
}

/// Prompts for a new order and creates it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the order service refuses or
/// cannot be reached.
pub async fn create(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let order = NewOrder {
        full_name: required("Full name")?,
        email: required("Email")?,
        pickup_address: required("Pickup address")?,
        dropoff_address: optional("Dropoff address")?,
        phone: required("Phone")?,
        description: optional("Package description")?,
    };

    let tracking_id = client(config)?.create_order(&order).await?;
    println!("Order created. Tracking ID: {tracking_id}");
    Ok(())
}

/// Sends one courier update.
///
/// # Errors
///
/// Returns an error if the position is out of range, the order service
/// cannot be reached, or it does not accept the update.
pub async fn update(
    config: &AppConfig,
    id: &str,
    status: Option<String>,
    position: Option<(f64, f64)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let location = match position {
        Some((lat, lng)) => {
            Some(Coordinate::new(lat, lng).ok_or("Latitude/longitude out of range")?)
        }
        None => None,
    };
    if let Some(label) = &status
        && OrderStatus::from_label(label) == OrderStatus::Unrecognized
    {
        log::warn!("'{label}' is not a known status; sending it anyway");
    }

    let update = OrderUpdate {
        tracking_id: id.trim().to_string(),
        status,
        location,
    };

    match client(config)?.update_order(&update).await? {
        UpdateOutcome::Updated => {
            println!("Order {} updated.", update.tracking_id);
            Ok(())
        }
        UpdateOutcome::NotFound => Err(format!("Tracking ID {} not found.", update.tracking_id).into()),
        UpdateOutcome::Rejected { reason } => {
            Err(format!("Order service rejected the update: {reason}").into())
        }
    }
}

/// Prompts for a courier update and sends it.
///
/// # Errors
///
/// Returns an error if a prompt fails or [`update`] fails.
pub async fn update_interactive(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let id = required("Tracking ID")?;

    let labels: Vec<String> = OrderStatus::SETTABLE.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("New status")
        .items(&labels)
        .default(0)
        .interact()?;

    let position = if Confirm::new()
        .with_prompt("Include courier position?")
        .default(false)
        .interact()?
    {
        let lat = Input::<f64>::new().with_prompt("Latitude").interact_text()?;
        let lng = Input::<f64>::new().with_prompt("Longitude").interact_text()?;
        Some((lat, lng))
    } else {
        None
    };

    update(config, &id, Some(labels[idx].clone()), position).await
}
