//! HTTP client for the spreadsheet web-app script.
//!
//! The script answers every request with `200 OK` and a JSON body; outcomes
//! such as "not found" are carried in a `status` field of that body.

use courier_track_order_models::{NewOrder, OrderRecord, OrderUpdate, UpdateOutcome};

use crate::{OrderError, OrderService};

/// [`OrderService`] backed by the web-app script endpoint.
#[derive(Debug, Clone)]
pub struct AppsScriptClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AppsScriptClient {
    /// Creates a client for `endpoint` (the script's `/exec` URL).
    #[must_use]
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn get_json(&self, query: &[(&str, String)]) -> Result<serde_json::Value, OrderError> {
        let resp = self.client.get(&self.endpoint).query(query).send().await?;

        if !resp.status().is_success() {
            return Err(OrderError::Status {
                status: resp.status().as_u16(),
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| OrderError::Parse {
            message: format!("Order service response is not JSON: {e}"),
        })
    }
}

#[async_trait::async_trait]
impl OrderService for AppsScriptClient {
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<OrderRecord>, OrderError> {
        log::debug!("Fetching order {tracking_id}");
        let body = self
            .get_json(&[("trackingId", tracking_id.to_string())])
            .await?;
        parse_order(body)
    }

    async fn create_order(&self, order: &NewOrder) -> Result<String, OrderError> {
        log::debug!("Creating order for {}", order.email);
        let body = self.get_json(&create_query(order)).await?;
        parse_created(&body)
    }

    async fn update_order(&self, update: &OrderUpdate) -> Result<UpdateOutcome, OrderError> {
        log::debug!("Updating order {}", update.tracking_id);
        let body = self.get_json(&update_query(update)).await?;
        parse_update(&body)
    }
}

fn create_query(order: &NewOrder) -> Vec<(&'static str, String)> {
    vec![
        ("action", "createOrder".to_string()),
        ("fullName", order.full_name.clone()),
        ("email", order.email.clone()),
        ("address", order.pickup_address.clone()),
        ("dropoff", order.dropoff_address.clone()),
        ("phone", order.phone.clone()),
        ("description", order.description.clone()),
    ]
}

/// Builds the update query. Status and coordinates are only sent when set,
/// so a position-only update leaves the stored status alone.
fn update_query(update: &OrderUpdate) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("action", "updateOrder".to_string()),
        ("trackingId", update.tracking_id.clone()),
    ];
    if let Some(status) = update.status.as_deref().filter(|s| !s.trim().is_empty()) {
        query.push(("status", status.to_string()));
    }
    if let Some(loc) = update.location {
        query.push(("lat", loc.latitude.to_string()));
        query.push(("lng", loc.longitude.to_string()));
    }
    query
}

fn parse_order(body: serde_json::Value) -> Result<Option<OrderRecord>, OrderError> {
    let record = OrderRecord::from_value(body).ok_or_else(|| OrderError::Parse {
        message: "Order response is not an object".to_string(),
    })?;

    if record.is_not_found() {
        return Ok(None);
    }
    Ok(Some(record))
}

fn parse_created(body: &serde_json::Value) -> Result<String, OrderError> {
    match body["status"].as_str() {
        Some("success") => body["trackingId"]
            .as_str()
            .filter(|id| !id.is_empty())
            .map(String::from)
            .ok_or_else(|| OrderError::Parse {
                message: "Create response missing trackingId".to_string(),
            }),
        _ => Err(OrderError::Rejected {
            message: body["message"]
                .as_str()
                .unwrap_or("Unknown error")
                .to_string(),
        }),
    }
}

fn parse_update(body: &serde_json::Value) -> Result<UpdateOutcome, OrderError> {
    match body["status"].as_str() {
        Some("updated") => Ok(UpdateOutcome::Updated),
        Some("not_found") => Ok(UpdateOutcome::NotFound),
        Some(other) => Ok(UpdateOutcome::Rejected {
            reason: other.to_string(),
        }),
        None => Err(OrderError::Parse {
            message: "Update response missing status".to_string(),
        }),
    }
}
