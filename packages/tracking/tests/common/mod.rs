#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use courier_track_geocoder::{
    GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider, RouteError, RoutePath,
    RoutePlanner, RouteRequest,
};
use courier_track_order::{OrderError, OrderService};
use courier_track_order_models::{
    Coordinate, NewOrder, OrderRecord, OrderUpdate, UpdateOutcome,
};
use serde_json::{Value, json};

pub const PICKUP: Coordinate = Coordinate {
    latitude: 40.7128,
    longitude: -74.006,
};
pub const DROPOFF: Coordinate = Coordinate {
    latitude: 40.7306,
    longitude: -73.9352,
};
pub const COURIER: Coordinate = Coordinate {
    latitude: 40.72,
    longitude: -73.99,
};

pub fn order_row(tracking_id: &str, status: &str) -> Value {
    json!({
        "Tracking Number": tracking_id,
        "Full Name": "Jane Doe",
        "Email": "jane@example.com",
        "Phone": "555-0100",
        "Address": "1 Pickup Rd",
        "Dropoff": "2 Dropoff Ave",
        "Package Description": "Books",
        "Orderstatus": status,
        "latitude": "40.72",
        "longitude": -73.99,
        "Timestamp": "2024-05-01T12:30:00Z",
    })
}

#[derive(Clone)]
pub enum Reply {
    Found(Value),
    NotFound,
    Fail,
}

/// In-memory order service with scripted replies and optional delays.
#[derive(Default)]
pub struct FakeOrders {
    replies: Mutex<BTreeMap<String, Reply>>,
    delays: Mutex<BTreeMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeOrders {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, id: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(id.to_string(), reply);
    }

    pub fn delay(&self, id: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(id.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl OrderService for FakeOrders {
    async fn fetch_order(&self, tracking_id: &str) -> Result<Option<OrderRecord>, OrderError> {
        self.calls.lock().unwrap().push(tracking_id.to_string());
        let delay = self.delays.lock().unwrap().get(tracking_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(tracking_id)
            .cloned()
            .unwrap_or(Reply::NotFound);
        match reply {
            Reply::Found(row) => Ok(OrderRecord::from_value(row)),
            Reply::NotFound => Ok(None),
            Reply::Fail => Err(OrderError::Status { status: 500 }),
        }
    }

    async fn create_order(&self, _order: &NewOrder) -> Result<String, OrderError> {
        Ok("NEW1".to_string())
    }

    async fn update_order(&self, _update: &OrderUpdate) -> Result<UpdateOutcome, OrderError> {
        Ok(UpdateOutcome::Updated)
    }
}

/// Geocoder answering from a fixed address book. Unknown addresses find
/// nothing; addresses containing `FAIL` error.
#[derive(Default)]
pub struct FakeGeocoder {
    book: BTreeMap<String, Coordinate>,
    delays: BTreeMap<String, Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeGeocoder {
    pub fn new() -> Self {
        Self::default()
            .with("1 Pickup Rd", PICKUP)
            .with("2 Dropoff Ave", DROPOFF)
    }

    pub fn with(mut self, address: &str, at: Coordinate) -> Self {
        self.book.insert(address.to_string(), at);
        self
    }

    pub fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delays.insert(address.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Geocoder for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<GeocodedAddress>, GeocodeError> {
        self.calls.lock().unwrap().push(address.to_string());
        if let Some(delay) = self.delays.get(address) {
            tokio::time::sleep(*delay).await;
        }
        if address.contains("FAIL") {
            return Err(GeocodeError::Parse {
                message: "boom".to_string(),
            });
        }
        Ok(self.book.get(address).map(|coordinate| GeocodedAddress {
            coordinate: *coordinate,
            matched_address: Some(address.to_string()),
            provider: GeocodingProvider::Other,
        }))
    }
}

/// Router returning a straight line through the requested stops.
#[derive(Default)]
pub struct FakeRouter {
    no_route: bool,
    requests: Mutex<Vec<RouteRequest>>,
}

impl FakeRouter {
    pub fn without_routes() -> Self {
        Self {
            no_route: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<RouteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RoutePlanner for FakeRouter {
    async fn route(&self, request: &RouteRequest) -> Result<Option<RoutePath>, RouteError> {
        self.requests.lock().unwrap().push(request.clone());
        if self.no_route {
            return Ok(None);
        }
        Ok(Some(RoutePath {
            points: request.stops(),
            distance_meters: 12_000.0,
            duration_seconds: 900.0,
        }))
    }
}
