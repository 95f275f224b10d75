//! HTTP handler functions for the courier tracking API.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use courier_track_auth::AuthError;
use courier_track_order::OrderError;
use courier_track_order_models::NewOrder;
use courier_track_server_models::{
    ApiError, ApiHealth, CreateOrderRequest, CreateOrderResponse, TrackQuery, UpdateOrderRequest,
    VerifyTokenRequest, VerifyTokenResponse,
};
use courier_track_tracking::{MapRenderer, TrackingController, TrackingError, TrackingPage};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /verify-token`
///
/// Checks a courier's Google ID token against the client id and the email
/// allow-list.
pub async fn verify_token(
    state: web::Data<AppState>,
    body: web::Json<VerifyTokenRequest>,
) -> HttpResponse {
    match state.authorizer.verify(&body.token).await {
        Ok(identity) => HttpResponse::Ok().json(VerifyTokenResponse::verified(identity.email)),
        Err(e) => {
            let message = match &e {
                AuthError::Transport(err) => {
                    log::error!("Token verification failed: {err}");
                    "Token verification failed".to_string()
                }
                other => other.to_string(),
            };
            HttpResponse::build(status(e.status_code())).json(VerifyTokenResponse::failed(message))
        }
    }
}

/// `POST /update-order`
///
/// Forwards a courier status/position update once the token checks out.
pub async fn update_order(
    state: web::Data<AppState>,
    body: web::Json<UpdateOrderRequest>,
) -> HttpResponse {
    if let Err(e) = state.authorizer.verify(&body.token).await {
        log::warn!("Refused courier update: {e}");
        return HttpResponse::Forbidden().json(ApiError::new("Unauthorized"));
    }

    let Some(update) = body.to_update() else {
        return HttpResponse::BadRequest().json(ApiError::new("Missing trackingId"));
    };
    if body.lat.is_some() != body.lng.is_some() || (body.lat.is_some() && update.location.is_none())
    {
        log::warn!(
            "Ignoring incomplete or invalid position for {}",
            update.tracking_id
        );
    }

    match state.orders.update_order(&update).await {
        Ok(outcome) => {
            log::info!("Order {} update: {outcome:?}", update.tracking_id);
            HttpResponse::Ok().json(outcome)
        }
        Err(e) => {
            log::error!("Failed to update order {}: {e}", update.tracking_id);
            HttpResponse::InternalServerError().json(ApiError::new("Update failed"))
        }
    }
}

/// `POST /api/orders`
///
/// Creates an order and answers with its tracking id.
pub async fn create_order(
    state: web::Data<AppState>,
    body: web::Json<CreateOrderRequest>,
) -> HttpResponse {
    let missing = body.missing_fields();
    if !missing.is_empty() {
        return HttpResponse::BadRequest().json(CreateOrderResponse::Error {
            message: format!("Missing required fields: {}", missing.join(", ")),
        });
    }

    let order = NewOrder::from(body.into_inner());
    match state.orders.create_order(&order).await {
        Ok(tracking_id) => {
            log::info!("Created order {tracking_id}");
            HttpResponse::Ok().json(CreateOrderResponse::Success { tracking_id })
        }
        Err(OrderError::Rejected { message }) => {
            log::warn!("Order service refused new order: {message}");
            HttpResponse::UnprocessableEntity().json(CreateOrderResponse::Error { message })
        }
        Err(e) => {
            log::error!("Failed to create order: {e}");
            HttpResponse::BadGateway().json(CreateOrderResponse::Error {
                message: "Error creating order".to_string(),
            })
        }
    }
}

/// `GET /track/{tracking_id}`
///
/// Looks up one order, draws its map overlays and returns the page.
pub async fn track(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<TrackQuery>,
) -> HttpResponse {
    let theme = query.theme.unwrap_or_default();
    let controller = TrackingController::new(state.orders.clone(), state.refresh_interval);
    let renderer = MapRenderer::new(state.geocoder.clone(), state.router.clone());

    let code = match controller.lookup(&path).await {
        Ok(snapshot) => {
            let report = renderer.sync(&snapshot, theme).await;
            log::debug!(
                "Map for {}: pickup={:?} dropoff={:?} route={:?}",
                snapshot.tracking_id,
                report.pickup,
                report.dropoff,
                report.route
            );
            StatusCode::OK
        }
        Err(TrackingError::NotFound { .. }) => StatusCode::NOT_FOUND,
        Err(TrackingError::Transport(_)) => StatusCode::BAD_GATEWAY,
        Err(TrackingError::EmptyInput) => StatusCode::BAD_REQUEST,
        Err(TrackingError::Superseded) => StatusCode::CONFLICT,
    };

    let page = TrackingPage::new(&controller.state(), renderer.overlays(), theme);
    HttpResponse::build(code).json(page)
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
