mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{COURIER, FakeOrders, Reply, order_row};
use courier_track_order_models::OrderStatus;
use courier_track_tracking::{TrackingController, TrackingError, TrackingPhase, Viewport};

const MINUTE: Duration = Duration::from_secs(60);

fn controller(orders: &Arc<FakeOrders>) -> TrackingController {
    TrackingController::new(orders.clone(), MINUTE)
}

#[tokio::test(start_paused = true)]
async fn lookup_loads_snapshot_and_starts_refresh() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "In Transit")));
    let controller = controller(&orders);

    let snapshot = controller.lookup("  ABC123 ").await.unwrap();

    assert_eq!(orders.calls(), ["ABC123"]);
    assert_eq!(snapshot.tracking_id, "ABC123");
    assert_eq!(snapshot.status, OrderStatus::InTransit);
    assert_eq!(snapshot.courier_location, Some(COURIER));

    let state = controller.state();
    assert_eq!(state.phase, TrackingPhase::Tracking);
    assert_eq!(state.snapshot, Some(snapshot));
    assert!(state.error.is_none());
    assert!(controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn blank_input_issues_no_request() {
    let orders = FakeOrders::new();
    let controller = controller(&orders);

    assert!(matches!(
        controller.lookup("   ").await,
        Err(TrackingError::EmptyInput)
    ));
    assert!(orders.calls().is_empty());
    assert_eq!(controller.state().phase, TrackingPhase::Idle);
    assert!(!controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn not_found_clears_snapshot_and_resets_viewport() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "Pending")));
    let controller = controller(&orders);
    controller.lookup("ABC123").await.unwrap();

    let err = controller.lookup("NOPE").await.unwrap_err();

    assert!(matches!(err, TrackingError::NotFound { ref tracking_id } if tracking_id == "NOPE"));
    assert!(err.is_user_visible());
    let state = controller.state();
    assert_eq!(state.phase, TrackingPhase::NotFound);
    assert!(state.snapshot.is_none());
    assert_eq!(state.error.as_deref(), Some("Tracking ID not found."));
    assert_eq!(state.viewport, Viewport::DEFAULT);
    assert!(!controller.is_polling());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_reported_and_not_retried() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Fail);
    let controller = controller(&orders);

    let err = controller.lookup("ABC123").await.unwrap_err();
    assert!(matches!(err, TrackingError::Transport(_)));

    let state = controller.state();
    assert_eq!(state.phase, TrackingPhase::Error);
    assert_eq!(state.error.as_deref(), Some("Error fetching tracking data."));

    tokio::time::sleep(MINUTE * 5).await;
    assert_eq!(orders.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn refreshes_every_interval() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "Picked Up")));
    let controller = controller(&orders);
    controller.lookup("ABC123").await.unwrap();

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert_eq!(orders.calls().len(), 1);

    orders.reply("ABC123", Reply::Found(order_row("ABC123", "Delivered")));
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(orders.calls(), ["ABC123", "ABC123"]);
    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.status, OrderStatus::Delivered);
    assert_eq!(controller.state().phase, TrackingPhase::Tracking);

    tokio::time::sleep(MINUTE).await;
    assert_eq!(orders.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn refresh_stops_once_order_disappears() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "In Transit")));
    let controller = controller(&orders);
    controller.lookup("ABC123").await.unwrap();

    orders.reply("ABC123", Reply::NotFound);
    tokio::time::sleep(MINUTE + Duration::from_secs(1)).await;

    assert_eq!(orders.calls().len(), 2);
    assert_eq!(controller.state().phase, TrackingPhase::NotFound);
    assert!(controller.snapshot().is_none());
    assert!(!controller.is_polling());

    tokio::time::sleep(MINUTE * 5).await;
    assert_eq!(orders.calls().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn refresh_stops_after_failed_refresh() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "In Transit")));
    let controller = controller(&orders);
    controller.lookup("ABC123").await.unwrap();

    orders.reply("ABC123", Reply::Fail);
    tokio::time::sleep(MINUTE * 4).await;

    assert_eq!(orders.calls().len(), 2);
    assert_eq!(controller.state().phase, TrackingPhase::Error);
}

#[tokio::test(start_paused = true)]
async fn refresh_tick_without_snapshot_is_a_no_op() {
    let orders = FakeOrders::new();
    let controller = controller(&orders);

    assert!(controller.refresh_tick().await.unwrap().is_none());
    assert!(orders.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn new_lookup_replaces_refresh_target() {
    let orders = FakeOrders::new();
    orders.reply("A1", Reply::Found(order_row("A1", "Pending")));
    orders.reply("B2", Reply::Found(order_row("B2", "Pending")));
    let controller = controller(&orders);

    controller.lookup("A1").await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    controller.lookup("B2").await.unwrap();
    tokio::time::sleep(MINUTE + Duration::from_secs(1)).await;

    assert_eq!(orders.calls(), ["A1", "B2", "B2"]);
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_superseded() {
    let orders = FakeOrders::new();
    orders.reply("SLOW", Reply::Found(order_row("SLOW", "Pending")));
    orders.reply("FAST", Reply::Found(order_row("FAST", "Delivered")));
    orders.delay("SLOW", Duration::from_secs(5));
    let controller = controller(&orders);

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.lookup("SLOW").await })
    };
    while orders.calls().is_empty() {
        tokio::task::yield_now().await;
    }

    controller.lookup("FAST").await.unwrap();
    let result = slow.await.unwrap();

    assert!(matches!(result, Err(TrackingError::Superseded)));
    assert!(!TrackingError::Superseded.is_user_visible());
    let snapshot = controller.snapshot().unwrap();
    assert_eq!(snapshot.tracking_id, "FAST");
    assert_eq!(controller.state().phase, TrackingPhase::Tracking);
}

#[tokio::test(start_paused = true)]
async fn dropping_controller_stops_refresh() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "In Transit")));
    let controller = controller(&orders);
    controller.lookup("ABC123").await.unwrap();

    drop(controller);
    tokio::time::sleep(MINUTE * 3).await;

    assert_eq!(orders.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_loading_then_tracking() {
    let orders = FakeOrders::new();
    orders.reply("ABC123", Reply::Found(order_row("ABC123", "In Transit")));
    orders.delay("ABC123", Duration::from_secs(1));
    let controller = controller(&orders);
    let mut rx = controller.subscribe();

    let lookup = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.lookup("ABC123").await })
    };

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().phase, TrackingPhase::Loading);

    lookup.await.unwrap().unwrap();
    assert_eq!(rx.borrow_and_update().phase, TrackingPhase::Tracking);
    assert_eq!(rx.borrow().revision, 1);
}
