//! End-to-end checkout flow against on-disk storage
//!
//! Exercises the full session: browse, cart, promo, delivery location,
//! checkout (online and offline), offline sync, and status progression —
//! everything short of the real network and UI.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use marula_core::config::Config;
use marula_core::orders::tracker::{LogNotifier, OrderTracker};
use marula_core::orders::{OrderService, Persistence, RemotePersistence};
use marula_core::payment::{PaymentConfirmation, validate_payment_proof};
use marula_core::state::AppState;
use marula_core::storage::LocalStore;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geo::Coordinates;
use shared::models::{
    DeliveryLocation, ItemKind, LocationKind, Order, OrderStatus, Profile, ServiceMode, StatusEvent,
};
use shared::util::now_millis;

struct FlakyRemote {
    online: AtomicBool,
    pushes: AtomicU32,
}

impl FlakyRemote {
    fn new(online: bool) -> Arc<Self> {
        Arc::new(Self {
            online: AtomicBool::new(online),
            pushes: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl RemotePersistence for FlakyRemote {
    async fn push_order(&self, order: &Order) -> AppResult<String> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(shared::util::remote_order_key(order.id))
        } else {
            Err(AppError::new(ErrorCode::RemoteUnavailable))
        }
    }
}

fn open_store(dir: &tempfile::TempDir) -> LocalStore {
    LocalStore::open(dir.path().join("marula.redb")).unwrap()
}

fn kabulonga(config: &Config) -> DeliveryLocation {
    DeliveryLocation {
        address: "Plot 5, Kabulonga".to_string(),
        notes: "blue gate".to_string(),
        created_at: now_millis(),
        coordinates: Coordinates::new(
            config.restaurant_location.lat + 0.0045,
            config.restaurant_location.lon,
        ),
        kind: LocationKind::Saved,
        auto_detected: false,
    }
}

#[tokio::test]
async fn full_delivery_order_reaches_completion() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let config = Config::with_data_dir(dir.path().to_string_lossy());
    let remote = FlakyRemote::new(true);

    // Build the session
    let mut state = AppState::load(config.clone(), store.clone());
    state
        .set_profile(Profile::new("Bwalya M", "bwalya@example.com", "0971234567"))
        .unwrap();
    state.cart.add_item(1, "Wiza Burger", 85.0, None, ItemKind::Food);
    state.cart.add_customized_item(
        2,
        "Pizza",
        100.0,
        vec!["cheese".to_string(), "mushroom".to_string()],
        "well done".to_string(),
        10.0,
        None,
    );
    state.push_recently_viewed(1);
    state.push_recently_viewed(2);
    state.set_delivery_location(kabulonga(&state.config));
    state.apply_promo("WIZA10").unwrap();

    // subtotal = 85 + 120 = 205; 10% promo = 20.50; fee 10; service 2
    let totals = state.totals();
    assert_eq!(totals.subtotal, 205.0);
    assert_eq!(totals.discount, 20.5);
    assert_eq!(totals.delivery_fee, 10.0);
    assert_eq!(totals.total, 196.5);
    assert_eq!(totals.deposit, 196.5, "full prepayment deployment");

    // Checkout with an uploaded proof
    let service = OrderService::new(store.clone(), remote.clone(), config.clone());
    let proof = validate_payment_proof("momo.png", 150_000).unwrap();
    let outcome = service
        .checkout(
            &mut state.cart,
            state.profile.as_ref(),
            &mut state.delivery,
            &mut state.promo,
            Some(PaymentConfirmation::ProofUploaded(proof)),
        )
        .await
        .unwrap();

    assert_eq!(outcome.persistence, Persistence::Remote);
    assert_eq!(outcome.order.reference, "WFC0001");
    assert_eq!(outcome.order.pricing, totals, "breakdown frozen at checkout");
    assert!(outcome.order.is_delivery);
    assert!(outcome.order.payment_proof_present);
    assert_eq!(outcome.order.promo_code.as_deref(), Some("WIZA10"));

    // Session reset
    assert!(state.cart.is_empty());
    assert!(!state.promo.is_active());
    assert_eq!(state.delivery.mode, ServiceMode::Pickup);

    // Backend status events drive the order to completion
    let tracker = OrderTracker::new(store.clone(), Arc::new(LogNotifier));
    for status in [
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Completed,
    ] {
        tracker
            .apply(&StatusEvent {
                order_id: outcome.order.id,
                status,
                at: now_millis(),
            })
            .unwrap();
    }
    let finished = store.load_order(outcome.order.id).unwrap().unwrap();
    assert_eq!(finished.status, OrderStatus::Completed);
}

#[tokio::test]
async fn offline_checkout_survives_restart_and_syncs_later() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path().to_string_lossy());
    let remote = FlakyRemote::new(false);

    {
        let store = open_store(&dir);
        let mut state = AppState::load(config.clone(), store.clone());
        state
            .set_profile(Profile::new("Bwalya M", "bwalya@example.com", "0971234567"))
            .unwrap();
        state.cart.add_item(1, "Chicken Wrap", 55.0, None, ItemKind::Food);

        let service = OrderService::new(store, remote.clone(), config.clone());
        let outcome = service
            .checkout(
                &mut state.cart,
                state.profile.as_ref(),
                &mut state.delivery,
                &mut state.promo,
                Some(PaymentConfirmation::ConfirmedOutOfBand),
            )
            .await
            .unwrap();

        assert_eq!(outcome.persistence, Persistence::LocalOnly);
        assert_eq!(outcome.order.status, OrderStatus::Pending);
    }

    // "Restart": reopen the database from disk
    let store = open_store(&dir);
    let history = store.order_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reference, "WFC0001");
    assert_eq!(store.current_order_id(), 1);
    assert_eq!(store.unsynced_orders().unwrap().len(), 1);

    // Connectivity returns; the pending order drains
    remote.online.store(true, Ordering::SeqCst);
    let service = OrderService::new(store.clone(), remote.clone(), config);
    assert_eq!(service.sync_pending().await.unwrap(), 1);
    assert!(store.unsynced_orders().unwrap().is_empty());
}

#[tokio::test]
async fn references_never_repeat_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_data_dir(dir.path().to_string_lossy());

    for expected in 1..=3u64 {
        let store = open_store(&dir);
        // Alternate outages; the counter must not care
        let remote = FlakyRemote::new(expected % 2 == 0);
        let mut state = AppState::load(config.clone(), store.clone());
        state
            .set_profile(Profile::new("Bwalya M", "bwalya@example.com", "0971234567"))
            .unwrap();
        state.cart.add_item(1, "Fries", 25.0, None, ItemKind::Food);

        let service = OrderService::new(store, remote, config.clone());
        let outcome = service
            .checkout(
                &mut state.cart,
                state.profile.as_ref(),
                &mut state.delivery,
                &mut state.promo,
                Some(PaymentConfirmation::ConfirmedOutOfBand),
            )
            .await
            .unwrap();

        assert_eq!(outcome.order.id, expected);
        assert_eq!(outcome.order.reference, format!("WFC{:04}", expected));
    }
}
