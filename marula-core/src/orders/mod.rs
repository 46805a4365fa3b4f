//! Order lifecycle
//!
//! Checkout builds an immutable order from the current cart, pricing,
//! profile, and delivery snapshot, persists it locally (always) and
//! remotely (best effort), then resets the session state. The status of a
//! placed order is advanced only by the [`tracker`] from backend events.
//!
//! Availability over durability confirmation: a remote-store failure
//! downgrades to a locally-saved order, it never fails the checkout.

pub mod sync_worker;
pub mod tracker;

use std::sync::Arc;

use async_trait::async_trait;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::geo;
use shared::models::{
    DeliverySelection, Order, OrderStatus, Profile, PromoState,
};
use shared::util::now_millis;

use crate::cart::CartStore;
use crate::config::Config;
use crate::payment::PaymentConfirmation;
use crate::pricing::PricingEngine;
use crate::storage::LocalStore;
use crate::validation::validate_profile;

/// Where a freshly placed order ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Written to the hosted store and the local history
    Remote,
    /// Local history only; queued for a later sync
    LocalOnly,
}

impl Persistence {
    /// Outcome line shown to the customer. Both variants are successful
    /// checkouts; only the wording differs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Remote => "Order placed",
            Self::LocalOnly => "Order saved offline, it will sync when you are back online",
        }
    }
}

/// A completed checkout.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub order: Order,
    pub persistence: Persistence,
}

/// Seam to the remote store, so tests can stub persistence.
#[async_trait]
pub trait RemotePersistence: Send + Sync {
    /// Write the order once; returns the generated remote key.
    async fn push_order(&self, order: &Order) -> AppResult<String>;
}

#[async_trait]
impl RemotePersistence for marula_client::RemoteStore {
    async fn push_order(&self, order: &Order) -> AppResult<String> {
        Ok(marula_client::RemoteStore::push_order(self, order).await?)
    }
}

pub struct OrderService {
    store: LocalStore,
    remote: Arc<dyn RemotePersistence>,
    pricing: PricingEngine,
    config: Config,
}

impl OrderService {
    pub fn new(store: LocalStore, remote: Arc<dyn RemotePersistence>, config: Config) -> Self {
        Self {
            store,
            pricing: PricingEngine::from_config(&config),
            remote,
            config,
        }
    }

    /// Place an order from the current session state.
    ///
    /// Validation failures abort with nothing created and the counter
    /// untouched. Past validation, the order id is allocated and persisted
    /// first, then the remote write is attempted; its failure only
    /// downgrades the outcome to [`Persistence::LocalOnly`]. On success
    /// the cart is cleared, the promo removed, and the fulfilment choice
    /// reset to pickup.
    pub async fn checkout(
        &self,
        cart: &mut CartStore,
        profile: Option<&Profile>,
        delivery: &mut DeliverySelection,
        promo: &mut PromoState,
        payment: Option<PaymentConfirmation>,
    ) -> AppResult<CheckoutOutcome> {
        // 1. Validate
        if cart.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyCart));
        }
        let profile = profile.ok_or_else(|| AppError::new(ErrorCode::ProfileMissing))?;
        validate_profile(profile)?;

        let is_delivery = delivery.is_delivery();
        if is_delivery && delivery.location.is_none() {
            return Err(AppError::new(ErrorCode::DeliveryLocationMissing));
        }

        // 2. Payment is trust-based: a proof upload or an explicit
        //    out-of-band confirmation, never programmatic verification.
        let payment = payment.ok_or_else(|| AppError::new(ErrorCode::PaymentUnconfirmed))?;

        // 3. Snapshot and price against the currently active location
        let distance_m = delivery
            .location
            .as_ref()
            .map(|loc| geo::distance_meters(loc.coordinates, self.config.restaurant_location));
        let pricing = self
            .pricing
            .compute(cart.lines(), is_delivery, None, distance_m, promo);

        let id = self.store.next_order_id()?;
        let order = Order {
            id,
            reference: format!("{}{:04}", self.config.order_ref_prefix, id),
            lines: cart.lines().to_vec(),
            pricing,
            status: OrderStatus::Pending,
            created_at: now_millis(),
            is_delivery,
            delivery_location: delivery.location.clone(),
            customer: profile.clone(),
            promo_code: promo.code.clone(),
            payment_proof_present: payment.has_proof(),
        };

        // 4. Remote write, bounded; local history either way
        let persistence = match self.remote.push_order(&order).await {
            Ok(key) => {
                tracing::info!(reference = %order.reference, %key, "Order persisted remotely");
                Persistence::Remote
            }
            Err(e) => {
                tracing::warn!(
                    reference = %order.reference,
                    error = %e,
                    "Remote save failed, keeping order locally"
                );
                Persistence::LocalOnly
            }
        };
        self.store
            .store_order(&order, persistence == Persistence::Remote)?;

        // 5. Reset session state for the next order
        cart.clear();
        promo.clear();
        if let Err(e) = self.store.store_promo(promo) {
            tracing::warn!(error = %e, "Failed to persist cleared promo");
        }
        delivery.reset_to_pickup();
        if let Err(e) = self.store.store_delivery(delivery) {
            tracing::warn!(error = %e, "Failed to persist delivery reset");
        }

        Ok(CheckoutOutcome { order, persistence })
    }

    /// Push every order still waiting for a remote write. Returns how many
    /// were synced; failures leave the remainder queued for the next run.
    pub async fn sync_pending(&self) -> AppResult<usize> {
        let pending = self.store.unsynced_orders()?;
        if pending.is_empty() {
            return Ok(0);
        }

        let mut synced = 0;
        for order in pending {
            match self.remote.push_order(&order).await {
                Ok(key) => {
                    self.store.mark_order_synced(order.id)?;
                    tracing::info!(reference = %order.reference, %key, "Offline order synced");
                    synced += 1;
                }
                Err(e) => {
                    tracing::warn!(reference = %order.reference, error = %e, "Sync attempt failed");
                    break;
                }
            }
        }
        Ok(synced)
    }

    /// Local order history, newest first.
    pub fn history(&self) -> AppResult<Vec<Order>> {
        Ok(self.store.order_history()?)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StubRemote;
    use super::*;
    use crate::payment::{PaymentConfirmation, validate_payment_proof};
    use shared::geo::Coordinates;
    use shared::models::{DeliveryLocation, ItemKind, LocationKind, ServiceMode};
    use std::sync::atomic::Ordering;

    fn service(remote: Arc<dyn RemotePersistence>) -> (OrderService, LocalStore) {
        let store = LocalStore::open_in_memory().unwrap();
        let config = Config::with_data_dir("unused");
        (OrderService::new(store.clone(), remote, config), store)
    }

    fn full_cart(store: &LocalStore) -> CartStore {
        let mut cart = CartStore::load(store.clone());
        cart.add_item(1, "Meal", 50.0, None, ItemKind::Food);
        let key = cart.lines()[0].key();
        cart.update_quantity(&key, 1);
        cart
    }

    fn profile() -> Profile {
        Profile::new("Bwalya M", "bwalya@example.com", "0971234567")
    }

    fn confirmed() -> Option<PaymentConfirmation> {
        Some(PaymentConfirmation::ConfirmedOutOfBand)
    }

    fn delivery_to(coords: Coordinates) -> DeliverySelection {
        DeliverySelection {
            mode: ServiceMode::Delivery,
            location: Some(DeliveryLocation {
                address: "Plot 5, Kabulonga".to_string(),
                notes: String::new(),
                created_at: now_millis(),
                coordinates: coords,
                kind: LocationKind::Saved,
                auto_detected: false,
            }),
        }
    }

    #[tokio::test]
    async fn test_empty_cart_blocks_checkout_without_counter_increment() {
        let (service, store) = service(StubRemote::online());
        let mut cart = CartStore::load(store.clone());
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let err = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert_eq!(store.current_order_id(), 0);
        assert!(store.order_history().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_profile_blocks_checkout() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let err = service
            .checkout(&mut cart, None, &mut delivery, &mut promo, confirmed())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ProfileMissing);
        assert_eq!(store.current_order_id(), 0);
        assert!(!cart.is_empty(), "cart untouched on validation failure");
    }

    #[tokio::test]
    async fn test_delivery_without_location_blocks_checkout() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection {
            mode: ServiceMode::Delivery,
            location: None,
        };
        let mut promo = PromoState::default();

        let err = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DeliveryLocationMissing);
    }

    #[tokio::test]
    async fn test_unconfirmed_payment_blocks_checkout() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let err = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, None)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentUnconfirmed);
        assert_eq!(store.current_order_id(), 0);
    }

    #[tokio::test]
    async fn test_pickup_checkout_happy_path() {
        let remote = StubRemote::online();
        let (service, store) = service(remote.clone());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let outcome = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        assert_eq!(outcome.persistence, Persistence::Remote);
        assert_eq!(outcome.order.id, 1);
        assert_eq!(outcome.order.reference, "WFC0001");
        assert_eq!(outcome.order.status, OrderStatus::Pending);
        assert_eq!(outcome.order.pricing.total, 102.0);
        assert!(!outcome.order.is_delivery);
        assert_eq!(remote.pushes.load(Ordering::SeqCst), 1);

        // Session reset
        assert!(cart.is_empty());
        assert!(!promo.is_active());
        assert_eq!(delivery.mode, ServiceMode::Pickup);

        // Local history always gets the order
        let history = store.order_history().unwrap();
        assert_eq!(history.len(), 1);
        assert!(store.unsynced_orders().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_fee_frozen_from_active_location() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        // ~500 m north of the default restaurant position
        let mut delivery = delivery_to(Coordinates::new(-15.3830, 28.3228));
        let mut promo = PromoState::default();

        let outcome = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        assert!(outcome.order.is_delivery);
        assert_eq!(outcome.order.pricing.delivery_fee, 10.0);
        assert_eq!(outcome.order.pricing.total, 112.0);
        assert!(outcome.order.delivery_location.is_some());
    }

    #[tokio::test]
    async fn test_offline_checkout_saves_locally_and_queues() {
        let (service, store) = service(StubRemote::offline());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let outcome = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        assert_eq!(outcome.persistence, Persistence::LocalOnly);
        assert!(outcome.persistence.user_message().contains("offline"));
        assert_eq!(outcome.order.status, OrderStatus::Pending);

        let history = store.order_history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(store.unsynced_orders().unwrap().len(), 1);
        assert_eq!(store.current_order_id(), 1, "counter incremented exactly once");
        assert!(cart.is_empty(), "offline outcome still completes checkout");
    }

    #[tokio::test]
    async fn test_references_strictly_increase_across_outcomes() {
        let remote = StubRemote::online();
        let (service, store) = service(remote.clone());
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let mut cart = full_cart(&store);
        let first = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        remote.online.store(false, Ordering::SeqCst);
        let mut cart = full_cart(&store);
        let second = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        remote.online.store(true, Ordering::SeqCst);
        let mut cart = full_cart(&store);
        let third = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        assert_eq!(first.order.id, 1);
        assert_eq!(second.order.id, 2, "failed remote save still consumes an id");
        assert_eq!(third.order.id, 3);
        assert_eq!(third.order.reference, "WFC0003");
    }

    #[tokio::test]
    async fn test_promo_snapshot_lands_in_order() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState {
            code: Some("WIZA10".to_string()),
            discount_amount: 10.0,
            free_delivery: false,
        };

        let outcome = service
            .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
            .await
            .unwrap();

        assert_eq!(outcome.order.promo_code.as_deref(), Some("WIZA10"));
        assert_eq!(outcome.order.pricing.discount, 10.0);
        assert_eq!(outcome.order.pricing.total, 92.0);
        assert!(!promo.is_active(), "promo cleared after checkout");
    }

    #[tokio::test]
    async fn test_payment_proof_recorded_on_order() {
        let (service, store) = service(StubRemote::online());
        let mut cart = full_cart(&store);
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        let proof = validate_payment_proof("momo-confirmation.png", 200_000).unwrap();
        let outcome = service
            .checkout(
                &mut cart,
                Some(&profile()),
                &mut delivery,
                &mut promo,
                Some(PaymentConfirmation::ProofUploaded(proof)),
            )
            .await
            .unwrap();

        assert!(outcome.order.payment_proof_present);
    }

    #[tokio::test]
    async fn test_sync_pending_drains_queue() {
        let remote = StubRemote::offline();
        let (service, store) = service(remote.clone());
        let mut delivery = DeliverySelection::default();
        let mut promo = PromoState::default();

        for _ in 0..2 {
            let mut cart = full_cart(&store);
            service
                .checkout(&mut cart, Some(&profile()), &mut delivery, &mut promo, confirmed())
                .await
                .unwrap();
        }
        assert_eq!(store.unsynced_orders().unwrap().len(), 2);

        // Still offline: nothing drains
        assert_eq!(service.sync_pending().await.unwrap(), 0);

        remote.online.store(true, Ordering::SeqCst);
        assert_eq!(service.sync_pending().await.unwrap(), 2);
        assert!(store.unsynced_orders().unwrap().is_empty());
    }
}
