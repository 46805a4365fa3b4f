//! Application state
//!
//! The explicitly-owned replacement for the original client's module-level
//! globals. One `AppState` owns every mutable piece of session state with
//! single-writer discipline; components receive references, never ambient
//! access.

use shared::error::AppResult;
use shared::geo;
use shared::models::{
    DeliveryLocation, DeliverySelection, PriceBreakdown, Profile, PromoApplication, PromoState,
    ServiceMode,
};

use crate::cart::CartStore;
use crate::config::Config;
use crate::pricing::PricingEngine;
use crate::promo::PromoEngine;
use crate::storage::LocalStore;
use crate::validation::validate_profile;

pub struct AppState {
    pub config: Config,
    store: LocalStore,
    pub cart: CartStore,
    pub promo: PromoState,
    pub delivery: DeliverySelection,
    pub profile: Option<Profile>,
    pricing: PricingEngine,
    promo_engine: PromoEngine,
}

impl AppState {
    /// Load all persisted state. Every key is read independently; a
    /// corrupt entry resets to its default instead of failing startup.
    pub fn load(config: Config, store: LocalStore) -> Self {
        let cart = CartStore::load(store.clone());
        let promo = store.load_promo();
        let delivery = store.load_delivery();
        let profile = store.load_profile();
        let pricing = PricingEngine::from_config(&config);

        Self {
            config,
            store,
            cart,
            promo,
            delivery,
            profile,
            pricing,
            promo_engine: PromoEngine::default(),
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Straight-line distance from the restaurant to the active delivery
    /// location, if one is set.
    pub fn delivery_distance_m(&self) -> Option<f64> {
        self.delivery
            .location
            .as_ref()
            .map(|loc| geo::distance_meters(loc.coordinates, self.config.restaurant_location))
    }

    /// Current charge breakdown for the session.
    pub fn totals(&self) -> PriceBreakdown {
        self.cart.totals(
            &self.pricing,
            self.delivery.is_delivery(),
            None,
            self.delivery_distance_m(),
            &self.promo,
        )
    }

    /// Subtotal with no promo applied; the promo engine validates minimum
    /// orders against this.
    fn plain_subtotal(&self) -> f64 {
        self.cart
            .totals(&self.pricing, false, None, None, &PromoState::default())
            .subtotal
    }

    /// Validate and activate a promo code. Replaces any previous code;
    /// a rejected code leaves the previous one active.
    pub fn apply_promo(&mut self, code: &str) -> AppResult<PromoApplication> {
        let application = self.promo_engine.apply(code, self.plain_subtotal())?;
        self.promo = PromoState {
            code: Some(application.code.clone()),
            discount_amount: application.discount_amount,
            free_delivery: application.free_delivery,
        };
        self.persist_promo();
        Ok(application)
    }

    /// Drop the active promo, restoring the undiscounted breakdown.
    pub fn remove_promo(&mut self) {
        self.promo.clear();
        self.persist_promo();
    }

    /// Validate and persist the customer profile.
    pub fn set_profile(&mut self, profile: Profile) -> AppResult<()> {
        validate_profile(&profile)?;
        if let Err(e) = self.store.store_profile(&profile) {
            tracing::warn!(error = %e, "Failed to persist profile");
        }
        self.profile = Some(profile);
        Ok(())
    }

    /// Switch between pickup and delivery.
    pub fn set_service_mode(&mut self, mode: ServiceMode) {
        self.delivery.mode = mode;
        self.persist_delivery();
    }

    /// Make `location` the active delivery destination and record it in
    /// the bounded history.
    pub fn set_delivery_location(&mut self, location: DeliveryLocation) {
        if let Err(e) = self
            .store
            .push_saved_location(&location, self.config.saved_locations_cap)
        {
            tracing::warn!(error = %e, "Failed to persist location history");
        }
        self.delivery.mode = ServiceMode::Delivery;
        self.delivery.location = Some(location);
        self.persist_delivery();
    }

    // ========== Browsing history ==========

    pub fn wishlist(&self) -> Vec<i64> {
        self.store.wishlist()
    }

    pub fn toggle_wishlist(&mut self, item_id: i64) -> bool {
        match self.store.toggle_wishlist(item_id) {
            Ok(added) => added,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist wishlist");
                false
            }
        }
    }

    pub fn recently_viewed(&self) -> Vec<i64> {
        self.store.recently_viewed()
    }

    pub fn push_recently_viewed(&mut self, item_id: i64) {
        if let Err(e) = self
            .store
            .push_recently_viewed(item_id, self.config.recently_viewed_cap)
        {
            tracing::warn!(error = %e, "Failed to persist recently viewed");
        }
    }

    fn persist_promo(&self) {
        if let Err(e) = self.store.store_promo(&self.promo) {
            tracing::warn!(error = %e, "Failed to persist promo state");
        }
    }

    fn persist_delivery(&self) {
        if let Err(e) = self.store.store_delivery(&self.delivery) {
            tracing::warn!(error = %e, "Failed to persist delivery selection");
        }
    }
}
