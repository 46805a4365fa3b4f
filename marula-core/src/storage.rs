//! redb-based local persistence
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `app_state` | fixed string | JSON | cart, profile, promo, delivery selection, saved locations, wishlist, recently viewed |
//! | `orders` | order id | JSON `Order` | local order history |
//! | `unsynced_orders` | order id | `()` | orders awaiting a remote write |
//! | `counters` | name | `u64` | monotonic order-id counter |
//! | `geocode_cache` | "lat,lon" (4 dp) | JSON `AddressFields` | reverse-geocoding cache |
//!
//! # Durability
//!
//! redb commits are durable as soon as `commit()` returns, which is what
//! the synchronous write-after-mutation contract of the cart and order
//! flows relies on.
//!
//! # Corrupt entries
//!
//! Startup reads never fail on bad data: an entry that does not parse is
//! logged, deleted, and replaced by the type's default.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::AppError;
use shared::models::{
    AddressFields, CartLine, DeliveryLocation, DeliverySelection, LocationKind, Order, Profile,
    PromoState,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Fixed-key JSON blobs of application state
const STATE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("app_state");

/// Local order history: key = order id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("orders");

/// Orders that have not reached the remote store yet (existence check)
const UNSYNCED_TABLE: TableDefinition<u64, ()> = TableDefinition::new("unsynced_orders");

/// Named monotonic counters
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Reverse-geocoding cache: key = 4-dp "lat,lon"
const GEOCODE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("geocode_cache");

const CART_KEY: &str = "cart";
const PROFILE_KEY: &str = "profile";
const PROMO_KEY: &str = "promo";
const DELIVERY_KEY: &str = "delivery";
const SAVED_LOCATIONS_KEY: &str = "saved_locations";
const WISHLIST_KEY: &str = "wishlist";
const RECENTLY_VIEWED_KEY: &str = "recently_viewed";

const ORDER_COUNTER_KEY: &str = "order_id";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::storage(err.to_string())
    }
}

/// Local key-value store backed by redb
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl LocalStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub(crate) fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init_tables(&db)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn init_tables(db: &Database) -> StorageResult<()> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(STATE_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(UNSYNCED_TABLE)?;
            let _ = write_txn.open_table(GEOCODE_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(ORDER_COUNTER_KEY)?.is_none() {
                counters.insert(ORDER_COUNTER_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Generic state blob access ==========

    fn read_state<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let raw = {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(STATE_TABLE)?;
            table.get(key)?.map(|guard| guard.value().to_vec())
        };
        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_slice(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding corrupt state entry");
                self.delete_state(key)?;
                Ok(None)
            }
        }
    }

    fn write_state<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let bytes = serde_json::to_vec(value)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(STATE_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn delete_state(&self, key: &str) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(STATE_TABLE)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Read a state blob, falling back to the default on any failure.
    /// Startup must never crash on a bad or unreadable entry.
    fn read_state_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_state(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read state entry, using default");
                T::default()
            }
        }
    }

    // ========== Cart ==========

    pub fn load_cart(&self) -> Vec<CartLine> {
        self.read_state_or_default(CART_KEY)
    }

    pub fn store_cart(&self, lines: &[CartLine]) -> StorageResult<()> {
        self.write_state(CART_KEY, &lines)
    }

    // ========== Profile ==========

    pub fn load_profile(&self) -> Option<Profile> {
        self.read_state_or_default(PROFILE_KEY)
    }

    pub fn store_profile(&self, profile: &Profile) -> StorageResult<()> {
        self.write_state(PROFILE_KEY, &Some(profile))
    }

    // ========== Promo ==========

    pub fn load_promo(&self) -> PromoState {
        self.read_state_or_default(PROMO_KEY)
    }

    pub fn store_promo(&self, promo: &PromoState) -> StorageResult<()> {
        self.write_state(PROMO_KEY, promo)
    }

    // ========== Delivery selection ==========

    pub fn load_delivery(&self) -> DeliverySelection {
        self.read_state_or_default(DELIVERY_KEY)
    }

    pub fn store_delivery(&self, delivery: &DeliverySelection) -> StorageResult<()> {
        self.write_state(DELIVERY_KEY, delivery)
    }

    // ========== Saved locations ==========

    pub fn saved_locations(&self) -> Vec<DeliveryLocation> {
        self.read_state_or_default(SAVED_LOCATIONS_KEY)
    }

    /// Prepend a location to the history: newest first, at most one
    /// auto-detected `CURRENT` entry, bounded by `cap`.
    pub fn push_saved_location(&self, location: &DeliveryLocation, cap: usize) -> StorageResult<()> {
        let mut history = self.saved_locations();
        if location.kind == LocationKind::Current {
            history.retain(|l| l.kind != LocationKind::Current);
        }
        history.insert(0, location.clone());
        history.truncate(cap);
        self.write_state(SAVED_LOCATIONS_KEY, &history)
    }

    // ========== Wishlist ==========

    pub fn wishlist(&self) -> Vec<i64> {
        self.read_state_or_default(WISHLIST_KEY)
    }

    /// Toggle an item in the wishlist. Returns `true` if it was added.
    pub fn toggle_wishlist(&self, item_id: i64) -> StorageResult<bool> {
        let mut wishlist = self.wishlist();
        let added = if let Some(pos) = wishlist.iter().position(|&id| id == item_id) {
            wishlist.remove(pos);
            false
        } else {
            wishlist.push(item_id);
            true
        };
        self.write_state(WISHLIST_KEY, &wishlist)?;
        Ok(added)
    }

    // ========== Recently viewed ==========

    pub fn recently_viewed(&self) -> Vec<i64> {
        self.read_state_or_default(RECENTLY_VIEWED_KEY)
    }

    /// Move-to-front push with a hard cap.
    pub fn push_recently_viewed(&self, item_id: i64, cap: usize) -> StorageResult<()> {
        let mut recent = self.recently_viewed();
        recent.retain(|&id| id != item_id);
        recent.insert(0, item_id);
        recent.truncate(cap);
        self.write_state(RECENTLY_VIEWED_KEY, &recent)
    }

    // ========== Order counter ==========

    /// Increment and persist the order-id counter, returning the new id.
    ///
    /// Committed in its own transaction so the id survives a crash or a
    /// failed remote save and is never handed out twice.
    pub fn next_order_id(&self) -> StorageResult<u64> {
        let write_txn = self.db.begin_write()?;
        let next = {
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            let current = counters
                .get(ORDER_COUNTER_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let next = current + 1;
            counters.insert(ORDER_COUNTER_KEY, next)?;
            next
        };
        write_txn.commit()?;
        Ok(next)
    }

    /// Current counter value (read-only)
    pub fn current_order_id(&self) -> u64 {
        let read = || -> StorageResult<u64> {
            let read_txn = self.db.begin_read()?;
            let counters = read_txn.open_table(COUNTERS_TABLE)?;
            Ok(counters
                .get(ORDER_COUNTER_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0))
        };
        read().unwrap_or(0)
    }

    // ========== Orders ==========

    /// Store a new order in the local history. `synced = false` also
    /// enqueues it for a later remote push.
    pub fn store_order(&self, order: &Order, synced: bool) -> StorageResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut orders = write_txn.open_table(ORDERS_TABLE)?;
            orders.insert(order.id, bytes.as_slice())?;

            let mut unsynced = write_txn.open_table(UNSYNCED_TABLE)?;
            if synced {
                unsynced.remove(order.id)?;
            } else {
                unsynced.insert(order.id, ())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing order record, leaving its sync marker as-is.
    pub fn update_order(&self, order: &Order) -> StorageResult<()> {
        let bytes = serde_json::to_vec(order)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut orders = write_txn.open_table(ORDERS_TABLE)?;
            orders.insert(order.id, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn mark_order_synced(&self, order_id: u64) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut unsynced = write_txn.open_table(UNSYNCED_TABLE)?;
            unsynced.remove(order_id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn load_order(&self, order_id: u64) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        match orders.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Full local order history, newest first.
    pub fn order_history(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut history = Vec::new();
        for result in orders.iter()? {
            let (_key, value) = result?;
            match serde_json::from_slice::<Order>(value.value()) {
                Ok(order) => history.push(order),
                Err(e) => tracing::warn!(error = %e, "Skipping corrupt order record"),
            }
        }
        history.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(history)
    }

    /// Orders still waiting for a successful remote write, oldest first.
    pub fn unsynced_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let unsynced = read_txn.open_table(UNSYNCED_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;

        let mut pending = Vec::new();
        for result in unsynced.iter()? {
            let (key, _) = result?;
            if let Some(guard) = orders.get(key.value())? {
                pending.push(serde_json::from_slice(guard.value())?);
            }
        }
        pending.sort_by_key(|o: &Order| o.id);
        Ok(pending)
    }

    // ========== Geocode cache ==========

    pub fn geocode_get(&self, key: &str) -> Option<AddressFields> {
        let read = || -> StorageResult<Option<AddressFields>> {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(GEOCODE_TABLE)?;
            match table.get(key)? {
                Some(guard) => Ok(serde_json::from_slice(guard.value()).ok()),
                None => Ok(None),
            }
        };
        read().unwrap_or_default()
    }

    pub fn geocode_put(&self, key: &str, address: &AddressFields) -> StorageResult<()> {
        let bytes = serde_json::to_vec(address)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(GEOCODE_TABLE)?;
            table.insert(key, bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    // ========== Test support ==========

    /// Write raw bytes into the state table, bypassing serialization.
    #[cfg(test)]
    pub(crate) fn write_raw_state(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(STATE_TABLE)?;
            table.insert(key, bytes)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}
