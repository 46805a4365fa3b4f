//! Order status tracker
//!
//! Consumes status events from the order-management backend and walks each
//! order through the state machine, firing a user-visible notification on
//! every applied transition. Illegal transitions are logged and dropped;
//! the backend is authoritative but the local record never goes backward
//! or skips ahead.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{WorkerMessage, WorkerNotice};
use shared::models::{Order, OrderStatus, StatusEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::storage::LocalStore;

/// Hook fired after every applied status transition.
pub trait StatusNotifier: Send + Sync {
    fn status_changed(&self, order: &Order, previous: OrderStatus);
}

/// Default notifier: a structured log line.
pub struct LogNotifier;

impl StatusNotifier for LogNotifier {
    fn status_changed(&self, order: &Order, previous: OrderStatus) {
        tracing::info!(
            reference = %order.reference,
            ?previous,
            status = ?order.status,
            "Order status changed"
        );
    }
}

/// Notifier that forwards transitions to the background worker as
/// push-notification requests. Fire-and-forget: a closed channel is
/// logged, never an error.
pub struct WorkerNotifier {
    tx: mpsc::UnboundedSender<WorkerNotice>,
}

impl WorkerNotifier {
    pub fn new(tx: mpsc::UnboundedSender<WorkerNotice>) -> Self {
        Self { tx }
    }
}

impl StatusNotifier for WorkerNotifier {
    fn status_changed(&self, order: &Order, _previous: OrderStatus) {
        let notice = WorkerNotice::new(WorkerMessage::PushOrderStatus {
            order_reference: order.reference.clone(),
            status: order.status,
        });
        if self.tx.send(notice).is_err() {
            tracing::warn!(reference = %order.reference, "Worker channel closed, dropping notification");
        }
    }
}

pub struct OrderTracker {
    store: LocalStore,
    notifier: Arc<dyn StatusNotifier>,
}

impl OrderTracker {
    pub fn new(store: LocalStore, notifier: Arc<dyn StatusNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Apply one status event: validate the transition, persist the
    /// updated order, notify. Returns the updated order.
    pub fn apply(&self, event: &StatusEvent) -> AppResult<Order> {
        let mut order = self
            .store
            .load_order(event.order_id)?
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("order_id", event.order_id)
            })?;

        let previous = order.status;
        if previous == event.status {
            // Duplicate delivery of the same transition; nothing to do.
            return Ok(order);
        }
        if !previous.can_transition_to(event.status) {
            let code = if previous.is_terminal() {
                ErrorCode::OrderAlreadyTerminal
            } else {
                ErrorCode::InvalidStatusTransition
            };
            return Err(AppError::new(code)
                .with_detail("order_id", event.order_id)
                .with_detail("from", format!("{previous:?}"))
                .with_detail("to", format!("{:?}", event.status)));
        }

        order.status = event.status;
        self.store.update_order(&order)?;
        self.notifier.status_changed(&order, previous);
        Ok(order)
    }

    /// Event loop: apply every incoming status event until the channel
    /// closes or shutdown is requested.
    pub async fn run(self, mut events: mpsc::Receiver<StatusEvent>, shutdown: CancellationToken) {
        tracing::info!("OrderTracker started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("OrderTracker shutting down");
                    break;
                }
                event = events.recv() => {
                    match event {
                        Some(event) => {
                            if let Err(e) = self.apply(&event) {
                                tracing::warn!(
                                    order_id = event.order_id,
                                    error = %e,
                                    "Dropping status event"
                                );
                            }
                        }
                        None => {
                            tracing::info!("Status feed closed, OrderTracker stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PriceBreakdown, Profile};
    use shared::util::now_millis;
    use std::sync::Mutex;

    struct RecordingNotifier {
        transitions: Mutex<Vec<(OrderStatus, OrderStatus)>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                transitions: Mutex::new(Vec::new()),
            })
        }
    }

    impl StatusNotifier for RecordingNotifier {
        fn status_changed(&self, order: &Order, previous: OrderStatus) {
            self.transitions
                .lock()
                .unwrap()
                .push((previous, order.status));
        }
    }

    fn seed_order(store: &LocalStore, id: u64, is_delivery: bool) {
        let order = Order {
            id,
            reference: format!("WFC{:04}", id),
            lines: vec![],
            pricing: PriceBreakdown::default(),
            status: OrderStatus::Pending,
            created_at: now_millis(),
            is_delivery,
            delivery_location: None,
            customer: Profile::new("Test", "t@example.com", "0971234567"),
            promo_code: None,
            payment_proof_present: false,
        };
        store.store_order(&order, true).unwrap();
    }

    fn event(order_id: u64, status: OrderStatus) -> StatusEvent {
        StatusEvent {
            order_id,
            status,
            at: now_millis(),
        }
    }

    #[test]
    fn test_delivery_order_walks_full_sequence() {
        let store = LocalStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::new();
        let tracker = OrderTracker::new(store.clone(), notifier.clone());
        seed_order(&store, 1, true);

        for status in [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::OutForDelivery,
            OrderStatus::Completed,
        ] {
            tracker.apply(&event(1, status)).unwrap();
        }

        assert_eq!(
            store.load_order(1).unwrap().unwrap().status,
            OrderStatus::Completed
        );
        // One notification per transition
        assert_eq!(notifier.transitions.lock().unwrap().len(), 4);
    }

    #[test]
    fn test_pickup_order_completes_from_ready() {
        let store = LocalStore::open_in_memory().unwrap();
        let tracker = OrderTracker::new(store.clone(), RecordingNotifier::new());
        seed_order(&store, 1, false);

        tracker.apply(&event(1, OrderStatus::Preparing)).unwrap();
        tracker.apply(&event(1, OrderStatus::Ready)).unwrap();
        tracker.apply(&event(1, OrderStatus::Completed)).unwrap();

        assert_eq!(
            store.load_order(1).unwrap().unwrap().status,
            OrderStatus::Completed
        );
    }

    #[test]
    fn test_illegal_transition_rejected_and_not_persisted() {
        let store = LocalStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::new();
        let tracker = OrderTracker::new(store.clone(), notifier.clone());
        seed_order(&store, 1, false);

        let err = tracker.apply(&event(1, OrderStatus::Completed)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStatusTransition);

        assert_eq!(
            store.load_order(1).unwrap().unwrap().status,
            OrderStatus::Pending
        );
        assert!(notifier.transitions.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancellation_from_any_active_state() {
        let store = LocalStore::open_in_memory().unwrap();
        let tracker = OrderTracker::new(store.clone(), RecordingNotifier::new());
        seed_order(&store, 1, false);

        tracker.apply(&event(1, OrderStatus::Preparing)).unwrap();
        tracker.apply(&event(1, OrderStatus::Cancelled)).unwrap();

        let err = tracker.apply(&event(1, OrderStatus::Ready)).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyTerminal);
    }

    #[test]
    fn test_duplicate_event_is_idempotent() {
        let store = LocalStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::new();
        let tracker = OrderTracker::new(store.clone(), notifier.clone());
        seed_order(&store, 1, false);

        tracker.apply(&event(1, OrderStatus::Preparing)).unwrap();
        tracker.apply(&event(1, OrderStatus::Preparing)).unwrap();

        assert_eq!(notifier.transitions.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_order_rejected() {
        let store = LocalStore::open_in_memory().unwrap();
        let tracker = OrderTracker::new(store, RecordingNotifier::new());

        let err = tracker.apply(&event(99, OrderStatus::Preparing)).unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[test]
    fn test_worker_notifier_emits_push_message() {
        let store = LocalStore::open_in_memory().unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let tracker = OrderTracker::new(store.clone(), Arc::new(WorkerNotifier::new(tx)));
        seed_order(&store, 1, false);

        tracker.apply(&event(1, OrderStatus::Preparing)).unwrap();

        let notice = rx.try_recv().unwrap();
        match notice.message {
            WorkerMessage::PushOrderStatus {
                order_reference,
                status,
            } => {
                assert_eq!(order_reference, "WFC0001");
                assert_eq!(status, OrderStatus::Preparing);
            }
            other => panic!("unexpected worker message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_applies_events_until_shutdown() {
        let store = LocalStore::open_in_memory().unwrap();
        let notifier = RecordingNotifier::new();
        let tracker = OrderTracker::new(store.clone(), notifier.clone());
        seed_order(&store, 1, false);

        let (tx, rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(tracker.run(rx, shutdown.clone()));

        tx.send(event(1, OrderStatus::Preparing)).await.unwrap();
        tx.send(event(1, OrderStatus::Ready)).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        assert_eq!(
            store.load_order(1).unwrap().unwrap().status,
            OrderStatus::Ready
        );
        assert_eq!(notifier.transitions.lock().unwrap().len(), 2);
    }
}
