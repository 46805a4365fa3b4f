//! Background worker message protocol
//!
//! Messages sent from the core to the background worker (notification
//! scheduling, permission checks, pending-order sync). All of these are
//! fire-and-forget: the core never waits on a reply for correctness.

use crate::models::OrderStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Protocol version, bumped on incompatible message changes.
pub const PROTOCOL_VERSION: u16 = 1;

/// Commands understood by the background worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Begin periodic promotional notifications.
    StartPromoSchedule { interval_minutes: u32 },
    /// Stop periodic promotional notifications.
    StopPromoSchedule,
    /// Ask the worker to report notification-permission status.
    CheckPermission,
    /// Push a user-visible order-status notification.
    PushOrderStatus {
        order_reference: String,
        status: OrderStatus,
    },
    /// Trigger a sync attempt for orders saved offline.
    SyncPending,
}

/// Envelope around a [`WorkerMessage`] with a request id for tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerNotice {
    pub version: u16,
    pub request_id: Uuid,
    pub message: WorkerMessage,
}

impl WorkerNotice {
    pub fn new(message: WorkerMessage) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id: Uuid::new_v4(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_format() {
        let notice = WorkerNotice::new(WorkerMessage::PushOrderStatus {
            order_reference: "WFC0042".to_string(),
            status: OrderStatus::Ready,
        });
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("\"PUSH_ORDER_STATUS\""));
        assert!(json.contains("\"READY\""));

        let back: WorkerNotice = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, notice.message);
        assert_eq!(back.version, PROTOCOL_VERSION);
    }

    #[test]
    fn test_sync_trigger_roundtrip() {
        let json = serde_json::to_string(&WorkerMessage::SyncPending).unwrap();
        assert_eq!(json, "{\"type\":\"SYNC_PENDING\"}");
    }
}
