//! Realtime change feed
//!
//! 解耦写路径和订阅视图：每次成功写入后发布一条 [`ChangeEvent`]，
//! 订阅方收到事件后**重新拉取**受影响的视图，而不是增量修补本地状态。
//!
//! ```text
//! handlers ──► ChangeFeed (broadcast) ──► kitchen view
//!                                     ├─► orders view
//!                                     └─► SSE subscribers
//! ```
//!
//! Refetch-on-event is the consistency model: delivery is at-least-once and
//! unordered across resources, so consumers must be idempotent to
//! redelivery. No transactional guarantee exists beyond per-row writes.

use shared::{ChangeAction, ChangeEvent};
use tokio::sync::broadcast;

/// Broadcast channel capacity
///
/// Sized for bursts of table-close cascades (orders + items + tokens per
/// table); a lagging subscriber re-fetches anyway, so drops are tolerable.
const FEED_CAPACITY: usize = 4096;

/// Resource names used on the feed (the logical table names)
pub mod resources {
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "order_items";
    pub const TABLE_TOKENS: &str = "table_tokens";
    pub const WAITER_CALLS: &str = "waiter_calls";
    pub const TABLES: &str = "tables";
    pub const PRODUCTS: &str = "products";
}

/// In-process change-feed hub
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(FEED_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all changes; callers filter by restaurant
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a change event
    ///
    /// A send error only means there is currently no subscriber; the write
    /// it announces has already been committed, so it is not an error for
    /// the caller.
    pub fn publish(&self, event: ChangeEvent) {
        let receivers = self.tx.receiver_count();
        if receivers == 0 {
            return;
        }
        if let Err(e) = self.tx.send(event) {
            tracing::warn!(error = %e, "Change feed send failed");
        }
    }

    /// Convenience: build and publish in one call
    pub fn notify(
        &self,
        resource: &str,
        action: ChangeAction,
        restaurant_id: &str,
        row_id: Option<String>,
    ) {
        self.publish(ChangeEvent::new(resource, action, restaurant_id, row_id));
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let feed = ChangeFeed::new();
        let mut rx = feed.subscribe();

        feed.notify(
            resources::ORDERS,
            ChangeAction::Update,
            "restaurants:r1",
            Some("orders:o1".to_string()),
        );

        let event = rx.recv().await.unwrap();
        assert_eq!(event.resource, "orders");
        assert_eq!(event.action, ChangeAction::Update);
        assert_eq!(event.restaurant_id, "restaurants:r1");
        assert_eq!(event.row_id.as_deref(), Some("orders:o1"));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let feed = ChangeFeed::new();
        // Must not panic or error
        feed.notify(resources::ORDERS, ChangeAction::Insert, "restaurants:r1", None);
    }
}
