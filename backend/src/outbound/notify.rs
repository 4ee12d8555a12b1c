//! Notification dispatcher adapters.

use async_trait::async_trait;
use tracing::info;

use crate::domain::order::OrderPlacedEvent;
use crate::domain::ports::{DispatchError, NotificationDispatcher};

/// Dispatcher that records order-placed events in the structured log.
///
/// Stands in for the outbound channel (email, SMS) in deployments without
/// one configured; delivery infrastructure slots in behind the same port.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationDispatcher;

impl LogNotificationDispatcher {
    /// Create a new dispatcher.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LogNotificationDispatcher {
    async fn dispatch(&self, event: &OrderPlacedEvent) -> Result<(), DispatchError> {
        info!(
            order = %event.order_number,
            customer = %event.customer_id,
            total = %event.total,
            items = event.items.len(),
            "order placed notification"
        );
        Ok(())
    }
}
