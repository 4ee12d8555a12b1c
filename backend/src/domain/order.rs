//! Order aggregate and the order-placed event.
//!
//! An order is an immutable historical record: every line item captures the
//! product's unit price at placement time and that snapshot is never
//! recomputed, no matter how the catalog changes afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{CustomerId, OrderId, ProductId};

/// Lifecycle of an order. `Created` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted and committed, awaiting fulfilment.
    Created,
    /// Shipped and done. Terminal.
    Fulfilled,
    /// Abandoned. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether no further transitions are allowed from this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }

    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Fulfilled) | (Self::Created, Self::Cancelled)
        )
    }

    /// Stable lowercase name, matching the wire format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single line of an order.
///
/// `unit_price`, `name`, and `sku` are snapshots taken when the order was
/// placed; they deliberately duplicate catalog data so the record stays
/// meaningful after price changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Product name at placement time.
    pub name: String,
    /// Product sku at placement time.
    pub sku: String,
    /// Units ordered; always positive.
    pub quantity: u32,
    /// Unit price at placement time.
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `unit_price × quantity` for this line.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A placed order with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Stable identifier.
    pub id: OrderId,
    /// Human-readable order number (`ORD-` prefix).
    pub number: String,
    /// Customer who placed the order.
    pub customer: CustomerId,
    /// Destination address.
    pub shipping_address: String,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Current lifecycle state.
    pub status: OrderStatus,
    /// Sum of all line totals, fixed point.
    pub total: Decimal,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Ordered line items.
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Assemble an order from already-validated inputs.
    ///
    /// Callers (the order service) guarantee a non-empty item list with
    /// positive quantities; the total is derived here and nowhere else.
    pub fn place(
        customer: CustomerId,
        shipping_address: String,
        notes: Option<String>,
        items: Vec<OrderItem>,
    ) -> Self {
        let id = OrderId::random();
        let total = items.iter().map(OrderItem::line_total).sum();
        Self {
            id,
            number: order_number(&id),
            customer,
            shipping_address,
            notes,
            status: OrderStatus::Created,
            total,
            created_at: Utc::now(),
            items,
        }
    }

    /// Build the event handed to the notification dispatcher.
    pub fn placed_event(&self) -> OrderPlacedEvent {
        OrderPlacedEvent {
            order_id: self.id,
            order_number: self.number.clone(),
            customer_id: self.customer,
            total: self.total,
            shipping_address: self.shipping_address.clone(),
            items: self
                .items
                .iter()
                .map(|item| OrderPlacedItem {
                    product_id: item.product_id,
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        }
    }
}

fn order_number(id: &OrderId) -> String {
    let hex = id.as_uuid().simple().to_string();
    let prefix = hex.get(..12).unwrap_or(&hex);
    format!("ORD-{}", prefix.to_uppercase())
}

/// Message emitted after a successful order commit.
///
/// Fire-and-forget: the dispatcher owns delivery, retries, and templating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlacedEvent {
    /// Order identifier.
    pub order_id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
    /// Order total.
    pub total: Decimal,
    /// Destination address.
    pub shipping_address: String,
    /// Line items in placement order.
    pub items: Vec<OrderPlacedItem>,
}

/// A line item as carried by [`OrderPlacedEvent`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlacedItem {
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Product sku at placement time.
    pub sku: String,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price at placement time.
    pub unit_price: Decimal,
}

/// Aggregated figures over a set of orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatistics {
    /// Number of orders considered.
    pub order_count: u64,
    /// Sum of order totals.
    pub total_revenue: Decimal,
    /// `total_revenue / order_count`, rounded to two decimal places.
    pub average_order_value: Decimal,
}

impl OrderStatistics {
    /// Aggregate statistics over `orders`; all zero when the set is empty.
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut order_count: u64 = 0;
        let mut total_revenue = Decimal::ZERO;
        for order in orders {
            order_count += 1;
            total_revenue += order.total;
        }
        let average_order_value = if order_count == 0 {
            Decimal::ZERO
        } else {
            (total_revenue / Decimal::from(order_count)).round_dp(2)
        };
        Self {
            order_count,
            total_revenue,
            average_order_value,
        }
    }
}
