//! Order status and the pure-data state projection.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use super::events::{
    CookingStartedData, OrderAssignedToDeliveryData, OrderCancelledData, OrderConfirmedData,
    OrderDeliveredData, OrderEvent, OrderPlacedData, OrderReadyData,
};
use super::{CustomerId, LineItem, Money, Performer};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ─► Confirmed ─► Cooking ─► Ready ─► Delivering ─► Delivered
///    │           │           │         │           │
///    └───────────┴───────────┴─────────┴───────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order has been placed and awaits kitchen confirmation.
    #[default]
    Pending,

    /// The kitchen accepted the order.
    Confirmed,

    /// A chef is cooking the order.
    Cooking,

    /// The order is cooked and waiting for a delivery assignment.
    Ready,

    /// The order is out for delivery.
    Delivering,

    /// The order reached the customer (terminal state).
    Delivered,

    /// The order was cancelled (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if the order can be confirmed in this status.
    pub fn can_confirm(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if cooking can start in this status.
    pub fn can_start_cooking(&self) -> bool {
        matches!(self, OrderStatus::Confirmed)
    }

    /// Returns true if the order can be marked ready in this status.
    pub fn can_mark_ready(&self) -> bool {
        matches!(self, OrderStatus::Cooking)
    }

    /// Returns true if the order can be assigned to delivery in this status.
    pub fn can_assign_to_delivery(&self) -> bool {
        matches!(self, OrderStatus::Ready)
    }

    /// Returns true if the order can be delivered in this status.
    pub fn can_deliver(&self) -> bool {
        matches!(self, OrderStatus::Delivering)
    }

    /// Returns true if the order can be cancelled in this status.
    ///
    /// Cancellation is legal from every pre-delivery status.
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Cooking => "Cooking",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivering => "Delivering",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pure-data projection of one order.
///
/// Fields are mutated exclusively by the per-event handlers below; a "who"
/// or "when" field is set only by the event that causes its transition,
/// never speculatively. The total is derived from the line items and never
/// stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderState {
    /// Order identifier; None until the order is placed.
    pub id: Option<AggregateId>,

    /// The customer who placed the order.
    pub customer_id: Option<CustomerId>,

    /// Ordered pizzas; repeats are repeated items.
    pub items: Vec<LineItem>,

    /// Current lifecycle status.
    pub status: OrderStatus,

    pub placed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cooking_started_at: Option<DateTime<Utc>>,
    pub chef: Option<Performer>,
    pub ready_at: Option<DateTime<Utc>>,
    pub ready_by: Option<Performer>,
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    pub delivery_person: Option<Performer>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by: Option<Performer>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl OrderState {
    /// Routes an event to its handler.
    ///
    /// The match is exhaustive: adding an event variant without a handler is
    /// a compile error, not a silently ignored event.
    pub fn apply(&mut self, event: &OrderEvent) {
        match event {
            OrderEvent::OrderPlaced(data) => self.on_placed(data),
            OrderEvent::OrderConfirmed(data) => self.on_confirmed(data),
            OrderEvent::CookingStarted(data) => self.on_cooking_started(data),
            OrderEvent::OrderReady(data) => self.on_ready(data),
            OrderEvent::OrderAssignedToDelivery(data) => self.on_assigned_to_delivery(data),
            OrderEvent::OrderDelivered(data) => self.on_delivered(data),
            OrderEvent::OrderCancelled(data) => self.on_cancelled(data),
        }
    }

    /// Total amount: the sum of line-item prices, always computed.
    pub fn total(&self) -> Money {
        self.items.iter().map(|item| item.base_price).sum()
    }

    fn on_placed(&mut self, data: &OrderPlacedData) {
        self.id = Some(data.order_id);
        self.customer_id = Some(data.customer_id);
        self.items = data.items.clone();
        self.status = OrderStatus::Pending;
        self.placed_at = Some(data.placed_at);
    }

    fn on_confirmed(&mut self, data: &OrderConfirmedData) {
        self.status = OrderStatus::Confirmed;
        self.confirmed_at = Some(data.confirmed_at);
    }

    fn on_cooking_started(&mut self, data: &CookingStartedData) {
        self.status = OrderStatus::Cooking;
        self.cooking_started_at = Some(data.cooking_started_at);
        self.chef = Some(data.chef.clone());
    }

    fn on_ready(&mut self, data: &OrderReadyData) {
        self.status = OrderStatus::Ready;
        self.ready_at = Some(data.ready_at);
        self.ready_by = Some(data.ready_by.clone());
    }

    fn on_assigned_to_delivery(&mut self, data: &OrderAssignedToDeliveryData) {
        self.status = OrderStatus::Delivering;
        self.out_for_delivery_at = Some(data.out_for_delivery_at);
        self.delivery_person = Some(data.delivery_person.clone());
    }

    fn on_delivered(&mut self, data: &OrderDeliveredData) {
        self.status = OrderStatus::Delivered;
        self.delivered_at = Some(data.delivered_at);
        self.delivered_by = Some(data.delivered_by.clone());
    }

    fn on_cancelled(&mut self, data: &OrderCancelledData) {
        self.status = OrderStatus::Cancelled;
        self.cancelled_at = Some(data.cancelled_at);
        self.cancellation_reason = Some(data.reason.clone());
    }
}
