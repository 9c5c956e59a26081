//! Order domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use mediator::DomainEvent;
use serde::{Deserialize, Serialize};

use super::{CustomerId, LineItem, Performer};

/// Events that can occur on an order aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    /// Order was placed by a customer.
    OrderPlaced(OrderPlacedData),

    /// Order was confirmed by the kitchen.
    OrderConfirmed(OrderConfirmedData),

    /// A chef started cooking the order.
    CookingStarted(CookingStartedData),

    /// The order is cooked and ready for delivery.
    OrderReady(OrderReadyData),

    /// The order was handed to a delivery person.
    OrderAssignedToDelivery(OrderAssignedToDeliveryData),

    /// The order reached the customer.
    OrderDelivered(OrderDeliveredData),

    /// The order was cancelled before delivery.
    OrderCancelled(OrderCancelledData),
}

impl OrderEvent {
    pub const PLACED: &'static str = "OrderPlaced";
    pub const CONFIRMED: &'static str = "OrderConfirmed";
    pub const COOKING_STARTED: &'static str = "CookingStarted";
    pub const READY: &'static str = "OrderReady";
    pub const ASSIGNED_TO_DELIVERY: &'static str = "OrderAssignedToDelivery";
    pub const DELIVERED: &'static str = "OrderDelivered";
    pub const CANCELLED: &'static str = "OrderCancelled";

    /// Every order event type, for subscribers that follow the whole
    /// lifecycle.
    pub const ALL: &'static [&'static str] = &[
        Self::PLACED,
        Self::CONFIRMED,
        Self::COOKING_STARTED,
        Self::READY,
        Self::ASSIGNED_TO_DELIVERY,
        Self::DELIVERED,
        Self::CANCELLED,
    ];
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => Self::PLACED,
            OrderEvent::OrderConfirmed(_) => Self::CONFIRMED,
            OrderEvent::CookingStarted(_) => Self::COOKING_STARTED,
            OrderEvent::OrderReady(_) => Self::READY,
            OrderEvent::OrderAssignedToDelivery(_) => Self::ASSIGNED_TO_DELIVERY,
            OrderEvent::OrderDelivered(_) => Self::DELIVERED,
            OrderEvent::OrderCancelled(_) => Self::CANCELLED,
        }
    }
}

/// Data for OrderPlaced event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlacedData {
    /// The unique order ID.
    pub order_id: AggregateId,

    /// The customer placing the order.
    pub customer_id: CustomerId,

    /// The ordered pizzas.
    pub items: Vec<LineItem>,

    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Data for OrderConfirmed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderConfirmedData {
    /// When the order was confirmed.
    pub confirmed_at: DateTime<Utc>,
}

/// Data for CookingStarted event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookingStartedData {
    /// When cooking started.
    pub cooking_started_at: DateTime<Utc>,

    /// The chef who started cooking.
    pub chef: Performer,
}

/// Data for OrderReady event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReadyData {
    /// When the order became ready.
    pub ready_at: DateTime<Utc>,

    /// Who marked the order ready.
    pub ready_by: Performer,
}

/// Data for OrderAssignedToDelivery event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAssignedToDeliveryData {
    /// When the order left for delivery.
    pub out_for_delivery_at: DateTime<Utc>,

    /// The assigned delivery person.
    pub delivery_person: Performer,
}

/// Data for OrderDelivered event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDeliveredData {
    /// When the order was delivered.
    pub delivered_at: DateTime<Utc>,

    /// Who actually delivered the order; may differ from the assignee.
    pub delivered_by: Performer,
}

/// Data for OrderCancelled event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelledData {
    /// When the order was cancelled.
    pub cancelled_at: DateTime<Utc>,

    /// Reason for cancellation.
    pub reason: String,

    /// Who cancelled the order.
    pub cancelled_by: Performer,
}

// Convenience constructors for events
impl OrderEvent {
    /// Creates an OrderPlaced event.
    pub fn placed(order_id: AggregateId, customer_id: CustomerId, items: Vec<LineItem>) -> Self {
        OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            customer_id,
            items,
            placed_at: Utc::now(),
        })
    }

    /// Creates an OrderConfirmed event.
    pub fn confirmed() -> Self {
        OrderEvent::OrderConfirmed(OrderConfirmedData {
            confirmed_at: Utc::now(),
        })
    }

    /// Creates a CookingStarted event.
    pub fn cooking_started(chef: Performer) -> Self {
        OrderEvent::CookingStarted(CookingStartedData {
            cooking_started_at: Utc::now(),
            chef,
        })
    }

    /// Creates an OrderReady event.
    pub fn ready(ready_by: Performer) -> Self {
        OrderEvent::OrderReady(OrderReadyData {
            ready_at: Utc::now(),
            ready_by,
        })
    }

    /// Creates an OrderAssignedToDelivery event.
    pub fn assigned_to_delivery(delivery_person: Performer) -> Self {
        OrderEvent::OrderAssignedToDelivery(OrderAssignedToDeliveryData {
            out_for_delivery_at: Utc::now(),
            delivery_person,
        })
    }

    /// Creates an OrderDelivered event.
    pub fn delivered(delivered_by: Performer) -> Self {
        OrderEvent::OrderDelivered(OrderDeliveredData {
            delivered_at: Utc::now(),
            delivered_by,
        })
    }

    /// Creates an OrderCancelled event.
    pub fn cancelled(reason: impl Into<String>, cancelled_by: Performer) -> Self {
        OrderEvent::OrderCancelled(OrderCancelledData {
            cancelled_at: Utc::now(),
            reason: reason.into(),
            cancelled_by,
        })
    }
}
