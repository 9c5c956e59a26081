//! Order commands.

use common::AggregateId;
use mediator::Command;

use super::dto::OrderDto;
use super::{CustomerId, LineItem, Performer};

/// Command to place a new order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The order ID to create.
    pub order_id: AggregateId,

    /// The customer placing the order.
    pub customer_id: CustomerId,

    /// The ordered pizzas; must not be empty.
    pub items: Vec<LineItem>,
}

impl PlaceOrder {
    /// Creates a new PlaceOrder command.
    pub fn new(order_id: AggregateId, customer_id: CustomerId, items: Vec<LineItem>) -> Self {
        Self {
            order_id,
            customer_id,
            items,
        }
    }

    /// Creates a PlaceOrder command with a generated order ID.
    pub fn for_customer(customer_id: CustomerId, items: Vec<LineItem>) -> Self {
        Self::new(AggregateId::new(), customer_id, items)
    }
}

impl Command for PlaceOrder {
    type Output = OrderDto;
}

/// Command to confirm a pending order.
#[derive(Debug, Clone)]
pub struct ConfirmOrder {
    /// The order to confirm.
    pub order_id: AggregateId,
}

impl ConfirmOrder {
    /// Creates a new ConfirmOrder command.
    pub fn new(order_id: AggregateId) -> Self {
        Self { order_id }
    }
}

impl Command for ConfirmOrder {
    type Output = OrderDto;
}

/// Command to start cooking a confirmed order.
#[derive(Debug, Clone)]
pub struct StartCooking {
    /// The order to cook.
    pub order_id: AggregateId,

    /// The chef taking the order; None means an unauthenticated operation
    /// and resolves to the system performer at the handler boundary.
    pub chef: Option<Performer>,
}

impl StartCooking {
    /// Creates a new StartCooking command.
    pub fn new(order_id: AggregateId, chef: Option<Performer>) -> Self {
        Self { order_id, chef }
    }
}

impl Command for StartCooking {
    type Output = OrderDto;
}

/// Command to mark a cooking order as ready.
#[derive(Debug, Clone)]
pub struct MarkOrderReady {
    /// The order that is ready.
    pub order_id: AggregateId,

    /// Who marked it ready.
    pub ready_by: Option<Performer>,
}

impl MarkOrderReady {
    /// Creates a new MarkOrderReady command.
    pub fn new(order_id: AggregateId, ready_by: Option<Performer>) -> Self {
        Self { order_id, ready_by }
    }
}

impl Command for MarkOrderReady {
    type Output = OrderDto;
}

/// Command to hand a ready order to a delivery person.
#[derive(Debug, Clone)]
pub struct AssignToDelivery {
    /// The order to deliver.
    pub order_id: AggregateId,

    /// The delivery person taking the order.
    pub delivery_person: Performer,
}

impl AssignToDelivery {
    /// Creates a new AssignToDelivery command.
    pub fn new(order_id: AggregateId, delivery_person: Performer) -> Self {
        Self {
            order_id,
            delivery_person,
        }
    }
}

impl Command for AssignToDelivery {
    type Output = OrderDto;
}

/// Command to complete delivery of an order.
#[derive(Debug, Clone)]
pub struct DeliverOrder {
    /// The order being delivered.
    pub order_id: AggregateId,

    /// Who actually delivered the order; may differ from the assignee.
    pub delivered_by: Option<Performer>,
}

impl DeliverOrder {
    /// Creates a new DeliverOrder command.
    pub fn new(order_id: AggregateId, delivered_by: Option<Performer>) -> Self {
        Self {
            order_id,
            delivered_by,
        }
    }
}

impl Command for DeliverOrder {
    type Output = OrderDto;
}

/// Command to cancel an order before delivery.
#[derive(Debug, Clone)]
pub struct CancelOrder {
    /// The order to cancel.
    pub order_id: AggregateId,

    /// Reason for cancellation.
    pub reason: String,

    /// Who is cancelling the order.
    pub cancelled_by: Option<Performer>,
}

impl CancelOrder {
    /// Creates a new CancelOrder command.
    pub fn new(
        order_id: AggregateId,
        reason: impl Into<String>,
        cancelled_by: Option<Performer>,
    ) -> Self {
        Self {
            order_id,
            reason: reason.into(),
            cancelled_by,
        }
    }
}

impl Command for CancelOrder {
    type Output = OrderDto;
}
