//! Order aggregate root.

use common::AggregateId;
use mediator::{AggregateRoot, DomainEventEnvelope, Version};
use serde::{Deserialize, Serialize};

use super::events::OrderEvent;
use super::state::{OrderState, OrderStatus};
use super::{CustomerId, LineItem, Money, OrderError, Performer};

/// Order aggregate root.
///
/// Owns one [`OrderState`] and the command surface of the order lifecycle.
/// Every business method validates its status precondition, records exactly
/// one event (stamping its version and buffering its envelope for the unit
/// of work), and immediately applies it — the event is the single source of
/// truth for the resulting mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Order {
    state: OrderState,

    /// Version for optimistic concurrency; equals the number of recorded
    /// events.
    #[serde(default)]
    version: Version,

    /// Events recorded since the last dispatch; not part of durable state.
    #[serde(skip)]
    pending: Vec<DomainEventEnvelope>,
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.state.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn pending_events(&self) -> &[DomainEventEnvelope] {
        &self.pending
    }

    fn clear_pending_events(&mut self) {
        self.pending.clear();
    }

    fn apply(&mut self, event: Self::Event) {
        self.state.apply(&event);
    }
}

// Query methods
impl Order {
    /// Returns the order's state projection.
    pub fn state(&self) -> &OrderState {
        &self.state
    }

    /// Returns the current lifecycle status.
    pub fn status(&self) -> OrderStatus {
        self.state.status
    }

    /// Returns the customer who placed the order.
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.state.customer_id
    }

    /// Returns the ordered line items.
    pub fn items(&self) -> &[LineItem] {
        &self.state.items
    }

    /// Returns the order total, derived from the line items.
    pub fn total(&self) -> Money {
        self.state.total()
    }

    /// Returns true if the order reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.state.status.is_terminal()
    }
}

// Command methods
impl Order {
    /// Places a new order, the only way to bring an order into existence.
    pub fn place(
        order_id: AggregateId,
        customer_id: CustomerId,
        items: Vec<LineItem>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoLineItems);
        }

        let mut order = Order::default();
        let event = order.record(OrderEvent::placed(order_id, customer_id, items))?;
        order.apply(event);
        Ok(order)
    }

    /// Confirms a pending order.
    pub fn confirm(&mut self) -> Result<(), OrderError> {
        if !self.state.status.can_confirm() {
            return Err(self.illegal("confirm"));
        }

        let event = self.record(OrderEvent::confirmed())?;
        self.apply(event);
        Ok(())
    }

    /// Starts cooking a confirmed order, recording the chef who took it.
    pub fn start_cooking(&mut self, chef: Performer) -> Result<(), OrderError> {
        if !self.state.status.can_start_cooking() {
            return Err(self.illegal("start cooking"));
        }

        let event = self.record(OrderEvent::cooking_started(chef))?;
        self.apply(event);
        Ok(())
    }

    /// Marks a cooking order as ready for delivery.
    pub fn mark_ready(&mut self, ready_by: Performer) -> Result<(), OrderError> {
        if !self.state.status.can_mark_ready() {
            return Err(self.illegal("mark ready"));
        }

        let event = self.record(OrderEvent::ready(ready_by))?;
        self.apply(event);
        Ok(())
    }

    /// Hands a ready order to a delivery person.
    pub fn assign_to_delivery(&mut self, delivery_person: Performer) -> Result<(), OrderError> {
        if !self.state.status.can_assign_to_delivery() {
            return Err(self.illegal("assign to delivery"));
        }

        let event = self.record(OrderEvent::assigned_to_delivery(delivery_person))?;
        self.apply(event);
        Ok(())
    }

    /// Completes delivery.
    ///
    /// `delivered_by` is the actual performer; it may legitimately differ
    /// from the assigned delivery person (manager override) and is recorded
    /// as given.
    pub fn deliver(&mut self, delivered_by: Performer) -> Result<(), OrderError> {
        if !self.state.status.can_deliver() {
            return Err(self.illegal("deliver"));
        }

        let event = self.record(OrderEvent::delivered(delivered_by))?;
        self.apply(event);
        Ok(())
    }

    /// Cancels the order; legal from every pre-delivery status.
    pub fn cancel(
        &mut self,
        reason: impl Into<String>,
        cancelled_by: Performer,
    ) -> Result<(), OrderError> {
        if !self.state.status.can_cancel() {
            return Err(self.illegal("cancel"));
        }

        let event = self.record(OrderEvent::cancelled(reason, cancelled_by))?;
        self.apply(event);
        Ok(())
    }

    /// Appends the event to the pending list, stamps its version, and
    /// returns it for immediate application.
    fn record(&mut self, event: OrderEvent) -> Result<OrderEvent, OrderError> {
        let aggregate_id = match &event {
            OrderEvent::OrderPlaced(data) => data.order_id,
            _ => self.state.id.ok_or(OrderError::NotPlaced)?,
        };

        let version = self.version.next();
        let envelope =
            DomainEventEnvelope::record(aggregate_id, Self::aggregate_type(), version, &event)?;
        self.version = version;
        self.pending.push(envelope);
        Ok(event)
    }

    fn illegal(&self, action: &'static str) -> OrderError {
        OrderError::IllegalTransition {
            action,
            status: self.state.status,
        }
    }
}
