//! Customer-facing notification side effects.
//!
//! The notifier is a [`mediator::DomainEventHandler`] that turns lifecycle
//! transitions into customer messages. It runs after the state change has
//! been committed; a notification failure is logged and counted but never
//! fails the originating command. Messages land in an in-memory outbox — a
//! real deployment would swap that for a mail or push gateway behind the
//! same handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::OrderEvent;
use mediator::{AppResult, DomainEventEnvelope, DomainEventHandler};
use tokio::sync::RwLock;

/// One message queued for a customer.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The order the message is about.
    pub order_id: AggregateId,

    /// Customer-facing text.
    pub message: String,

    /// When the notification was produced.
    pub at: DateTime<Utc>,
}

/// Sends customer notifications for the transitions customers care about:
/// placed, out for delivery, delivered, and cancelled.
#[derive(Clone, Default)]
pub struct CustomerNotifier {
    outbox: Arc<RwLock<Vec<Notification>>>,
}

impl CustomerNotifier {
    /// Creates a notifier with an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification produced so far.
    pub async fn sent(&self) -> Vec<Notification> {
        self.outbox.read().await.clone()
    }

    /// Returns the notifications produced for one order.
    pub async fn sent_for(&self, order_id: AggregateId) -> Vec<Notification> {
        self.outbox
            .read()
            .await
            .iter()
            .filter(|n| n.order_id == order_id)
            .cloned()
            .collect()
    }

    fn message_for(event: &OrderEvent) -> Option<String> {
        match event {
            OrderEvent::OrderPlaced(data) => Some(format!(
                "We received your order of {} pizza(s). Total: {}.",
                data.items.len(),
                data.items.iter().map(|item| item.base_price).sum::<domain::Money>()
            )),
            OrderEvent::OrderAssignedToDelivery(data) => Some(format!(
                "Your order is out for delivery with {}.",
                data.delivery_person.name
            )),
            OrderEvent::OrderDelivered(_) => {
                Some("Your order has been delivered. Enjoy!".to_string())
            }
            OrderEvent::OrderCancelled(data) => {
                Some(format!("Your order was cancelled: {}.", data.reason))
            }
            // Kitchen-internal transitions do not notify the customer.
            OrderEvent::OrderConfirmed(_)
            | OrderEvent::CookingStarted(_)
            | OrderEvent::OrderReady(_) => None,
        }
    }
}

#[async_trait]
impl DomainEventHandler for CustomerNotifier {
    fn name(&self) -> &'static str {
        "customer-notifier"
    }

    fn subscribed_to(&self) -> &'static [&'static str] {
        &[
            OrderEvent::PLACED,
            OrderEvent::ASSIGNED_TO_DELIVERY,
            OrderEvent::DELIVERED,
            OrderEvent::CANCELLED,
        ]
    }

    async fn handle(&self, event: &DomainEventEnvelope) -> AppResult<()> {
        let order_event: OrderEvent = event.decode()?;
        let Some(message) = Self::message_for(&order_event) else {
            return Ok(());
        };

        tracing::info!(
            order_id = %event.aggregate_id,
            event_type = %event.event_type,
            "sending customer notification"
        );
        metrics::counter!(
            "notifications_sent_total",
            "event_type" => event.event_type.clone()
        )
        .increment(1);

        self.outbox.write().await.push(Notification {
            order_id: event.aggregate_id,
            message,
            at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{CustomerId, LineItem, Money, Order, Performer, PizzaSize};
    use mediator::AggregateRoot;

    async fn feed(notifier: &CustomerNotifier, order: &Order) {
        for envelope in order.pending_events() {
            if notifier
                .subscribed_to()
                .contains(&envelope.event_type.as_str())
            {
                notifier.handle(envelope).await.unwrap();
            }
        }
    }

    fn delivered_order() -> Order {
        let mut order = Order::place(
            AggregateId::new(),
            CustomerId::new(),
            vec![
                LineItem::new("Margherita", PizzaSize::Medium, Money::from_cents(1050)),
                LineItem::new("Pepperoni", PizzaSize::Large, Money::from_cents(1375)),
            ],
        )
        .unwrap();
        order.confirm().unwrap();
        order
            .start_cooking(Performer::new("chef-1", "Chef One"))
            .unwrap();
        order
            .mark_ready(Performer::new("chef-1", "Chef One"))
            .unwrap();
        order
            .assign_to_delivery(Performer::new("d-2", "Dana Driver"))
            .unwrap();
        order.deliver(Performer::new("d-2", "Dana Driver")).unwrap();
        order
    }

    #[tokio::test]
    async fn notifies_on_customer_relevant_transitions_only() {
        let notifier = CustomerNotifier::new();
        let order = delivered_order();
        feed(&notifier, &order).await;

        let sent = notifier.sent_for(order.id().unwrap()).await;
        // Placed, out-for-delivery, delivered; no kitchen-internal messages.
        assert_eq!(sent.len(), 3);
        assert!(sent[0].message.contains("2 pizza(s)"));
        assert!(sent[0].message.contains("$24.25"));
        assert!(sent[1].message.contains("Dana Driver"));
        assert!(sent[2].message.contains("delivered"));
    }

    #[tokio::test]
    async fn cancellation_messages_carry_the_reason() {
        let notifier = CustomerNotifier::new();
        let mut order = Order::place(
            AggregateId::new(),
            CustomerId::new(),
            vec![LineItem::new(
                "Margherita",
                PizzaSize::Medium,
                Money::from_cents(1050),
            )],
        )
        .unwrap();
        order.cancel("oven broke", Performer::system()).unwrap();
        feed(&notifier, &order).await;

        let sent = notifier.sent_for(order.id().unwrap()).await;
        assert_eq!(sent.len(), 2);
        assert!(sent[1].message.contains("oven broke"));
    }
}
