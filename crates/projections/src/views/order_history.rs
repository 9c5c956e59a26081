//! Order history read model — the status timeline of every order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{OrderEvent, OrderStatus, Performer};
use mediator::{AppResult, DomainEventEnvelope, DomainEventHandler};
use tokio::sync::RwLock;

/// One step in an order's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The status the order entered.
    pub status: OrderStatus,

    /// When the transition happened.
    pub at: DateTime<Utc>,

    /// Who performed the transition, where the event records one.
    pub performed_by: Option<Performer>,
}

impl HistoryEntry {
    fn from_event(event: &OrderEvent) -> Self {
        match event {
            OrderEvent::OrderPlaced(data) => Self {
                status: OrderStatus::Pending,
                at: data.placed_at,
                performed_by: None,
            },
            OrderEvent::OrderConfirmed(data) => Self {
                status: OrderStatus::Confirmed,
                at: data.confirmed_at,
                performed_by: None,
            },
            OrderEvent::CookingStarted(data) => Self {
                status: OrderStatus::Cooking,
                at: data.cooking_started_at,
                performed_by: Some(data.chef.clone()),
            },
            OrderEvent::OrderReady(data) => Self {
                status: OrderStatus::Ready,
                at: data.ready_at,
                performed_by: Some(data.ready_by.clone()),
            },
            OrderEvent::OrderAssignedToDelivery(data) => Self {
                status: OrderStatus::Delivering,
                at: data.out_for_delivery_at,
                performed_by: Some(data.delivery_person.clone()),
            },
            OrderEvent::OrderDelivered(data) => Self {
                status: OrderStatus::Delivered,
                at: data.delivered_at,
                performed_by: Some(data.delivered_by.clone()),
            },
            OrderEvent::OrderCancelled(data) => Self {
                status: OrderStatus::Cancelled,
                at: data.cancelled_at,
                performed_by: Some(data.cancelled_by.clone()),
            },
        }
    }
}

/// Read model view of every order's status timeline.
#[derive(Clone, Default)]
pub struct OrderHistoryView {
    timelines: Arc<RwLock<HashMap<AggregateId, Vec<HistoryEntry>>>>,
}

impl OrderHistoryView {
    /// Creates a new empty history view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the timeline for one order, oldest entry first.
    pub async fn timeline(&self, order_id: AggregateId) -> Vec<HistoryEntry> {
        self.timelines
            .read()
            .await
            .get(&order_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns the number of orders with at least one entry.
    pub async fn order_count(&self) -> usize {
        self.timelines.read().await.len()
    }
}

#[async_trait]
impl DomainEventHandler for OrderHistoryView {
    fn name(&self) -> &'static str {
        "order-history"
    }

    fn subscribed_to(&self) -> &'static [&'static str] {
        OrderEvent::ALL
    }

    async fn handle(&self, event: &DomainEventEnvelope) -> AppResult<()> {
        let order_event: OrderEvent = event.decode()?;
        let entry = HistoryEntry::from_event(&order_event);

        let mut timelines = self.timelines.write().await;
        timelines
            .entry(event.aggregate_id)
            .or_default()
            .push(entry);
        Ok(())
    }
}
