//! Active orders read model — the board of non-terminal orders.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::{CustomerId, Money, OrderEvent, OrderStatus};
use mediator::{AppResult, DomainEventEnvelope, DomainEventHandler};
use tokio::sync::RwLock;

/// Summary of one active order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveOrderSummary {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub item_count: usize,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read model view of orders that still need attention.
///
/// Orders are removed from the board when they reach a terminal status
/// (Delivered or Cancelled).
#[derive(Clone, Default)]
pub struct ActiveOrdersView {
    orders: Arc<RwLock<HashMap<AggregateId, ActiveOrderSummary>>>,
}

impl ActiveOrdersView {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the summary of one active order.
    pub async fn get(&self, order_id: AggregateId) -> Option<ActiveOrderSummary> {
        self.orders.read().await.get(&order_id).cloned()
    }

    /// Gets all active orders.
    pub async fn all(&self) -> Vec<ActiveOrderSummary> {
        self.orders.read().await.values().cloned().collect()
    }

    /// Gets active orders in a given status.
    pub async fn by_status(&self, status: OrderStatus) -> Vec<ActiveOrderSummary> {
        self.orders
            .read()
            .await
            .values()
            .filter(|summary| summary.status == status)
            .cloned()
            .collect()
    }

    /// Returns the number of active orders.
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns true if no orders are active.
    pub async fn is_empty(&self) -> bool {
        self.orders.read().await.is_empty()
    }

    async fn transition(&self, order_id: AggregateId, status: OrderStatus, at: DateTime<Utc>) {
        let mut orders = self.orders.write().await;
        if let Some(summary) = orders.get_mut(&order_id) {
            summary.status = status;
            summary.updated_at = at;
        } else {
            // The placement event was never seen; nothing to update.
            tracing::debug!(%order_id, %status, "transition for unknown order ignored");
        }
    }
}

#[async_trait]
impl DomainEventHandler for ActiveOrdersView {
    fn name(&self) -> &'static str {
        "active-orders"
    }

    fn subscribed_to(&self) -> &'static [&'static str] {
        OrderEvent::ALL
    }

    async fn handle(&self, event: &DomainEventEnvelope) -> AppResult<()> {
        let order_event: OrderEvent = event.decode()?;
        let order_id = event.aggregate_id;

        match order_event {
            OrderEvent::OrderPlaced(data) => {
                let total = data.items.iter().map(|item| item.base_price).sum();
                self.orders.write().await.insert(
                    order_id,
                    ActiveOrderSummary {
                        order_id,
                        customer_id: data.customer_id,
                        status: OrderStatus::Pending,
                        item_count: data.items.len(),
                        total,
                        placed_at: data.placed_at,
                        updated_at: data.placed_at,
                    },
                );
            }
            OrderEvent::OrderConfirmed(data) => {
                self.transition(order_id, OrderStatus::Confirmed, data.confirmed_at)
                    .await;
            }
            OrderEvent::CookingStarted(data) => {
                self.transition(order_id, OrderStatus::Cooking, data.cooking_started_at)
                    .await;
            }
            OrderEvent::OrderReady(data) => {
                self.transition(order_id, OrderStatus::Ready, data.ready_at)
                    .await;
            }
            OrderEvent::OrderAssignedToDelivery(data) => {
                self.transition(order_id, OrderStatus::Delivering, data.out_for_delivery_at)
                    .await;
            }
            OrderEvent::OrderDelivered(_) | OrderEvent::OrderCancelled(_) => {
                self.orders.write().await.remove(&order_id);
            }
        }

        Ok(())
    }
}
