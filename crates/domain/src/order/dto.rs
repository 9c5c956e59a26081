//! Outward-facing order representation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use super::aggregate::Order;
use super::state::OrderStatus;
use super::value_objects::{CustomerId, LineItem, Money, Performer, PizzaSize};
use super::OrderError;

/// One line item as exposed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemDto {
    pub name: String,
    pub size: PizzaSize,
    pub base_price: Money,
    pub toppings: Vec<String>,
}

impl From<&LineItem> for LineItemDto {
    fn from(item: &LineItem) -> Self {
        Self {
            name: item.name.clone(),
            size: item.size,
            base_price: item.base_price,
            toppings: item.toppings.clone(),
        }
    }
}

/// Read-only view of one order returned by commands and queries.
///
/// The total is computed during mapping; it is never a stored field that
/// could drift from the line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDto {
    pub order_id: AggregateId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub items: Vec<LineItemDto>,
    pub total: Money,
    pub placed_at: DateTime<Utc>,
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

impl OrderDto {
    /// Maps a placed order's state into its outward representation.
    pub fn from_order(order: &Order) -> Result<Self, OrderError> {
        let state = order.state();
        let order_id = state.id.ok_or(OrderError::NotPlaced)?;
        let customer_id = state.customer_id.ok_or(OrderError::NotPlaced)?;
        let placed_at = state.placed_at.ok_or(OrderError::NotPlaced)?;

        Ok(Self {
            order_id,
            customer_id,
            status: state.status,
            items: state.items.iter().map(LineItemDto::from).collect(),
            total: state.total(),
            placed_at,
            confirmed_at: state.confirmed_at,
            cooking_started_at: state.cooking_started_at,
            chef: state.chef.clone(),
            ready_at: state.ready_at,
            ready_by: state.ready_by.clone(),
            out_for_delivery_at: state.out_for_delivery_at,
            delivery_person: state.delivery_person.clone(),
            delivered_at: state.delivered_at,
            delivered_by: state.delivered_by.clone(),
            cancelled_at: state.cancelled_at,
            cancellation_reason: state.cancellation_reason.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator::AggregateRoot;

    #[test]
    fn maps_a_placed_order() {
        let order = Order::place(
            AggregateId::new(),
            CustomerId::new(),
            vec![
                LineItem::new("Margherita", PizzaSize::Medium, Money::from_cents(1050)),
                LineItem::new("Pepperoni", PizzaSize::Large, Money::from_cents(1375)),
            ],
        )
        .unwrap();

        let dto = OrderDto::from_order(&order).unwrap();

        assert_eq!(Some(dto.order_id), order.id());
        assert_eq!(dto.status, OrderStatus::Pending);
        assert_eq!(dto.items.len(), 2);
        assert_eq!(dto.total.cents(), 2425);
        assert!(dto.chef.is_none());
    }

    #[test]
    fn an_unplaced_order_cannot_be_mapped() {
        let order = Order::default();
        assert!(matches!(
            OrderDto::from_order(&order),
            Err(OrderError::NotPlaced)
        ));
    }

    #[test]
    fn dto_serialization_roundtrip() {
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
        order.confirm().unwrap();

        let dto = OrderDto::from_order(&order).unwrap();
        let json = serde_json::to_string(&dto).unwrap();
        let deserialized: OrderDto = serde_json::from_str(&json).unwrap();
        assert_eq!(dto, deserialized);
    }
}
