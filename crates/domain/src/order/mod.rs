//! Order aggregate and related types.

mod aggregate;
mod commands;
mod dto;
mod events;
mod handlers;
mod queries;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use commands::{
    AssignToDelivery, CancelOrder, ConfirmOrder, DeliverOrder, MarkOrderReady, PlaceOrder,
    StartCooking,
};
pub use dto::{LineItemDto, OrderDto};
pub use events::{
    CookingStartedData, OrderAssignedToDeliveryData, OrderCancelledData, OrderConfirmedData,
    OrderDeliveredData, OrderEvent, OrderPlacedData, OrderReadyData,
};
pub use handlers::{
    AssignToDeliveryHandler, CancelOrderHandler, ConfirmOrderHandler, DeliverOrderHandler,
    GetOrderHandler, MarkOrderReadyHandler, PlaceOrderHandler, StartCookingHandler,
};
pub use queries::GetOrder;
pub use state::{OrderState, OrderStatus};
pub use value_objects::{CustomerId, LineItem, Money, Performer, PizzaSize};

use mediator::AppError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// An order needs at least one line item.
    #[error("an order needs at least one line item")]
    NoLineItems,

    /// The requested transition is illegal in the current status.
    #[error("cannot {action} an order in {status} status")]
    IllegalTransition {
        action: &'static str,
        status: OrderStatus,
    },

    /// A business method other than place was invoked on an unplaced order.
    #[error("order has not been placed")]
    NotPlaced,

    /// Recording an event failed to serialize.
    #[error("event encoding failed: {0}")]
    EventEncoding(#[from] serde_json::Error),
}

impl From<OrderError> for AppError {
    fn from(error: OrderError) -> Self {
        match &error {
            OrderError::NoLineItems => AppError::validation(error.to_string()),
            OrderError::IllegalTransition { .. } | OrderError::NotPlaced => {
                AppError::business_rule(error.to_string())
            }
            OrderError::EventEncoding(_) => AppError::unexpected(error.to_string()),
        }
    }
}
