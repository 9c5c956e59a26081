//! Order domain for the pizza ordering system.
//!
//! This crate provides:
//! - the `Order` aggregate root and its lifecycle state machine
//!   (Pending → Confirmed → Cooking → Ready → Delivering → Delivered,
//!   with cancellation legal from every pre-delivery status)
//! - the order's domain events and pure-data state projection
//! - commands, queries, and the handlers that bind them to a repository
//!   and the request's unit of work

pub mod order;

pub use order::{
    AssignToDelivery, AssignToDeliveryHandler, CancelOrder, CancelOrderHandler, ConfirmOrder,
    ConfirmOrderHandler, CustomerId, DeliverOrder, DeliverOrderHandler, GetOrder, GetOrderHandler,
    LineItem, LineItemDto, MarkOrderReady, MarkOrderReadyHandler, Money, Order, OrderDto,
    OrderError, OrderEvent, OrderState, OrderStatus, Performer, PizzaSize, PlaceOrder,
    PlaceOrderHandler, StartCooking, StartCookingHandler,
};
