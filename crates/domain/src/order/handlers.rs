//! Command and query handlers for the order lifecycle.
//!
//! Every command handler follows the same shape: load the aggregate, invoke
//! the business method, persist through the repository, then register the
//! aggregate with the request's unit of work so its events are published
//! once the pipeline confirms success. Attribution-bearing commands resolve
//! a missing performer to the system sentinel here, at the application
//! boundary; the aggregate itself always receives a concrete performer.

use std::sync::Arc;

use async_trait::async_trait;
use common::AggregateId;
use mediator::{
    AppError, AppResult, CommandHandler, QueryHandler, Repository, RequestContext,
};

use super::aggregate::Order;
use super::commands::{
    AssignToDelivery, CancelOrder, ConfirmOrder, DeliverOrder, MarkOrderReady, PlaceOrder,
    StartCooking,
};
use super::dto::OrderDto;
use super::queries::GetOrder;
use super::Performer;

type OrderRepository = Arc<dyn Repository<Order>>;

async fn load_order(repository: &dyn Repository<Order>, order_id: AggregateId) -> AppResult<Order> {
    repository
        .get(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("order {order_id} does not exist")))
}

/// Handles [`PlaceOrder`].
pub struct PlaceOrderHandler {
    repository: OrderRepository,
}

impl PlaceOrderHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<PlaceOrder> for PlaceOrderHandler {
    async fn handle(&self, command: PlaceOrder, ctx: &RequestContext) -> AppResult<OrderDto> {
        if command.items.is_empty() {
            return Err(AppError::validation("an order needs at least one line item"));
        }
        if self.repository.contains(command.order_id).await? {
            return Err(AppError::conflict(format!(
                "order {} already exists",
                command.order_id
            )));
        }

        let order = Order::place(command.order_id, command.customer_id, command.items)?;
        self.repository.add(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        tracing::info!(order_id = %command.order_id, total = %order.total(), "order placed");
        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`ConfirmOrder`].
pub struct ConfirmOrderHandler {
    repository: OrderRepository,
}

impl ConfirmOrderHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<ConfirmOrder> for ConfirmOrderHandler {
    async fn handle(&self, command: ConfirmOrder, ctx: &RequestContext) -> AppResult<OrderDto> {
        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.confirm()?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`StartCooking`].
pub struct StartCookingHandler {
    repository: OrderRepository,
}

impl StartCookingHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<StartCooking> for StartCookingHandler {
    async fn handle(&self, command: StartCooking, ctx: &RequestContext) -> AppResult<OrderDto> {
        let chef = command.chef.unwrap_or_else(Performer::system);

        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.start_cooking(chef)?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`MarkOrderReady`].
pub struct MarkOrderReadyHandler {
    repository: OrderRepository,
}

impl MarkOrderReadyHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<MarkOrderReady> for MarkOrderReadyHandler {
    async fn handle(&self, command: MarkOrderReady, ctx: &RequestContext) -> AppResult<OrderDto> {
        let ready_by = command.ready_by.unwrap_or_else(Performer::system);

        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.mark_ready(ready_by)?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`AssignToDelivery`].
pub struct AssignToDeliveryHandler {
    repository: OrderRepository,
}

impl AssignToDeliveryHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<AssignToDelivery> for AssignToDeliveryHandler {
    async fn handle(&self, command: AssignToDelivery, ctx: &RequestContext) -> AppResult<OrderDto> {
        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.assign_to_delivery(command.delivery_person)?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`DeliverOrder`].
pub struct DeliverOrderHandler {
    repository: OrderRepository,
}

impl DeliverOrderHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<DeliverOrder> for DeliverOrderHandler {
    async fn handle(&self, command: DeliverOrder, ctx: &RequestContext) -> AppResult<OrderDto> {
        let delivered_by = command.delivered_by.unwrap_or_else(Performer::system);

        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.deliver(delivered_by)?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`CancelOrder`].
pub struct CancelOrderHandler {
    repository: OrderRepository,
}

impl CancelOrderHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl CommandHandler<CancelOrder> for CancelOrderHandler {
    async fn handle(&self, command: CancelOrder, ctx: &RequestContext) -> AppResult<OrderDto> {
        if command.reason.trim().is_empty() {
            return Err(AppError::validation("a cancellation needs a reason"));
        }
        let cancelled_by = command.cancelled_by.unwrap_or_else(Performer::system);

        let mut order = load_order(self.repository.as_ref(), command.order_id).await?;
        order.cancel(command.reason, cancelled_by)?;
        self.repository.update(&order).await?;
        ctx.unit_of_work().register_aggregate(&order).await;

        tracing::info!(order_id = %command.order_id, "order cancelled");
        Ok(OrderDto::from_order(&order)?)
    }
}

/// Handles [`GetOrder`].
pub struct GetOrderHandler {
    repository: OrderRepository,
}

impl GetOrderHandler {
    pub fn new(repository: OrderRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl QueryHandler<GetOrder> for GetOrderHandler {
    async fn handle(&self, query: GetOrder, _ctx: &RequestContext) -> AppResult<OrderDto> {
        let order = load_order(self.repository.as_ref(), query.order_id).await?;
        Ok(OrderDto::from_order(&order)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{CustomerId, LineItem, Money, OrderStatus, PizzaSize};
    use mediator::{InMemoryRepository, RequestKind};

    fn repository() -> OrderRepository {
        Arc::new(InMemoryRepository::<Order>::new())
    }

    fn ctx() -> RequestContext {
        RequestContext::new(RequestKind::Command, "test")
    }

    fn margherita() -> Vec<LineItem> {
        vec![LineItem::new(
            "Margherita",
            PizzaSize::Medium,
            Money::from_cents(1050),
        )]
    }

    async fn place(repository: &OrderRepository) -> OrderDto {
        PlaceOrderHandler::new(Arc::clone(repository))
            .handle(
                PlaceOrder::for_customer(CustomerId::new(), margherita()),
                &ctx(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn place_persists_and_registers_the_order() {
        let repository = repository();
        let scope = ctx();

        let dto = PlaceOrderHandler::new(Arc::clone(&repository))
            .handle(
                PlaceOrder::for_customer(CustomerId::new(), margherita()),
                &scope,
            )
            .await
            .unwrap();

        assert_eq!(dto.status, OrderStatus::Pending);
        assert!(repository.contains(dto.order_id).await.unwrap());
        assert_eq!(scope.unit_of_work().registered_aggregates().await, 1);
        assert_eq!(scope.unit_of_work().domain_events().await.len(), 1);
    }

    #[tokio::test]
    async fn place_with_no_items_is_a_validation_failure() {
        let repository = Arc::new(InMemoryRepository::<Order>::new());
        let handler_repo: OrderRepository = repository.clone();
        let error = PlaceOrderHandler::new(handler_repo)
            .handle(PlaceOrder::for_customer(CustomerId::new(), vec![]), &ctx())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "validation");
        assert!(repository.is_empty().await);
    }

    #[tokio::test]
    async fn placing_the_same_order_twice_is_a_conflict() {
        let repository = repository();
        let placed = place(&repository).await;

        let error = PlaceOrderHandler::new(Arc::clone(&repository))
            .handle(
                PlaceOrder::new(placed.order_id, CustomerId::new(), margherita()),
                &ctx(),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "conflict");
    }

    #[tokio::test]
    async fn confirm_updates_the_stored_order() {
        let repository = repository();
        let placed = place(&repository).await;

        let dto = ConfirmOrderHandler::new(Arc::clone(&repository))
            .handle(ConfirmOrder::new(placed.order_id), &ctx())
            .await
            .unwrap();
        assert_eq!(dto.status, OrderStatus::Confirmed);

        let stored = repository.get(placed.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn transitions_on_missing_orders_are_not_found() {
        let repository = repository();
        let error = ConfirmOrderHandler::new(Arc::clone(&repository))
            .handle(ConfirmOrder::new(AggregateId::new()), &ctx())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "not_found");
    }

    #[tokio::test]
    async fn illegal_transitions_are_business_rule_failures() {
        let repository = repository();
        let placed = place(&repository).await;

        let error = AssignToDeliveryHandler::new(Arc::clone(&repository))
            .handle(
                AssignToDelivery::new(placed.order_id, Performer::new("d-2", "Dana Driver")),
                &ctx(),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "business_rule");
        // The stored order is untouched.
        let stored = repository.get(placed.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status(), OrderStatus::Pending);
    }

    #[tokio::test]
    async fn failed_transitions_register_nothing_with_the_unit_of_work() {
        let repository = repository();
        let placed = place(&repository).await;
        let scope = ctx();

        let _ = DeliverOrderHandler::new(Arc::clone(&repository))
            .handle(DeliverOrder::new(placed.order_id, None), &scope)
            .await;

        assert!(scope.unit_of_work().is_empty().await);
    }

    #[tokio::test]
    async fn missing_performers_resolve_to_the_system_sentinel() {
        let repository = repository();
        let placed = place(&repository).await;

        ConfirmOrderHandler::new(Arc::clone(&repository))
            .handle(ConfirmOrder::new(placed.order_id), &ctx())
            .await
            .unwrap();
        let dto = StartCookingHandler::new(Arc::clone(&repository))
            .handle(StartCooking::new(placed.order_id, None), &ctx())
            .await
            .unwrap();

        assert_eq!(dto.chef.unwrap().id, "system");
    }

    #[tokio::test]
    async fn cancel_requires_a_reason() {
        let repository = repository();
        let placed = place(&repository).await;

        let error = CancelOrderHandler::new(Arc::clone(&repository))
            .handle(CancelOrder::new(placed.order_id, "  ", None), &ctx())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "validation");
    }

    #[tokio::test]
    async fn get_order_returns_the_mapped_state() {
        let repository = repository();
        let placed = place(&repository).await;

        let dto = GetOrderHandler::new(Arc::clone(&repository))
            .handle(
                GetOrder::new(placed.order_id),
                &RequestContext::new(RequestKind::Query, "GetOrder"),
            )
            .await
            .unwrap();

        assert_eq!(dto.order_id, placed.order_id);
        assert_eq!(dto.total.cents(), 1050);
    }

    #[tokio::test]
    async fn get_order_for_a_missing_id_is_not_found() {
        let repository = repository();
        let error = GetOrderHandler::new(Arc::clone(&repository))
            .handle(
                GetOrder::new(AggregateId::new()),
                &RequestContext::new(RequestKind::Query, "GetOrder"),
            )
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "not_found");
    }
}
