//! Order placement, lifecycle, and statistics use-cases.
//!
//! Placement is all-or-nothing: validation happens before any persistence
//! is touched, prices are snapshotted into the line items, and the stock
//! decrement plus order insert commit as one atomic unit in the repository.
//! The order-placed notification is fire-and-forget on a spawned task; its
//! failure or timeout never reaches the caller.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::error::Error;
use super::ids::{CustomerId, OrderId, ProductId};
use super::order::{Order, OrderItem, OrderStatistics, OrderStatus};
use super::ports::{
    CustomerRepository, NotificationDispatcher, OrderCommand, OrderCommitError, OrderLine,
    OrderQuery, OrderRepository, PlaceOrderRequest, ProductRepository, TransitionError,
};

/// Order service backed by the order, product, and customer repositories
/// plus the notification dispatcher.
#[derive(Clone)]
pub struct OrderService<O, P, C, N> {
    orders: Arc<O>,
    products: Arc<P>,
    customers: Arc<C>,
    dispatcher: Arc<N>,
    dispatch_timeout: Duration,
}

impl<O, P, C, N> OrderService<O, P, C, N> {
    /// Create a new service with the given collaborators.
    pub fn new(
        orders: Arc<O>,
        products: Arc<P>,
        customers: Arc<C>,
        dispatcher: Arc<N>,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            orders,
            products,
            customers,
            dispatcher,
            dispatch_timeout,
        }
    }
}

fn order_not_found(id: &OrderId) -> Error {
    Error::not_found("order not found").with_details(json!({
        "entity": "order",
        "id": id.to_string(),
    }))
}

fn line_product_not_found(id: &ProductId) -> Error {
    Error::not_found("product not found").with_details(json!({
        "entity": "product",
        "productId": id.to_string(),
    }))
}

fn insufficient_stock(product_id: &ProductId, requested: u32, available: u32) -> Error {
    Error::insufficient_stock("insufficient stock for product").with_details(json!({
        "productId": product_id.to_string(),
        "requested": requested,
        "available": available,
    }))
}

/// Validate request shape before anything touches persistence.
fn validate_request(request: &PlaceOrderRequest) -> Result<(), Error> {
    if request.shipping_address.trim().is_empty() {
        return Err(
            Error::invalid_request("shipping address must not be empty").with_details(json!({
                "field": "shippingAddress",
                "code": "missing_field",
            })),
        );
    }
    if request.items.is_empty() {
        return Err(
            Error::invalid_request("order must contain at least one item").with_details(json!({
                "field": "items",
                "code": "empty_items",
            })),
        );
    }
    let mut seen: Vec<ProductId> = Vec::with_capacity(request.items.len());
    for (index, line) in request.items.iter().enumerate() {
        if line.quantity == 0 {
            return Err(
                Error::invalid_request("quantity must be positive").with_details(json!({
                    "field": "items",
                    "index": index,
                    "productId": line.product_id.to_string(),
                    "code": "non_positive_quantity",
                })),
            );
        }
        if seen.contains(&line.product_id) {
            return Err(
                Error::invalid_request("duplicate product in order").with_details(json!({
                    "field": "items",
                    "index": index,
                    "productId": line.product_id.to_string(),
                    "code": "duplicate_product",
                })),
            );
        }
        seen.push(line.product_id);
    }
    Ok(())
}

impl<O, P, C, N> OrderService<O, P, C, N>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CustomerRepository,
    N: NotificationDispatcher + 'static,
{
    async fn ensure_customer_exists(&self, customer: &CustomerId) -> Result<(), Error> {
        if self.customers.find_by_id(customer).await?.is_none() {
            return Err(Error::not_found("customer not found").with_details(json!({
                "entity": "customer",
                "id": customer.to_string(),
            })));
        }
        Ok(())
    }

    /// Resolve each line against the catalog and snapshot prices.
    async fn build_items(&self, lines: &[OrderLine]) -> Result<Vec<OrderItem>, Error> {
        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .products
                .find_by_id(&line.product_id)
                .await?
                .ok_or_else(|| line_product_not_found(&line.product_id))?;
            if product.stock_quantity < line.quantity {
                return Err(insufficient_stock(
                    &line.product_id,
                    line.quantity,
                    product.stock_quantity,
                ));
            }
            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                sku: product.sku,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }
        Ok(items)
    }

    fn map_commit_error(err: OrderCommitError) -> Error {
        match err {
            OrderCommitError::ProductMissing(id) => line_product_not_found(&id),
            OrderCommitError::InsufficientStock {
                product_id,
                requested,
                available,
            } => insufficient_stock(&product_id, requested, available),
            OrderCommitError::Storage(err) => err.into(),
        }
    }

    fn map_transition_error(id: &OrderId, err: TransitionError) -> Error {
        match err {
            TransitionError::NotFound(id) => order_not_found(&id),
            TransitionError::InvalidState { actual, expected } => {
                Error::conflict("order is not in a state that allows this transition")
                    .with_details(json!({
                        "orderId": id.to_string(),
                        "status": actual.as_str(),
                        "expected": expected.as_str(),
                    }))
            }
            TransitionError::Storage(err) => err.into(),
        }
    }

    /// Hand the order-placed event to the dispatcher off the critical path.
    fn notify(&self, order: &Order) {
        let event = order.placed_event();
        let dispatcher = Arc::clone(&self.dispatcher);
        let timeout = self.dispatch_timeout;
        tokio::spawn(async move {
            match tokio::time::timeout(timeout, dispatcher.dispatch(&event)).await {
                Ok(Ok(())) => {
                    debug!(order = %event.order_number, "order notification dispatched");
                }
                Ok(Err(err)) => {
                    warn!(order = %event.order_number, error = %err, "order notification failed");
                }
                Err(_) => {
                    warn!(order = %event.order_number, "order notification timed out");
                }
            }
        });
    }

    /// Fetch an order, hiding other customers' orders behind `not_found`.
    async fn fetch_owned(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| order_not_found(id))?;
        if order.customer != *customer {
            return Err(order_not_found(id));
        }
        Ok(order)
    }

    async fn transition_owned(
        &self,
        id: &OrderId,
        customer: &CustomerId,
        to: OrderStatus,
    ) -> Result<Order, Error> {
        self.fetch_owned(id, customer).await?;
        let updated = self
            .orders
            .transition(id, OrderStatus::Created, to)
            .await
            .map_err(|err| Self::map_transition_error(id, err))?;
        info!(order = %updated.number, status = %updated.status, "order transitioned");
        Ok(updated)
    }
}

#[async_trait]
impl<O, P, C, N> OrderCommand for OrderService<O, P, C, N>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CustomerRepository,
    N: NotificationDispatcher + 'static,
{
    async fn place(&self, request: PlaceOrderRequest) -> Result<Order, Error> {
        validate_request(&request)?;
        self.ensure_customer_exists(&request.customer_id).await?;

        let items = self.build_items(&request.items).await?;
        let order = Order::place(
            request.customer_id,
            request.shipping_address,
            request.notes,
            items,
        );

        self.orders
            .commit_order(&order)
            .await
            .map_err(Self::map_commit_error)?;

        info!(
            order = %order.number,
            customer = %order.customer,
            total = %order.total,
            "order placed"
        );
        self.notify(&order);
        Ok(order)
    }

    async fn fulfil(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error> {
        self.transition_owned(id, customer, OrderStatus::Fulfilled)
            .await
    }

    async fn cancel(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error> {
        self.transition_owned(id, customer, OrderStatus::Cancelled)
            .await
    }
}

#[async_trait]
impl<O, P, C, N> OrderQuery for OrderService<O, P, C, N>
where
    O: OrderRepository,
    P: ProductRepository,
    C: CustomerRepository,
    N: NotificationDispatcher + 'static,
{
    async fn get(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error> {
        self.fetch_owned(id, customer).await
    }

    async fn list(&self, customer: &CustomerId) -> Result<Vec<Order>, Error> {
        Ok(self.orders.list_by_customer(customer).await?)
    }

    async fn statistics(&self, customer: Option<&CustomerId>) -> Result<OrderStatistics, Error> {
        let orders = match customer {
            Some(customer) => self.orders.list_by_customer(customer).await?,
            None => self.orders.list_all().await?,
        };
        Ok(OrderStatistics::from_orders(orders.iter()))
    }
}
