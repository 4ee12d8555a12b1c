//! Order API handlers.
//!
//! ```text
//! POST /api/v1/orders {"shippingAddress":"1 Main St","items":[{"productId":"…","quantity":2}]}
//! GET  /api/v1/orders
//! GET  /api/v1/orders/statistics
//! POST /api/v1/orders/{id}/fulfil
//! ```
//!
//! All order endpoints require a [`Principal`]; customers only ever see
//! their own orders.

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{OrderLine, PlaceOrderRequest};
use crate::domain::{Error, Order, OrderId, OrderItem, OrderStatistics, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const ID_FIELD: FieldName = FieldName::new("id");
const PRODUCT_ID_FIELD: FieldName = FieldName::new("productId");

/// One order line as returned by the API.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub product_id: String,
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    /// Unit price at placement time, as a decimal string.
    pub unit_price: String,
    /// `unitPrice × quantity`, as a decimal string.
    pub line_total: String,
}

impl From<OrderItem> for OrderItemDto {
    fn from(item: OrderItem) -> Self {
        let line_total = item.line_total();
        Self {
            product_id: item.product_id.to_string(),
            name: item.name,
            sku: item.sku,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: line_total.to_string(),
        }
    }
}

/// Order representation returned by the API.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub shipping_address: String,
    pub notes: Option<String>,
    /// `created`, `fulfilled`, or `cancelled`.
    pub status: String,
    /// Order total, as a decimal string.
    pub total: String,
    pub created_at: String,
    pub items: Vec<OrderItemDto>,
}

impl From<Order> for OrderDto {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            number: order.number,
            customer_id: order.customer.to_string(),
            shipping_address: order.shipping_address,
            notes: order.notes,
            status: order.status.to_string(),
            total: order.total.to_string(),
            created_at: order.created_at.to_rfc3339(),
            items: order.items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}

/// Aggregated order figures returned by `statistics`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatisticsDto {
    pub order_count: u64,
    /// Sum of order totals, as a decimal string.
    pub total_revenue: String,
    /// Mean order total, as a decimal string.
    pub average_order_value: String,
}

impl From<OrderStatistics> for OrderStatisticsDto {
    fn from(stats: OrderStatistics) -> Self {
        Self {
            order_count: stats.order_count,
            total_revenue: stats.total_revenue.to_string(),
            average_order_value: stats.average_order_value.to_string(),
        }
    }
}

/// One requested line in `POST /api/v1/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineBody {
    pub product_id: String,
    pub quantity: u32,
}

/// Body for `POST /api/v1/orders`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderBody {
    pub shipping_address: String,
    pub notes: Option<String>,
    pub items: Vec<OrderLineBody>,
}

/// Query parameters for `GET /api/v1/orders/statistics`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsQuery {
    /// `mine` (default) or `all`.
    pub scope: Option<String>,
}

fn order_id(raw: &str) -> Result<OrderId, Error> {
    parse_uuid(raw, ID_FIELD).map(OrderId::from)
}

fn order_lines(items: Vec<OrderLineBody>) -> Result<Vec<OrderLine>, Error> {
    items
        .into_iter()
        .map(|line| {
            Ok(OrderLine {
                product_id: parse_uuid(&line.product_id, PRODUCT_ID_FIELD)
                    .map(ProductId::from)?,
                quantity: line.quantity,
            })
        })
        .collect()
}

/// Place an order for the authenticated customer.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = PlaceOrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Customer or product not found", body = Error),
        (status = 409, description = "Insufficient stock", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<PlaceOrderBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let placed = state
        .orders
        .place(PlaceOrderRequest {
            customer_id: principal.customer_id,
            shipping_address: body.shipping_address,
            notes: body.notes,
            items: order_lines(body.items)?,
        })
        .await?;
    Ok(HttpResponse::Created().json(OrderDto::from(placed)))
}

/// List the authenticated customer's orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = [OrderDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<Vec<OrderDto>>> {
    let orders = state.orders_query.list(&principal.customer_id).await?;
    Ok(web::Json(orders.into_iter().map(OrderDto::from).collect()))
}

/// Aggregated order figures, scoped to the caller or the whole store.
#[utoipa::path(
    get,
    path = "/api/v1/orders/statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Order statistics", body = OrderStatisticsDto),
        (status = 400, description = "Invalid scope", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "orderStatistics"
)]
#[get("/orders/statistics")]
pub async fn order_statistics(
    state: web::Data<HttpState>,
    principal: Principal,
    query: web::Query<StatisticsQuery>,
) -> ApiResult<web::Json<OrderStatisticsDto>> {
    let scope = query.into_inner().scope;
    let stats = match scope.as_deref() {
        None | Some("mine") => {
            state
                .orders_query
                .statistics(Some(&principal.customer_id))
                .await?
        }
        Some("all") => state.orders_query.statistics(None).await?,
        Some(other) => {
            return Err(
                Error::invalid_request("scope must be 'mine' or 'all'").with_details(json!({
                    "field": "scope",
                    "value": other,
                    "code": "invalid_value",
                })),
            );
        }
    };
    Ok(web::Json(stats.into()))
}

/// Fetch one of the caller's orders.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = OrderDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderDto>> {
    let id = order_id(&path.into_inner())?;
    let order = state
        .orders_query
        .get(&id, &principal.customer_id)
        .await?;
    Ok(web::Json(order.into()))
}

/// Mark one of the caller's orders as fulfilled.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/fulfil",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Fulfilled order", body = OrderDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order not in created state", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "fulfilOrder"
)]
#[post("/orders/{id}/fulfil")]
pub async fn fulfil_order(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderDto>> {
    let id = order_id(&path.into_inner())?;
    let order = state.orders.fulfil(&id, &principal.customer_id).await?;
    Ok(web::Json(order.into()))
}

/// Cancel one of the caller's orders.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cancelled order", body = OrderDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Order not in created state", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["orders"],
    operation_id = "cancelOrder"
)]
#[post("/orders/{id}/cancel")]
pub async fn cancel_order(
    state: web::Data<HttpState>,
    principal: Principal,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderDto>> {
    let id = order_id(&path.into_inner())?;
    let order = state.orders.cancel(&id, &principal.customer_id).await?;
    Ok(web::Json(order.into()))
}
