//! Server construction and wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};

use crate::domain::{CategoryService, CustomerService, OrderService, ProductService};
use crate::inbound::http::categories::{
    category_average_price, category_descendants, category_tree, create_category, delete_category,
    get_category, list_categories, set_category_parent, update_category,
};
use crate::inbound::http::customers::{
    current_customer, register_customer, update_current_customer,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::orders::{
    cancel_order, fulfil_order, get_order, list_orders, order_statistics, place_order,
};
use crate::inbound::http::products::{
    create_product, delete_product, get_product, list_products, update_product,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::notify::LogNotificationDispatcher;
use crate::outbound::persistence::MemoryStore;

/// Wire the domain services over a shared store and bundle them for handlers.
#[must_use]
pub fn build_http_state(store: MemoryStore, dispatch_timeout: Duration) -> HttpState {
    let store = Arc::new(store);
    let categories = Arc::new(CategoryService::new(Arc::clone(&store), Arc::clone(&store)));
    let products = Arc::new(ProductService::new(Arc::clone(&store), Arc::clone(&store)));
    let orders = Arc::new(OrderService::new(
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::clone(&store),
        Arc::new(LogNotificationDispatcher::new()),
        dispatch_timeout,
    ));
    let customers = Arc::new(CustomerService::new(Arc::clone(&store)));
    HttpState {
        categories: categories.clone(),
        categories_query: categories,
        products: products.clone(),
        products_query: products,
        orders: orders.clone(),
        orders_query: orders,
        customers: customers.clone(),
        customers_query: customers,
    }
}

/// Register every route on an app.
///
/// Fixed-path routes (`/categories/tree`, `/orders/statistics`) are
/// registered before their parameterised siblings so they are not captured
/// as `{id}` values.
pub fn configure_app(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(register_customer)
            .service(current_customer)
            .service(update_current_customer)
            .service(list_categories)
            .service(create_category)
            .service(category_tree)
            .service(category_descendants)
            .service(category_average_price)
            .service(set_category_parent)
            .service(get_category)
            .service(update_category)
            .service(delete_category)
            .service(list_products)
            .service(create_product)
            .service(get_product)
            .service(update_product)
            .service(delete_product)
            .service(place_order)
            .service(list_orders)
            .service(order_statistics)
            .service(fulfil_order)
            .service(cancel_order)
            .service(get_order),
    )
    .service(ready)
    .service(live);
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(
        MemoryStore::new(),
        config.dispatch_timeout,
    ));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(server_health_state.clone())
            .app_data(http_state.clone())
            .configure(configure_app)
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
