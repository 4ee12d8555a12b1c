//! Order engine behaviour over the real store.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;

use backend::domain::ports::{
    CategoryCommand, CreateCategoryRequest, CreateProductRequest, CustomerCommand, OrderCommand,
    OrderLine, OrderQuery, PlaceOrderRequest, ProductCommand, ProductQuery, ProductRepository,
    RegisterCustomerRequest, UpdateProductRequest,
};
use backend::domain::{
    CategoryService, Customer, CustomerService, ErrorCode, OrderService, OrderStatus, Product,
    ProductService,
};
use backend::outbound::notify::LogNotificationDispatcher;
use backend::outbound::persistence::MemoryStore;

type Orders = OrderService<MemoryStore, MemoryStore, MemoryStore, LogNotificationDispatcher>;

struct Fixture {
    store: MemoryStore,
    orders: Orders,
    products: ProductService<MemoryStore, MemoryStore>,
    customer: Customer,
    product: Product,
}

async fn fixture(stock: u32) -> Fixture {
    let store = MemoryStore::new();
    let shared = Arc::new(store.clone());

    let categories = CategoryService::new(Arc::clone(&shared), Arc::clone(&shared));
    let products = ProductService::new(Arc::clone(&shared), Arc::clone(&shared));
    let customers = CustomerService::new(Arc::clone(&shared));
    let orders = OrderService::new(
        Arc::clone(&shared),
        Arc::clone(&shared),
        Arc::clone(&shared),
        Arc::new(LogNotificationDispatcher::new()),
        Duration::from_millis(100),
    );

    let category = categories
        .create(CreateCategoryRequest {
            name: "Laptops".to_owned(),
            description: None,
            slug: "laptops".to_owned(),
            parent_id: None,
        })
        .await
        .expect("category created");
    let product = products
        .create(CreateProductRequest {
            name: "Laptop".to_owned(),
            description: None,
            price: Decimal::new(150_000, 2),
            sku: "LAP-001".to_owned(),
            category_id: category.id,
            stock_quantity: stock,
        })
        .await
        .expect("product created");
    let customer = customers
        .register(RegisterCustomerRequest {
            email: "jane@example.com".to_owned(),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            phone_number: None,
            address: None,
        })
        .await
        .expect("customer registered");

    Fixture {
        store,
        orders,
        products,
        customer,
        product,
    }
}

fn request(fixture: &Fixture, quantity: u32) -> PlaceOrderRequest {
    PlaceOrderRequest {
        customer_id: fixture.customer.id,
        shipping_address: "1 Main St".to_owned(),
        notes: None,
        items: vec![OrderLine {
            product_id: fixture.product.id,
            quantity,
        }],
    }
}

#[tokio::test]
async fn placing_an_order_decrements_stock_and_derives_the_total() {
    let fx = fixture(5).await;

    let order = fx.orders.place(request(&fx, 2)).await.expect("order placed");
    assert_eq!(order.status, OrderStatus::Created);
    assert_eq!(order.total, Decimal::new(300_000, 2));
    assert!(order.number.starts_with("ORD-"));

    let stored = fx
        .products
        .get(&fx.product.id)
        .await
        .expect("product present");
    assert_eq!(stored.stock_quantity, 3);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_order_and_keeps_stock() {
    let fx = fixture(2).await;

    let err = fx.orders.place(request(&fx, 3)).await.expect_err("short");
    assert_eq!(err.code(), ErrorCode::InsufficientStock);
    let details = err.details().expect("details");
    assert_eq!(details["requested"], 3);
    assert_eq!(details["available"], 2);

    let stored = fx
        .products
        .get(&fx.product.id)
        .await
        .expect("product present");
    assert_eq!(stored.stock_quantity, 2);
    assert!(
        fx.orders
            .list(&fx.customer.id)
            .await
            .expect("listing")
            .is_empty(),
        "nothing was stored"
    );
}

#[tokio::test]
async fn concurrent_orders_for_the_last_unit_admit_exactly_one() {
    let fx = fixture(1).await;

    let mut handles = Vec::new();
    for _ in 0..2 {
        let orders = fx.orders.clone();
        let request = request(&fx, 1);
        handles.push(tokio::spawn(async move { orders.place(request).await }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.expect("task completed"));
    }
    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one order may take the last unit");

    let stored = fx
        .products
        .get(&fx.product.id)
        .await
        .expect("product present");
    assert_eq!(stored.stock_quantity, 0);
}

#[tokio::test]
async fn recorded_prices_survive_catalog_changes() {
    let fx = fixture(5).await;

    let order = fx.orders.place(request(&fx, 1)).await.expect("order placed");

    fx.products
        .update(
            &fx.product.id,
            UpdateProductRequest {
                price: Some(Decimal::new(999_999, 2)),
                ..UpdateProductRequest::default()
            },
        )
        .await
        .expect("price changed");

    let stored = fx
        .orders
        .get(&order.id, &fx.customer.id)
        .await
        .expect("order present");
    assert_eq!(stored.items[0].unit_price, Decimal::new(150_000, 2));
    assert_eq!(stored.total, Decimal::new(150_000, 2));
}

#[tokio::test]
async fn empty_item_list_fails_before_anything_persists() {
    let fx = fixture(5).await;

    let err = fx
        .orders
        .place(PlaceOrderRequest {
            customer_id: fx.customer.id,
            shipping_address: "1 Main St".to_owned(),
            notes: None,
            items: vec![],
        })
        .await
        .expect_err("empty order");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let stored = ProductRepository::find_by_id(&fx.store, &fx.product.id)
        .await
        .expect("lookup")
        .expect("present");
    assert_eq!(stored.stock_quantity, 5);
}

#[tokio::test]
async fn lifecycle_runs_created_to_fulfilled_and_blocks_further_moves() {
    let fx = fixture(5).await;

    let order = fx.orders.place(request(&fx, 1)).await.expect("order placed");
    let fulfilled = fx
        .orders
        .fulfil(&order.id, &fx.customer.id)
        .await
        .expect("fulfilled");
    assert_eq!(fulfilled.status, OrderStatus::Fulfilled);

    let err = fx
        .orders
        .cancel(&order.id, &fx.customer.id)
        .await
        .expect_err("terminal state");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn statistics_aggregate_the_customers_orders() {
    let fx = fixture(10).await;

    fx.orders.place(request(&fx, 1)).await.expect("first order");
    fx.orders.place(request(&fx, 2)).await.expect("second order");

    let stats = fx
        .orders
        .statistics(Some(&fx.customer.id))
        .await
        .expect("aggregates");
    assert_eq!(stats.order_count, 2);
    assert_eq!(stats.total_revenue, Decimal::new(450_000, 2));
    assert_eq!(stats.average_order_value, Decimal::new(225_000, 2));
}
