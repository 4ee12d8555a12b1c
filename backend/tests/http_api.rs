//! End-to-end HTTP flows against the wired app.

use std::time::Duration;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, http::StatusCode, test as actix_test, web};
use serde_json::{Value, json};

use backend::server::{build_http_state, configure_app};
use backend::outbound::persistence::MemoryStore;

const CUSTOMER_ID_HEADER: &str = "X-Customer-Id";

async fn test_app()
-> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let state = web::Data::new(build_http_state(
        MemoryStore::new(),
        Duration::from_millis(100),
    ));
    let health = web::Data::new(backend::inbound::http::health::HealthState::new());
    actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(health)
            .configure(configure_app),
    )
    .await
}

async fn post_json<S, B>(app: &S, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let request = actix_test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let response = actix_test::call_service(app, request).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, value)
}

async fn register_customer<S, B>(app: &S) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = post_json(
        app,
        "/api/v1/customers",
        json!({
            "email": "jane@example.com",
            "firstName": "Jane",
            "lastName": "Doe"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().expect("customer id").to_owned()
}

async fn create_catalog<S, B>(app: &S) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, category) = post_json(
        app,
        "/api/v1/categories",
        json!({ "name": "Laptops", "slug": "laptops" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_str().expect("category id").to_owned();

    let (status, product) = post_json(
        app,
        "/api/v1/products",
        json!({
            "name": "Laptop",
            "price": "1500.00",
            "sku": "LAP-001",
            "categoryId": category_id,
            "stockQuantity": 5
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().expect("product id").to_owned();
    (category_id, product_id)
}

#[actix_web::test]
async fn order_flow_over_http() {
    let app = test_app().await;
    let customer_id = register_customer(&app).await;
    let (_, product_id) = create_catalog(&app).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header((CUSTOMER_ID_HEADER, customer_id.clone()))
        .set_json(json!({
            "shippingAddress": "1 Main St",
            "items": [{ "productId": product_id, "quantity": 2 }]
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let order: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("order body");
    assert_eq!(order["total"].as_str(), Some("3000.00"));
    assert_eq!(order["status"].as_str(), Some("created"));
    let order_id = order["id"].as_str().expect("order id").to_owned();

    // Stock reflects the decrement.
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/products/{product_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let product: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("product body");
    assert_eq!(product["stockQuantity"].as_u64(), Some(3));

    // Fulfil, then a cancel attempt conflicts.
    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/fulfil"))
        .insert_header((CUSTOMER_ID_HEADER, customer_id.clone()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/orders/{order_id}/cancel"))
        .insert_header((CUSTOMER_ID_HEADER, customer_id))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn orders_require_the_identity_header() {
    let app = test_app().await;

    let request = actix_test::TestRequest::get().uri("/api/v1/orders").to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("error body");
    assert_eq!(body["code"].as_str(), Some("unauthorized"));
}

#[actix_web::test]
async fn insufficient_stock_maps_to_conflict() {
    let app = test_app().await;
    let customer_id = register_customer(&app).await;
    let (_, product_id) = create_catalog(&app).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/orders")
        .insert_header((CUSTOMER_ID_HEADER, customer_id))
        .set_json(json!({
            "shippingAddress": "1 Main St",
            "items": [{ "productId": product_id, "quantity": 6 }]
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("error body");
    assert_eq!(body["code"].as_str(), Some("insufficient_stock"));
    assert_eq!(body["details"]["available"].as_u64(), Some(5));
}

#[actix_web::test]
async fn category_tree_and_average_price_endpoints() {
    let app = test_app().await;
    let (category_id, _) = create_catalog(&app).await;

    let (status, child) = post_json(
        &app,
        "/api/v1/categories",
        json!({ "name": "Gaming", "slug": "gaming", "parentId": category_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(child["parentId"].as_str(), Some(category_id.as_str()));

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/categories/tree")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let forest: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("tree body");
    let roots = forest.as_array().expect("array of roots");
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["children"][0]["name"].as_str(), Some("Gaming"));

    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/categories/{category_id}/average-price"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("stats body");
    assert_eq!(stats["average"].as_str(), Some("1500.00"));
    assert_eq!(stats["count"].as_u64(), Some(1));
}

#[actix_web::test]
async fn duplicate_slug_and_sku_conflict() {
    let app = test_app().await;
    let (category_id, _) = create_catalog(&app).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/categories",
        json!({ "name": "Portables", "slug": "laptops" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["field"].as_str(), Some("slug"));

    let (status, body) = post_json(
        &app,
        "/api/v1/products",
        json!({
            "name": "Another",
            "price": "10.00",
            "sku": "LAP-001",
            "categoryId": category_id,
            "stockQuantity": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["field"].as_str(), Some("sku"));
}

#[actix_web::test]
async fn product_listing_filters_by_subtree_and_search() {
    let app = test_app().await;
    let (category_id, _) = create_catalog(&app).await;

    let (status, child) = post_json(
        &app,
        "/api/v1/categories",
        json!({ "name": "Gaming", "slug": "gaming", "parentId": category_id }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let child_id = child["id"].as_str().expect("child id").to_owned();

    let (status, _) = post_json(
        &app,
        "/api/v1/products",
        json!({
            "name": "Gaming laptop",
            "price": "2500.00",
            "sku": "LAP-002",
            "categoryId": child_id,
            "stockQuantity": 2
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Parent filter spans the child category.
    let request = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/products?category={category_id}"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let listed: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("list body");
    assert_eq!(listed.as_array().expect("array").len(), 2);

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/products?search=gaming")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    let listed: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("list body");
    let matched = listed.as_array().expect("array");
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["name"].as_str(), Some("Gaming laptop"));
}

#[actix_web::test]
async fn customer_profile_round_trip() {
    let app = test_app().await;
    let customer_id = register_customer(&app).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/customers/me")
        .insert_header((CUSTOMER_ID_HEADER, customer_id.clone()))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = actix_test::TestRequest::put()
        .uri("/api/v1/customers/me")
        .insert_header((CUSTOMER_ID_HEADER, customer_id))
        .set_json(json!({ "phoneNumber": "+254700000001" }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::OK);
    let profile: Value = serde_json::from_slice(&actix_test::read_body(response).await)
        .expect("profile body");
    assert_eq!(profile["phoneNumber"].as_str(), Some("+254700000001"));
    assert_eq!(profile["firstName"].as_str(), Some("Jane"));
}

#[actix_web::test]
async fn health_probes_respond() {
    // Probes live outside /api/v1 and carry no auth.
    let state = web::Data::new(build_http_state(
        MemoryStore::new(),
        Duration::from_millis(100),
    ));
    let health = web::Data::new(backend::inbound::http::health::HealthState::new());
    health.mark_ready();
    let app = actix_test::init_service(
        App::new()
            .app_data(state)
            .app_data(health)
            .configure(configure_app),
    )
    .await;

    for uri in ["/healthz/live", "/healthz/ready"] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK, "probe {uri}");
    }
}
