//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (customers,
//!   categories, products, orders, health)
//! - **Schemas**: The request and response DTOs plus the shared error payload
//! - **Security**: The gateway-supplied customer identity header

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::categories::{
    CategoryDto, CategoryTreeNodeDto, CreateCategoryBody, SetParentBody, SubtreePriceStatsDto,
    UpdateCategoryBody,
};
use crate::inbound::http::customers::{CustomerDto, RegisterCustomerBody, UpdateCustomerBody};
use crate::inbound::http::orders::{
    OrderDto, OrderItemDto, OrderLineBody, OrderStatisticsDto, PlaceOrderBody,
};
use crate::inbound::http::products::{CreateProductBody, ProductDto, UpdateProductBody};

/// Enrich the generated document with the identity header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "CustomerIdHeader",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-Customer-Id",
                "Authenticated customer id forwarded by the gateway.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Storefront backend API",
        description = "HTTP interface for the catalog, order engine, and customer accounts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("CustomerIdHeader" = [])),
    paths(
        crate::inbound::http::customers::register_customer,
        crate::inbound::http::customers::current_customer,
        crate::inbound::http::customers::update_current_customer,
        crate::inbound::http::categories::list_categories,
        crate::inbound::http::categories::create_category,
        crate::inbound::http::categories::category_tree,
        crate::inbound::http::categories::get_category,
        crate::inbound::http::categories::update_category,
        crate::inbound::http::categories::set_category_parent,
        crate::inbound::http::categories::delete_category,
        crate::inbound::http::categories::category_descendants,
        crate::inbound::http::categories::category_average_price,
        crate::inbound::http::products::list_products,
        crate::inbound::http::products::create_product,
        crate::inbound::http::products::get_product,
        crate::inbound::http::products::update_product,
        crate::inbound::http::products::delete_product,
        crate::inbound::http::orders::place_order,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::order_statistics,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::fulfil_order,
        crate::inbound::http::orders::cancel_order,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        CustomerDto,
        RegisterCustomerBody,
        UpdateCustomerBody,
        CategoryDto,
        CategoryTreeNodeDto,
        CreateCategoryBody,
        UpdateCategoryBody,
        SetParentBody,
        SubtreePriceStatsDto,
        ProductDto,
        CreateProductBody,
        UpdateProductBody,
        OrderDto,
        OrderItemDto,
        OrderLineBody,
        OrderStatisticsDto,
        PlaceOrderBody,
    )),
    tags(
        (name = "customers", description = "Customer accounts"),
        (name = "categories", description = "Hierarchical product categories"),
        (name = "products", description = "Product catalog"),
        (name = "orders", description = "Order placement and lifecycle"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_generates_the_recursive_tree_schema() {
        // CategoryTreeNodeDto references itself through `children`; document
        // generation must terminate and still register the schema.
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert!(schemas.contains_key("CategoryTreeNodeDto"));
        assert!(doc.paths.paths.contains_key("/api/v1/categories/tree"));
    }

    #[test]
    fn openapi_registers_every_order_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/orders",
            "/api/v1/orders/statistics",
            "/api/v1/orders/{id}",
            "/api/v1/orders/{id}/fulfil",
            "/api/v1/orders/{id}/cancel",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }
    }
}
