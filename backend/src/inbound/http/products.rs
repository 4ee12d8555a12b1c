//! Product API handlers.
//!
//! ```text
//! GET  /api/v1/products?category=<id>&search=<text>
//! POST /api/v1/products {"name":"Laptop","price":"1999.99","sku":"LAP-001",...}
//! ```
//!
//! Prices travel as decimal strings; a category filter covers the whole
//! subtree rooted at the given category.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CreateProductRequest, ProductFilter, UpdateProductRequest};
use crate::domain::{CategoryId, Error, Product, ProductId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_decimal, parse_uuid};

const ID_FIELD: FieldName = FieldName::new("id");
const CATEGORY_ID_FIELD: FieldName = FieldName::new("categoryId");
const CATEGORY_PARAM: FieldName = FieldName::new("category");
const PRICE_FIELD: FieldName = FieldName::new("price");

/// Product representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Decimal string, e.g. `"1999.99"`.
    pub price: String,
    pub sku: String,
    pub category_id: String,
    pub stock_quantity: u32,
    pub in_stock: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        let in_stock = product.is_in_stock();
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price: product.price.to_string(),
            sku: product.sku,
            category_id: product.category.to_string(),
            stock_quantity: product.stock_quantity,
            in_stock,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

/// Body for `POST /api/v1/products`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    pub name: String,
    pub description: Option<String>,
    /// Decimal string, e.g. `"1999.99"`.
    pub price: String,
    pub sku: String,
    pub category_id: String,
    pub stock_quantity: u32,
}

/// Body for `PUT /api/v1/products/{id}`.
///
/// Absent fields keep their value, and so does an explicit `null`: the
/// wire format offers no way to clear the description once set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub sku: Option<String>,
    pub category_id: Option<String>,
    pub stock_quantity: Option<u32>,
}

/// Query parameters for `GET /api/v1/products`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// Restrict to this category's subtree.
    pub category: Option<String>,
    /// Case-insensitive match on name, description, or sku.
    pub search: Option<String>,
}

fn product_id(raw: &str) -> Result<ProductId, Error> {
    parse_uuid(raw, ID_FIELD).map(ProductId::from)
}

/// List products, optionally filtered by subtree and search text.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Products", body = [ProductDto]),
        (status = 400, description = "Invalid filter", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ListProductsQuery>,
) -> ApiResult<web::Json<Vec<ProductDto>>> {
    let query = query.into_inner();
    let category_id = query
        .category
        .as_deref()
        .map(|raw| parse_uuid(raw, CATEGORY_PARAM).map(CategoryId::from))
        .transpose()?;
    let products = state
        .products_query
        .list(&ProductFilter {
            category_id,
            search: query.search,
        })
        .await?;
    Ok(web::Json(products.into_iter().map(ProductDto::from).collect()))
}

/// Create a product.
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductBody,
    responses(
        (status = 201, description = "Product created", body = ProductDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Category not found", body = Error),
        (status = 409, description = "Sku already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .products
        .create(CreateProductRequest {
            name: body.name,
            description: body.description,
            price: parse_decimal(&body.price, PRICE_FIELD)?,
            sku: body.sku,
            category_id: parse_uuid(&body.category_id, CATEGORY_ID_FIELD).map(CategoryId::from)?,
            stock_quantity: body.stock_quantity,
        })
        .await?;
    Ok(HttpResponse::Created().json(ProductDto::from(created)))
}

/// Fetch a product by id.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ProductDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "getProduct"
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductDto>> {
    let id = product_id(&path.into_inner())?;
    let product = state.products_query.get(&id).await?;
    Ok(web::Json(product.into()))
}

/// Update a product.
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductBody,
    responses(
        (status = 200, description = "Updated product", body = ProductDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Product or category not found", body = Error),
        (status = 409, description = "Sku already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateProductBody>,
) -> ApiResult<web::Json<ProductDto>> {
    let id = product_id(&path.into_inner())?;
    let body = payload.into_inner();
    let updated = state
        .products
        .update(
            &id,
            UpdateProductRequest {
                name: body.name,
                description: body.description,
                price: body
                    .price
                    .as_deref()
                    .map(|raw| parse_decimal(raw, PRICE_FIELD))
                    .transpose()?,
                sku: body.sku,
                category_id: body
                    .category_id
                    .as_deref()
                    .map(|raw| parse_uuid(raw, CATEGORY_ID_FIELD).map(CategoryId::from))
                    .transpose()?,
                stock_quantity: body.stock_quantity,
            },
        )
        .await?;
    Ok(web::Json(updated.into()))
}

/// Delete a product not referenced by any order.
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Product referenced by orders", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = product_id(&path.into_inner())?;
    state.products.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::Value;

    #[test]
    fn product_dto_renders_price_as_string() {
        let product = Product::new(
            "Laptop",
            None,
            Decimal::new(199_999, 2),
            "LAP-001",
            CategoryId::random(),
            3,
        )
        .expect("valid product");
        let value = serde_json::to_value(ProductDto::from(product)).expect("serialises");
        assert_eq!(value.get("price").and_then(Value::as_str), Some("1999.99"));
        assert_eq!(value.get("inStock").and_then(Value::as_bool), Some(true));
        assert!(value.get("stockQuantity").is_some());
    }

    #[test]
    fn out_of_stock_product_reports_in_stock_false() {
        let product = Product::new(
            "Laptop",
            None,
            Decimal::new(199_999, 2),
            "LAP-001",
            CategoryId::random(),
            0,
        )
        .expect("valid product");
        let dto = ProductDto::from(product);
        assert!(!dto.in_stock);
    }
}
