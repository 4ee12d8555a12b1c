//! Category API handlers.
//!
//! ```text
//! GET  /api/v1/categories
//! POST /api/v1/categories {"name":"Laptops","slug":"laptops"}
//! GET  /api/v1/categories/tree
//! GET  /api/v1/categories/{id}/descendants
//! GET  /api/v1/categories/{id}/average-price
//! PUT  /api/v1/categories/{id}/parent {"parentId":null}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{
    CreateCategoryRequest, SubtreePriceStats, UpdateCategoryRequest,
};
use crate::domain::{Category, CategoryId, CategoryTreeNode, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const ID_FIELD: FieldName = FieldName::new("id");
const PARENT_ID_FIELD: FieldName = FieldName::new("parentId");

/// Category representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub parent_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            description: category.description,
            slug: category.slug,
            parent_id: category.parent.map(|p| p.to_string()),
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

/// One node of the nested category tree.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeNodeDto {
    #[serde(flatten)]
    pub category: CategoryDto,
    // Self-referential: stop utoipa from inlining the schema forever.
    #[schema(no_recursion)]
    pub children: Vec<CategoryTreeNodeDto>,
}

impl From<CategoryTreeNode> for CategoryTreeNodeDto {
    fn from(node: CategoryTreeNode) -> Self {
        Self {
            category: node.category.into(),
            children: node.children.into_iter().map(Self::from).collect(),
        }
    }
}

/// Subtree price aggregation returned by `average-price`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubtreePriceStatsDto {
    /// Mean product price over the subtree, as a decimal string.
    pub average: String,
    pub count: u64,
    /// `Σ price × stock` over the subtree, as a decimal string.
    pub total_value: String,
}

impl From<SubtreePriceStats> for SubtreePriceStatsDto {
    fn from(stats: SubtreePriceStats) -> Self {
        Self {
            average: stats.average.to_string(),
            count: stats.count,
            total_value: stats.total_value.to_string(),
        }
    }
}

/// Body for `POST /api/v1/categories`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryBody {
    pub name: String,
    pub description: Option<String>,
    pub slug: String,
    pub parent_id: Option<String>,
}

/// Body for `PUT /api/v1/categories/{id}`.
///
/// Absent fields keep their value, and so does an explicit `null`: the
/// wire format offers no way to clear the description once set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
}

/// Body for `PUT /api/v1/categories/{id}/parent`; `null` makes it a root.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetParentBody {
    pub parent_id: Option<String>,
}

fn category_id(raw: &str) -> Result<CategoryId, Error> {
    parse_uuid(raw, ID_FIELD).map(CategoryId::from)
}

fn parent_id(raw: Option<&str>) -> Result<Option<CategoryId>, Error> {
    raw.map(|value| parse_uuid(value, PARENT_ID_FIELD).map(CategoryId::from))
        .transpose()
}

/// List every category, sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "listCategories"
)]
#[get("/categories")]
pub async fn list_categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<CategoryDto>>> {
    let categories = state.categories_query.list().await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryDto::from).collect(),
    ))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryBody,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Parent not found", body = Error),
        (status = 409, description = "Slug already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCategoryBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let created = state
        .categories
        .create(CreateCategoryRequest {
            name: body.name,
            description: body.description,
            slug: body.slug,
            parent_id: parent_id(body.parent_id.as_deref())?,
        })
        .await?;
    Ok(HttpResponse::Created().json(CategoryDto::from(created)))
}

/// Nested view of the whole category forest.
#[utoipa::path(
    get,
    path = "/api/v1/categories/tree",
    responses(
        (status = 200, description = "Category forest", body = [CategoryTreeNodeDto]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "categoryTree"
)]
#[get("/categories/tree")]
pub async fn category_tree(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<CategoryTreeNodeDto>>> {
    let forest = state.categories_query.tree().await?;
    Ok(web::Json(
        forest.into_iter().map(CategoryTreeNodeDto::from).collect(),
    ))
}

/// Fetch a category by id.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = CategoryDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "getCategory"
)]
#[get("/categories/{id}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CategoryDto>> {
    let id = category_id(&path.into_inner())?;
    let category = state.categories_query.get(&id).await?;
    Ok(web::Json(category.into()))
}

/// Update a category's name, description, or slug.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = UpdateCategoryBody,
    responses(
        (status = 200, description = "Updated category", body = CategoryDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Slug already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<UpdateCategoryBody>,
) -> ApiResult<web::Json<CategoryDto>> {
    let id = category_id(&path.into_inner())?;
    let body = payload.into_inner();
    let updated = state
        .categories
        .update(
            &id,
            UpdateCategoryRequest {
                name: body.name,
                description: body.description,
                slug: body.slug,
            },
        )
        .await?;
    Ok(web::Json(updated.into()))
}

/// Move a category under a new parent, or make it a root.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id}/parent",
    params(("id" = String, Path, description = "Category id")),
    request_body = SetParentBody,
    responses(
        (status = 200, description = "Moved category", body = CategoryDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Category or parent not found", body = Error),
        (status = 409, description = "Move would create a cycle", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "setCategoryParent"
)]
#[put("/categories/{id}/parent")]
pub async fn set_category_parent(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<SetParentBody>,
) -> ApiResult<web::Json<CategoryDto>> {
    let id = category_id(&path.into_inner())?;
    let parent = parent_id(payload.into_inner().parent_id.as_deref())?;
    let moved = state.categories.set_parent(&id, parent).await?;
    Ok(web::Json(moved.into()))
}

/// Delete a category with no children and no products.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Category still has children or products", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = category_id(&path.into_inner())?;
    state.categories.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List a category's whole subtree, root included.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/descendants",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Subtree categories", body = [CategoryDto]),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "categoryDescendants"
)]
#[get("/categories/{id}/descendants")]
pub async fn category_descendants(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<CategoryDto>>> {
    let id = category_id(&path.into_inner())?;
    let subtree = state.categories_query.descendants(&id).await?;
    Ok(web::Json(subtree.into_iter().map(CategoryDto::from).collect()))
}

/// Price aggregation over a category's subtree.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}/average-price",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Subtree price statistics", body = SubtreePriceStatsDto),
        (status = 400, description = "Invalid id", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["categories"],
    operation_id = "categoryAveragePrice"
)]
#[get("/categories/{id}/average-price")]
pub async fn category_average_price(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<SubtreePriceStatsDto>> {
    let id = category_id(&path.into_inner())?;
    let stats = state.categories_query.average_price(&id).await?;
    Ok(web::Json(stats.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::Value;

    #[test]
    fn category_dto_uses_camel_case() {
        let category =
            Category::new("Laptops", Some("Portable".to_owned()), "laptops", None).expect("valid");
        let value = serde_json::to_value(CategoryDto::from(category)).expect("serialises");
        assert!(value.get("parentId").is_some());
        assert!(value.get("parent_id").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn tree_node_dto_flattens_the_category() {
        let root = Category::new("Electronics", None, "electronics", None).expect("valid");
        let child = Category::new("Laptops", None, "laptops", Some(root.id)).expect("valid");
        let node = CategoryTreeNode {
            category: root,
            children: vec![CategoryTreeNode {
                category: child,
                children: vec![],
            }],
        };
        let value = serde_json::to_value(CategoryTreeNodeDto::from(node)).expect("serialises");
        assert_eq!(value.get("name").and_then(Value::as_str), Some("Electronics"));
        let children = value.get("children").and_then(Value::as_array).expect("children");
        assert_eq!(
            children[0].get("name").and_then(Value::as_str),
            Some("Laptops")
        );
    }

    #[test]
    fn stats_dto_renders_decimal_strings() {
        let dto = SubtreePriceStatsDto::from(SubtreePriceStats {
            average: Decimal::new(150_000, 2),
            count: 2,
            total_value: Decimal::new(300_000, 2),
        });
        assert_eq!(dto.average, "1500.00");
        assert_eq!(dto.total_value, "3000.00");
    }

    #[test]
    fn parent_id_rejects_garbage() {
        let err = parent_id(Some("nope")).expect_err("invalid uuid");
        let details = err.details().expect("details");
        assert_eq!(details["field"], "parentId");
    }
}
