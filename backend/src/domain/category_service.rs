//! Category tree use-cases.
//!
//! Implements the driving ports for the category forest: CRUD with the
//! write-time cycle guard, iterative subtree traversal, the nested tree
//! view, and the subtree price aggregation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::info;

use super::category::{Category, CategoryTreeNode, CategoryValidationError};
use super::error::Error;
use super::hierarchy;
use super::ids::CategoryId;
use super::ports::{
    CategoryCommand, CategoryQuery, CategoryRepository, CreateCategoryRequest, ProductRepository,
    ProductSelection, ReparentError, SubtreePriceStats, UpdateCategoryRequest,
};

/// Category service backed by the category and product repositories.
#[derive(Clone)]
pub struct CategoryService<C, P> {
    categories: Arc<C>,
    products: Arc<P>,
}

impl<C, P> CategoryService<C, P> {
    /// Create a new service with the given repositories.
    pub fn new(categories: Arc<C>, products: Arc<P>) -> Self {
        Self {
            categories,
            products,
        }
    }
}

fn validation_error(field: &str, err: &CategoryValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_value",
    }))
}

fn category_not_found(id: &CategoryId) -> Error {
    Error::not_found("category not found").with_details(json!({
        "entity": "category",
        "id": id.to_string(),
    }))
}

impl<C, P> CategoryService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn fetch(&self, id: &CategoryId) -> Result<Category, Error> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| category_not_found(id))
    }

    async fn ensure_parent_exists(&self, parent: &CategoryId) -> Result<(), Error> {
        if self.categories.find_by_id(parent).await?.is_none() {
            return Err(Error::not_found("parent category not found").with_details(json!({
                "entity": "category",
                "field": "parentId",
                "id": parent.to_string(),
            })));
        }
        Ok(())
    }

    fn map_reparent_error(err: ReparentError) -> Error {
        match err {
            ReparentError::NotFound(id) => category_not_found(&id),
            ReparentError::ParentNotFound(id) => Error::not_found("parent category not found")
                .with_details(json!({
                    "entity": "category",
                    "field": "parentId",
                    "id": id.to_string(),
                })),
            ReparentError::Cycle { category, parent } => {
                Error::cycle_detected("new parent is a descendant of the category being moved")
                    .with_details(json!({
                        "categoryId": category.to_string(),
                        "parentId": parent.to_string(),
                    }))
            }
            ReparentError::Storage(err) => err.into(),
        }
    }
}

#[async_trait]
impl<C, P> CategoryCommand for CategoryService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn create(&self, request: CreateCategoryRequest) -> Result<Category, Error> {
        if let Some(parent) = &request.parent_id {
            self.ensure_parent_exists(parent).await?;
        }
        let category = Category::new(
            request.name,
            request.description,
            request.slug,
            request.parent_id,
        )
        .map_err(|err| match err {
            CategoryValidationError::EmptyName | CategoryValidationError::NameTooLong { .. } => {
                validation_error("name", &err)
            }
            CategoryValidationError::InvalidSlug | CategoryValidationError::SlugTooLong { .. } => {
                validation_error("slug", &err)
            }
        })?;
        self.categories.insert(&category).await?;
        info!(category = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    async fn update(
        &self,
        id: &CategoryId,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error> {
        let mut category = self.fetch(id).await?;
        if let Some(name) = request.name {
            category
                .set_name(name)
                .map_err(|err| validation_error("name", &err))?;
        }
        if let Some(slug) = request.slug {
            category
                .set_slug(slug)
                .map_err(|err| validation_error("slug", &err))?;
        }
        if request.description.is_some() {
            category.set_description(request.description);
        }
        self.categories.update(&category).await?;
        Ok(category)
    }

    async fn set_parent(
        &self,
        id: &CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<Category, Error> {
        let moved = self
            .categories
            .reparent(id, parent)
            .await
            .map_err(Self::map_reparent_error)?;
        info!(category = %id, parent = ?parent.map(|p| p.to_string()), "category moved");
        Ok(moved)
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), Error> {
        let category = self.fetch(id).await?;

        let snapshot = self.categories.list_all().await?;
        if snapshot.iter().any(|c| c.parent == Some(category.id)) {
            return Err(
                Error::conflict("category still has child categories").with_details(json!({
                    "entity": "category",
                    "id": id.to_string(),
                    "code": "has_children",
                })),
            );
        }

        let direct = ProductSelection {
            category_ids: Some(HashSet::from([category.id])),
            search: None,
        };
        if !self.products.list(&direct).await?.is_empty() {
            return Err(
                Error::conflict("category still has products").with_details(json!({
                    "entity": "category",
                    "id": id.to_string(),
                    "code": "has_products",
                })),
            );
        }

        self.categories.delete(id).await?;
        info!(category = %id, "category deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, P> CategoryQuery for CategoryService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn get(&self, id: &CategoryId) -> Result<Category, Error> {
        self.fetch(id).await
    }

    async fn list(&self) -> Result<Vec<Category>, Error> {
        let mut all = self.categories.list_all().await?;
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn descendants(&self, id: &CategoryId) -> Result<Vec<Category>, Error> {
        self.fetch(id).await?;
        let snapshot = self.categories.list_all().await?;
        Ok(hierarchy::descendants(&snapshot, id))
    }

    async fn tree(&self) -> Result<Vec<CategoryTreeNode>, Error> {
        let snapshot = self.categories.list_all().await?;
        Ok(hierarchy::build_forest(&snapshot))
    }

    async fn average_price(&self, id: &CategoryId) -> Result<SubtreePriceStats, Error> {
        let subtree = self.descendants(id).await?;
        let ids: HashSet<CategoryId> = subtree.into_iter().map(|c| c.id).collect();
        let products = self
            .products
            .list(&ProductSelection {
                category_ids: Some(ids),
                search: None,
            })
            .await?;

        if products.is_empty() {
            return Ok(SubtreePriceStats::empty());
        }

        let count = products.len() as u64;
        let price_sum: Decimal = products.iter().map(|p| p.price).sum();
        let total_value: Decimal = products.iter().map(super::product::Product::inventory_value).sum();
        Ok(SubtreePriceStats {
            average: (price_sum / Decimal::from(count)).round_dp(2),
            count,
            total_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockCategoryRepository, MockProductRepository, StorageError};
    use crate::domain::product::Product;
    use crate::domain::ErrorCode;

    fn service(
        categories: MockCategoryRepository,
        products: MockProductRepository,
    ) -> CategoryService<MockCategoryRepository, MockProductRepository> {
        CategoryService::new(Arc::new(categories), Arc::new(products))
    }

    fn category(name: &str, slug: &str, parent: Option<CategoryId>) -> Category {
        Category::new(name, None, slug, parent).expect("valid category")
    }

    #[tokio::test]
    async fn create_rejects_missing_parent() {
        let mut categories = MockCategoryRepository::new();
        categories
            .expect_find_by_id()
            .times(1)
            .return_once(|_| Ok(None));

        let svc = service(categories, MockProductRepository::new());
        let err = svc
            .create(CreateCategoryRequest {
                name: "Laptops".to_owned(),
                description: None,
                slug: "laptops".to_owned(),
                parent_id: Some(CategoryId::random()),
            })
            .await
            .expect_err("parent is missing");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn create_maps_duplicate_slug_to_conflict() {
        let mut categories = MockCategoryRepository::new();
        categories.expect_insert().times(1).return_once(|_| {
            Err(StorageError::duplicate("category", "slug", "laptops"))
        });

        let svc = service(categories, MockProductRepository::new());
        let err = svc
            .create(CreateCategoryRequest {
                name: "Laptops".to_owned(),
                description: None,
                slug: "laptops".to_owned(),
                parent_id: None,
            })
            .await
            .expect_err("slug is taken");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn update_without_description_keeps_the_stored_one() {
        // Absent and explicit-null both deserialise to None; neither clears.
        let mut stored = category("Laptops", "laptops", None);
        stored.set_description(Some("Portable computers".to_owned()));
        let id = stored.id;

        let mut categories = MockCategoryRepository::new();
        let found = stored.clone();
        categories
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(found)));
        categories
            .expect_update()
            .withf(|c: &Category| c.description.as_deref() == Some("Portable computers"))
            .times(1)
            .return_once(|_| Ok(()));

        let svc = service(categories, MockProductRepository::new());
        let updated = svc
            .update(
                &id,
                UpdateCategoryRequest {
                    name: Some("Notebooks".to_owned()),
                    ..UpdateCategoryRequest::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.name, "Notebooks");
        assert_eq!(updated.description.as_deref(), Some("Portable computers"));
    }

    #[tokio::test]
    async fn delete_rejects_category_with_children() {
        let root = category("Electronics", "electronics", None);
        let child = category("Laptops", "laptops", Some(root.id));
        let root_id = root.id;

        let mut categories = MockCategoryRepository::new();
        let found = root.clone();
        categories
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(found)));
        categories
            .expect_list_all()
            .times(1)
            .return_once(move || Ok(vec![root, child]));

        let svc = service(categories, MockProductRepository::new());
        let err = svc.delete(&root_id).await.expect_err("has children");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn average_price_over_empty_subtree_is_zero() {
        let root = category("Electronics", "electronics", None);
        let root_id = root.id;

        let mut categories = MockCategoryRepository::new();
        let found = root.clone();
        categories
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(found)));
        categories
            .expect_list_all()
            .times(1)
            .return_once(move || Ok(vec![root]));

        let mut products = MockProductRepository::new();
        products.expect_list().times(1).return_once(|_| Ok(vec![]));

        let svc = service(categories, products);
        let stats = svc.average_price(&root_id).await.expect("aggregates");
        assert_eq!(stats, SubtreePriceStats::empty());
    }

    #[tokio::test]
    async fn average_price_spans_descendant_products() {
        let root = category("Electronics", "electronics", None);
        let child = category("Laptops", "laptops", Some(root.id));
        let root_id = root.id;

        let cheap = Product::new(
            "Basic",
            None,
            Decimal::new(100_000, 2),
            "LAP-001",
            child.id,
            1,
        )
        .expect("valid product");
        let fancy = Product::new(
            "Fancy",
            None,
            Decimal::new(200_000, 2),
            "LAP-002",
            child.id,
            2,
        )
        .expect("valid product");

        let mut categories = MockCategoryRepository::new();
        let found = root.clone();
        categories
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(found)));
        categories
            .expect_list_all()
            .times(1)
            .return_once(move || Ok(vec![root, child]));

        let mut products = MockProductRepository::new();
        products
            .expect_list()
            .times(1)
            .return_once(move |_| Ok(vec![cheap, fancy]));

        let svc = service(categories, products);
        let stats = svc.average_price(&root_id).await.expect("aggregates");
        assert_eq!(stats.average, Decimal::new(150_000, 2));
        assert_eq!(stats.count, 2);
        // 1000.00 × 1 + 2000.00 × 2
        assert_eq!(stats.total_value, Decimal::new(500_000, 2));
    }
}
