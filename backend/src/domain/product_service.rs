//! Product catalog use-cases.
//!
//! Listing with a category filter spans the whole subtree: the filter id is
//! expanded through [`hierarchy::descendants`] before the repository query
//! runs, so a parent category shows everything its children sell.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::error::Error;
use super::hierarchy;
use super::ids::{CategoryId, ProductId};
use super::ports::{
    CategoryRepository, CreateProductRequest, ProductCommand, ProductDeleteError, ProductFilter,
    ProductQuery, ProductRepository, ProductSelection, UpdateProductRequest,
};
use super::product::{Product, ProductValidationError};

/// Product service backed by the product and category repositories.
#[derive(Clone)]
pub struct ProductService<C, P> {
    categories: Arc<C>,
    products: Arc<P>,
}

impl<C, P> ProductService<C, P> {
    /// Create a new service with the given repositories.
    pub fn new(categories: Arc<C>, products: Arc<P>) -> Self {
        Self {
            categories,
            products,
        }
    }
}

fn validation_error(err: &ProductValidationError) -> Error {
    let field = match err {
        ProductValidationError::EmptyName | ProductValidationError::NameTooLong { .. } => "name",
        ProductValidationError::InvalidSku | ProductValidationError::SkuTooLong { .. } => "sku",
        ProductValidationError::NegativePrice => "price",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_value",
    }))
}

fn product_not_found(id: &ProductId) -> Error {
    Error::not_found("product not found").with_details(json!({
        "entity": "product",
        "id": id.to_string(),
    }))
}

impl<C, P> ProductService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn fetch(&self, id: &ProductId) -> Result<Product, Error> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    async fn ensure_category_exists(&self, category: &CategoryId) -> Result<(), Error> {
        if self.categories.find_by_id(category).await?.is_none() {
            return Err(Error::not_found("category not found").with_details(json!({
                "entity": "category",
                "field": "categoryId",
                "id": category.to_string(),
            })));
        }
        Ok(())
    }
}

#[async_trait]
impl<C, P> ProductCommand for ProductService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn create(&self, request: CreateProductRequest) -> Result<Product, Error> {
        self.ensure_category_exists(&request.category_id).await?;
        let product = Product::new(
            request.name,
            request.description,
            request.price,
            request.sku,
            request.category_id,
            request.stock_quantity,
        )
        .map_err(|err| validation_error(&err))?;
        self.products.insert(&product).await?;
        info!(product = %product.id, sku = %product.sku, "product created");
        Ok(product)
    }

    async fn update(
        &self,
        id: &ProductId,
        request: UpdateProductRequest,
    ) -> Result<Product, Error> {
        let mut product = self.fetch(id).await?;
        if let Some(name) = request.name {
            product.set_name(name).map_err(|err| validation_error(&err))?;
        }
        if request.description.is_some() {
            product.set_description(request.description);
        }
        if let Some(price) = request.price {
            product
                .set_price(price)
                .map_err(|err| validation_error(&err))?;
        }
        if let Some(sku) = request.sku {
            product.set_sku(sku).map_err(|err| validation_error(&err))?;
        }
        if let Some(category) = request.category_id {
            self.ensure_category_exists(&category).await?;
            product.set_category(category);
        }
        if let Some(stock) = request.stock_quantity {
            product.set_stock_quantity(stock);
        }
        self.products.update(&product).await?;
        Ok(product)
    }

    async fn delete(&self, id: &ProductId) -> Result<(), Error> {
        self.products.delete(id).await.map_err(|err| match err {
            ProductDeleteError::NotFound(id) => product_not_found(&id),
            ProductDeleteError::Referenced(id) => {
                Error::conflict("product is referenced by existing orders").with_details(json!({
                    "entity": "product",
                    "id": id.to_string(),
                    "code": "referenced_by_orders",
                }))
            }
            ProductDeleteError::Storage(err) => err.into(),
        })?;
        info!(product = %id, "product deleted");
        Ok(())
    }
}

#[async_trait]
impl<C, P> ProductQuery for ProductService<C, P>
where
    C: CategoryRepository,
    P: ProductRepository,
{
    async fn get(&self, id: &ProductId) -> Result<Product, Error> {
        self.fetch(id).await
    }

    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error> {
        let category_ids = match &filter.category_id {
            Some(root) => {
                let snapshot = self.categories.list_all().await?;
                let subtree = hierarchy::descendants(&snapshot, root);
                // Unknown category: empty subtree, therefore empty listing.
                Some(subtree.into_iter().map(|c| c.id).collect::<HashSet<_>>())
            }
            None => None,
        };
        if matches!(&category_ids, Some(ids) if ids.is_empty()) {
            return Ok(Vec::new());
        }
        Ok(self
            .products
            .list(&ProductSelection {
                category_ids,
                search: filter.search.clone(),
            })
            .await?)
    }
}
