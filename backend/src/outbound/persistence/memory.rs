//! Lock-based in-process store implementing every repository port.
//!
//! All entities live behind one `parking_lot::RwLock`. Reads clone out of a
//! shared guard; mutations take the write guard for their whole critical
//! section, which is what makes `commit_order` atomic: the stock check and
//! the decrement happen under the same guard, so no interleaving can let two
//! orders both take the last unit. No lock is ever held across an `.await`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::category::Category;
use crate::domain::customer::Customer;
use crate::domain::ids::{CategoryId, CustomerId, OrderId, ProductId};
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{
    CategoryRepository, CustomerRepository, OrderCommitError, OrderRepository, ProductDeleteError,
    ProductRepository, ProductSelection, ReparentError, StorageError, TransitionError,
};
use crate::domain::product::Product;

#[derive(Debug, Default)]
struct StoreInner {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
    customers: HashMap<CustomerId, Customer>,
}

impl StoreInner {
    fn slug_taken(&self, slug: &str, except: &CategoryId) -> bool {
        self.categories
            .values()
            .any(|c| c.slug == slug && c.id != *except)
    }

    fn sku_taken(&self, sku: &str, except: &ProductId) -> bool {
        self.products
            .values()
            .any(|p| p.sku == sku && p.id != *except)
    }

    fn email_taken(&self, email: &str, except: &CustomerId) -> bool {
        self.customers
            .values()
            .any(|c| c.email.eq_ignore_ascii_case(email) && c.id != *except)
    }

    /// Walk the parent chain from `start` looking for `needle`.
    ///
    /// Bounded by the number of stored categories, so a corrupt chain cannot
    /// spin forever.
    fn chain_contains(&self, start: &CategoryId, needle: &CategoryId) -> bool {
        let mut cursor = Some(*start);
        let mut steps = self.categories.len() + 1;
        while let Some(id) = cursor {
            if id == *needle {
                return true;
            }
            if steps == 0 {
                return false;
            }
            steps -= 1;
            cursor = self.categories.get(&id).and_then(|c| c.parent);
        }
        false
    }
}

/// Shared in-process store; cheap to clone, all clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn insert(&self, category: &Category) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if inner.slug_taken(&category.slug, &category.id) {
            return Err(StorageError::duplicate(
                "category",
                "slug",
                category.slug.clone(),
            ));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if !inner.categories.contains_key(&category.id) {
            return Err(StorageError::query(format!(
                "category {} not found",
                category.id
            )));
        }
        if inner.slug_taken(&category.slug, &category.id) {
            return Err(StorageError::duplicate(
                "category",
                "slug",
                category.slug.clone(),
            ));
        }
        inner.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if inner.categories.remove(id).is_none() {
            return Err(StorageError::query(format!("category {id} not found")));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, StorageError> {
        Ok(self.inner.read().categories.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StorageError> {
        Ok(self
            .inner
            .read()
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.inner.read().categories.values().cloned().collect())
    }

    async fn reparent(
        &self,
        id: &CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<Category, ReparentError> {
        let mut inner = self.inner.write();
        if !inner.categories.contains_key(id) {
            return Err(ReparentError::NotFound(*id));
        }
        if let Some(parent_id) = parent {
            if !inner.categories.contains_key(&parent_id) {
                return Err(ReparentError::ParentNotFound(parent_id));
            }
            // The cycle guard and the write share the same guard, so no
            // concurrent move can invalidate this check.
            if inner.chain_contains(&parent_id, id) {
                return Err(ReparentError::Cycle {
                    category: *id,
                    parent: parent_id,
                });
            }
        }
        let Some(category) = inner.categories.get_mut(id) else {
            return Err(ReparentError::NotFound(*id));
        };
        category.parent = parent;
        category.touch();
        Ok(category.clone())
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn insert(&self, product: &Product) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if inner.sku_taken(&product.sku, &product.id) {
            return Err(StorageError::duplicate("product", "sku", product.sku.clone()));
        }
        inner.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if !inner.products.contains_key(&product.id) {
            return Err(StorageError::query(format!(
                "product {} not found",
                product.id
            )));
        }
        if inner.sku_taken(&product.sku, &product.id) {
            return Err(StorageError::duplicate("product", "sku", product.sku.clone()));
        }
        inner.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), ProductDeleteError> {
        let mut inner = self.inner.write();
        if !inner.products.contains_key(id) {
            return Err(ProductDeleteError::NotFound(*id));
        }
        let referenced = inner
            .orders
            .values()
            .flat_map(|o| o.items.iter())
            .any(|item| item.product_id == *id);
        if referenced {
            return Err(ProductDeleteError::Referenced(*id));
        }
        inner.products.remove(id);
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StorageError> {
        Ok(self.inner.read().products.get(id).cloned())
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, StorageError> {
        Ok(self
            .inner
            .read()
            .products
            .values()
            .find(|p| p.sku == sku)
            .cloned())
    }

    async fn list(&self, query: &ProductSelection) -> Result<Vec<Product>, StorageError> {
        let needle = query.search.as_deref().map(str::to_lowercase);
        let inner = self.inner.read();
        let mut matched: Vec<Product> = inner
            .products
            .values()
            .filter(|p| match &query.category_ids {
                Some(ids) => ids.contains(&p.category),
                None => true,
            })
            .filter(|p| match &needle {
                Some(needle) => {
                    p.name.to_lowercase().contains(needle)
                        || p.sku.to_lowercase().contains(needle)
                        || p.description
                            .as_deref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
                None => true,
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn commit_order(&self, order: &Order) -> Result<(), OrderCommitError> {
        let mut inner = self.inner.write();

        // First pass: verify every line without touching anything.
        for item in &order.items {
            let product = inner
                .products
                .get(&item.product_id)
                .ok_or(OrderCommitError::ProductMissing(item.product_id))?;
            if product.stock_quantity < item.quantity {
                return Err(OrderCommitError::InsufficientStock {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available: product.stock_quantity,
                });
            }
        }

        // Second pass: every check passed, apply the decrements and store
        // the order under the same guard.
        for item in &order.items {
            if let Some(product) = inner.products.get_mut(&item.product_id) {
                product.stock_quantity -= item.quantity;
            }
        }
        inner.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.inner.read().orders.get(id).cloned())
    }

    async fn list_by_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, StorageError> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| o.customer == *customer)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StorageError> {
        let inner = self.inner.read();
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.number.cmp(&a.number)));
        Ok(orders)
    }

    async fn transition(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, TransitionError> {
        let mut inner = self.inner.write();
        let Some(order) = inner.orders.get_mut(id) else {
            return Err(TransitionError::NotFound(*id));
        };
        if order.status != from {
            return Err(TransitionError::InvalidState {
                actual: order.status,
                expected: from,
            });
        }
        order.status = to;
        Ok(order.clone())
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn insert(&self, customer: &Customer) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if inner.email_taken(&customer.email, &customer.id) {
            return Err(StorageError::duplicate(
                "customer",
                "email",
                customer.email.clone(),
            ));
        }
        inner.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        if !inner.customers.contains_key(&customer.id) {
            return Err(StorageError::query(format!(
                "customer {} not found",
                customer.id
            )));
        }
        if inner.email_taken(&customer.email, &customer.id) {
            return Err(StorageError::duplicate(
                "customer",
                "email",
                customer.email.clone(),
            ));
        }
        inner.customers.insert(customer.id, customer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, StorageError> {
        Ok(self.inner.read().customers.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError> {
        Ok(self
            .inner
            .read()
            .customers
            .values()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
