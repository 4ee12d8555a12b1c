//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports (repositories, the notification dispatcher) describe how the
//! domain expects to talk to adapters; each exposes strongly typed errors so
//! adapters map their failures into predictable variants. Driving ports are
//! the use-case traits the HTTP layer depends on, keeping handlers free of
//! concrete service types.

use std::collections::HashSet;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error as ThisError;

use super::category::{Category, CategoryTreeNode};
use super::customer::Customer;
use super::error::Error;
use super::ids::{CategoryId, CustomerId, OrderId, ProductId};
use super::order::{Order, OrderPlacedEvent, OrderStatistics, OrderStatus};
use super::product::Product;

/// Failures surfaced by persistence adapters.
///
/// Retry guidance: reads are idempotent and safe to retry; order placement
/// is not and must be guarded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum StorageError {
    /// The store is unreachable or timing out.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Adapter-provided description.
        message: String,
    },
    /// A query or mutation failed during execution.
    #[error("storage query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
    /// A uniqueness constraint was violated.
    #[error("duplicate {entity} {field}: {value}")]
    Duplicate {
        /// Entity kind, e.g. `category`.
        entity: &'static str,
        /// Violated field, e.g. `slug`.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

impl StorageError {
    /// Helper for connectivity failures.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique-constraint violations.
    pub fn duplicate(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            field,
            value: value.into(),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { message } => {
                Self::service_unavailable(format!("storage unavailable: {message}"))
            }
            StorageError::Query { message } => {
                Self::internal(format!("storage error: {message}"))
            }
            StorageError::Duplicate {
                entity,
                field,
                value,
            } => Self::conflict(format!("{entity} {field} already in use")).with_details(
                serde_json::json!({
                    "entity": entity,
                    "field": field,
                    "value": value,
                    "code": "duplicate",
                }),
            ),
        }
    }
}

/// Failures surfaced when reassigning a category's parent.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ReparentError {
    /// The category being moved does not exist.
    #[error("category {0} not found")]
    NotFound(CategoryId),
    /// The requested parent does not exist.
    #[error("parent category {0} not found")]
    ParentNotFound(CategoryId),
    /// The requested parent is the category itself or one of its
    /// descendants; committing the move would create a cycle.
    #[error("moving category {category} under {parent} would create a cycle")]
    Cycle {
        /// Category being moved.
        category: CategoryId,
        /// Rejected parent.
        parent: CategoryId,
    },
    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures surfaced when deleting a product.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ProductDeleteError {
    /// The product does not exist.
    #[error("product {0} not found")]
    NotFound(ProductId),
    /// Existing order items reference the product; orders are immutable
    /// historical records, so the delete is rejected.
    #[error("product {0} is referenced by existing orders")]
    Referenced(ProductId),
    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures surfaced by the atomic order commit.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum OrderCommitError {
    /// A line references a product that no longer exists.
    #[error("product {0} not found")]
    ProductMissing(ProductId),
    /// Stock cannot satisfy a line; nothing was decremented.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// Offending product.
        product_id: ProductId,
        /// Units the order asked for.
        requested: u32,
        /// Units actually on hand.
        available: u32,
    },
    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures surfaced by the conditional order status transition.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum TransitionError {
    /// The order does not exist.
    #[error("order {0} not found")]
    NotFound(OrderId),
    /// The order is not in the state the transition expects.
    #[error("order is {actual}, expected {expected}")]
    InvalidState {
        /// State the order is actually in.
        actual: OrderStatus,
        /// State the transition required.
        expected: OrderStatus,
    },
    /// Underlying storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures surfaced by the notification dispatcher adapter.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DispatchError {
    /// Dispatch infrastructure is unavailable.
    #[error("notification channel unavailable: {message}")]
    Unavailable {
        /// Adapter-provided description.
        message: String,
    },
    /// The event was rejected downstream.
    #[error("notification rejected: {message}")]
    Rejected {
        /// Adapter-provided description.
        message: String,
    },
}

impl DispatchError {
    /// Helper for outages.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Helper for rejected events.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Filter handed to [`ProductRepository::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSelection {
    /// Restrict to products whose category is in this set.
    pub category_ids: Option<HashSet<CategoryId>>,
    /// Case-insensitive substring matched against name, description, or sku.
    pub search: Option<String>,
}

/// Persistence port for the category forest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Store a new category. Fails with [`StorageError::Duplicate`] when the
    /// slug is taken.
    async fn insert(&self, category: &Category) -> Result<(), StorageError>;

    /// Replace the stored row for an existing category.
    async fn update(&self, category: &Category) -> Result<(), StorageError>;

    /// Remove a category. Callers check the deletion policy first.
    async fn delete(&self, id: &CategoryId) -> Result<(), StorageError>;

    /// Fetch a category by id.
    async fn find_by_id(&self, id: &CategoryId) -> Result<Option<Category>, StorageError>;

    /// Fetch a category by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StorageError>;

    /// Snapshot of the whole forest.
    async fn list_all(&self) -> Result<Vec<Category>, StorageError>;

    /// Reassign a category's parent, enforcing the cycle guard at write
    /// time under the store's write lock.
    async fn reparent(
        &self,
        id: &CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<Category, ReparentError>;
}

/// Persistence port for the product catalog.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Store a new product. Fails with [`StorageError::Duplicate`] when the
    /// sku is taken.
    async fn insert(&self, product: &Product) -> Result<(), StorageError>;

    /// Replace the stored row for an existing product.
    async fn update(&self, product: &Product) -> Result<(), StorageError>;

    /// Remove a product unless order items still reference it.
    async fn delete(&self, id: &ProductId) -> Result<(), ProductDeleteError>;

    /// Fetch a product by id.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, StorageError>;

    /// Fetch a product by sku.
    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, StorageError>;

    /// List products matching `query`, sorted by name.
    async fn list(&self, query: &ProductSelection) -> Result<Vec<Product>, StorageError>;
}

/// Persistence port for orders.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically decrement stock for every line and persist the order.
    ///
    /// The conditional decrement (`stock >= quantity`) and the insert commit
    /// as one unit: on any failure nothing is decremented and nothing is
    /// stored, so two concurrent orders can never both take the last unit.
    async fn commit_order(&self, order: &Order) -> Result<(), OrderCommitError>;

    /// Fetch an order by id.
    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, StorageError>;

    /// All orders placed by one customer, newest first.
    async fn list_by_customer(&self, customer: &CustomerId) -> Result<Vec<Order>, StorageError>;

    /// All orders, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, StorageError>;

    /// Conditionally move an order from `from` to `to`, failing when the
    /// stored state differs from `from`.
    async fn transition(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Order, TransitionError>;
}

/// Persistence port for customer accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Store a new customer. Fails with [`StorageError::Duplicate`] when the
    /// email is taken.
    async fn insert(&self, customer: &Customer) -> Result<(), StorageError>;

    /// Replace the stored row for an existing customer.
    async fn update(&self, customer: &Customer) -> Result<(), StorageError>;

    /// Fetch a customer by id.
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, StorageError>;

    /// Fetch a customer by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError>;
}

/// Port for handing order-placed events to the notification machinery.
///
/// Delivery, retries, and templating live behind this trait; the order
/// service treats dispatch as best-effort and never fails an order over it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Hand one event to the dispatcher.
    async fn dispatch(&self, event: &OrderPlacedEvent) -> Result<(), DispatchError>;
}

/// Subtree price aggregation returned by [`CategoryQuery::average_price`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreePriceStats {
    /// Arithmetic mean of product prices in the subtree (not
    /// inventory-weighted), rounded to two decimal places.
    pub average: Decimal,
    /// Number of products in the subtree.
    pub count: u64,
    /// `Σ price × stock_quantity` over the subtree.
    pub total_value: Decimal,
}

impl SubtreePriceStats {
    /// Stats for an empty subtree.
    pub fn empty() -> Self {
        Self {
            average: Decimal::ZERO,
            count: 0,
            total_value: Decimal::ZERO,
        }
    }
}

/// Inputs for [`CategoryCommand::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCategoryRequest {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Unique URL-safe slug.
    pub slug: String,
    /// Optional parent; must exist.
    pub parent_id: Option<CategoryId>,
}

/// Inputs for [`CategoryCommand::update`]; `None` fields keep their value
/// (there is no way to clear a set description).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCategoryRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New slug; uniqueness is enforced.
    pub slug: Option<String>,
}

/// Inputs for [`ProductCommand::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProductRequest {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Unit price, fixed point, non-negative.
    pub price: Decimal,
    /// Unique sku.
    pub sku: String,
    /// Owning category; must exist.
    pub category_id: CategoryId,
    /// Initial stock level.
    pub stock_quantity: u32,
}

/// Inputs for [`ProductCommand::update`]; `None` fields keep their value
/// (there is no way to clear a set description).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateProductRequest {
    /// New display name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit price.
    pub price: Option<Decimal>,
    /// New sku; uniqueness is enforced.
    pub sku: Option<String>,
    /// New owning category; must exist.
    pub category_id: Option<CategoryId>,
    /// New absolute stock level.
    pub stock_quantity: Option<u32>,
}

/// Filter for [`ProductQuery::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Restrict to this category and all of its descendants.
    pub category_id: Option<CategoryId>,
    /// Case-insensitive substring matched against name, description, or sku.
    pub search: Option<String>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    /// Product to order.
    pub product_id: ProductId,
    /// Units requested; must be positive.
    pub quantity: u32,
}

/// Inputs for [`OrderCommand::place`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOrderRequest {
    /// Authenticated customer placing the order.
    pub customer_id: CustomerId,
    /// Destination address; must be non-blank.
    pub shipping_address: String,
    /// Optional free-text notes.
    pub notes: Option<String>,
    /// Requested lines; must be non-empty with unique product ids.
    pub items: Vec<OrderLine>,
}

/// Inputs for [`CustomerCommand::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterCustomerRequest {
    /// Unique contact email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
}

/// Inputs for [`CustomerCommand::update`]; `None` fields keep their value
/// (there is no way to clear a set phone number or address).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCustomerRequest {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone_number: Option<String>,
    /// New postal address.
    pub address: Option<String>,
}

/// Driving port: category mutations.
#[async_trait]
pub trait CategoryCommand: Send + Sync {
    /// Create a category.
    async fn create(&self, request: CreateCategoryRequest) -> Result<Category, Error>;

    /// Update name, description, or slug.
    async fn update(
        &self,
        id: &CategoryId,
        request: UpdateCategoryRequest,
    ) -> Result<Category, Error>;

    /// Reassign the parent; `None` makes the category a root.
    async fn set_parent(
        &self,
        id: &CategoryId,
        parent: Option<CategoryId>,
    ) -> Result<Category, Error>;

    /// Delete a category without children or products.
    async fn delete(&self, id: &CategoryId) -> Result<(), Error>;
}

/// Driving port: category lookups and aggregations.
#[async_trait]
pub trait CategoryQuery: Send + Sync {
    /// Fetch one category.
    async fn get(&self, id: &CategoryId) -> Result<Category, Error>;

    /// All categories, sorted by name.
    async fn list(&self) -> Result<Vec<Category>, Error>;

    /// The category plus all transitive children.
    async fn descendants(&self, id: &CategoryId) -> Result<Vec<Category>, Error>;

    /// The full nested forest.
    async fn tree(&self) -> Result<Vec<CategoryTreeNode>, Error>;

    /// Price statistics over the category's subtree.
    async fn average_price(&self, id: &CategoryId) -> Result<SubtreePriceStats, Error>;
}

/// Driving port: product mutations.
#[async_trait]
pub trait ProductCommand: Send + Sync {
    /// Create a product.
    async fn create(&self, request: CreateProductRequest) -> Result<Product, Error>;

    /// Update product fields.
    async fn update(&self, id: &ProductId, request: UpdateProductRequest)
        -> Result<Product, Error>;

    /// Delete a product not referenced by any order.
    async fn delete(&self, id: &ProductId) -> Result<(), Error>;
}

/// Driving port: product lookups.
#[async_trait]
pub trait ProductQuery: Send + Sync {
    /// Fetch one product.
    async fn get(&self, id: &ProductId) -> Result<Product, Error>;

    /// List products; a category filter spans the whole subtree.
    async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, Error>;
}

/// Driving port: order mutations.
#[async_trait]
pub trait OrderCommand: Send + Sync {
    /// Validate, price, and atomically commit a new order.
    async fn place(&self, request: PlaceOrderRequest) -> Result<Order, Error>;

    /// Move one of the customer's orders from `created` to `fulfilled`.
    async fn fulfil(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error>;

    /// Move one of the customer's orders from `created` to `cancelled`.
    async fn cancel(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error>;
}

/// Driving port: order lookups and statistics.
#[async_trait]
pub trait OrderQuery: Send + Sync {
    /// Fetch one of the customer's orders.
    async fn get(&self, id: &OrderId, customer: &CustomerId) -> Result<Order, Error>;

    /// All of the customer's orders, newest first.
    async fn list(&self, customer: &CustomerId) -> Result<Vec<Order>, Error>;

    /// Aggregate figures, optionally scoped to one customer.
    async fn statistics(&self, customer: Option<&CustomerId>) -> Result<OrderStatistics, Error>;
}

/// Driving port: customer account mutations.
#[async_trait]
pub trait CustomerCommand: Send + Sync {
    /// Register a new customer.
    async fn register(&self, request: RegisterCustomerRequest) -> Result<Customer, Error>;

    /// Update profile fields.
    async fn update(
        &self,
        id: &CustomerId,
        request: UpdateCustomerRequest,
    ) -> Result<Customer, Error>;
}

/// Driving port: customer lookups.
#[async_trait]
pub trait CustomerQuery: Send + Sync {
    /// Fetch one customer.
    async fn get(&self, id: &CustomerId) -> Result<Customer, Error>;
}
