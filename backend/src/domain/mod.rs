//! Domain model, ports, and services.
//!
//! Purpose: Define strongly typed entities for the catalog and order engine,
//! the driven ports (repositories, notification dispatcher) the services
//! depend on, and the driving ports the HTTP layer calls. Keep invariants and
//! serialisation contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload and identifiers.
//! - Category, Product, Customer, Order — aggregates with validated setters.
//! - hierarchy — iterative traversal helpers over a category snapshot.
//! - CategoryService, ProductService, OrderService, CustomerService —
//!   implementations of the driving ports in `ports`.

pub mod category;
pub mod category_service;
pub mod customer;
pub mod customer_service;
pub mod error;
pub mod hierarchy;
pub mod ids;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod product;
pub mod product_service;
mod slug;

pub use self::category::{Category, CategoryTreeNode, CategoryValidationError};
pub use self::category_service::CategoryService;
pub use self::customer::{Customer, CustomerValidationError};
pub use self::customer_service::CustomerService;
pub use self::error::{Error, ErrorCode};
pub use self::ids::{CategoryId, CustomerId, OrderId, ProductId};
pub use self::order::{Order, OrderItem, OrderPlacedEvent, OrderStatistics, OrderStatus};
pub use self::order_service::OrderService;
pub use self::product::{Product, ProductValidationError};
pub use self::product_service::ProductService;

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
