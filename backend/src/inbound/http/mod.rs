//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod categories;
pub mod customers;
pub mod error;
pub mod health;
pub mod orders;
pub mod products;
pub mod state;
pub mod validation;

pub use error::ApiResult;
