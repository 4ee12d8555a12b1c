//! Product data model.
//!
//! Prices are fixed-point [`Decimal`] values; floating point never touches
//! money in this crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ids::{CategoryId, ProductId};

const NAME_MAX: usize = 200;
const SKU_MAX: usize = 50;

/// Validation errors returned by [`Product`] constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// Name is empty after trimming.
    #[error("product name must not be empty")]
    EmptyName,
    /// Name exceeds the storage limit.
    #[error("product name must be at most {max} characters")]
    NameTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Sku is empty or padded with whitespace.
    #[error("sku must be a non-empty trimmed identifier")]
    InvalidSku,
    /// Sku exceeds the storage limit.
    #[error("sku must be at most {max} characters")]
    SkuTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Price is below zero.
    #[error("price must not be negative")]
    NegativePrice,
}

/// A sellable catalog item attached to exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Unit price, fixed point.
    pub price: Decimal,
    /// Unique stock-keeping unit.
    pub sku: String,
    /// Owning category.
    pub category: CategoryId,
    /// Units currently on hand.
    pub stock_quantity: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Validate inputs and construct a product with a fresh identifier.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        price: Decimal,
        sku: impl Into<String>,
        category: CategoryId,
        stock_quantity: u32,
    ) -> Result<Self, ProductValidationError> {
        let name = name.into();
        let sku = sku.into();
        validate_name(&name)?;
        validate_sku(&sku)?;
        validate_price(price)?;
        let now = Utc::now();
        Ok(Self {
            id: ProductId::random(),
            name,
            description,
            price,
            sku,
            category,
            stock_quantity,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether at least one unit is on hand.
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Total value of held stock (`price × stock_quantity`).
    pub fn inventory_value(&self) -> Decimal {
        self.price * Decimal::from(self.stock_quantity)
    }

    /// Replace the display name.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ProductValidationError> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    /// Replace the unit price. Already-placed orders keep their snapshot.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), ProductValidationError> {
        validate_price(price)?;
        self.price = price;
        self.touch();
        Ok(())
    }

    /// Replace the sku.
    pub fn set_sku(&mut self, sku: impl Into<String>) -> Result<(), ProductValidationError> {
        let sku = sku.into();
        validate_sku(&sku)?;
        self.sku = sku;
        self.touch();
        Ok(())
    }

    /// Move the product to another category.
    pub fn set_category(&mut self, category: CategoryId) {
        self.category = category;
        self.touch();
    }

    /// Set the absolute stock level.
    pub fn set_stock_quantity(&mut self, quantity: u32) {
        self.stock_quantity = quantity;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

fn validate_name(name: &str) -> Result<(), ProductValidationError> {
    if name.trim().is_empty() {
        return Err(ProductValidationError::EmptyName);
    }
    if name.chars().count() > NAME_MAX {
        return Err(ProductValidationError::NameTooLong { max: NAME_MAX });
    }
    Ok(())
}

fn validate_sku(sku: &str) -> Result<(), ProductValidationError> {
    if sku.is_empty() || sku.trim() != sku {
        return Err(ProductValidationError::InvalidSku);
    }
    if sku.len() > SKU_MAX {
        return Err(ProductValidationError::SkuTooLong { max: SKU_MAX });
    }
    Ok(())
}

fn validate_price(price: Decimal) -> Result<(), ProductValidationError> {
    if price < Decimal::ZERO {
        return Err(ProductValidationError::NegativePrice);
    }
    Ok(())
}
