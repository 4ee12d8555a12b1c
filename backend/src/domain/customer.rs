//! Customer data model.
//!
//! Credentials never appear here: the auth gateway owns them and hands the
//! boundary an already-authenticated customer id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CustomerId;

/// Validation errors returned by [`Customer`] constructors and setters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CustomerValidationError {
    /// Email fails the basic shape check.
    #[error("email must look like local@domain")]
    InvalidEmail,
    /// First or last name is empty after trimming.
    #[error("customer name must not be empty")]
    EmptyName,
}

/// A registered customer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Stable identifier.
    pub id: CustomerId,
    /// Unique contact email.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Optional phone number for order notifications.
    pub phone_number: Option<String>,
    /// Optional postal address.
    pub address: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Validate inputs and construct a customer with a fresh identifier.
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: Option<String>,
        address: Option<String>,
    ) -> Result<Self, CustomerValidationError> {
        let email = email.into();
        let first_name = first_name.into();
        let last_name = last_name.into();
        validate_email(&email)?;
        validate_name(&first_name)?;
        validate_name(&last_name)?;
        let now = Utc::now();
        Ok(Self {
            id: CustomerId::random(),
            email,
            first_name,
            last_name,
            phone_number,
            address,
            created_at: now,
            updated_at: now,
        })
    }

    /// Update the mutable profile fields.
    pub fn update_profile(
        &mut self,
        first_name: Option<String>,
        last_name: Option<String>,
        phone_number: Option<String>,
        address: Option<String>,
    ) -> Result<(), CustomerValidationError> {
        if let Some(name) = first_name {
            validate_name(&name)?;
            self.first_name = name;
        }
        if let Some(name) = last_name {
            validate_name(&name)?;
            self.last_name = name;
        }
        if phone_number.is_some() {
            self.phone_number = phone_number;
        }
        if address.is_some() {
            self.address = address;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), CustomerValidationError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || email.contains(' ') {
        return Err(CustomerValidationError::InvalidEmail);
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), CustomerValidationError> {
    if name.trim().is_empty() {
        return Err(CustomerValidationError::EmptyName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_accepts_valid_input() {
        let customer = Customer::new("jane@example.com", "Jane", "Doe", None, None)
            .expect("valid customer");
        assert_eq!(customer.email, "jane@example.com");
    }

    #[rstest]
    #[case("janeexample.com")]
    #[case("@example.com")]
    #[case("jane@")]
    #[case("jane@localhost")]
    #[case("jane doe@example.com")]
    fn malformed_emails_are_rejected(#[case] email: &str) {
        let err = Customer::new(email, "Jane", "Doe", None, None).expect_err("rejected");
        assert_eq!(err, CustomerValidationError::InvalidEmail);
    }

    #[test]
    fn update_profile_keeps_unset_fields() {
        let mut customer = Customer::new("jane@example.com", "Jane", "Doe", None, None)
            .expect("valid customer");
        customer
            .update_profile(None, None, Some("+254700000001".to_owned()), None)
            .expect("valid update");
        assert_eq!(customer.first_name, "Jane");
        assert_eq!(customer.phone_number.as_deref(), Some("+254700000001"));
    }
}
