//! Customer account use-cases.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use super::customer::{Customer, CustomerValidationError};
use super::error::Error;
use super::ids::CustomerId;
use super::ports::{
    CustomerCommand, CustomerQuery, CustomerRepository, RegisterCustomerRequest,
    UpdateCustomerRequest,
};

/// Customer service backed by the customer repository.
#[derive(Clone)]
pub struct CustomerService<R> {
    customers: Arc<R>,
}

impl<R> CustomerService<R> {
    /// Create a new service with the given repository.
    pub fn new(customers: Arc<R>) -> Self {
        Self { customers }
    }
}

fn validation_error(err: &CustomerValidationError) -> Error {
    let field = match err {
        CustomerValidationError::InvalidEmail => "email",
        CustomerValidationError::EmptyName => "name",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": "invalid_value",
    }))
}

fn customer_not_found(id: &CustomerId) -> Error {
    Error::not_found("customer not found").with_details(json!({
        "entity": "customer",
        "id": id.to_string(),
    }))
}

impl<R> CustomerService<R>
where
    R: CustomerRepository,
{
    async fn fetch(&self, id: &CustomerId) -> Result<Customer, Error> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or_else(|| customer_not_found(id))
    }
}

#[async_trait]
impl<R> CustomerCommand for CustomerService<R>
where
    R: CustomerRepository,
{
    async fn register(&self, request: RegisterCustomerRequest) -> Result<Customer, Error> {
        let customer = Customer::new(
            request.email,
            request.first_name,
            request.last_name,
            request.phone_number,
            request.address,
        )
        .map_err(|err| validation_error(&err))?;
        self.customers.insert(&customer).await?;
        info!(customer = %customer.id, "customer registered");
        Ok(customer)
    }

    async fn update(
        &self,
        id: &CustomerId,
        request: UpdateCustomerRequest,
    ) -> Result<Customer, Error> {
        let mut customer = self.fetch(id).await?;
        customer
            .update_profile(
                request.first_name,
                request.last_name,
                request.phone_number,
                request.address,
            )
            .map_err(|err| validation_error(&err))?;
        self.customers.update(&customer).await?;
        Ok(customer)
    }
}

#[async_trait]
impl<R> CustomerQuery for CustomerService<R>
where
    R: CustomerRepository,
{
    async fn get(&self, id: &CustomerId) -> Result<Customer, Error> {
        self.fetch(id).await
    }
}
