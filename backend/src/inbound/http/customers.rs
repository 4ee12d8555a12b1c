//! Customer API handlers.
//!
//! ```text
//! POST /api/v1/customers {"email":"jane@example.com","firstName":"Jane","lastName":"Doe"}
//! GET  /api/v1/customers/me
//! PUT  /api/v1/customers/me
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};

use crate::domain::Customer;
use crate::domain::Error;
use crate::domain::ports::{RegisterCustomerRequest, UpdateCustomerRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Principal;
use crate::inbound::http::state::HttpState;

/// Customer representation returned by the API.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Customer> for CustomerDto {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id.to_string(),
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
            phone_number: customer.phone_number,
            address: customer.address,
            created_at: customer.created_at.to_rfc3339(),
            updated_at: customer.updated_at.to_rfc3339(),
        }
    }
}

/// Body for `POST /api/v1/customers`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerBody {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Body for `PUT /api/v1/customers/me`.
///
/// Absent fields keep their value, and so does an explicit `null`: the
/// wire format offers no way to clear the phone number or address once
/// set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCustomerBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

/// Register a new customer account.
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = RegisterCustomerBody,
    responses(
        (status = 201, description = "Customer registered", body = CustomerDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already in use", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["customers"],
    operation_id = "registerCustomer",
    security([])
)]
#[post("/customers")]
pub async fn register_customer(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterCustomerBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let customer = state
        .customers
        .register(RegisterCustomerRequest {
            email: body.email,
            first_name: body.first_name,
            last_name: body.last_name,
            phone_number: body.phone_number,
            address: body.address,
        })
        .await?;
    Ok(HttpResponse::Created().json(CustomerDto::from(customer)))
}

/// Fetch the authenticated customer's profile.
#[utoipa::path(
    get,
    path = "/api/v1/customers/me",
    responses(
        (status = 200, description = "Customer profile", body = CustomerDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["customers"],
    operation_id = "currentCustomer"
)]
#[get("/customers/me")]
pub async fn current_customer(
    state: web::Data<HttpState>,
    principal: Principal,
) -> ApiResult<web::Json<CustomerDto>> {
    let customer = state.customers_query.get(&principal.customer_id).await?;
    Ok(web::Json(customer.into()))
}

/// Update the authenticated customer's profile.
#[utoipa::path(
    put,
    path = "/api/v1/customers/me",
    request_body = UpdateCustomerBody,
    responses(
        (status = 200, description = "Updated profile", body = CustomerDto),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["customers"],
    operation_id = "updateCurrentCustomer"
)]
#[put("/customers/me")]
pub async fn update_current_customer(
    state: web::Data<HttpState>,
    principal: Principal,
    payload: web::Json<UpdateCustomerBody>,
) -> ApiResult<web::Json<CustomerDto>> {
    let body = payload.into_inner();
    let customer = state
        .customers
        .update(
            &principal.customer_id,
            UpdateCustomerRequest {
                first_name: body.first_name,
                last_name: body.last_name,
                phone_number: body.phone_number,
                address: body.address,
            },
        )
        .await?;
    Ok(web::Json(customer.into()))
}
