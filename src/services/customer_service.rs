use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use crate::{
    audit,
    dto::customers::CreateCustomerRequest,
    entity::customers::ActiveModel as CustomerActive,
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_owner_or_admin},
    models::Customer,
    repository::customers,
    state::AppState,
};

/// Register a customer. Credentials were already hashed upstream.
pub async fn create_customer(state: &AppState, payload: CreateCustomerRequest) -> AppResult<Customer> {
    let CreateCustomerRequest {
        name,
        email,
        password_hash,
        shipping_address,
    } = payload;

    let name = name.trim().to_string();
    let email = email.trim().to_lowercase();
    if name.is_empty() || password_hash.is_empty() {
        return Err(AppError::Validation("name and password hash are required".into()));
    }
    if !is_plausible_email(&email) {
        return Err(AppError::Validation(format!("invalid email '{email}'")));
    }

    if customers::find_by_email(&state.orm, &email).await?.is_some() {
        return Err(AppError::Duplicate(format!("email '{email}'")));
    }

    let customer = CustomerActive {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        shipping_address: Set(shipping_address.filter(|a| !a.trim().is_empty())),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await
    .map_err(|e| AppError::from_constraint(e, || AppError::Duplicate(format!("email '{email}'"))))?;

    audit::record(
        &state.orm,
        Some(customer.id),
        "customer_register",
        "customers",
        serde_json::json!({ "customer_id": customer.id }),
    )
    .await;

    Ok(customer.into())
}

pub async fn get_customer(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<Customer> {
    ensure_owner_or_admin(user, id)?;
    customers::find_by_id(&state.orm, id)
        .await?
        .map(Customer::from)
        .ok_or(AppError::NotFound("customer"))
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
