use serde::Deserialize;
use utoipa::ToSchema;

/// Signup payload. The hash is produced by the authentication layer and is
/// stored as given.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub shipping_address: Option<String>,
}
