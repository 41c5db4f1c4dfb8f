use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub goal: Option<String>,
    /// Minor currency units
    pub monthly_fee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    /// A temporary password is generated when absent
    pub password: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(range(min = 30.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 10.0, max = 500.0))]
    pub weight_kg: Option<f64>,
    #[validate(length(max = 500))]
    pub goal: Option<String>,
    #[validate(range(min = 0))]
    pub monthly_fee: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(range(min = 1, max = 120))]
    pub age: Option<i32>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(range(min = 30.0, max = 300.0))]
    pub height_cm: Option<f64>,
    #[validate(range(min = 10.0, max = 500.0))]
    pub weight_kg: Option<f64>,
    #[validate(length(max = 500))]
    pub goal: Option<String>,
    #[validate(range(min = 0))]
    pub monthly_fee: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientResponse {
    pub client: Client,
    /// Only present when the server generated the password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_password: Option<String>,
}
