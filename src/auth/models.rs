use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthError;

/// Who is signed in: a trainer or one of their clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainer,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Trainer => "trainer",
            Role::Client => "client",
        }
    }
}

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // Subject (trainer or client ID)
    pub email: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTrainerRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub confirm_password: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
    #[validate(length(min = 1, message = "Password confirmation is required"))]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub account: AccountInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Set for clients only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trainer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Authenticated caller, attached to the request by the JWT middleware
#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub jti: String,
}

impl UserSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            user_id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            role: claims.role,
            jti: claims.jti.clone(),
        })
    }

    pub fn is_trainer(&self) -> bool {
        self.role == Role::Trainer
    }

    /// Trainer id of the caller, or 403 for clients
    pub fn trainer_id(&self) -> Result<Uuid, AuthError> {
        match self.role {
            Role::Trainer => Ok(self.user_id),
            Role::Client => Err(AuthError::InsufficientPermissions),
        }
    }

    /// Client id of the caller, or 403 for trainers
    pub fn client_id(&self) -> Result<Uuid, AuthError> {
        match self.role {
            Role::Client => Ok(self.user_id),
            Role::Trainer => Err(AuthError::InsufficientPermissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> UserSession {
        UserSession {
            user_id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn test_role_scoped_ids() {
        let trainer = session(Role::Trainer);
        assert_eq!(trainer.trainer_id().unwrap(), trainer.user_id);
        assert!(matches!(trainer.client_id(), Err(AuthError::InsufficientPermissions)));

        let client = session(Role::Client);
        assert_eq!(client.client_id().unwrap(), client.user_id);
        assert!(matches!(client.trainer_id(), Err(AuthError::InsufficientPermissions)));
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterTrainerRequest {
            name: "".to_string(),
            email: "not-an-email".to_string(),
            password: "Password1".to_string(),
            confirm_password: "Password1".to_string(),
            phone: None,
        };

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(!fields.contains_key("password"));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Trainer).unwrap(), "\"trainer\"");
        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }
}
