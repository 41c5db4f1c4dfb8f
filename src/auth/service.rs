use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, PasswordPolicy,
};
use crate::auth::{
    AccountInfo, AuthError, AuthResponse, ChangePasswordRequest, JwtService, LoginRequest,
    MessageResponse, RegisterTrainerRequest, Role, UserSession,
};
use crate::models::{normalize_email, require_non_blank, validate_phone};

/// Login record shared by trainers and clients
#[derive(Debug, Clone, sqlx::FromRow)]
struct Credentials {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    trainer_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str, expires_in_hours: i64) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret, expires_in_hours),
            db,
        }
    }

    /// Sign up a new trainer account
    pub async fn register_trainer(&self, request: RegisterTrainerRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|errors| AuthError::Validation(errors.to_string()))?;
        require_non_blank(&request.name, "name")
            .map_err(|error| AuthError::Validation(error.to_string()))?;

        if request.password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password_strength(&request.password, &PasswordPolicy::default())?;
        validate_phone(request.phone.as_deref())
            .map_err(|error| AuthError::Validation(error.to_string()))?;

        let email = normalize_email(&request.email);
        if self.find_credentials(&email, Role::Trainer).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)?;

        let trainer_id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO trainers (id, name, email, password_hash, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(request.name.trim())
        .bind(&email)
        .bind(&password_hash)
        .bind(&request.phone)
        .fetch_one(&self.db)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AuthError::EmailAlreadyExists,
            _ => AuthError::Database(err),
        })?;

        tracing::info!(%trainer_id, "trainer registered");

        self.issue(AccountInfo {
            id: trainer_id,
            name: request.name.trim().to_string(),
            email,
            role: Role::Trainer,
            trainer_id: None,
        })
    }

    /// Log in as a trainer or a client
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request
            .validate()
            .map_err(|errors| AuthError::Validation(errors.to_string()))?;

        let email = normalize_email(&request.email);
        let credentials = self
            .find_credentials(&email, request.role)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &credentials.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.issue(AccountInfo {
            id: credentials.id,
            name: credentials.name,
            email: credentials.email,
            role: request.role,
            trainer_id: credentials.trainer_id,
        })
    }

    /// Change the password of the signed-in account
    pub async fn change_password(
        &self,
        session: &UserSession,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        request
            .validate()
            .map_err(|errors| AuthError::Validation(errors.to_string()))?;

        if request.new_password != request.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password_strength(&request.new_password, &PasswordPolicy::default())?;

        let credentials = self
            .credentials_by_id(session.user_id, session.role)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !verify_password(&request.current_password, &credentials.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&request.new_password)?;
        let sql = match session.role {
            Role::Trainer => "UPDATE trainers SET password_hash = $2, updated_at = NOW() WHERE id = $1",
            Role::Client => "UPDATE clients SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        };

        sqlx::query(sql)
            .bind(session.user_id)
            .bind(&password_hash)
            .execute(&self.db)
            .await?;

        Ok(MessageResponse {
            message: "Password changed successfully".to_string(),
        })
    }

    /// Validate user session from token
    pub fn validate_session(&self, token: &str) -> Result<UserSession, AuthError> {
        self.jwt_service.extract_user_session(token)
    }

    fn issue(&self, account: AccountInfo) -> Result<AuthResponse, AuthError> {
        let token = self
            .jwt_service
            .create_token(account.id, &account.email, account.role)?;

        Ok(AuthResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.expires_in_seconds(),
            account,
        })
    }

    async fn find_credentials(&self, email: &str, role: Role) -> Result<Option<Credentials>, AuthError> {
        let sql = match role {
            Role::Trainer => {
                "SELECT id, name, email, password_hash, NULL::uuid AS trainer_id
                 FROM trainers WHERE email = $1"
            }
            Role::Client => {
                "SELECT id, name, email, password_hash, trainer_id
                 FROM clients WHERE email = $1"
            }
        };

        let credentials = sqlx::query_as::<_, Credentials>(sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;

        Ok(credentials)
    }

    async fn credentials_by_id(&self, id: Uuid, role: Role) -> Result<Option<Credentials>, AuthError> {
        let sql = match role {
            Role::Trainer => {
                "SELECT id, name, email, password_hash, NULL::uuid AS trainer_id
                 FROM trainers WHERE id = $1"
            }
            Role::Client => {
                "SELECT id, name, email, password_hash, trainer_id
                 FROM clients WHERE id = $1"
            }
        };

        let credentials = sqlx::query_as::<_, Credentials>(sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(credentials)
    }
}
