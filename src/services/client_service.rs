use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{generate_temporary_password, hash_password};
use crate::auth::{AuthError, Role, UserSession};
use crate::errors::ApiError;
use crate::models::{
    normalize_email, require_non_blank, validate_phone, Client, CreateClientRequest,
    CreateClientResponse, PaginationQuery, UpdateClientRequest,
};

const CLIENT_COLUMNS: &str = "id, trainer_id, name, email, phone, age, gender, height_cm, weight_kg, \
                              goal, monthly_fee, created_at, updated_at";

fn email_conflict(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::conflict("Email already exists")
        }
        _ => ApiError::from(err),
    }
}

#[derive(Clone)]
pub struct ClientService {
    db: PgPool,
}

impl ClientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Work out whose data the caller may see. Clients always get their own id;
    /// trainers must name one of their clients.
    pub async fn resolve_client_id(
        &self,
        session: &UserSession,
        requested: Option<Uuid>,
    ) -> Result<Uuid, ApiError> {
        match session.role {
            Role::Client => match requested {
                Some(client_id) if client_id != session.user_id => Err(ApiError::Forbidden(
                    "Clients can only access their own data".to_string(),
                )),
                _ => Ok(session.user_id),
            },
            Role::Trainer => {
                let client_id = requested.ok_or_else(|| ApiError::bad_request("clientId is required"))?;
                self.ensure_owned(session.user_id, client_id).await?;
                Ok(client_id)
            }
        }
    }

    /// 404 unless `client_id` belongs to `trainer_id`
    pub async fn ensure_owned(&self, trainer_id: Uuid, client_id: Uuid) -> Result<(), ApiError> {
        let owned = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1 AND trainer_id = $2)",
        )
        .bind(client_id)
        .bind(trainer_id)
        .fetch_one(&self.db)
        .await?;

        if !owned {
            return Err(ApiError::NotFound("Client"));
        }
        Ok(())
    }

    pub async fn create_client(
        &self,
        trainer_id: Uuid,
        request: CreateClientRequest,
    ) -> Result<CreateClientResponse, ApiError> {
        request.validate()?;
        require_non_blank(&request.name, "name")?;
        validate_phone(request.phone.as_deref())?;

        let (password, temporary_password) = match request.password.as_deref() {
            Some(password) if !password.is_empty() => (password.to_string(), None),
            _ => {
                let generated = generate_temporary_password();
                (generated.clone(), Some(generated))
            }
        };
        let password_hash = hash_password(&password).map_err(AuthError::from)?;

        let sql = format!(
            "INSERT INTO clients (id, trainer_id, name, email, password_hash, phone, age, gender,
                                  height_cm, weight_kg, goal, monthly_fee)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {}",
            CLIENT_COLUMNS
        );

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(request.name.trim())
            .bind(normalize_email(&request.email))
            .bind(&password_hash)
            .bind(&request.phone)
            .bind(request.age)
            .bind(&request.gender)
            .bind(request.height_cm)
            .bind(request.weight_kg)
            .bind(&request.goal)
            .bind(request.monthly_fee.unwrap_or(0))
            .fetch_one(&self.db)
            .await
            .map_err(email_conflict)?;

        tracing::info!(client_id = %client.id, %trainer_id, "client created");

        Ok(CreateClientResponse {
            client,
            temporary_password,
        })
    }

    pub async fn list_clients(&self, trainer_id: Uuid, pagination: &PaginationQuery) -> Result<Vec<Client>, ApiError> {
        pagination.validate()?;

        let sql = format!(
            "SELECT {} FROM clients WHERE trainer_id = $1
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            CLIENT_COLUMNS
        );

        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(trainer_id)
            .bind(pagination.get_limit())
            .bind(pagination.get_offset())
            .fetch_all(&self.db)
            .await?;

        Ok(clients)
    }

    pub async fn get_client(&self, client_id: Uuid) -> Result<Option<Client>, ApiError> {
        let sql = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);

        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(client_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(client)
    }

    pub async fn get_client_for_trainer(&self, trainer_id: Uuid, client_id: Uuid) -> Result<Client, ApiError> {
        self.get_client(client_id)
            .await?
            .filter(|client| client.trainer_id == trainer_id)
            .ok_or(ApiError::NotFound("Client"))
    }

    pub async fn update_client(
        &self,
        trainer_id: Uuid,
        client_id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<Client, ApiError> {
        request.validate()?;
        if let Some(name) = &request.name {
            require_non_blank(name, "name")?;
        }
        validate_phone(request.phone.as_deref())?;

        let sql = format!(
            "UPDATE clients
             SET name = COALESCE($3, name),
                 email = COALESCE($4, email),
                 phone = COALESCE($5, phone),
                 age = COALESCE($6, age),
                 gender = COALESCE($7, gender),
                 height_cm = COALESCE($8, height_cm),
                 weight_kg = COALESCE($9, weight_kg),
                 goal = COALESCE($10, goal),
                 monthly_fee = COALESCE($11, monthly_fee),
                 updated_at = NOW()
             WHERE id = $1 AND trainer_id = $2
             RETURNING {}",
            CLIENT_COLUMNS
        );

        sqlx::query_as::<_, Client>(&sql)
            .bind(client_id)
            .bind(trainer_id)
            .bind(request.name.as_deref().map(str::trim))
            .bind(request.email.as_deref().map(normalize_email))
            .bind(&request.phone)
            .bind(request.age)
            .bind(&request.gender)
            .bind(request.height_cm)
            .bind(request.weight_kg)
            .bind(&request.goal)
            .bind(request.monthly_fee)
            .fetch_optional(&self.db)
            .await
            .map_err(email_conflict)?
            .ok_or(ApiError::NotFound("Client"))
    }

    pub async fn delete_client(&self, trainer_id: Uuid, client_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND trainer_id = $2")
            .bind(client_id)
            .bind(trainer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Client"));
        }

        tracing::info!(%client_id, %trainer_id, "client deleted");
        Ok(())
    }
}
