use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::{
    require_non_blank, validate_phone, Trainer, TrainerDashboard, UpdateTrainerRequest,
};

const TRAINER_COLUMNS: &str = "id, name, email, phone, created_at, updated_at";

#[derive(Clone)]
pub struct TrainerService {
    db: PgPool,
}

impl TrainerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn get_trainer(&self, trainer_id: Uuid) -> Result<Trainer, ApiError> {
        let sql = format!("SELECT {} FROM trainers WHERE id = $1", TRAINER_COLUMNS);

        sqlx::query_as::<_, Trainer>(&sql)
            .bind(trainer_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Trainer"))
    }

    pub async fn update_trainer(&self, trainer_id: Uuid, request: UpdateTrainerRequest) -> Result<Trainer, ApiError> {
        request.validate()?;
        if let Some(name) = &request.name {
            require_non_blank(name, "name")?;
        }
        validate_phone(request.phone.as_deref())?;

        let sql = format!(
            "UPDATE trainers
             SET name = COALESCE($2, name),
                 phone = COALESCE($3, phone),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TRAINER_COLUMNS
        );

        sqlx::query_as::<_, Trainer>(&sql)
            .bind(trainer_id)
            .bind(request.name.as_deref().map(str::trim))
            .bind(&request.phone)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Trainer"))
    }

    pub async fn dashboard(&self, trainer_id: Uuid) -> Result<TrainerDashboard, ApiError> {
        let dashboard = sqlx::query_as::<_, TrainerDashboard>(
            "SELECT
                (SELECT COUNT(*) FROM clients WHERE trainer_id = $1) AS client_count,
                (SELECT COUNT(*) FROM workouts WHERE trainer_id = $1) AS workout_count,
                (SELECT COUNT(*) FROM diets WHERE trainer_id = $1) AS diet_count,
                (SELECT COALESCE(SUM(amount), 0)::BIGINT FROM payments
                    WHERE trainer_id = $1 AND status = 'paid') AS paid_payments_total,
                (SELECT COUNT(*) FROM payments
                    WHERE trainer_id = $1 AND status = 'created') AS pending_payments_count",
        )
        .bind(trainer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(dashboard)
    }
}
