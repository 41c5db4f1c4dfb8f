use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Role, UserSession};
use crate::errors::ApiError;
use crate::models::{
    check_max_chars, ensure_supported_date, require_non_blank, CreateDietRequest, Diet,
    UpdateDietRequest,
};

const MAX_CALORIES: i32 = 10_000;

const DIET_COLUMNS: &str = "id, trainer_id, client_id, title, meal_type, description, calories, \
                            scheduled_date, created_at, updated_at";

#[derive(Clone)]
pub struct DietService {
    db: PgPool,
}

impl DietService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_diet(&self, trainer_id: Uuid, request: CreateDietRequest) -> Result<Diet, ApiError> {
        request.validate()?;
        require_non_blank(&request.title, "title")?;
        if let Some(date) = request.scheduled_date {
            ensure_supported_date(date, "scheduledDate")?;
        }

        let sql = format!(
            "INSERT INTO diets (id, trainer_id, client_id, title, meal_type, description, calories, scheduled_date)
             SELECT $1, c.trainer_id, c.id, $4, $5, $6, $7, $8
             FROM clients c
             WHERE c.id = $3 AND c.trainer_id = $2
             RETURNING {}",
            DIET_COLUMNS
        );

        let diet = sqlx::query_as::<_, Diet>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(request.client_id)
            .bind(request.title.trim())
            .bind(request.meal_type)
            .bind(&request.description)
            .bind(request.calories)
            .bind(request.scheduled_date)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Client"))?;

        tracing::info!(diet_id = %diet.id, client_id = %diet.client_id, "diet assigned");
        Ok(diet)
    }

    pub async fn list_for_client(&self, client_id: Uuid, date: Option<NaiveDate>) -> Result<Vec<Diet>, ApiError> {
        // Meals in the order they are eaten
        let sql = format!(
            "SELECT {} FROM diets
             WHERE client_id = $1
               AND ($2::date IS NULL OR scheduled_date IS NULL OR scheduled_date = $2)
             ORDER BY scheduled_date NULLS FIRST, meal_type, created_at",
            DIET_COLUMNS
        );

        let diets = sqlx::query_as::<_, Diet>(&sql)
            .bind(client_id)
            .bind(date)
            .fetch_all(&self.db)
            .await?;

        Ok(diets)
    }

    pub async fn get_visible(&self, session: &UserSession, diet_id: Uuid) -> Result<Diet, ApiError> {
        let sql = format!("SELECT {} FROM diets WHERE id = $1", DIET_COLUMNS);

        let diet = sqlx::query_as::<_, Diet>(&sql)
            .bind(diet_id)
            .fetch_optional(&self.db)
            .await?;

        diet.filter(|d| match session.role {
            Role::Trainer => d.trainer_id == session.user_id,
            Role::Client => d.client_id == session.user_id,
        })
        .ok_or(ApiError::NotFound("Diet"))
    }

    pub async fn update_diet(&self, trainer_id: Uuid, diet_id: Uuid, request: UpdateDietRequest) -> Result<Diet, ApiError> {
        request.validate()?;
        if let Some(title) = &request.title {
            require_non_blank(title, "title")?;
        }
        let description = request.description.as_ref().map(Option::as_deref);
        check_max_chars(description.flatten(), 2000, "description")?;
        if let Some(Some(calories)) = request.calories {
            if !(0..=MAX_CALORIES).contains(&calories) {
                return Err(ApiError::bad_request(format!(
                    "Calories must be between 0 and {}",
                    MAX_CALORIES
                )));
            }
        }
        if let Some(Some(date)) = request.scheduled_date {
            ensure_supported_date(date, "scheduledDate")?;
        }

        let sql = format!(
            "UPDATE diets
             SET title = COALESCE($3, title),
                 meal_type = COALESCE($4, meal_type),
                 description = CASE WHEN $5 THEN $6::text ELSE description END,
                 calories = CASE WHEN $7 THEN $8::int ELSE calories END,
                 scheduled_date = CASE WHEN $9 THEN $10::date ELSE scheduled_date END,
                 updated_at = NOW()
             WHERE id = $1 AND trainer_id = $2
             RETURNING {}",
            DIET_COLUMNS
        );

        sqlx::query_as::<_, Diet>(&sql)
            .bind(diet_id)
            .bind(trainer_id)
            .bind(request.title.as_deref().map(str::trim))
            .bind(request.meal_type)
            .bind(description.is_some())
            .bind(description.flatten())
            .bind(request.calories.is_some())
            .bind(request.calories.flatten())
            .bind(request.scheduled_date.is_some())
            .bind(request.scheduled_date.flatten())
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Diet"))
    }

    pub async fn delete_diet(&self, trainer_id: Uuid, diet_id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM diets WHERE id = $1 AND trainer_id = $2")
            .bind(diet_id)
            .bind(trainer_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Diet"));
        }

        sqlx::query("DELETE FROM checklist_items WHERE item_type = 'diet' AND item_id = $1")
            .bind(diet_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
