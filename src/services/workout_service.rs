use chrono::NaiveDate;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Role, UserSession};
use crate::errors::ApiError;
use crate::models::{
    check_max_chars, ensure_supported_date, require_non_blank, validate_exercises,
    CreateWorkoutRequest, UpdateWorkoutRequest, Workout,
};

const WORKOUT_COLUMNS: &str =
    "id, trainer_id, client_id, title, description, exercises, scheduled_date, created_at, updated_at";

#[derive(Clone)]
pub struct WorkoutService {
    db: PgPool,
}

impl WorkoutService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_workout(&self, trainer_id: Uuid, request: CreateWorkoutRequest) -> Result<Workout, ApiError> {
        request.validate()?;
        require_non_blank(&request.title, "title")?;
        validate_exercises(&request.exercises)?;
        if let Some(date) = request.scheduled_date {
            ensure_supported_date(date, "scheduledDate")?;
        }

        // Insert only when the client belongs to this trainer
        let sql = format!(
            "INSERT INTO workouts (id, trainer_id, client_id, title, description, exercises, scheduled_date)
             SELECT $1, c.trainer_id, c.id, $4, $5, $6, $7
             FROM clients c
             WHERE c.id = $3 AND c.trainer_id = $2
             RETURNING {}",
            WORKOUT_COLUMNS
        );

        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(Uuid::new_v4())
            .bind(trainer_id)
            .bind(request.client_id)
            .bind(request.title.trim())
            .bind(&request.description)
            .bind(Json(&request.exercises))
            .bind(request.scheduled_date)
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Client"))?;

        tracing::info!(workout_id = %workout.id, client_id = %workout.client_id, "workout assigned");
        Ok(workout)
    }

    /// Workouts of one client, optionally only those active on `date`
    pub async fn list_for_client(&self, client_id: Uuid, date: Option<NaiveDate>) -> Result<Vec<Workout>, ApiError> {
        let sql = format!(
            "SELECT {} FROM workouts
             WHERE client_id = $1
               AND ($2::date IS NULL OR scheduled_date IS NULL OR scheduled_date = $2)
             ORDER BY scheduled_date NULLS FIRST, created_at",
            WORKOUT_COLUMNS
        );

        let workouts = sqlx::query_as::<_, Workout>(&sql)
            .bind(client_id)
            .bind(date)
            .fetch_all(&self.db)
            .await?;

        Ok(workouts)
    }

    /// A workout the caller may read: trainers see what they assigned,
    /// clients what was assigned to them
    pub async fn get_visible(&self, session: &UserSession, workout_id: Uuid) -> Result<Workout, ApiError> {
        let sql = format!("SELECT {} FROM workouts WHERE id = $1", WORKOUT_COLUMNS);

        let workout = sqlx::query_as::<_, Workout>(&sql)
            .bind(workout_id)
            .fetch_optional(&self.db)
            .await?;

        workout
            .filter(|w| match session.role {
                Role::Trainer => w.trainer_id == session.user_id,
                Role::Client => w.client_id == session.user_id,
            })
            .ok_or(ApiError::NotFound("Workout"))
    }

    pub async fn update_workout(
        &self,
        trainer_id: Uuid,
        workout_id: Uuid,
        request: UpdateWorkoutRequest,
    ) -> Result<Workout, ApiError> {
        request.validate()?;
        if let Some(title) = &request.title {
            require_non_blank(title, "title")?;
        }
        if let Some(exercises) = &request.exercises {
            validate_exercises(exercises)?;
        }
        let description = request.description.as_ref().map(Option::as_deref);
        check_max_chars(description.flatten(), 2000, "description")?;
        if let Some(Some(date)) = request.scheduled_date {
            ensure_supported_date(date, "scheduledDate")?;
        }

        // Absent fields keep their value; description and schedule may be
        // cleared with an explicit null
        let sql = format!(
            "UPDATE workouts
             SET title = COALESCE($3, title),
                 description = CASE WHEN $4 THEN $5::text ELSE description END,
                 exercises = COALESCE($6, exercises),
                 scheduled_date = CASE WHEN $7 THEN $8::date ELSE scheduled_date END,
                 updated_at = NOW()
             WHERE id = $1 AND trainer_id = $2
             RETURNING {}",
            WORKOUT_COLUMNS
        );

        sqlx::query_as::<_, Workout>(&sql)
            .bind(workout_id)
            .bind(trainer_id)
            .bind(request.title.as_deref().map(str::trim))
            .bind(description.is_some())
            .bind(description.flatten())
            .bind(request.exercises.as_ref().map(Json))
            .bind(request.scheduled_date.is_some())
            .bind(request.scheduled_date.flatten())
            .fetch_optional(&self.db)
            .await?
            .ok_or(ApiError::NotFound("Workout"))
    }

    pub async fn delete_workout(&self, trainer_id: Uuid, workout_id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.db.begin().await?;

        let result = sqlx::query("DELETE FROM workouts WHERE id = $1 AND trainer_id = $2")
            .bind(workout_id)
            .bind(trainer_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("Workout"));
        }

        sqlx::query("DELETE FROM checklist_items WHERE item_type = 'workout' AND item_id = $1")
            .bind(workout_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
