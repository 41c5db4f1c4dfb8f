use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::models::*;
use crate::services::*;

pub const DEMO_TRAINER_EMAIL: &str = "coach@example.com";
pub const DEMO_CLIENT_EMAIL: &str = "member@example.com";
pub const DEMO_PASSWORD: &str = "password123";

/// Demo data for local development, enabled with `SEED_DEMO_DATA=true`.
/// Running it twice is a no-op.
pub struct DatabaseSeeder {
    pool: PgPool,
}

impl DatabaseSeeder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn seed_all(&self) -> Result<()> {
        tracing::info!("Starting database seeding...");

        let trainer_id = self.seed_trainer().await?;
        if let Some(client_id) = self.seed_client(trainer_id).await? {
            self.seed_plan(trainer_id, client_id).await?;
        }

        tracing::info!("Database seeding completed!");
        Ok(())
    }

    async fn seed_trainer(&self) -> Result<Uuid> {
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM trainers WHERE email = $1")
            .bind(DEMO_TRAINER_EMAIL)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let password_hash = hash_password(DEMO_PASSWORD)?;
        let id = sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO trainers (id, name, email, password_hash, phone)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind("Demo Coach")
        .bind(DEMO_TRAINER_EMAIL)
        .bind(&password_hash)
        .bind("+91 98765 43210")
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(trainer_id = %id, "Created demo trainer");
        Ok(id)
    }

    /// Returns `None` when the demo client already exists
    async fn seed_client(&self, trainer_id: Uuid) -> Result<Option<Uuid>> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM clients WHERE email = $1)")
            .bind(DEMO_CLIENT_EMAIL)
            .fetch_one(&self.pool)
            .await?;

        if exists {
            return Ok(None);
        }

        let response = ClientService::new(self.pool.clone())
            .create_client(
                trainer_id,
                CreateClientRequest {
                    name: "Demo Member".to_string(),
                    email: DEMO_CLIENT_EMAIL.to_string(),
                    password: Some(DEMO_PASSWORD.to_string()),
                    phone: None,
                    age: Some(29),
                    gender: Some("female".to_string()),
                    height_cm: Some(165.0),
                    weight_kg: Some(62.5),
                    goal: Some("Build strength".to_string()),
                    monthly_fee: Some(150_000),
                },
            )
            .await?;

        tracing::info!(client_id = %response.client.id, "Created demo client");
        Ok(Some(response.client.id))
    }

    async fn seed_plan(&self, trainer_id: Uuid, client_id: Uuid) -> Result<()> {
        WorkoutService::new(self.pool.clone())
            .create_workout(
                trainer_id,
                CreateWorkoutRequest {
                    client_id,
                    title: "Full body basics".to_string(),
                    description: Some("Daily routine".to_string()),
                    exercises: vec![
                        Exercise {
                            name: "Squat".to_string(),
                            sets: Some(3),
                            reps: Some(10),
                            duration_minutes: None,
                            notes: None,
                        },
                        Exercise {
                            name: "Plank".to_string(),
                            sets: Some(3),
                            reps: None,
                            duration_minutes: Some(1),
                            notes: Some("Keep hips level".to_string()),
                        },
                    ],
                    scheduled_date: None,
                },
            )
            .await?;

        DietService::new(self.pool.clone())
            .create_diet(
                trainer_id,
                CreateDietRequest {
                    client_id,
                    title: "Oats and fruit".to_string(),
                    meal_type: MealType::Breakfast,
                    description: None,
                    calories: Some(450),
                    scheduled_date: None,
                },
            )
            .await?;

        tracing::info!(%client_id, "Created demo workout and diet");
        Ok(())
    }
}
