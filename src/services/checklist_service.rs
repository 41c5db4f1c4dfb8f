use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{
    ChecklistItem, ChecklistItemType, PlannedItem, ProgressResponse, UpsertChecklistRequest,
};
use crate::services::progress;

const CHECKLIST_COLUMNS: &str =
    "id, client_id, date, item_type, item_id, completed, completed_at, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct PlannedRow {
    item_type: ChecklistItemType,
    item_id: Uuid,
    scheduled_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ChecklistService {
    db: PgPool,
}

impl ChecklistService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record (or un-record) completion of one assigned item on one day.
    /// Keyed on client + date + item type + item id.
    pub async fn upsert(&self, client_id: Uuid, request: UpsertChecklistRequest) -> Result<ChecklistItem, ApiError> {
        let assigned_sql = match request.item_type {
            ChecklistItemType::Workout => {
                "SELECT EXISTS(SELECT 1 FROM workouts WHERE id = $1 AND client_id = $2)"
            }
            ChecklistItemType::Diet => "SELECT EXISTS(SELECT 1 FROM diets WHERE id = $1 AND client_id = $2)",
        };

        let assigned = sqlx::query_scalar::<_, bool>(assigned_sql)
            .bind(request.item_id)
            .bind(client_id)
            .fetch_one(&self.db)
            .await?;

        if !assigned {
            return Err(match request.item_type {
                ChecklistItemType::Workout => ApiError::NotFound("Workout"),
                ChecklistItemType::Diet => ApiError::NotFound("Diet"),
            });
        }

        let sql = format!(
            "INSERT INTO checklist_items (id, client_id, date, item_type, item_id, completed, completed_at)
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN NOW() ELSE NULL END)
             ON CONFLICT (client_id, date, item_type, item_id) DO UPDATE
             SET completed = EXCLUDED.completed,
                 completed_at = EXCLUDED.completed_at,
                 updated_at = NOW()
             RETURNING {}",
            CHECKLIST_COLUMNS
        );

        let item = sqlx::query_as::<_, ChecklistItem>(&sql)
            .bind(Uuid::new_v4())
            .bind(client_id)
            .bind(request.date)
            .bind(request.item_type)
            .bind(request.item_id)
            .bind(request.completed)
            .fetch_one(&self.db)
            .await?;

        tracing::debug!(
            %client_id,
            date = %item.date,
            item_id = %item.item_id,
            completed = item.completed,
            "checklist entry saved"
        );

        Ok(item)
    }

    /// Entries in the inclusive range `from..=to`
    pub async fn list(&self, client_id: Uuid, from: NaiveDate, to: NaiveDate) -> Result<Vec<ChecklistItem>, ApiError> {
        let sql = format!(
            "SELECT {} FROM checklist_items
             WHERE client_id = $1 AND date BETWEEN $2 AND $3
             ORDER BY date, item_type, created_at",
            CHECKLIST_COLUMNS
        );

        let items = sqlx::query_as::<_, ChecklistItem>(&sql)
            .bind(client_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.db)
            .await?;

        Ok(items)
    }

    pub async fn planned_items(&self, client_id: Uuid) -> Result<Vec<PlannedItem>, ApiError> {
        let rows = sqlx::query_as::<_, PlannedRow>(
            "SELECT 'workout'::checklist_item_type AS item_type, id AS item_id, scheduled_date
             FROM workouts WHERE client_id = $1
             UNION ALL
             SELECT 'diet'::checklist_item_type AS item_type, id AS item_id, scheduled_date
             FROM diets WHERE client_id = $1",
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PlannedItem {
                item_type: row.item_type,
                item_id: row.item_id,
                scheduled_date: row.scheduled_date,
            })
            .collect())
    }

    /// Daily, weekly and streak figures as of `date`
    pub async fn progress(&self, client_id: Uuid, date: NaiveDate) -> Result<ProgressResponse, ApiError> {
        let plan = self.planned_items(client_id).await?;

        // Streaks look at the whole history
        let sql = format!(
            "SELECT {} FROM checklist_items
             WHERE client_id = $1 AND completed
             ORDER BY date",
            CHECKLIST_COLUMNS
        );
        let entries = sqlx::query_as::<_, ChecklistItem>(&sql)
            .bind(client_id)
            .fetch_all(&self.db)
            .await?;

        let days = progress::completed_days(&entries);

        Ok(ProgressResponse {
            client_id,
            date,
            day: progress::day_progress(&plan, &entries, date),
            week: progress::week_progress(&plan, &entries, date),
            current_streak: progress::current_streak(&days, date),
            longest_streak: progress::longest_streak(&days),
        })
    }
}
