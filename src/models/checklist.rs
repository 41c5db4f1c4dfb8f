use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "checklist_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChecklistItemType {
    Workout,
    Diet,
}

/// One client's completion record for one assigned item on one day
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    pub id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub item_type: ChecklistItemType,
    pub item_id: Uuid,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertChecklistRequest {
    pub date: NaiveDate,
    pub item_type: ChecklistItemType,
    pub item_id: Uuid,
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistQuery {
    pub client_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
    pub client_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

/// An assigned workout or diet as seen by the progress calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedItem {
    pub item_type: ChecklistItemType,
    pub item_id: Uuid,
    pub scheduled_date: Option<NaiveDate>,
}

impl PlannedItem {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.scheduled_date.map_or(true, |scheduled| scheduled == date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayProgress {
    pub date: NaiveDate,
    pub completed: u32,
    pub total: u32,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekProgress {
    pub week_start: NaiveDate,
    pub days: Vec<DayProgress>,
    pub completed: u32,
    pub total: u32,
    pub percent: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub client_id: Uuid,
    pub date: NaiveDate,
    pub day: DayProgress,
    pub week: WeekProgress,
    pub current_streak: u32,
    pub longest_streak: u32,
}
