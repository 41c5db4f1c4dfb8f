use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::validation::deserialize_clearable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Diet {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub meal_type: MealType,
    pub description: Option<String>,
    pub calories: Option<i32>,
    /// `None` means the meal is part of every day's plan
    pub scheduled_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDietRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub meal_type: MealType,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0, max = 10000, message = "Calories must be between 0 and 10000"))]
    pub calories: Option<i32>,
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDietRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub meal_type: Option<MealType>,
    /// For the three fields below an explicit `null` clears the stored value
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub calories: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub scheduled_date: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_rejects_unknown_values() {
        let result = serde_json::from_value::<CreateDietRequest>(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "title": "Oats",
            "mealType": "brunch"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_update_request_keeps_null_apart_from_missing() {
        let request: UpdateDietRequest = serde_json::from_value(serde_json::json!({
            "calories": null,
            "scheduledDate": "2024-01-17"
        }))
        .unwrap();

        assert_eq!(request.calories, Some(None));
        assert_eq!(request.scheduled_date, NaiveDate::from_ymd_opt(2024, 1, 17).map(Some));
        assert_eq!(request.description, None);
    }

    #[test]
    fn test_negative_calories_fail_validation() {
        let request: CreateDietRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "title": "Oats",
            "mealType": "breakfast",
            "calories": -10
        }))
        .unwrap();

        assert_eq!(request.meal_type, MealType::Breakfast);
        assert!(request.validate().is_err());
    }
}
