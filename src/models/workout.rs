use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ApiError;
use crate::models::validation::deserialize_clearable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub duration_minutes: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub exercises: Json<Vec<Exercise>>,
    /// `None` means the workout is part of every day's plan
    pub scheduled_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkoutRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    pub scheduled_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkoutRequest {
    #[validate(length(min = 1, max = 200, message = "Title cannot be empty"))]
    pub title: Option<String>,
    /// `null` clears the description
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub description: Option<Option<String>>,
    pub exercises: Option<Vec<Exercise>>,
    /// `null` turns the workout back into a daily one
    #[serde(default, deserialize_with = "deserialize_clearable")]
    pub scheduled_date: Option<Option<NaiveDate>>,
}

/// `?clientId=&date=` filter for workout and diet listings
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentQuery {
    pub client_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

/// Exercises must be named and carry non-negative counts
pub fn validate_exercises(exercises: &[Exercise]) -> Result<(), ApiError> {
    for (index, exercise) in exercises.iter().enumerate() {
        if exercise.name.trim().is_empty() {
            return Err(ApiError::bad_request(format!(
                "Exercise {} is missing a name",
                index + 1
            )));
        }

        let counts = [exercise.sets, exercise.reps, exercise.duration_minutes];
        if counts.iter().flatten().any(|value| *value < 0) {
            return Err(ApiError::bad_request(format!(
                "Exercise '{}' has a negative value",
                exercise.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(name: &str, sets: Option<i32>) -> Exercise {
        Exercise {
            name: name.to_string(),
            sets,
            reps: Some(10),
            duration_minutes: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_exercises() {
        assert!(validate_exercises(&[]).is_ok());
        assert!(validate_exercises(&[exercise("Squat", Some(4))]).is_ok());
        assert!(validate_exercises(&[exercise("", Some(4))]).is_err());
        assert!(validate_exercises(&[exercise("Squat", Some(-1))]).is_err());
    }

    #[test]
    fn test_create_request_defaults_exercises() {
        let request: CreateWorkoutRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "title": "Upper body"
        }))
        .unwrap();

        assert!(request.exercises.is_empty());
        assert!(request.scheduled_date.is_none());
    }

    #[test]
    fn test_update_request_null_clears_schedule() {
        let cleared: UpdateWorkoutRequest =
            serde_json::from_value(serde_json::json!({ "scheduledDate": null })).unwrap();
        assert_eq!(cleared.scheduled_date, Some(None));
        assert_eq!(cleared.description, None);

        let untouched: UpdateWorkoutRequest =
            serde_json::from_value(serde_json::json!({ "title": "Push day" })).unwrap();
        assert_eq!(untouched.scheduled_date, None);
    }

    #[test]
    fn test_workout_serializes_exercises_inline() {
        let workout = Workout {
            id: Uuid::new_v4(),
            trainer_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            title: "Legs".to_string(),
            description: None,
            exercises: Json(vec![exercise("Lunge", Some(3))]),
            scheduled_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&workout).unwrap();
        assert_eq!(value["exercises"][0]["name"], "Lunge");
        assert_eq!(value["exercises"][0]["durationMinutes"], serde_json::Value::Null);
        assert!(value["clientId"].is_string());
    }
}
