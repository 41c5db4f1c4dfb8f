use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::errors::ApiError;
use crate::models::{
    ensure_supported_date, AssignmentQuery, CreateWorkoutRequest, UpdateWorkoutRequest, Workout,
};
use crate::services::{ClientService, WorkoutService};

#[derive(Clone)]
pub struct WorkoutAppState {
    pub client_service: ClientService,
    pub workout_service: WorkoutService,
}

/// Trainers manage workouts; clients may read their own
pub fn workout_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = WorkoutAppState {
        client_service: ClientService::new(db.clone()),
        workout_service: WorkoutService::new(db),
    };

    Router::new()
        .route("/", get(list_workouts).post(create_workout))
        .route("/:id", get(get_workout).put(update_workout).delete(delete_workout))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_workouts(
    State(state): State<WorkoutAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<AssignmentQuery>, ApiError>,
) -> Result<Json<Vec<Workout>>, ApiError> {
    let date = query.date.map(|date| ensure_supported_date(date, "date")).transpose()?;

    let client_id = state
        .client_service
        .resolve_client_id(&session, query.client_id)
        .await?;

    let workouts = state
        .workout_service
        .list_for_client(client_id, date)
        .await?;
    Ok(Json(workouts))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn create_workout(
    State(state): State<WorkoutAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateWorkoutRequest>, ApiError>,
) -> Result<(StatusCode, Json<Workout>), ApiError> {
    let trainer_id = session.trainer_id()?;
    let workout = state.workout_service.create_workout(trainer_id, request).await?;
    Ok((StatusCode::CREATED, Json(workout)))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn get_workout(
    State(state): State<WorkoutAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<Workout>, ApiError> {
    let workout = state.workout_service.get_visible(&session, workout_id).await?;
    Ok(Json(workout))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn update_workout(
    State(state): State<WorkoutAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateWorkoutRequest>, ApiError>,
) -> Result<Json<Workout>, ApiError> {
    let trainer_id = session.trainer_id()?;
    let workout = state
        .workout_service
        .update_workout(trainer_id, workout_id, request)
        .await?;
    Ok(Json(workout))
}

#[tracing::instrument(skip(state, session), fields(trainer_id = %session.user_id))]
async fn delete_workout(
    State(state): State<WorkoutAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(workout_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    let trainer_id = session.trainer_id()?;
    state.workout_service.delete_workout(trainer_id, workout_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
