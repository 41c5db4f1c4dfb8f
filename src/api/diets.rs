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
    ensure_supported_date, AssignmentQuery, CreateDietRequest, Diet, UpdateDietRequest,
};
use crate::services::{ClientService, DietService};

#[derive(Clone)]
pub struct DietAppState {
    pub client_service: ClientService,
    pub diet_service: DietService,
}

pub fn diet_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = DietAppState {
        client_service: ClientService::new(db.clone()),
        diet_service: DietService::new(db),
    };

    Router::new()
        .route("/", get(list_diets).post(create_diet))
        .route("/:id", get(get_diet).put(update_diet).delete(delete_diet))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_diets(
    State(state): State<DietAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<AssignmentQuery>, ApiError>,
) -> Result<Json<Vec<Diet>>, ApiError> {
    let date = query.date.map(|date| ensure_supported_date(date, "date")).transpose()?;

    let client_id = state
        .client_service
        .resolve_client_id(&session, query.client_id)
        .await?;

    let diets = state.diet_service.list_for_client(client_id, date).await?;
    Ok(Json(diets))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn create_diet(
    State(state): State<DietAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateDietRequest>, ApiError>,
) -> Result<(StatusCode, Json<Diet>), ApiError> {
    let diet = state
        .diet_service
        .create_diet(session.trainer_id()?, request)
        .await?;
    Ok((StatusCode::CREATED, Json(diet)))
}

async fn get_diet(
    State(state): State<DietAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(diet_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<Diet>, ApiError> {
    let diet = state.diet_service.get_visible(&session, diet_id).await?;
    Ok(Json(diet))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn update_diet(
    State(state): State<DietAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(diet_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateDietRequest>, ApiError>,
) -> Result<Json<Diet>, ApiError> {
    let diet = state
        .diet_service
        .update_diet(session.trainer_id()?, diet_id, request)
        .await?;
    Ok(Json(diet))
}

async fn delete_diet(
    State(state): State<DietAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(diet_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    state
        .diet_service
        .delete_diet(session.trainer_id()?, diet_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
