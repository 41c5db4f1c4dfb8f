use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::auth::{jwt_auth_middleware, trainer_only_middleware, AuthService, UserSession};
use crate::errors::ApiError;
use crate::models::{Trainer, TrainerDashboard, UpdateTrainerRequest};
use crate::services::TrainerService;

#[derive(Clone)]
pub struct TrainerAppState {
    pub trainer_service: TrainerService,
}

pub fn trainer_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = TrainerAppState {
        trainer_service: TrainerService::new(db),
    };

    Router::new()
        .route("/me", get(get_profile).put(update_profile))
        .route("/me/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn(trainer_only_middleware))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session), fields(trainer_id = %session.user_id))]
async fn get_profile(
    State(state): State<TrainerAppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<Trainer>, ApiError> {
    let trainer = state.trainer_service.get_trainer(session.trainer_id()?).await?;
    Ok(Json(trainer))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn update_profile(
    State(state): State<TrainerAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateTrainerRequest>, ApiError>,
) -> Result<Json<Trainer>, ApiError> {
    let trainer = state
        .trainer_service
        .update_trainer(session.trainer_id()?, request)
        .await?;
    Ok(Json(trainer))
}

/// Counts and payment totals for the trainer's home screen
#[tracing::instrument(skip(state, session), fields(trainer_id = %session.user_id))]
async fn get_dashboard(
    State(state): State<TrainerAppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<TrainerDashboard>, ApiError> {
    let dashboard = state.trainer_service.dashboard(session.trainer_id()?).await?;
    Ok(Json(dashboard))
}
