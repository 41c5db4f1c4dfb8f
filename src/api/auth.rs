use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::{post, put},
    Extension, Router,
};
use axum_extra::extract::WithRejection;

use crate::auth::{
    jwt_auth_middleware, AuthResponse, AuthService, ChangePasswordRequest, LoginRequest,
    MessageResponse, RegisterTrainerRequest, UserSession,
};
use crate::errors::ApiError;

/// Authentication routes
pub fn auth_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route(
            "/password",
            put(change_password).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .with_state(auth_service)
}

/// Register a new trainer
#[tracing::instrument(skip(auth_service, request))]
async fn register(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<RegisterTrainerRequest>, ApiError>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = auth_service.register_trainer(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login as a trainer or a client
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Change the caller's password
#[tracing::instrument(skip(auth_service, session, request), fields(user_id = %session.user_id))]
async fn change_password(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<ChangePasswordRequest>, ApiError>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = auth_service.change_password(&session, request).await?;
    Ok(Json(response))
}
