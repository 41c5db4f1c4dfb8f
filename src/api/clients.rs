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

use crate::auth::{
    client_only_middleware, jwt_auth_middleware, trainer_only_middleware, AuthService, UserSession,
};
use crate::errors::ApiError;
use crate::models::{
    Client, CreateClientRequest, CreateClientResponse, PaginationQuery, UpdateClientRequest,
};
use crate::services::ClientService;

#[derive(Clone)]
pub struct ClientAppState {
    pub client_service: ClientService,
}

pub fn client_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = ClientAppState {
        client_service: ClientService::new(db),
    };

    // A client's own profile
    let self_service = Router::new()
        .route("/me", get(get_own_profile))
        .route_layer(middleware::from_fn(client_only_middleware));

    let management = Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
        .route_layer(middleware::from_fn(trainer_only_middleware));

    Router::new()
        .merge(self_service)
        .merge(management)
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session, pagination), fields(trainer_id = %session.user_id))]
async fn list_clients(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(pagination), _): WithRejection<Query<PaginationQuery>, ApiError>,
) -> Result<Json<Vec<Client>>, ApiError> {
    let clients = state
        .client_service
        .list_clients(session.trainer_id()?, &pagination)
        .await?;
    Ok(Json(clients))
}

/// Create a client login. Without a password a temporary one is generated
/// and returned once.
#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn create_client(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateClientRequest>, ApiError>,
) -> Result<(StatusCode, Json<CreateClientResponse>), ApiError> {
    let response = state
        .client_service
        .create_client(session.trainer_id()?, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[tracing::instrument(skip(state, session), fields(trainer_id = %session.user_id))]
async fn get_client(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(client_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .client_service
        .get_client_for_trainer(session.trainer_id()?, client_id)
        .await?;
    Ok(Json(client))
}

#[tracing::instrument(skip(state, session, request), fields(trainer_id = %session.user_id))]
async fn update_client(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(client_id), _): WithRejection<Path<Uuid>, ApiError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateClientRequest>, ApiError>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .client_service
        .update_client(session.trainer_id()?, client_id, request)
        .await?;
    Ok(Json(client))
}

#[tracing::instrument(skip(state, session), fields(trainer_id = %session.user_id))]
async fn delete_client(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Path(client_id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    state
        .client_service
        .delete_client(session.trainer_id()?, client_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, session), fields(client_id = %session.user_id))]
async fn get_own_profile(
    State(state): State<ClientAppState>,
    Extension(session): Extension<UserSession>,
) -> Result<Json<Client>, ApiError> {
    let client = state
        .client_service
        .get_client(session.client_id()?)
        .await?
        .ok_or(ApiError::NotFound("Client"))?;
    Ok(Json(client))
}
