use axum::{
    extract::{Query, State},
    middleware,
    response::Json,
    routing::get,
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::auth::{jwt_auth_middleware, AuthService, UserSession};
use crate::errors::ApiError;
use crate::models::{
    ensure_supported_date, resolve_date_range, ChecklistItem, ChecklistQuery, ProgressQuery,
    ProgressResponse, UpsertChecklistRequest,
};
use crate::services::{ChecklistService, ClientService};

#[derive(Clone)]
pub struct ChecklistAppState {
    pub client_service: ClientService,
    pub checklist_service: ChecklistService,
}

pub fn checklist_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = ChecklistAppState {
        client_service: ClientService::new(db.clone()),
        checklist_service: ChecklistService::new(db),
    };

    Router::new()
        .route("/", get(list_entries).put(upsert_entry))
        .route("/progress", get(get_progress))
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

/// Only the client ticks items off
#[tracing::instrument(skip(state, session), fields(client_id = %session.user_id))]
async fn upsert_entry(
    State(state): State<ChecklistAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<UpsertChecklistRequest>, ApiError>,
) -> Result<Json<ChecklistItem>, ApiError> {
    ensure_supported_date(request.date, "date")?;
    let item = state
        .checklist_service
        .upsert(session.client_id()?, request)
        .await?;
    Ok(Json(item))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_entries(
    State(state): State<ChecklistAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<ChecklistQuery>, ApiError>,
) -> Result<Json<Vec<ChecklistItem>>, ApiError> {
    let today = chrono::Utc::now().date_naive();
    let (from, to) = resolve_date_range(query.from, query.to, today)?;

    let client_id = state
        .client_service
        .resolve_client_id(&session, query.client_id)
        .await?;

    let items = state.checklist_service.list(client_id, from, to).await?;
    Ok(Json(items))
}

/// Day, week and streak figures for one client
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn get_progress(
    State(state): State<ChecklistAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<ProgressQuery>, ApiError>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let date = match query.date {
        Some(date) => ensure_supported_date(date, "date")?,
        None => chrono::Utc::now().date_naive(),
    };

    let client_id = state
        .client_service
        .resolve_client_id(&session, query.client_id)
        .await?;

    let progress = state.checklist_service.progress(client_id, date).await?;
    Ok(Json(progress))
}
