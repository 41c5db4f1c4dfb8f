use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use super::auth::auth_routes;
use super::checklist::checklist_routes;
use super::clients::client_routes;
use super::diets::diet_routes;
use super::health::{db_health_check, health_check};
use super::payments::payment_routes;
use super::trainers::trainer_routes;
use super::workouts::workout_routes;
use crate::auth::{cors_layer, frame_options_layer, security_headers_layer, AuthService};
use crate::config::AppConfig;
use crate::services::PaymentGateway;

pub fn create_routes(
    db: PgPool,
    config: &AppConfig,
    gateway: Arc<dyn PaymentGateway>,
    currency: &str,
) -> Router {
    let auth_service = AuthService::new(db.clone(), &config.jwt_secret, config.jwt_expires_in_hours);

    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .with_state(db.clone());

    Router::new()
        .merge(health)
        .nest("/api/auth", auth_routes(auth_service.clone()))
        .nest("/api/trainers", trainer_routes(db.clone(), auth_service.clone()))
        .nest("/api/clients", client_routes(db.clone(), auth_service.clone()))
        .nest("/api/workouts", workout_routes(db.clone(), auth_service.clone()))
        .nest("/api/diets", diet_routes(db.clone(), auth_service.clone()))
        .nest("/api/checklist", checklist_routes(db.clone(), auth_service.clone()))
        .nest(
            "/api/payments",
            payment_routes(db, auth_service, gateway, currency),
        )
        .layer(security_headers_layer())
        .layer(frame_options_layer())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}
