use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use axum_extra::extract::WithRejection;
use sqlx::PgPool;

use crate::auth::{client_only_middleware, jwt_auth_middleware, AuthService, UserSession};
use crate::errors::ApiError;
use crate::models::{
    CreateOrderRequest, CreateOrderResponse, Payment, PaymentQuery, VerifyPaymentRequest,
};
use crate::services::{PaymentGateway, PaymentService};

#[derive(Clone)]
pub struct PaymentAppState {
    pub payment_service: PaymentService,
}

pub fn payment_routes(
    db: PgPool,
    auth_service: AuthService,
    gateway: Arc<dyn PaymentGateway>,
    currency: &str,
) -> Router {
    let state = PaymentAppState {
        payment_service: PaymentService::new(db, gateway, currency),
    };

    let checkout = Router::new()
        .route("/orders", post(create_order))
        .route("/verify", post(verify_payment))
        .route_layer(middleware::from_fn(client_only_middleware));

    Router::new()
        .route("/", get(list_payments))
        .merge(checkout)
        .route_layer(middleware::from_fn_with_state(auth_service, jwt_auth_middleware))
        .with_state(state)
}

#[tracing::instrument(skip(state, session, request), fields(client_id = %session.user_id))]
async fn create_order(
    State(state): State<PaymentAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<CreateOrderRequest>, ApiError>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let order = state
        .payment_service
        .create_order(session.client_id()?, request)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Confirm a checkout using the gateway's signature
#[tracing::instrument(skip(state, session, request), fields(client_id = %session.user_id))]
async fn verify_payment(
    State(state): State<PaymentAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Json(request), _): WithRejection<Json<VerifyPaymentRequest>, ApiError>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .payment_service
        .verify(session.client_id()?, request)
        .await?;
    Ok(Json(payment))
}

#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
async fn list_payments(
    State(state): State<PaymentAppState>,
    Extension(session): Extension<UserSession>,
    WithRejection(Query(query), _): WithRejection<Query<PaymentQuery>, ApiError>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let payments = state.payment_service.list(&session, query.client_id).await?;
    Ok(Json(payments))
}
