use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{Role, UserSession};
use crate::errors::ApiError;
use crate::models::{CreateOrderRequest, CreateOrderResponse, Payment, VerifyPaymentRequest};
use crate::services::payment_gateway::{OrderRequest, PaymentGateway};

const PAYMENT_COLUMNS: &str = "id, client_id, trainer_id, amount, currency, receipt, gateway_order_id, \
                               gateway_payment_id, gateway_signature, status, note, created_at, paid_at";

#[derive(Debug, sqlx::FromRow)]
struct Billing {
    trainer_id: Uuid,
    monthly_fee: i64,
}

fn new_receipt() -> String {
    format!("rcpt_{:016x}", rand::thread_rng().gen::<u64>())
}

#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl PaymentService {
    pub fn new(db: PgPool, gateway: Arc<dyn PaymentGateway>, currency: impl Into<String>) -> Self {
        Self {
            db,
            gateway,
            currency: currency.into(),
        }
    }

    /// Open a gateway order for the client and record it as `created`
    #[tracing::instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        client_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        request.validate()?;

        let billing = sqlx::query_as::<_, Billing>(
            "SELECT trainer_id, monthly_fee FROM clients WHERE id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(ApiError::NotFound("Client"))?;

        let amount = request.amount.unwrap_or(billing.monthly_fee);
        if amount <= 0 {
            return Err(ApiError::bad_request("Amount must be greater than zero"));
        }

        let order_request = OrderRequest {
            amount,
            currency: self.currency.clone(),
            receipt: new_receipt(),
            notes: json!({
                "clientId": client_id,
                "trainerId": billing.trainer_id,
            }),
        };

        let order = self.gateway.create_order(&order_request).await?;

        let sql = format!(
            "INSERT INTO payments (id, client_id, trainer_id, amount, currency, receipt, gateway_order_id, note)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            PAYMENT_COLUMNS
        );

        let payment = sqlx::query_as::<_, Payment>(&sql)
            .bind(Uuid::new_v4())
            .bind(client_id)
            .bind(billing.trainer_id)
            .bind(order.amount)
            .bind(&order.currency)
            .bind(&order_request.receipt)
            .bind(&order.id)
            .bind(&request.note)
            .fetch_one(&self.db)
            .await?;

        tracing::info!(payment_id = %payment.id, order_id = %order.id, amount, "payment order created");

        Ok(CreateOrderResponse {
            key_id: self.gateway.key_id().to_string(),
            order_id: order.id,
            amount: payment.amount,
            currency: payment.currency.clone(),
            payment,
        })
    }

    /// Check the checkout signature and mark the order paid
    #[tracing::instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn verify(&self, client_id: Uuid, request: VerifyPaymentRequest) -> Result<Payment, ApiError> {
        request.validate()?;

        if !self
            .gateway
            .verify_signature(&request.order_id, &request.payment_id, &request.signature)
        {
            tracing::warn!(%client_id, "payment signature mismatch");
            self.mark_failed(client_id, &request).await;
            return Err(ApiError::bad_request("Invalid payment signature"));
        }

        let sql = format!(
            "UPDATE payments
             SET status = 'paid',
                 gateway_payment_id = $3,
                 gateway_signature = $4,
                 paid_at = NOW()
             WHERE gateway_order_id = $1 AND client_id = $2 AND status <> 'paid'
             RETURNING {}",
            PAYMENT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Payment>(&sql)
            .bind(&request.order_id)
            .bind(client_id)
            .bind(&request.payment_id)
            .bind(&request.signature)
            .fetch_optional(&self.db)
            .await?;

        if let Some(payment) = updated {
            tracing::info!(payment_id = %payment.id, "payment captured");
            return Ok(payment);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE gateway_order_id = $1 AND client_id = $2)",
        )
        .bind(&request.order_id)
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;

        if exists {
            Err(ApiError::conflict("Payment already verified"))
        } else {
            Err(ApiError::NotFound("Payment"))
        }
    }

    async fn mark_failed(&self, client_id: Uuid, request: &VerifyPaymentRequest) {
        let result = sqlx::query(
            "UPDATE payments SET status = 'failed', gateway_payment_id = $3
             WHERE gateway_order_id = $1 AND client_id = $2 AND status = 'created'",
        )
        .bind(&request.order_id)
        .bind(client_id)
        .bind(&request.payment_id)
        .execute(&self.db)
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, "could not mark payment as failed");
        }
    }

    /// Trainers see payments of their clients (optionally one client),
    /// clients only their own
    pub async fn list(&self, session: &UserSession, client_id: Option<Uuid>) -> Result<Vec<Payment>, ApiError> {
        let payments = match session.role {
            Role::Trainer => {
                let sql = format!(
                    "SELECT {} FROM payments
                     WHERE trainer_id = $1 AND ($2::uuid IS NULL OR client_id = $2)
                     ORDER BY created_at DESC",
                    PAYMENT_COLUMNS
                );
                sqlx::query_as::<_, Payment>(&sql)
                    .bind(session.user_id)
                    .bind(client_id)
                    .fetch_all(&self.db)
                    .await?
            }
            Role::Client => {
                if client_id.is_some_and(|id| id != session.user_id) {
                    return Err(ApiError::Forbidden(
                        "Clients can only access their own payments".to_string(),
                    ));
                }
                let sql = format!(
                    "SELECT {} FROM payments WHERE client_id = $1 ORDER BY created_at DESC",
                    PAYMENT_COLUMNS
                );
                sqlx::query_as::<_, Payment>(&sql)
                    .bind(session.user_id)
                    .fetch_all(&self.db)
                    .await?
            }
        };

        Ok(payments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_format() {
        let receipt = new_receipt();
        assert!(receipt.starts_with("rcpt_"));
        assert_eq!(receipt.len(), 21);
        assert!(receipt[5..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
