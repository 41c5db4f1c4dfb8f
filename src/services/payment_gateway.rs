use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::GatewayConfig;

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("payment gateway credentials are not configured")]
    NotConfigured,
    #[error("request to payment gateway failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment gateway rejected the request ({status}): {description}")]
    Rejected { status: u16, description: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    /// Minor currency units
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    description: Option<String>,
}

/// Order creation and callback verification against a third-party gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id handed to the checkout widget
    fn key_id(&self) -> &str;

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError>;

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;
}

fn signing_mac(secret: &str, order_id: &str, payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    Some(mac)
}

/// HMAC-SHA256 over `order_id|payment_id`, hex encoded
pub fn compute_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    signing_mac(secret, order_id, payment_id)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default()
}

/// Constant-time check of a hex signature
pub fn verify_signature(secret: &str, order_id: &str, payment_id: &str, signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };

    signing_mac(secret, order_id, payment_id)
        .map(|mac| mac.verify_slice(&expected).is_ok())
        .unwrap_or(false)
}

/// Razorpay-compatible orders API client
pub struct RazorpayGateway {
    client: Client,
    config: GatewayConfig,
}

impl RazorpayGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        if !self.config.is_configured() {
            return Err(GatewayError::NotConfigured);
        }

        let url = format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<GatewayErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error.description)
                .unwrap_or(body);
            error!(status, %description, "payment gateway order creation failed");
            return Err(GatewayError::Rejected { status, description });
        }

        let order = response.json::<GatewayOrder>().await?;
        info!(order_id = %order.id, amount = order.amount, "payment order created");

        Ok(order)
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        if self.config.key_secret.is_empty() {
            return false;
        }
        verify_signature(&self.config.key_secret, order_id, payment_id, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_round_trip() {
        let signature = compute_signature("secret", "order_123", "pay_456");
        assert_eq!(signature.len(), 64);
        assert!(verify_signature("secret", "order_123", "pay_456", &signature));
    }

    #[test]
    fn test_known_signature() {
        let signature = compute_signature("test_secret", "order_IluGWxBm9U8zJ8", "pay_IluGWxBm9U8zJ8");
        assert_eq!(
            signature,
            "ea0001a557241f74c3f802c86ecaee267d6ee7670ac13481ade9c182e0517f19"
        );
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let signature = compute_signature("secret", "order_123", "pay_456");

        assert!(!verify_signature("other", "order_123", "pay_456", &signature));
        assert!(!verify_signature("secret", "order_124", "pay_456", &signature));
        assert!(!verify_signature("secret", "order_123", "pay_457", &signature));

        let mut tampered = signature.clone().into_bytes();
        tampered[0] = if tampered[0] == b'a' { b'b' } else { b'a' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(!verify_signature("secret", "order_123", "pay_456", &tampered));
    }

    #[test]
    fn test_non_hex_signature_is_rejected() {
        assert!(!verify_signature("secret", "order_123", "pay_456", "not-hex"));
        assert!(!verify_signature("secret", "order_123", "pay_456", ""));
    }

    #[test]
    fn test_unconfigured_gateway_never_verifies() {
        let gateway = RazorpayGateway::new(GatewayConfig {
            base_url: "http://localhost".to_string(),
            key_id: String::new(),
            key_secret: String::new(),
            currency: "INR".to_string(),
        })
        .unwrap();

        let signature = compute_signature("", "order_1", "pay_1");
        assert!(!gateway.verify_signature("order_1", "pay_1", &signature));
    }
}
