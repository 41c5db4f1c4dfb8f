use gym_coach::config::GatewayConfig;
use gym_coach::services::payment_gateway::{
    compute_signature, GatewayError, OrderRequest, PaymentGateway, RazorpayGateway,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{basic_auth, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> RazorpayGateway {
    RazorpayGateway::new(GatewayConfig {
        base_url: server.uri(),
        key_id: "rzp_test_key".to_string(),
        key_secret: "test_secret".to_string(),
        currency: "INR".to_string(),
    })
    .unwrap()
}

fn order_request() -> OrderRequest {
    OrderRequest {
        amount: 150_000,
        currency: "INR".to_string(),
        receipt: "rcpt_0123456789abcdef".to_string(),
        notes: json!({ "clientId": "c-1" }),
    }
}

#[cfg(test)]
mod gateway_client_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_order_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .and(basic_auth("rzp_test_key", "test_secret"))
            .and(body_partial_json(json!({
                "amount": 150000,
                "currency": "INR",
                "receipt": "rcpt_0123456789abcdef"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "order_IluGWxBm9U8zJ8",
                "entity": "order",
                "amount": 150000,
                "currency": "INR",
                "receipt": "rcpt_0123456789abcdef",
                "status": "created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let order = gateway_for(&server).create_order(&order_request()).await.unwrap();

        assert_eq!(order.id, "order_IluGWxBm9U8zJ8");
        assert_eq!(order.amount, 150_000);
        assert_eq!(order.status, "created");
        assert_eq!(order.receipt.as_deref(), Some("rcpt_0123456789abcdef"));
    }

    #[tokio::test]
    async fn test_create_order_maps_gateway_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "BAD_REQUEST_ERROR",
                    "description": "The amount must be atleast INR 1.00"
                }
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .create_order(&order_request())
            .await
            .unwrap_err();

        match err {
            GatewayError::Rejected { status, description } => {
                assert_eq!(status, 400);
                assert_eq!(description, "The amount must be atleast INR 1.00");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_order_keeps_raw_body_when_unstructured() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/orders"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .create_order(&order_request())
            .await
            .unwrap_err();

        match err {
            GatewayError::Rejected { status, description } => {
                assert_eq!(status, 503);
                assert_eq!(description, "upstream unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = RazorpayGateway::new(GatewayConfig {
            base_url: server.uri(),
            key_id: String::new(),
            key_secret: String::new(),
            currency: "INR".to_string(),
        })
        .unwrap();

        let err = gateway.create_order(&order_request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotConfigured));
    }

    #[tokio::test]
    async fn test_verify_signature_through_client() {
        let server = MockServer::start().await;
        let gateway = gateway_for(&server);

        let signature = compute_signature("test_secret", "order_1", "pay_1");
        assert!(gateway.verify_signature("order_1", "pay_1", &signature));
        assert!(!gateway.verify_signature("order_1", "pay_2", &signature));
        assert!(!gateway.verify_signature("order_2", "pay_1", &signature));
    }
}
