use axum::async_trait;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::config::PaymentConfig;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment access token is not configured. Set MP_ACCESS_TOKEN in the environment.")]
    MissingAccessToken,
    #[error("payment request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One charge attempt, already validated by the handler.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub email: String,
    pub amount: f64,
    pub description: String,
    pub card_token: String,
    pub identification_type: String,
    pub identification_number: String,
}

/// Upstream verdict. A decline is a normal outcome, not a transport error.
#[derive(Debug, Clone)]
pub enum ChargeOutcome {
    Approved { payment_id: String, status: String },
    Declined { reason: String },
}

#[async_trait]
pub trait PaymentClient: Send + Sync {
    async fn charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, PaymentError>;
}

/// Mercado Pago payments API client.
pub struct MercadoPago {
    http: reqwest::Client,
    access_token: Option<String>,
    base_url: String,
}

impl MercadoPago {
    pub fn new(http: reqwest::Client, config: &PaymentConfig) -> Self {
        Self {
            http,
            access_token: config.access_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PaymentClient for MercadoPago {
    async fn charge(&self, req: &ChargeRequest) -> Result<ChargeOutcome, PaymentError> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(PaymentError::MissingAccessToken)?;

        let body = json!({
            "transaction_amount": req.amount,
            "description": req.description,
            "payment_method_id": "visa",
            "payer": {
                "email": req.email,
                "identification": {
                    "type": req.identification_type,
                    "number": req.identification_number,
                },
            },
            "token": req.card_token,
        });

        let res = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let ok = res.status().is_success();
        let payload: serde_json::Value = res.json().await?;
        let status = payload
            .get("status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        if ok && status == "approved" {
            let payment_id = payload.get("id").map(json_to_plain_string).unwrap_or_default();
            debug!(payment_id = %payment_id, "payment approved");
            Ok(ChargeOutcome::Approved { payment_id, status })
        } else {
            let reason = payload
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("payment was not approved")
                .to_string();
            Ok(ChargeOutcome::Declined { reason })
        }
    }
}

// Payment ids arrive as numbers or strings depending on the endpoint.
fn json_to_plain_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
