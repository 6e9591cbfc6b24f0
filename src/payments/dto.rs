use serde::{Deserialize, Serialize};

/// Body for the premium-subscription checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: String,
    pub card: CardData,
    /// Charge amount; defaults to the configured premium price.
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Tokenized card credentials as produced by the payment SDK.
#[derive(Debug, Deserialize)]
pub struct CardData {
    pub card_number: String,
    pub cardholder_name: String,
    pub expiration_month: String,
    pub expiration_year: String,
    pub security_code: String,
    #[serde(default = "default_identification_type")]
    pub identification_type: String,
    #[serde(default)]
    pub identification_number: String,
}

fn default_identification_type() -> String {
    "CPF".into()
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
