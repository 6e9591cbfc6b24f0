use axum::{extract::State, http::StatusCode, Json};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, instrument};

use crate::state::AppState;

use super::client::{ChargeOutcome, ChargeRequest, PaymentError};
use super::dto::{CheckoutRequest, CheckoutResponse};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// POST /payments — charge the monthly premium subscription. All input is
/// validated before the upstream call; a decline comes back as a 400 with
/// the upstream reason, never as a committed charge.
#[instrument(skip(state, body))]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), (StatusCode, String)> {
    if !is_valid_email(&body.email) {
        return Err((StatusCode::BAD_REQUEST, "invalid email".into()));
    }
    let card_token: String = body
        .card
        .card_number
        .chars()
        .filter(char::is_ascii_digit)
        .collect();
    if card_token.len() < 16 {
        return Err((
            StatusCode::BAD_REQUEST,
            "card number must have at least 16 digits".into(),
        ));
    }
    if body.card.cardholder_name.trim().is_empty()
        || body.card.expiration_month.trim().is_empty()
        || body.card.expiration_year.trim().is_empty()
        || body.card.security_code.trim().is_empty()
    {
        return Err((StatusCode::BAD_REQUEST, "all card fields are required".into()));
    }
    let amount = body.amount.unwrap_or(state.config.payment.amount);
    if !amount.is_finite() || amount <= 0.0 {
        return Err((StatusCode::BAD_REQUEST, "amount must be positive".into()));
    }

    let req = ChargeRequest {
        email: body.email,
        amount,
        description: state.config.payment.description.clone(),
        card_token,
        identification_type: body.card.identification_type,
        identification_number: body.card.identification_number,
    };

    match state.payments.charge(&req).await {
        Ok(ChargeOutcome::Approved { payment_id, status }) => {
            info!(payment_id = %payment_id, amount, "subscription payment approved");
            Ok((
                StatusCode::OK,
                Json(CheckoutResponse {
                    success: true,
                    payment_id: Some(payment_id),
                    status: Some(status),
                    error: None,
                }),
            ))
        }
        Ok(ChargeOutcome::Declined { reason }) => Ok((
            StatusCode::BAD_REQUEST,
            Json(CheckoutResponse {
                success: false,
                payment_id: None,
                status: None,
                error: Some(reason),
            }),
        )),
        Err(e) => Err(payment_error(e)),
    }
}

fn payment_error(e: PaymentError) -> (StatusCode, String) {
    let status = match e {
        PaymentError::MissingAccessToken => StatusCode::INTERNAL_SERVER_ERROR,
        PaymentError::Http(_) => StatusCode::BAD_GATEWAY,
    };
    error!(error = %e, "payment processing failed");
    (status, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::dto::CardData;

    fn checkout_body() -> CheckoutRequest {
        CheckoutRequest {
            email: "payer@example.com".into(),
            card: CardData {
                card_number: "4111 1111 1111 1111".into(),
                cardholder_name: "A Payer".into(),
                expiration_month: "11".into(),
                expiration_year: "2027".into(),
                security_code: "123".into(),
                identification_type: "CPF".into(),
                identification_number: "12345678900".into(),
            },
            amount: None,
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[tokio::test]
    async fn approved_checkout_returns_the_payment_id() {
        let state = AppState::fake();
        let (status, Json(resp)) = create_payment(State(state), Json(checkout_body()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert!(resp.payment_id.is_some());
        assert!(resp.error.is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_email_before_charging() {
        let state = AppState::fake();
        let mut body = checkout_body();
        body.email = "nope".into();
        let (status, message) = create_payment(State(state), Json(body)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("email"));
    }

    #[tokio::test]
    async fn rejects_short_card_numbers() {
        let state = AppState::fake();
        let mut body = checkout_body();
        body.card.card_number = "4111 1111".into();
        let (status, message) = create_payment(State(state), Json(body)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.contains("card number"));
    }

    #[tokio::test]
    async fn rejects_blank_card_fields() {
        let state = AppState::fake();
        let mut body = checkout_body();
        body.card.security_code = " ".into();
        let (status, _) = create_payment(State(state), Json(body)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_non_positive_amounts() {
        let state = AppState::fake();
        let mut body = checkout_body();
        body.amount = Some(0.0);
        let (status, _) = create_payment(State(state), Json(body)).await.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
