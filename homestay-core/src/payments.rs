use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// An opaque client-usable token for a pending payment
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The amount must be at least one minor unit
    #[error("Amount must be at least 1")]
    InvalidAmount,
    /// The currency code is missing
    #[error("Currency must not be empty")]
    InvalidCurrency,
    /// The payment processor rejected or failed the request
    #[error("Payment processor error: {0}")]
    Upstream(String),
}

/// Represents a payment processor that can open payment intents
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens an intent for `amount` minor units of `currency`
    async fn create_intent(&self, amount: i64, currency: &str)
        -> Result<PaymentIntent, PaymentError>;
}

/// Validates payment input before it reaches the processor.
pub struct Payments<P> {
    gateway: Arc<P>,
}

impl<P> Payments<P>
where
    P: PaymentGateway,
{
    pub fn new(gateway: &Arc<P>) -> Self {
        Self {
            gateway: gateway.clone(),
        }
    }

    pub async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        if amount < 1 {
            return Err(PaymentError::InvalidAmount);
        }

        if currency.trim().is_empty() {
            return Err(PaymentError::InvalidCurrency);
        }

        self.gateway.create_intent(amount, currency).await
    }
}

/// The stripe payment-intents integration
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_url: String,
}

impl StripeGateway {
    const API_URL: &'static str = "https://api.stripe.com/v1/payment_intents";

    pub fn new(secret_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key,
            api_url: Self::API_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    client_secret: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", currency.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PaymentError::Upstream(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let body: StripeIntentResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Upstream(e.to_string()))?;

        Ok(PaymentIntent {
            client_secret: body.client_secret,
        })
    }
}
