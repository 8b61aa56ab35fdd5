use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::StripeConfig;

/// Everything the gateway needs to host a checkout for one tour.
#[derive(Debug, Clone)]
pub struct CheckoutParams {
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: String,
    pub client_reference_id: String,
    pub product_name: String,
    pub description: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Gateway-owned session handle; `url` is where the client is redirected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> anyhow::Result<CheckoutSession>;
}

/// Stripe checkout over the form-encoded v1 REST API.
pub struct StripeGateway {
    client: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.clone(),
            secret_key: config.secret_key.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        params: CheckoutParams,
    ) -> anyhow::Result<CheckoutSession> {
        let form = [
            ("mode", "payment".to_string()),
            ("success_url", params.success_url),
            ("cancel_url", params.cancel_url),
            ("customer_email", params.customer_email),
            ("client_reference_id", params.client_reference_id),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", params.currency),
            (
                "line_items[0][price_data][unit_amount]",
                params.amount_minor.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.product_name,
            ),
            (
                "line_items[0][price_data][product_data][description]",
                params.description,
            ),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await
            .context("payment gateway unreachable")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("checkout session creation failed: {status} {body}");
        }

        let session: CheckoutSession = response
            .json()
            .await
            .context("malformed checkout session response")?;
        debug!(session_id = %session.id, "checkout session created");
        Ok(session)
    }
}
