use color_eyre::eyre::{Result, WrapErr};
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::domain::{CheckoutRequest, PaymentClient};

pub struct StripePaymentClient {
    http_client: Client,
    base_url: String,
    secret_key: Secret<String>,
}

impl StripePaymentClient {
    pub fn new(
        base_url: String,
        secret_key: Secret<String>,
        http_client: Client,
    ) -> Self {
        Self {
            http_client,
            base_url,
            secret_key,
        }
    }

    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, String)],
    ) -> Result<SessionResponse> {
        let url = Url::parse(&self.base_url)?.join(endpoint)?;
        self.http_client
            .post(url)
            .bearer_auth(self.secret_key.expose_secret())
            .form(form)
            .send()
            .await?
            .error_for_status()?
            .json::<SessionResponse>()
            .await
            .wrap_err("failed to parse Stripe session response")
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    url: String,
}

#[async_trait::async_trait]
impl PaymentClient for StripePaymentClient {
    #[tracing::instrument(name = "Creating Stripe checkout session", skip_all)]
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String> {
        let workspace_id = request.workspace_id.to_string();
        let mut form = vec![
            ("mode", String::from("subscription")),
            ("line_items[0][price]", request.price_id.clone()),
            ("line_items[0][quantity]", String::from("1")),
            ("success_url", request.success_url.clone()),
            ("cancel_url", request.cancel_url.clone()),
            ("client_reference_id", workspace_id.clone()),
            ("metadata[workspace_id]", workspace_id.clone()),
            ("metadata[plan]", request.plan.as_str().to_owned()),
            ("subscription_data[metadata][workspace_id]", workspace_id),
        ];
        match &request.customer_id {
            Some(customer_id) => form.push(("customer", customer_id.clone())),
            None => form.push((
                "customer_email",
                request.customer_email.as_ref().expose_secret().to_owned(),
            )),
        }

        Ok(self.post_form("/v1/checkout/sessions", &form).await?.url)
    }

    #[tracing::instrument(name = "Creating Stripe billing portal session", skip_all)]
    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String> {
        let form = [
            ("customer", customer_id.to_owned()),
            ("return_url", return_url.to_owned()),
        ];
        Ok(self
            .post_form("/v1/billing_portal/sessions", &form)
            .await?
            .url)
    }
}
