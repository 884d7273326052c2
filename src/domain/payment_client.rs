use color_eyre::eyre::Result;

use super::{Email, Plan, WorkspaceId};

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub workspace_id: WorkspaceId,
    pub plan: Plan,
    pub price_id: String,
    pub customer_id: Option<String>,
    pub customer_email: Email,
    pub success_url: String,
    pub cancel_url: String,
}

/// Hosted pages of the payment processor that the browser is redirected to.
#[async_trait::async_trait]
pub trait PaymentClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<String>;

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String>;
}
