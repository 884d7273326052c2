use secrecy::Secret;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        BannedTokenStore, EmailClient, PaymentClient, Plan, ProjectStore,
        TeamStore, UserStore, WorkspaceStore,
    },
    utils::constants::{
        APP_URL, JWT_SECRET, STRIPE_PRICE_AGENCY, STRIPE_PRICE_PRO,
        STRIPE_PRICE_STARTER, STRIPE_WEBHOOK_SECRET,
    },
};

pub type UserStoreType = Arc<RwLock<dyn UserStore + Send + Sync>>;
pub type WorkspaceStoreType = Arc<RwLock<dyn WorkspaceStore + Send + Sync>>;
pub type TeamStoreType = Arc<RwLock<dyn TeamStore + Send + Sync>>;
pub type ProjectStoreType = Arc<RwLock<dyn ProjectStore + Send + Sync>>;
pub type BannedTokenStoreType = Arc<RwLock<dyn BannedTokenStore + Send + Sync>>;
pub type EmailClientType = Arc<dyn EmailClient + Send + Sync>;
pub type PaymentClientType = Arc<dyn PaymentClient + Send + Sync>;

/// Stripe price ids of the paid plans.
#[derive(Debug, Clone)]
pub struct StripePrices {
    pub starter: String,
    pub pro: String,
    pub agency: String,
}

impl StripePrices {
    pub fn price_id(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Free => None,
            Plan::Starter => Some(&self.starter),
            Plan::Pro => Some(&self.pro),
            Plan::Agency => Some(&self.agency),
        }
    }

    pub fn plan_for(&self, price_id: &str) -> Option<Plan> {
        [Plan::Starter, Plan::Pro, Plan::Agency]
            .into_iter()
            .find(|plan| self.price_id(*plan) == Some(price_id))
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub jwt_secret: Secret<String>,
    /// Public URL of the web app, used for links in emails and redirects.
    pub app_url: String,
    pub stripe_webhook_secret: Secret<String>,
    pub stripe_prices: StripePrices,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: JWT_SECRET.clone(),
            app_url: APP_URL.trim_end_matches('/').to_owned(),
            stripe_webhook_secret: STRIPE_WEBHOOK_SECRET.clone(),
            stripe_prices: StripePrices {
                starter: STRIPE_PRICE_STARTER.clone(),
                pro: STRIPE_PRICE_PRO.clone(),
                agency: STRIPE_PRICE_AGENCY.clone(),
            },
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub user_store: UserStoreType,
    pub workspace_store: WorkspaceStoreType,
    pub team_store: TeamStoreType,
    pub project_store: ProjectStoreType,
    pub banned_token_store: BannedTokenStoreType,
    pub email_client: EmailClientType,
    pub payment_client: PaymentClientType,
    pub settings: Arc<Settings>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_store: UserStoreType,
        workspace_store: WorkspaceStoreType,
        team_store: TeamStoreType,
        project_store: ProjectStoreType,
        banned_token_store: BannedTokenStoreType,
        email_client: EmailClientType,
        payment_client: PaymentClientType,
        settings: Settings,
    ) -> Self {
        Self {
            user_store,
            workspace_store,
            team_store,
            project_store,
            banned_token_store,
            email_client,
            payment_client,
            settings: Arc::new(settings),
        }
    }
}
