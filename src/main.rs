use color_eyre::eyre::{eyre, Result};
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::RwLock;

use procapacity::{
    app_state::{AppState, Settings},
    domain::Email,
    get_postgres_pool, get_redis_client,
    services::{
        data_stores::{
            PostgresProjectStore, PostgresTeamStore, PostgresUserStore,
            PostgresWorkspaceStore, RedisBannedTokenStore,
        },
        postmark_email_client::PostmarkEmailClient,
        stripe_payment_client::StripePaymentClient,
    },
    utils::{
        constants::{
            prod, DATABASE_URL, POSTMARK_AUTH_TOKEN,
            POSTMARK_EMAIL_SENDER_ADDRESS, REDIS_HOST_NAME, STRIPE_SECRET_KEY,
        },
        tracing::init_tracing,
    },
    Application,
};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing()?;

    let pg_pool = configure_postgresql().await?;
    let redis_connection = Arc::new(RwLock::new(configure_redis()?));

    let user_store = Arc::new(RwLock::new(PostgresUserStore::new(pg_pool.clone())));
    let workspace_store =
        Arc::new(RwLock::new(PostgresWorkspaceStore::new(pg_pool.clone())));
    let team_store = Arc::new(RwLock::new(PostgresTeamStore::new(pg_pool.clone())));
    let project_store = Arc::new(RwLock::new(PostgresProjectStore::new(pg_pool)));
    let banned_token_store =
        Arc::new(RwLock::new(RedisBannedTokenStore::new(redis_connection)));

    let app_state = AppState::new(
        user_store,
        workspace_store,
        team_store,
        project_store,
        banned_token_store,
        Arc::new(configure_postmark_email_client()?),
        Arc::new(configure_stripe_payment_client()?),
        Settings::from_env(),
    );

    let app = Application::build(app_state, prod::APP_ADDRESS)
        .await
        .map_err(|e| eyre!("Failed to build app: {e}"))?;

    app.run().await?;
    Ok(())
}

async fn configure_postgresql() -> Result<PgPool> {
    let pg_pool = get_postgres_pool(&DATABASE_URL).await?;
    sqlx::migrate!().run(&pg_pool).await?;
    Ok(pg_pool)
}

fn configure_redis() -> Result<redis::Connection> {
    let connection = get_redis_client(REDIS_HOST_NAME.to_owned())?
        .get_connection()?;
    Ok(connection)
}

fn configure_postmark_email_client() -> Result<PostmarkEmailClient> {
    let http_client = Client::builder()
        .timeout(prod::email_client::TIMEOUT)
        .build()?;
    let sender = Email::parse(POSTMARK_EMAIL_SENDER_ADDRESS.to_owned())?;

    Ok(PostmarkEmailClient::new(
        prod::email_client::BASE_URL.to_owned(),
        sender,
        POSTMARK_AUTH_TOKEN.to_owned(),
        http_client,
    ))
}

fn configure_stripe_payment_client() -> Result<StripePaymentClient> {
    let http_client = Client::builder()
        .timeout(prod::payment_client::TIMEOUT)
        .build()?;

    Ok(StripePaymentClient::new(
        prod::payment_client::BASE_URL.to_owned(),
        STRIPE_SECRET_KEY.to_owned(),
        http_client,
    ))
}
