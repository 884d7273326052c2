use chrono::Utc;
use color_eyre::eyre::{eyre, WrapErr};
use redis::{Commands, Connection};
use secrecy::Secret;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{token_fingerprint, BannedTokenStore, BannedTokenStoreError};

const BANNED_TOKEN_KEY_PREFIX: &str = "procapacity:banned_token:";

pub struct RedisBannedTokenStore {
    conn: Arc<RwLock<Connection>>,
}

impl RedisBannedTokenStore {
    pub fn new(conn: Arc<RwLock<Connection>>) -> Self {
        Self { conn }
    }
}

fn key_for(token: &Secret<String>) -> String {
    format!("{BANNED_TOKEN_KEY_PREFIX}{}", token_fingerprint(token))
}

#[async_trait::async_trait]
impl BannedTokenStore for RedisBannedTokenStore {
    /// The key expires together with the token.
    #[tracing::instrument(name = "Banning token in Redis", skip_all)]
    async fn ban_token(
        &mut self,
        token: &Secret<String>,
        expires_at: i64,
    ) -> Result<(), BannedTokenStoreError> {
        let remaining = expires_at - Utc::now().timestamp();
        if remaining <= 0 {
            tracing::debug!("Token already expired, nothing to ban");
            return Ok(());
        }
        let ttl_seconds = u64::try_from(remaining)
            .wrap_err("invalid banned token TTL")
            .map_err(BannedTokenStoreError::UnexpectedError)?;

        self.conn
            .write()
            .await
            .set_ex::<_, _, ()>(key_for(token), expires_at, ttl_seconds)
            .wrap_err("failed to store banned token in Redis")
            .map_err(BannedTokenStoreError::UnexpectedError)
    }

    #[tracing::instrument(name = "Checking banned token in Redis", skip_all)]
    async fn check_token(
        &self,
        token: &Secret<String>,
    ) -> Result<(), BannedTokenStoreError> {
        let banned: bool = self
            .conn
            .write()
            .await
            .exists(key_for(token))
            .map_err(|e| {
                BannedTokenStoreError::UnexpectedError(
                    eyre!(e).wrap_err("failed to look up banned token in Redis"),
                )
            })?;

        if banned {
            Err(BannedTokenStoreError::BannedToken)
        } else {
            Ok(())
        }
    }
}
