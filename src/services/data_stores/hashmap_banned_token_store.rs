use chrono::Utc;
use secrecy::Secret;
use std::collections::HashMap;

use crate::domain::{token_fingerprint, BannedTokenStore, BannedTokenStoreError};

/// Fingerprint to expiry. Expired bans are dropped whenever a new one is
/// added.
#[derive(Default)]
pub struct HashmapBannedTokenStore {
    banned_tokens: HashMap<String, i64>,
}

#[async_trait::async_trait]
impl BannedTokenStore for HashmapBannedTokenStore {
    async fn ban_token(
        &mut self,
        token: &Secret<String>,
        expires_at: i64,
    ) -> Result<(), BannedTokenStoreError> {
        let now = Utc::now().timestamp();
        self.banned_tokens.retain(|_, exp| *exp > now);
        if expires_at > now {
            self.banned_tokens
                .insert(token_fingerprint(token), expires_at);
        }
        Ok(())
    }

    async fn check_token(
        &self,
        token: &Secret<String>,
    ) -> Result<(), BannedTokenStoreError> {
        match self.banned_tokens.get(&token_fingerprint(token)) {
            Some(exp) if *exp > Utc::now().timestamp() => {
                Err(BannedTokenStoreError::BannedToken)
            }
            _ => Ok(()),
        }
    }
}
