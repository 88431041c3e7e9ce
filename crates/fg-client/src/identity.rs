//! Bearer token issuance for portal users

use crate::{GatewayError, Result, UserId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Issues access tokens on behalf of portal users
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Token to present as `Authorization: Bearer ...` for the user
    async fn user_token(&self, user: UserId) -> Result<String>;
}

#[async_trait]
impl<P: IdentityProvider + ?Sized> IdentityProvider for Arc<P> {
    async fn user_token(&self, user: UserId) -> Result<String> {
        (**self).user_token(user).await
    }
}

/// Hands out the same token to every user
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenProvider {
    async fn user_token(&self, _user: UserId) -> Result<String> {
        if self.token.is_empty() {
            return Err(GatewayError::Identity("no token configured".to_string()));
        }
        Ok(self.token.clone())
    }
}

/// Fixed table of user tokens
#[derive(Clone, Default)]
pub struct TokenTable {
    tokens: HashMap<UserId, String>,
}

impl TokenTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user's token
    pub fn with_token(mut self, user: UserId, token: impl Into<String>) -> Self {
        self.tokens.insert(user, token.into());
        self
    }
}

#[async_trait]
impl IdentityProvider for TokenTable {
    async fn user_token(&self, user: UserId) -> Result<String> {
        self.tokens
            .get(&user)
            .cloned()
            .ok_or_else(|| GatewayError::Identity(format!("no session for user {}", user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.user_token(UserId(7)).await.unwrap(), "abc");
        assert!(!format!("{:?}", provider).contains("abc"));

        let empty = StaticTokenProvider::new("");
        assert!(matches!(
            empty.user_token(UserId(7)).await,
            Err(GatewayError::Identity(_))
        ));
    }

    #[tokio::test]
    async fn test_token_table_unknown_user() {
        let table = TokenTable::new().with_token(UserId(1), "t1");
        assert_eq!(table.user_token(UserId(1)).await.unwrap(), "t1");
        assert!(matches!(
            table.user_token(UserId(2)).await,
            Err(GatewayError::Identity(_))
        ));
    }
}
