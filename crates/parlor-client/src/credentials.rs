//! Credential source for the gateway and the REST API.
//!
//! Both transports authenticate with a bearer token. Tokens expire, so the
//! transport asks for a fresh one before every connection attempt rather
//! than caching the first answer; providers backed by a token refresher can
//! hand out a different token each call.

use async_trait::async_trait;

use crate::error::Result;

/// Source of bearer tokens.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Produce a currently-valid bearer token.
    async fn bearer_token(&self) -> Result<String>;
}

/// Fixed-token provider for tests and short-lived tools.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_hands_out_its_value() {
        let provider = StaticToken::new("tok-1");
        assert_eq!(provider.bearer_token().await.unwrap(), "tok-1");
    }
}
