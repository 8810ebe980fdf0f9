//! REST messaging API client.
//!
//! The gateway pushes live events; history and the conversation list come
//! from a plain HTTP API. Both endpoints return the same records the
//! gateway uses, so the store merges them without translation.

use std::{sync::Arc, time::Duration};

use parlor_proto::records::{ConversationRecord, MessageRecord};
use serde::de::DeserializeOwned;

use crate::{
    credentials::CredentialProvider,
    error::{ClientError, Result},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the messaging endpoints.
#[derive(Clone)]
pub struct MessagingApi {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl MessagingApi {
    /// Build a client for the given API root, e.g. `https://api.example.com`.
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialProvider>) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base_url: trim_trailing_slash(base_url.into()), credentials })
    }

    /// Fetch the conversation list, most recent first.
    pub async fn conversations(&self) -> Result<Vec<ConversationRecord>> {
        self.get("messages/conversations").await
    }

    /// Fetch the full message history with one counterparty, oldest first.
    pub async fn history(&self, partner_id: &str) -> Result<Vec<MessageRecord>> {
        self.get(&format!("messages/{partner_id}")).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let token = self.credentials.bearer_token().await?;
        let url = format!("{}/{path}", self.base_url);

        let response = self.http.get(&url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status: status.as_u16(), message });
        }

        Ok(response.json().await?)
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
