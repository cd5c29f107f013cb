//! reqwest-backed collaborators.
//!
//! Both clients speak plain JSON over HTTP. Credentials are whatever session
//! cookie the identity flow left behind; it is attached to every store call
//! as a default `Cookie` header.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::service::{AnsweringService, ConversationStore, RemoteError};
use super::types::{AnswerEnvelope, AnswerRequest, SavedConversation, UserDataResponse, UserProfile};

// ============================================================================
// Shared Helpers
// ============================================================================

fn network(e: reqwest::Error) -> RemoteError {
    RemoteError::Network(e.to_string())
}

/// Maps 401 and other non-success statuses to errors, passing 2xx through.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    debug!("Response status: {}", status);

    if status == StatusCode::UNAUTHORIZED {
        return Err(RemoteError::Unauthorized);
    }
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Remote error: {} - {}", status, message);
        return Err(RemoteError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response)
}

/// Reads the whole body and decodes it, keeping transport and decode errors apart.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let body = response.text().await.map_err(network)?;
    serde_json::from_str(&body).map_err(|e| RemoteError::Parse(e.to_string()))
}

fn trim_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

// ============================================================================
// Answering Service
// ============================================================================

/// POSTs `{inputText}` to a fixed endpoint and reads back the answer text.
pub struct HttpAnsweringService {
    url: String,
    client: reqwest::Client,
}

impl HttpAnsweringService {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AnsweringService for HttpAnsweringService {
    fn name(&self) -> &str {
        "http"
    }

    async fn answer(&self, question: &str) -> Result<String, RemoteError> {
        info!("Answer request: url={}, question_len={}", self.url, question.len());

        let response = self
            .client
            .post(&self.url)
            .json(&AnswerRequest {
                input_text: question,
            })
            .send()
            .await
            .map_err(network)?;

        let envelope: AnswerEnvelope = decode(check_status(response).await?).await?;
        let text = envelope
            .into_text()
            .ok_or_else(|| RemoteError::Parse("response carried no answer".to_string()))?;

        debug!("Answer received: {} chars", text.chars().count());
        Ok(text)
    }
}

// ============================================================================
// Conversation Store
// ============================================================================

/// Conversation and profile endpoints of the chat backend.
///
/// Every request is bounded by `timeout`; a store that stops answering
/// yields `RemoteError::Timeout` instead of a call that never returns.
pub struct HttpConversationStore {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpConversationStore {
    /// `session_cookie` is sent verbatim as the `Cookie` header when present.
    pub fn new(
        base_url: impl Into<String>,
        session_cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| RemoteError::Config(format!("invalid session cookie: {e}")))?;
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Config(e.to_string()))?;

        Ok(Self {
            base_url: trim_base(base_url),
            client,
            timeout,
        })
    }

    fn transport(&self, e: reqwest::Error) -> RemoteError {
        if e.is_timeout() {
            warn!("Store request timed out after {:?}", self.timeout);
            RemoteError::Timeout(self.timeout)
        } else {
            network(e)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ConversationStore for HttpConversationStore {
    async fn verify_session(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .get(self.url("/chat"))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        check_status(response).await?;
        Ok(())
    }

    async fn list_conversations(&self) -> Result<Vec<SavedConversation>, RemoteError> {
        let response = self
            .client
            .get(self.url("/conversations"))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let conversations: Vec<SavedConversation> = decode(check_status(response).await?).await?;
        info!("Fetched {} saved conversations", conversations.len());
        Ok(conversations)
    }

    async fn delete_conversation(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url(&format!("/conversation/{id}")))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        check_status(response).await?;
        info!("Deleted conversation {}", id);
        Ok(())
    }

    async fn delete_all_conversations(&self) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.url("/conversations/all"))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        check_status(response).await?;
        info!("Deleted all conversations");
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<UserProfile, RemoteError> {
        let response = self
            .client
            .get(self.url(&format!("/userdata/{user_id}")))
            .send()
            .await
            .map_err(|e| self.transport(e))?;
        let data: UserDataResponse = decode(check_status(response).await?).await?;

        match data.user {
            Some(user) if data.success => Ok(user.into_profile()),
            _ => Err(RemoteError::Parse("profile lookup was not successful".to_string())),
        }
    }
}
