//! HTTP client for the Pawfect backend.
//!
//! This module provides [`PawfectClient`], the reqwest implementation of the
//! authentication, chat and conversation endpoints.
//!
//! # Example
//!
//! ```rust,no_run
//! use pawfect::api::client::{ClientConfig, PawfectClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig {
//!         base_url: "http://localhost:8080".to_string(),
//!         timeout_secs: 30,
//!     };
//!     let client = PawfectClient::new(config)?;
//!     let auth = client.login("rex@example.com", "s3cret!").await?;
//!
//!     let client = client.with_token(auth.token);
//!     let conversations = client.list_conversations().await?;
//!     println!("{} conversations", conversations.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{
    AuthResponse, ChatRequest, ChatResponse, ConversationDetail, ConversationSummary,
    LoginRequest, Message, RegisterRequest,
};
use super::ConversationBackend;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request error (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API error with status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from API.
        message: String,
    },

    /// Credentials rejected or bearer token missing/expired.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Base URL or path segment that cannot form a request URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Server-supplied message, when the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Api { message, .. } | ClientError::Authentication(message)
                if !message.is_empty() =>
            {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Pawfect API client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Pawfect API, without trailing slash.
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&crate::config::ApiConfig> for ClientConfig {
    fn from(api: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout_secs: api.timeout_seconds,
        }
    }
}

/// Pawfect API client.
///
/// Requests made after [`PawfectClient::with_token`] carry
/// `Authorization: Bearer <token>`.
#[derive(Clone)]
pub struct PawfectClient {
    client: Client,
    config: ClientConfig,
    base: Url,
    token: Option<String>,
}

impl std::fmt::Debug for PawfectClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PawfectClient")
            .field("base_url", &self.config.base_url)
            .field("timeout_secs", &self.config.timeout_secs)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl PawfectClient {
    /// Creates a new unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Http` if the HTTP client cannot be created and
    /// `ClientError::InvalidUrl` if the base URL does not parse.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            base,
            token: None,
        })
    }

    /// Returns a copy of this client that authenticates with `token`.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of one stored conversation
    ///
    /// Dot segments would be dropped by URL normalisation and address a
    /// different resource, so they are refused along with the empty id.
    fn conversation_url(&self, id: &str) -> Result<Url, ClientError> {
        if matches!(id, "" | "." | "..") {
            return Err(ClientError::InvalidUrl(format!(
                "invalid conversation id {:?}",
                id
            )));
        }
        self.endpoint(&["api", "conversations", id])
    }

    /// Builds a request, attaching the bearer token when one is set.
    fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Registers a new account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the server's message when the
    /// registration is rejected (for example a duplicate email).
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let request = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .build_request(Method::POST, self.endpoint(&["api", "auth", "register"])?)
            .json(&request)
            .send()
            .await?;

        let auth: AuthResponse = parse_json(response).await?;
        info!(email = %auth.email, "Registered account");
        Ok(auth)
    }

    /// Logs in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Authentication` for rejected credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .build_request(Method::POST, self.endpoint(&["api", "auth", "login"])?)
            .json(&request)
            .send()
            .await?;

        let auth: AuthResponse = parse_json(response).await?;
        info!(email = %auth.email, "Logged in");
        Ok(auth)
    }

    /// Sends the chat history and returns the assistant's reply.
    ///
    /// `conversation_id` is `None` for a conversation the server has not
    /// stored yet; the response then carries the newly assigned id.
    pub async fn send_chat(
        &self,
        messages: &[Message],
        conversation_id: Option<&str>,
    ) -> Result<ChatResponse, ClientError> {
        let request = ChatRequest {
            messages: messages.to_vec(),
            conversation_id: conversation_id.map(str::to_string),
        };
        debug!(
            messages = request.messages.len(),
            conversation_id = ?request.conversation_id,
            "Sending chat request"
        );
        let response = self
            .build_request(Method::POST, self.endpoint(&["api", "chat"])?)
            .json(&request)
            .send()
            .await?;

        let reply: ChatResponse = parse_json(response).await?;
        debug!(conversation_id = %reply.conversation_id, "Received chat reply");
        Ok(reply)
    }

    /// Lists the signed-in user's conversations, most recent first.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, ClientError> {
        let response = self
            .build_request(Method::GET, self.endpoint(&["api", "conversations"])?)
            .send()
            .await?;
        parse_json(response).await
    }

    /// Fetches a conversation including all of its messages.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the conversation doesn't exist.
    pub async fn get_conversation(&self, id: &str) -> Result<ConversationDetail, ClientError> {
        let response = self
            .build_request(Method::GET, self.conversation_url(id)?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(format!("Conversation {}", id)));
        }
        parse_json(response).await
    }

    /// Deletes a conversation.
    pub async fn delete_conversation(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .build_request(Method::DELETE, self.conversation_url(id)?)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(conversation_id = %id, "Deleted conversation");
            Ok(())
        } else if status == StatusCode::NOT_FOUND {
            Err(ClientError::NotFound(format!("Conversation {}", id)))
        } else {
            Err(error_from_response(response).await)
        }
    }
}

#[async_trait]
impl ConversationBackend for PawfectClient {
    async fn send_chat(
        &self,
        messages: &[Message],
        conversation_id: Option<&str>,
    ) -> crate::error::Result<ChatResponse> {
        Ok(PawfectClient::send_chat(self, messages, conversation_id).await?)
    }

    async fn list_conversations(&self) -> crate::error::Result<Vec<ConversationSummary>> {
        Ok(PawfectClient::list_conversations(self).await?)
    }

    async fn get_conversation(&self, id: &str) -> crate::error::Result<ConversationDetail> {
        Ok(PawfectClient::get_conversation(self, id).await?)
    }

    async fn delete_conversation(&self, id: &str) -> crate::error::Result<()> {
        Ok(PawfectClient::delete_conversation(self, id).await?)
    }
}

/// Decodes a successful JSON body or converts the failure into a `ClientError`.
async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = extract_error_message(&body);
    warn!(status = status.as_u16(), message = %message, "API request failed");

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Authentication(message),
        _ => ClientError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Picks the `message` field out of a JSON error body, falling back to the
/// raw body text.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
