//! Backend API for Pawfect
//!
//! This module contains the wire types, the backend abstraction consumed by
//! the conversation controller, and the reqwest client implementing it.

pub mod client;
pub mod types;

pub use client::{ClientConfig, ClientError, PawfectClient};
pub use types::{
    AuthResponse, ChatRequest, ChatResponse, ConversationDetail, ConversationSummary, Message,
    Role, User,
};

use async_trait::async_trait;

use crate::error::Result;

/// Chat and conversation-persistence services used by the controller
///
/// Implemented by [`PawfectClient`] for the real backend and by in-process
/// fakes in tests.
#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Sends the history and returns the reply plus the conversation id
    ///
    /// # Arguments
    ///
    /// * `messages` - Full history, oldest first
    /// * `conversation_id` - Active conversation, `None` for a new one
    async fn send_chat(
        &self,
        messages: &[Message],
        conversation_id: Option<&str>,
    ) -> Result<ChatResponse>;

    /// Lists conversation summaries
    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>>;

    /// Fetches one conversation with its messages
    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail>;

    /// Deletes one conversation
    async fn delete_conversation(&self, id: &str) -> Result<()>;
}
