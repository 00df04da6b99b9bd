//! Test utilities for Pawfect
//!
//! This module provides an in-process [`FakeBackend`] for controller tests,
//! fixture builders for conversation records, and assertion helpers.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tempfile::TempDir;
use tokio::sync::Notify;

use crate::api::{
    ChatRequest, ChatResponse, ConversationBackend, ConversationDetail, ConversationSummary,
    Message,
};
use crate::error::{PawfectError, Result};

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = format!("{:#}", e);
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Fixed timestamp used by the fixture builders
pub fn fixed_time() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2025-01-15T10:30:00", "%Y-%m-%dT%H:%M:%S")
        .expect("valid fixture timestamp")
}

/// Summary fixture
pub fn summary(id: &str, title: &str) -> ConversationSummary {
    ConversationSummary {
        id: id.to_string(),
        title: title.to_string(),
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Detail fixture
pub fn detail(id: &str, title: &str, messages: Vec<Message>) -> ConversationDetail {
    ConversationDetail {
        id: id.to_string(),
        title: title.to_string(),
        messages,
        created_at: fixed_time(),
        updated_at: fixed_time(),
    }
}

/// Scripted in-process backend
///
/// Chat replies are served in the order they were pushed. When a gate is
/// installed with [`FakeBackend::gate`], every send, get and delete call
/// waits for one `notify_one` before answering; list calls never wait.
#[derive(Default)]
pub struct FakeBackend {
    replies: Mutex<VecDeque<std::result::Result<ChatResponse, String>>>,
    sent: Mutex<Vec<ChatRequest>>,
    summaries: Mutex<Vec<ConversationSummary>>,
    details: Mutex<HashMap<String, ConversationDetail>>,
    deleted: Mutex<Vec<String>>,
    list_calls: AtomicUsize,
    fail_list: AtomicBool,
    fail_delete: AtomicBool,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeBackend {
    /// Creates a backend with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful chat reply
    pub fn push_reply(&self, conversation_id: &str, message: &str) {
        self.replies.lock().unwrap().push_back(Ok(ChatResponse {
            conversation_id: conversation_id.to_string(),
            message: message.to_string(),
        }));
    }

    /// Queues a failing chat call
    pub fn push_failure(&self, reason: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    /// Sets what list calls return
    pub fn set_summaries(&self, summaries: Vec<ConversationSummary>) {
        *self.summaries.lock().unwrap() = summaries;
    }

    /// Makes a conversation fetchable
    pub fn insert_detail(&self, detail: ConversationDetail) {
        self.details
            .lock()
            .unwrap()
            .insert(detail.id.clone(), detail);
    }

    /// Makes list calls fail
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    /// Makes delete calls fail
    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Installs a gate and returns it
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Chat requests received so far
    pub fn sent(&self) -> Vec<ChatRequest> {
        self.sent.lock().unwrap().clone()
    }

    /// Ids deleted so far
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    /// Number of list calls received
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl ConversationBackend for FakeBackend {
    async fn send_chat(
        &self,
        messages: &[Message],
        conversation_id: Option<&str>,
    ) -> Result<ChatResponse> {
        self.sent.lock().unwrap().push(ChatRequest {
            messages: messages.to_vec(),
            conversation_id: conversation_id.map(str::to_string),
        });
        self.pause().await;
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Err(anyhow::anyhow!("no scripted reply")),
        }
    }

    async fn list_conversations(&self) -> Result<Vec<ConversationSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("list unavailable"));
        }
        Ok(self.summaries.lock().unwrap().clone())
    }

    async fn get_conversation(&self, id: &str) -> Result<ConversationDetail> {
        self.pause().await;
        let found = self.details.lock().unwrap().get(id).cloned();
        found.ok_or_else(|| anyhow::anyhow!("Conversation not found: {}", id))
    }

    async fn delete_conversation(&self, id: &str) -> Result<()> {
        self.pause().await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(PawfectError::Session("delete rejected".to_string()).into());
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_creation() {
        let dir = temp_dir();
        assert!(dir.path().exists());
    }

    #[test]
    fn test_assert_error_contains_success() {
        let result: Result<()> = Err(PawfectError::Config("test error message".to_string()).into());
        assert_error_contains(result, "test error");
    }

    #[test]
    #[should_panic(expected = "Expected error containing")]
    fn test_assert_error_contains_ok() {
        assert_error_contains(Ok(()), "error");
    }

    #[tokio::test]
    async fn test_fake_backend_serves_replies_in_order() {
        let backend = FakeBackend::new();
        backend.push_reply("c1", "one");
        backend.push_failure("boom");

        let first = backend.send_chat(&[Message::user("a")], None).await.unwrap();
        assert_eq!(first.message, "one");
        assert!(backend.send_chat(&[], Some("c1")).await.is_err());
        assert!(backend.send_chat(&[], Some("c1")).await.is_err());
        assert_eq!(backend.sent().len(), 3);
    }
}
