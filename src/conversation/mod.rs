//! Conversation controller
//!
//! Owns the active transcript, the active conversation id and the summary
//! list, and keeps them consistent with the backend across optimistic sends,
//! loads and deletes.
//!
//! # State machine
//!
//! ```text
//! New ──send──▶ Sending ──ok──▶ Persisted(id)
//!                  └──fail──▶ prior state, transcript restored
//! Persisted(id) ──send──▶ Sending ──ok/fail──▶ Persisted(id)
//! New | Persisted ──load(id)──▶ Loading ──ok──▶ Persisted(id)
//!                                  └──fail──▶ prior state
//! any ──start_new_chat──▶ New
//! ```
//!
//! All methods take `&self`; state sits behind a mutex that is never held
//! across an `.await`, so the UI may issue overlapping calls. Send, load and
//! delete share one in-flight slot. Every completion checks the generation it
//! was issued under, and [`ConversationController::start_new_chat`] bumps the
//! generation, so a response for a conversation the user left is discarded.

pub mod transcript;

pub use transcript::{Transcript, WELCOME_MESSAGE};

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::api::{ConversationBackend, ConversationSummary, Message};
use crate::error::{PawfectError, Result};

/// Starter questions offered on an empty chat
pub const SUGGESTIONS: [&str; 4] = [
    "My dog has been vomiting — what should I do?",
    "How often should I take my cat to the vet?",
    "What foods are toxic to dogs?",
    "My rabbit isn't eating. Is that normal?",
];

/// Observable controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    /// No identifier assigned yet
    New,
    /// Transcript belongs to a stored conversation
    Persisted(String),
    /// Fetching a stored conversation
    Loading,
    /// A send is in flight
    Sending,
}

/// Why a request was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Message was empty after trimming
    EmptyInput,
    /// Another send, load or delete is in flight
    Busy,
}

/// Result of [`ConversationController::send`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Not sent; transcript unchanged
    Ignored(Rejection),
    /// Reply appended to the transcript
    Replied {
        /// Appended assistant message
        reply: Message,
        /// Conversation the exchange belongs to
        conversation_id: String,
        /// True when this send created the conversation
        created: bool,
    },
    /// The user switched conversations before the reply arrived
    Discarded,
}

/// Result of [`ConversationController::load_conversation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Not started; nothing changed
    Ignored(Rejection),
    /// Transcript replaced with the stored messages
    Loaded {
        /// Conversation title
        title: String,
        /// Number of messages loaded
        message_count: usize,
    },
    /// The user switched conversations before the response arrived
    Discarded,
}

/// Result of [`ConversationController::delete_conversation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Not started; nothing changed
    Ignored(Rejection),
    /// Removed from the summary list
    Deleted {
        /// True when the active conversation was deleted and a new chat started
        was_active: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Loading,
    Sending,
    Deleting,
}

#[derive(Debug)]
struct Inner {
    transcript: Transcript,
    active_id: Option<String>,
    phase: Phase,
    summaries: Vec<ConversationSummary>,
    generation: u64,
}

impl Inner {
    fn reset(&mut self) {
        self.transcript = Transcript::welcome();
        self.active_id = None;
        self.phase = Phase::Idle;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Drives one active conversation against a [`ConversationBackend`]
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use pawfect::api::{ClientConfig, PawfectClient};
/// use pawfect::conversation::{ConversationController, SendOutcome};
///
/// # async fn example() -> pawfect::error::Result<()> {
/// let client = PawfectClient::new(ClientConfig {
///     base_url: "http://localhost:8080".to_string(),
///     timeout_secs: 30,
/// })?
/// .with_token("token");
/// let controller = ConversationController::new(Arc::new(client));
///
/// if let SendOutcome::Replied { reply, .. } = controller.send("What foods are toxic to dogs?").await? {
///     println!("{}", reply.content);
/// }
/// # Ok(())
/// # }
/// ```
pub struct ConversationController {
    backend: Arc<dyn ConversationBackend>,
    inner: Mutex<Inner>,
}

impl ConversationController {
    /// Creates a controller in the `New` state
    pub fn new(backend: Arc<dyn ConversationBackend>) -> Self {
        Self {
            backend,
            inner: Mutex::new(Inner {
                transcript: Transcript::welcome(),
                active_id: None,
                phase: Phase::Idle,
                summaries: Vec::new(),
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state
    pub fn state(&self) -> ConversationState {
        let inner = self.lock();
        match inner.phase {
            Phase::Loading => ConversationState::Loading,
            Phase::Sending => ConversationState::Sending,
            Phase::Idle | Phase::Deleting => match &inner.active_id {
                Some(id) => ConversationState::Persisted(id.clone()),
                None => ConversationState::New,
            },
        }
    }

    /// True while a send, load or delete is in flight
    pub fn is_busy(&self) -> bool {
        self.lock().phase != Phase::Idle
    }

    /// Identifier of the active conversation
    pub fn active_id(&self) -> Option<String> {
        self.lock().active_id.clone()
    }

    /// Copy of the active transcript
    pub fn transcript(&self) -> Transcript {
        self.lock().transcript.clone()
    }

    /// Messages as shown to the user
    pub fn displayed(&self) -> Vec<Message> {
        self.lock().transcript.displayed()
    }

    /// Messages that the next send would transmit, before the new one
    pub fn history(&self) -> Vec<Message> {
        self.lock().transcript.history().to_vec()
    }

    /// Last fetched summary list
    pub fn summaries(&self) -> Vec<ConversationSummary> {
        self.lock().summaries.clone()
    }

    /// Header title for the active conversation
    pub fn title(&self) -> String {
        let inner = self.lock();
        match &inner.active_id {
            None => "New chat".to_string(),
            Some(id) => inner
                .summaries
                .iter()
                .find(|s| &s.id == id)
                .map(|s| s.title.clone())
                .unwrap_or_else(|| "Chat".to_string()),
        }
    }

    /// True when the starter questions should be offered
    pub fn shows_suggestions(&self) -> bool {
        let inner = self.lock();
        inner.transcript.is_pristine() && inner.phase == Phase::Idle
    }

    /// Resets to an empty new chat
    ///
    /// Any in-flight send or load is orphaned and its response discarded.
    pub fn start_new_chat(&self) {
        let mut inner = self.lock();
        inner.reset();
        debug!(generation = inner.generation, "Started new chat");
    }

    /// Replaces the summary list from the backend
    ///
    /// # Returns
    ///
    /// Number of summaries now held
    ///
    /// # Errors
    ///
    /// Returns the backend error; the existing list is kept.
    pub async fn refresh_conversations(&self) -> Result<usize> {
        let summaries = self.backend.list_conversations().await?;
        let count = summaries.len();
        self.lock().summaries = summaries;
        debug!(count, "Refreshed conversation list");
        Ok(count)
    }

    /// Sends a user message with optimistic append and exact rollback
    ///
    /// The trimmed text is appended immediately. On success the reply is
    /// appended and, for a new conversation, the server-assigned id is
    /// adopted and the summary list refreshed. On failure the transcript is
    /// restored to its pre-send value.
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::SendFailed` when the backend call fails.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let content = text.trim();
        if content.is_empty() {
            return Ok(SendOutcome::Ignored(Rejection::EmptyInput));
        }

        let (history, conversation_id, snapshot, generation) = {
            let mut inner = self.lock();
            if inner.phase != Phase::Idle {
                debug!("Send ignored: operation in flight");
                return Ok(SendOutcome::Ignored(Rejection::Busy));
            }
            let snapshot = inner.transcript.clone();
            inner.transcript.push(Message::user(content));
            inner.phase = Phase::Sending;
            (
                inner.transcript.history().to_vec(),
                inner.active_id.clone(),
                snapshot,
                inner.generation,
            )
        };

        debug!(
            messages = history.len(),
            conversation_id = ?conversation_id,
            "Sending message"
        );
        let result = self
            .backend
            .send_chat(&history, conversation_id.as_deref())
            .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                let mut inner = self.lock();
                if inner.generation == generation {
                    inner.transcript = snapshot;
                    inner.phase = Phase::Idle;
                }
                warn!("Send failed, rolled back optimistic message: {:#}", e);
                return Err(PawfectError::SendFailed(format!("{:#}", e)).into());
            }
        };

        let created = conversation_id.is_none();
        let applied = {
            let mut inner = self.lock();
            if inner.generation == generation {
                inner
                    .transcript
                    .push(Message::assistant(response.message.clone()));
                inner.phase = Phase::Idle;
                if created {
                    inner.active_id = Some(response.conversation_id.clone());
                }
                true
            } else {
                false
            }
        };

        if created {
            if let Err(e) = self.refresh_conversations().await {
                warn!("Could not refresh conversation list: {:#}", e);
            }
        }

        if !applied {
            info!(
                conversation_id = %response.conversation_id,
                "Discarded reply for a conversation that is no longer active"
            );
            return Ok(SendOutcome::Discarded);
        }

        if created {
            info!(conversation_id = %response.conversation_id, "Conversation created");
        }
        Ok(SendOutcome::Replied {
            reply: Message::assistant(response.message),
            conversation_id: response.conversation_id,
            created,
        })
    }

    /// Replaces the transcript with a stored conversation
    ///
    /// Ignored while a send or another load is in flight.
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::LoadFailed`; the prior transcript and state
    /// are kept.
    pub async fn load_conversation(&self, id: &str) -> Result<LoadOutcome> {
        let generation = {
            let mut inner = self.lock();
            if inner.phase != Phase::Idle {
                debug!(conversation_id = %id, "Load ignored: operation in flight");
                return Ok(LoadOutcome::Ignored(Rejection::Busy));
            }
            inner.phase = Phase::Loading;
            inner.generation
        };

        let result = self.backend.get_conversation(id).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(conversation_id = %id, "Discarded stale conversation load");
            return Ok(LoadOutcome::Discarded);
        }
        inner.phase = Phase::Idle;

        match result {
            Ok(detail) => {
                let message_count = detail.messages.len();
                inner.transcript = Transcript::from_messages(detail.messages);
                inner.active_id = Some(id.to_string());
                info!(conversation_id = %id, message_count, "Loaded conversation");
                Ok(LoadOutcome::Loaded {
                    title: detail.title,
                    message_count,
                })
            }
            Err(e) => {
                warn!(conversation_id = %id, "Failed to load conversation: {:#}", e);
                Err(PawfectError::LoadFailed(format!("{:#}", e)).into())
            }
        }
    }

    /// Deletes a stored conversation
    ///
    /// Shares the in-flight slot with send and load, so it is ignored while
    /// either is pending. Deleting the active conversation starts a new chat.
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::DeleteFailed`; the summary list and the
    /// active conversation are kept.
    pub async fn delete_conversation(&self, id: &str) -> Result<DeleteOutcome> {
        let generation = {
            let mut inner = self.lock();
            if inner.phase != Phase::Idle {
                debug!(conversation_id = %id, "Delete ignored: operation in flight");
                return Ok(DeleteOutcome::Ignored(Rejection::Busy));
            }
            inner.phase = Phase::Deleting;
            inner.generation
        };

        let result = self.backend.delete_conversation(id).await;

        let mut inner = self.lock();
        // A new chat started meanwhile already released the slot.
        if inner.generation == generation {
            inner.phase = Phase::Idle;
        }
        if let Err(e) = result {
            warn!(conversation_id = %id, "Failed to delete conversation: {:#}", e);
            return Err(PawfectError::DeleteFailed(format!("{:#}", e)).into());
        }

        inner.summaries.retain(|s| s.id != id);
        let was_active = inner.active_id.as_deref() == Some(id);
        if was_active {
            inner.reset();
        }
        info!(conversation_id = %id, was_active, "Deleted conversation");
        Ok(DeleteOutcome::Deleted { was_active })
    }
}
