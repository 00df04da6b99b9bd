//! Transcript of the active conversation
//!
//! The welcome greeting is a display prefix flag, not an element of the
//! message list. [`Transcript::history`] is therefore always exactly what is
//! sent to the backend, and [`Transcript::displayed`] differs from it only by
//! that prefix.

use crate::api::Message;

/// Greeting shown at the top of a new chat
pub const WELCOME_MESSAGE: &str = "Hi! I'm **Pawfect**, your AI veterinary assistant.\n\nAsk me anything about your pet's health, nutrition, behavior, or general care.\n\n*For emergencies, always contact a licensed vet immediately.*";

/// Ordered messages of the active conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    welcome: bool,
    messages: Vec<Message>,
}

impl Transcript {
    /// Empty transcript of a new chat, greeting shown
    pub fn welcome() -> Self {
        Self {
            welcome: true,
            messages: Vec::new(),
        }
    }

    /// Transcript of a stored conversation, no greeting
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            welcome: false,
            messages,
        }
    }

    /// Whether the greeting is displayed before the messages
    pub fn shows_welcome(&self) -> bool {
        self.welcome
    }

    /// True for a new chat nobody has written in yet
    pub fn is_pristine(&self) -> bool {
        self.welcome && self.messages.is_empty()
    }

    /// Messages sent to the backend
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Number of real messages, greeting excluded
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when there are no real messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Messages as shown to the user, greeting first when enabled
    ///
    /// # Examples
    ///
    /// ```
    /// use pawfect::api::Message;
    /// use pawfect::conversation::Transcript;
    ///
    /// let mut transcript = Transcript::welcome();
    /// transcript.push(Message::user("hello"));
    /// assert_eq!(transcript.displayed().len(), 2);
    /// assert_eq!(transcript.history().len(), 1);
    /// ```
    pub fn displayed(&self) -> Vec<Message> {
        let mut shown = Vec::with_capacity(self.messages.len() + 1);
        if self.welcome {
            shown.push(Message::assistant(WELCOME_MESSAGE));
        }
        shown.extend(self.messages.iter().cloned());
        shown
    }

    /// Appends a message
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::welcome()
    }
}
