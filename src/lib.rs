//! Pawfect - AI veterinary assistant client library
//!
//! This library provides the core of the Pawfect terminal client: the
//! persisted sign-in session, the backend API client, and the conversation
//! controller that keeps the active transcript consistent with the server.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Wire types, the `ConversationBackend` trait and the HTTP client
//! - `session`: Token and profile storage behind pluggable backends
//! - `conversation`: Active transcript, optimistic send and rollback
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//! - `commands`: Handlers invoked by the binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pawfect::{Config, ConversationController, SessionStore};
//! use pawfect::api::{ClientConfig, PawfectClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = SessionStore::from_config(&config.session)?;
//!     let session = store.require()?;
//!     let client = PawfectClient::new(ClientConfig::from(&config.api))?.with_token(session.token);
//!     let controller = ConversationController::new(Arc::new(client));
//!     controller.send("How often should I take my cat to the vet?").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod error;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use conversation::ConversationController;
pub use error::{PawfectError, Result};
pub use session::SessionStore;

#[cfg(test)]
pub mod test_utils;
