/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `auth`          - Register, login, logout and whoami
- `ask`           - One message through the conversation controller
- `chat`          - Interactive chat mode
- `conversations` - List, show and delete stored conversations

Handlers resolve the stored session first; every command except the auth
commands refuses to run when nobody is signed in.
*/

use std::sync::Arc;

use colored::Colorize;

use crate::api::{ClientConfig, PawfectClient};
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::error::{PawfectError, Result};
use crate::session::SessionStore;

// Interactive chat loop
pub mod chat;

// Conversation list/show/delete
pub mod conversations;

// Slash commands accepted by the chat loop
pub mod special_commands;

/// Opens the session store selected in configuration
pub fn open_session(config: &Config) -> Result<SessionStore> {
    SessionStore::from_config(&config.session)
}

/// Builds a client without credentials, for the auth endpoints
pub fn anonymous_client(config: &Config) -> Result<PawfectClient> {
    Ok(PawfectClient::new(ClientConfig::from(&config.api))?)
}

/// Builds a client carrying the stored bearer token
///
/// # Errors
///
/// Returns `PawfectError::NotAuthenticated` when no session is stored.
pub fn authenticated_client(config: &Config, store: &SessionStore) -> Result<PawfectClient> {
    let session = store.require()?;
    Ok(anonymous_client(config)?.with_token(session.token))
}

/// Builds a controller over the authenticated client
pub fn controller(config: &Config, store: &SessionStore) -> Result<ConversationController> {
    let client = authenticated_client(config, store)?;
    Ok(ConversationController::new(Arc::new(client)))
}

/// Text shown to the user for a failed operation
///
/// Typed failures use their fixed notice; anything else falls back to the
/// full error chain.
pub fn notice(err: &anyhow::Error) -> String {
    match err.downcast_ref::<PawfectError>() {
        Some(e) => e.notice(),
        None => format!("{:#}", err),
    }
}

/// Authentication commands
pub mod auth {
    use super::*;
    use crate::api::{AuthResponse, ClientError, User};
    use rustyline::DefaultEditor;

    /// Minimum accepted password length for registration
    pub const MIN_PASSWORD_LEN: usize = 6;

    /// Checks registration input before any request is made
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::Validation` naming the first problem found.
    pub fn validate_registration(name: &str, email: &str, password: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(PawfectError::Validation("Name is required".to_string()).into());
        }
        if email.trim().is_empty() {
            return Err(PawfectError::Validation("Email is required".to_string()).into());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PawfectError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))
            .into());
        }
        Ok(())
    }

    /// Uses the supplied password or asks for one
    pub fn resolve_password(password: Option<String>) -> Result<String> {
        match password {
            Some(p) => Ok(p),
            None => {
                let mut rl = DefaultEditor::new()?;
                Ok(rl.readline("Password: ")?)
            }
        }
    }

    /// Maps a failed auth call to the message shown to the user
    fn auth_failure(err: ClientError, fallback: &str) -> PawfectError {
        tracing::debug!("Authentication request failed: {}", err);
        let message = err
            .server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        PawfectError::Authentication(message)
    }

    fn remember(store: &SessionStore, auth: &AuthResponse) -> Result<User> {
        store.establish(&auth.token, &auth.name, &auth.email)?;
        Ok(User {
            name: auth.name.clone(),
            email: auth.email.clone(),
        })
    }

    /// Creates an account and stores the issued session
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::Validation` for local input problems and
    /// `PawfectError::Authentication` when the server rejects the request;
    /// the stored session is unchanged in both cases.
    pub async fn register(
        config: &Config,
        store: &SessionStore,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        validate_registration(name, email, password)?;
        let client = anonymous_client(config)?;
        let auth = client
            .register(name.trim(), email.trim(), password)
            .await
            .map_err(|e| auth_failure(e, "Registration failed"))?;
        remember(store, &auth)
    }

    /// Signs in and stores the issued session
    ///
    /// # Errors
    ///
    /// Returns `PawfectError::Authentication`; the stored session is
    /// unchanged.
    pub async fn login(
        config: &Config,
        store: &SessionStore,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let client = anonymous_client(config)?;
        let auth = client
            .login(email.trim(), password)
            .await
            .map_err(|e| auth_failure(e, "Invalid email or password"))?;
        remember(store, &auth)
    }

    /// `pawfect register`
    pub async fn run_register(
        config: Config,
        name: String,
        email: String,
        password: Option<String>,
    ) -> Result<()> {
        let store = open_session(&config)?;
        let password = resolve_password(password)?;
        let user = register(&config, &store, &name, &email, &password).await?;
        println!("{}", format!("Welcome to Pawfect, {}!", user.name).green());
        Ok(())
    }

    /// `pawfect login`
    pub async fn run_login(config: Config, email: String, password: Option<String>) -> Result<()> {
        let store = open_session(&config)?;
        let password = resolve_password(password)?;
        let user = login(&config, &store, &email, &password).await?;
        println!("{}", format!("Welcome back, {}", user.name).green());
        Ok(())
    }

    /// `pawfect logout`
    pub fn run_logout(config: Config) -> Result<()> {
        let store = open_session(&config)?;
        store.clear()?;
        println!("Signed out.");
        Ok(())
    }

    /// `pawfect whoami`
    pub fn run_whoami(config: Config) -> Result<()> {
        let store = open_session(&config)?;
        let session = store.require()?;
        match session.user {
            Some(user) => println!("{} <{}>", user.name.bold(), user.email),
            None => println!("Signed in (no stored profile)"),
        }
        Ok(())
    }

}

/// One-shot question
pub mod ask {
    use super::*;
    use crate::conversation::SendOutcome;

    /// `pawfect ask`
    ///
    /// Sends one message, into a stored conversation when `conversation` is
    /// given, and prints the reply followed by the conversation id.
    pub async fn run_ask(config: Config, message: String, conversation: Option<String>) -> Result<()> {
        let store = open_session(&config)?;
        let controller = controller(&config, &store)?;

        if let Some(id) = &conversation {
            controller.load_conversation(id).await?;
        }

        match controller.send(&message).await? {
            SendOutcome::Replied {
                reply,
                conversation_id,
                ..
            } => {
                println!("{}", reply.content);
                println!();
                println!("{} {}", "Conversation:".dimmed(), conversation_id.cyan());
                Ok(())
            }
            SendOutcome::Ignored(_) => {
                Err(PawfectError::Validation("Message is empty".to_string()).into())
            }
            SendOutcome::Discarded => Ok(()),
        }
    }
}
