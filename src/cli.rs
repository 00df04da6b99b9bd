//! Command-line interface definition for Pawfect
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for authentication, chatting and conversation
//! management.

use clap::{Parser, Subcommand};

/// Pawfect - AI veterinary assistant in your terminal
///
/// Ask questions about your pet's health, nutrition, behavior, or general
/// care, and browse your past conversations.
#[derive(Parser, Debug, Clone)]
#[command(name = "pawfect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Override the backend base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Pawfect
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password (at least 6 characters); prompted when omitted
        #[arg(short, long, env = "PAWFECT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in with an existing account
    Login {
        /// Login email
        #[arg(short, long)]
        email: String,

        /// Password; prompted when omitted
        #[arg(short, long, env = "PAWFECT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Start an interactive chat
    Chat {
        /// Open a stored conversation instead of a new chat
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// Message text
        message: String,

        /// Continue a stored conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Manage stored conversations
    Conversations {
        /// Conversation subcommand
        #[command(subcommand)]
        command: ConversationCommand,
    },
}

/// Conversation management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConversationCommand {
    /// List stored conversations, most recent first
    List,

    /// Print a stored conversation
    Show {
        /// Conversation id
        id: String,
    },

    /// Delete a stored conversation
    Delete {
        /// Conversation id
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            api_url: None,
            verbose: false,
            command: Commands::Whoami,
        }
    }
}
