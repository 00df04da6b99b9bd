//! Pawfect - AI veterinary assistant in your terminal
//!
#![doc = "Pawfect - AI veterinary assistant in your terminal"]
#![doc = "Main entry point for the Pawfect client application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pawfect::cli::{Cli, Commands};
use pawfect::commands;
use pawfect::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            tracing::info!("Starting registration");
            commands::auth::run_register(config, name, email, password).await?;
            Ok(())
        }
        Commands::Login { email, password } => {
            tracing::info!("Starting login");
            commands::auth::run_login(config, email, password).await?;
            Ok(())
        }
        Commands::Logout => {
            commands::auth::run_logout(config)?;
            Ok(())
        }
        Commands::Whoami => {
            commands::auth::run_whoami(config)?;
            Ok(())
        }
        Commands::Chat { resume } => {
            tracing::info!("Starting interactive chat mode");
            if let Some(r) = &resume {
                tracing::debug!("Resuming conversation: {}", r);
            }
            commands::chat::run_chat(config, resume).await?;
            Ok(())
        }
        Commands::Ask {
            message,
            conversation,
        } => {
            commands::ask::run_ask(config, message, conversation).await?;
            Ok(())
        }
        Commands::Conversations { command } => {
            tracing::info!("Starting conversations command");
            commands::conversations::handle_conversations(config, command).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `--verbose` raises the crate's level
/// to debug. Logs go to stderr so replies on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pawfect=debug" } else { "pawfect=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
