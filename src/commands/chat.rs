//! Interactive chat mode handler.
//!
//! Opens the stored session, builds a [`ConversationController`] over the
//! backend client, and runs a readline loop that sends user input as chat
//! messages and dispatches slash commands.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::conversations::{now, print_message, print_summaries};
use super::special_commands::{parse_special_command, print_help, ConversationRef, SpecialCommand};
use super::{controller, notice, open_session};
use crate::api::ConversationSummary;
use crate::config::Config;
use crate::conversation::{
    ConversationController, ConversationState, DeleteOutcome, LoadOutcome, Rejection,
    SendOutcome, SUGGESTIONS,
};
use crate::error::Result;
use crate::session::SessionStore;

/// Start interactive chat mode
///
/// # Arguments
///
/// * `config` - Global configuration (consumed)
/// * `resume` - Conversation to open instead of a new chat
pub async fn run_chat(config: Config, resume: Option<String>) -> Result<()> {
    let store = open_session(&config)?;
    let controller = controller(&config, &store)?;
    let show_suggestions = config.chat.show_suggestions;

    if let Err(e) = controller.refresh_conversations().await {
        tracing::warn!("Could not fetch conversation list: {:#}", e);
    }

    if let Some(id) = &resume {
        tracing::debug!("Resuming conversation: {}", id);
        if let Err(e) = controller.load_conversation(id).await {
            eprintln!("{}", notice(&e).red());
        }
    }

    print_conversation(&controller, show_suggestions);

    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("{} ", "You>".blue().bold());
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                let command = match parse_special_command(trimmed) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().yellow());
                        continue;
                    }
                };

                match command {
                    SpecialCommand::None => send_message(&controller, trimmed).await,
                    SpecialCommand::NewChat => {
                        controller.start_new_chat();
                        print_conversation(&controller, show_suggestions);
                    }
                    SpecialCommand::ListConversations => {
                        if let Err(e) = controller.refresh_conversations().await {
                            tracing::warn!("Could not fetch conversation list: {:#}", e);
                            eprintln!("{}", "Could not fetch conversations".red());
                        }
                        print_summaries(&controller.summaries(), now());
                    }
                    SpecialCommand::Open(reference) => {
                        open(&controller, &reference, show_suggestions).await
                    }
                    SpecialCommand::Delete(reference) => {
                        delete(&controller, &reference, show_suggestions).await
                    }
                    SpecialCommand::Suggest(None) => print_suggestions(),
                    SpecialCommand::Suggest(Some(n)) => match SUGGESTIONS.get(n - 1) {
                        Some(text) => {
                            println!("{} {}", "You:".blue().bold(), text);
                            send_message(&controller, text).await
                        }
                        None => eprintln!(
                            "{}",
                            format!("Choose a suggestion between 1 and {}", SUGGESTIONS.len())
                                .yellow()
                        ),
                    },
                    SpecialCommand::ShowStatus => print_status(&controller),
                    SpecialCommand::WhoAmI => print_whoami(&store),
                    SpecialCommand::Logout => {
                        store.clear()?;
                        println!("Signed out.");
                        break;
                    }
                    SpecialCommand::Help => print_help(),
                    SpecialCommand::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                tracing::error!("Readline error: {:?}", e);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Sends one message and prints the reply or the failure notice
async fn send_message(controller: &ConversationController, text: &str) {
    match controller.send(text).await {
        Ok(SendOutcome::Replied {
            reply, created, ..
        }) => {
            print_message(&reply);
            if created {
                tracing::debug!("New conversation titled {}", controller.title());
            }
        }
        Ok(SendOutcome::Ignored(Rejection::Busy)) => {
            println!("{}", "Still waiting for the previous reply".yellow())
        }
        Ok(SendOutcome::Ignored(Rejection::EmptyInput)) | Ok(SendOutcome::Discarded) => {}
        Err(e) => eprintln!("{}", notice(&e).red()),
    }
}

async fn open(controller: &ConversationController, reference: &ConversationRef, suggest: bool) {
    let Some(id) = resolve_reference(&controller.summaries(), reference) else {
        eprintln!("{}", "No such conversation. Use /list to see them.".yellow());
        return;
    };
    match controller.load_conversation(&id).await {
        Ok(LoadOutcome::Loaded { .. }) => print_conversation(controller, suggest),
        Ok(LoadOutcome::Ignored(_)) | Ok(LoadOutcome::Discarded) => {}
        Err(e) => eprintln!("{}", notice(&e).red()),
    }
}

async fn delete(controller: &ConversationController, reference: &ConversationRef, suggest: bool) {
    let Some(id) = resolve_reference(&controller.summaries(), reference) else {
        eprintln!("{}", "No such conversation. Use /list to see them.".yellow());
        return;
    };
    match controller.delete_conversation(&id).await {
        Ok(DeleteOutcome::Deleted { was_active }) => {
            println!("{}", "Conversation deleted".green());
            if was_active {
                print_conversation(controller, suggest);
            }
        }
        Ok(DeleteOutcome::Ignored(_)) => {}
        Err(e) => eprintln!("{}", notice(&e).red()),
    }
}

/// Turns a list position or id into a conversation id
///
/// Positions are 1-based into `summaries`. Ids are passed through unchecked
/// so conversations not in the cached list can still be reached.
pub fn resolve_reference(
    summaries: &[ConversationSummary],
    reference: &ConversationRef,
) -> Option<String> {
    match reference {
        ConversationRef::Index(n) => summaries.get(n.checked_sub(1)?).map(|s| s.id.clone()),
        ConversationRef::Id(id) => Some(id.clone()),
    }
}

/// Prints the header and the displayed transcript
fn print_conversation(controller: &ConversationController, show_suggestions: bool) {
    println!();
    println!("{}", format!("── {} ──", controller.title()).bold());
    println!();
    for message in controller.displayed() {
        print_message(&message);
    }
    if show_suggestions && controller.shows_suggestions() {
        print_suggestions();
    }
}

fn print_suggestions() {
    println!("{}", "Try asking:".dimmed());
    for (index, text) in SUGGESTIONS.iter().enumerate() {
        println!("  {} {}", format!("{}.", index + 1).cyan(), text);
    }
    println!("{}", "Type /suggest <n> to ask one.".dimmed());
    println!();
}

fn print_status(controller: &ConversationController) {
    let state = match controller.state() {
        ConversationState::New => "new chat".to_string(),
        ConversationState::Persisted(id) => format!("saved ({})", id),
        ConversationState::Loading => "loading".to_string(),
        ConversationState::Sending => "sending".to_string(),
    };
    println!();
    println!("{} {}", "Conversation:".bold(), controller.title());
    println!("{} {}", "State:".bold(), state);
    println!("{} {}", "Messages:".bold(), controller.history().len());
    println!(
        "{} {}",
        "Stored conversations:".bold(),
        controller.summaries().len()
    );
    println!();
}

fn print_whoami(store: &SessionStore) {
    match store.current_user() {
        Ok(Some(user)) => println!("{} <{}>", user.name.bold(), user.email),
        Ok(None) => println!("Signed in (no stored profile)"),
        Err(e) => eprintln!("{}", notice(&e).red()),
    }
}
