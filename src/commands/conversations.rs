use chrono::{Local, NaiveDateTime};
use colored::Colorize;
use prettytable::{format, Table};

use super::{authenticated_client, notice, open_session};
use crate::api::{ConversationSummary, Message, Role};
use crate::cli::ConversationCommand;
use crate::config::Config;
use crate::error::{PawfectError, Result};

/// Handle conversation commands
pub async fn handle_conversations(config: Config, command: ConversationCommand) -> Result<()> {
    let store = open_session(&config)?;
    let client = authenticated_client(&config, &store)?;

    match command {
        ConversationCommand::List => {
            let summaries = client.list_conversations().await?;
            print_summaries(&summaries, now());
            if !summaries.is_empty() {
                println!(
                    "Use {} to continue a conversation.",
                    "pawfect chat --resume <ID>".cyan()
                );
                println!();
            }
        }
        ConversationCommand::Show { id } => {
            let detail = client
                .get_conversation(&id)
                .await
                .map_err(|e| PawfectError::LoadFailed(e.to_string()))?;
            println!();
            println!("{}", detail.title.bold());
            println!(
                "{}",
                format!("Updated {}", format_relative_date(detail.updated_at, now())).dimmed()
            );
            println!();
            for message in &detail.messages {
                print_message(message);
            }
        }
        ConversationCommand::Delete { id } => {
            match client.delete_conversation(&id).await {
                Ok(()) => println!("{}", "Conversation deleted".green()),
                Err(e) => {
                    let err: anyhow::Error = PawfectError::DeleteFailed(e.to_string()).into();
                    tracing::warn!(conversation_id = %id, "Delete failed: {}", e);
                    eprintln!("{}", notice(&err).red());
                    return Err(err);
                }
            }
        }
    }

    Ok(())
}

/// Current wall-clock time in the backend's naive local representation
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Formats a last-updated timestamp relative to `now`
///
/// Whole elapsed days decide the wording: "Today" under one day,
/// "Yesterday" under two, "N days ago" under a week, otherwise the date.
/// Timestamps in the future count as today.
pub fn format_relative_date(updated: NaiveDateTime, now: NaiveDateTime) -> String {
    let days = (now - updated).num_days().max(0);
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => updated.format("%Y-%m-%d").to_string(),
    }
}

/// Prints the numbered summary table
///
/// The numbers are the positions accepted by `/open` and `/delete` in chat.
pub fn print_summaries(summaries: &[ConversationSummary], now: NaiveDateTime) {
    if summaries.is_empty() {
        println!("{}", "No conversations yet".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "#".bold(),
        "ID".bold(),
        "Title".bold(),
        "Updated".bold()
    ]);

    for (index, summary) in summaries.iter().enumerate() {
        table.add_row(prettytable::row![
            index + 1,
            summary.id.cyan(),
            truncate(&summary.title, 40),
            format_relative_date(summary.updated_at, now)
        ]);
    }

    println!("\nConversations:");
    table.printstd();
    println!();
}

/// Prints one transcript entry
pub fn print_message(message: &Message) {
    match message.role {
        Role::User => println!("{} {}", "You:".blue().bold(), message.content),
        Role::Assistant => println!("{} {}", "Pawfect:".green().bold(), message.content),
    }
    println!();
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
