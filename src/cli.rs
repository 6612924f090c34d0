use std::fs;
use std::path::Path;

use chrono::Local;
use clap::{Parser, Subcommand};
use log::warn;

use crate::command::parse_command;
use crate::models::event::Event;
use crate::service::approval_prompt::{
    ApprovalPromptService, ConsoleApprovalPrompt, PresetApprovalPrompt,
};
use crate::service::calendar_service::CalendarService;
use crate::service::dispatch::{dispatch, DispatchContext, DispatchOutcome};
use crate::service::openai_service::{OpenAIClient, OpenAIService};
use crate::store::{EventStore, SqliteEventStore};

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the calendar in natural language
    Ask {
        words: Vec<String>,
        /// Skip the narrated summary of lookup results
        #[arg(long)]
        plain: bool,
        /// Pre-approve a full calendar wipe (for non-interactive use)
        #[arg(long)]
        yes: bool,
    },
    /// Print all events in the database
    Dump {},
}

pub async fn cli(db_path: String, openai_api_key: Option<String>) {
    // Fine to panic here
    let cli = Cli::parse();

    if let Some(parent) = Path::new(&db_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    let store = match SqliteEventStore::open(&db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open calendar database at {}: {}", db_path, e);
            return;
        }
    };

    match &cli.command {
        Commands::Ask { words, plain, yes } => {
            if words.is_empty() {
                println!("Nothing to ask.");
                return;
            }
            let api_key =
                openai_api_key.expect("OPENAI_API_KEY environment variable not set");
            let openai = OpenAIService::new(api_key);
            let approval: Box<dyn ApprovalPromptService> = if *yes {
                Box::new(PresetApprovalPrompt::new(true))
            } else {
                Box::new(ConsoleApprovalPrompt)
            };
            if let Err(e) = ask(&store, &openai, approval.as_ref(), words, *plain).await {
                println!("Failed to run calendar query: {}", e);
            }
        }
        Commands::Dump {} => {
            if let Err(e) = dump(&store) {
                println!("Failed to dump events: {}", e);
            }
        }
    }
}

/// The natural-language path: assemble the dated prompt, ask the model for
/// a command, validate it, dispatch it, print the outcome.
pub async fn ask(
    store: &dyn EventStore,
    openai: &dyn OpenAIClient,
    approval: &dyn ApprovalPromptService,
    words: &[String],
    plain: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let prompt = format!(
        "{}: {}",
        Local::now().format("%A, %d %B %Y %I:%M%p"),
        words.join(" ")
    );

    let raw = openai.generate_prompt(&prompt, "calendar_command").await?;

    let Some(call) = parse_command(&raw) else {
        // Fail closed: a response outside the grammar does nothing.
        warn!("Model response did not parse as a command: {}", raw.trim());
        return Ok(());
    };

    let ctx = DispatchContext {
        prompt: Some(&prompt),
        today: Local::now().date_naive().to_string(),
        fancy_default: !plain,
    };

    match dispatch(call, store, approval, &ctx).await? {
        DispatchOutcome::Added { event } => {
            if event.end_time != event.start_time {
                println!(
                    "Added: {} to {}: {}",
                    event.start_time, event.end_time, event.text
                );
            } else {
                println!("Added: {}: {}", event.start_time, event.text);
            }
        }
        DispatchOutcome::Found { events, fancy } => {
            print_events(&events);
            if fancy && !events.is_empty() {
                // Best-effort narration; the list above already stands.
                if let Some(summary) = CalendarService::narrate_events(&events, openai).await {
                    println!();
                    println!("{}", summary);
                }
            }
        }
        DispatchOutcome::Cleared { deleted } => {
            if deleted == 0 {
                println!("No events found to delete.");
            } else {
                println!("Deleted {} event(s).", deleted);
            }
        }
        DispatchOutcome::ClearDeclined => {
            println!("No events deleted.");
        }
        DispatchOutcome::Unknown { .. } => {}
        DispatchOutcome::Usage { message } => {
            println!("{}", message);
        }
    }

    Ok(())
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }
    println!("Found {} event(s):", events.len());
    for event in events {
        if event.end_time != event.start_time {
            println!(
                "- {} to {}: {}",
                event.start_time, event.end_time, event.text
            );
        } else {
            println!("- {}: {}", event.start_time, event.text);
        }
    }
}

fn dump(store: &dyn EventStore) -> Result<(), Box<dyn std::error::Error>> {
    let events = store.query(None, None, None)?;
    for event in &events {
        if event.end_time != event.start_time {
            println!("Start: {} - End: {}", event.start_time, event.end_time);
        } else {
            println!("Start: {}", event.start_time);
        }
        println!("Event: {}", event.text);
        if !event.people.is_empty() {
            println!("People: {}", event.people);
        }
        println!("---");
    }
    Ok(())
}
