//! Interactive terminal chat against a SpecBuddy server
//!
//! Replies are revealed character by character, images are printed as links, and the
//! prompt suggestions can be picked by number.
//!
//! Commands:
//!   /new       start a new conversation (same session id)
//!   /ideas     show the prompt suggestions
//!   /<n>       send suggestion number n
//!   /quit      exit
//!
//! Run with: SPECBUDDY_HOST=http://localhost:8000 cargo run --example chat_widget

use specbuddy::client::{ClientConfig, HttpChatGateway};
use specbuddy::conversation::{ConversationViewModel, MessageEntry, SubmitOutcome};
use specbuddy::suggestions::{suggestion_rows, DEFAULT_SUGGESTIONS};
use specbuddy::tracer::{ConversationEvent, ConversationEventKind, EventCallback, EventStore};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn print_suggestions() {
    let mut number = 1;
    for row in suggestion_rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|prompt| {
                let cell = format!("[{}] {}", number, prompt);
                number += 1;
                cell
            })
            .collect();
        println!("  {}", cells.join("   "));
    }
    println!();
}

/// Map the display number back to the prompt it was printed next to
fn suggestion_by_number(number: usize) -> Option<&'static str> {
    suggestion_rows().into_iter().flatten().nth(number.checked_sub(1)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Echo each revealed character as it appears
    let on_event: EventCallback = Arc::new(|event: &ConversationEvent| {
        if let ConversationEventKind::RevealTick { ch, .. } = &event.kind {
            print!("{}", ch);
            io::stdout().flush().ok();
        }
    });
    let store = Arc::new(EventStore::new(Some(on_event)));

    let config = ClientConfig::from_env()?;
    println!("SpecBuddy at {}", config.host);
    let gateway = Arc::new(HttpChatGateway::with_config(config)?);

    let conversation = ConversationViewModel::builder(gateway).event_store(store.clone()).build();

    if let Err(e) = conversation.start().await {
        eprintln!("(could not announce session: {})", e);
    }

    println!("Session {}", conversation.session_id());
    println!("Type a message, or /ideas for suggestions. Type 'done' for a summary.\n");
    print_suggestions();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        let outcome = match line {
            "/quit" => break,
            "/new" => {
                if let Err(e) = conversation.reset().await {
                    eprintln!("(server did not confirm reset: {})", e);
                }
                println!("-- new conversation --\n");
                continue;
            }
            "/ideas" => {
                print_suggestions();
                continue;
            }
            _ => match line.strip_prefix('/').and_then(|n| n.parse::<usize>().ok()) {
                Some(number) => match suggestion_by_number(number) {
                    Some(prompt) => {
                        println!("You: {}", prompt);
                        print!("SpecBuddy: ");
                        conversation.select_suggestion(prompt).await
                    }
                    None => {
                        println!("Pick a number between 1 and {}\n", DEFAULT_SUGGESTIONS.len());
                        continue;
                    }
                },
                None => {
                    conversation.set_input(line);
                    print!("SpecBuddy: ");
                    io::stdout().flush()?;
                    conversation.submit_input().await
                }
            },
        };

        match outcome {
            SubmitOutcome::Empty => {
                println!();
                continue;
            }
            SubmitOutcome::Replied { image_entry, .. } => {
                conversation.wait_for_reveal().await;
                println!();
                if let Some(id) = image_entry {
                    let image = conversation.entries().into_iter().find(|e| e.id == id);
                    if let Some(MessageEntry::BotImage { url }) = image.map(|e| e.message) {
                        println!("[image] {}", url);
                    }
                }
            }
            SubmitOutcome::Fallback { entry_id, .. } => {
                let fallback = conversation.entries().into_iter().find(|e| e.id == entry_id);
                if let Some(text) = fallback.as_ref().and_then(|e| e.message.text()) {
                    println!("{}", text);
                }
            }
            SubmitOutcome::Discarded => {}
        }
        println!();
    }

    println!("\nRecent activity:");
    for summary in store.get_last_n_summaries(5, Some(&|e: &ConversationEvent| {
        !matches!(e.kind, ConversationEventKind::RevealTick { .. })
    })) {
        println!("  {}", summary);
    }

    Ok(())
}
