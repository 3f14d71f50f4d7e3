//! Scripted sales-coaching conversation
//!
//! Sends a short scripted exchange to the `/sales_trainer` endpoint and prints the final
//! transcript from the view model's snapshot.
//!
//! Run with: cargo run --example sales_trainer

use specbuddy::client::{ClientConfig, ConversationMode, HttpChatGateway};
use specbuddy::conversation::{ConversationViewModel, MessageEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const SCRIPT: &[&str] = &[
    "I'm a makeup artist and I charge ₹30,000 for bridal makeup.",
    "Clients keep asking me for a discount. What should I say?",
    "done",
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ClientConfig::from_env()?.with_mode(ConversationMode::SalesTrainer);
    let gateway = Arc::new(HttpChatGateway::with_config(config)?);

    let conversation = ConversationViewModel::builder(gateway)
        .reveal_interval(Duration::from_millis(1))
        .build();

    conversation.start().await.ok();

    for line in SCRIPT {
        conversation.submit(line).await;
        conversation.wait_for_reveal().await;
    }

    for entry in conversation.snapshot().entries {
        match entry.message {
            MessageEntry::UserText { text } => println!("Student: {}\n", text),
            MessageEntry::BotText { text } => println!("Teacher: {}\n", text),
            MessageEntry::BotImage { url } => println!("[image] {}\n", url),
        }
    }

    Ok(())
}
