//! `factquest chat`: Interactive or single-message terminal chat.

use factquest_agent::{TurnOutcome, TurnRunner, WELCOME_MESSAGE, relay_to_channel};
use factquest_channels::CliChannel;
use factquest_channels::cli::CLI_CHAT_ID;
use factquest_core::channel::Channel;
use factquest_core::message::ConversationId;
use factquest_core::SessionStore;
use std::io::Write;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, secrets) = super::load_settings()?;
    let runner = TurnRunner::from_config(&config, &secrets)?;

    let sessions = SessionStore::new(1);
    let session = sessions.open(ConversationId::from(CLI_CHAT_ID)).await?;
    let channel = CliChannel::new();

    if let Some(msg) = message {
        // Single message mode: a failed turn is a failed run
        let events = runner.run_turn(session, msg);
        return match relay_to_channel(events, &channel, CLI_CHAT_ID).await? {
            TurnOutcome::Failed(message) => Err(message.into()),
            TurnOutcome::Completed | TurnOutcome::Abandoned => Ok(()),
        };
    }

    println!();
    println!("  FactQuest ({})", config.model.model);
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();
    channel.send(CLI_CHAT_ID, WELCOME_MESSAGE).await?;
    println!();

    let mut rx = channel.start().await?;
    prompt()?;

    while let Some(result) = rx.recv().await {
        match result {
            Ok(chan_msg) => {
                let events = runner.run_turn(session.clone(), chan_msg.content);
                relay_to_channel(events, &channel, &chan_msg.chat_id).await?;
                println!();
                prompt()?;
            }
            Err(e) => {
                eprintln!("  [Channel Error] {e}");
                break;
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
