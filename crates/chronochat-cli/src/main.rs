//! ChronoChat CLI - interactive terminal chat client

use std::io;
use std::sync::{Arc, Mutex};

use anyhow::bail;
use clap::Parser;
use tokio::io::BufReader;

use chronochat_core::{ChatConfig, Name};
use chronochat_runtime::{run_chat, ChatSession, MemorySubstrate};

mod cli;
mod input;

use cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Only setup failures reach this point; steady-state failures are
    // absorbed inside the session loop. Report on stdout and exit normally.
    if let Err(e) = run().await {
        println!("exception: {}", e);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = ChatConfig::default();

    println!("Enter your chat username:");
    let username = input::read_trimmed_line()?;
    let user_prefix = Name::from_uri(&username)?;
    if user_prefix.is_empty() {
        bail!("username must not be empty");
    }

    println!(
        "Chatroom: {}, Username: {}",
        config.routing_prefix, username
    );
    println!();

    let output = Arc::new(Mutex::new(io::stdout()));
    let (session, commands) = ChatSession::new(
        MemorySubstrate::new(),
        config,
        user_prefix,
        output.clone(),
    );

    println!("Enter your chat message. To quit, enter \"leave\" or \"exit\".");
    run_chat(
        session,
        commands,
        output,
        BufReader::new(tokio::io::stdin()),
    )
    .await?;

    Ok(())
}

/// Setup logging based on verbosity level
///
/// Diagnostics go to stderr so the chat feed on stdout stays one line per
/// message.
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(io::stderr)
        .init();
}
