use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use message_board::board::{BoardOptions, MessageBoard, Outcome};
use message_board::config::AppConfig;
use message_board::logging::init_logging;
use message_board::render::{message_line, message_lines, render_board};
use message_board::rest::RestStore;
use message_board::validation::InputValidator;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file layered over config/default and config/local
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the newest messages
    List {
        /// Print the messages as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the full board
    Show {
        /// Number of pages to fetch
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },
    /// Post a message as the configured user
    Post {
        /// Message text, sent exactly as given
        content: String,
    },
    /// Delete a message by id
    Delete {
        /// Id of the message to delete
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = init_logging(
        Some(&config.get_log_level()),
        config.logging.format == "json",
        config.logging.file_path.as_deref().map(Path::new),
    )?;

    info!("Starting message-board");

    let session = config.session();
    let store = RestStore::new(&config.store, session.access_token())?;
    debug!(?store, "Store configured");
    let options = BoardOptions::from_config(&config)?;
    let mut board = MessageBoard::new(Arc::new(store), Arc::new(session), options);

    // Ctrl-C tears the view down; pending results are discarded
    let token = board.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match cli.command {
        Commands::List { json } => list_messages(&mut board, json).await,
        Commands::Show { pages } => show_board(&mut board, pages).await,
        Commands::Post { content } => post_message(&mut board, content).await,
        Commands::Delete { id } => delete_message(&mut board, &id).await,
    }
}

/// List the newest page of messages
async fn list_messages(board: &mut MessageBoard, json: bool) -> Result<()> {
    let outcome = board.load().await;
    check(board, outcome)?;
    info!("Loaded {} messages", board.messages().len());

    if json {
        emit(&[serde_json::to_string_pretty(board.messages())?]);
    } else {
        emit(&message_lines(board.messages()));
    }

    Ok(())
}

/// Render the board, paging back through older messages
async fn show_board(board: &mut MessageBoard, pages: usize) -> Result<()> {
    let outcome = board.load().await;
    check(board, outcome)?;

    for _ in 1..pages {
        if !board.has_more() {
            break;
        }
        let outcome = board.load_more().await;
        check(board, outcome)?;
    }

    let user = board.current_user();
    emit(&[render_board(board.state(), user.as_ref())]);
    Ok(())
}

/// Post a message as the configured user
async fn post_message(board: &mut MessageBoard, content: String) -> Result<()> {
    if board.current_user().is_none() {
        bail!("Posting requires a signed-in user; set auth.user_id in the configuration");
    }
    if !InputValidator::is_postable(&content) {
        bail!("Message content cannot be empty");
    }

    board.set_draft(content);
    let outcome = board.post_message().await;
    check(board, outcome)?;

    if let Some(message) = board.messages().first() {
        info!(message_id = %message.id, "Message posted");
        emit(&[message_line(message)]);
    }
    Ok(())
}

/// Delete a message by id
async fn delete_message(board: &mut MessageBoard, id: &str) -> Result<()> {
    InputValidator::validate_message_id(id)?;

    // Look the message up first so the user gets a hint when the delete is
    // likely to be refused or to match nothing.
    if board.load().await == Outcome::Succeeded {
        match board.messages().iter().find(|m| m.id == id) {
            Some(message) if !board.can_delete(message) => {
                warn!(message_id = id, "Message belongs to another user; the store will likely refuse the delete");
            },
            Some(_) => {},
            None => warn!(message_id = id, "Message not found in the newest page"),
        }
    }

    let outcome = board.delete_message(id).await;
    check(board, outcome)?;
    info!(message_id = id, "Message deleted");
    Ok(())
}

/// Turn a failed or interrupted operation into a process error
fn check(board: &MessageBoard, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Failed => Err(anyhow!(board.error_message().unwrap_or("Operation failed").to_string())),
        Outcome::Cancelled => Err(anyhow!("Interrupted")),
        Outcome::Skipped | Outcome::Succeeded => Ok(()),
    }
}

#[allow(clippy::print_stdout)]
fn emit(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
