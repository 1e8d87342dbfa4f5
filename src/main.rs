//! Desk Assistant entry point.
//!
//! `serve` talks to a front end via JSON-line IPC on stdin/stdout; the other
//! subcommands are one-shot console tools.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use desk_assistant::config::AssistantConfig;
use desk_assistant::context::AssistantContext;
use desk_assistant::dispatcher::Dispatcher;
use desk_assistant::handlers::launcher;
use desk_assistant::ipc::bridge::{
    emit_error, emit_event, spawn_stdin_reader, ConsoleBridge, JsonLineBridge,
};
use desk_assistant::ipc::{UiCommand, UiEvent};
use desk_assistant::logging;
use desk_assistant::sounds::Sound;
use desk_assistant::store::{AliasKind, LookupStore};

#[derive(Parser)]
#[command(name = "desk-assistant", version, about = "Voice and text desktop assistant")]
struct Cli {
    /// Config file (defaults to assistant_config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve a front end over stdin/stdout (default)
    Serve {
        /// Open this URL in a chromeless browser window on startup
        #[arg(long)]
        ui_url: Option<String>,
    },
    /// Run one typed command
    Run {
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Listen for one spoken command
    Listen,
    /// Maintain application and website aliases
    #[command(subcommand)]
    Alias(AliasCommand),
}

#[derive(Subcommand)]
enum AliasCommand {
    List,
    /// Alias an application path
    AddApp { name: String, path: String },
    /// Alias a website URL
    AddWeb { name: String, url: String },
    /// Remove an alias from both tables
    Remove { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();

    match cli.command.unwrap_or(Command::Serve { ui_url: None }) {
        Command::Serve { ui_url } => serve(cli.config, ui_url).await,
        Command::Run { words } => run_once(cli.config, Some(words.join(" "))).await,
        Command::Listen => run_once(cli.config, None).await,
        Command::Alias(cmd) => alias(cli.config, cmd),
    }
}

async fn serve(config_path: Option<PathBuf>, ui_url: Option<String>) -> anyhow::Result<()> {
    // Let the front end know we're alive before anything slow happens.
    emit_event(&UiEvent::Starting {});

    emit_event(&UiEvent::Loading {
        step: "Reading configuration...".to_string(),
    });
    let config = AssistantConfig::load(config_path.as_deref());
    info!(name = %config.assistant_name, "Configuration loaded");

    emit_event(&UiEvent::Loading {
        step: "Opening alias store...".to_string(),
    });
    let ctx = match AssistantContext::from_config(config, Arc::new(JsonLineBridge)) {
        Ok(ctx) => ctx,
        Err(e) => {
            emit_error(&format!("Startup failed: {:#}", e));
            return Err(e);
        }
    };

    emit_event(&UiEvent::Loading {
        step: "Starting IPC bridge...".to_string(),
    });
    let mut cmd_rx = spawn_stdin_reader();

    ctx.sounds.play(Sound::Startup);
    if let Some(url) = ui_url {
        if let Err(e) = launcher::open_app_window(&url) {
            warn!("Could not open the UI window: {:#}", e);
        }
    }

    let dispatcher = Dispatcher::new(ctx);
    emit_event(&UiEvent::Ready {});
    info!("Assistant ready");

    // Commands are handled one at a time, in arrival order.
    while let Some(command) = cmd_rx.recv().await {
        if !handle_command(&dispatcher, command).await {
            break;
        }
    }

    info!("Assistant shutting down");
    Ok(())
}

/// Handle a single command from the front end.
/// Returns `false` if the main loop should exit.
async fn handle_command(dispatcher: &Dispatcher, cmd: UiCommand) -> bool {
    match cmd {
        UiCommand::AllCommands { text } => dispatcher.all_commands(text).await,
        UiCommand::PlayClickSound {} => dispatcher.play_click_sound(),
        UiCommand::Ping {} => emit_event(&UiEvent::Pong {}),
        UiCommand::Stop {} => {
            emit_event(&UiEvent::Stopping {});
            return false;
        }
    }
    true
}

async fn run_once(config_path: Option<PathBuf>, command: Option<String>) -> anyhow::Result<()> {
    let config = AssistantConfig::load(config_path.as_deref());
    let ctx = AssistantContext::from_config(config, Arc::new(ConsoleBridge))?;
    Dispatcher::new(ctx).all_commands(command).await;
    Ok(())
}

fn alias(config_path: Option<PathBuf>, cmd: AliasCommand) -> anyhow::Result<()> {
    let config = AssistantConfig::load(config_path.as_deref());
    let store = LookupStore::open(&config.database_path())?;

    match cmd {
        AliasCommand::List => {
            for record in store.list()? {
                println!("{}\t{}\t{}", record.kind, record.alias, record.target);
            }
        }
        AliasCommand::AddApp { name, path } => {
            store.add(AliasKind::Application, &name, &path)?;
            println!("Added application alias '{}'", name);
        }
        AliasCommand::AddWeb { name, url } => {
            store.add(AliasKind::Website, &name, &url)?;
            println!("Added website alias '{}'", name);
        }
        AliasCommand::Remove { name } => {
            let removed = store.remove(&name)?;
            println!("Removed {} alias(es) named '{}'", removed, name);
        }
    }
    Ok(())
}
